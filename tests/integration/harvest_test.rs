// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{start_test_server, CALENDAR, TOTAL_OBJECTS};
use fetchrs::application::use_cases::harvest_use_case::{extract_items, HarvestUseCase};
use fetchrs::config::settings::Settings;
use fetchrs::domain::models::page::PageRange;
use fetchrs::engines::paginated_fetcher::PaginatedFetcher;
use fetchrs::engines::reqwest_engine::ReqwestEngine;
use serde_json::Value;
use std::io::Write;
use std::sync::Arc;
use url::Url;

fn write_config(server: &str, out_dir: &std::path::Path) -> tempfile::NamedTempFile {
    let contents = format!(
        r#"
[http]
user_agent = "fetchrs-integration"
timeout_secs = 5

[pagination]
base_url = "{server}"
path = "browse"
end = 50
concurrency = 2

[extraction]
url = "{server}/visit/calendar"
query = [["date", "2018-11"]]
items = '//*[@id="events_list"]'
fields = [
    {{ name = "figcaption", locator = "div/figure/div/figcaption" }},
    {{ name = "date", locator = "div/div/header/time" }},
    {{ name = "title", locator = "div/div/header/h2/a" }},
    {{ name = "time", locator = "div/div/div/p[1]/time" }},
    {{ name = "location1", locator = "div/div/div/p[2]/span/span[1]" }},
    {{ name = "location2", locator = "div/div/div/p[2]/span/span[2]" }},
]

[output]
records_path = "{records}"
fields_path = "{fields}"
"#,
        server = server,
        records = out_dir.join("records_final.csv").display(),
        fields = out_dir.join("all_event_values.csv").display(),
    );
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[tokio::test]
async fn test_fetch_overshooting_range_appends_empty_pages() {
    let server = start_test_server().await;
    let engine = Arc::new(ReqwestEngine::new().unwrap());
    let endpoint = Url::parse(&format!("{}/browse", server.base_url)).unwrap();
    let fetcher = PaginatedFetcher::new(engine, endpoint);

    let records = fetcher.fetch_all(&PageRange::new(10, 0, 70)).await.unwrap();

    assert_eq!(*server.offsets.lock(), vec![0, 10, 20, 30, 40, 50, 60]);
    assert_eq!(records.len() as u64, TOTAL_OBJECTS);
    let last = records.iter().last().and_then(|r| r.get("objectid")).and_then(Value::as_u64);
    assert_eq!(last, Some(TOTAL_OBJECTS - 1));
}

#[tokio::test]
async fn test_harvest_end_to_end() {
    let server = start_test_server().await;
    let out_dir = tempfile::tempdir().unwrap();
    let config = write_config(&server.base_url, out_dir.path());

    let settings = Arc::new(Settings::from_file(config.path().to_str().unwrap()).unwrap());
    let transport = Arc::new(ReqwestEngine::from_settings(&settings.http).unwrap());
    HarvestUseCase::new(transport, settings).run().await.unwrap();

    let mut offsets = server.offsets.lock().clone();
    offsets.sort_unstable();
    assert_eq!(offsets, vec![0, 10, 20, 30, 40]);

    let records = std::fs::read_to_string(out_dir.path().join("records_final.csv")).unwrap();
    let lines: Vec<_> = records.lines().collect();
    assert_eq!(lines[0], "objectid,title");
    assert_eq!(lines[1], "0,Object 0");
    assert_eq!(lines.len() as u64, TOTAL_OBJECTS + 1);

    let events = std::fs::read_to_string(out_dir.path().join("all_event_values.csv")).unwrap();
    assert_eq!(
        events,
        "figcaption,date,title,time,location1,location2\n\
         Free admission,\"Thursday, November 1\",Lecture: Ancient Glass,6:00pm,Menschel Hall,Lower Level\n\
         ,\"Friday, November 2\",\"Gallery Tour, \"\"Highlights\"\"\",,,\n"
    );
}

#[test]
fn test_extract_items_without_network() {
    let settings = Settings::from_file(
        write_config("http://127.0.0.1:9", std::path::Path::new("."))
            .path()
            .to_str()
            .unwrap(),
    )
    .unwrap();

    let rows = extract_items(CALENDAR, &settings.extraction).unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].get("location1"), Some("Menschel Hall"));
    assert_eq!(rows[1].get("figcaption"), Some(""));
    assert_eq!(rows[1].get("title"), Some("Gallery Tour, \"Highlights\""));
}
