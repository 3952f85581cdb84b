// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{extract::Query, response::Html, routing::get, Json, Router};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use parking_lot::Mutex;
use tokio::net::TcpListener;

pub const TOTAL_OBJECTS: u64 = 42;

pub const CALENDAR: &str = r#"<!DOCTYPE html>
<html>
  <body>
    <div id="events_list">
      <div class="event">
        <div><figure><div><figcaption>Free admission</figcaption></div></figure></div>
        <div><div>
          <header>
            <time>Thursday, November 1</time>
            <h2><a href="/calendar/lecture">Lecture: Ancient Glass</a></h2>
          </header>
          <div>
            <p><time>6:00pm</time></p>
            <p><span><span>Menschel Hall</span><span>Lower Level</span></span></p>
          </div>
        </div></div>
      </div>
      <div class="event">
        <div><div>
          <header>
            <time>Friday, November 2</time>
            <h2><a href="/calendar/tour">Gallery Tour, "Highlights"</a></h2>
          </header>
        </div></div>
      </div>
    </div>
  </body>
</html>"#;

/// 本地测试服务器，记录收到的分页请求
pub struct TestServer {
    pub base_url: String,
    pub offsets: Arc<Mutex<Vec<u64>>>,
}

pub async fn start_test_server() -> TestServer {
    let offsets = Arc::new(Mutex::new(Vec::new()));
    let seen = offsets.clone();

    let app = Router::new()
        .route(
            "/browse",
            get(move |Query(params): Query<HashMap<String, String>>| {
                let seen = seen.clone();
                async move {
                    let size: u64 = params
                        .get("load_amount")
                        .and_then(|v| v.parse().ok())
                        .unwrap_or(10);
                    let offset: u64 = params
                        .get("offset")
                        .and_then(|v| v.parse().ok())
                        .unwrap_or(0);
                    seen.lock().push(offset);

                    let end = (offset + size).min(TOTAL_OBJECTS);
                    let records: Vec<Value> = (offset.min(end)..end)
                        .map(|n| json!({"objectid": n, "title": format!("Object {}", n)}))
                        .collect();
                    Json(json!({"info": {"totalrecords": TOTAL_OBJECTS}, "records": records}))
                }
            }),
        )
        .route(
            "/visit/calendar",
            get(|Query(params): Query<HashMap<String, String>>| async move {
                if params.get("date").map(String::as_str) == Some("2018-11") {
                    Html(CALENDAR.to_string())
                } else {
                    Html("<html><body></body></html>".to_string())
                }
            }),
        );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestServer {
        base_url: format!("http://{}", addr),
        offsets,
    }
}
