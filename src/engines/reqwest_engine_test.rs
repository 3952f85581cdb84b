// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::*;
use crate::domain::models::page::PageRange;
use crate::engines::paginated_fetcher::PaginatedFetcher;
use crate::engines::traits::ErrorKind;
use axum::{
    extract::Query,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::net::TcpListener;

async fn browse(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    let size: u64 = params
        .get("load_amount")
        .and_then(|v| v.parse().ok())
        .unwrap_or(10);
    let offset: u64 = params
        .get("offset")
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);
    let records: Vec<Value> = (offset..offset + size)
        .map(|n| json!({"objectid": n, "title": format!("Object {}", n)}))
        .collect();
    Json(json!({"info": {"offset": offset}, "records": records}))
}

async fn start_test_server() -> String {
    let app = Router::new()
        .route("/browse", get(browse))
        .route(
            "/calendar",
            get(|Query(params): Query<HashMap<String, String>>| async move {
                let date = params.get("date").cloned().unwrap_or_default();
                Response::builder()
                    .header("content-type", "text/html")
                    .body(format!("<html><body><p id=\"date\">{}</p></body></html>", date))
                    .unwrap()
            }),
        )
        .route(
            "/moved",
            get(|| async { Json(json!({"info": {"pages": 0}})) }),
        )
        .route(
            "/slow",
            get(|| async {
                tokio::time::sleep(std::time::Duration::from_secs(3)).await;
                "late"
            }),
        )
        .route(
            "/echo",
            get(|headers: HeaderMap| async move {
                let value = |name: header::HeaderName| {
                    headers
                        .get(name)
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or_default()
                        .to_string()
                };
                Json(json!({
                    "accept": value(header::ACCEPT),
                    "user_agent": value(header::USER_AGENT),
                }))
            }),
        )
        .route(
            "/error",
            get(|| async { StatusCode::INTERNAL_SERVER_ERROR.into_response() }),
        );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

#[tokio::test]
async fn test_get_text_sends_query() {
    let server_url = start_test_server().await;
    let engine = ReqwestEngine::new().unwrap();
    let url = Url::parse(&format!("{}/calendar", server_url)).unwrap();

    let body = engine
        .get_text(&url, &[("date".to_string(), "2018-11".to_string())])
        .await
        .unwrap();

    assert!(body.contains("2018-11"));
}

#[tokio::test]
async fn test_error_status_is_network_error() {
    let server_url = start_test_server().await;
    let engine = ReqwestEngine::new().unwrap();
    let url = Url::parse(&format!("{}/error", server_url)).unwrap();

    let err = engine.get_text(&url, &[]).await.unwrap_err();

    assert!(matches!(err, FetchError::Status { status: 500, .. }));
    assert_eq!(err.kind(), ErrorKind::Network);
}

#[tokio::test]
async fn test_connection_refused_is_network_error() {
    // Bind then drop to get a port with nothing listening
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let engine = ReqwestEngine::new().unwrap();
    let url = Url::parse(&format!("http://{}/browse", addr)).unwrap();

    let err = engine.get_text(&url, &[]).await.unwrap_err();

    assert!(err.is_network());
}

#[tokio::test]
async fn test_paginated_fetch_over_http() {
    let server_url = start_test_server().await;
    let engine = Arc::new(ReqwestEngine::new().unwrap());
    let endpoint = Url::parse(&format!("{}/browse", server_url)).unwrap();
    let fetcher = PaginatedFetcher::new(engine, endpoint);

    let records = fetcher.fetch_all(&PageRange::new(10, 0, 50)).await.unwrap();

    assert_eq!(records.len(), 50);
    let ids: Vec<u64> = records
        .iter()
        .filter_map(|r| r.get("objectid").and_then(Value::as_u64))
        .collect();
    assert_eq!(ids, (0..50).collect::<Vec<_>>());
}

#[tokio::test]
async fn test_paginated_fetch_missing_key_over_http() {
    let server_url = start_test_server().await;
    let engine = Arc::new(ReqwestEngine::new().unwrap());
    let endpoint = Url::parse(&format!("{}/moved", server_url)).unwrap();
    let fetcher = PaginatedFetcher::new(engine, endpoint);

    let err = fetcher.fetch_all(&PageRange::new(10, 0, 20)).await.unwrap_err();

    assert!(err.is_format());
}

#[tokio::test]
async fn test_from_settings_applies_headers() {
    let server_url = start_test_server().await;
    let settings = HttpSettings {
        user_agent: Some("fetchrs-test".to_string()),
        timeout_secs: Some(5),
        headers: HashMap::from([
            ("accept".to_string(), "application/json".to_string()),
            ("bad header".to_string(), "x".to_string()),
        ]),
    };
    let engine = ReqwestEngine::from_settings(&settings).unwrap();
    let url = Url::parse(&format!("{}/echo", server_url)).unwrap();

    let body = engine.get_text(&url, &[]).await.unwrap();
    let echoed: Value = serde_json::from_str(&body).unwrap();

    assert_eq!(echoed["accept"], "application/json");
    assert_eq!(echoed["user_agent"], "fetchrs-test");
}

#[tokio::test]
async fn test_configured_timeout_is_network_error() {
    let server_url = start_test_server().await;
    let settings = HttpSettings {
        timeout_secs: Some(1),
        ..HttpSettings::default()
    };
    let engine = ReqwestEngine::from_settings(&settings).unwrap();
    let url = Url::parse(&format!("{}/slow", server_url)).unwrap();

    let err = engine.get_text(&url, &[]).await.unwrap_err();

    assert!(matches!(err, FetchError::Timeout));
    assert_eq!(err.kind(), ErrorKind::Network);
}
