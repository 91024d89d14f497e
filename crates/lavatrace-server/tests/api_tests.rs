// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! HTTP tests for the map upload, report and health endpoints.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::json;
use tempfile::TempDir;
use tower::ServiceExt;

use lavatrace_core::ReportId;
use lavatrace_resolve::{
	CacheConfig, ForwardEvents, InMemoryMapStore, MapStore, PersistCompact, RecordingEventSink,
};
use lavatrace_server::{create_pool, create_router, run_migrations, AppState, SqliteStore};
use lavatrace_server_config::{OutputMode, Secret};

const TOKEN: &str = "test-admin-token";

const SAMPLE_MAP: &str = r#"{
	"version": 3,
	"sources": ["src/index.ts"],
	"names": ["hello", "console", "log"],
	"mappings": "AAAA,SAASA,MAAMC;AACA"
}"#;

async fn persist_app() -> (TempDir, SqliteStore, Router) {
	let dir = tempfile::tempdir().unwrap();
	let url = format!("sqlite:{}", dir.path().join("lavatrace.db").display());
	let pool = create_pool(&url).await.unwrap();
	run_migrations(&pool).await.unwrap();

	let store = SqliteStore::new(pool);
	let state = AppState::new(
		Arc::new(store.clone()),
		Arc::new(PersistCompact::new(Arc::new(store.clone()))),
		Secret::new(TOKEN.to_string()),
		CacheConfig::default(),
		OutputMode::Persist,
	);
	(dir, store, create_router(state))
}

async fn event_app() -> (Arc<RecordingEventSink>, Router) {
	let maps = Arc::new(InMemoryMapStore::new());
	maps.put("abc", "app.js.map", SAMPLE_MAP).await.unwrap();

	let sink = Arc::new(RecordingEventSink::new());
	let state = AppState::new(
		maps,
		Arc::new(ForwardEvents::new(sink.clone())),
		Secret::new(TOKEN.to_string()),
		CacheConfig::default(),
		OutputMode::Event,
	);
	(sink, create_router(state))
}

fn upload_request(commit: &str, token: Option<&str>, body: String) -> Request<Body> {
	let mut builder = Request::builder()
		.uri(format!("/maps/{commit}"))
		.method("POST")
		.header("content-type", "application/json");
	if let Some(token) = token {
		builder = builder.header("authorization", format!("Bearer {token}"));
	}
	builder.body(Body::from(body)).unwrap()
}

fn report_request(body: String) -> Request<Body> {
	Request::builder()
		.uri("/report")
		.method("POST")
		.header("content-type", "application/json")
		.body(Body::from(body))
		.unwrap()
}

fn report_body(stacktraces: &[&str]) -> String {
	json!({
		"commitID": "abc",
		"version": "1.0.0",
		"assets": ["https://cdn.example.com/app.js"],
		"entries": stacktraces
			.iter()
			.map(|s| json!({
				"date": 1_700_000_000,
				"type": "Error",
				"message": "boom",
				"objects": [{"user": 7}],
				"stacktrace": s,
			}))
			.collect::<Vec<_>>(),
	})
	.to_string()
}

async fn body_text(response: axum::response::Response) -> String {
	let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
		.await
		.unwrap();
	String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_index_reports_version() {
	let (_dir, _store, app) = persist_app().await;

	let response = app
		.oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
		.await
		.unwrap();

	assert_eq!(response.status(), StatusCode::OK);
	assert_eq!(
		body_text(response).await,
		format!("lavatrace {}", env!("CARGO_PKG_VERSION"))
	);
}

#[tokio::test]
async fn test_upload_requires_token() {
	let (_dir, store, app) = persist_app().await;
	let body = json!({"app.js.map": SAMPLE_MAP}).to_string();

	let response = app
		.clone()
		.oneshot(upload_request("abc", None, body.clone()))
		.await
		.unwrap();
	assert_eq!(response.status(), StatusCode::FORBIDDEN);
	assert_eq!(body_text(response).await, "Invalid authorization token");

	let response = app
		.oneshot(upload_request("abc", Some("wrong"), body))
		.await
		.unwrap();
	assert_eq!(response.status(), StatusCode::FORBIDDEN);

	assert!(store.get_all("abc", "app.js.map").await.unwrap().is_empty());
}

fn large_map(min_bytes: usize) -> String {
	json!({
		"version": 3,
		"sources": ["src/index.ts"],
		"sourcesContent": ["x".repeat(min_bytes)],
		"names": ["hello", "console", "log"],
		"mappings": "AAAA,SAASA,MAAMC;AACA",
	})
	.to_string()
}

#[tokio::test]
async fn test_upload_accepts_map_over_two_megabytes() {
	let (_dir, store, app) = persist_app().await;
	let map = large_map(3 * 1024 * 1024);
	let body = json!({"vendor.js.map": map}).to_string();
	assert!(body.len() > 2 * 1024 * 1024);

	let response = app
		.clone()
		.oneshot(upload_request("abc", Some(TOKEN), body))
		.await
		.unwrap();
	assert_eq!(response.status(), StatusCode::OK);
	assert_eq!(body_text(response).await, "Success");

	let records = store.get_all("abc", "vendor.js.map").await.unwrap();
	assert_eq!(records.len(), 1);
	assert_eq!(records[0].body, map);

	let response = app
		.oneshot(report_request(
			json!({
				"commitID": "abc",
				"version": "1.0.0",
				"assets": ["https://cdn.example.com/vendor.js"],
				"entries": [{
					"date": 1_700_000_000,
					"type": "Error",
					"message": "boom",
					"objects": [],
					"stacktrace": "0:1:9",
				}],
			})
			.to_string(),
		))
		.await
		.unwrap();
	assert_eq!(response.status(), StatusCode::OK);

	let id: ReportId = body_text(response).await.parse().unwrap();
	let stored = store.get_report(id).await.unwrap().unwrap();
	assert_eq!(stored.entries[0].stacktrace, vec!["src/index.ts:hello:1:9"]);
}

#[tokio::test]
async fn test_configured_body_limit_rejects_larger_upload() {
	let maps = Arc::new(InMemoryMapStore::new());
	let state = AppState::new(
		maps.clone(),
		Arc::new(ForwardEvents::new(Arc::new(RecordingEventSink::new()))),
		Secret::new(TOKEN.to_string()),
		CacheConfig::default(),
		OutputMode::Event,
	)
	.with_body_limit(Some(1024));
	let app = create_router(state);

	let body = json!({"vendor.js.map": large_map(4096)}).to_string();
	let response = app
		.clone()
		.oneshot(upload_request("abc", Some(TOKEN), body))
		.await
		.unwrap();
	assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
	assert!(maps.get_all("abc", "vendor.js.map").await.unwrap().is_empty());

	let body = json!({"app.js.map": SAMPLE_MAP}).to_string();
	let response = app
		.oneshot(upload_request("abc", Some(TOKEN), body))
		.await
		.unwrap();
	assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_upload_rejects_invalid_json() {
	let (_dir, _store, app) = persist_app().await;

	let response = app
		.oneshot(upload_request("abc", Some(TOKEN), "[1, 2]".to_string()))
		.await
		.unwrap();
	assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_upload_then_report_persists_resolved_frames() {
	let (_dir, store, app) = persist_app().await;

	let response = app
		.clone()
		.oneshot(upload_request(
			"abc",
			Some(TOKEN),
			json!({"app.js.map": SAMPLE_MAP}).to_string(),
		))
		.await
		.unwrap();
	assert_eq!(response.status(), StatusCode::OK);
	assert_eq!(body_text(response).await, "Success");

	let response = app
		.oneshot(report_request(report_body(&["/:1:1;0:1:9", "native:2:0"])))
		.await
		.unwrap();
	assert_eq!(response.status(), StatusCode::OK);

	let id: ReportId = body_text(response).await.parse().unwrap();
	let stored = store.get_report(id).await.unwrap().unwrap();
	assert_eq!(stored.commit_id, "abc");
	assert_eq!(
		stored.entries[0].stacktrace,
		vec!["/:/:1:1", "src/index.ts:hello:1:9"]
	);
	assert_eq!(stored.entries[1].stacktrace, vec!["native:native:2:0"]);
	assert_eq!(stored.entries[0].objects, vec![json!({"user": 7})]);
}

#[tokio::test]
async fn test_report_without_map_uses_placeholder() {
	let (_dir, store, app) = persist_app().await;

	let response = app
		.oneshot(report_request(report_body(&["0:4:2"])))
		.await
		.unwrap();
	assert_eq!(response.status(), StatusCode::OK);

	let id: ReportId = body_text(response).await.parse().unwrap();
	let stored = store.get_report(id).await.unwrap().unwrap();
	assert_eq!(stored.entries[0].stacktrace, vec!["unknown:unknown:4:2"]);
}

#[tokio::test]
async fn test_event_mode_returns_event_id() {
	let (sink, app) = event_app().await;

	let response = app
		.oneshot(report_request(report_body(&["0:1:20"])))
		.await
		.unwrap();
	assert_eq!(response.status(), StatusCode::OK);

	let id = body_text(response).await;
	assert_eq!(id.len(), 32);
	assert!(id.chars().all(|c| c.is_ascii_hexdigit()));

	let events = sink.events().await;
	assert_eq!(events.len(), 1);
	assert_eq!(events[0].event_id.to_string(), id);
	assert_eq!(events[0].release, "abc");
}

#[tokio::test]
async fn test_report_rejections() {
	let (_dir, _store, app) = persist_app().await;

	let cases = [
		("not json".to_string(), "malformed body"),
		(report_body(&[]), "no entries"),
		(report_body(&["0:1:1", "  "]), "empty stacktrace"),
		(report_body(&["3:1:1"]), "asset index out of range"),
		(report_body(&["0:x:1"]), "bad line number"),
	];

	for (body, case) in cases {
		let response = app.clone().oneshot(report_request(body)).await.unwrap();
		assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{case}");
	}
}

#[tokio::test]
async fn test_malformed_map_is_server_error() {
	let (_dir, _store, app) = persist_app().await;

	let response = app
		.clone()
		.oneshot(upload_request(
			"abc",
			Some(TOKEN),
			json!({"app.js.map": "{not a source map"}).to_string(),
		))
		.await
		.unwrap();
	assert_eq!(response.status(), StatusCode::OK);

	let response = app
		.oneshot(report_request(report_body(&["0:1:1"])))
		.await
		.unwrap();
	assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_health_reports_resolver_counters() {
	let (sink, app) = event_app().await;

	let response = app
		.clone()
		.oneshot(report_request(report_body(&["0:1:20;0:1:20"])))
		.await
		.unwrap();
	assert_eq!(response.status(), StatusCode::OK);
	assert_eq!(sink.events().await.len(), 1);

	let response = app
		.oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
		.await
		.unwrap();
	assert_eq!(response.status(), StatusCode::OK);

	let health: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
	assert_eq!(health["status"], "ok");
	assert_eq!(health["output"], "event");
	assert_eq!(health["store_fetches"], 1);
	assert_eq!(health["index_builds"], 1);
	assert_eq!(health["cache"]["exact"]["hits"], 1);
}
