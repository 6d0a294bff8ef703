use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use logsearch::config::Config;

/// Requests seen by the stand-in backend.
#[derive(Clone, Default)]
pub struct Seen {
    pub search_bodies: Arc<Mutex<Vec<Value>>>,
    pub uploaded_names: Arc<Mutex<Vec<Vec<String>>>>,
}

pub fn event(id: i64, src_addr: &str) -> Value {
    json!({
        "id": id,
        "file_name": "events_2024_08_29.log",
        "serial_no": 2,
        "version": 2,
        "account_id": "348935949",
        "instance_id": "eni-0a1b2c",
        "src_addr": src_addr,
        "dst_addr": "30.55.177.194",
        "src_port": 152,
        "dst_port": 23475,
        "protocol": 8,
        "packets": 1250,
        "bytes_transferred": 2048576,
        "start_time": 1725850449,
        "end_time": 1725855086,
        "action": "ACCEPT",
        "log_status": "OK"
    })
}

async fn upload(State(seen): State<Seen>, mut multipart: Multipart) -> (StatusCode, Json<Value>) {
    let mut names = Vec::new();
    while let Ok(Some(field)) = multipart.next_field().await {
        assert_eq!(field.name(), Some("files"), "unexpected multipart field");
        let name = field.file_name().unwrap_or("unknown").to_string();
        let data = field.bytes().await.unwrap();
        assert!(!data.is_empty(), "{name} was sent without content");
        names.push(name);
    }
    seen.uploaded_names.lock().unwrap().push(names.clone());

    if names.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "No files provided" })),
        );
    }

    let outcomes: Vec<Value> = names
        .iter()
        .enumerate()
        .map(|(i, name)| {
            if name.contains("broken") {
                json!({ "name": name, "status": "error", "error": "invalid record on line 1" })
            } else {
                json!({ "id": i + 1, "name": name, "status": "success", "events_processed": 50 })
            }
        })
        .collect();
    (StatusCode::CREATED, Json(Value::Array(outcomes)))
}

async fn search(State(seen): State<Seen>, Json(body): Json<Value>) -> Json<Value> {
    seen.search_bodies.lock().unwrap().push(body.clone());
    let page = body.get("page").and_then(Value::as_u64).unwrap_or(1);
    Json(json!({
        "results": [event(page as i64, "10.0.0.1")],
        "search_time": 0.0042,
        "total_count": 250,
        "page": page,
        "page_size": 100,
        "total_pages": 3
    }))
}

async fn stats() -> Json<Value> {
    Json(json!({ "total_events": 1200, "total_files": 4, "processed_files": 3 }))
}

async fn files() -> Json<Value> {
    Json(json!([
        { "id": 1, "name": "a.log", "uploaded_at": "2024-08-29T10:15:00.123456Z",
          "processed": true, "total_events": 1200 },
        { "id": 2, "name": "b.log", "uploaded_at": "2024-08-29T10:16:00+02:00",
          "processed": false, "total_events": 0 }
    ]))
}

pub fn backend(seen: Seen) -> Router {
    Router::new()
        .route("/api/files/", post(upload).get(files))
        .route("/api/events/search/", post(search))
        .route("/api/events/stats/", get(stats))
        .with_state(seen)
}

/// Serve `app` on an ephemeral port and return a client config pointing at it.
pub fn serve(app: Router) -> Config {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let server = axum::Server::from_tcp(listener)
        .unwrap()
        .serve(app.into_make_service());
    tokio::spawn(server);

    Config {
        api_url: format!("http://{addr}/api"),
        timeout: Duration::from_secs(5),
        upload_timeout: Duration::from_secs(5),
    }
}

/// A config whose URL nothing listens on.
pub fn unreachable() -> Config {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    Config {
        api_url: format!("http://{addr}/api"),
        timeout: Duration::from_secs(2),
        upload_timeout: Duration::from_secs(2),
    }
}
