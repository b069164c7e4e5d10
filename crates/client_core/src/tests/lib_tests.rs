use super::*;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response as AxumResponse},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::Mutex};

#[derive(Clone, Default)]
struct BackendState {
    records: Arc<Mutex<Vec<ShortenedUrlRecord>>>,
    create_bodies: Arc<Mutex<Vec<Value>>>,
    next_id: Arc<Mutex<u32>>,
}

async fn handle_create(State(state): State<BackendState>, Json(body): Json<Value>) -> AxumResponse {
    state.create_bodies.lock().await.push(body.clone());

    let Some(long_url) = body["longUrl"].as_str().filter(|v| !v.is_empty()) else {
        return StatusCode::BAD_REQUEST.into_response();
    };

    let mut records = state.records.lock().await;
    let short_key = match body["customKey"].as_str() {
        Some(custom) => {
            if records.iter().any(|r| r.short_key.as_str() == custom) {
                return (
                    StatusCode::CONFLICT,
                    Json(json!({"error": "Conflict", "message": format!("key {custom} already exists")})),
                )
                    .into_response();
            }
            custom.to_string()
        }
        None => {
            let mut next_id = state.next_id.lock().await;
            *next_id += 1;
            format!("gen{:03}", *next_id)
        }
    };

    let record = ShortenedUrlRecord {
        short_key: ShortKey::new(short_key.clone()),
        long_url: long_url.to_string(),
        short_url: format!("http://localhost:8080/{short_key}"),
        created_at: "2024-01-01T00:00:00Z".to_string(),
    };
    records.push(record.clone());
    Json(record).into_response()
}

async fn handle_list(State(state): State<BackendState>) -> Json<Vec<ShortenedUrlRecord>> {
    Json(state.records.lock().await.clone())
}

async fn handle_resolve(
    State(state): State<BackendState>,
    Path(short_key): Path<String>,
) -> AxumResponse {
    let records = state.records.lock().await;
    match records.iter().find(|r| r.short_key.as_str() == short_key) {
        Some(record) => (StatusCode::OK, record.long_url.clone()).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({"error": "Not Found", "message": format!("Short key not found: {short_key}")})),
        )
            .into_response(),
    }
}

async fn handle_delete(
    State(state): State<BackendState>,
    Path(short_key): Path<String>,
) -> StatusCode {
    let mut records = state.records.lock().await;
    let before = records.len();
    records.retain(|r| r.short_key.as_str() != short_key);
    if records.len() == before {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::NO_CONTENT
    }
}

async fn spawn_backend() -> anyhow::Result<(Url, BackendState)> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let state = BackendState::default();
    let app = Router::new()
        .route("/api/shorten", axum::routing::post(handle_create))
        .route("/api/shorten/urls", get(handle_list))
        .route(
            "/api/shorten/:short_key",
            get(handle_resolve).delete(handle_delete),
        )
        .with_state(state.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok((Url::parse(&format!("http://{addr}/api/shorten"))?, state))
}

async fn spawn_raw_backend(app: Router) -> anyhow::Result<Url> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(Url::parse(&format!("http://{addr}/api/shorten"))?)
}

#[tokio::test]
async fn create_posts_camel_case_body_with_null_custom_key() {
    let (base, backend) = spawn_backend().await.expect("backend");
    let client = ShortenerClient::new(base);

    let record = client
        .create(&CreateUrlRequest::from_inputs(
            "https://example.com/a/very/long/path",
            "",
        ))
        .await
        .expect("create");

    assert_eq!(record.long_url, "https://example.com/a/very/long/path");
    assert_eq!(record.short_key.as_str(), "gen001");
    let bodies = backend.create_bodies.lock().await;
    assert_eq!(
        bodies.as_slice(),
        &[json!({"longUrl": "https://example.com/a/very/long/path", "customKey": null})]
    );
}

#[tokio::test]
async fn create_with_custom_key_returns_backend_record() {
    let (base, _backend) = spawn_backend().await.expect("backend");
    let client = ShortenerClient::new(base);

    let record = client
        .create(&CreateUrlRequest::from_inputs("https://x.test", "abc123"))
        .await
        .expect("create");

    assert_eq!(record.short_key, ShortKey::new("abc123"));
    assert_eq!(record.short_url, "http://localhost:8080/abc123");
}

#[tokio::test]
async fn create_collision_surfaces_remote_error_with_backend_message() {
    let (base, _backend) = spawn_backend().await.expect("backend");
    let client = ShortenerClient::new(base);
    let request = CreateUrlRequest::from_inputs("https://x.test", "abc123");
    client.create(&request).await.expect("first create");

    let err = client.create(&request).await.expect_err("collision");
    assert_eq!(
        err,
        ClientError::Remote {
            status: 409,
            message: "Conflict: key abc123 already exists".to_string(),
        }
    );
}

#[tokio::test]
async fn list_returns_records_in_backend_order() {
    let (base, backend) = spawn_backend().await.expect("backend");
    {
        let mut records = backend.records.lock().await;
        for key in ["zzz999", "abc123"] {
            records.push(ShortenedUrlRecord {
                short_key: ShortKey::new(key),
                long_url: format!("https://{key}.test"),
                short_url: format!("http://localhost:8080/{key}"),
                created_at: "2024-01-01T00:00:00Z".to_string(),
            });
        }
    }
    let client = ShortenerClient::new(base);

    let keys: Vec<String> = client
        .list()
        .await
        .expect("list")
        .into_iter()
        .map(|r| r.short_key.0)
        .collect();
    assert_eq!(keys, vec!["zzz999".to_string(), "abc123".to_string()]);
}

#[tokio::test]
async fn resolve_accepts_plain_text_body() {
    let (base, _backend) = spawn_backend().await.expect("backend");
    let client = ShortenerClient::new(base);
    client
        .create(&CreateUrlRequest::from_inputs("https://x.test/deep", "abc123"))
        .await
        .expect("create");

    let long_url = client
        .resolve(&ShortKey::new("abc123"))
        .await
        .expect("resolve");
    assert_eq!(long_url, "https://x.test/deep");
}

#[tokio::test]
async fn resolve_accepts_json_string_body() {
    let app = Router::new().route(
        "/api/shorten/:short_key",
        get(|| async { Json("https://json.test/target") }),
    );
    let client = ShortenerClient::new(spawn_raw_backend(app).await.expect("backend"));

    let long_url = client
        .resolve(&ShortKey::new("abc123"))
        .await
        .expect("resolve");
    assert_eq!(long_url, "https://json.test/target");
}

#[tokio::test]
async fn resolve_unknown_key_is_not_found() {
    let (base, _backend) = spawn_backend().await.expect("backend");
    let client = ShortenerClient::new(base);

    let err = client
        .resolve(&ShortKey::new("nope00"))
        .await
        .expect_err("missing key");
    assert!(err.is_not_found());
}

#[tokio::test]
async fn delete_removes_record_and_missing_key_is_remote_error() {
    let (base, backend) = spawn_backend().await.expect("backend");
    let client = ShortenerClient::new(base);
    client
        .create(&CreateUrlRequest::from_inputs("https://x.test", "abc123"))
        .await
        .expect("create");

    client
        .delete(&ShortKey::new("abc123"))
        .await
        .expect("delete");
    assert!(backend.records.lock().await.is_empty());

    let err = client
        .delete(&ShortKey::new("abc123"))
        .await
        .expect_err("second delete");
    assert_eq!(err.status(), Some(404));
}

#[tokio::test]
async fn keys_are_percent_encoded_as_a_single_path_segment() {
    let (base, backend) = spawn_backend().await.expect("backend");
    let client = ShortenerClient::new(base);
    backend.records.lock().await.push(ShortenedUrlRecord {
        short_key: ShortKey::new("a b/c"),
        long_url: "https://odd.test".to_string(),
        short_url: "http://localhost:8080/odd".to_string(),
        created_at: "2024-01-01T00:00:00Z".to_string(),
    });

    let long_url = client
        .resolve(&ShortKey::new("a b/c"))
        .await
        .expect("resolve");
    assert_eq!(long_url, "https://odd.test");
}

#[tokio::test]
async fn trailing_slash_on_base_url_is_tolerated() {
    let (base, _backend) = spawn_backend().await.expect("backend");
    let with_slash = Url::parse(&format!("{base}/")).expect("url");
    let client = ShortenerClient::new(with_slash);

    assert!(client.list().await.expect("list").is_empty());
}

#[tokio::test]
async fn malformed_list_body_is_transport_error() {
    let app = Router::new().route("/api/shorten/urls", get(|| async { "definitely not json" }));
    let client = ShortenerClient::new(spawn_raw_backend(app).await.expect("backend"));

    let err = client.list().await.expect_err("malformed");
    assert!(matches!(err, ClientError::Transport { .. }), "{err:?}");
}

#[tokio::test]
async fn server_error_without_body_uses_status_reason() {
    let app = Router::new().route(
        "/api/shorten/urls",
        get(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
    );
    let client = ShortenerClient::new(spawn_raw_backend(app).await.expect("backend"));

    let err = client.list().await.expect_err("server error");
    assert_eq!(
        err,
        ClientError::Remote {
            status: 500,
            message: "Internal Server Error".to_string(),
        }
    );
}

#[tokio::test]
async fn unreachable_host_is_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    let client = ShortenerClient::new(
        Url::parse(&format!("http://{addr}/api/shorten")).expect("url"),
    );

    let err = client.list().await.expect_err("unreachable");
    assert!(matches!(err, ClientError::Transport { .. }), "{err:?}");
    assert_eq!(err.status(), None);
}

#[test]
fn client_can_be_built_from_settings() {
    let client = ShortenerClient::from_settings(&AdminSettings::default()).expect("client");
    assert_eq!(client.base_url().as_str(), "http://localhost:8080/api/shorten");
    assert_eq!(
        client.endpoint("urls").expect("endpoint").as_str(),
        "http://localhost:8080/api/shorten/urls"
    );
}
