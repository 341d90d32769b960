//! HTTP-level tests for `POST /api/support/report-bug`.
//!
//! None of these reach Monday.com. Validation and configuration failures
//! return before any request; the remaining tests point the client at a
//! closed local port or at an in-process GraphQL stub.

mod common;

use std::sync::{Arc, Mutex};

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use common::{body_json, post_multipart};
use feedback_storage::attachments::MAX_ATTACHMENT_BYTES;
use serde_json::{json, Value};
use sqlx::PgPool;

const URI: &str = "/api/support/report-bug";

fn with_monday(key: Option<&str>, board: Option<&str>) -> feedback_api::config::ServerConfig {
    let mut config = common::test_config();
    config.monday.api_key = key.map(str::to_string);
    config.monday.board_id = board.map(str::to_string);
    config
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn missing_title_returns_400(pool: PgPool) {
    let app = common::build_test_app_with(pool, with_monday(Some("key"), Some("1")));
    let response = post_multipart(app, URI, &[("description", None, "it broke")]).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["error"], "Missing required fields: title");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn missing_api_key_returns_500_naming_it(pool: PgPool) {
    let app = common::build_test_app_with(pool, with_monday(None, Some("1")));
    let response = post_multipart(
        app,
        URI,
        &[("title", None, "Crash"), ("description", None, "it broke")],
    )
    .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("MONDAY_API_KEY"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn missing_board_id_returns_500_naming_it(pool: PgPool) {
    let app = common::build_test_app_with(pool, with_monday(Some("key"), None));
    let response = post_multipart(
        app,
        URI,
        &[("title", None, "Crash"), ("description", None, "it broke")],
    )
    .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("MONDAY_BOARD_ID"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unreachable_crm_returns_500_crm_error(pool: PgPool) {
    let app = common::build_test_app_with(pool, with_monday(Some("key"), Some("1")));
    let response = post_multipart(
        app,
        URI,
        &[
            ("title", None, "Crash"),
            ("description", None, "it broke"),
            ("files", Some("log.txt"), "stack trace"),
        ],
    )
    .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert_eq!(json["code"], "CRM_ERROR");
}

// ---------------------------------------------------------------------------
// Monday GraphQL stub
// ---------------------------------------------------------------------------

/// `create_item` request bodies seen by the stub.
type Seen = Arc<Mutex<Vec<Value>>>;

async fn stub_create_item(State(seen): State<Seen>, Json(body): Json<Value>) -> Json<Value> {
    seen.lock().unwrap().push(body);
    Json(json!({"data": {"create_item": {"id": "4242"}}}))
}

/// Accepts every upload except files whose name starts with `reject`.
async fn stub_add_file(mut multipart: Multipart) -> Json<Value> {
    let mut file_name = String::new();
    while let Some(field) = multipart.next_field().await.unwrap() {
        if let Some(name) = field.file_name() {
            file_name = name.to_string();
        }
        field.bytes().await.unwrap();
    }

    if file_name.starts_with("reject") {
        Json(json!({"errors": [{"message": "Unsupported file"}]}))
    } else {
        Json(json!({"data": {"add_file_to_column": {"id": "77"}}}))
    }
}

/// Serve the stub on an ephemeral port and return its base URL.
async fn spawn_monday_stub(seen: Seen) -> String {
    let router = Router::new()
        .route("/", post(stub_create_item))
        .route("/file", post(stub_add_file))
        .with_state(seen);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn created_item_reports_each_file_outcome(pool: PgPool) {
    let seen = Seen::default();
    let mut config = with_monday(Some("key"), Some("1"));
    config.monday.api_url = spawn_monday_stub(seen.clone()).await;
    let app = common::build_test_app_with(pool, config);

    let oversized = "x".repeat(MAX_ATTACHMENT_BYTES + 1);
    let response = post_multipart(
        app,
        URI,
        &[
            ("title", None, "Crash"),
            ("description", None, "it broke"),
            ("ticketNumber", None, "BUG-LOYW3V28-AB12"),
            ("files", Some("trace.log"), "stack trace"),
            ("files", Some("reject.exe"), "MZ"),
            ("files", Some("huge.bin"), oversized.as_str()),
        ],
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["id"], "4242");
    assert_eq!(json["ticketNumber"], "BUG-LOYW3V28-AB12");
    assert_eq!(json["message"], "Bug report BUG-LOYW3V28-AB12 submitted");

    let uploads = json["fileUploads"].as_array().unwrap();
    assert_eq!(uploads.len(), 3);

    assert_eq!(uploads[0]["name"], "trace.log");
    assert_eq!(uploads[0]["success"], true);
    assert_eq!(uploads[0]["asset_id"], "77");

    assert_eq!(uploads[1]["name"], "reject.exe");
    assert_eq!(uploads[1]["success"], false);
    assert_eq!(uploads[1]["error"], "Monday GraphQL error: Unsupported file");

    assert_eq!(uploads[2]["name"], "huge.bin");
    assert_eq!(uploads[2]["success"], false);
    assert!(uploads[2]["error"].as_str().unwrap().contains("maximum size"));

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0]["variables"]["boardId"], "1");
    assert_eq!(seen[0]["variables"]["itemName"], "[BUG-LOYW3V28-AB12] Crash");
    let columns: Value =
        serde_json::from_str(seen[0]["variables"]["columnValues"].as_str().unwrap()).unwrap();
    assert!(columns["long_text"]["text"].as_str().unwrap().ends_with("it broke"));
}
