#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use feedback_api::config::{BlobConfig, MondayConfig, ServerConfig};
use feedback_api::router::build_app_router;
use feedback_api::state::AppState;
use feedback_core::feedback::InvalidStatusPolicy;
use feedback_core::i18n::Catalog;
use feedback_crm::MondayClient;
use feedback_storage::LocalBlobStore;

pub const MULTIPART_BOUNDARY: &str = "feedback-test-boundary";

/// Shared scratch directory for locally stored attachments.
pub fn test_blob_dir() -> PathBuf {
    std::env::temp_dir().join("feedback-api-tests")
}

/// Build a test `ServerConfig` with safe defaults.
///
/// Any CORS origin, local blobs under [`test_blob_dir`], no CRM credentials.
pub fn test_config() -> ServerConfig {
    test_config_with_blob_dir(&test_blob_dir())
}

pub fn test_config_with_blob_dir(dir: &Path) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        db_max_connections: 5,
        cors_origins: vec!["*".to_string()],
        request_timeout_secs: 30,
        body_limit_bytes: 50 * 1024 * 1024,
        insert_status_policy: InvalidStatusPolicy::CoerceToDefault,
        update_status_policy: InvalidStatusPolicy::Reject,
        default_locale: "en".to_string(),
        blob: BlobConfig::Local {
            dir: dir.to_path_buf(),
            public_base_url: "http://localhost:3000/blobs".to_string(),
        },
        monday: MondayConfig {
            api_url: "http://127.0.0.1:9".to_string(),
            api_key: None,
            board_id: None,
            file_column_id: "files".to_string(),
            description_column_id: "long_text".to_string(),
        },
    }
}

/// Build the full application router using the given database pool and
/// [`test_config`].
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with(pool, test_config())
}

/// Build the router with an explicit configuration, wiring state the same
/// way `main.rs` does.
pub fn build_test_app_with(pool: PgPool, config: ServerConfig) -> Router {
    let blob_store = match &config.blob {
        BlobConfig::Local {
            dir,
            public_base_url,
        } => Arc::new(LocalBlobStore::new(dir.clone(), public_base_url.clone())),
        BlobConfig::Http { .. } => panic!("tests use the local blob store"),
    };
    let crm = config
        .monday
        .api_key
        .as_ref()
        .map(|key| MondayClient::new(config.monday.api_url.clone(), key.clone()).unwrap());

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        blob_store,
        i18n: Arc::new(Catalog::builtin(&config.default_locale).unwrap()),
        crm,
    };

    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

pub async fn delete(app: Router, uri: &str) -> Response<Body> {
    send(
        app,
        Request::builder()
            .method(Method::DELETE)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
}

async fn send_json(
    app: Router,
    method: Method,
    uri: &str,
    body: serde_json::Value,
) -> Response<Body> {
    send(
        app,
        Request::builder()
            .method(method)
            .uri(uri)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send_json(app, Method::POST, uri, body).await
}

pub async fn patch_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send_json(app, Method::PATCH, uri, body).await
}

/// A multipart part: `(field name, optional file name, content)`.
pub type Part<'a> = (&'a str, Option<&'a str>, &'a str);

pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, file_name, content) in parts {
        body.extend_from_slice(format!("--{MULTIPART_BOUNDARY}\r\n").as_bytes());
        match file_name {
            Some(file_name) => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n\
                     Content-Type: application/octet-stream\r\n\r\n"
                )
                .as_bytes(),
            ),
            None => body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
            ),
        }
        body.extend_from_slice(content.as_bytes());
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{MULTIPART_BOUNDARY}--\r\n").as_bytes());
    body
}

pub async fn post_multipart(app: Router, uri: &str, parts: &[Part<'_>]) -> Response<Body> {
    send(
        app,
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(
                CONTENT_TYPE,
                format!("multipart/form-data; boundary={MULTIPART_BOUNDARY}"),
            )
            .body(Body::from(multipart_body(parts)))
            .unwrap(),
    )
    .await
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
