pub mod health;
pub mod support;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /support                     create (POST), list (GET)
/// /support/init                create or upgrade the schema (POST)
/// /support/report-bug          forward a bug report to Monday (POST, multipart)
/// /support/{id}                get, partial update (PATCH), delete
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/support", support::router())
}
