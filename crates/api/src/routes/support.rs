use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{report_bug, support};
use crate::state::AppState;

/// Routes mounted at `/support`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            post(support::create_feedback).get(support::list_feedback),
        )
        .route("/init", post(support::init_schema))
        .route("/report-bug", post(report_bug::report_bug))
        .route(
            "/{id}",
            get(support::get_feedback)
                .patch(support::update_feedback)
                .delete(support::delete_feedback),
        )
}
