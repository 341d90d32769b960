//! Handlers for feedback records (`/support`).
//!
//! Create, list, fetch, partially update and delete records, plus the
//! idempotent schema bootstrap.

use std::time::Instant;

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use feedback_core::error::CoreError;
use feedback_core::feedback::{self, DEFAULT_TYPE};
use feedback_core::pagination::{clamp_limit, clamp_offset, DEFAULT_LIMIT, MAX_LIMIT};
use feedback_core::types::FeedbackId;
use feedback_db::models::feedback::{FeedbackListParams, NewFeedback, UpdateFeedback};
use feedback_db::repositories::FeedbackRepo;
use feedback_storage::attachments::{self, AttachmentInput};

use crate::error::{AppError, AppResult};
use crate::middleware::locale::RequestLocale;
use crate::middleware::request_meta::RequestMeta;
use crate::response::{DataResponse, ListResponse, MessageResponse};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// JSON body of `POST /support`.
///
/// Fields not named here are kept in `extra` and stored verbatim in `data`.
#[derive(Debug, Deserialize)]
pub struct SubmitFeedback {
    pub app_name: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub title: Option<String>,
    pub location: Option<Value>,
    pub user: Option<Value>,
    #[serde(default)]
    pub files: Vec<AttachmentInput>,
    pub status: Option<String>,
    #[serde(rename = "ticketNumber")]
    pub ticket_number: Option<String>,
    /// Client send time: epoch milliseconds, as a number or numeric string,
    /// or an RFC 3339 string.
    pub client_timestamp: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub success: bool,
    pub id: FeedbackId,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub message: String,
    pub processing_time_ms: i64,
    pub total_processing_time_ms: i64,
}

#[derive(Debug, Serialize)]
pub struct UpdatedResponse {
    pub success: bool,
    pub id: FeedbackId,
    pub title: String,
    pub status: String,
    pub modified_at: DateTime<Utc>,
    pub message: String,
}

/// Interpret a client timestamp. Numbers are epoch milliseconds.
pub fn parse_client_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .and_then(DateTime::from_timestamp_millis),
        Value::String(s) => {
            let s = s.trim();
            match s.parse::<i64>() {
                Ok(ms) => DateTime::from_timestamp_millis(ms),
                Err(_) => DateTime::parse_from_rfc3339(s)
                    .ok()
                    .map(|dt| dt.with_timezone(&Utc)),
            }
        }
        _ => None,
    }
}

fn elapsed_ms(started: Instant) -> i64 {
    i64::try_from(started.elapsed().as_millis()).unwrap_or(i64::MAX)
}

fn not_found(id: String) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Feedback",
        id,
    })
}

// ---------------------------------------------------------------------------
// POST /support/init
// ---------------------------------------------------------------------------

/// Create or upgrade the schema. Safe to call repeatedly.
pub async fn init_schema(
    State(state): State<AppState>,
    locale: RequestLocale,
) -> AppResult<impl IntoResponse> {
    feedback_db::ensure_schema(&state.pool).await?;
    tracing::info!("Feedback schema ensured");

    let t = locale.translator(&state);
    Ok(Json(MessageResponse::new(t.t("support.schema_ready", &[]))))
}

// ---------------------------------------------------------------------------
// POST /support
// ---------------------------------------------------------------------------

/// Submit a feedback record, uploading any attached files first.
pub async fn create_feedback(
    State(state): State<AppState>,
    locale: RequestLocale,
    meta: RequestMeta,
    Json(input): Json<SubmitFeedback>,
) -> AppResult<impl IntoResponse> {
    let started = Instant::now();
    let received_at = Utc::now();

    feedback::require_fields(&[
        ("app_name", input.app_name.as_deref()),
        ("description", input.description.as_deref()),
    ])?;
    let app = feedback::non_blank(input.app_name.as_deref())
        .unwrap_or_default()
        .to_string();
    let description = input.description.clone().unwrap_or_default();
    feedback::validate_description(&description)?;
    let title = feedback::title_or_default(input.title.as_deref());
    feedback::validate_title(&title)?;

    let allowed = FeedbackRepo::allowed_statuses(&state.pool).await?;
    let status = feedback::resolve_insert_status(
        state.config.insert_status_policy,
        input.status.as_deref(),
        &allowed,
    )?;
    if input.status.as_deref().is_some_and(|s| s.trim() != status) {
        tracing::warn!(requested = ?input.status, %status, "Submitted status replaced");
    }

    let files = attachments::upload_all(state.blob_store.as_ref(), &app, &input.files).await;
    let uploaded = files.iter().filter(|f| f.uploaded).count();

    let client_timestamp = input
        .client_timestamp
        .as_ref()
        .and_then(parse_client_timestamp);
    let ticket_number = feedback::non_blank(input.ticket_number.as_deref()).map(str::to_string);

    let mut data = input.extra;
    data.insert("description".into(), Value::String(description));
    data.insert("location".into(), input.location.unwrap_or(Value::Null));
    data.insert("user".into(), input.user.unwrap_or(Value::Null));
    data.insert("files".into(), json!(files));
    if let Some(ticket) = &ticket_number {
        data.insert("ticketNumber".into(), Value::String(ticket.clone()));
    }
    data.insert(
        "timing".into(),
        json!({
            "client_timestamp": client_timestamp,
            "server_received_at": received_at,
            "processing_time_ms": elapsed_ms(started),
        }),
    );
    data.insert("request".into(), json!(meta));

    let kind = feedback::non_blank(input.kind.as_deref())
        .unwrap_or(DEFAULT_TYPE)
        .to_string();

    let record = NewFeedback {
        id: ticket_number,
        app: app.clone(),
        kind: Some(kind),
        title: title.clone(),
        status,
        data: Value::Object(data),
        notes: Vec::new(),
    };
    let created = FeedbackRepo::create(&state.pool, &record).await?;

    tracing::info!(
        feedback_id = %created.id,
        app = %app,
        status = %record.status,
        files = files.len(),
        uploaded,
        "Feedback submitted",
    );

    let t = locale.translator(&state);
    let message = if uploaded > 0 {
        t.t(
            "support.created_with_files",
            &[("count", uploaded.to_string().as_str())],
        )
    } else {
        t.t("support.created", &[])
    };

    let processing_time_ms = elapsed_ms(started);
    let total_processing_time_ms = client_timestamp
        .map(|ts| (Utc::now() - ts).num_milliseconds())
        .unwrap_or(processing_time_ms);

    Ok(Json(CreatedResponse {
        success: true,
        id: created.id,
        title,
        created_at: created.created_at,
        message,
        processing_time_ms,
        total_processing_time_ms,
    }))
}

// ---------------------------------------------------------------------------
// GET /support
// ---------------------------------------------------------------------------

/// List records with optional `app`, `type`, `status` and `title` filters.
pub async fn list_feedback(
    State(state): State<AppState>,
    Query(params): Query<FeedbackListParams>,
) -> AppResult<impl IntoResponse> {
    let limit = clamp_limit(params.limit, DEFAULT_LIMIT, MAX_LIMIT);
    let offset = clamp_offset(params.offset);

    let records = FeedbackRepo::list(&state.pool, &params, limit, offset).await?;

    Ok(Json(ListResponse::new(records, limit, offset)))
}

// ---------------------------------------------------------------------------
// GET /support/{id}
// ---------------------------------------------------------------------------

pub async fn get_feedback(
    State(state): State<AppState>,
    Path(id): Path<FeedbackId>,
) -> AppResult<impl IntoResponse> {
    let record = FeedbackRepo::find_by_id(&state.pool, &id)
        .await?
        .ok_or_else(|| not_found(id))?;

    Ok(Json(DataResponse::new(record)))
}

// ---------------------------------------------------------------------------
// PATCH /support/{id}
// ---------------------------------------------------------------------------

/// Partially update a record.
///
/// The record must exist, and a supplied status is checked against the live
/// status set under the configured update policy before anything is written.
pub async fn update_feedback(
    State(state): State<AppState>,
    locale: RequestLocale,
    Path(id): Path<FeedbackId>,
    Json(mut input): Json<UpdateFeedback>,
) -> AppResult<impl IntoResponse> {
    if !FeedbackRepo::exists(&state.pool, &id).await? {
        return Err(not_found(id));
    }

    if let Some(title) = input.title.take() {
        let title = feedback::title_or_default(Some(&title));
        feedback::validate_title(&title)?;
        input.title = Some(title);
    }

    if let Some(candidate) = input.status.take() {
        let allowed = FeedbackRepo::allowed_statuses(&state.pool).await?;
        let status = feedback::apply_status_policy(
            state.config.update_status_policy,
            candidate.trim(),
            &allowed,
        )?;
        input.status = Some(status);
    }

    let updated = FeedbackRepo::update(&state.pool, &id, &input)
        .await?
        .ok_or_else(|| not_found(id.clone()))?;

    tracing::info!(
        feedback_id = %updated.id,
        status = %updated.status,
        "Feedback updated",
    );

    let t = locale.translator(&state);
    Ok(Json(UpdatedResponse {
        success: true,
        message: t.t("support.updated", &[("id", updated.id.as_str())]),
        id: updated.id,
        title: updated.title,
        status: updated.status,
        modified_at: updated.modified_at,
    }))
}

// ---------------------------------------------------------------------------
// DELETE /support/{id}
// ---------------------------------------------------------------------------

pub async fn delete_feedback(
    State(state): State<AppState>,
    locale: RequestLocale,
    Path(id): Path<FeedbackId>,
) -> AppResult<impl IntoResponse> {
    if !FeedbackRepo::delete(&state.pool, &id).await? {
        return Err(not_found(id));
    }

    tracing::info!(feedback_id = %id, "Feedback deleted");

    let t = locale.translator(&state);
    Ok(Json(MessageResponse::new(t.t("support.deleted", &[("id", id.as_str())]))))
}
