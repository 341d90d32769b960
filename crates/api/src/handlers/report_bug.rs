//! Handler for `POST /support/report-bug`: forwards a bug report to the
//! Monday.com board.

use axum::extract::{Multipart, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use feedback_core::feedback::{self, TYPE_BUG};
use feedback_core::ticket;
use feedback_crm::{BoardTarget, BugTicket, FileUpload, FileUploadResult};
use feedback_storage::attachments::MAX_ATTACHMENT_BYTES;

use crate::error::{AppError, AppResult};
use crate::middleware::locale::RequestLocale;
use crate::state::AppState;

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

#[derive(Debug, Serialize)]
pub struct BugReportResponse {
    pub success: bool,
    /// Monday item id.
    pub id: String,
    #[serde(rename = "ticketNumber")]
    pub ticket_number: String,
    pub message: String,
    #[serde(rename = "fileUploads")]
    pub file_uploads: Vec<FileUploadResult>,
}

/// Text fields and files collected from the multipart form.
#[derive(Debug, Default)]
struct BugReportForm {
    title: Option<String>,
    description: Option<String>,
    app: Option<String>,
    kind: Option<String>,
    location: Option<String>,
    name: Option<String>,
    email: Option<String>,
    ticket_number: Option<String>,
    files: Vec<FileUpload>,
}

async fn read_form(mut multipart: Multipart) -> AppResult<BugReportForm> {
    let mut form = BugReportForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or("").to_string();

        if let Some(file_name) = field.file_name().map(str::to_string) {
            let content_type = field
                .content_type()
                .unwrap_or(FALLBACK_CONTENT_TYPE)
                .to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(e.to_string()))?;
            form.files.push(FileUpload {
                name: file_name,
                content_type,
                bytes: bytes.to_vec(),
            });
            continue;
        }

        let text = field
            .text()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        let slot = match name.as_str() {
            "title" => &mut form.title,
            "description" => &mut form.description,
            "app_name" | "app" => &mut form.app,
            "type" => &mut form.kind,
            "location" => &mut form.location,
            "name" => &mut form.name,
            "email" => &mut form.email,
            "ticketNumber" => &mut form.ticket_number,
            _ => continue, // ignore unknown fields
        };
        *slot = Some(text);
    }

    Ok(form)
}

/// Submit a bug report as a new board item and attach its files.
///
/// Oversized files are reported as failed without being sent.
pub async fn report_bug(
    State(state): State<AppState>,
    locale: RequestLocale,
    multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let form = read_form(multipart).await?;

    feedback::require_fields(&[
        ("title", form.title.as_deref()),
        ("description", form.description.as_deref()),
    ])?;
    if let Some(title) = &form.title {
        feedback::validate_title(title.trim())?;
    }
    if let Some(description) = &form.description {
        feedback::validate_description(description)?;
    }

    let monday = &state.config.monday;
    let client = state
        .crm
        .as_ref()
        .ok_or_else(|| AppError::InternalError("MONDAY_API_KEY is not configured".into()))?;
    let board_id = monday
        .board_id
        .clone()
        .ok_or_else(|| AppError::InternalError("MONDAY_BOARD_ID is not configured".into()))?;
    let target = BoardTarget {
        board_id,
        description_column_id: monday.description_column_id.clone(),
        file_column_id: monday.file_column_id.clone(),
    };

    let kind = feedback::non_blank(form.kind.as_deref())
        .unwrap_or(TYPE_BUG)
        .to_string();
    let ticket_number = feedback::non_blank(form.ticket_number.as_deref())
        .map(str::to_string)
        .unwrap_or_else(|| ticket::generate(&kind));

    let (files, oversized): (Vec<_>, Vec<_>) = form
        .files
        .into_iter()
        .partition(|f| f.bytes.len() <= MAX_ATTACHMENT_BYTES);

    let bug = BugTicket {
        ticket_number: ticket_number.clone(),
        title: form.title.unwrap_or_default().trim().to_string(),
        description: form.description.unwrap_or_default(),
        app: form.app,
        kind: Some(kind),
        location: form.location,
        reporter_name: form.name,
        reporter_email: form.email,
    };

    let outcome = client.submit_bug_report(&target, &bug, files).await?;

    let mut file_uploads = outcome.file_uploads;
    file_uploads.extend(oversized.into_iter().map(|f| FileUploadResult {
        name: f.name,
        success: false,
        asset_id: None,
        error: Some(format!(
            "File exceeds maximum size of {MAX_ATTACHMENT_BYTES} bytes"
        )),
    }));

    tracing::info!(
        item_id = %outcome.item_id,
        ticket = %ticket_number,
        files = file_uploads.len(),
        failed = file_uploads.iter().filter(|f| !f.success).count(),
        "Bug report forwarded to Monday",
    );

    let t = locale.translator(&state);
    Ok(Json(BugReportResponse {
        success: true,
        id: outcome.item_id,
        message: t.t("bug_report.created", &[("ticket", ticket_number.as_str())]),
        ticket_number,
        file_uploads,
    }))
}
