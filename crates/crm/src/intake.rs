//! Bug-report intake: one Monday item per report, then its attachments.

use serde::Serialize;
use serde_json::{json, Value};

use crate::client::MondayClient;

/// Board and column ids an intake writes to.
#[derive(Debug, Clone)]
pub struct BoardTarget {
    pub board_id: String,
    pub description_column_id: String,
    pub file_column_id: String,
}

/// A bug report as received from the form.
#[derive(Debug, Clone, Default)]
pub struct BugTicket {
    pub ticket_number: String,
    pub title: String,
    pub description: String,
    pub app: Option<String>,
    pub kind: Option<String>,
    pub location: Option<String>,
    pub reporter_name: Option<String>,
    pub reporter_email: Option<String>,
}

impl BugTicket {
    /// Item name shown on the board.
    pub fn item_name(&self) -> String {
        format!("[{}] {}", self.ticket_number, self.title)
    }

    /// Long-text body: labelled context lines, a blank line, the
    /// description.
    pub fn body(&self) -> String {
        let mut lines = vec![format!("Ticket: {}", self.ticket_number)];
        let optional = [
            ("App", &self.app),
            ("Type", &self.kind),
            ("Location", &self.location),
            ("Reporter", &self.reporter_name),
            ("Email", &self.reporter_email),
        ];
        for (label, value) in optional {
            if let Some(v) = value.as_deref().filter(|v| !v.trim().is_empty()) {
                lines.push(format!("{label}: {v}"));
            }
        }
        lines.push(String::new());
        lines.push(self.description.clone());
        lines.join("\n")
    }

    /// Column values for `create_item`.
    pub fn column_values(&self, description_column_id: &str) -> Value {
        json!({ description_column_id: { "text": self.body() } })
    }
}

/// A file to attach to the created item.
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Per-file outcome reported back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileUploadResult {
    pub name: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Result of a completed intake.
#[derive(Debug, Clone, Serialize)]
pub struct IntakeOutcome {
    pub item_id: String,
    pub file_uploads: Vec<FileUploadResult>,
}

impl MondayClient {
    /// Create the board item for `ticket`, then attach `files` one by one.
    ///
    /// Failing to create the item is an error. File failures are recorded
    /// per file and never abort the intake.
    pub async fn submit_bug_report(
        &self,
        target: &BoardTarget,
        ticket: &BugTicket,
        files: Vec<FileUpload>,
    ) -> Result<IntakeOutcome, crate::CrmError> {
        let item_id = self
            .create_item(
                &target.board_id,
                &ticket.item_name(),
                &ticket.column_values(&target.description_column_id),
            )
            .await?;

        tracing::info!(
            item_id = %item_id,
            ticket = %ticket.ticket_number,
            files = files.len(),
            "Monday item created",
        );

        let mut file_uploads = Vec::with_capacity(files.len());
        for file in files {
            let name = file.name.clone();
            let result = self
                .add_file_to_column(
                    &item_id,
                    &target.file_column_id,
                    &file.name,
                    &file.content_type,
                    file.bytes,
                )
                .await;

            file_uploads.push(match result {
                Ok(asset_id) => FileUploadResult {
                    name,
                    success: true,
                    asset_id: Some(asset_id),
                    error: None,
                },
                Err(e) => {
                    tracing::warn!(item_id = %item_id, file = %name, error = %e, "Monday file upload failed");
                    FileUploadResult {
                        name,
                        success: false,
                        asset_id: None,
                        error: Some(e.to_string()),
                    }
                }
            });
        }

        Ok(IntakeOutcome {
            item_id,
            file_uploads,
        })
    }
}
