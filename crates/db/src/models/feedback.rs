//! Feedback entity model and DTOs.

use feedback_core::types::{FeedbackId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `feedback` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Feedback {
    pub id: FeedbackId,
    pub app: String,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub title: String,
    pub status: String,
    pub data: serde_json::Value,
    pub notes: serde_json::Value,
    pub created_at: Timestamp,
    pub modified_at: Timestamp,
}

/// A fully resolved record ready for insertion.
///
/// Defaults (title, status, notes) are applied by the caller; the insert
/// binds every field as given.
#[derive(Debug, Clone)]
pub struct NewFeedback {
    /// Explicit id (a ticket number). `None` lets the database generate one.
    pub id: Option<FeedbackId>,
    pub app: String,
    pub kind: Option<String>,
    pub title: String,
    pub status: String,
    pub data: serde_json::Value,
    pub notes: Vec<serde_json::Value>,
}

/// Partial update. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateFeedback {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub title: Option<String>,
    pub status: Option<String>,
    pub data: Option<serde_json::Value>,
    pub notes: Option<Vec<serde_json::Value>>,
}

/// Query parameters for listing feedback.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedbackListParams {
    pub app: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub status: Option<String>,
    pub title: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Columns returned by an insert.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct FeedbackCreated {
    pub id: FeedbackId,
    pub created_at: Timestamp,
}

/// Columns returned by a partial update.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct FeedbackUpdated {
    pub id: FeedbackId,
    pub title: String,
    pub status: String,
    pub modified_at: Timestamp,
}
