//! Shared response envelope types for API handlers.
//!
//! Successful responses carry `"success": true`; errors are rendered by
//! [`crate::error::AppError`] with `"success": false`.

use feedback_core::pagination::PageInfo;
use serde::Serialize;

/// `{ "success": true, "data": T }` envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> DataResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// `{ "success": true, "message": ... }` for operations with no payload.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

/// A page of results with its pagination window.
#[derive(Debug, Serialize)]
pub struct ListResponse<T: Serialize> {
    pub success: bool,
    pub data: Vec<T>,
    pub count: usize,
    pub pagination: PageInfo,
}

impl<T: Serialize> ListResponse<T> {
    pub fn new(data: Vec<T>, limit: i64, offset: i64) -> Self {
        let pagination = PageInfo::new(limit, offset, data.len());
        Self {
            success: true,
            count: data.len(),
            data,
            pagination,
        }
    }
}
