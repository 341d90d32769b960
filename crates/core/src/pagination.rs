//! Offset pagination helpers shared by list endpoints.

use serde::Serialize;

/// Page size used when the caller does not ask for one.
pub const DEFAULT_LIMIT: i64 = 50;

/// Largest page size a caller may request.
pub const MAX_LIMIT: i64 = 200;

/// Clamp a user-provided limit to `[1, max]`, defaulting to `default`.
pub fn clamp_limit(limit: Option<i64>, default: i64, max: i64) -> i64 {
    limit.unwrap_or(default).max(1).min(max)
}

/// Clamp a user-provided offset to non-negative.
pub fn clamp_offset(offset: Option<i64>) -> i64 {
    offset.unwrap_or(0).max(0)
}

/// Pagination metadata returned alongside a page of results.
///
/// `has_more` is a heuristic: a full page is assumed to have a successor.
/// When the final page is exactly `limit` rows long it over-reports by one
/// empty page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageInfo {
    pub limit: i64,
    pub offset: i64,
    #[serde(rename = "hasMore")]
    pub has_more: bool,
}

impl PageInfo {
    pub fn new(limit: i64, offset: i64, returned: usize) -> Self {
        Self {
            limit,
            offset,
            has_more: i64::try_from(returned).map_or(false, |n| n == limit),
        }
    }
}
