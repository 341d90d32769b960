//! Blob storage for feedback attachments.
//!
//! [`BlobStore`] is the seam between request handling and wherever file
//! bytes end up. Two backends are provided: [`LocalBlobStore`] writes to a
//! directory, [`HttpBlobStore`] PUTs to an HTTP blob API.

pub mod attachments;
pub mod http;
pub mod local;

use async_trait::async_trait;
use serde::Serialize;

pub use http::HttpBlobStore;
pub use local::LocalBlobStore;

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Local filesystem failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The blob API returned a non-2xx status code.
    #[error("Blob API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// The blob API answered 2xx with a body we cannot use.
    #[error("Unexpected blob API response: {0}")]
    InvalidResponse(String),

    /// The pathname would escape the store or is empty.
    #[error("Invalid blob pathname '{0}'")]
    InvalidPath(String),
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// A stored object as reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredBlob {
    pub url: String,
    pub pathname: String,
    pub size: u64,
    #[serde(rename = "contentType")]
    pub content_type: String,
}

/// Write-only object storage.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `bytes` under `pathname`, overwriting any existing object.
    async fn put(
        &self,
        pathname: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<StoredBlob, StorageError>;

    /// Short backend name for logs.
    fn backend(&self) -> &'static str;
}

// ---------------------------------------------------------------------------
// Pathnames
// ---------------------------------------------------------------------------

/// Reduce a client-supplied file name to `[A-Za-z0-9._-]`.
///
/// Path separators and other characters become `-`; leading dots are
/// stripped so the result is never hidden or a parent reference. An empty
/// result becomes `file`.
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = base
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '-'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "file".to_string()
    } else {
        cleaned.to_string()
    }
}

/// Pathname for an attachment: `feedback/<app>/<millis>-<index>-<file name>`.
///
/// `index` is the file's position in its submission, so same-named files
/// uploaded within one millisecond still get distinct keys.
pub fn attachment_pathname(
    app: &str,
    now: chrono::DateTime<chrono::Utc>,
    index: usize,
    file_name: &str,
) -> String {
    format!(
        "feedback/{}/{}-{}-{}",
        sanitize_file_name(app),
        now.timestamp_millis(),
        index,
        sanitize_file_name(file_name)
    )
}

/// Validate a pathname: relative, non-empty, no `.`/`..` segments.
pub(crate) fn check_pathname(pathname: &str) -> Result<(), StorageError> {
    let valid = !pathname.is_empty()
        && !pathname.starts_with('/')
        && pathname
            .split('/')
            .all(|seg| !seg.is_empty() && seg != "." && seg != ".." && !seg.contains('\\'));
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidPath(pathname.to_string()))
    }
}
