//! Base64 attachment decoding and sequential upload.
//!
//! Each attachment is handled independently: a decode or upload failure is
//! recorded in that attachment's descriptor and the remaining files are
//! still processed.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::{attachment_pathname, BlobStore};

/// Largest decoded attachment accepted (10 MiB).
pub const MAX_ATTACHMENT_BYTES: usize = 10 * 1024 * 1024;

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// One element of a submission's `files` array.
#[derive(Debug, Clone, Deserialize)]
pub struct AttachmentInput {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type", default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
    /// Base64 payload, optionally as a `data:<mime>;base64,` URL.
    #[serde(alias = "content", alias = "base64", default)]
    pub data: Option<String>,
}

/// Outcome for one attachment, stored in the record's `data.files`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttachmentDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub content_type: String,
    pub uploaded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pathname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AttachmentDescriptor {
    fn failed(name: String, content_type: String, error: String) -> Self {
        Self {
            name,
            content_type,
            uploaded: false,
            size: None,
            url: None,
            pathname: None,
            error: Some(error),
        }
    }
}

/// Split an optional `data:` URL prefix off a base64 payload.
///
/// Returns the MIME type from the prefix, if any, and the bare base64 text.
pub fn split_data_url(payload: &str) -> (Option<&str>, &str) {
    let payload = payload.trim();
    match payload.strip_prefix("data:") {
        Some(rest) => match rest.split_once(',') {
            Some((meta, body)) => {
                let mime = meta.split(';').next().filter(|m| !m.is_empty());
                (mime, body)
            }
            None => (None, payload),
        },
        None => (None, payload),
    }
}

/// Decode a base64 attachment payload, enforcing [`MAX_ATTACHMENT_BYTES`].
pub fn decode_payload(payload: &str) -> Result<Vec<u8>, String> {
    let (_, body) = split_data_url(payload);
    let compact: String = body.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    if compact.len() / 4 * 3 > MAX_ATTACHMENT_BYTES + 3 {
        return Err(format!(
            "Attachment exceeds maximum size of {MAX_ATTACHMENT_BYTES} bytes"
        ));
    }
    let bytes = STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| format!("Invalid base64 data: {e}"))?;
    if bytes.len() > MAX_ATTACHMENT_BYTES {
        return Err(format!(
            "Attachment exceeds maximum size of {MAX_ATTACHMENT_BYTES} bytes"
        ));
    }
    Ok(bytes)
}

/// Decode and upload every attachment in order.
///
/// Always returns one descriptor per input, in input order.
pub async fn upload_all(
    store: &dyn BlobStore,
    app: &str,
    files: &[AttachmentInput],
) -> Vec<AttachmentDescriptor> {
    let mut results = Vec::with_capacity(files.len());

    for (index, file) in files.iter().enumerate() {
        let name = file
            .name
            .clone()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| format!("attachment-{}", index + 1));
        let data_url_type = file.data.as_deref().and_then(|d| split_data_url(d).0);
        let content_type = file
            .content_type
            .clone()
            .filter(|t| !t.trim().is_empty())
            .or_else(|| data_url_type.map(str::to_string))
            .unwrap_or_else(|| FALLBACK_CONTENT_TYPE.to_string());

        let Some(payload) = file.data.as_deref() else {
            results.push(AttachmentDescriptor::failed(
                name,
                content_type,
                "Missing file data".to_string(),
            ));
            continue;
        };

        let bytes = match decode_payload(payload) {
            Ok(bytes) => bytes,
            Err(error) => {
                tracing::warn!(file = %name, %error, "Attachment rejected");
                results.push(AttachmentDescriptor::failed(name, content_type, error));
                continue;
            }
        };

        let pathname = attachment_pathname(app, chrono::Utc::now(), index, &name);
        match store.put(&pathname, bytes, &content_type).await {
            Ok(blob) => {
                tracing::info!(
                    file = %name,
                    size = blob.size,
                    backend = store.backend(),
                    "Attachment uploaded",
                );
                results.push(AttachmentDescriptor {
                    name,
                    content_type,
                    uploaded: true,
                    size: Some(blob.size),
                    url: Some(blob.url),
                    pathname: Some(blob.pathname),
                    error: None,
                });
            }
            Err(e) => {
                tracing::error!(file = %name, error = %e, "Attachment upload failed");
                results.push(AttachmentDescriptor::failed(name, content_type, e.to_string()));
            }
        }
    }

    results
}
