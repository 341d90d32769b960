//! HTTP blob API backend.
//!
//! Objects are uploaded with `PUT {api_url}/{pathname}` and a bearer token.
//! The JSON response must carry the public `url` of the stored object.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::{check_pathname, BlobStore, StorageError, StoredBlob};

/// HTTP request timeout for a single upload.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Subset of the blob API's upload response.
#[derive(Debug, Deserialize)]
struct PutResponse {
    url: String,
    pathname: Option<String>,
}

/// Blob store client for an HTTP object API.
#[derive(Debug, Clone)]
pub struct HttpBlobStore {
    client: reqwest::Client,
    api_url: String,
    token: String,
}

impl HttpBlobStore {
    /// Create a client for `api_url` authenticated with `token`.
    pub fn new(api_url: impl Into<String>, token: impl Into<String>) -> Result<Self, StorageError> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self::with_client(client, api_url, token))
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(
        client: reqwest::Client,
        api_url: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    fn object_url(&self, pathname: &str) -> String {
        format!("{}/{}", self.api_url, pathname)
    }
}

#[async_trait]
impl BlobStore for HttpBlobStore {
    async fn put(
        &self,
        pathname: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<StoredBlob, StorageError> {
        check_pathname(pathname)?;
        let size = bytes.len() as u64;

        let response = self
            .client
            .put(self.object_url(pathname))
            .bearer_auth(&self.token)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .header("x-content-type", content_type)
            .body(bytes)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: PutResponse = response
            .json()
            .await
            .map_err(|e| StorageError::InvalidResponse(e.to_string()))?;

        Ok(StoredBlob {
            url: parsed.url,
            pathname: parsed.pathname.unwrap_or_else(|| pathname.to_string()),
            size,
            content_type: content_type.to_string(),
        })
    }

    fn backend(&self) -> &'static str {
        "http"
    }
}
