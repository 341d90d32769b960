//! Filesystem-backed blob store.

use std::path::PathBuf;

use async_trait::async_trait;

use crate::{check_pathname, BlobStore, StorageError, StoredBlob};

/// Writes blobs under a root directory and serves them from a public base
/// URL (typically a static file route in front of the same directory).
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
    public_base_url: String,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn put(
        &self,
        pathname: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<StoredBlob, StorageError> {
        check_pathname(pathname)?;

        let path = self.root.join(pathname);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let size = bytes.len() as u64;
        tokio::fs::write(&path, bytes).await?;

        tracing::debug!(path = %path.display(), size, "Blob written");

        Ok(StoredBlob {
            url: format!("{}/{}", self.public_base_url, pathname),
            pathname: pathname.to_string(),
            size,
            content_type: content_type.to_string(),
        })
    }

    fn backend(&self) -> &'static str {
        "local"
    }
}
