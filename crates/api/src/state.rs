use std::sync::Arc;

use feedback_core::i18n::Catalog;
use feedback_crm::MondayClient;
use feedback_storage::BlobStore;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; everything heavy sits behind an `Arc` or is a pool.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: feedback_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Destination for feedback attachments.
    pub blob_store: Arc<dyn BlobStore>,
    /// Translation catalogs for response messages.
    pub i18n: Arc<Catalog>,
    /// Monday.com client, present when credentials are configured.
    pub crm: Option<MondayClient>,
}
