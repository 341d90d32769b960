use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use feedback_core::i18n::Catalog;
use feedback_crm::MondayClient;
use feedback_storage::{BlobStore, HttpBlobStore, LocalBlobStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use feedback_api::config::{BlobConfig, ServerConfig};
use feedback_api::router::build_app_router;
use feedback_api::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    init_tracing();

    // --- Configuration ---
    let config = ServerConfig::from_env().context("Invalid server configuration")?;
    tracing::info!(
        host = %config.host,
        port = %config.port,
        insert_status_policy = %config.insert_status_policy,
        update_status_policy = %config.update_status_policy,
        "Loaded server configuration",
    );

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

    let pool = feedback_db::create_pool(&database_url, config.db_max_connections)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Database connection pool created");

    feedback_db::health_check(&pool)
        .await
        .context("Database health check failed")?;
    tracing::info!("Database health check passed");

    feedback_db::run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!("Database migrations applied");

    // --- Blob store ---
    let blob_store: Arc<dyn BlobStore> = match &config.blob {
        BlobConfig::Local {
            dir,
            public_base_url,
        } => Arc::new(LocalBlobStore::new(dir.clone(), public_base_url.clone())),
        BlobConfig::Http { api_url, token } => Arc::new(
            HttpBlobStore::new(api_url.clone(), token.clone())
                .context("Failed to build blob store client")?,
        ),
    };
    tracing::info!(backend = blob_store.backend(), "Blob store ready");

    // --- CRM ---
    let crm = match &config.monday.api_key {
        Some(key) => Some(
            MondayClient::new(config.monday.api_url.clone(), key.clone())
                .context("Failed to build Monday client")?,
        ),
        None => {
            tracing::warn!("MONDAY_API_KEY not set, bug reports will be rejected");
            None
        }
    };

    // --- i18n ---
    let i18n = Catalog::builtin(&config.default_locale).context("Failed to load translations")?;

    // --- App state ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        blob_store,
        i18n: Arc::new(i18n),
        crm,
    };

    // --- Router ---
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().context("Invalid HOST address")?,
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Graceful shutdown complete");
    Ok(())
}

/// Install the global subscriber. `LOG_FORMAT=json` selects JSON lines.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "feedback_api=debug,tower_http=debug".into());
    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
