use std::path::PathBuf;

use axum::http::HeaderValue;
use feedback_core::feedback::InvalidStatusPolicy;
use feedback_core::i18n::DEFAULT_LOCALE;

/// Configuration problems detected at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{key} must be {expected}, got '{value}'")]
    Invalid {
        key: &'static str,
        expected: &'static str,
        value: String,
    },

    #[error("{0} must be set")]
    Missing(&'static str),
}

/// Where attachment bytes are stored.
#[derive(Debug, Clone)]
pub enum BlobConfig {
    /// Files under a local directory, served back at `public_base_url`.
    Local {
        dir: PathBuf,
        public_base_url: String,
    },
    /// An HTTP blob API authenticated with a bearer token.
    Http { api_url: String, token: String },
}

/// Monday.com credentials and board layout. Credentials are optional at
/// startup; the bug-report endpoint fails without them.
#[derive(Debug, Clone)]
pub struct MondayConfig {
    pub api_url: String,
    pub api_key: Option<String>,
    pub board_id: Option<String>,
    pub file_column_id: String,
    pub description_column_id: String,
}

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Maximum pooled database connections (default: `10`).
    pub db_max_connections: u32,
    /// Allowed CORS origins from comma-separated `CORS_ORIGINS`; `*` allows any.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Maximum request body size in bytes (default: 50 MiB).
    pub body_limit_bytes: usize,
    /// Handling of unknown statuses on create (default: coerce).
    pub insert_status_policy: InvalidStatusPolicy,
    /// Handling of unknown statuses on update (default: reject).
    pub update_status_policy: InvalidStatusPolicy,
    /// Fallback locale for messages (default: `en`).
    pub default_locale: String,
    pub blob: BlobConfig,
    pub monday: MondayConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                        | Default                        |
    /// |--------------------------------|--------------------------------|
    /// | `HOST`                         | `0.0.0.0`                      |
    /// | `PORT`                         | `3000`                         |
    /// | `DB_MAX_CONNECTIONS`           | `10`                           |
    /// | `CORS_ORIGINS`                 | `*`                            |
    /// | `REQUEST_TIMEOUT_SECS`         | `30`                           |
    /// | `BODY_LIMIT_BYTES`             | `52428800`                     |
    /// | `INSERT_STATUS_POLICY`         | `coerce`                       |
    /// | `UPDATE_STATUS_POLICY`         | `reject`                       |
    /// | `DEFAULT_LOCALE`               | `en`                           |
    /// | `BLOB_STORE`                   | `local`                        |
    /// | `BLOB_LOCAL_DIR`               | `storage/blobs`                |
    /// | `BLOB_PUBLIC_BASE_URL`         | `http://localhost:3000/blobs`  |
    /// | `BLOB_API_URL`                 | required for `http`            |
    /// | `BLOB_READ_WRITE_TOKEN`        | required for `http`            |
    /// | `MONDAY_API_URL`               | `https://api.monday.com/v2`    |
    /// | `MONDAY_API_KEY`               | unset                          |
    /// | `MONDAY_BOARD_ID`              | unset                          |
    /// | `MONDAY_FILE_COLUMN_ID`        | `files`                        |
    /// | `MONDAY_DESCRIPTION_COLUMN_ID` | `long_text`                    |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };
        let optional = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let host = var("HOST", "0.0.0.0");
        let port = parse_number("PORT", &var("PORT", "3000"))?;
        let db_max_connections =
            parse_number("DB_MAX_CONNECTIONS", &var("DB_MAX_CONNECTIONS", "10"))?;
        let request_timeout_secs =
            parse_number("REQUEST_TIMEOUT_SECS", &var("REQUEST_TIMEOUT_SECS", "30"))?;
        let body_limit_bytes =
            parse_number("BODY_LIMIT_BYTES", &var("BODY_LIMIT_BYTES", "52428800"))?;

        let cors_origins: Vec<String> = var("CORS_ORIGINS", "*")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        for origin in &cors_origins {
            if origin != "*" && origin.parse::<HeaderValue>().is_err() {
                return Err(invalid("CORS_ORIGINS", "a list of valid origins", origin));
            }
        }

        let insert_status_policy = parse_policy(
            "INSERT_STATUS_POLICY",
            &var("INSERT_STATUS_POLICY", "coerce"),
        )?;
        let update_status_policy = parse_policy(
            "UPDATE_STATUS_POLICY",
            &var("UPDATE_STATUS_POLICY", "reject"),
        )?;

        let default_locale = var("DEFAULT_LOCALE", DEFAULT_LOCALE);

        let blob = match var("BLOB_STORE", "local").to_ascii_lowercase().as_str() {
            "local" => BlobConfig::Local {
                dir: PathBuf::from(var("BLOB_LOCAL_DIR", "storage/blobs")),
                public_base_url: var("BLOB_PUBLIC_BASE_URL", "http://localhost:3000/blobs"),
            },
            "http" => BlobConfig::Http {
                api_url: optional("BLOB_API_URL").ok_or(ConfigError::Missing("BLOB_API_URL"))?,
                token: optional("BLOB_READ_WRITE_TOKEN")
                    .ok_or(ConfigError::Missing("BLOB_READ_WRITE_TOKEN"))?,
            },
            other => return Err(invalid("BLOB_STORE", "'local' or 'http'", other)),
        };

        let monday = MondayConfig {
            api_url: var("MONDAY_API_URL", feedback_crm::client::DEFAULT_API_URL),
            api_key: optional("MONDAY_API_KEY"),
            board_id: optional("MONDAY_BOARD_ID"),
            file_column_id: var("MONDAY_FILE_COLUMN_ID", "files"),
            description_column_id: var("MONDAY_DESCRIPTION_COLUMN_ID", "long_text"),
        };

        Ok(Self {
            host,
            port,
            db_max_connections,
            cors_origins,
            request_timeout_secs,
            body_limit_bytes,
            insert_status_policy,
            update_status_policy,
            default_locale,
            blob,
            monday,
        })
    }

    /// Whether any origin is allowed.
    pub fn cors_allows_any(&self) -> bool {
        self.cors_origins.iter().any(|o| o == "*")
    }
}

fn invalid(key: &'static str, expected: &'static str, value: &str) -> ConfigError {
    ConfigError::Invalid {
        key,
        expected,
        value: value.to_string(),
    }
}

fn parse_number<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value
        .parse()
        .map_err(|_| invalid(key, "a valid number", value))
}

fn parse_policy(key: &'static str, value: &str) -> Result<InvalidStatusPolicy, ConfigError> {
    value
        .parse()
        .map_err(|_| invalid(key, "'coerce' or 'reject'", value))
}
