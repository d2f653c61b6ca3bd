use std::path::PathBuf;

use docvault_core::documents::DEFAULT_MAX_UPLOAD_BYTES;
use docvault_core::pdf_split::DEFAULT_TEMP_TTL_MINS;

use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields except the JWT secret have defaults suitable for local
/// development. In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Seconds to wait for in-flight requests on shutdown (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// JWT token configuration (secret, expiry durations).
    pub jwt: JwtConfig,
    /// File storage settings.
    pub storage: StorageConfig,
}

/// Where files are kept and how large they may be.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Root directory of the local storage disk.
    pub root: PathBuf,
    /// Maximum size of a single uploaded PDF.
    pub max_upload_bytes: usize,
    /// Age after which PDF-split temp files are purged.
    pub split_temp_ttl_mins: i64,
}

impl StorageConfig {
    /// Request body limit: a split save carries roughly the source size
    /// twice over, plus form fields.
    pub fn request_body_limit(&self) -> usize {
        self.max_upload_bytes.saturating_mul(2) + 1024 * 1024
    }

    pub fn split_temp_ttl(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.split_temp_ttl_mins)
    }
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `SHUTDOWN_TIMEOUT_SECS`| `30`                       |
    /// | `STORAGE_ROOT`         | `storage`                  |
    /// | `MAX_UPLOAD_BYTES`     | `20971520`                 |
    /// | `SPLIT_TEMP_TTL_MINS`  | `60`                       |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        let storage = StorageConfig {
            root: std::env::var("STORAGE_ROOT")
                .unwrap_or_else(|_| "storage".into())
                .into(),
            max_upload_bytes: std::env::var("MAX_UPLOAD_BYTES")
                .map(|v| v.parse().expect("MAX_UPLOAD_BYTES must be a valid usize"))
                .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
            split_temp_ttl_mins: std::env::var("SPLIT_TEMP_TTL_MINS")
                .map(|v| v.parse().expect("SPLIT_TEMP_TTL_MINS must be a valid i64"))
                .unwrap_or(DEFAULT_TEMP_TTL_MINS),
        };

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            jwt: JwtConfig::from_env(),
            storage,
        }
    }
}
