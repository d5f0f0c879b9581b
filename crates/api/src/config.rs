use std::path::PathBuf;

use crate::auth::jwt::JwtConfig;

/// Default body limit for the upload route. Larger than the 10 MiB document
/// limit so oversize files reach the handler and get a validation error.
const DEFAULT_UPLOAD_BODY_LIMIT_BYTES: usize = 32 * 1024 * 1024;

/// Server configuration loaded from environment variables.
///
/// All fields except the JWT secret have defaults suitable for local
/// development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    pub request_timeout_secs: u64,
    pub shutdown_timeout_secs: u64,
    pub jwt: JwtConfig,
    /// Root directory of the document store.
    pub document_storage_dir: PathBuf,
    pub upload_body_limit_bytes: usize,
    pub expiry_sweep_interval_secs: u64,
    pub document_reminder_interval_secs: u64,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                           | Default                 |
    /// |-----------------------------------|-------------------------|
    /// | `HOST`                            | `0.0.0.0`               |
    /// | `PORT`                            | `3000`                  |
    /// | `CORS_ORIGINS`                    | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`            | `30`                    |
    /// | `SHUTDOWN_TIMEOUT_SECS`           | `30`                    |
    /// | `DOCUMENT_STORAGE_DIR`            | `storage/documents`     |
    /// | `UPLOAD_BODY_LIMIT_BYTES`         | `33554432`              |
    /// | `EXPIRY_SWEEP_INTERVAL_SECS`      | `3600`                  |
    /// | `DOCUMENT_REMINDER_INTERVAL_SECS` | `86400`                 |
    ///
    /// JWT settings are read by [`JwtConfig::from_env`].
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

        let document_storage_dir = PathBuf::from(
            std::env::var("DOCUMENT_STORAGE_DIR").unwrap_or_else(|_| "storage/documents".into()),
        );

        let upload_body_limit_bytes: usize = std::env::var("UPLOAD_BODY_LIMIT_BYTES")
            .unwrap_or_else(|_| DEFAULT_UPLOAD_BODY_LIMIT_BYTES.to_string())
            .parse()
            .expect("UPLOAD_BODY_LIMIT_BYTES must be a valid usize");

        let expiry_sweep_interval_secs: u64 = std::env::var("EXPIRY_SWEEP_INTERVAL_SECS")
            .unwrap_or_else(|_| "3600".into())
            .parse()
            .expect("EXPIRY_SWEEP_INTERVAL_SECS must be a valid u64");

        let document_reminder_interval_secs: u64 =
            std::env::var("DOCUMENT_REMINDER_INTERVAL_SECS")
                .unwrap_or_else(|_| "86400".into())
                .parse()
                .expect("DOCUMENT_REMINDER_INTERVAL_SECS must be a valid u64");

        let jwt = JwtConfig::from_env();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            jwt,
            document_storage_dir,
            upload_body_limit_bytes,
            expiry_sweep_interval_secs,
            document_reminder_interval_secs,
        }
    }
}
