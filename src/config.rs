//! Gateway configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`). Parsing goes through
//! [`GatewayConfig::from_lookup`] so it can be exercised without touching
//! the process environment.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::domain::{DEFAULT_IMAGE_MARKER, MatchMode};
use crate::error::GatewayError;
use crate::service::HubSettings;

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

/// Top-level gateway configuration.
///
/// Loaded once at startup via [`GatewayConfig::from_env`].
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Socket address serving both REST and WebSocket (e.g. `0.0.0.0:8000`).
    pub listen_addr: SocketAddr,

    /// SQLite connection string.
    pub database_url: String,

    /// Maximum number of database connections in the pool.
    pub database_max_connections: u32,

    /// Timeout in seconds for acquiring a database connection.
    pub database_connect_timeout_secs: u64,

    /// Directory holding ingestion artifacts.
    pub artifact_dir: PathBuf,

    /// Recognition service endpoint.
    pub recognition_url: String,

    /// Recognition round-trip timeout in seconds (0 = no timeout).
    pub recognition_timeout_secs: u64,

    /// Capacity of the hub's broadcast queue.
    pub broadcast_queue_capacity: usize,

    /// Capacity of each connection's outbound queue.
    pub outbound_buffer: usize,

    /// Prefix marking an image submission.
    pub image_marker: String,

    /// How recognized plates are compared with the allow-list.
    pub plate_match_mode: MatchMode,

    /// REST request timeout in seconds.
    pub http_timeout_secs: u64,

    /// Log output format.
    pub log_format: LogFormat,
}

impl GatewayConfig {
    /// Loads configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// See [`GatewayConfig::from_lookup`].
    pub fn from_env() -> Result<Self, GatewayError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    ///
    /// Numeric keys fall back to their default when missing or invalid.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidRequest`] if `LISTEN_ADDR` or
    /// `PLATE_MATCH_MODE` is set but cannot be parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, GatewayError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let listen_addr: SocketAddr = lookup("LISTEN_ADDR")
            .unwrap_or_else(|| "0.0.0.0:8000".to_string())
            .parse()
            .map_err(|e| GatewayError::InvalidRequest(format!("LISTEN_ADDR: {e}")))?;

        let database_url = lookup("DATABASE_URL")
            .unwrap_or_else(|| "sqlite://plate_gateway.db?mode=rwc".to_string());

        let artifact_dir = lookup("ARTIFACT_DIR")
            .map_or_else(|| PathBuf::from("./results"), PathBuf::from);

        let recognition_url = lookup("RECOGNITION_URL")
            .unwrap_or_else(|| "http://localhost:8001/process-image/".to_string());

        let image_marker = lookup("IMAGE_MARKER")
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| DEFAULT_IMAGE_MARKER.to_string());

        let plate_match_mode = match lookup("PLATE_MATCH_MODE") {
            Some(mode) => mode
                .parse()
                .map_err(|e| GatewayError::InvalidRequest(format!("PLATE_MATCH_MODE: {e}")))?,
            None => MatchMode::default(),
        };

        let log_format = match lookup("LOG_FORMAT").as_deref() {
            Some("json") | Some("JSON") => LogFormat::Json,
            _ => LogFormat::Text,
        };

        Ok(Self {
            listen_addr,
            database_url,
            database_max_connections: parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 5),
            database_connect_timeout_secs: parse_or(&lookup, "DATABASE_CONNECT_TIMEOUT_SECS", 5),
            artifact_dir,
            recognition_url,
            recognition_timeout_secs: parse_or(&lookup, "RECOGNITION_TIMEOUT_SECS", 30),
            broadcast_queue_capacity: parse_or(&lookup, "BROADCAST_QUEUE_CAPACITY", 1024),
            outbound_buffer: parse_or(&lookup, "OUTBOUND_BUFFER", 256),
            image_marker,
            plate_match_mode,
            http_timeout_secs: parse_or(&lookup, "HTTP_TIMEOUT_SECS", 30),
            log_format,
        })
    }

    /// Returns the recognition timeout, or `None` when disabled.
    #[must_use]
    pub fn recognition_timeout(&self) -> Option<Duration> {
        (self.recognition_timeout_secs > 0)
            .then(|| Duration::from_secs(self.recognition_timeout_secs))
    }

    /// Returns the hub settings derived from this configuration.
    #[must_use]
    pub fn hub_settings(&self) -> HubSettings {
        HubSettings {
            queue_capacity: self.broadcast_queue_capacity,
            outbound_capacity: self.outbound_buffer,
            image_marker: self.image_marker.clone(),
        }
    }
}

/// Parses `key` as `T`, returning `default` on missing or invalid values.
fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> T
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
