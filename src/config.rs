//! Runtime settings assembled from CLI flags and environment variables.

use std::convert::Infallible;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::Context;

use crate::origins::OriginCatalog;
use crate::repository::{DbContext, DbLogLevel, QueryLog, DEFAULT_SLOW_QUERY_MS};

/// Default database file, relative to the working directory.
pub const DEFAULT_DATABASE_URL: &str = "collectionbox.db";

/// Default origin catalog location.
pub const DEFAULT_ORIGIN_CONFIG: &str = "resource/origin.json";

/// Default listen address for `serve`.
pub const DEFAULT_BIND: &str = "0.0.0.0:8080";

/// Application log level (`LOG_LEVEL`).
///
/// Parsing never fails: unrecognised names fall back to `info`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl FromStr for LogLevel {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "debug" => LogLevel::Debug,
            "warn" | "warning" => LogLevel::Warn,
            "error" => LogLevel::Error,
            _ => LogLevel::Info,
        })
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Log output format (`LOG_FORMAT`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    #[default]
    Json,
    Text,
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LogFormat::Json => "json",
            LogFormat::Text => "text",
        })
    }
}

/// Resolved configuration handed to commands.
#[derive(Debug, Clone)]
pub struct Settings {
    /// SQLite database path; a `sqlite:` prefix is accepted.
    pub database_url: String,
    /// Origin catalog JSON file.
    pub origin_config: PathBuf,
    pub log_level: LogLevel,
    pub log_format: LogFormat,
    /// Store diagnostics verbosity.
    pub db_log_level: DbLogLevel,
    /// Store operations slower than this are logged as slow.
    pub slow_query_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            origin_config: PathBuf::from(DEFAULT_ORIGIN_CONFIG),
            log_level: LogLevel::default(),
            log_format: LogFormat::default(),
            db_log_level: DbLogLevel::default(),
            slow_query_ms: DEFAULT_SLOW_QUERY_MS,
        }
    }
}

impl Settings {
    pub fn query_log(&self) -> QueryLog {
        QueryLog::new(self.db_log_level, self.slow_query_ms)
    }

    /// Open the database and make sure the schema exists.
    pub async fn open_database(&self) -> anyhow::Result<DbContext> {
        DbContext::open(&self.database_url, self.query_log())
            .await
            .with_context(|| format!("failed to open database {}", self.database_url))
    }

    /// Load the origin catalog. Any failure is fatal for the caller.
    pub fn load_catalog(&self) -> anyhow::Result<Arc<OriginCatalog>> {
        let catalog = OriginCatalog::from_path(&self.origin_config).with_context(|| {
            format!(
                "failed to load origin catalog {}",
                self.origin_config.display()
            )
        })?;
        Ok(Arc::new(catalog))
    }
}
