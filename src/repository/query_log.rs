//! Timing and logging for store operations.
//!
//! Every repository call runs through [`QueryLog::observe`], which logs
//! failures, slow queries and (at the most verbose level) every query.

use std::fmt;
use std::future::Future;
use std::str::FromStr;
use std::time::{Duration, Instant};

use tracing::{error, info, warn};

use super::StoreError;

/// Default slow query threshold.
pub const DEFAULT_SLOW_QUERY_MS: u64 = 200;

/// Verbosity of store diagnostics, least to most verbose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum DbLogLevel {
    Silent,
    Error,
    #[default]
    Warn,
    Info,
}

impl FromStr for DbLogLevel {
    type Err = String;

    /// Accepts level names or their numeric aliases 1-4.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "silent" | "1" => Ok(Self::Silent),
            "error" | "2" => Ok(Self::Error),
            "warn" | "warning" | "3" => Ok(Self::Warn),
            "info" | "4" => Ok(Self::Info),
            other => Err(format!(
                "invalid db log level {other:?} (expected silent, error, warn, info or 1-4)"
            )),
        }
    }
}

impl fmt::Display for DbLogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Silent => "silent",
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct QueryLog {
    level: DbLogLevel,
    slow_threshold: Duration,
}

impl Default for QueryLog {
    fn default() -> Self {
        Self::new(DbLogLevel::default(), DEFAULT_SLOW_QUERY_MS)
    }
}

impl QueryLog {
    pub fn new(level: DbLogLevel, slow_query_ms: u64) -> Self {
        Self {
            level,
            slow_threshold: Duration::from_millis(slow_query_ms),
        }
    }

    /// No diagnostics at all.
    pub fn silent() -> Self {
        Self::new(DbLogLevel::Silent, DEFAULT_SLOW_QUERY_MS)
    }

    pub fn level(&self) -> DbLogLevel {
        self.level
    }

    pub fn slow_threshold(&self) -> Duration {
        self.slow_threshold
    }

    /// Run `query`, timing it and logging the outcome. `rows` reports how
    /// many rows a successful result touched.
    pub async fn observe<T, Q, R>(&self, op: &'static str, query: Q, rows: R) -> Result<T, StoreError>
    where
        Q: Future<Output = Result<T, StoreError>>,
        R: FnOnce(&T) -> usize,
    {
        let started = Instant::now();
        let result = query.await;
        let elapsed = started.elapsed();

        match &result {
            Ok(value) => self.succeeded(op, elapsed, rows(value)),
            Err(err) => self.failed(op, elapsed, err),
        }

        result
    }

    fn succeeded(&self, op: &str, elapsed: Duration, rows: usize) {
        let duration_ms = elapsed.as_millis() as u64;
        if elapsed > self.slow_threshold && self.level >= DbLogLevel::Warn {
            warn!(
                op,
                duration_ms,
                rows,
                threshold_ms = self.slow_threshold.as_millis() as u64,
                "db slow query"
            );
        } else if self.level >= DbLogLevel::Info {
            info!(op, duration_ms, rows, "db query");
        }
    }

    fn failed(&self, op: &str, elapsed: Duration, err: &StoreError) {
        let duration_ms = elapsed.as_millis() as u64;
        match err {
            // Unique conflicts drive the upsert path.
            StoreError::Conflict(_) => {
                if self.level >= DbLogLevel::Info {
                    info!(op, duration_ms, rows = 0, conflict = true, "db query");
                }
            }
            StoreError::Database(e) => {
                if self.level >= DbLogLevel::Error {
                    error!(op, duration_ms, error = %e, "db query error");
                }
            }
        }
    }
}
