//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod extract;
mod init;
mod serve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::{
    LogFormat, LogLevel, Settings, DEFAULT_BIND, DEFAULT_DATABASE_URL, DEFAULT_ORIGIN_CONFIG,
};
use crate::repository::{DbLogLevel, DEFAULT_SLOW_QUERY_MS};

#[derive(Debug, Parser)]
#[command(name = "collectionbox")]
#[command(about = "Collect supported URLs from pasted text")]
#[command(version)]
pub struct Cli {
    /// SQLite database file (a sqlite: prefix is accepted)
    #[arg(long, global = true, env = "DATABASE_URL", default_value = DEFAULT_DATABASE_URL)]
    database: String,

    /// Origin catalog JSON file
    #[arg(long, global = true, env = "ORIGIN_CONFIG", default_value = DEFAULT_ORIGIN_CONFIG)]
    origins: PathBuf,

    /// Log level: debug, info, warn or error; anything else means info (RUST_LOG overrides)
    #[arg(long, global = true, env = "LOG_LEVEL", default_value_t = LogLevel::Info)]
    log_level: LogLevel,

    /// Log output format
    #[arg(long, global = true, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Json)]
    log_format: LogFormat,

    /// Database diagnostics: silent, error, warn, info (or 1-4)
    #[arg(long, global = true, env = "DB_LOG_LEVEL", default_value_t = DbLogLevel::Warn)]
    db_log_level: DbLogLevel,

    /// Database operations slower than this many milliseconds are logged
    #[arg(
        long,
        global = true,
        env = "SLOW_QUERY_MS",
        default_value_t = DEFAULT_SLOW_QUERY_MS,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    slow_query_ms: u64,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Start the HTTP server (default)
    Serve {
        /// Address to bind to: PORT, HOST, or HOST:PORT
        #[arg(long, env = "BIND_ADDR", default_value = DEFAULT_BIND)]
        bind: String,
    },

    /// Create the database schema and check the origin catalog
    Init,

    /// Print the supported URLs found in TEXT as JSON lines
    Extract {
        /// Text to scan; multiple arguments are joined with spaces
        #[arg(required = true)]
        text: Vec<String>,
    },
}

impl Cli {
    /// Resolved settings for the selected command.
    pub fn settings(&self) -> Settings {
        Settings {
            database_url: self.database.clone(),
            origin_config: self.origins.clone(),
            log_level: self.log_level,
            log_format: self.log_format,
            db_log_level: self.db_log_level,
            slow_query_ms: self.slow_query_ms,
        }
    }
}

/// Dispatch the parsed command.
pub async fn run(cli: Cli, settings: Settings) -> anyhow::Result<()> {
    match cli.command {
        None => serve::cmd_serve(&settings, DEFAULT_BIND).await,
        Some(Commands::Serve { bind }) => serve::cmd_serve(&settings, &bind).await,
        Some(Commands::Init) => init::cmd_init(&settings).await,
        Some(Commands::Extract { text }) => extract::cmd_extract(&settings, &text),
    }
}
