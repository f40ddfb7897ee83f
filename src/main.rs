//! collectionbox - collect supported URLs from pasted text.

use clap::Parser;
use tracing::Instrument;

use collectionbox::cli::{self, Cli};
use collectionbox::logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (before anything else)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let settings = cli.settings();
    logging::init(settings.log_level, settings.log_format);

    cli::run(cli, settings)
        .instrument(logging::app_span())
        .await
}
