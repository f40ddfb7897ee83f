//! tracing subscriber setup.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{LogFormat, LogLevel};

/// Value of the `app` field carried by every log line.
pub const APP_NAME: &str = "collectionbox";

/// Install the global subscriber. `RUST_LOG`, when set, overrides `level`.
pub fn init(level: LogLevel, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| level.as_str().into());
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_current_span(true).with_span_list(false))
            .init(),
        LogFormat::Text => registry.with(fmt::layer()).init(),
    }

    tracing::info!(app = APP_NAME, level = %level, format = %format, "logger initialized");
}

/// Root span for the process; events emitted inside it carry `app`.
pub fn app_span() -> tracing::Span {
    tracing::info_span!("app", app = APP_NAME)
}
