use anyhow::Result;
use chatline_config::{LogFormat, LoggingConfig};
use tracing::Span;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber: `EnvFilter` from `RUST_LOG` plus a JSON or
/// human-readable fmt layer.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_new(&config.rust_log).or_else(|_| EnvFilter::try_new("info"))?;
    let registry = tracing_subscriber::registry().with(filter);

    match config.format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_current_span(true).with_span_list(false))
            .try_init()?,
        LogFormat::Pretty => registry.with(fmt::layer()).try_init()?,
    }

    Ok(())
}

/// Root span carrying the `component` field (`api` or `worker`).
pub fn component_span(component: &'static str) -> Span {
    tracing::info_span!("chatline", component = component)
}
