use catcher_core::{CatcherError, Result};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Directives used when `RUST_LOG` is unset.
pub const DEFAULT_DIRECTIVES: &str = "catcher_agent=info,catcher_core=info";

/// Build the filter from `RUST_LOG`, falling back to [`DEFAULT_DIRECTIVES`].
pub fn build_filter(rust_log: Option<&str>) -> Result<EnvFilter> {
    let directives = rust_log
        .filter(|d| !d.trim().is_empty())
        .unwrap_or(DEFAULT_DIRECTIVES);
    EnvFilter::builder()
        .parse(directives)
        .map_err(|e| CatcherError::Configuration(format!("Invalid log directive: {}", e)))
}

/// Install the global subscriber. A second call is a no-op.
pub fn init_logging(json: bool) -> Result<()> {
    let filter = build_filter(std::env::var("RUST_LOG").ok().as_deref())?;
    let registry = tracing_subscriber::registry().with(filter);

    let result = if json {
        registry.with(fmt::layer().json().with_target(true)).try_init()
    } else {
        registry.with(fmt::layer().with_target(true)).try_init()
    };

    if result.is_err() {
        tracing::debug!("Logging already initialized, skipping");
    }
    Ok(())
}
