use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "nodb=info";

/// Initialize tracing for hosts that do not install their own subscriber.
///
/// Honours `RUST_LOG`, falling back to `nodb=info`. Returns an error if a global
/// subscriber is already set.
pub fn init_tracing() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into()))
        .with(tracing_subscriber::fmt::layer())
        .try_init()?;

    tracing::debug!("NoDb tracing initialized");
    Ok(())
}
