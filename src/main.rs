//! prayer-widget: home-screen prayer-times widget host.
//!
//! Run with:  `RUST_LOG=info prayer-widget`

use anyhow::Result;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // RUST_LOG controls verbosity (default: info).
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!("prayer-widget v{} starting", env!("CARGO_PKG_VERSION"));

    prayer_daemon::run().map_err(Into::into)
}
