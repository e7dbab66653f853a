//! Tracing setup for hosts embedding the editor core.

use anyhow::Result;
use once_cell::sync::OnceCell;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_LOG_FILTER: &str = "tabledit=info";
const VERBOSE_LOG_FILTER: &str = "tabledit=debug";

static INITIALIZED: OnceCell<()> = OnceCell::new();

/// Install a stderr fmt subscriber.
///
/// `RUST_LOG` wins over the built-in filter. Calling this more than once is
/// harmless; only the first call installs anything.
pub fn init_logging(verbose: bool) -> Result<()> {
    INITIALIZED
        .get_or_try_init(|| {
            let fallback = if verbose {
                VERBOSE_LOG_FILTER
            } else {
                DEFAULT_LOG_FILTER
            };
            let filter =
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .try_init()
                .map_err(|e| anyhow::anyhow!("Failed to install tracing subscriber: {}", e))
        })
        .map(|_| ())
}
