use std::sync::Once;

use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::config::DEFAULT_LOG_FILTER;

static INIT_TRACING: Once = Once::new();

/// Install the global fmt subscriber with the default filter.
pub fn init_tracing() -> bool {
    init_tracing_with(DEFAULT_LOG_FILTER)
}

/// Install the global fmt subscriber. `RUST_LOG` overrides `default_filter`.
///
/// Only the first call in a process does anything; it returns whether this crate's
/// subscriber became the global one (a host may already have installed its own).
pub fn init_tracing_with(default_filter: &str) -> bool {
    let mut installed = false;
    INIT_TRACING.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(default_filter))
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

        installed = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .try_init()
            .is_ok();

        if installed {
            info!("ripper tracing initialized filter={}", default_filter);
        }
    });
    if !installed {
        debug!("tracing already initialized");
    }
    installed
}
