use serde::Deserialize;

/// Number of candidate probes a session performs per scheduling tick.
pub const DEFAULT_BATCH_SIZE: usize = 500;

/// Directory (relative to the asset base URL) that fetched word lists live under.
pub const ASSETS_DIR: &str = "assets";

/// Tick period used by the frame scheduler (~60 ticks per second).
pub const DEFAULT_FRAME_INTERVAL_MS: u64 = 16;

/// Upper bound for a single word-list fetch. There is no retry after it fires.
pub const FETCH_TIMEOUT_SECONDS: u64 = 30;

/// Algorithm id that asks the engine to derive the algorithm from the target.
pub const DERIVE_ALGORITHM_ID: u8 = 0;

/// Asset word lists stored in a legacy single-byte encoding, keyed by file stem.
pub const LEGACY_LATIN_SOURCES: &[&str] = &[
    "french", "german", "spanish", "italian", "portuguese", "dutch", "catalan",
];

/// Cyrillic asset word lists stored as windows-1251.
pub const LEGACY_CYRILLIC_SOURCES: &[&str] = &["russian", "ukrainian", "bulgarian"];

/// Log filter used when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info,hyper=warn,reqwest=warn";

/// Top-level configuration for the ripper client.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RipperConfig {
    /// Base URL that `assets/<name>` is resolved against.
    pub asset_base_url: String,
    /// Probes per session step.
    pub batch_size: usize,
    /// Tick period for the frame scheduler.
    pub frame_interval_ms: u64,
    /// Default tracing filter installed by [`RipperClient::new`](crate::api::client::RipperClient::new).
    pub log_filter: String,
}

impl Default for RipperConfig {
    fn default() -> Self {
        Self {
            asset_base_url: String::from("http://127.0.0.1:8080"),
            batch_size: DEFAULT_BATCH_SIZE,
            frame_interval_ms: DEFAULT_FRAME_INTERVAL_MS,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}
