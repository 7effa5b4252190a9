// Error kinds surfaced by the orchestration layer.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RipperError {
    /// A word-list source could not be fetched, read or decoded. The source stays absent.
    #[error("source '{name}' failed to load: {reason}")]
    SourceLoad { name: String, reason: String },

    /// Invalid algorithm, zero batch size, or an operation issued in the wrong session state.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The matching engine faulted while advancing. Fatal to the current session only.
    #[error("engine error: {0}")]
    Engine(String),
}

impl RipperError {
    pub fn source_load(name: &str, err: impl std::fmt::Display) -> Self {
        RipperError::SourceLoad {
            name: name.to_string(),
            reason: err.to_string(),
        }
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        RipperError::Configuration(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, RipperError>;
