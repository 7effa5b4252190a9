use anyhow::Result;

use super::algorithm::{AlgorithmFamily, AlgorithmId};
use super::derive::DeriveEngine;
use super::forward::ForwardEngine;

/// Result of one bounded slice of probing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Advance {
    /// A candidate matched during this slice.
    pub matched: bool,
    /// Probes completed since the target was set.
    pub progress: usize,
    /// Most recently probed candidate, empty before the first probe.
    pub last_candidate: String,
    /// Seconds since the target was set, as measured by the engine.
    pub elapsed_seconds: f64,
    /// No candidates remain.
    pub exhausted: bool,
    /// The matching candidate, when `matched`.
    pub matched_value: Option<String>,
    /// Algorithm that produced the target, when `matched`.
    pub matched_algorithm: Option<AlgorithmId>,
}

/// The opaque computation unit a match session drives.
///
/// Each instance serves exactly one [`AlgorithmFamily`] and owns its own copy of
/// the loaded word list.
pub trait MatchEngine: Send {
    fn family(&self) -> AlgorithmFamily;

    /// Replace the loaded word list. Returns the number of words now loaded.
    fn load_word_list(&mut self, merged_text: &str, names: &[String]) -> usize;

    /// Whether `name` is part of the currently loaded selection.
    fn has_source(&self, name: &str) -> bool;

    fn word_count(&self) -> usize;

    /// Bind an algorithm variant. Rejects ids this engine does not understand.
    fn set_algorithm(&mut self, id: AlgorithmId) -> Result<()>;

    /// Set the value to search for and rewind the candidate cursor and clock.
    fn set_target(&mut self, input: &str) -> Result<()>;

    /// Probe at most `batch_size` candidates.
    fn advance(&mut self, batch_size: usize) -> Result<Advance>;
}

/// Builds engine instances for the pool.
pub trait EngineFactory: Send + Sync {
    fn create(&self, family: AlgorithmFamily) -> Box<dyn MatchEngine>;
}

/// Factory for the built-in digest engines.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultEngineFactory;

impl EngineFactory for DefaultEngineFactory {
    fn create(&self, family: AlgorithmFamily) -> Box<dyn MatchEngine> {
        match family {
            AlgorithmFamily::Forward => Box::new(ForwardEngine::new()),
            AlgorithmFamily::Derive => Box::new(DeriveEngine::new()),
        }
    }
}
