// Matching engines: the capability the session layer drives, and its two family implementations.

pub mod algorithm;
pub mod cursor;
pub mod derive;
pub mod forward;
pub mod traits;

pub use algorithm::{AlgorithmFamily, AlgorithmId, DigestKind};
pub use traits::{Advance, DefaultEngineFactory, EngineFactory, MatchEngine};
