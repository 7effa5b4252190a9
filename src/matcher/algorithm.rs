use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use sha1::Sha1;
use sha2::{Digest, Sha256};

use crate::config::DERIVE_ALGORITHM_ID;

/// Numeric algorithm identifier as chosen by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AlgorithmId(pub u8);

impl AlgorithmId {
    pub const DERIVE: AlgorithmId = AlgorithmId(DERIVE_ALGORITHM_ID);

    pub fn family(self) -> AlgorithmFamily {
        if self == Self::DERIVE {
            AlgorithmFamily::Derive
        } else {
            AlgorithmFamily::Forward
        }
    }
}

impl From<u8> for AlgorithmId {
    fn from(id: u8) -> Self {
        AlgorithmId(id)
    }
}

impl fmt::Display for AlgorithmId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Coarse grouping that decides which engine instance serves an algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlgorithmFamily {
    /// Iterate candidates through one known algorithm.
    Forward,
    /// Iterate candidates through every supported algorithm to derive which one was used.
    Derive,
}

impl AlgorithmFamily {
    pub const ALL: [AlgorithmFamily; 2] = [AlgorithmFamily::Forward, AlgorithmFamily::Derive];

    pub fn index(self) -> usize {
        match self {
            AlgorithmFamily::Forward => 0,
            AlgorithmFamily::Derive => 1,
        }
    }
}

/// Concrete encoders understood by the reference engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DigestKind {
    Base64,
    Sha256,
    Sha1,
}

impl DigestKind {
    /// Probe order used when deriving the algorithm.
    pub const ALL: [DigestKind; 3] = [DigestKind::Base64, DigestKind::Sha256, DigestKind::Sha1];

    pub fn from_id(id: AlgorithmId) -> Option<DigestKind> {
        match id.0 {
            2 => Some(DigestKind::Base64),
            3 => Some(DigestKind::Sha256),
            5 => Some(DigestKind::Sha1),
            _ => None,
        }
    }

    pub fn id(self) -> AlgorithmId {
        match self {
            DigestKind::Base64 => AlgorithmId(2),
            DigestKind::Sha256 => AlgorithmId(3),
            DigestKind::Sha1 => AlgorithmId(5),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            DigestKind::Base64 => "Base64",
            DigestKind::Sha256 => "Sha-256",
            DigestKind::Sha1 => "Sha1",
        }
    }

    pub fn encode(self, word: &str) -> String {
        match self {
            DigestKind::Base64 => STANDARD.encode(word.as_bytes()),
            DigestKind::Sha256 => hex::encode(Sha256::digest(word.as_bytes())),
            DigestKind::Sha1 => hex::encode(Sha1::digest(word.as_bytes())),
        }
    }

    /// Bring a user-supplied target into the form `encode` produces.
    /// Hex digests are case-insensitive, Base64 is not.
    pub fn normalize_target(self, input: &str) -> String {
        let trimmed = input.trim();
        match self {
            DigestKind::Base64 => trimmed.to_string(),
            DigestKind::Sha256 | DigestKind::Sha1 => trimmed.to_lowercase(),
        }
    }
}
