use std::sync::Arc;
use std::time::Instant;

use anyhow::{anyhow, Result};

use super::algorithm::{AlgorithmFamily, AlgorithmId, DigestKind};
use super::cursor::{split_words, WordCursor};
use super::traits::{Advance, MatchEngine};

/// Runs every loaded candidate through one chosen digest and compares with the target.
#[derive(Default)]
pub struct ForwardEngine {
    names: Vec<String>,
    cursor: WordCursor,
    digest: Option<DigestKind>,
    target: Option<String>,
    started_at: Option<Instant>,
    word_match: Option<String>,
}

impl ForwardEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn digest(&self) -> Option<DigestKind> {
        self.digest
    }

    fn report(&self, matched: bool) -> Advance {
        Advance {
            matched,
            progress: self.cursor.position(),
            last_candidate: self.cursor.last().unwrap_or_default().to_string(),
            elapsed_seconds: self
                .started_at
                .map(|t| t.elapsed().as_secs_f64())
                .unwrap_or(0.0),
            exhausted: self.word_match.is_none() && self.cursor.is_exhausted(),
            matched_value: self.word_match.clone(),
            matched_algorithm: self
                .word_match
                .as_ref()
                .and(self.digest.map(DigestKind::id)),
        }
    }
}

impl MatchEngine for ForwardEngine {
    fn family(&self) -> AlgorithmFamily {
        AlgorithmFamily::Forward
    }

    fn load_word_list(&mut self, merged_text: &str, names: &[String]) -> usize {
        let words: Arc<[String]> = split_words(merged_text).into();
        self.cursor = WordCursor::new(words);
        self.names = names.to_vec();
        self.word_match = None;
        self.cursor.len()
    }

    fn has_source(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    fn word_count(&self) -> usize {
        self.cursor.len()
    }

    fn set_algorithm(&mut self, id: AlgorithmId) -> Result<()> {
        let kind = DigestKind::from_id(id)
            .ok_or_else(|| anyhow!("unsupported algorithm id {}", id))?;
        self.digest = Some(kind);
        Ok(())
    }

    fn set_target(&mut self, input: &str) -> Result<()> {
        let kind = self
            .digest
            .ok_or_else(|| anyhow!("algorithm must be set before the target"))?;
        self.target = Some(kind.normalize_target(input));
        self.word_match = None;
        self.cursor.rewind();
        self.started_at = Some(Instant::now());
        Ok(())
    }

    fn advance(&mut self, batch_size: usize) -> Result<Advance> {
        let (Some(kind), Some(target)) = (self.digest, self.target.as_deref()) else {
            return Err(anyhow!("advance called before a target was set"));
        };
        if self.word_match.is_some() {
            return Ok(self.report(true));
        }

        let remaining = self.cursor.remaining();
        let take = remaining.len().min(batch_size);
        let hit = remaining[..take]
            .iter()
            .position(|word| kind.encode(word) == target);
        let found = hit.map(|i| remaining[i].clone());
        self.cursor.forward(hit.map_or(take, |i| i + 1));

        let matched = found.is_some();
        if matched {
            self.word_match = found;
        }
        Ok(self.report(matched))
    }
}
