use std::sync::Arc;
use std::time::Instant;

use anyhow::{anyhow, Result};

use super::algorithm::{AlgorithmFamily, AlgorithmId, DigestKind};
use super::cursor::{split_words, WordCursor};
use super::traits::{Advance, MatchEngine};

/// Walks the word list once per supported digest to find both the pre-image and
/// the algorithm that produced the target.
///
/// Progress counts probes across all rounds: `round * words + position`.
#[derive(Default)]
pub struct DeriveEngine {
    names: Vec<String>,
    cursor: WordCursor,
    round: usize,
    target: Option<String>,
    started_at: Option<Instant>,
    last_candidate: Option<String>,
    word_match: Option<(String, DigestKind)>,
}

impl DeriveEngine {
    pub fn new() -> Self {
        Self::default()
    }

    fn progress(&self) -> usize {
        self.round * self.cursor.len() + self.cursor.position()
    }

    fn rounds_done(&self) -> bool {
        self.round >= DigestKind::ALL.len()
    }

    fn reset_run(&mut self) {
        self.round = 0;
        self.cursor.rewind();
        self.last_candidate = None;
        self.word_match = None;
    }

    fn report(&self, matched: bool) -> Advance {
        Advance {
            matched,
            progress: self.progress(),
            last_candidate: self.last_candidate.clone().unwrap_or_default(),
            elapsed_seconds: self
                .started_at
                .map(|t| t.elapsed().as_secs_f64())
                .unwrap_or(0.0),
            exhausted: self.word_match.is_none() && self.rounds_done(),
            matched_value: self.word_match.as_ref().map(|(word, _)| word.clone()),
            matched_algorithm: self.word_match.as_ref().map(|(_, kind)| kind.id()),
        }
    }
}

impl MatchEngine for DeriveEngine {
    fn family(&self) -> AlgorithmFamily {
        AlgorithmFamily::Derive
    }

    fn load_word_list(&mut self, merged_text: &str, names: &[String]) -> usize {
        let words: Arc<[String]> = split_words(merged_text).into();
        self.cursor = WordCursor::new(words);
        self.names = names.to_vec();
        self.reset_run();
        self.cursor.len()
    }

    fn has_source(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    fn word_count(&self) -> usize {
        self.cursor.len()
    }

    fn set_algorithm(&mut self, id: AlgorithmId) -> Result<()> {
        if id != AlgorithmId::DERIVE {
            return Err(anyhow!("algorithm id {} is not served by the derive engine", id));
        }
        Ok(())
    }

    fn set_target(&mut self, input: &str) -> Result<()> {
        self.target = Some(input.trim().to_string());
        self.reset_run();
        self.started_at = Some(Instant::now());
        Ok(())
    }

    fn advance(&mut self, batch_size: usize) -> Result<Advance> {
        let Some(input) = self.target.clone() else {
            return Err(anyhow!("advance called before a target was set"));
        };
        if self.word_match.is_some() {
            return Ok(self.report(true));
        }

        let mut budget = batch_size;
        let mut matched = false;
        while !self.rounds_done() {
            if self.cursor.is_exhausted() {
                self.round += 1;
                self.cursor.rewind();
                continue;
            }
            if budget == 0 {
                break;
            }

            let kind = DigestKind::ALL[self.round];
            let target = kind.normalize_target(&input);
            let remaining = self.cursor.remaining();
            let take = remaining.len().min(budget);
            let hit = remaining[..take]
                .iter()
                .position(|word| kind.encode(word) == target);
            let probed = hit.map_or(take, |i| i + 1);
            self.last_candidate = Some(remaining[probed - 1].clone());
            let found = hit.map(|i| remaining[i].clone());

            self.cursor.forward(probed);
            budget -= probed;

            if let Some(word) = found {
                self.word_match = Some((word, kind));
                matched = true;
                break;
            }
        }

        Ok(self.report(matched))
    }
}
