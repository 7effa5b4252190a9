use std::sync::Arc;

/// Split raw word-list text into words: one per line, `\r\n` or `\n`, blank lines dropped.
pub fn split_words(text: &str) -> Vec<String> {
    text.lines()
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .filter(|word| !word.is_empty())
        .map(str::to_string)
        .collect()
}

/// Forward-only position over a loaded word list.
#[derive(Debug, Clone)]
pub struct WordCursor {
    words: Arc<[String]>,
    index: usize,
}

impl Default for WordCursor {
    fn default() -> Self {
        Self::new(Arc::from(Vec::new()))
    }
}

impl WordCursor {
    pub fn new(words: Arc<[String]>) -> Self {
        Self { words, index: 0 }
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn position(&self) -> usize {
        self.index
    }

    pub fn rewind(&mut self) {
        self.index = 0;
    }

    pub fn is_exhausted(&self) -> bool {
        self.index >= self.words.len()
    }

    /// Words not yet visited, without moving.
    pub fn remaining(&self) -> &[String] {
        &self.words[self.index.min(self.words.len())..]
    }

    /// Move forward by `count` words, clamped to the end.
    pub fn forward(&mut self, count: usize) {
        self.index = (self.index + count).min(self.words.len());
    }

    /// The most recently visited word.
    pub fn last(&self) -> Option<&str> {
        if self.index == 0 {
            None
        } else {
            self.words.get(self.index - 1).map(String::as_str)
        }
    }
}
