// In-memory word-list cache keyed by source name, with encoding-aware decoding.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use encoding_rs::Encoding;
use parking_lot::RwLock;
use tracing::debug;

use crate::detect::encoding::{decode_strict, detect_encoding};
use crate::error::{Result, RipperError};
use crate::source::traits::SourceOrigin;

/// One cached word list. Immutable once stored.
#[derive(Debug)]
pub struct WordListSource {
    name: String,
    text: Arc<str>,
    encoding: &'static Encoding,
    origin: SourceOrigin,
}

impl WordListSource {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn encoding(&self) -> &'static Encoding {
        self.encoding
    }

    pub fn origin(&self) -> SourceOrigin {
        self.origin
    }
}

pub struct WordListStore {
    sources: RwLock<HashMap<String, Arc<WordListSource>>>,
    uploads: RwLock<Vec<String>>,
    word_count: AtomicUsize,
}

impl WordListStore {
    pub fn new() -> Self {
        Self {
            sources: RwLock::new(HashMap::new()),
            uploads: RwLock::new(Vec::new()),
            word_count: AtomicUsize::new(0),
        }
    }

    pub fn has(&self, name: &str) -> bool {
        self.sources.read().contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<Arc<WordListSource>> {
        self.sources.read().get(name).cloned()
    }

    /// Decode and store `bytes` under `name`.
    ///
    /// Re-adding a cached name is a no-op returning the existing entry, whatever
    /// the new bytes contain. Input that does not decode cleanly stores nothing.
    pub fn add(
        &self,
        name: &str,
        origin: SourceOrigin,
        bytes: &[u8],
    ) -> Result<Arc<WordListSource>> {
        if let Some(existing) = self.get(name) {
            return Ok(existing);
        }

        let encoding = detect_encoding(name, origin, bytes);
        let (_, bom_len) = Encoding::for_bom(bytes).unwrap_or((encoding, 0));
        let text = decode_strict(encoding, &bytes[bom_len..]).ok_or_else(|| {
            RipperError::source_load(name, format!("content is not valid {}", encoding.name()))
        })?;

        Ok(self.insert(name, origin, encoding, text))
    }

    /// Store already-decoded text. Same idempotence rule as [`add`](Self::add).
    pub fn add_text(&self, name: &str, origin: SourceOrigin, text: &str) -> Arc<WordListSource> {
        if let Some(existing) = self.get(name) {
            return existing;
        }
        self.insert(name, origin, encoding_rs::UTF_8, text.to_string())
    }

    fn insert(
        &self,
        name: &str,
        origin: SourceOrigin,
        encoding: &'static Encoding,
        text: String,
    ) -> Arc<WordListSource> {
        let mut sources = self.sources.write();
        // Double-check after acquiring the write lock.
        if let Some(existing) = sources.get(name) {
            return existing.clone();
        }
        let source = Arc::new(WordListSource {
            name: name.to_string(),
            text: Arc::from(text),
            encoding,
            origin,
        });
        sources.insert(name.to_string(), source.clone());
        debug!(
            "stored source {} ({} bytes, {})",
            name,
            source.text.len(),
            encoding.name()
        );
        source
    }

    /// Drop a source. Returns whether it was present.
    pub fn remove(&self, name: &str) -> bool {
        self.sources.write().remove(name).is_some()
    }

    /// Concatenate the selected sources in selection order, one word per line.
    ///
    /// Words repeated across sources are kept. Names not in the store are skipped.
    pub fn merge(&self, selection: &[String]) -> String {
        let sources = self.sources.read();
        let mut merged = String::new();
        for source in selection.iter().filter_map(|name| sources.get(name)) {
            let text = source.text.trim_end_matches(['\r', '\n']);
            if text.is_empty() {
                continue;
            }
            if !merged.is_empty() {
                merged.push('\n');
            }
            merged.push_str(text);
        }
        merged
    }

    /// Word count reported by the engine that last consumed a merged selection.
    pub fn word_count(&self) -> usize {
        self.word_count.load(Ordering::Relaxed)
    }

    pub fn record_word_count(&self, count: usize) {
        self.word_count.store(count, Ordering::Relaxed);
    }

    /// Uploaded source names in upload order.
    pub fn uploaded_names(&self) -> Vec<String> {
        self.uploads.read().clone()
    }

    pub fn push_upload(&self, name: &str) {
        let mut uploads = self.uploads.write();
        if !uploads.iter().any(|n| n == name) {
            uploads.push(name.to_string());
        }
    }

    /// Forget an uploaded source and its content.
    pub fn drop_upload(&self, name: &str) -> bool {
        let mut uploads = self.uploads.write();
        let before = uploads.len();
        uploads.retain(|n| n != name);
        let listed = uploads.len() != before;
        drop(uploads);
        let removed = self.remove(name);
        listed || removed
    }

    pub fn len(&self) -> usize {
        self.sources.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.read().is_empty()
    }
}

impl Default for WordListStore {
    fn default() -> Self {
        Self::new()
    }
}
