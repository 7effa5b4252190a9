// Selection loader: fetches missing word lists concurrently and pushes the merged selection into the pool.

use std::sync::Arc;

use futures_util::future::join_all;
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use super::pool::EnginePool;
use super::store::WordListStore;
use crate::error::{Result, RipperError};
use crate::source::traits::{SourceOrigin, WordListFetcher};

/// Outcome of applying a selection.
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    /// Names pushed into the engines, checkbox names first, then uploads.
    pub selection: Vec<String>,
    /// Word count reported by the engine that consumed the selection.
    pub word_count: usize,
    /// Sources fetched by this call.
    pub fetched: Vec<String>,
    /// Sources that could not be loaded and were left out of the selection.
    pub failures: Vec<RipperError>,
}

impl LoadReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

pub struct SelectionLoader {
    store: Arc<WordListStore>,
    fetcher: Arc<dyn WordListFetcher>,
    pool: Arc<Mutex<EnginePool>>,
    /// Serializes {check-missing, fetch-all, merge, push}. Holds the last checkbox selection.
    load_lock: tokio::sync::Mutex<Vec<String>>,
}

impl SelectionLoader {
    pub fn new(
        store: Arc<WordListStore>,
        fetcher: Arc<dyn WordListFetcher>,
        pool: Arc<Mutex<EnginePool>>,
    ) -> Self {
        Self {
            store,
            fetcher,
            pool,
            load_lock: tokio::sync::Mutex::new(Vec::new()),
        }
    }

    /// Replace the checkbox selection and load it.
    ///
    /// Overlapping calls queue on the load lock; a later call sees sources cached by
    /// an earlier one and does not fetch them again.
    pub async fn select_sources(&self, names: &[String]) -> LoadReport {
        let mut checked = self.load_lock.lock().await;
        *checked = dedup(names.iter().cloned());
        self.apply(&checked).await
    }

    /// Store an uploaded file (always UTF-8) and re-apply the current selection.
    ///
    /// A file that does not decode, or whose name is already taken by a fetched
    /// source, is rejected and nothing changes.
    pub async fn upload(&self, name: &str, bytes: &[u8]) -> Result<LoadReport> {
        let checked = self.load_lock.lock().await;
        if let Some(existing) = self.store.get(name) {
            if existing.origin() != SourceOrigin::Uploaded {
                warn!("upload {} rejected: name is a fetched source", name);
                return Err(RipperError::configuration(format!(
                    "'{}' is already loaded as a fetched source",
                    name
                )));
            }
            debug!("upload {} already cached, keeping existing content", name);
        }
        self.store.add(name, SourceOrigin::Uploaded, bytes)?;
        self.store.push_upload(name);
        info!("uploaded source {} ({} bytes)", name, bytes.len());
        Ok(self.apply(&checked).await)
    }

    /// Forget an uploaded source and re-apply the current selection.
    pub async fn remove_upload(&self, name: &str) -> Result<LoadReport> {
        let checked = self.load_lock.lock().await;
        let is_upload = self
            .store
            .get(name)
            .is_some_and(|source| source.origin() == SourceOrigin::Uploaded);
        if !is_upload {
            return Err(RipperError::configuration(format!(
                "'{}' is not an uploaded source",
                name
            )));
        }
        self.store.drop_upload(name);
        info!("removed uploaded source {}", name);
        Ok(self.apply(&checked).await)
    }

    /// The critical section. Callers must hold `load_lock`.
    async fn apply(&self, checked: &[String]) -> LoadReport {
        let selection = dedup(
            checked
                .iter()
                .cloned()
                .chain(self.store.uploaded_names()),
        );

        let missing: Vec<String> = selection
            .iter()
            .filter(|name| !self.store.has(name))
            .cloned()
            .collect();

        if !missing.is_empty() {
            debug!("fetching {} missing sources: {:?}", missing.len(), missing);
        }
        let results = join_all(missing.iter().map(|name| async move {
            let result = self.fetcher.fetch(name).await;
            (name, result)
        }))
        .await;

        let mut fetched = Vec::new();
        let mut failures = Vec::new();
        for (name, result) in results {
            let added = match result {
                Ok(bytes) => self.store.add(name, SourceOrigin::Fetched, &bytes).map(|_| ()),
                Err(e) => Err(RipperError::source_load(name, e)),
            };
            match added {
                Ok(()) => fetched.push(name.clone()),
                Err(e) => {
                    warn!("source {} left out of selection: {}", name, e);
                    failures.push(e);
                }
            }
        }

        let present: Vec<String> = selection
            .into_iter()
            .filter(|name| self.store.has(name))
            .collect();
        let merged = self.store.merge(&present);
        let word_count = self.pool.lock().load_word_list(&merged, &present);
        self.store.record_word_count(word_count);

        info!(
            "selection loaded sources={:?} words={} fetched={} failed={}",
            present,
            word_count,
            fetched.len(),
            failures.len()
        );

        LoadReport {
            selection: present,
            word_count,
            fetched,
            failures,
        }
    }
}

/// Keep the first occurrence of each name, preserving order.
fn dedup(names: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for name in names {
        if !out.contains(&name) {
            out.push(name);
        }
    }
    out
}
