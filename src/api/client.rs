use std::sync::Arc;

use parking_lot::Mutex;
use tracing::info;

use super::telemetry::init_tracing_with;
use crate::config::RipperConfig;
use crate::engine::loader::{LoadReport, SelectionLoader};
use crate::engine::pool::EnginePool;
use crate::engine::scheduler::{FrameTicker, StepScheduler};
use crate::engine::session::{MatchSession, SessionStatus};
use crate::engine::store::WordListStore;
use crate::error::Result;
use crate::matcher::{AlgorithmId, DefaultEngineFactory, DigestKind, EngineFactory};
use crate::source::http_source::HttpSource;
use crate::source::traits::WordListFetcher;

/// One row of the digest table for a word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestRow {
    pub algorithm: AlgorithmId,
    pub name: &'static str,
    pub value: String,
}

/// Entry point for an interactive client: source selection, uploads and runs.
pub struct RipperClient {
    config: RipperConfig,
    store: Arc<WordListStore>,
    pool: Arc<Mutex<EnginePool>>,
    loader: SelectionLoader,
}

impl RipperClient {
    /// Client fetching assets over HTTP from `config.asset_base_url`, with the built-in engines.
    ///
    /// Also installs the tracing subscriber on first use.
    pub fn new(config: RipperConfig) -> Self {
        init_tracing_with(&config.log_filter);
        let fetcher = Arc::new(HttpSource::new(config.asset_base_url.clone()));
        Self::with_parts(config, fetcher, Arc::new(DefaultEngineFactory))
    }

    pub fn with_parts(
        config: RipperConfig,
        fetcher: Arc<dyn WordListFetcher>,
        factory: Arc<dyn EngineFactory>,
    ) -> Self {
        let store = Arc::new(WordListStore::new());
        let pool = Arc::new(Mutex::new(EnginePool::new(factory)));
        let loader = SelectionLoader::new(store.clone(), fetcher, pool.clone());
        Self {
            config,
            store,
            pool,
            loader,
        }
    }

    pub fn config(&self) -> &RipperConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<WordListStore> {
        &self.store
    }

    pub fn pool(&self) -> &Arc<Mutex<EnginePool>> {
        &self.pool
    }

    /// Apply a new checkbox selection. Missing sources are fetched first.
    pub async fn select_sources(&self, names: &[String]) -> LoadReport {
        self.loader.select_sources(names).await
    }

    pub async fn upload_source(&self, name: &str, bytes: &[u8]) -> Result<LoadReport> {
        self.loader.upload(name, bytes).await
    }

    pub async fn remove_upload(&self, name: &str) -> Result<LoadReport> {
        self.loader.remove_upload(name).await
    }

    pub fn word_count(&self) -> usize {
        self.store.word_count()
    }

    /// Start a run for `input` with the given algorithm id and return the running session.
    pub fn run(&self, input: &str, algorithm: impl Into<AlgorithmId>) -> Result<MatchSession> {
        let algorithm = algorithm.into();
        let mut session = MatchSession::new();
        session.start(&mut self.pool.lock(), input, algorithm)?;
        info!("run {} requested algorithm={}", session.session_id, algorithm);
        Ok(session)
    }

    /// Start a run and step it on `scheduler` until it finishes.
    pub async fn run_to_completion(
        &self,
        input: &str,
        algorithm: impl Into<AlgorithmId>,
        scheduler: &dyn StepScheduler,
    ) -> Result<SessionStatus> {
        let mut session = self.run(input, algorithm)?;
        session.drive(scheduler, self.config.batch_size).await
    }

    /// Scheduler ticking at the configured frame interval.
    pub fn frame_scheduler(&self) -> FrameTicker {
        FrameTicker::from_millis(self.config.frame_interval_ms)
    }

    /// Every supported digest of `word`. Empty input yields no rows.
    pub fn digests(word: &str) -> Vec<DigestRow> {
        if word.is_empty() {
            return Vec::new();
        }
        DigestKind::ALL
            .iter()
            .map(|kind| DigestRow {
                algorithm: kind.id(),
                name: kind.name(),
                value: kind.encode(word),
            })
            .collect()
    }
}
