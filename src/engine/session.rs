// Match session state machine: drives one run of an engine in bounded, cancellable slices.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::pool::{EngineLease, EnginePool};
use super::scheduler::StepScheduler;
use super::stats::StatsCollector;
use crate::error::{Result, RipperError};
use crate::matcher::{Advance, AlgorithmFamily, AlgorithmId};

static NEXT_SESSION: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Running,
    Found,
    Exhausted,
    Cancelled,
}

impl SessionState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            SessionState::Found | SessionState::Exhausted | SessionState::Cancelled
        )
    }
}

/// What one `step` produced.
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome {
    pub state: SessionState,
    pub matched: bool,
    pub progress: usize,
    pub elapsed: Duration,
    pub last_candidate: String,
    pub exhausted: bool,
    pub matched_value: Option<String>,
}

/// Point-in-time view of a session for the presentation layer.
#[derive(Debug, Clone)]
pub struct SessionStatus {
    pub session_id: String,
    pub state: SessionState,
    pub algorithm: Option<AlgorithmId>,
    pub family: Option<AlgorithmFamily>,
    pub progress: usize,
    pub word_count: usize,
    pub elapsed_seconds: f64,
    pub last_candidate: String,
    pub matched_value: Option<String>,
    pub matched_algorithm: Option<AlgorithmId>,
    pub probes_per_second: u64,
    pub slices: u64,
    pub error: Option<RipperError>,
}

/// Cloneable cancel switch for the run that was active when it was taken.
#[derive(Clone)]
pub struct CancelHandle {
    token: CancellationToken,
}

impl CancelHandle {
    /// Request cancellation. Takes effect at the next slice boundary.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

pub struct MatchSession {
    pub session_id: String,
    state: SessionState,
    lease: Option<EngineLease>,
    algorithm: Option<AlgorithmId>,
    family: Option<AlgorithmFamily>,
    input: String,
    cancel_token: CancellationToken,
    started_at: Option<Instant>,
    finished_after: Option<Duration>,
    last: Option<Advance>,
    word_count: usize,
    error: Option<RipperError>,
    stats: StatsCollector,
}

impl MatchSession {
    pub fn new() -> Self {
        let id = NEXT_SESSION.fetch_add(1, Ordering::Relaxed);
        Self {
            session_id: format!("session-{}", id),
            state: SessionState::Idle,
            lease: None,
            algorithm: None,
            family: None,
            input: String::new(),
            cancel_token: CancellationToken::new(),
            started_at: None,
            finished_after: None,
            last: None,
            word_count: 0,
            error: None,
            stats: StatsCollector::new(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    /// Begin a run: bind `algorithm` on a pooled engine, hand it `input`, go `Running`.
    ///
    /// Valid from `Idle` or any terminal state. A running session rejects the call
    /// and is left exactly as it was.
    pub fn start(&mut self, pool: &mut EnginePool, input: &str, algorithm: AlgorithmId) -> Result<()> {
        if self.state == SessionState::Running {
            warn!("session {} start rejected: already running", self.session_id);
            return Err(RipperError::configuration(format!(
                "session {} is already running",
                self.session_id
            )));
        }

        let lease = pool.acquire(algorithm)?;
        let word_count = {
            let mut engine = lease.lock();
            engine.set_target(input).map_err(|e| {
                RipperError::configuration(format!("target rejected: {}", e))
            })?;
            engine.word_count()
        };

        self.family = Some(lease.family());
        self.lease = Some(lease);
        self.algorithm = Some(algorithm);
        self.input = input.to_string();
        self.cancel_token = CancellationToken::new();
        self.started_at = Some(Instant::now());
        self.finished_after = None;
        self.last = None;
        self.word_count = word_count;
        self.error = None;
        self.stats.reset();
        self.state = SessionState::Running;

        info!(
            "session {} started algorithm={} family={:?} words={}",
            self.session_id, algorithm, self.family, word_count
        );
        Ok(())
    }

    /// Advance the engine by at most `batch_size` probes and apply the outcome policy:
    /// match, then cancellation, then exhaustion, otherwise keep running.
    pub fn step(&mut self, batch_size: usize) -> Result<StepOutcome> {
        if self.state != SessionState::Running {
            return Err(RipperError::configuration(format!(
                "session {} cannot step in state {:?}",
                self.session_id, self.state
            )));
        }
        if batch_size == 0 {
            return Err(RipperError::configuration("batch size must be > 0"));
        }
        let Some(lease) = self.lease.as_ref() else {
            return Err(RipperError::configuration(format!(
                "session {} has no engine",
                self.session_id
            )));
        };

        let result = lease.lock().advance(batch_size);
        let advance = match result {
            Ok(advance) => advance,
            Err(e) => {
                warn!("session {} engine fault: {}", self.session_id, e);
                let err = RipperError::Engine(e.to_string());
                self.error = Some(err.clone());
                self.finish(SessionState::Cancelled);
                return Err(err);
            }
        };

        self.stats.record_slice(advance.progress as u64);

        let next = if advance.matched {
            SessionState::Found
        } else if self.cancel_token.is_cancelled() {
            SessionState::Cancelled
        } else if advance.exhausted {
            SessionState::Exhausted
        } else {
            SessionState::Running
        };

        debug!(
            "session {} step batch={} progress={} last={:?} -> {:?}",
            self.session_id, batch_size, advance.progress, advance.last_candidate, next
        );

        self.last = Some(advance);
        if next.is_terminal() {
            self.finish(next);
        }
        Ok(self.outcome())
    }

    /// Request cancellation of the running slice loop. No-op outside `Running`.
    pub fn cancel(&self) {
        if self.state == SessionState::Running {
            debug!("session {} cancellation requested", self.session_id);
            self.cancel_token.cancel();
        }
    }

    /// Handle for cancelling the current run from another task.
    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            token: self.cancel_token.clone(),
        }
    }

    /// Keep stepping on every scheduler tick until the session reaches a terminal state.
    pub async fn drive(
        &mut self,
        scheduler: &dyn StepScheduler,
        batch_size: usize,
    ) -> Result<SessionStatus> {
        while self.state == SessionState::Running {
            scheduler.next_tick().await;
            self.step(batch_size)?;
        }
        Ok(self.status())
    }

    pub fn elapsed(&self) -> Duration {
        match (self.finished_after, self.started_at) {
            (Some(frozen), _) => frozen,
            (None, Some(start)) => start.elapsed(),
            (None, None) => Duration::ZERO,
        }
    }

    pub fn status(&self) -> SessionStatus {
        let snap = self.stats.snapshot();
        let last = self.last.as_ref();
        SessionStatus {
            session_id: self.session_id.clone(),
            state: self.state,
            algorithm: self.algorithm,
            family: self.family,
            progress: last.map(|a| a.progress).unwrap_or(0),
            word_count: self.word_count,
            elapsed_seconds: self.elapsed().as_secs_f64(),
            last_candidate: last.map(|a| a.last_candidate.clone()).unwrap_or_default(),
            matched_value: last.and_then(|a| a.matched_value.clone()),
            matched_algorithm: last.and_then(|a| a.matched_algorithm),
            probes_per_second: snap.probes_per_second,
            slices: snap.slices,
            error: self.error.clone(),
        }
    }

    fn outcome(&self) -> StepOutcome {
        let last = self.last.clone().unwrap_or_default();
        StepOutcome {
            state: self.state,
            matched: last.matched,
            progress: last.progress,
            elapsed: self.elapsed(),
            last_candidate: last.last_candidate,
            exhausted: last.exhausted,
            matched_value: last.matched_value,
        }
    }

    /// Enter a terminal state and give the engine back to the pool.
    fn finish(&mut self, state: SessionState) {
        self.finished_after = Some(self.elapsed());
        self.state = state;
        self.lease = None;
        info!(
            "session {} finished {:?} progress={} elapsed_ms={}",
            self.session_id,
            state,
            self.last.as_ref().map(|a| a.progress).unwrap_or(0),
            self.elapsed().as_millis()
        );
    }
}

impl Default for MatchSession {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for MatchSession {
    fn drop(&mut self) {
        if self.state == SessionState::Running {
            debug!("MatchSession {} dropped while running, releasing engine", self.session_id);
        }
    }
}
