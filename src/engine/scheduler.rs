// Scheduling ports: decide when a session gets its next bounded slice of work.

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::{interval, Interval, MissedTickBehavior};

#[async_trait]
pub trait StepScheduler: Send + Sync {
    /// Resolve at the next opportunity to run one step.
    async fn next_tick(&self);
}

/// Steps back to back without suspending. Intended for tests and batch use.
#[derive(Debug, Default, Clone, Copy)]
pub struct Immediate;

#[async_trait]
impl StepScheduler for Immediate {
    async fn next_tick(&self) {}
}

/// Yields to the runtime between steps so other tasks (and `cancel`) get a turn.
#[derive(Debug, Default, Clone, Copy)]
pub struct YieldEach;

#[async_trait]
impl StepScheduler for YieldEach {
    async fn next_tick(&self) {
        tokio::task::yield_now().await;
    }
}

/// Fixed-rate ticks, the host's per-frame callback.
pub struct FrameTicker {
    interval: Mutex<Interval>,
}

impl FrameTicker {
    pub fn new(period: Duration) -> Self {
        let mut ticker = interval(period);
        // A slow slice must not cause a burst of catch-up steps.
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self {
            interval: Mutex::new(ticker),
        }
    }

    pub fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms.max(1)))
    }
}

#[async_trait]
impl StepScheduler for FrameTicker {
    async fn next_tick(&self) {
        self.interval.lock().await.tick().await;
    }
}
