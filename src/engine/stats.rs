// Live probe statistics for a match session: slice counts and probe rate.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use parking_lot::Mutex;

struct StatsSample {
    at: Instant,
    probes: u64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatsSnapshot {
    pub probes_total: u64,
    pub slices: u64,
    pub probes_per_second: u64,
}

pub struct StatsCollector {
    probes_total: AtomicU64,
    slices: AtomicU64,
    last_sample: Mutex<StatsSample>,
}

impl StatsCollector {
    pub fn new() -> Self {
        Self {
            probes_total: AtomicU64::new(0),
            slices: AtomicU64::new(0),
            last_sample: Mutex::new(StatsSample {
                at: Instant::now(),
                probes: 0,
            }),
        }
    }

    /// Record one completed slice that advanced progress to `progress`.
    pub fn record_slice(&self, progress: u64) {
        self.slices.fetch_add(1, Ordering::Relaxed);
        self.probes_total.fetch_max(progress, Ordering::Relaxed);
    }

    pub fn reset(&self) {
        self.probes_total.store(0, Ordering::Relaxed);
        self.slices.store(0, Ordering::Relaxed);
        let mut sample = self.last_sample.lock();
        sample.at = Instant::now();
        sample.probes = 0;
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        let now = Instant::now();
        let probes = self.probes_total.load(Ordering::Relaxed);

        let probes_per_second = {
            let mut sample = self.last_sample.lock();
            let elapsed = now.duration_since(sample.at).as_secs_f64();

            let rate = if elapsed > 0.1 {
                (probes.saturating_sub(sample.probes) as f64 / elapsed) as u64
            } else {
                0
            };

            // Update sample for next call
            if elapsed > 0.1 {
                sample.at = now;
                sample.probes = probes;
            }

            rate
        };

        StatsSnapshot {
            probes_total: probes,
            slices: self.slices.load(Ordering::Relaxed),
            probes_per_second,
        }
    }
}

impl Default for StatsCollector {
    fn default() -> Self {
        Self::new()
    }
}
