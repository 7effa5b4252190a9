// Engine instance pool: one live instance per algorithm family, word lists carried across switches.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};
use tracing::{debug, info};

use crate::error::{Result, RipperError};
use crate::matcher::{AlgorithmFamily, AlgorithmId, EngineFactory, MatchEngine};

pub type SharedEngine = Arc<Mutex<Box<dyn MatchEngine>>>;

struct EngineSlot {
    engine: SharedEngine,
    /// Generation of the merged selection this instance holds.
    loaded_generation: u64,
    /// Set while a running session holds a lease on this instance.
    busy: Arc<AtomicBool>,
}

struct LoadedSelection {
    text: Arc<str>,
    names: Vec<String>,
}

/// Exclusive handle on a pooled engine for the duration of one run.
///
/// While the lease is alive the pool leaves the instance's word list alone, so a
/// running session keeps the list it started with.
pub struct EngineLease {
    engine: SharedEngine,
    family: AlgorithmFamily,
    algorithm: AlgorithmId,
    busy: Arc<AtomicBool>,
}

impl EngineLease {
    pub fn family(&self) -> AlgorithmFamily {
        self.family
    }

    pub fn algorithm(&self) -> AlgorithmId {
        self.algorithm
    }

    pub fn lock(&self) -> MutexGuard<'_, Box<dyn MatchEngine>> {
        self.engine.lock()
    }
}

impl Drop for EngineLease {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

pub struct EnginePool {
    factory: Arc<dyn EngineFactory>,
    slots: [Option<EngineSlot>; 2],
    current: Option<AlgorithmFamily>,
    selection: Option<LoadedSelection>,
    generation: u64,
    /// Word count from the last instance that actually consumed a selection.
    reported_count: usize,
}

impl EnginePool {
    pub fn new(factory: Arc<dyn EngineFactory>) -> Self {
        Self {
            factory,
            slots: [None, None],
            current: None,
            selection: None,
            generation: 0,
            reported_count: 0,
        }
    }

    pub fn current_family(&self) -> Option<AlgorithmFamily> {
        self.current
    }

    pub fn has_instance(&self, family: AlgorithmFamily) -> bool {
        self.slots[family.index()].is_some()
    }

    /// Whether a running session currently leases the family's instance.
    pub fn is_busy(&self, family: AlgorithmFamily) -> bool {
        self.slots[family.index()]
            .as_ref()
            .is_some_and(|slot| slot.busy.load(Ordering::Acquire))
    }

    /// Word count held by the current instance.
    pub fn word_count(&self) -> usize {
        self.current
            .and_then(|family| self.slots[family.index()].as_ref())
            .map(|slot| slot.engine.lock().word_count())
            .unwrap_or(0)
    }

    /// Obtain the instance serving `algorithm`, building it on first use.
    ///
    /// The other family's instance stays alive. An instance whose word list is
    /// older than the last pushed selection receives it before being handed out.
    /// When the engine rejects the id the pool is left exactly as it was.
    pub fn acquire(&mut self, algorithm: AlgorithmId) -> Result<EngineLease> {
        let family = algorithm.family();
        let idx = family.index();

        if self.is_busy(family) {
            return Err(RipperError::configuration(format!(
                "{:?} engine is in use by a running session",
                family
            )));
        }

        let engine = match &self.slots[idx] {
            Some(slot) => slot.engine.clone(),
            None => {
                debug!("constructing {:?} engine instance", family);
                Arc::new(Mutex::new(self.factory.create(family)))
            }
        };

        engine.lock().set_algorithm(algorithm).map_err(|e| {
            RipperError::configuration(format!("algorithm {} rejected: {}", algorithm, e))
        })?;

        let generation = self.generation;
        let slot = self.slots[idx].get_or_insert_with(|| EngineSlot {
            engine: engine.clone(),
            loaded_generation: 0,
            busy: Arc::new(AtomicBool::new(false)),
        });
        if slot.loaded_generation != generation {
            if let Some(selection) = &self.selection {
                let count = engine.lock().load_word_list(&selection.text, &selection.names);
                debug!(
                    "migrated selection generation {} into {:?} engine ({} words)",
                    generation, family, count
                );
            }
            slot.loaded_generation = generation;
        }

        if self.current != Some(family) {
            info!("engine family switch {:?} -> {:?}", self.current, family);
            self.current = Some(family);
        }

        slot.busy.store(true, Ordering::Release);
        Ok(EngineLease {
            engine,
            family,
            algorithm,
            busy: slot.busy.clone(),
        })
    }

    /// Push a merged selection into every idle instance and return the word count
    /// reported by the current one.
    ///
    /// Instances leased by running sessions are skipped and catch up on their next
    /// [`acquire`](Self::acquire). When every instance is leased the previously
    /// reported count is returned unchanged.
    pub fn load_word_list(&mut self, text: &str, names: &[String]) -> usize {
        self.generation += 1;
        self.selection = Some(LoadedSelection {
            text: Arc::from(text),
            names: names.to_vec(),
        });

        if self.slots.iter().all(Option::is_none) {
            let family = self.current.unwrap_or(AlgorithmFamily::Forward);
            debug!("constructing {:?} engine instance for first selection", family);
            self.slots[family.index()] = Some(EngineSlot {
                engine: Arc::new(Mutex::new(self.factory.create(family))),
                loaded_generation: 0,
                busy: Arc::new(AtomicBool::new(false)),
            });
            self.current = Some(family);
        }

        let mut reported: Option<usize> = None;
        for family in AlgorithmFamily::ALL {
            let Some(slot) = self.slots[family.index()].as_mut() else {
                continue;
            };
            if slot.busy.load(Ordering::Acquire) {
                debug!("{:?} engine busy, deferring selection load", family);
                continue;
            }
            let count = slot.engine.lock().load_word_list(text, names);
            slot.loaded_generation = self.generation;
            if reported.is_none() || self.current == Some(family) {
                reported = Some(count);
            }
        }

        match reported {
            Some(count) => {
                self.reported_count = count;
                count
            }
            None => {
                debug!(
                    "no idle engine consumed the selection, keeping count {}",
                    self.reported_count
                );
                self.reported_count
            }
        }
    }
}
