//! Lockstep ward world.
//!
//! [`IcuWorld`] is the primary user-facing API for driving a ward one
//! decision at a time. Each [`step()`](IcuWorld::step) applies a single
//! decision, advances every patient, and returns what happened.
//!
//! # Ownership model
//!
//! `IcuWorld` is [`Send`] (can be moved between threads) but every
//! mutating method takes `&mut self`. Independent worlds share nothing,
//! so many can run in parallel, each with its own pools and RNG stream.
//! A front-end reads state through [`WardSnapshot`] and never mutates it.

use simicu_core::{Archetype, Decision, Patient, PatientId, ResourceKind, TickId, WardSnapshot};
use simicu_pool::PoolError;

use crate::config::{ConfigError, IcuConfig};
use crate::metrics::StepMetrics;
use crate::score::ScoreSummary;
use crate::tick::{TickEngine, TickError};

// Compile-time assertion: IcuWorld is Send.
// Fails to compile if any field is !Send.
const _: () = {
    #[allow(dead_code)]
    fn assert_send<T: Send>() {}
    #[allow(dead_code)]
    fn check() {
        assert_send::<IcuWorld>();
    }
};

// ── StepResult ──────────────────────────────────────────────────

/// Result of a successful [`IcuWorld::step()`] call.
#[derive(Clone, Debug)]
pub struct StepResult {
    /// Arrival, decision receipt, and transitions of this tick.
    pub outcome: simicu_core::TickOutcome,
    /// Timing and counters for this tick.
    pub metrics: StepMetrics,
}

// ── IcuWorld ────────────────────────────────────────────────────

/// Single-threaded ward for lockstep (synchronous) execution.
///
/// # Example
///
/// ```
/// use simicu_core::{Action, Decision, PatientStatus, WardSnapshot};
/// use simicu_engine::{IcuConfig, IcuWorld};
///
/// let mut world = IcuWorld::new(IcuConfig { arrival_rate: 0.0, ..IcuConfig::default() })?;
/// let id = world.inject_patient(50.0, None);
/// let result = world.step(Decision::new(id, Action::AdmitBed))?;
/// assert!(result.outcome.receipt.applied);
/// assert_eq!(world.patient(id).map(|p| p.status), Some(PatientStatus::InBed));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct IcuWorld {
    engine: TickEngine,
    seed: u64,
}

impl IcuWorld {
    /// Create a world from an [`IcuConfig`].
    ///
    /// Validates the configuration and seeds the arrival process with
    /// `config.seed`.
    pub fn new(config: IcuConfig) -> Result<Self, ConfigError> {
        let seed = config.seed;
        Ok(Self {
            engine: TickEngine::new(config)?,
            seed,
        })
    }

    /// Execute one tick with `decision`.
    ///
    /// A rejected decision is not an error: it is reported in the
    /// outcome's receipt and the tick still advances.
    ///
    /// # Errors
    ///
    /// Returns [`TickError`] only on an internal bookkeeping fault.
    pub fn step(&mut self, decision: Decision) -> Result<StepResult, TickError> {
        let r = self.engine.execute_tick(decision)?;
        Ok(StepResult {
            outcome: r.outcome,
            metrics: r.metrics,
        })
    }

    /// Reset the world to tick 0 with a new seed.
    pub fn reset(&mut self, seed: u64) {
        self.engine.reset(seed);
        self.seed = seed;
    }

    /// Add a waiting patient outside the arrival process.
    pub fn inject_patient(&mut self, condition: f64, archetype: Option<Archetype>) -> PatientId {
        self.engine.inject_patient(condition, archetype)
    }

    /// Scoring summary. Never mutates.
    pub fn score(&self) -> ScoreSummary {
        self.engine.score()
    }

    /// Verify pool and patient invariants.
    pub fn check_invariants(&self) -> Result<(), PoolError> {
        self.engine.check_invariants()
    }

    /// Current tick (0 after construction or reset).
    pub fn current_tick(&self) -> TickId {
        self.engine.current_tick()
    }

    /// Tick of the next scheduled arrival, if arrivals are enabled.
    pub fn next_arrival(&self) -> Option<u64> {
        self.engine.next_arrival()
    }

    /// Metrics from the most recent successful tick.
    pub fn last_metrics(&self) -> &StepMetrics {
        self.engine.last_metrics()
    }

    /// The current seed.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// The validated configuration.
    pub fn config(&self) -> &IcuConfig {
        self.engine.config()
    }

    /// Whether the world halted after a fault.
    pub fn is_halted(&self) -> bool {
        self.engine.is_halted()
    }
}

impl WardSnapshot for IcuWorld {
    fn tick_id(&self) -> TickId {
        self.engine.tick_id()
    }

    fn patients(&self) -> &[Patient] {
        self.engine.patients()
    }

    fn capacity(&self, kind: ResourceKind) -> u32 {
        self.engine.capacity(kind)
    }

    fn free(&self, kind: ResourceKind) -> u32 {
        self.engine.free(kind)
    }

    fn patients_saved(&self) -> u64 {
        self.engine.patients_saved()
    }

    fn patients_lost(&self) -> u64 {
        self.engine.patients_lost()
    }
}

impl std::fmt::Debug for IcuWorld {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IcuWorld")
            .field("current_tick", &self.engine.current_tick())
            .field("seed", &self.seed)
            .field("patients", &self.engine.patients().len())
            .field("halted", &self.engine.is_halted())
            .finish()
    }
}
