//! Tick driver: arrivals, one decision, lifecycle, clock.
//!
//! [`TickEngine`] owns every piece of ward state: the pools, the
//! never-pruned patient list, the arrival process, and the outcome
//! counters. Each [`execute_tick()`](TickEngine::execute_tick) runs
//!
//! 1. arrivals (at most one patient),
//! 2. the tick's single decision,
//! 3. one lifecycle step for every non-terminal patient, releasing the
//!    resources of patients that became cured or lost,
//! 4. `tick += 1`.

use std::fmt;
use std::time::Instant;

use smallvec::SmallVec;

use simicu_core::{
    Action, Archetype, Decision, Patient, PatientId, PatientStatus, Receipt, ResourceKind, TickId,
    TickOutcome, WardSnapshot, CONDITION_MAX, CONDITION_MIN,
};
use simicu_pool::{PoolError, ResourcePools};

use crate::arrival::PoissonArrivals;
use crate::assign::apply_decision;
use crate::config::{ConfigError, IcuConfig};
use crate::lifecycle::{advance, Transition};
use crate::metrics::StepMetrics;
use crate::score::ScoreSummary;

// ── TickResult ──────────────────────────────────────────────────

/// Result of a successful [`TickEngine::execute_tick()`].
#[derive(Clone, Debug)]
pub struct TickResult {
    /// What happened during the tick.
    pub outcome: TickOutcome,
    /// Timing and counters for the tick.
    pub metrics: StepMetrics,
}

// ── TickError ───────────────────────────────────────────────────

/// Why a tick could not complete.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TickFault {
    /// Pool bookkeeping disagreed with patient back-references.
    Pool(PoolError),
    /// A previous tick faulted; the ward must be reset before it can
    /// advance again.
    Halted,
}

impl fmt::Display for TickFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pool(e) => write!(f, "resource bookkeeping failed: {e}"),
            Self::Halted => write!(f, "ward halted after an earlier fault; reset required"),
        }
    }
}

impl std::error::Error for TickFault {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Pool(e) => Some(e),
            Self::Halted => None,
        }
    }
}

/// Error returned from [`TickEngine::execute_tick()`].
///
/// Carries the receipt of the tick's decision when the fault happened
/// after the decision was applied.
///
/// A pool fault leaves the ward mid-tick: the decision and every
/// patient's lifecycle step have been applied and counted, and every
/// release except the failing one has run, but the clock has not
/// advanced. The patient whose release failed is terminal and may still
/// reference slots. The engine halts; only a reset recovers it.
#[derive(Clone, Debug, PartialEq)]
pub struct TickError {
    /// The underlying fault.
    pub kind: TickFault,
    /// Receipt of the decision, if it was processed before the fault.
    pub receipt: Option<Receipt>,
}

impl fmt::Display for TickError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

impl std::error::Error for TickError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.kind)
    }
}

// ── TickEngine ──────────────────────────────────────────────────

/// Single-threaded, synchronous ward engine.
///
/// A tick is a total function of (state, decision): rejected decisions
/// still cost a tick. The only failure is an internal bookkeeping fault,
/// after which the engine halts until [`reset()`](TickEngine::reset).
pub struct TickEngine {
    config: IcuConfig,
    pools: ResourcePools,
    patients: Vec<Patient>,
    arrivals: PoissonArrivals,
    current_tick: TickId,
    next_patient_id: u64,
    patients_saved: u64,
    patients_lost: u64,
    total_wait_ticks: u64,
    halted: bool,
    last_metrics: StepMetrics,
}

impl TickEngine {
    /// Validate `config` and build an empty ward at tick 0.
    pub fn new(config: IcuConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let pools = ResourcePools::new(config.num_nurses, config.num_beds, config.num_ventilators);
        let arrivals = PoissonArrivals::new(&config, config.seed);
        Ok(Self {
            config,
            pools,
            patients: Vec::new(),
            arrivals,
            current_tick: TickId(0),
            next_patient_id: 0,
            patients_saved: 0,
            patients_lost: 0,
            total_wait_ticks: 0,
            halted: false,
            last_metrics: StepMetrics::default(),
        })
    }

    /// Execute one tick with `decision`.
    ///
    /// # Errors
    ///
    /// Returns [`TickError`] if pool bookkeeping is found inconsistent
    /// while releasing resources, or if an earlier tick faulted.
    pub fn execute_tick(&mut self, decision: Decision) -> Result<TickResult, TickError> {
        let tick_start = Instant::now();

        if self.halted {
            return Err(TickError {
                kind: TickFault::Halted,
                receipt: None,
            });
        }

        // 1. Arrivals, polled against the pre-increment clock.
        let arrival = self
            .arrivals
            .poll(self.current_tick.0)
            .map(|draw| self.admit_arrival(draw.condition, draw.archetype));

        // 2. The single decision.
        let receipt = apply_decision(
            &mut self.patients,
            &mut self.pools,
            decision,
            &self.config.lifecycle,
        );
        match (receipt.reason, decision.patient) {
            (Some(reason), _) => {
                log::trace!("tick {}: rejected {}: {reason}", self.current_tick, decision.action);
            }
            (None, Some(id)) if decision.action != Action::NoOp => {
                log::debug!("tick {}: applied {} to patient {id}", self.current_tick, decision.action);
            }
            _ => {}
        }

        // 3. Lifecycle.
        let mut newly_cured = SmallVec::new();
        let mut newly_lost = SmallVec::new();
        let mut entered_discharge = SmallVec::new();
        let mut patients_updated = 0u32;
        let mut fault: Option<PoolError> = None;
        let extended = self.config.extended.as_ref();
        for patient in self.patients.iter_mut().filter(|p| !p.is_terminal()) {
            patients_updated += 1;
            match advance(patient, &self.config.lifecycle, extended) {
                Some(Transition::Cured) => {
                    if let Err(e) = self.pools.release_held(patient) {
                        fault.get_or_insert(e);
                    }
                    self.patients_saved += 1;
                    newly_cured.push(patient.id);
                    log::info!("tick {}: patient {} cured", self.current_tick, patient.id);
                }
                Some(Transition::Lost) => {
                    if let Err(e) = self.pools.release_held(patient) {
                        fault.get_or_insert(e);
                    }
                    self.patients_lost += 1;
                    newly_lost.push(patient.id);
                    log::info!("tick {}: patient {} lost", self.current_tick, patient.id);
                }
                Some(Transition::EnteredDischarge) => {
                    entered_discharge.push(patient.id);
                    log::debug!(
                        "tick {}: patient {} awaiting discharge",
                        self.current_tick,
                        patient.id
                    );
                }
                None => {}
            }
            if patient.status == PatientStatus::Waiting {
                self.total_wait_ticks += 1;
            }
        }

        // Every patient has advanced and every other release has run; the
        // clock stays put.
        if let Some(e) = fault {
            self.halted = true;
            log::error!("tick {}: halting: {e}", self.current_tick);
            return Err(TickError {
                kind: TickFault::Pool(e),
                receipt: Some(receipt),
            });
        }

        // 4. Clock.
        self.current_tick = TickId(self.current_tick.0 + 1);

        let metrics = StepMetrics {
            total_us: tick_start.elapsed().as_micros() as u64,
            arrivals: u32::from(arrival.is_some()),
            decisions_applied: u32::from(receipt.applied),
            decisions_rejected: u32::from(!receipt.applied),
            patients_updated,
        };
        self.last_metrics = metrics.clone();

        Ok(TickResult {
            outcome: TickOutcome {
                tick: self.current_tick,
                arrival,
                receipt,
                newly_cured,
                newly_lost,
                entered_discharge,
                patients_updated,
            },
            metrics,
        })
    }

    /// Add a waiting patient outside the arrival process.
    ///
    /// The patient gets the next id, exactly as an arrival would. Used for
    /// scripted scenarios; the RNG stream is not touched.
    pub fn inject_patient(&mut self, condition: f64, archetype: Option<Archetype>) -> PatientId {
        self.admit_arrival(condition, archetype)
    }

    /// Reset to tick 0 with a new seed.
    ///
    /// Frees every resource, drops every patient, zeroes the counters,
    /// and clears a halt.
    pub fn reset(&mut self, seed: u64) {
        self.pools.reset();
        self.patients.clear();
        self.arrivals.reset(seed);
        self.current_tick = TickId(0);
        self.next_patient_id = 0;
        self.patients_saved = 0;
        self.patients_lost = 0;
        self.total_wait_ticks = 0;
        self.halted = false;
        self.last_metrics = StepMetrics::default();
    }

    /// Scoring summary. Never mutates.
    pub fn score(&self) -> ScoreSummary {
        ScoreSummary {
            tick: self.current_tick,
            patients_saved: self.patients_saved,
            patients_lost: self.patients_lost,
            total_wait_ticks: self.total_wait_ticks,
            active_patients: self.active_count(),
        }
    }

    /// Verify every structural invariant of the ward.
    ///
    /// Checks pool free counts and mutual back-references, that terminal
    /// patients hold nothing, and that every condition is within bounds.
    pub fn check_invariants(&self) -> Result<(), PoolError> {
        self.pools.verify(&self.patients)?;
        for p in &self.patients {
            if p.is_terminal() {
                if let Some((kind, slot)) = p.held().first().copied() {
                    return Err(PoolError::Inconsistent {
                        kind,
                        reason: format!("{} patient {} still holds slot {slot}", p.status, p.id),
                    });
                }
            }
            if !(CONDITION_MIN..=CONDITION_MAX).contains(&p.condition) {
                return Err(PoolError::Inconsistent {
                    kind: ResourceKind::Bed,
                    reason: format!("patient {} condition {} out of bounds", p.id, p.condition),
                });
            }
        }
        Ok(())
    }

    /// The validated configuration.
    pub fn config(&self) -> &IcuConfig {
        &self.config
    }

    /// Current tick (0 after construction or reset).
    pub fn current_tick(&self) -> TickId {
        self.current_tick
    }

    /// Tick of the next scheduled arrival, if arrivals are enabled.
    pub fn next_arrival(&self) -> Option<u64> {
        self.arrivals.next_arrival()
    }

    /// Summed ticks spent waiting, over all patients.
    pub fn total_wait_ticks(&self) -> u64 {
        self.total_wait_ticks
    }

    /// Whether the engine halted after a fault.
    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// Metrics from the most recent successful tick.
    pub fn last_metrics(&self) -> &StepMetrics {
        &self.last_metrics
    }

    /// The resource pools.
    pub fn pools(&self) -> &ResourcePools {
        &self.pools
    }

    fn admit_arrival(&mut self, condition: f64, archetype: Option<Archetype>) -> PatientId {
        let id = PatientId(self.next_patient_id);
        self.next_patient_id += 1;
        self.patients.push(Patient::new(id, condition, archetype));
        log::debug!(
            "tick {}: patient {id} arrived with condition {condition}",
            self.current_tick
        );
        id
    }
}

impl WardSnapshot for TickEngine {
    fn tick_id(&self) -> TickId {
        self.current_tick
    }

    fn patients(&self) -> &[Patient] {
        &self.patients
    }

    fn capacity(&self, kind: ResourceKind) -> u32 {
        self.pools.capacity(kind)
    }

    fn free(&self, kind: ResourceKind) -> u32 {
        self.pools.free(kind)
    }

    fn patients_saved(&self) -> u64 {
        self.patients_saved
    }

    fn patients_lost(&self) -> u64 {
        self.patients_lost
    }
}
