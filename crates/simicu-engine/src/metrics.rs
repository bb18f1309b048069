//! Per-tick metrics for the ward engine.
//!
//! [`StepMetrics`] captures timing and decision bookkeeping for a single
//! tick. The engine overwrites it after every tick; consumers read the
//! most recent value.

/// Timing and counters collected during a single tick.
///
/// Durations are in microseconds.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StepMetrics {
    /// Wall-clock time for the entire tick, in microseconds.
    pub total_us: u64,
    /// Patients created by the arrival process this tick (0 or 1).
    pub arrivals: u32,
    /// Decisions applied this tick, including no-ops.
    pub decisions_applied: u32,
    /// Decisions rejected this tick.
    pub decisions_rejected: u32,
    /// Non-terminal patients advanced by the lifecycle step.
    pub patients_updated: u32,
}
