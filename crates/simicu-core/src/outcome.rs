//! Per-tick outcome reported by the tick driver.

use smallvec::SmallVec;

use crate::command::Receipt;
use crate::id::{PatientId, TickId};

/// Everything that happened during one tick.
///
/// Returned by the tick driver and consumed by the reward model and
/// metrics. Transition lists are almost always empty or singletons, so
/// they live inline.
#[derive(Clone, Debug, PartialEq)]
pub struct TickOutcome {
    /// The tick counter after the step completed.
    pub tick: TickId,
    /// Patient created by the arrival process this tick, if any.
    pub arrival: Option<PatientId>,
    /// Fate of the tick's decision.
    pub receipt: Receipt,
    /// Patients that became `Cured` this tick.
    pub newly_cured: SmallVec<[PatientId; 4]>,
    /// Patients that became `Lost` this tick.
    pub newly_lost: SmallVec<[PatientId; 4]>,
    /// Patients that entered `PendingDischarge` this tick.
    pub entered_discharge: SmallVec<[PatientId; 4]>,
    /// Non-terminal patients whose state was advanced.
    pub patients_updated: u32,
}

impl TickOutcome {
    /// Whether any patient reached a terminal status this tick.
    pub fn has_terminal_transitions(&self) -> bool {
        !self.newly_cured.is_empty() || !self.newly_lost.is_empty()
    }
}
