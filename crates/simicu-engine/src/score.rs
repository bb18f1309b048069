//! Read-only scoring summary.

use std::fmt;

use simicu_core::TickId;

/// Cumulative outcome counters of a ward, queryable at any time.
///
/// Taking a summary never mutates the ward, so repeated queries between
/// ticks return identical values.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScoreSummary {
    /// Ticks completed.
    pub tick: TickId,
    /// Patients cured so far.
    pub patients_saved: u64,
    /// Patients lost so far.
    pub patients_lost: u64,
    /// Summed ticks spent waiting, over all patients.
    pub total_wait_ticks: u64,
    /// Patients not yet cured or lost.
    pub active_patients: usize,
}

impl ScoreSummary {
    /// Fraction of resolved patients that were cured, or `None` before the
    /// first outcome.
    pub fn survival_rate(&self) -> Option<f64> {
        let resolved = self.patients_saved + self.patients_lost;
        (resolved > 0).then(|| self.patients_saved as f64 / resolved as f64)
    }
}

impl fmt::Display for ScoreSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "tick {}: saved {}, lost {}, active {}, waited {} ticks",
            self.tick,
            self.patients_saved,
            self.patients_lost,
            self.active_patients,
            self.total_wait_ticks
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn survival_rate_undefined_before_outcomes() {
        assert_eq!(ScoreSummary::default().survival_rate(), None);
        let s = ScoreSummary {
            patients_saved: 3,
            patients_lost: 1,
            ..Default::default()
        };
        assert_eq!(s.survival_rate(), Some(0.75));
    }

    #[test]
    fn display() {
        let s = ScoreSummary {
            tick: TickId(12),
            patients_saved: 2,
            patients_lost: 1,
            total_wait_ticks: 40,
            active_patients: 5,
        };
        assert_eq!(s.to_string(), "tick 12: saved 2, lost 1, active 5, waited 40 ticks");
    }
}
