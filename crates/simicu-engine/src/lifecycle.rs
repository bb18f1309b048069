//! Per-tick patient condition dynamics and status transitions.
//!
//! ```text
//!   Waiting ──admit──▶ InBed ──escalate──▶ OnVentilator
//!      │                 │                     │
//!      │ cond <= 0       ├─ cond >= 100 ───────┼──▶ Cured
//!      ▼                 │  (extended: PendingDischarge ──delay──▶ Cured)
//!    Lost ◀──────────────┴─ cond <= 0 ─────────┘
//! ```
//!
//! Admission and escalation are applied by the assignment step; this
//! module only advances time.

use simicu_core::{Patient, PatientStatus, CONDITION_MAX, CONDITION_MIN};

use crate::config::{ExtendedParams, LifecycleParams};

/// A status change produced by [`advance`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    /// The patient recovered and must release its resources.
    Cured,
    /// The patient died and must release its resources.
    Lost,
    /// The patient recovered but keeps its resources until discharge.
    EnteredDischarge,
}

/// Advance `patient` by one tick.
///
/// Terminal patients are left untouched. The returned transition tells
/// the caller whether resources must be released; this function never
/// touches the pools.
pub fn advance(
    patient: &mut Patient,
    params: &LifecycleParams,
    extended: Option<&ExtendedParams>,
) -> Option<Transition> {
    match patient.status {
        PatientStatus::Cured | PatientStatus::Lost => return None,
        PatientStatus::PendingDischarge => {
            patient.discharge_remaining = patient.discharge_remaining.saturating_sub(1);
            if patient.discharge_remaining == 0 {
                patient.status = PatientStatus::Cured;
                return Some(Transition::Cured);
            }
            return None;
        }
        PatientStatus::Waiting => {
            patient.ticks_waited += 1;
            let blocks = patient.ticks_waited / params.wait_accel_block;
            patient.condition -= params.wait_decay + params.wait_accel * f64::from(blocks);
        }
        PatientStatus::InBed => {
            if patient.bed_setup_remaining > 0 {
                patient.bed_setup_remaining -= 1;
            } else {
                patient.condition += params.bed_rate;
            }
        }
        PatientStatus::OnVentilator => {
            if patient.ventilator_setup_remaining > 0 {
                patient.ventilator_setup_remaining -= 1;
            } else {
                patient.condition += params.vent_rate;
            }
        }
    }

    patient.condition = patient.condition.clamp(CONDITION_MIN, CONDITION_MAX);

    if patient.condition >= CONDITION_MAX {
        match extended {
            Some(ext) if ext.discharge_delay_ticks > 0 => {
                patient.status = PatientStatus::PendingDischarge;
                patient.discharge_remaining = ext.discharge_delay_ticks;
                Some(Transition::EnteredDischarge)
            }
            _ => {
                patient.status = PatientStatus::Cured;
                Some(Transition::Cured)
            }
        }
    } else if patient.condition <= CONDITION_MIN {
        patient.status = PatientStatus::Lost;
        Some(Transition::Lost)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use simicu_core::PatientId;

    fn patient(condition: f64, status: PatientStatus) -> Patient {
        let mut p = Patient::new(PatientId(0), condition, None);
        p.status = status;
        p
    }

    fn params() -> LifecycleParams {
        LifecycleParams::default()
    }

    #[test]
    fn waiting_decays_and_accelerates() {
        let mut p = patient(50.0, PatientStatus::Waiting);
        advance(&mut p, &params(), None);
        assert_eq!(p.ticks_waited, 1);
        assert_eq!(p.condition, 49.5);

        p.ticks_waited = 19;
        let before = p.condition;
        advance(&mut p, &params(), None);
        // ticks_waited is now 20: one full block of acceleration.
        assert!((before - p.condition - 0.6).abs() < 1e-12);

        p.ticks_waited = 59;
        let before = p.condition;
        advance(&mut p, &params(), None);
        assert!((before - p.condition - 0.8).abs() < 1e-12);
    }

    #[test]
    fn bed_setup_counts_down_before_care() {
        let mut p = patient(50.0, PatientStatus::InBed);
        p.bed_setup_remaining = 3;
        for remaining in [2, 1, 0] {
            assert_eq!(advance(&mut p, &params(), None), None);
            assert_eq!(p.bed_setup_remaining, remaining);
            assert_eq!(p.condition, 50.0);
        }
        advance(&mut p, &params(), None);
        assert_eq!(p.condition, 51.5);
        assert_eq!(p.ticks_waited, 0);
    }

    #[test]
    fn ventilator_uses_its_own_countdown() {
        let mut p = patient(50.0, PatientStatus::OnVentilator);
        p.bed_setup_remaining = 3;
        p.ventilator_setup_remaining = 1;
        advance(&mut p, &params(), None);
        assert_eq!(p.condition, 50.0);
        advance(&mut p, &params(), None);
        assert_eq!(p.condition, 53.0);
        assert_eq!(p.bed_setup_remaining, 3);
    }

    #[test]
    fn reaching_full_health_cures() {
        let mut p = patient(99.0, PatientStatus::OnVentilator);
        assert_eq!(advance(&mut p, &params(), None), Some(Transition::Cured));
        assert_eq!(p.condition, CONDITION_MAX);
        assert_eq!(p.status, PatientStatus::Cured);
    }

    #[test]
    fn reaching_zero_loses() {
        let mut p = patient(0.3, PatientStatus::Waiting);
        assert_eq!(advance(&mut p, &params(), None), Some(Transition::Lost));
        assert_eq!(p.condition, CONDITION_MIN);
        assert_eq!(p.status, PatientStatus::Lost);
    }

    #[test]
    fn terminal_patients_do_not_change() {
        for status in [PatientStatus::Cured, PatientStatus::Lost] {
            let mut p = patient(0.0, status);
            let before = p.clone();
            assert_eq!(advance(&mut p, &params(), None), None);
            assert_eq!(p, before);
        }
    }

    #[test]
    fn extended_recovery_waits_for_discharge() {
        let ext = ExtendedParams {
            discharge_delay_ticks: 2,
        };
        let mut p = patient(99.0, PatientStatus::InBed);
        assert_eq!(
            advance(&mut p, &params(), Some(&ext)),
            Some(Transition::EnteredDischarge)
        );
        assert_eq!(p.status, PatientStatus::PendingDischarge);
        assert_eq!(p.discharge_remaining, 2);

        assert_eq!(advance(&mut p, &params(), Some(&ext)), None);
        assert_eq!(p.condition, CONDITION_MAX);
        assert_eq!(
            advance(&mut p, &params(), Some(&ext)),
            Some(Transition::Cured)
        );
        assert_eq!(p.status, PatientStatus::Cured);
    }

    #[test]
    fn zero_discharge_delay_cures_immediately() {
        let ext = ExtendedParams {
            discharge_delay_ticks: 0,
        };
        let mut p = patient(99.0, PatientStatus::OnVentilator);
        assert_eq!(advance(&mut p, &params(), Some(&ext)), Some(Transition::Cured));
    }

    #[test]
    fn unattended_patient_is_lost_within_two_hundred_ticks() {
        let mut p = patient(50.0, PatientStatus::Waiting);
        let lost_at = (1..=200).find(|_| advance(&mut p, &params(), None) == Some(Transition::Lost));
        assert!(lost_at.is_some());
        assert_eq!(advance(&mut p, &params(), None), None);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn arb_status() -> impl Strategy<Value = PatientStatus> {
            prop_oneof![
                Just(PatientStatus::Waiting),
                Just(PatientStatus::InBed),
                Just(PatientStatus::OnVentilator),
                Just(PatientStatus::PendingDischarge),
            ]
        }

        proptest! {
            #[test]
            fn condition_stays_in_bounds(
                condition in 0.0f64..=100.0,
                status in arb_status(),
                waited in 0u32..500,
                ticks in 1usize..400,
                extended in any::<bool>(),
            ) {
                let ext = ExtendedParams::default();
                let ext = extended.then_some(&ext);
                let mut p = patient(condition, status);
                p.ticks_waited = waited;
                p.discharge_remaining = 3;
                let mut terminal_seen = false;
                for _ in 0..ticks {
                    let t = advance(&mut p, &params(), ext);
                    prop_assert!((CONDITION_MIN..=CONDITION_MAX).contains(&p.condition));
                    if terminal_seen {
                        prop_assert_eq!(t, None);
                    }
                    terminal_seen |= p.is_terminal();
                }
            }
        }
    }
}
