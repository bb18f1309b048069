//! Reward shaping from tick outcomes.
//!
//! [`RewardComponents`] records the raw, unweighted quantities of one
//! tick; [`RewardComponents::compute`] combines them with
//! [`RewardWeights`] into a scalar. The reward is purely observational:
//! it never feeds back into simulation state.
//!
//! ```text
//! r =  cured * w.cured + lost * w.lost
//!   +  bed_care * w.bed_care + ventilator_care * w.ventilator_care
//!   +  waiting * w.waiting + waiting_severity * w.waiting_severity
//!   +  gridlocked^2 * w.gridlock + nurses_in_use * w.nurse_cost
//!   +  archetype fit term + admission bonus + condition_delta * w.condition_delta
//!   +  fixed penalties (invalid target, unavailable resource, setup delay, idle)
//! ```

use simicu_core::{
    Action, Archetype, PatientStatus, ResourceKind, TickOutcome, WardSnapshot, CONDITION_MAX,
};

/// Weights of every reward term. Penalties are negative.
#[derive(Clone, Debug, PartialEq)]
pub struct RewardWeights {
    /// Per patient cured this tick.
    pub cured: f64,
    /// Per patient lost this tick.
    pub lost: f64,
    /// Per bed patient whose setup has finished.
    pub bed_care: f64,
    /// Per ventilated patient whose setup has finished.
    pub ventilator_care: f64,
    /// Per waiting patient.
    pub waiting: f64,
    /// Times the summed severity `(100 - condition) / 100` of waiting patients.
    pub waiting_severity: f64,
    /// Times the square of the number of patients pending discharge.
    pub gridlock: f64,
    /// Per nurse in use.
    pub nurse_cost: f64,
    /// Decision addressed an empty slot or a terminal patient.
    pub invalid_target: f64,
    /// Decision requested a resource with no free slot.
    pub unavailable_resource: f64,
    /// Escalation restarted setup.
    pub setup_delay: f64,
    /// Respiratory patient put on a ventilator.
    pub respiratory_ventilated: f64,
    /// Respiratory patient given a bed only.
    pub respiratory_bedded: f64,
    /// Non-respiratory patient put on a ventilator.
    pub other_ventilated: f64,
    /// Non-respiratory patient given a bed.
    pub other_bedded: f64,
    /// Times the change in summed condition of patients present before the tick.
    pub condition_delta: f64,
    /// Successful bed admission.
    pub bed_admitted: f64,
    /// Successful ventilator admission or escalation.
    pub ventilator_admitted: f64,
    /// No-op while patients wait and a bed or ventilator is free.
    pub idle_with_capacity: f64,
}

impl Default for RewardWeights {
    fn default() -> Self {
        Self {
            cured: 100.0,
            lost: -150.0,
            bed_care: 1.0,
            ventilator_care: 2.0,
            waiting: -0.05,
            waiting_severity: -0.02,
            gridlock: -0.25,
            nurse_cost: -0.02,
            invalid_target: -5.0,
            unavailable_resource: -2.0,
            setup_delay: -1.0,
            respiratory_ventilated: 2.0,
            respiratory_bedded: -0.5,
            other_ventilated: -1.0,
            other_bedded: 0.5,
            condition_delta: 0.2,
            bed_admitted: 1.0,
            ventilator_admitted: 3.0,
            idle_with_capacity: -0.5,
        }
    }
}

/// State captured before a decision is applied.
///
/// Penalties for bad targets and unavailable resources are judged
/// against the ward as the decision-maker saw it.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DecisionContext {
    /// The decision addressed an empty slot or a terminal patient.
    pub invalid_target: bool,
    /// The requested resource type had no free slot.
    pub resource_unavailable: bool,
    /// Number of patients that had arrived before the tick.
    pub prior_patients: usize,
    /// Summed condition of those patients before the tick.
    pub prior_condition: f64,
}

impl DecisionContext {
    /// Capture the pre-decision state of `ward`.
    ///
    /// `action` is the requested action; resource availability is checked
    /// for bed admissions (bed pool) and ventilator admissions
    /// (ventilator pool).
    pub fn capture(ward: &dyn WardSnapshot, action: Action, invalid_target: bool) -> Self {
        let resource_unavailable = match action {
            Action::AdmitBed => ward.free(ResourceKind::Bed) == 0,
            Action::AdmitVentilator => ward.free(ResourceKind::Ventilator) == 0,
            Action::NoOp => false,
        };
        let patients = ward.patients();
        Self {
            invalid_target,
            resource_unavailable,
            prior_patients: patients.len(),
            prior_condition: patients.iter().map(|p| p.condition).sum(),
        }
    }
}

/// Unweighted reward terms for one tick.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RewardComponents {
    /// Patients cured this tick.
    pub cured: u32,
    /// Patients lost this tick.
    pub lost: u32,
    /// Bed patients past setup.
    pub bed_care: u32,
    /// Ventilated patients past setup.
    pub ventilator_care: u32,
    /// Waiting patients.
    pub waiting: u32,
    /// Summed `(100 - condition) / 100` over waiting patients.
    pub waiting_severity: f64,
    /// Patients pending discharge.
    pub gridlocked: u32,
    /// Nurses in use.
    pub nurses_in_use: u32,
    /// Change in summed condition of patients present before the tick.
    pub condition_delta: f64,
    /// Copied from the [`DecisionContext`].
    pub invalid_target: bool,
    /// Copied from the [`DecisionContext`].
    pub resource_unavailable: bool,
    /// The decision escalated a bed patient and restarted setup.
    pub setup_delay: bool,
    /// The admission that took effect this tick, if any.
    pub admitted: Option<Action>,
    /// Archetype of the admitted patient, when known.
    pub admitted_archetype: Option<Archetype>,
    /// The decision was a no-op while patients waited with beds or
    /// ventilators free.
    pub idle_with_capacity: bool,
}

impl RewardComponents {
    /// Measure every term from the post-tick ward and the tick outcome.
    pub fn measure(ward: &dyn WardSnapshot, outcome: &TickOutcome, ctx: &DecisionContext) -> Self {
        let mut c = Self {
            cured: outcome.newly_cured.len() as u32,
            lost: outcome.newly_lost.len() as u32,
            nurses_in_use: ward.in_use(ResourceKind::Nurse),
            invalid_target: ctx.invalid_target,
            resource_unavailable: ctx.resource_unavailable,
            setup_delay: outcome.receipt.setup_delay_incurred,
            ..Self::default()
        };

        for p in ward.patients() {
            match p.status {
                PatientStatus::Waiting => {
                    c.waiting += 1;
                    c.waiting_severity += (CONDITION_MAX - p.condition) / CONDITION_MAX;
                }
                PatientStatus::InBed if p.receiving_care() => c.bed_care += 1,
                PatientStatus::OnVentilator if p.receiving_care() => c.ventilator_care += 1,
                PatientStatus::PendingDischarge => c.gridlocked += 1,
                _ => {}
            }
        }

        let prior = ctx.prior_patients.min(ward.patients().len());
        let now: f64 = ward.patients()[..prior].iter().map(|p| p.condition).sum();
        c.condition_delta = now - ctx.prior_condition;

        let receipt = &outcome.receipt;
        match receipt.decision.action {
            Action::NoOp => {
                let capacity = ward.free(ResourceKind::Bed) > 0
                    || ward.free(ResourceKind::Ventilator) > 0;
                c.idle_with_capacity = c.waiting > 0 && capacity;
            }
            action if receipt.applied => {
                c.admitted = Some(action);
                c.admitted_archetype = receipt
                    .decision
                    .patient
                    .and_then(|id| ward.patient(id))
                    .and_then(|p| p.archetype);
            }
            _ => {}
        }
        c
    }

    /// Combine the terms into a scalar reward.
    pub fn compute(&self, w: &RewardWeights) -> f64 {
        let mut r = f64::from(self.cured) * w.cured + f64::from(self.lost) * w.lost;
        r += f64::from(self.bed_care) * w.bed_care;
        r += f64::from(self.ventilator_care) * w.ventilator_care;
        r += f64::from(self.waiting) * w.waiting;
        r += self.waiting_severity * w.waiting_severity;
        r += f64::from(self.gridlocked).powi(2) * w.gridlock;
        r += f64::from(self.nurses_in_use) * w.nurse_cost;
        r += self.condition_delta * w.condition_delta;

        if self.invalid_target {
            r += w.invalid_target;
        }
        if self.resource_unavailable {
            r += w.unavailable_resource;
        }
        if self.setup_delay {
            r += w.setup_delay;
        }
        if self.idle_with_capacity {
            r += w.idle_with_capacity;
        }

        match self.admitted {
            Some(Action::AdmitBed) => r += w.bed_admitted,
            Some(Action::AdmitVentilator) => r += w.ventilator_admitted,
            _ => {}
        }
        if let (Some(action), Some(archetype)) = (self.admitted, self.admitted_archetype) {
            r += match (archetype.prefers_ventilator(), action) {
                (true, Action::AdmitVentilator) => w.respiratory_ventilated,
                (true, _) => w.respiratory_bedded,
                (false, Action::AdmitVentilator) => w.other_ventilated,
                (false, _) => w.other_bedded,
            };
        }
        r
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use simicu_core::{Decision, PatientId, Receipt, TickId};
    use simicu_test_utils::MockWard;
    use smallvec::SmallVec;

    fn outcome(receipt: Receipt) -> TickOutcome {
        TickOutcome {
            tick: TickId(1),
            arrival: None,
            receipt,
            newly_cured: SmallVec::new(),
            newly_lost: SmallVec::new(),
            entered_discharge: SmallVec::new(),
            patients_updated: 0,
        }
    }

    #[test]
    fn empty_components_yield_zero() {
        assert_eq!(RewardComponents::default().compute(&RewardWeights::default()), 0.0);
    }

    #[test]
    fn cure_and_loss_scale_per_patient() {
        let w = RewardWeights::default();
        let c = RewardComponents {
            cured: 2,
            lost: 1,
            ..Default::default()
        };
        assert_eq!(c.compute(&w), 200.0 - 150.0);
    }

    #[test]
    fn gridlock_is_superlinear() {
        let w = RewardWeights::default();
        let one = RewardComponents {
            gridlocked: 1,
            ..Default::default()
        };
        let three = RewardComponents {
            gridlocked: 3,
            ..Default::default()
        };
        assert!(three.compute(&w) < 3.0 * one.compute(&w));
        assert_eq!(three.compute(&w), -0.25 * 9.0);
    }

    #[test]
    fn archetype_fit_terms() {
        let w = RewardWeights::default();
        let resp_vent = RewardComponents {
            admitted: Some(Action::AdmitVentilator),
            admitted_archetype: Some(Archetype::Respiratory),
            ..Default::default()
        };
        assert_eq!(resp_vent.compute(&w), 3.0 + 2.0);
        let cardiac_vent = RewardComponents {
            admitted: Some(Action::AdmitVentilator),
            admitted_archetype: Some(Archetype::Cardiac),
            ..Default::default()
        };
        assert_eq!(cardiac_vent.compute(&w), 3.0 - 1.0);
        let trauma_bed = RewardComponents {
            admitted: Some(Action::AdmitBed),
            admitted_archetype: Some(Archetype::Trauma),
            ..Default::default()
        };
        assert_eq!(trauma_bed.compute(&w), 1.0 + 0.5);
    }

    #[test]
    fn capture_flags_unavailable_resource() {
        let mut ward = MockWard::new(6, 10, 4);
        ward.set_free(ResourceKind::Ventilator, 0);
        ward.add_patient(40.0, PatientStatus::Waiting);
        ward.add_patient(60.0, PatientStatus::InBed);

        let ctx = DecisionContext::capture(&ward, Action::AdmitVentilator, false);
        assert!(ctx.resource_unavailable);
        assert_eq!(ctx.prior_patients, 2);
        assert_eq!(ctx.prior_condition, 100.0);

        let ctx = DecisionContext::capture(&ward, Action::AdmitBed, true);
        assert!(!ctx.resource_unavailable);
        assert!(ctx.invalid_target);
    }

    #[test]
    fn measure_counts_care_waiting_and_idle() {
        let mut ward = MockWard::new(6, 10, 4);
        let waiting = ward.add_patient(40.0, PatientStatus::Waiting);
        let bed = ward.add_patient(60.0, PatientStatus::InBed);
        let setup = ward.add_patient(60.0, PatientStatus::OnVentilator);
        ward.patient_mut(setup).ventilator_setup_remaining = 2;
        ward.set_free(ResourceKind::Nurse, 4);
        let ctx = DecisionContext::capture(&ward, Action::NoOp, false);

        // Condition moves after the tick.
        ward.patient_mut(waiting).condition = 39.5;
        ward.patient_mut(bed).condition = 61.5;

        let out = outcome(Receipt::applied(Decision::idle()));
        let c = RewardComponents::measure(&ward, &out, &ctx);
        assert_eq!(c.waiting, 1);
        assert_eq!(c.bed_care, 1);
        assert_eq!(c.ventilator_care, 0);
        assert_eq!(c.nurses_in_use, 2);
        assert!((c.waiting_severity - 0.605).abs() < 1e-12);
        assert!((c.condition_delta - 1.0).abs() < 1e-12);
        assert!(c.idle_with_capacity);
        assert_eq!(c.admitted, None);
    }

    #[test]
    fn condition_delta_ignores_new_arrivals() {
        let mut ward = MockWard::new(6, 10, 4);
        ward.add_patient(50.0, PatientStatus::Waiting);
        let ctx = DecisionContext::capture(&ward, Action::NoOp, false);
        ward.add_patient(55.0, PatientStatus::Waiting);
        let c = RewardComponents::measure(&ward, &outcome(Receipt::applied(Decision::idle())), &ctx);
        assert_eq!(c.condition_delta, 0.0);
    }

    #[test]
    fn applied_admission_records_archetype() {
        let mut ward = MockWard::new(6, 10, 4);
        let id = ward.add_patient(50.0, PatientStatus::OnVentilator);
        ward.patient_mut(id).archetype = Some(Archetype::Respiratory);
        let ctx = DecisionContext::capture(&ward, Action::AdmitVentilator, false);
        let mut receipt = Receipt::applied(Decision::new(PatientId(0), Action::AdmitVentilator));
        receipt.setup_delay_incurred = true;
        let c = RewardComponents::measure(&ward, &outcome(receipt), &ctx);
        assert_eq!(c.admitted, Some(Action::AdmitVentilator));
        assert_eq!(c.admitted_archetype, Some(Archetype::Respiratory));
        assert!(c.setup_delay);
    }

    #[test]
    fn rejected_admission_earns_no_bonus() {
        let ward = MockWard::new(6, 10, 4);
        let ctx = DecisionContext::capture(&ward, Action::AdmitBed, true);
        let receipt = Receipt::rejected(
            Decision::new(PatientId(3), Action::AdmitBed),
            simicu_core::ActionError::UnknownPatient { id: PatientId(3) },
        );
        let c = RewardComponents::measure(&ward, &outcome(receipt), &ctx);
        assert_eq!(c.admitted, None);
        assert_eq!(c.compute(&RewardWeights::default()), -5.0);
    }
}
