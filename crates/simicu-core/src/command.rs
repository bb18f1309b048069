//! Decisions submitted once per tick and the receipts reporting their fate.

use std::fmt;

use crate::error::ActionError;
use crate::id::PatientId;

/// What a decision-maker asks the ward to do with one patient.
///
/// The discriminants are the wire codes used by automated
/// decision-makers and the replay log.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Action {
    /// Reserve a bed and a nurse for a waiting patient.
    AdmitBed = 0,
    /// Reserve a ventilator. A waiting patient is admitted to a bed first;
    /// a patient already in bed is escalated.
    AdmitVentilator = 1,
    /// Deliberately do nothing this tick.
    NoOp = 2,
}

impl Action {
    /// Number of distinct actions.
    pub const COUNT: usize = 3;

    /// The wire code of this action.
    pub fn code(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for Action {
    type Error = ActionError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::AdmitBed),
            1 => Ok(Self::AdmitVentilator),
            2 => Ok(Self::NoOp),
            _ => Err(ActionError::UnknownAction { code }),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::AdmitBed => "admit_bed",
            Self::AdmitVentilator => "admit_ventilator",
            Self::NoOp => "no_op",
        };
        f.write_str(s)
    }
}

/// The single decision applied during one tick.
///
/// # Examples
///
/// ```
/// use simicu_core::{Action, Decision, PatientId};
///
/// let admit = Decision::new(PatientId(3), Action::AdmitBed);
/// assert_eq!(admit.patient, Some(PatientId(3)));
///
/// let idle = Decision::idle();
/// assert_eq!(idle.action, Action::NoOp);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Decision {
    /// The targeted patient. `None` when the decision-maker addressed an
    /// empty slot.
    pub patient: Option<PatientId>,
    /// The requested action.
    pub action: Action,
}

impl Decision {
    /// A decision targeting `patient`.
    pub fn new(patient: PatientId, action: Action) -> Self {
        Self {
            patient: Some(patient),
            action,
        }
    }

    /// A no-op with no target.
    pub fn idle() -> Self {
        Self {
            patient: None,
            action: Action::NoOp,
        }
    }
}

impl Default for Decision {
    fn default() -> Self {
        Self::idle()
    }
}

/// Outcome of applying one [`Decision`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Receipt {
    /// The decision this receipt answers.
    pub decision: Decision,
    /// Whether the decision took effect.
    pub applied: bool,
    /// Why the decision was rejected, when `applied` is false.
    pub reason: Option<ActionError>,
    /// Set when a bed patient was escalated to a ventilator, restarting
    /// setup.
    pub setup_delay_incurred: bool,
}

impl Receipt {
    /// A receipt for a decision that took effect.
    pub fn applied(decision: Decision) -> Self {
        Self {
            decision,
            applied: true,
            reason: None,
            setup_delay_incurred: false,
        }
    }

    /// A receipt for a rejected decision.
    pub fn rejected(decision: Decision, reason: ActionError) -> Self {
        Self {
            decision,
            applied: false,
            reason: Some(reason),
            setup_delay_incurred: false,
        }
    }
}
