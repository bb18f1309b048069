//! Error types shared across the SimICU workspace.
//!
//! Rejected decisions are not failures of the simulation: the tick still
//! advances and the rejection is reported through a
//! [`Receipt`](crate::Receipt) carrying an [`ActionError`].

use std::error::Error;
use std::fmt;

use crate::command::Action;
use crate::id::PatientId;
use crate::patient::PatientStatus;

/// Why a decision was rejected.
///
/// A rejection never leaves partial state behind: either every resource
/// the action needs is reserved, or none are.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActionError {
    /// No patient with this id has ever arrived.
    UnknownPatient {
        /// The requested id.
        id: PatientId,
    },
    /// The decision named no patient and was not a no-op.
    NoTarget,
    /// A decision-maker addressed an observation slot with no patient in it.
    InvalidSlot {
        /// The requested slot index.
        slot: usize,
    },
    /// The patient is already cured or lost.
    TerminalPatient {
        /// The targeted patient.
        id: PatientId,
        /// Its terminal status.
        status: PatientStatus,
    },
    /// The patient has recovered and is awaiting discharge.
    PendingDischarge {
        /// The targeted patient.
        id: PatientId,
    },
    /// The action does not apply to the patient's current status
    /// (e.g. a bed admission for a patient already in bed).
    NotEligible {
        /// The targeted patient.
        id: PatientId,
        /// The patient's status at decision time.
        status: PatientStatus,
        /// The requested action.
        action: Action,
    },
    /// No free bed.
    NoBed,
    /// No free nurse.
    NoNurse,
    /// No free ventilator.
    NoVentilator,
    /// The raw action code is outside `0..=2`.
    UnknownAction {
        /// The offending code.
        code: u8,
    },
}

impl ActionError {
    /// Whether the rejection was caused by an empty resource pool rather
    /// than by the choice of patient or action.
    pub fn is_resource_shortage(&self) -> bool {
        matches!(self, Self::NoBed | Self::NoNurse | Self::NoVentilator)
    }
}

impl fmt::Display for ActionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownPatient { id } => write!(f, "unknown patient {id}"),
            Self::NoTarget => write!(f, "decision has no target patient"),
            Self::InvalidSlot { slot } => write!(f, "slot {slot} holds no patient"),
            Self::TerminalPatient { id, status } => {
                write!(f, "patient {id} is already {status}")
            }
            Self::PendingDischarge { id } => {
                write!(f, "patient {id} is awaiting discharge")
            }
            Self::NotEligible { id, status, action } => {
                write!(f, "cannot apply {action} to patient {id} while {status}")
            }
            Self::NoBed => write!(f, "no free bed"),
            Self::NoNurse => write!(f, "no free nurse"),
            Self::NoVentilator => write!(f, "no free ventilator"),
            Self::UnknownAction { code } => write!(f, "unknown action code {code}"),
        }
    }
}

impl Error for ActionError {}

/// Errors from observation encoding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ObsError {
    /// The caller's output buffer does not match the layout length.
    BufferSizeMismatch {
        /// Length the layout requires.
        expected: usize,
        /// Length the caller provided.
        actual: usize,
    },
    /// The layout cannot be built from the given parameters.
    InvalidLayout {
        /// Description of the problem.
        reason: String,
    },
}

impl fmt::Display for ObsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BufferSizeMismatch { expected, actual } => {
                write!(f, "observation buffer has {actual} elements, expected {expected}")
            }
            Self::InvalidLayout { reason } => write!(f, "invalid observation layout: {reason}"),
        }
    }
}

impl Error for ObsError {}
