//! Pool-specific error types.

use std::error::Error;
use std::fmt;

use simicu_core::{PatientId, ResourceId, ResourceKind};

/// Errors from misuse of a resource pool.
///
/// Running out of resources is not an error here; `find_available`
/// returns `None`. These variants indicate a broken caller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PoolError {
    /// The slot index is past the end of the pool.
    OutOfRange {
        /// Pool the lookup targeted.
        kind: ResourceKind,
        /// The requested slot.
        id: ResourceId,
        /// Pool size.
        capacity: u32,
    },
    /// The slot is already held.
    AlreadyReserved {
        /// Pool the reservation targeted.
        kind: ResourceKind,
        /// The requested slot.
        id: ResourceId,
        /// Current holder.
        holder: PatientId,
    },
    /// The slot is not held, so it cannot be released.
    NotReserved {
        /// Pool the release targeted.
        kind: ResourceKind,
        /// The requested slot.
        id: ResourceId,
    },
    /// Pool and patient bookkeeping disagree.
    Inconsistent {
        /// Pool where the disagreement was found.
        kind: ResourceKind,
        /// Description of the disagreement.
        reason: String,
    },
}

impl fmt::Display for PoolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfRange { kind, id, capacity } => {
                write!(f, "{kind} {id} out of range (capacity {capacity})")
            }
            Self::AlreadyReserved { kind, id, holder } => {
                write!(f, "{kind} {id} already reserved by patient {holder}")
            }
            Self::NotReserved { kind, id } => write!(f, "{kind} {id} is not reserved"),
            Self::Inconsistent { kind, reason } => {
                write!(f, "{kind} pool inconsistent: {reason}")
            }
        }
    }
}

impl Error for PoolError {}
