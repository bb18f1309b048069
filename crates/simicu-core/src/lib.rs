//! Core types and traits for the SimICU ward simulation.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the fundamental vocabulary shared by the rest of the workspace:
//! identifiers, patients and their status machine, decisions and
//! receipts, per-tick outcomes, error types, and the read-only
//! [`WardSnapshot`] trait consumed by observers.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod command;
pub mod error;
pub mod id;
pub mod outcome;
pub mod patient;
pub mod traits;

pub use command::{Action, Decision, Receipt};
pub use error::{ActionError, ObsError};
pub use id::{PatientId, ResourceId, ResourceKind, TickId};
pub use outcome::TickOutcome;
pub use patient::{Archetype, Patient, PatientStatus, CONDITION_MAX, CONDITION_MIN};
pub use traits::WardSnapshot;
