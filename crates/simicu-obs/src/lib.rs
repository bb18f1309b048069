//! Observation encoding and reward shaping for SimICU.
//!
//! Projects a [`WardSnapshot`](simicu_core::WardSnapshot) into a
//! fixed-length vector of `f32` values in `[0, 1]` and computes a scalar
//! shaping reward from the outcome of a tick. Neither component mutates
//! the simulation.
//!
//! # Layout
//!
//! ```text
//! [ slot 0 | slot 1 | ... | slot N-1 | free_beds free_nurses free_vents tick ]
//!   slot = condition wait status [archetype]
//! ```
//!
//! Denominators are fixed (100 for condition, `max_ticks` for wait and
//! tick, pool sizes for free fractions, the maximum status code for
//! status), so a trained decision-maker sees identical scales across
//! episodes.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod encoder;
pub mod layout;
pub mod reward;

pub use encoder::ObsEncoder;
pub use layout::{GlobalFeatures, ObsLayout, SlotFeatures, SlotOrder};
pub use reward::{DecisionContext, RewardComponents, RewardWeights};
