//! SimICU: a discrete-time ICU resource-allocation simulation for
//! reinforcement learning.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all SimICU sub-crates. For most users, adding `simicu` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use simicu::prelude::*;
//!
//! let mut env = IcuEnv::new(EnvConfig::default()).unwrap();
//! let mut policy = GreedyPolicy::new(*env.encoder().layout());
//!
//! let (mut obs, _) = env.reset(42).unwrap();
//! while !env.is_done() {
//!     let (slot, action) = policy.decide(&obs);
//!     let step = env.step(slot, action.code()).unwrap();
//!     assert!(step.observation.iter().all(|v| (0.0..=1.0).contains(v)));
//!     obs = step.observation;
//! }
//! assert_eq!(env.world().tick_id(), TickId(300));
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `simicu-core` | IDs, patients, decisions, receipts, `WardSnapshot` |
//! | [`pool`] | `simicu-pool` | Resource pools and all-or-nothing reservations |
//! | [`obs`] | `simicu-obs` | Observation layout, encoding, and reward shaping |
//! | [`engine`] | `simicu-engine` | Tick driver, environments, and heuristics |
//! | [`replay`] | `simicu-replay` | Deterministic replay recording and verification |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types, traits, and IDs (`simicu-core`).
///
/// Contains patients and their status machine, decisions, receipts,
/// error types, and the read-only [`types::WardSnapshot`] trait.
pub use simicu_core as types;

/// Resource pools (`simicu-pool`).
///
/// [`pool::ResourcePools`] owns the nurse, bed, and ventilator pools;
/// [`pool::Reservation`] reserves several slots or none.
pub use simicu_pool as pool;

/// Observation encoding and reward shaping (`simicu-obs`).
///
/// [`obs::ObsLayout`] fixes the vector shape, [`obs::ObsEncoder`] fills
/// it, and [`obs::RewardComponents`] scores a tick.
pub use simicu_obs as obs;

/// Simulation engine (`simicu-engine`).
///
/// [`engine::IcuWorld`] for stepping one decision at a time,
/// [`engine::IcuEnv`] for gym-style training loops, and
/// [`engine::BatchedEnv`] for vectorized training.
pub use simicu_engine as engine;

/// Deterministic replay recording and verification (`simicu-replay`).
///
/// Record episodes with [`replay::ReplayWriter`], replay and verify
/// determinism with [`replay::ReplayReader`].
pub use simicu_replay as replay;

/// Common imports for typical SimICU usage.
///
/// ```rust
/// use simicu::prelude::*;
/// ```
pub mod prelude {
    // Core types and traits
    pub use simicu_core::{
        Action, Archetype, Decision, Patient, PatientId, PatientStatus, Receipt, ResourceKind,
        TickId, TickOutcome, WardSnapshot,
    };

    // Errors
    pub use simicu_core::{ActionError, ObsError};

    // Observation
    pub use simicu_obs::{ObsEncoder, ObsLayout, RewardWeights, SlotOrder};

    // Engine
    pub use simicu_engine::{
        BatchedEnv, DecisionSource, EnvConfig, EnvError, GreedyPolicy, IcuConfig, IcuEnv,
        IcuWorld, IdlePolicy, StepMetrics, StepResult,
    };
}
