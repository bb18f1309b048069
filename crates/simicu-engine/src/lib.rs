//! Ward simulation engine for SimICU.
//!
//! Provides the [`TickEngine`] that owns ward state and runs the
//! arrivals → decision → lifecycle → clock loop, the user-facing
//! [`IcuWorld`], a gym-style [`IcuEnv`] with its batched form
//! [`BatchedEnv`], and heuristic [`DecisionSource`]s.
//!
//! The engine never installs a logger; it emits `log` records at `debug`
//! for arrivals and applied decisions, `trace` for rejections, and `info`
//! for cured and lost patients and episode ends.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod arrival;
pub mod assign;
pub mod batched;
pub mod config;
pub mod env;
pub mod lifecycle;
pub mod lockstep;
pub mod metrics;
pub mod policy;
pub mod score;
pub mod tick;

pub use batched::{BatchError, BatchedEnv};
pub use config::{ConfigError, EnvConfig, ExtendedParams, IcuConfig, LifecycleParams};
pub use env::{EnvError, EnvStep, EpisodeInfo, IcuEnv, StepReport};
pub use lockstep::{IcuWorld, StepResult};
pub use metrics::StepMetrics;
pub use policy::{run_episode, DecisionSource, GreedyPolicy, IdlePolicy};
pub use score::ScoreSummary;
pub use tick::{TickEngine, TickError, TickFault, TickResult};
