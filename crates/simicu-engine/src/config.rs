//! Ward and environment configuration, validation, and error types.
//!
//! [`IcuConfig`] describes one ward: pool sizes, the arrival process, the
//! lifecycle rates, and the optional extended variant. [`EnvConfig`] wraps
//! it with the episode shape and reward weights seen by a decision-maker.
//! Both are validated once at construction.

use std::error::Error;
use std::fmt;

use simicu_core::{ObsError, ResourceKind, CONDITION_MAX, CONDITION_MIN};
use simicu_obs::{ObsLayout, RewardWeights, SlotOrder};

// ── LifecycleParams ────────────────────────────────────────────────

/// Per-tick condition dynamics.
#[derive(Clone, Debug, PartialEq)]
pub struct LifecycleParams {
    /// Base condition loss per waiting tick. Default: 0.5.
    pub wait_decay: f64,
    /// Extra loss per completed block of waited ticks. Default: 0.1.
    pub wait_accel: f64,
    /// Size of a wait block, in ticks. Default: 20.
    pub wait_accel_block: u32,
    /// Condition gain per tick of completed bed care. Must be below
    /// `vent_rate`. Default: 1.5.
    pub bed_rate: f64,
    /// Condition gain per tick of completed ventilation. Default: 3.0.
    pub vent_rate: f64,
    /// Ticks before bed care takes effect. Default: 3.
    pub bed_setup_ticks: u32,
    /// Ticks before ventilation takes effect. Must exceed
    /// `bed_setup_ticks`. Default: 5.
    pub vent_setup_ticks: u32,
}

impl Default for LifecycleParams {
    fn default() -> Self {
        Self {
            wait_decay: 0.5,
            wait_accel: 0.1,
            wait_accel_block: 20,
            bed_rate: 1.5,
            vent_rate: 3.0,
            bed_setup_ticks: 3,
            vent_setup_ticks: 5,
        }
    }
}

// ── ExtendedParams ─────────────────────────────────────────────────

/// Settings of the extended variant: archetypes and discharge gridlock.
#[derive(Clone, Debug, PartialEq)]
pub struct ExtendedParams {
    /// Ticks a recovered patient keeps its resources before discharge.
    /// Default: 4.
    pub discharge_delay_ticks: u32,
}

impl Default for ExtendedParams {
    fn default() -> Self {
        Self {
            discharge_delay_ticks: 4,
        }
    }
}

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected during [`IcuConfig::validate()`] and
/// [`EnvConfig::validate()`].
#[derive(Debug, PartialEq)]
pub enum ConfigError {
    /// A resource pool has zero capacity.
    EmptyPool {
        /// The empty pool.
        kind: ResourceKind,
    },
    /// `arrival_rate` is NaN, infinite, or negative.
    InvalidArrivalRate {
        /// The invalid value.
        value: f64,
    },
    /// The initial condition band is inverted or leaves `[0, 100]`.
    InvalidConditionBand {
        /// Lower bound.
        lo: f64,
        /// Upper bound.
        hi: f64,
    },
    /// A lifecycle rate is non-finite or negative, or a block size is zero.
    InvalidLifecycle {
        /// Description of the invalid parameter.
        reason: String,
    },
    /// `max_patients` is zero.
    ZeroMaxPatients,
    /// `max_ticks` is zero.
    ZeroMaxTicks,
    /// Warmup consumes the whole episode.
    WarmupTooLong {
        /// Configured warmup ticks.
        warmup_ticks: u64,
        /// Configured episode length.
        max_ticks: u64,
    },
    /// A reward weight is NaN or infinite.
    InvalidRewardWeight {
        /// Name of the weight.
        name: &'static str,
    },
    /// The observation layout is invalid.
    Obs(ObsError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPool { kind } => write!(f, "{kind} pool must have at least one slot"),
            Self::InvalidArrivalRate { value } => {
                write!(f, "arrival_rate must be finite and non-negative, got {value}")
            }
            Self::InvalidConditionBand { lo, hi } => {
                write!(f, "initial condition band [{lo}, {hi}] must be ordered and within [0, 100]")
            }
            Self::InvalidLifecycle { reason } => write!(f, "invalid lifecycle params: {reason}"),
            Self::ZeroMaxPatients => write!(f, "max_patients must be at least 1"),
            Self::ZeroMaxTicks => write!(f, "max_ticks must be at least 1"),
            Self::WarmupTooLong {
                warmup_ticks,
                max_ticks,
            } => write!(
                f,
                "warmup_ticks {warmup_ticks} must be below max_ticks {max_ticks}"
            ),
            Self::InvalidRewardWeight { name } => {
                write!(f, "reward weight '{name}' must be finite")
            }
            Self::Obs(e) => write!(f, "observation: {e}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Obs(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ObsError> for ConfigError {
    fn from(e: ObsError) -> Self {
        Self::Obs(e)
    }
}

// ── IcuConfig ──────────────────────────────────────────────────────

/// Complete configuration of one ward.
#[derive(Clone, Debug, PartialEq)]
pub struct IcuConfig {
    /// Nurse pool size. Default: 6.
    pub num_nurses: u32,
    /// Bed pool size. Default: 10.
    pub num_beds: u32,
    /// Ventilator pool size. Default: 4.
    pub num_ventilators: u32,
    /// Mean arrivals per tick of the Poisson process. Zero disables
    /// arrivals. Default: 0.10.
    pub arrival_rate: f64,
    /// Inclusive integer band for initial condition. Default: (40, 60).
    pub initial_condition: (f64, f64),
    /// RNG seed for arrivals and initial conditions.
    pub seed: u64,
    /// Condition dynamics.
    pub lifecycle: LifecycleParams,
    /// Extended variant. `None` runs the base variant.
    pub extended: Option<ExtendedParams>,
}

impl Default for IcuConfig {
    fn default() -> Self {
        Self {
            num_nurses: 6,
            num_beds: 10,
            num_ventilators: 4,
            arrival_rate: 0.10,
            initial_condition: (40.0, 60.0),
            seed: 0,
            lifecycle: LifecycleParams::default(),
            extended: None,
        }
    }
}

impl IcuConfig {
    /// Validate all structural invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        // 1. Every pool needs at least one slot.
        for (kind, n) in [
            (ResourceKind::Nurse, self.num_nurses),
            (ResourceKind::Bed, self.num_beds),
            (ResourceKind::Ventilator, self.num_ventilators),
        ] {
            if n == 0 {
                return Err(ConfigError::EmptyPool { kind });
            }
        }
        // 2. Arrival rate.
        if !self.arrival_rate.is_finite() || self.arrival_rate < 0.0 {
            return Err(ConfigError::InvalidArrivalRate {
                value: self.arrival_rate,
            });
        }
        // 3. Condition band, ordered and on the life scale.
        let (lo, hi) = self.initial_condition;
        if !(lo.is_finite() && hi.is_finite())
            || lo > hi
            || lo < CONDITION_MIN
            || hi > CONDITION_MAX
        {
            return Err(ConfigError::InvalidConditionBand { lo, hi });
        }
        // 4. Lifecycle rates.
        let l = &self.lifecycle;
        for (name, v) in [
            ("wait_decay", l.wait_decay),
            ("wait_accel", l.wait_accel),
            ("bed_rate", l.bed_rate),
            ("vent_rate", l.vent_rate),
        ] {
            if !v.is_finite() || v < 0.0 {
                return Err(ConfigError::InvalidLifecycle {
                    reason: format!("{name} must be finite and non-negative, got {v}"),
                });
            }
        }
        if l.wait_accel_block == 0 {
            return Err(ConfigError::InvalidLifecycle {
                reason: "wait_accel_block must be at least 1".into(),
            });
        }
        // 5. Ventilation heals faster but takes longer to set up.
        if l.bed_rate >= l.vent_rate {
            return Err(ConfigError::InvalidLifecycle {
                reason: format!(
                    "bed_rate ({}) must be below vent_rate ({})",
                    l.bed_rate, l.vent_rate
                ),
            });
        }
        if l.vent_setup_ticks <= l.bed_setup_ticks {
            return Err(ConfigError::InvalidLifecycle {
                reason: format!(
                    "vent_setup_ticks ({}) must exceed bed_setup_ticks ({})",
                    l.vent_setup_ticks, l.bed_setup_ticks
                ),
            });
        }
        Ok(())
    }

    /// Pool size for `kind`.
    pub fn capacity(&self, kind: ResourceKind) -> u32 {
        match kind {
            ResourceKind::Nurse => self.num_nurses,
            ResourceKind::Bed => self.num_beds,
            ResourceKind::Ventilator => self.num_ventilators,
        }
    }

    /// Whether the extended variant is enabled.
    pub fn is_extended(&self) -> bool {
        self.extended.is_some()
    }
}

// ── EnvConfig ──────────────────────────────────────────────────────

/// Configuration of a gym-style environment around one ward.
#[derive(Clone, Debug, PartialEq)]
pub struct EnvConfig {
    /// The ward.
    pub icu: IcuConfig,
    /// Observation slots. Default: 10.
    pub max_patients: usize,
    /// Episode length in ticks. Default: 300.
    pub max_ticks: u64,
    /// No-op ticks run by `reset` so patients exist at the first
    /// observation. Default: 5.
    pub warmup_ticks: u64,
    /// Slot-to-patient mapping. Default: arrival order.
    pub slot_order: SlotOrder,
    /// Reward weights.
    pub reward: RewardWeights,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            icu: IcuConfig::default(),
            max_patients: 10,
            max_ticks: 300,
            warmup_ticks: 5,
            slot_order: SlotOrder::default(),
            reward: RewardWeights::default(),
        }
    }
}

impl EnvConfig {
    /// Validate the ward and the episode shape.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.icu.validate()?;
        if self.max_patients == 0 {
            return Err(ConfigError::ZeroMaxPatients);
        }
        if self.max_ticks == 0 {
            return Err(ConfigError::ZeroMaxTicks);
        }
        if self.warmup_ticks >= self.max_ticks {
            return Err(ConfigError::WarmupTooLong {
                warmup_ticks: self.warmup_ticks,
                max_ticks: self.max_ticks,
            });
        }
        let w = &self.reward;
        for (name, v) in [
            ("cured", w.cured),
            ("lost", w.lost),
            ("bed_care", w.bed_care),
            ("ventilator_care", w.ventilator_care),
            ("waiting", w.waiting),
            ("waiting_severity", w.waiting_severity),
            ("gridlock", w.gridlock),
            ("nurse_cost", w.nurse_cost),
            ("invalid_target", w.invalid_target),
            ("unavailable_resource", w.unavailable_resource),
            ("setup_delay", w.setup_delay),
            ("respiratory_ventilated", w.respiratory_ventilated),
            ("respiratory_bedded", w.respiratory_bedded),
            ("other_ventilated", w.other_ventilated),
            ("other_bedded", w.other_bedded),
            ("condition_delta", w.condition_delta),
            ("bed_admitted", w.bed_admitted),
            ("ventilator_admitted", w.ventilator_admitted),
            ("idle_with_capacity", w.idle_with_capacity),
        ] {
            if !v.is_finite() {
                return Err(ConfigError::InvalidRewardWeight { name });
            }
        }
        self.obs_layout().validate()?;
        Ok(())
    }

    /// The observation layout implied by this configuration.
    ///
    /// The extended variant gets the extended layout.
    pub fn obs_layout(&self) -> ObsLayout {
        let layout = if self.icu.is_extended() {
            ObsLayout::extended(self.max_patients, self.max_ticks)
        } else {
            ObsLayout::new(self.max_patients, self.max_ticks)
        };
        layout.with_slot_order(self.slot_order)
    }
}
