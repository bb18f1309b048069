//! Memoryless patient arrival process.
//!
//! Inter-arrival gaps are drawn from an exponential distribution with the
//! configured rate and floored to whole ticks. The exponential is sampled
//! by inversion to avoid pulling in `rand_distr` for a single
//! distribution.

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use simicu_core::Archetype;

use crate::config::IcuConfig;

/// A patient to be created this tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArrivalDraw {
    /// Initial condition, an integer within the configured band.
    pub condition: f64,
    /// Archetype, drawn only in the extended variant.
    pub archetype: Option<Archetype>,
}

/// Seeded Poisson arrival process.
///
/// Owns the ward's RNG stream; no other component draws from it.
#[derive(Clone, Debug)]
pub struct PoissonArrivals {
    rng: ChaCha8Rng,
    rate: f64,
    band: (f64, f64),
    draw_archetype: bool,
    next_arrival: Option<u64>,
}

impl PoissonArrivals {
    /// Create the process and schedule the first arrival relative to tick 0.
    pub fn new(config: &IcuConfig, seed: u64) -> Self {
        let mut arrivals = Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            rate: config.arrival_rate,
            band: config.initial_condition,
            draw_archetype: config.is_extended(),
            next_arrival: None,
        };
        arrivals.next_arrival = arrivals.schedule(0);
        arrivals
    }

    /// Reseed and reschedule from tick 0.
    pub fn reset(&mut self, seed: u64) {
        self.rng = ChaCha8Rng::seed_from_u64(seed);
        self.next_arrival = self.schedule(0);
    }

    /// Tick of the next scheduled arrival, or `None` when arrivals are
    /// disabled.
    pub fn next_arrival(&self) -> Option<u64> {
        self.next_arrival
    }

    /// Poll for an arrival at `tick`.
    ///
    /// At most one patient arrives per call no matter how far `tick` has
    /// overshot the schedule; the next arrival is then drawn relative to
    /// `tick`.
    pub fn poll(&mut self, tick: u64) -> Option<ArrivalDraw> {
        let due = self.next_arrival?;
        if tick < due {
            return None;
        }
        let draw = ArrivalDraw {
            condition: self.draw_condition(),
            archetype: self.draw_archetype(),
        };
        self.next_arrival = self.schedule(tick);
        Some(draw)
    }

    fn schedule(&mut self, from: u64) -> Option<u64> {
        if self.rate <= 0.0 {
            return None;
        }
        // Inversion sampling: 1 - u is in (0, 1], so ln is finite.
        let u: f64 = self.rng.random();
        let gap = -(1.0 - u).ln() / self.rate;
        // Float-to-int casts saturate, so huge gaps just push the arrival out.
        Some(from.saturating_add(gap.floor() as u64))
    }

    fn draw_condition(&mut self) -> f64 {
        let (lo, hi) = self.band;
        let lo_i = lo.ceil() as i64;
        let hi_i = hi.floor() as i64;
        if lo_i > hi_i {
            // The band holds no integer; use its lower edge.
            return lo;
        }
        self.rng.random_range(lo_i..=hi_i) as f64
    }

    fn draw_archetype(&mut self) -> Option<Archetype> {
        if !self.draw_archetype {
            return None;
        }
        let i = self.rng.random_range(0..Archetype::ALL.len());
        Some(Archetype::ALL[i])
    }
}
