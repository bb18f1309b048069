//! Strongly-typed identifiers and the [`ResourceKind`] enum.

use std::fmt;

/// Identifies a patient within a single simulation instance.
///
/// Assigned sequentially at arrival and never reused, so ordering by
/// `PatientId` is ordering by arrival.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PatientId(pub u64);

impl fmt::Display for PatientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for PatientId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

/// Index of a resource slot within its pool.
///
/// `ResourceId(n)` is the n-th nurse, bed, or ventilator depending on
/// the pool it was drawn from. Pools hand out the lowest free index
/// first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId(pub u32);

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for ResourceId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Monotonically increasing tick counter.
///
/// Incremented once at the end of every simulation step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct TickId(pub u64);

impl fmt::Display for TickId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for TickId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

/// The three scarce resource types a ward allocates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceKind {
    /// Nursing staff. One is bound to every admitted patient.
    Nurse,
    /// A ward bed.
    Bed,
    /// A mechanical ventilator. Always paired with a bed and a nurse.
    Ventilator,
}

impl ResourceKind {
    /// Every kind, in the canonical order used for hashing and encoding.
    pub const ALL: [ResourceKind; 3] = [Self::Nurse, Self::Bed, Self::Ventilator];

    /// Position of this kind within [`ResourceKind::ALL`].
    pub fn index(self) -> usize {
        match self {
            Self::Nurse => 0,
            Self::Bed => 1,
            Self::Ventilator => 2,
        }
    }

    /// Lower-case display name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Nurse => "nurse",
            Self::Bed => "bed",
            Self::Ventilator => "ventilator",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
