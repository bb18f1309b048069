//! Hashing utilities for ward and configuration comparison.
//!
//! Uses FNV-1a for fast, deterministic hashing of simulation state. The
//! hashes are for equality checks during replay, not for security.

use simicu_core::{Patient, ResourceId, ResourceKind, WardSnapshot};

/// FNV-1a offset basis for 64-bit.
const FNV_OFFSET: u64 = 0xcbf29ce484222325;
/// FNV-1a prime for 64-bit.
const FNV_PRIME: u64 = 0x00000100000001B3;

#[inline]
fn fnv1a_byte(hash: u64, byte: u8) -> u64 {
    (hash ^ byte as u64).wrapping_mul(FNV_PRIME)
}

#[inline]
fn fnv1a_u32(mut hash: u64, v: u32) -> u64 {
    for &b in &v.to_le_bytes() {
        hash = fnv1a_byte(hash, b);
    }
    hash
}

#[inline]
fn fnv1a_u64(mut hash: u64, v: u64) -> u64 {
    for &b in &v.to_le_bytes() {
        hash = fnv1a_byte(hash, b);
    }
    hash
}

#[inline]
fn fnv1a_slot(hash: u64, slot: Option<ResourceId>) -> u64 {
    match slot {
        Some(ResourceId(id)) => fnv1a_u32(fnv1a_byte(hash, 1), id),
        None => fnv1a_byte(hash, 0),
    }
}

fn fnv1a_patient(mut hash: u64, p: &Patient) -> u64 {
    hash = fnv1a_u64(hash, p.id.0);
    hash = fnv1a_u64(hash, p.condition.to_bits());
    hash = fnv1a_byte(hash, p.status.code());
    hash = fnv1a_u32(hash, p.ticks_waited);
    hash = fnv1a_u32(hash, p.bed_setup_remaining);
    hash = fnv1a_u32(hash, p.ventilator_setup_remaining);
    hash = fnv1a_u32(hash, p.discharge_remaining);
    hash = fnv1a_byte(hash, p.archetype.map_or(0, |a| a.code()));
    hash = fnv1a_slot(hash, p.nurse);
    hash = fnv1a_slot(hash, p.bed);
    fnv1a_slot(hash, p.ventilator)
}

/// Compute a hash over the complete observable state of a ward.
///
/// Folds in the tick, the cumulative counters, every pool's free count,
/// and every field of every patient (conditions via `f64::to_bits()`).
/// Patient order matters, so two wards hash equal only when their
/// patient lists agree element by element.
pub fn ward_hash(ward: &dyn WardSnapshot) -> u64 {
    let mut hash = FNV_OFFSET;
    hash = fnv1a_u64(hash, ward.tick_id().0);
    hash = fnv1a_u64(hash, ward.patients_saved());
    hash = fnv1a_u64(hash, ward.patients_lost());
    for kind in ResourceKind::ALL {
        hash = fnv1a_u32(hash, ward.free(kind));
    }

    let patients = ward.patients();
    hash = fnv1a_u64(hash, patients.len() as u64);
    for p in patients {
        hash = fnv1a_patient(hash, p);
    }
    hash
}

/// Compute a hash over configuration scalars.
///
/// Hashes the seed, the pool sizes, and each parameter's bit pattern.
/// Callers pass every tunable that affects dynamics in a fixed order;
/// used to refuse replaying a log against a different configuration.
pub fn config_hash(seed: u64, pool_sizes: [u32; 3], params: &[f64]) -> u64 {
    let mut hash = FNV_OFFSET;
    hash = fnv1a_u64(hash, seed);
    for size in pool_sizes {
        hash = fnv1a_u32(hash, size);
    }
    hash = fnv1a_u32(hash, params.len() as u32);
    for p in params {
        hash = fnv1a_u64(hash, p.to_bits());
    }
    hash
}
