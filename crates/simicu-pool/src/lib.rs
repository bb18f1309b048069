//! Fixed-size resource pools for SimICU wards.
//!
//! Every nurse, bed, and ventilator lives in an index-addressed pool.
//! Patients never own resources; they record the [`ResourceId`] they
//! were granted, and the pool records the holder. Both sides are kept
//! mutually consistent by the only two mutators, `reserve` and
//! `release`.
//!
//! # Architecture
//!
//! ```text
//! ResourcePools
//! ├── ResourcePool (nurses)       slots: [Option<PatientId>], free: u32
//! ├── ResourcePool (beds)
//! └── ResourcePool (ventilators)
//!
//! Reservation<'_>  (guard over &mut ResourcePools)
//! ├── take(kind)   reserve lowest free slot, remember it
//! ├── commit()     keep everything taken
//! └── drop         release everything taken (all-or-nothing)
//! ```
//!
//! [`ResourceId`]: simicu_core::ResourceId

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod pool;
pub mod pools;
pub mod reservation;

pub use error::PoolError;
pub use pool::ResourcePool;
pub use pools::ResourcePools;
pub use reservation::Reservation;
