//! # Geometry Module
//!
//! The computational surface of the crate: pure functions (and the immutable
//! [`simplex::Simplex`] value) over caller-owned coordinate data.
//!
//! ## Overview
//!
//! - **Tolerance matching** ([`matching`]) - Membership, subset, and index
//!   mapping queries on Cartesian coordinate lists, no wraparound.
//! - **Periodic matching** ([`pbc`]) - The same queries on fractional
//!   coordinates under per-axis periodic boundary conditions, plus the
//!   minimum-image fractional difference.
//! - **Displacement engine** ([`displacement`]) - Minimum-image shortest
//!   Cartesian vectors and squared distances between two fractional point
//!   sets; the cost center of the crate.
//! - **Supercell enumeration** ([`supercell`]) - Primitive lattice points
//!   inside an integer supercell transform.
//! - **Simplex geometry** ([`simplex`]) - Barycentric transforms,
//!   containment, volume, and line intersections for phase-diagram facets.
//! - **Scalar helpers** ([`scalar`]) - Linear interpolation and vector
//!   angles.
//!
//! All functions here are synchronous and allocation is proportional to the
//! query size; callers may run them concurrently without synchronization.

pub mod displacement;
pub mod matching;
pub mod pbc;
pub mod scalar;
pub mod simplex;
pub mod supercell;
