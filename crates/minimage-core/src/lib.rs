//! # minimage
//!
//! Periodic-boundary coordinate geometry for crystalline systems: the
//! numerical core underneath structure matching, neighbor finding, and
//! phase-diagram construction.
//!
//! ## Architectural Philosophy
//!
//! The library is a pure computational kernel. Every entry point takes
//! caller-owned data (a lattice basis, coordinate slices, tolerances) and
//! returns a fresh value; nothing retains state between calls, so the whole
//! API is safe to drive from multiple threads.
//!
//! - **[`core`]: The Foundation.** The [`core::lattice::Lattice`] cell
//!   representation with its construction-time inverse cache, the
//!   [`core::error::GeomError`] validation taxonomy, and the
//!   [`core::config::BatchConfig`] memory/throughput knob.
//!
//! - **[`geometry`]: The Computational Surface.** Tolerance-based and
//!   periodic coordinate matching, the minimum-image shortest-vector
//!   engine, supercell lattice-point enumeration, simplex/barycentric
//!   geometry, and scalar helpers.
//!
//! ## Conventions
//!
//! Lattice matrices are row-vector bases: row i is lattice vector i, and a
//! fractional coordinate `f` maps to the Cartesian point `f · M`. Fractional
//! coordinates are wrapped with the minimum-image rule `d - round(d)` on
//! periodic axes, keeping differences in `[-0.5, 0.5)`. Tolerances are
//! absolute and componentwise unless a function documents otherwise.

pub mod core;
pub mod geometry;
