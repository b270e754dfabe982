//! # Core Module
//!
//! Foundation types shared by every geometry routine: the periodic cell
//! representation, the error taxonomy, and the batching configuration.
//!
//! ## Overview
//!
//! - **Cell representation** ([`lattice`]) - The [`lattice::Lattice`] value
//!   type: a 3x3 row-vector basis with a construction-time inverse cache for
//!   fractional/Cartesian conversion.
//! - **Error taxonomy** ([`error`]) - [`error::GeomError`], covering every
//!   validation failure the geometry layer can report.
//! - **Batching** ([`config`]) - [`config::BatchConfig`], the explicit
//!   memory/throughput knob for the pairwise routines.
//!
//! Everything in this module is a plain value type; there is no shared
//! mutable state, and all types are `Send + Sync`.

pub mod config;
pub mod error;
pub mod lattice;
