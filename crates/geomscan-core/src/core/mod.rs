//! # Core Module
//!
//! The computational foundation of the geometry engine: immutable data
//! structures for molecules and their connectivity, pure geometric
//! operations over them, cheap non-bonded screens, and file adapters for
//! the formats scan jobs speak.
//!
//! ## Architecture
//!
//! - **Molecular Representation** ([`models`]) - Elements, atoms, the
//!   weighted bond graph, torsion handles, and the `Molecule` aggregate
//! - **Geometric Operations** ([`geometry`]) - Internal-coordinate edits,
//!   hybridization fixes, and rigid superposition, all as pure derivations
//! - **Non-Bonded Screens** ([`forcefield`]) - Lennard-Jones steric
//!   scoring and contact/hydrogen-bond heuristics for candidate filtering
//! - **File I/O** ([`io`]) - Gaussian input and Tinker XYZ adapters
//!
//! Every structure here is a plain value: operations never mutate their
//! receiver, a failed operation produces no partial state, and everything
//! is `Send + Sync` by construction.

pub mod error;
pub mod forcefield;
pub mod geometry;
pub mod io;
pub mod models;
