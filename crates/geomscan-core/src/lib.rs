//! # GeomScan Core Library
//!
//! An immutable molecular-geometry engine for computational-chemistry
//! scan workflows.
//!
//! ## Architectural Philosophy
//!
//! The library is split into two layers with a strict dependency
//! direction:
//!
//! - **[`core`]: The Foundation.** Immutable data models (`Molecule`,
//!   `Atom`, `BondGraph`, torsions), pure geometric edit operations
//!   (bond lengths, bend angles, dihedrals, hybridization fixes, rigid
//!   superposition), non-bonded screening heuristics, and file adapters
//!   for Gaussian and Tinker formats.
//!
//! - **[`workflows`]: The Public API.** Scan drivers that compose core
//!   operations into complete procedures: bond-length and dihedral grids,
//!   and the two-distance angle search used to pose reactive pairs.
//!
//! Every operation derives a new value. There is no interior mutability
//! anywhere in the crate: a `Molecule` handed to another thread or held
//! across a scan loop can never change underneath its owner, and a failed
//! edit leaves no partial state behind.

pub mod core;
pub mod workflows;
