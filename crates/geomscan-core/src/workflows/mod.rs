//! # Workflows Module
//!
//! The user-facing layer: complete scan procedures built from the pure
//! operations in [`crate::core`]. Each driver takes a template molecule
//! and derives a batch of perturbed structures ready to serialize into
//! quantum-chemistry input files.

pub mod scan;
