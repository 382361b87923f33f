//! Thin adapters between the in-memory model and the quantum-chemistry
//! file formats scan jobs consume and produce.

pub mod gjf;
pub mod traits;
pub mod xyz;
