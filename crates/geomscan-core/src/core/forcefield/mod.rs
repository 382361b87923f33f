//! Cheap non-bonded screens used to rank and filter scan candidates: a
//! Lennard-Jones steric score, hard-contact checks, and the intermolecular
//! hydrogen-bond heuristic behind placement combination.

pub mod contacts;
pub mod steric;
