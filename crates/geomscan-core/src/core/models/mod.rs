//! The immutable molecular data model: elements, atoms, the weighted bond
//! graph, torsion handles, and the `Molecule` aggregate they compose into.

pub mod atom;
pub mod builder;
pub mod element;
pub mod graph;
pub mod molecule;
pub mod torsion;
