//! Pure geometric operations over molecules: internal-coordinate edits
//! (bond lengths, bend angles, dihedrals), hybridization fixes, and rigid
//! superposition. Every operation derives a new `Molecule`.

pub mod edits;
pub mod hybrid;
pub mod superpose;
