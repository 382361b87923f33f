use super::atom::Atom;
use super::molecule::Molecule;
use crate::core::error::GeometryError;

/// A transient, mutable construction path for `Molecule`.
///
/// Parsers accumulate atoms and 1-based bond records here and validate
/// everything in one shot at `build()`; no mutable molecule state ever
/// escapes. Bond records may reference atoms added later.
#[derive(Debug, Clone, Default)]
pub struct MoleculeBuilder {
    name: String,
    energy: f64,
    atoms: Vec<Atom>,
    bonds: Vec<(usize, usize, f64)>,
}

impl MoleculeBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Sets the energy annotation.
    pub fn energy(&mut self, energy: f64) -> &mut Self {
        self.energy = energy;
        self
    }

    /// Appends an atom and returns its 1-based atom number.
    pub fn add_atom(&mut self, atom: Atom) -> usize {
        self.atoms.push(atom);
        self.atoms.len()
    }

    /// Records a bond between two 1-based atom numbers. Validation is
    /// deferred to `build()`.
    pub fn add_bond(&mut self, i: usize, j: usize, order: f64) -> &mut Self {
        self.bonds.push((i, j, order));
        self
    }

    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    /// Validates and produces the immutable molecule.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::InvalidArgument` under the same contract as
    /// `Molecule::new`: duplicate atoms, bad bond endpoints, non-positive
    /// bond order.
    pub fn build(self) -> Result<Molecule, GeometryError> {
        Molecule::new(self.name, self.atoms, &self.bonds, self.energy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::element::Element;
    use nalgebra::Point3;

    fn carbon(x: f64) -> Atom {
        Atom::new(Element::Carbon, Point3::new(x, 0.0, 0.0), 0).unwrap()
    }

    #[test]
    fn builds_a_molecule_with_forward_bond_references() {
        let mut builder = MoleculeBuilder::new("ethane-ish");
        // bond recorded before its second endpoint exists
        builder.add_bond(1, 2, 1.0);
        assert_eq!(builder.add_atom(carbon(0.0)), 1);
        assert_eq!(builder.add_atom(carbon(1.5)), 2);
        builder.energy(-1.25);

        let molecule = builder.build().unwrap();
        assert_eq!(molecule.name(), "ethane-ish");
        assert_eq!(molecule.len(), 2);
        assert_eq!(molecule.energy(), -1.25);
        assert!(molecule.directly_connected_numbered(1, 2));
    }

    #[test]
    fn build_rejects_dangling_bonds() {
        let mut builder = MoleculeBuilder::new("bad");
        builder.add_atom(carbon(0.0));
        builder.add_bond(1, 2, 1.0);
        assert!(builder.build().is_err());
    }

    #[test]
    fn build_rejects_duplicate_atoms() {
        let mut builder = MoleculeBuilder::new("dup");
        builder.add_atom(carbon(0.0));
        builder.add_atom(carbon(0.0));
        assert!(builder.build().is_err());
    }
}
