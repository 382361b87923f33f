use super::atom::Atom;
use super::molecule::Molecule;
use crate::core::error::GeometryError;
use nalgebra::Point3;
use std::collections::{HashMap, HashSet};

/// The signed dihedral angle defined by four points, in degrees, in the
/// range (-180, 180].
///
/// Uses the atan2 formulation over the three bond vectors, which is stable
/// away from the collinear degeneracy. When either bonded triple is
/// collinear the dihedral is undefined; this returns 0.0 and emits a
/// warning rather than failing, matching long-standing engine behavior
/// that downstream scan drivers rely on.
pub fn dihedral_angle(
    p1: &Point3<f64>,
    p2: &Point3<f64>,
    p3: &Point3<f64>,
    p4: &Point3<f64>,
) -> f64 {
    let b1 = p2 - p1;
    let b2 = p3 - p2;
    let b3 = p4 - p3;

    let n1 = b1.cross(&b2);
    let n2 = b2.cross(&b3);
    if n1.norm() < 1e-10 || n2.norm() < 1e-10 {
        tracing::warn!("dihedral over collinear points is undefined, reporting 0.0");
        return 0.0;
    }

    let y = (b1 * b2.norm()).dot(&n2);
    let x = n1.dot(&n2);
    y.atan2(x).to_degrees()
}

/// A torsion captured as four concrete atoms plus the precomputed set of
/// atoms that move when the dihedral changes.
///
/// Bound to the geometry it was built from: after any edit that moves one
/// of its atoms, the torsion no longer matches the derived molecule and
/// `Molecule::set_dihedral` will reject it. Use `IndexTorsion` when the
/// torsion must survive edits.
#[derive(Debug, Clone, PartialEq)]
pub struct AtomTorsion {
    atoms: [Atom; 4],
    rotate_set: Vec<Atom>,
}

impl AtomTorsion {
    /// Captures the a1-a2-a3-a4 torsion from a molecule. The rotate set is
    /// the half-graph on the a3 side of the a2-a3 bond.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if any atom is absent, the four are not pairwise
    /// distinct, or a2-a3 is not a bond; `RingDetected` if a2-a3 lies on a
    /// ring.
    pub fn new(
        molecule: &Molecule,
        a1: &Atom,
        a2: &Atom,
        a3: &Atom,
        a4: &Atom,
    ) -> Result<Self, GeometryError> {
        let atoms = [*a1, *a2, *a3, *a4];
        check_distinct(&atoms)?;
        for atom in &atoms {
            if !molecule.contains_atom(atom) {
                return Err(GeometryError::InvalidArgument(format!(
                    "torsion atom not in molecule: {}",
                    atom
                )));
            }
        }
        let downstream = molecule.half_graph(a2, a3)?;
        if downstream.is_empty() {
            return Err(GeometryError::InvalidArgument(
                "torsion atoms 2 and 3 are not bonded".to_string(),
            ));
        }
        Ok(Self {
            atoms,
            rotate_set: downstream.into_iter().collect(),
        })
    }

    pub fn atoms(&self) -> &[Atom; 4] {
        &self.atoms
    }

    /// The atoms that move when this dihedral is driven.
    pub fn rotate_set(&self) -> &[Atom] {
        &self.rotate_set
    }

    /// The current dihedral in degrees.
    pub fn dihedral(&self) -> f64 {
        dihedral_angle(
            &self.atoms[0].position,
            &self.atoms[1].position,
            &self.atoms[2].position,
            &self.atoms[3].position,
        )
    }

    /// Re-expresses this torsion as 1-based atom numbers in `molecule`.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if any captured atom is absent from `molecule`.
    pub fn to_index_torsion(&self, molecule: &Molecule) -> Result<IndexTorsion, GeometryError> {
        let number = |atom: &Atom| {
            molecule.atom_number(atom).ok_or_else(|| {
                GeometryError::InvalidArgument(format!("torsion atom not in molecule: {}", atom))
            })
        };
        let numbers = [
            number(&self.atoms[0])?,
            number(&self.atoms[1])?,
            number(&self.atoms[2])?,
            number(&self.atoms[3])?,
        ];
        let rotate = self
            .rotate_set
            .iter()
            .map(number)
            .collect::<Result<Vec<_>, _>>()?;
        IndexTorsion::new(numbers[0], numbers[1], numbers[2], numbers[3], rotate)
    }
}

/// A torsion captured as 1-based atom numbers.
///
/// Positional, not value-bound: it stays valid across geometric edits as
/// long as the molecule keeps its atom ordering, which makes it the
/// natural handle for scan loops that drive the same dihedral repeatedly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexTorsion {
    numbers: [usize; 4],
    rotate: Vec<usize>,
}

impl IndexTorsion {
    /// # Errors
    ///
    /// `InvalidArgument` when any number is 0, the four are not pairwise
    /// distinct, the rotate list is empty, contains 0, or omits the
    /// fourth atom.
    pub fn new(
        a1: usize,
        a2: usize,
        a3: usize,
        a4: usize,
        rotate: Vec<usize>,
    ) -> Result<Self, GeometryError> {
        let numbers = [a1, a2, a3, a4];
        if numbers.contains(&0) || rotate.contains(&0) {
            return Err(GeometryError::InvalidArgument(
                "atom numbers are 1-based; 0 is not a valid number".to_string(),
            ));
        }
        for i in 0..4 {
            for j in (i + 1)..4 {
                if numbers[i] == numbers[j] {
                    return Err(GeometryError::InvalidArgument(format!(
                        "torsion atom numbers must be distinct, got {:?}",
                        numbers
                    )));
                }
            }
        }
        if rotate.is_empty() {
            return Err(GeometryError::InvalidArgument(
                "torsion rotate list is empty".to_string(),
            ));
        }
        if !rotate.contains(&a4) {
            return Err(GeometryError::InvalidArgument(format!(
                "torsion rotate list must contain the fourth atom ({})",
                a4
            )));
        }
        Ok(Self { numbers, rotate })
    }

    /// Captures the a1-a2-a3-a4 torsion from a molecule, deriving the
    /// rotate list from the bond graph (the a3 side of the a2-a3 bond).
    pub fn from_molecule(
        molecule: &Molecule,
        a1: usize,
        a2: usize,
        a3: usize,
        a4: usize,
    ) -> Result<Self, GeometryError> {
        let downstream = molecule.half_graph_numbers(a2, a3)?;
        if downstream.is_empty() {
            return Err(GeometryError::InvalidArgument(
                "torsion atoms 2 and 3 are not bonded".to_string(),
            ));
        }
        Self::new(a1, a2, a3, a4, downstream.into_iter().collect())
    }

    pub fn numbers(&self) -> &[usize; 4] {
        &self.numbers
    }

    /// The 1-based numbers of the atoms that move when this dihedral is
    /// driven.
    pub fn rotate_numbers(&self) -> &[usize] {
        &self.rotate
    }

    /// The current dihedral in `molecule`, in degrees.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` when any referenced number is out of range.
    pub fn dihedral_in(&self, molecule: &Molecule) -> Result<f64, GeometryError> {
        let [a1, a2, a3, a4] = self.numbers;
        Ok(dihedral_angle(
            &molecule.atom(a1)?.position,
            &molecule.atom(a2)?.position,
            &molecule.atom(a3)?.position,
            &molecule.atom(a4)?.position,
        ))
    }

    /// Resolves the numbers against a molecule into a value-bound torsion.
    pub fn to_atom_torsion(&self, molecule: &Molecule) -> Result<AtomTorsion, GeometryError> {
        let [a1, a2, a3, a4] = self.numbers;
        AtomTorsion::new(
            molecule,
            molecule.atom(a1)?,
            molecule.atom(a2)?,
            molecule.atom(a3)?,
            molecule.atom(a4)?,
        )
    }
}

/// A torsion of four bare atoms with no owning molecule and no rotate
/// set; the form build contexts pass around before a molecule exists.
#[derive(Debug, Clone, PartialEq)]
pub struct ProtoTorsion {
    atoms: [Atom; 4],
}

impl ProtoTorsion {
    /// # Errors
    ///
    /// `InvalidArgument` if the four atoms are not pairwise distinct.
    pub fn new(a1: Atom, a2: Atom, a3: Atom, a4: Atom) -> Result<Self, GeometryError> {
        let atoms = [a1, a2, a3, a4];
        check_distinct(&atoms)?;
        Ok(Self { atoms })
    }

    pub fn atoms(&self) -> &[Atom; 4] {
        &self.atoms
    }

    pub fn dihedral(&self) -> f64 {
        dihedral_angle(
            &self.atoms[0].position,
            &self.atoms[1].position,
            &self.atoms[2].position,
            &self.atoms[3].position,
        )
    }

    /// Follows a sparse atom replacement map, keeping unmapped atoms.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if the replacements collapse two torsion atoms
    /// into one.
    pub fn remapped(&self, atom_map: &HashMap<Atom, Atom>) -> Result<Self, GeometryError> {
        let [a1, a2, a3, a4] = self.atoms;
        Self::new(
            a1.move_using(atom_map),
            a2.move_using(atom_map),
            a3.move_using(atom_map),
            a4.move_using(atom_map),
        )
    }

    /// Binds this torsion to a molecule containing its atoms.
    pub fn to_atom_torsion(&self, molecule: &Molecule) -> Result<AtomTorsion, GeometryError> {
        AtomTorsion::new(
            molecule,
            &self.atoms[0],
            &self.atoms[1],
            &self.atoms[2],
            &self.atoms[3],
        )
    }
}

fn check_distinct(atoms: &[Atom; 4]) -> Result<(), GeometryError> {
    let unique: HashSet<&Atom> = atoms.iter().collect();
    if unique.len() != 4 {
        return Err(GeometryError::InvalidArgument(
            "torsion atoms must be pairwise distinct".to_string(),
        ));
    }
    Ok(())
}
