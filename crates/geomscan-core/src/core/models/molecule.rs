use super::atom::Atom;
use super::graph::BondGraph;
use crate::core::error::GeometryError;
use nalgebra::{Point3, Rotation3, Vector3};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// An immutable molecule: a named, ordered collection of atoms plus a
/// weighted bond graph and an optional energy annotation.
///
/// Atoms are addressed by 1-based *atom number*, which is simply the
/// atom's position in the ordered contents. Every edit operation derives a
/// new `Molecule`; a failed edit leaves no partial state behind.
///
/// Geometric edits live in `core::geometry`, the steric and contact
/// screens in `core::forcefield`. This module holds the construction
/// boundary and the read-only accessors they build on.
#[derive(Debug, Clone, PartialEq)]
pub struct Molecule {
    pub(crate) name: String,
    pub(crate) contents: Vec<Atom>,
    pub(crate) graph: BondGraph,
    pub(crate) energy: f64,
}

impl Molecule {
    /// Creates a molecule from atoms and 1-based bond triples
    /// `(number_i, number_j, order)`.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::InvalidArgument` for duplicate atoms, bond
    /// endpoints out of range or equal, or a non-positive bond order.
    pub fn new(
        name: impl Into<String>,
        atoms: Vec<Atom>,
        bonds: &[(usize, usize, f64)],
        energy: f64,
    ) -> Result<Self, GeometryError> {
        let mut seen = HashSet::with_capacity(atoms.len());
        for atom in &atoms {
            if !seen.insert(*atom) {
                return Err(GeometryError::InvalidArgument(format!(
                    "duplicate atom in molecule contents: {}",
                    atom
                )));
            }
        }

        let mut graph = BondGraph::new(atoms.len());
        let mut molecule = Self {
            name: name.into(),
            contents: atoms,
            graph: BondGraph::new(0),
            energy,
        };
        for &(i, j, order) in bonds {
            let ii = molecule.index_of_number(i)?;
            let jj = molecule.index_of_number(j)?;
            graph.add_bond(ii, jj, order)?;
        }
        molecule.graph = graph;
        Ok(molecule)
    }

    /// The molecule's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The annotated energy, in the caller's units (the engine never
    /// interprets it).
    pub fn energy(&self) -> f64 {
        self.energy
    }

    /// The number of atoms.
    pub fn len(&self) -> usize {
        self.contents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }

    /// The atoms in order. Atom number `n` is `atoms()[n - 1]`.
    pub fn atoms(&self) -> &[Atom] {
        &self.contents
    }

    /// Looks up an atom by its 1-based number.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::InvalidArgument` for 0 or a number past the
    /// end.
    pub fn atom(&self, number: usize) -> Result<&Atom, GeometryError> {
        let index = self.index_of_number(number)?;
        Ok(&self.contents[index])
    }

    /// The 1-based number of an atom, by exact-value lookup.
    pub fn atom_number(&self, atom: &Atom) -> Option<usize> {
        self.contents.iter().position(|a| a == atom).map(|i| i + 1)
    }

    pub fn contains_atom(&self, atom: &Atom) -> bool {
        self.atom_number(atom).is_some()
    }

    /// A short label like `C5`: element symbol plus atom number. `None`
    /// for an atom not in this molecule.
    pub fn atom_label(&self, atom: &Atom) -> Option<String> {
        self.atom_number(atom)
            .map(|n| format!("{}{}", atom.element.symbol(), n))
    }

    /// The bonded neighbors of an atom.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::InvalidArgument` if the atom is not in this
    /// molecule.
    pub fn neighbors(&self, atom: &Atom) -> Result<Vec<&Atom>, GeometryError> {
        let index = self.index_of(atom)?;
        Ok(self.graph.neighbors(index)?
            .iter()
            .map(|&(j, _)| &self.contents[j])
            .collect())
    }

    /// The 1-based numbers of the atoms bonded to atom `number`.
    pub fn neighbors_numbered(&self, number: usize) -> Result<Vec<usize>, GeometryError> {
        let index = self.index_of_number(number)?;
        Ok(self.graph.neighbors(index)?
            .iter()
            .map(|&(j, _)| j + 1)
            .collect())
    }

    /// Whether two atoms share a bond. Atoms not in this molecule yield
    /// `false`, never an error; callers probe speculative pairs here,
    /// unlike the loud `neighbors`.
    pub fn directly_connected(&self, a: &Atom, b: &Atom) -> bool {
        match (self.index_of(a), self.index_of(b)) {
            (Ok(i), Ok(j)) => self.graph.directly_connected(i, j),
            _ => false,
        }
    }

    /// Numbered variant of `directly_connected`; out-of-range numbers
    /// yield `false`.
    pub fn directly_connected_numbered(&self, i: usize, j: usize) -> bool {
        match (self.index_of_number(i), self.index_of_number(j)) {
            (Ok(ii), Ok(jj)) => self.graph.directly_connected(ii, jj),
            _ => false,
        }
    }

    /// The order of the bond between atoms `i` and `j` (1-based), if any.
    pub fn bond_order_numbered(&self, i: usize, j: usize) -> Option<f64> {
        let ii = self.index_of_number(i).ok()?;
        let jj = self.index_of_number(j).ok()?;
        self.graph.bond_order(ii, jj)
    }

    /// Every atom reachable from `atom` through bonds, including `atom`.
    pub fn explore_connected_component(
        &self,
        atom: &Atom,
    ) -> Result<HashSet<Atom>, GeometryError> {
        let index = self.index_of(atom)?;
        let component = self.graph.explore_connected_component(index)?;
        Ok(component.into_iter().map(|i| self.contents[i]).collect())
    }

    /// The atoms on the `include` side of the `exclude`-`include` bond.
    /// Empty if the pair is not bonded; see `BondGraph::half_graph` for
    /// the ring contract.
    pub fn half_graph(
        &self,
        exclude: &Atom,
        include: &Atom,
    ) -> Result<HashSet<Atom>, GeometryError> {
        let fragment = self.half_graph_indices(self.index_of(exclude)?, self.index_of(include)?)?;
        Ok(fragment.into_iter().map(|i| self.contents[i]).collect())
    }

    /// `half_graph` over 1-based atom numbers, returning 1-based numbers.
    pub fn half_graph_numbers(
        &self,
        exclude: usize,
        include: usize,
    ) -> Result<HashSet<usize>, GeometryError> {
        let fragment =
            self.half_graph_indices(self.index_of_number(exclude)?, self.index_of_number(include)?)?;
        Ok(fragment.into_iter().map(|i| i + 1).collect())
    }

    /// Every bond exactly once, as `(number_i, number_j, order)` with
    /// `number_i < number_j` (1-based).
    pub fn bonds(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        self.graph.bonds().map(|(i, j, order)| (i + 1, j + 1, order))
    }

    /// The number of bonds.
    pub fn bond_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Euclidean distance between two atoms, in Angstroms.
    pub fn distance(a: &Atom, b: &Atom) -> f64 {
        (a.position - b.position).norm()
    }

    /// Distance between atoms `i` and `j` (1-based).
    pub fn distance_numbered(&self, i: usize, j: usize) -> Result<f64, GeometryError> {
        Ok(Self::distance(self.atom(i)?, self.atom(j)?))
    }

    /// The a-b-c angle at the middle atom, in degrees. Degenerate input
    /// (a zero-length arm) yields 0.
    pub fn angle(a: &Atom, b: &Atom, c: &Atom) -> f64 {
        let u = a.position - b.position;
        let v = c.position - b.position;
        let denominator = u.norm() * v.norm();
        if denominator == 0.0 {
            return 0.0;
        }
        (u.dot(&v) / denominator).clamp(-1.0, 1.0).acos().to_degrees()
    }

    /// Angle over 1-based atom numbers.
    pub fn angle_numbered(&self, a: usize, b: usize, c: usize) -> Result<f64, GeometryError> {
        Ok(Self::angle(self.atom(a)?, self.atom(b)?, self.atom(c)?))
    }

    /// The centroid of the atom positions.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::InvalidArgument` for an empty molecule.
    pub fn centroid(&self) -> Result<Point3<f64>, GeometryError> {
        if self.contents.is_empty() {
            return Err(GeometryError::InvalidArgument(
                "centroid of an empty molecule".to_string(),
            ));
        }
        let sum: Vector3<f64> = self
            .contents
            .iter()
            .map(|a| a.position.coords)
            .sum();
        Ok(Point3::from(sum / self.contents.len() as f64))
    }

    /// A copy with a different name.
    pub fn with_name(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..self.clone()
        }
    }

    /// A copy with a different energy annotation.
    pub fn with_energy(&self, energy: f64) -> Self {
        Self {
            energy,
            ..self.clone()
        }
    }

    /// Derives a molecule with atoms replaced through the map; atoms not
    /// present as keys are kept unchanged. Because the bond graph is keyed
    /// by position, connectivity carries over untouched. With an empty map
    /// this is the deep-copy idiom.
    pub fn remap_atoms(&self, atom_map: &HashMap<Atom, Atom>) -> Self {
        Self {
            name: self.name.clone(),
            contents: self.contents.iter().map(|a| a.move_using(atom_map)).collect(),
            graph: self.graph.clone(),
            energy: self.energy,
        }
    }

    /// Applies a rigid motion (rotation about the origin, then
    /// translation) to every atom.
    pub fn rigid_transform(&self, rotation: &Rotation3<f64>, shift: &Vector3<f64>) -> Self {
        Self {
            name: self.name.clone(),
            contents: self
                .contents
                .iter()
                .map(|a| a.transformed(rotation, shift))
                .collect(),
            graph: self.graph.clone(),
            energy: self.energy,
        }
    }

    /// Translates every atom by `shift`.
    pub fn translated(&self, shift: &Vector3<f64>) -> Self {
        self.rigid_transform(&Rotation3::identity(), shift)
    }

    /// Translates the molecule so its centroid sits at the origin.
    pub fn centered(&self) -> Result<Self, GeometryError> {
        let centroid = self.centroid()?;
        Ok(self.translated(&-centroid.coords))
    }

    /// Derives a molecule with an extra order-1.0 bond between two atoms
    /// already present.
    pub fn add_bond(&self, a: &Atom, b: &Atom) -> Result<Self, GeometryError> {
        self.add_bond_with_order(a, b, 1.0)
    }

    pub fn add_bond_with_order(
        &self,
        a: &Atom,
        b: &Atom,
        order: f64,
    ) -> Result<Self, GeometryError> {
        let i = self.index_of(a)?;
        let j = self.index_of(b)?;
        let mut graph = self.graph.clone();
        graph.add_bond(i, j, order)?;
        Ok(Self {
            graph,
            ..self.clone()
        })
    }

    /// `add_bond` over 1-based atom numbers.
    pub fn add_bond_numbered(&self, i: usize, j: usize) -> Result<Self, GeometryError> {
        let ii = self.index_of_number(i)?;
        let jj = self.index_of_number(j)?;
        let mut graph = self.graph.clone();
        graph.add_bond(ii, jj, 1.0)?;
        Ok(Self {
            graph,
            ..self.clone()
        })
    }

    /// Derives a molecule without the a-b bond; a no-op derivation if the
    /// bond does not exist.
    pub fn remove_bond(&self, a: &Atom, b: &Atom) -> Result<Self, GeometryError> {
        let i = self.index_of(a)?;
        let j = self.index_of(b)?;
        let mut graph = self.graph.clone();
        graph.remove_bond(i, j);
        Ok(Self {
            graph,
            ..self.clone()
        })
    }

    /// `remove_bond` over 1-based atom numbers.
    pub fn remove_bond_numbered(&self, i: usize, j: usize) -> Result<Self, GeometryError> {
        let ii = self.index_of_number(i)?;
        let jj = self.index_of_number(j)?;
        let mut graph = self.graph.clone();
        graph.remove_bond(ii, jj);
        Ok(Self {
            graph,
            ..self.clone()
        })
    }

    pub(crate) fn half_graph_indices(
        &self,
        exclude: usize,
        include: usize,
    ) -> Result<HashSet<usize>, GeometryError> {
        self.graph.half_graph(exclude, include)
    }

    /// 0-based index of an atom, failing loudly for strangers.
    pub(crate) fn index_of(&self, atom: &Atom) -> Result<usize, GeometryError> {
        self.contents
            .iter()
            .position(|a| a == atom)
            .ok_or_else(|| {
                GeometryError::InvalidArgument(format!("atom not in molecule: {}", atom))
            })
    }

    /// 0-based index for a 1-based atom number.
    pub(crate) fn index_of_number(&self, number: usize) -> Result<usize, GeometryError> {
        if number == 0 || number > self.contents.len() {
            return Err(GeometryError::InvalidArgument(format!(
                "atom number {} out of range 1..={}",
                number,
                self.contents.len()
            )));
        }
        Ok(number - 1)
    }

    /// Derives a molecule with the contents replaced wholesale; the graph
    /// and annotations carry over. Internal edit plumbing.
    pub(crate) fn with_contents(&self, contents: Vec<Atom>) -> Self {
        Self {
            name: self.name.clone(),
            contents,
            graph: self.graph.clone(),
            energy: self.energy,
        }
    }
}

impl fmt::Display for Molecule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} ({} atoms, {} bonds)", self.name, self.len(), self.bond_count())?;
        for atom in &self.contents {
            writeln!(f, "{}", atom)?;
        }
        Ok(())
    }
}
