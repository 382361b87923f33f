use crate::core::error::GeometryError;
use crate::core::models::atom::Atom;
use crate::core::models::molecule::Molecule;
use crate::core::models::torsion::{AtomTorsion, IndexTorsion};
use nalgebra::{Point3, Rotation3, Unit, Vector3};
use std::collections::HashSet;

/// Internal distance edits share this floor: below it the a-b direction is
/// numerically meaningless.
const COINCIDENT_EPS: f64 = 1e-9;

impl Molecule {
    /// Derives a molecule with the a-b bond length set to `target`
    /// Angstroms, rigidly translating the entire b-side half-graph along
    /// the a-to-b direction.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` when the pair is not bonded or `target` is not
    /// positive; `RingDetected` when the bond lies on a ring;
    /// `DegenerateGeometry` when a and b are coincident.
    pub fn set_distance(&self, a: &Atom, b: &Atom, target: f64) -> Result<Self, GeometryError> {
        self.set_distance_indices(self.index_of(a)?, self.index_of(b)?, target)
    }

    /// `set_distance` over 1-based atom numbers.
    pub fn set_distance_numbered(
        &self,
        a: usize,
        b: usize,
        target: f64,
    ) -> Result<Self, GeometryError> {
        self.set_distance_indices(self.index_of_number(a)?, self.index_of_number(b)?, target)
    }

    fn set_distance_indices(
        &self,
        ia: usize,
        ib: usize,
        target: f64,
    ) -> Result<Self, GeometryError> {
        if !(target > 0.0) {
            return Err(GeometryError::InvalidArgument(format!(
                "target distance must be positive, got {}",
                target
            )));
        }
        let fragment = self.half_graph_indices(ia, ib)?;
        if fragment.is_empty() {
            return Err(GeometryError::InvalidArgument(format!(
                "atoms {} and {} are not bonded; cannot set their distance",
                ia + 1,
                ib + 1
            )));
        }

        let pa = self.atoms()[ia].position;
        let pb = self.atoms()[ib].position;
        let bond = pb - pa;
        let current = bond.norm();
        if current < COINCIDENT_EPS {
            return Err(GeometryError::DegenerateGeometry(format!(
                "atoms {} and {} are coincident",
                ia + 1,
                ib + 1
            )));
        }

        let shift = bond * ((target - current) / current);
        Ok(self.translate_fragment(&fragment, &shift))
    }

    /// Derives a molecule with the c-side half-graph of the b-c bond
    /// rotated by `delta_degrees` about the axis normal to the a-b-c
    /// plane at b. Positive delta opens the a-b-c angle.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` when b and c are not bonded; `RingDetected` when
    /// the b-c bond lies on a ring; `DegenerateGeometry` when a, b, c are
    /// collinear (no rotation plane).
    pub fn rotate_angle(
        &self,
        a: &Atom,
        b: &Atom,
        c: &Atom,
        delta_degrees: f64,
    ) -> Result<Self, GeometryError> {
        self.rotate_angle_indices(
            self.index_of(a)?,
            self.index_of(b)?,
            self.index_of(c)?,
            delta_degrees,
        )
    }

    /// `rotate_angle` over 1-based atom numbers.
    pub fn rotate_angle_numbered(
        &self,
        a: usize,
        b: usize,
        c: usize,
        delta_degrees: f64,
    ) -> Result<Self, GeometryError> {
        self.rotate_angle_indices(
            self.index_of_number(a)?,
            self.index_of_number(b)?,
            self.index_of_number(c)?,
            delta_degrees,
        )
    }

    fn rotate_angle_indices(
        &self,
        ia: usize,
        ib: usize,
        ic: usize,
        delta_degrees: f64,
    ) -> Result<Self, GeometryError> {
        let fragment = self.half_graph_indices(ib, ic)?;
        if fragment.is_empty() {
            return Err(GeometryError::InvalidArgument(format!(
                "atoms {} and {} are not bonded; cannot rotate about their bond",
                ib + 1,
                ic + 1
            )));
        }

        let pa = self.atoms()[ia].position;
        let pb = self.atoms()[ib].position;
        let pc = self.atoms()[ic].position;
        let axis = (pa - pb).cross(&(pc - pb));
        if axis.norm() < COINCIDENT_EPS {
            return Err(GeometryError::DegenerateGeometry(format!(
                "atoms {}, {}, {} are collinear; the bend plane is undefined",
                ia + 1,
                ib + 1,
                ic + 1
            )));
        }

        let rotation =
            Rotation3::from_axis_angle(&Unit::new_normalize(axis), delta_degrees.to_radians());
        Ok(self.rotate_fragment(&fragment, &rotation, &pb))
    }

    /// Derives a molecule with the a-b-c angle set to `target_degrees`,
    /// by rotating the c-side half-graph through the difference.
    pub fn set_angle(
        &self,
        a: &Atom,
        b: &Atom,
        c: &Atom,
        target_degrees: f64,
    ) -> Result<Self, GeometryError> {
        let delta = target_degrees - Self::angle(a, b, c);
        self.rotate_angle(a, b, c, delta)
    }

    /// `set_angle` over 1-based atom numbers.
    pub fn set_angle_numbered(
        &self,
        a: usize,
        b: usize,
        c: usize,
        target_degrees: f64,
    ) -> Result<Self, GeometryError> {
        let delta = target_degrees - self.angle_numbered(a, b, c)?;
        self.rotate_angle_numbered(a, b, c, delta)
    }

    /// Derives a molecule with the torsion's dihedral set to
    /// `theta_degrees`, rotating the precomputed downstream set about the
    /// central bond.
    ///
    /// The torsion must have been captured from geometry identical to this
    /// molecule: every captured atom is re-checked for presence, so a
    /// torsion held across an intervening edit is rejected rather than
    /// silently rotating the wrong atoms.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` when any torsion atom is absent from this
    /// molecule; `DegenerateGeometry` when the central bond has zero
    /// length.
    pub fn set_dihedral(
        &self,
        torsion: &AtomTorsion,
        theta_degrees: f64,
    ) -> Result<Self, GeometryError> {
        let mut fragment = HashSet::with_capacity(torsion.rotate_set().len());
        for atom in torsion.rotate_set() {
            fragment.insert(self.index_of(atom)?);
        }
        for atom in torsion.atoms() {
            self.index_of(atom)?;
        }

        let p2 = torsion.atoms()[1].position;
        let p3 = torsion.atoms()[2].position;
        let current = torsion.dihedral();
        let rotation = dihedral_rotation(&p2, &p3, current - theta_degrees)?;
        Ok(self.rotate_fragment(&fragment, &rotation, &p3))
    }

    /// `set_dihedral` driven by a positional torsion; the form scan loops
    /// use, since the numbers stay valid across edits.
    pub fn set_dihedral_index(
        &self,
        torsion: &IndexTorsion,
        theta_degrees: f64,
    ) -> Result<Self, GeometryError> {
        let mut fragment = HashSet::with_capacity(torsion.rotate_numbers().len());
        for &number in torsion.rotate_numbers() {
            fragment.insert(self.index_of_number(number)?);
        }

        let [_, n2, n3, _] = *torsion.numbers();
        let p2 = self.atom(n2)?.position;
        let p3 = self.atom(n3)?.position;
        let current = torsion.dihedral_in(self)?;
        let rotation = dihedral_rotation(&p2, &p3, current - theta_degrees)?;
        Ok(self.rotate_fragment(&fragment, &rotation, &p3))
    }

    /// Translates exactly the atoms at the given 0-based indices.
    pub(crate) fn translate_fragment(
        &self,
        fragment: &HashSet<usize>,
        shift: &Vector3<f64>,
    ) -> Self {
        let contents = self
            .atoms()
            .iter()
            .enumerate()
            .map(|(i, atom)| {
                if fragment.contains(&i) {
                    atom.with_position(atom.position + shift)
                } else {
                    *atom
                }
            })
            .collect();
        self.with_contents(contents)
    }

    /// Rotates exactly the atoms at the given 0-based indices about
    /// `origin`.
    pub(crate) fn rotate_fragment(
        &self,
        fragment: &HashSet<usize>,
        rotation: &Rotation3<f64>,
        origin: &Point3<f64>,
    ) -> Self {
        let contents = self
            .atoms()
            .iter()
            .enumerate()
            .map(|(i, atom)| {
                if fragment.contains(&i) {
                    atom.with_position(origin + rotation * (atom.position - origin))
                } else {
                    *atom
                }
            })
            .collect();
        self.with_contents(contents)
    }
}

/// Rotation about the atom3-to-atom2 axis. Rotating the downstream set by
/// `(current - theta)` degrees right-handed about this axis lands the
/// dihedral on theta.
fn dihedral_rotation(
    p2: &Point3<f64>,
    p3: &Point3<f64>,
    degrees: f64,
) -> Result<Rotation3<f64>, GeometryError> {
    let axis = p2 - p3;
    if axis.norm() < COINCIDENT_EPS {
        return Err(GeometryError::DegenerateGeometry(
            "central torsion bond has zero length".to_string(),
        ));
    }
    Ok(Rotation3::from_axis_angle(
        &Unit::new_normalize(axis),
        degrees.to_radians(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::element::Element;

    fn atom(element: Element, x: f64, y: f64, z: f64) -> Atom {
        Atom::new(element, Point3::new(x, y, z), 0).unwrap()
    }

    /// Methanol-ish C-O fragment with hydrogens on the carbon.
    fn c_o_fragment() -> Molecule {
        Molecule::new(
            "c-o",
            vec![
                atom(Element::Carbon, 0.0, 0.0, 0.0),
                atom(Element::Oxygen, 1.43, 0.0, 0.0),
                atom(Element::Hydrogen, -0.36, 1.03, 0.0),
                atom(Element::Hydrogen, -0.36, -0.51, 0.89),
                atom(Element::Hydrogen, 1.75, 0.9, 0.0),
            ],
            &[(1, 2, 1.0), (1, 3, 1.0), (1, 4, 1.0), (2, 5, 1.0)],
            0.0,
        )
        .unwrap()
    }

    /// Four carbons with a driveable 1-2-3-4 torsion; `theta` in degrees.
    fn torsion_chain(theta: f64) -> Molecule {
        let t = theta.to_radians();
        Molecule::new(
            "chain",
            vec![
                atom(Element::Carbon, 0.0, 1.0, 0.0),
                atom(Element::Carbon, 0.0, 0.0, 0.0),
                atom(Element::Carbon, 1.0, 0.0, 0.0),
                atom(Element::Carbon, 1.0, t.cos(), t.sin()),
            ],
            &[(1, 2, 1.0), (2, 3, 1.0), (3, 4, 1.0)],
            0.0,
        )
        .unwrap()
    }

    mod set_distance {
        use super::*;

        #[test]
        fn stretches_the_c_o_bond_to_a_target() {
            let molecule = c_o_fragment();
            let stretched = molecule.set_distance_numbered(1, 2, 1.5).unwrap();

            assert!((stretched.distance_numbered(1, 2).unwrap() - 1.5).abs() < 1e-6);
            assert_eq!(stretched.len(), molecule.len());
            // the oxygen's hydrogen rode along rigidly
            let oh_before = molecule.distance_numbered(2, 5).unwrap();
            let oh_after = stretched.distance_numbered(2, 5).unwrap();
            assert!((oh_before - oh_after).abs() < 1e-9);
            // the carbon side did not move
            assert_eq!(stretched.atom(3).unwrap().position, molecule.atom(3).unwrap().position);
            // the source molecule is untouched
            assert!((molecule.distance_numbered(1, 2).unwrap() - 1.43).abs() < 1e-12);
        }

        #[test]
        fn is_idempotent_at_the_target() {
            let molecule = c_o_fragment();
            let once = molecule.set_distance_numbered(1, 2, 1.5).unwrap();
            let twice = once.set_distance_numbered(1, 2, 1.5).unwrap();
            for (a, b) in once.atoms().iter().zip(twice.atoms()) {
                assert!((a.position - b.position).norm() < 1e-9);
            }
        }

        #[test]
        fn round_trips_back_to_the_original_length() {
            let molecule = c_o_fragment();
            let original = molecule.distance_numbered(1, 2).unwrap();
            let there = molecule.set_distance_numbered(1, 2, 2.1).unwrap();
            let back = there.set_distance_numbered(1, 2, original).unwrap();
            for (a, b) in molecule.atoms().iter().zip(back.atoms()) {
                assert!((a.position - b.position).norm() < 1e-6);
            }
        }

        #[test]
        fn rejects_unbonded_pairs_and_bad_targets() {
            let molecule = c_o_fragment();
            assert!(matches!(
                molecule.set_distance_numbered(1, 5, 1.5),
                Err(GeometryError::InvalidArgument(_))
            ));
            assert!(molecule.set_distance_numbered(1, 2, 0.0).is_err());
            assert!(molecule.set_distance_numbered(1, 2, -1.0).is_err());
            assert!(molecule.set_distance_numbered(1, 9, 1.5).is_err());
        }

        #[test]
        fn moving_direction_follows_the_excluded_side() {
            let molecule = c_o_fragment();
            // same bond, opposite anchor: now the carbon side moves
            let shifted = molecule.set_distance_numbered(2, 1, 2.0).unwrap();
            assert!((shifted.distance_numbered(1, 2).unwrap() - 2.0).abs() < 1e-9);
            assert_eq!(shifted.atom(5).unwrap().position, molecule.atom(5).unwrap().position);
            assert_ne!(shifted.atom(3).unwrap().position, molecule.atom(3).unwrap().position);
        }
    }

    mod angles {
        use super::*;

        #[test]
        fn rotate_angle_opens_by_positive_delta() {
            let molecule = c_o_fragment();
            let before = molecule.angle_numbered(3, 1, 2).unwrap();
            let opened = molecule.rotate_angle_numbered(3, 1, 2, 10.0).unwrap();
            let after = opened.angle_numbered(3, 1, 2).unwrap();
            assert!((after - before - 10.0).abs() < 1e-6, "before {} after {}", before, after);
            assert_eq!(opened.len(), molecule.len());
        }

        #[test]
        fn set_angle_hits_the_target_and_round_trips() {
            let molecule = c_o_fragment();
            let original = molecule.angle_numbered(3, 1, 2).unwrap();
            let bent = molecule.set_angle_numbered(3, 1, 2, 95.0).unwrap();
            assert!((bent.angle_numbered(3, 1, 2).unwrap() - 95.0).abs() < 1e-6);

            let back = bent.set_angle_numbered(3, 1, 2, original).unwrap();
            for (a, b) in molecule.atoms().iter().zip(back.atoms()) {
                assert!((a.position - b.position).norm() < 1e-6);
            }
        }

        #[test]
        fn rotating_preserves_bond_lengths() {
            let molecule = c_o_fragment();
            let bent = molecule.set_angle_numbered(3, 1, 2, 100.0).unwrap();
            for (i, j, _) in molecule.bonds() {
                let before = molecule.distance_numbered(i, j).unwrap();
                let after = bent.distance_numbered(i, j).unwrap();
                assert!((before - after).abs() < 1e-9, "bond {}-{}", i, j);
            }
        }

        #[test]
        fn collinear_arms_are_degenerate() {
            let molecule = Molecule::new(
                "line",
                vec![
                    atom(Element::Carbon, 0.0, 0.0, 0.0),
                    atom(Element::Carbon, 1.5, 0.0, 0.0),
                    atom(Element::Carbon, 3.0, 0.0, 0.0),
                ],
                &[(1, 2, 1.0), (2, 3, 1.0)],
                0.0,
            )
            .unwrap();
            assert!(matches!(
                molecule.rotate_angle_numbered(1, 2, 3, 10.0),
                Err(GeometryError::DegenerateGeometry(_))
            ));
        }
    }

    mod dihedrals {
        use super::*;

        #[test]
        fn set_dihedral_index_round_trips_across_the_range() {
            let molecule = torsion_chain(60.0);
            let torsion = IndexTorsion::from_molecule(&molecule, 1, 2, 3, 4).unwrap();
            for &theta in &[-179.0, -90.0, 0.0, 90.0, 179.0] {
                let derived = molecule.set_dihedral_index(&torsion, theta).unwrap();
                let measured = torsion.dihedral_in(&derived).unwrap();
                assert!((measured - theta).abs() < 1e-6, "theta {} got {}", theta, measured);
                assert_eq!(derived.len(), molecule.len());
            }
        }

        #[test]
        fn drives_a_sixty_degree_torsion_to_trans() {
            let molecule = torsion_chain(60.0);
            let torsion = IndexTorsion::from_molecule(&molecule, 1, 2, 3, 4).unwrap();
            assert!((torsion.dihedral_in(&molecule).unwrap() - 60.0).abs() < 1e-9);

            let trans = molecule.set_dihedral_index(&torsion, 180.0).unwrap();
            let measured = torsion.dihedral_in(&trans).unwrap();
            assert!((measured.abs() - 180.0).abs() < 1e-6, "got {}", measured);
            // only the downstream side moved
            assert_eq!(trans.atom(1).unwrap().position, molecule.atom(1).unwrap().position);
            assert_eq!(trans.atom(2).unwrap().position, molecule.atom(2).unwrap().position);
            assert_eq!(trans.atom(3).unwrap().position, molecule.atom(3).unwrap().position);
        }

        #[test]
        fn atom_torsion_edit_matches_index_torsion_edit() {
            let molecule = torsion_chain(60.0);
            let atoms: Vec<Atom> = molecule.atoms().to_vec();
            let by_value =
                AtomTorsion::new(&molecule, &atoms[0], &atoms[1], &atoms[2], &atoms[3]).unwrap();
            let by_number = IndexTorsion::from_molecule(&molecule, 1, 2, 3, 4).unwrap();

            let a = molecule.set_dihedral(&by_value, -120.0).unwrap();
            let b = molecule.set_dihedral_index(&by_number, -120.0).unwrap();
            for (x, y) in a.atoms().iter().zip(b.atoms()) {
                assert!((x.position - y.position).norm() < 1e-9);
            }
        }

        #[test]
        fn stale_atom_torsion_is_rejected() {
            let molecule = torsion_chain(60.0);
            let atoms: Vec<Atom> = molecule.atoms().to_vec();
            let torsion =
                AtomTorsion::new(&molecule, &atoms[0], &atoms[1], &atoms[2], &atoms[3]).unwrap();

            // an intervening edit moved the captured atoms
            let edited = molecule.set_distance_numbered(2, 3, 1.8).unwrap();
            assert!(matches!(
                edited.set_dihedral(&torsion, 0.0),
                Err(GeometryError::InvalidArgument(_))
            ));
        }
    }
}
