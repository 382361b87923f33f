use crate::core::error::GeometryError;
use crate::core::models::element::Element;
use crate::core::models::molecule::Molecule;
use nalgebra::{Rotation3, Vector3};

/// Any intermolecular pair inside this distance makes a placement too
/// close to keep.
const TOO_CLOSE_DISTANCE: f64 = 2.0;
/// A placement with no intermolecular pair inside this distance is too
/// far to interact at all.
const TOO_FAR_DISTANCE: f64 = 2.5;
/// Default intermolecular clash threshold when combining.
const CLASH_DISTANCE: f64 = 2.5;
/// Relaxed clash threshold for pairs that could be hydrogen bonding.
const HBOND_CLASH_DISTANCE: f64 = 2.0;
/// Donor-H to acceptor distance bound for the hydrogen-bond heuristic.
const HBOND_DISTANCE: f64 = 3.0;
/// Donor-H-acceptor angle must open wider than this, in degrees.
const HBOND_ANGLE: f64 = 120.0;

impl Molecule {
    /// Whether any atom pair across the two molecules sits inside the
    /// hard intermolecular floor.
    pub fn too_close(&self, other: &Molecule) -> bool {
        self.atoms().iter().any(|p| {
            other
                .atoms()
                .iter()
                .any(|q| Molecule::distance(p, q) < TOO_CLOSE_DISTANCE)
        })
    }

    /// Whether no atom pair across the two molecules comes near enough to
    /// interact.
    pub fn too_far(&self, other: &Molecule) -> bool {
        !self.atoms().iter().any(|p| {
            other
                .atoms()
                .iter()
                .any(|q| Molecule::distance(p, q) < TOO_FAR_DISTANCE)
        })
    }

    /// The intermolecular hydrogen-bond heuristic: a donor hydrogen
    /// (bonded to O or N) in either molecule within 3.0 A of an acceptor
    /// O, or N that is not 3-coordinate, in the other, with the
    /// donor-H-acceptor angle wider than 120 degrees.
    pub fn is_interesting(&self, other: &Molecule) -> bool {
        has_hydrogen_bond_into(self, other) || has_hydrogen_bond_into(other, self)
    }

    /// Rigidly places this molecule with the given rotation and
    /// translation next to `other` and, when the placement is worth
    /// keeping, unions the two into one molecule (no bonds across, name
    /// `self/other`, energy zeroed).
    ///
    /// Returns `Ok(None)` when the placement is uninteresting (no
    /// intermolecular hydrogen bond) or any cross pair violates the clash
    /// floor: 2.5 A by default, relaxed to 2.0 A for pairs that could be
    /// the hydrogen bond itself.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if the union would contain duplicate atoms.
    pub fn combined_with(
        &self,
        rotation: &Rotation3<f64>,
        shift: &Vector3<f64>,
        other: &Molecule,
    ) -> Result<Option<Molecule>, GeometryError> {
        let placed = self.rigid_transform(rotation, shift);
        if !placed.is_interesting(other) {
            return Ok(None);
        }

        for (i, p) in placed.atoms().iter().enumerate() {
            for (j, q) in other.atoms().iter().enumerate() {
                let floor = if hydrogen_bond_capable(&placed, i, other, j) {
                    HBOND_CLASH_DISTANCE
                } else {
                    CLASH_DISTANCE
                };
                if Molecule::distance(p, q) < floor {
                    return Ok(None);
                }
            }
        }

        let mut atoms = placed.atoms().to_vec();
        atoms.extend_from_slice(other.atoms());
        let offset = placed.len();
        let mut bonds: Vec<(usize, usize, f64)> = placed.bonds().collect();
        bonds.extend(other.bonds().map(|(i, j, order)| (i + offset, j + offset, order)));

        let name = format!("{}/{}", self.name(), other.name());
        Molecule::new(name, atoms, &bonds, 0.0).map(Some)
    }
}

/// Donor hydrogens in `donor` against acceptor heavy atoms in `acceptor`.
fn has_hydrogen_bond_into(donor: &Molecule, acceptor: &Molecule) -> bool {
    for hydrogen in donor.atoms() {
        if hydrogen.element != Element::Hydrogen {
            continue;
        }
        let Ok(heavies) = donor.neighbors(hydrogen) else {
            continue;
        };
        for heavy in heavies {
            if !matches!(heavy.element, Element::Oxygen | Element::Nitrogen) {
                continue;
            }
            for (j, candidate) in acceptor.atoms().iter().enumerate() {
                let accepts = match candidate.element {
                    Element::Oxygen => true,
                    // a 3-coordinate nitrogen has no lone pair to offer
                    Element::Nitrogen => acceptor_degree(acceptor, j) != 3,
                    _ => false,
                };
                if !accepts {
                    continue;
                }
                if Molecule::distance(hydrogen, candidate) < HBOND_DISTANCE
                    && Molecule::angle(heavy, hydrogen, candidate) > HBOND_ANGLE
                {
                    return true;
                }
            }
        }
    }
    false
}

/// Whether the cross pair (atom `i` of `a`, atom `j` of `b`) could itself
/// be a hydrogen bond: H against O either way, or H against a
/// 2-coordinate N.
fn hydrogen_bond_capable(a: &Molecule, i: usize, b: &Molecule, j: usize) -> bool {
    let p = a.atoms()[i].element;
    let q = b.atoms()[j].element;
    match (p, q) {
        (Element::Hydrogen, Element::Oxygen) | (Element::Oxygen, Element::Hydrogen) => true,
        (Element::Hydrogen, Element::Nitrogen) => acceptor_degree(b, j) == 2,
        (Element::Nitrogen, Element::Hydrogen) => acceptor_degree(a, i) == 2,
        _ => false,
    }
}

fn acceptor_degree(molecule: &Molecule, index: usize) -> usize {
    molecule
        .neighbors_numbered(index + 1)
        .map(|n| n.len())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::Atom;
    use nalgebra::Point3;

    fn atom(element: Element, x: f64, y: f64, z: f64) -> Atom {
        Atom::new(element, Point3::new(x, y, z), 0).unwrap()
    }

    /// A hydroxyl donor: O1-H2 pointing along +x.
    fn hydroxyl() -> Molecule {
        Molecule::new(
            "donor",
            vec![
                atom(Element::Oxygen, 0.0, 0.0, 0.0),
                atom(Element::Hydrogen, 0.96, 0.0, 0.0),
            ],
            &[(1, 2, 1.0)],
            0.0,
        )
        .unwrap()
    }

    fn lone_oxygen(x: f64) -> Molecule {
        Molecule::new("acceptor", vec![atom(Element::Oxygen, x, 0.0, 0.0)], &[], 0.0).unwrap()
    }

    #[test]
    fn too_close_and_too_far_bracket_the_contact_window() {
        let donor = hydroxyl();
        assert!(donor.too_close(&lone_oxygen(2.5)));
        assert!(!donor.too_close(&lone_oxygen(3.2)));

        assert!(donor.too_far(&lone_oxygen(5.0)));
        assert!(!donor.too_far(&lone_oxygen(3.2)));
    }

    #[test]
    fn a_linear_hydroxyl_contact_is_interesting() {
        let donor = hydroxyl();
        // H at 0.96, acceptor at 3.2: H...O = 2.24, angle O-H...O = 180
        let acceptor = lone_oxygen(3.2);
        assert!(donor.is_interesting(&acceptor));
        // symmetric in argument order
        assert!(acceptor.is_interesting(&donor));
    }

    #[test]
    fn bent_or_distant_contacts_are_not_interesting() {
        let donor = hydroxyl();
        // beyond the 3.0 A donor-H bound
        assert!(!donor.is_interesting(&lone_oxygen(4.5)));

        // side-on: angle O-H...O is 90 degrees
        let side = Molecule::new(
            "acceptor",
            vec![atom(Element::Oxygen, 0.96, 1.5, 0.0)],
            &[],
            0.0,
        )
        .unwrap();
        assert!(!donor.is_interesting(&side));
    }

    #[test]
    fn three_coordinate_nitrogen_does_not_accept() {
        let donor = hydroxyl();
        let amine = Molecule::new(
            "amine",
            vec![
                atom(Element::Nitrogen, 3.2, 0.0, 0.0),
                atom(Element::Hydrogen, 3.6, 0.9, 0.0),
                atom(Element::Hydrogen, 3.6, -0.9, 0.0),
                atom(Element::Carbon, 4.6, 0.0, 0.0),
            ],
            &[(1, 2, 1.0), (1, 3, 1.0), (1, 4, 1.0)],
            0.0,
        )
        .unwrap();
        assert!(!donor.is_interesting(&amine));

        // drop one substituent and the nitrogen accepts
        let imine = Molecule::new(
            "imine",
            vec![
                atom(Element::Nitrogen, 3.2, 0.0, 0.0),
                atom(Element::Carbon, 4.6, 0.0, 0.0),
            ],
            &[(1, 2, 1.0)],
            0.0,
        )
        .unwrap();
        assert!(donor.is_interesting(&imine));
    }

    #[test]
    fn combined_with_keeps_a_clean_hydrogen_bonded_placement() {
        let donor = hydroxyl();
        let acceptor = lone_oxygen(3.2);
        let combined = donor
            .combined_with(&Rotation3::identity(), &Vector3::zeros(), &acceptor)
            .unwrap()
            .unwrap();

        assert_eq!(combined.len(), 3);
        assert_eq!(combined.bond_count(), 1);
        assert_eq!(combined.name(), "donor/acceptor");
        assert_eq!(combined.energy(), 0.0);
        // no bond was fabricated across the interface
        assert!(!combined.directly_connected_numbered(2, 3));
    }

    #[test]
    fn combined_with_rejects_uninteresting_placements() {
        let donor = hydroxyl();
        let acceptor = lone_oxygen(9.0);
        let result = donor
            .combined_with(&Rotation3::identity(), &Vector3::zeros(), &acceptor)
            .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn combined_with_applies_the_relaxed_hbond_floor() {
        let donor = hydroxyl();
        // H...O = 2.14: inside the 2.5 default, outside the 2.0 relaxed
        // floor for a hydrogen-bond-capable pair; but O...O = 3.1 > 2.5
        let acceptor = lone_oxygen(3.1);
        let kept = donor
            .combined_with(&Rotation3::identity(), &Vector3::zeros(), &acceptor)
            .unwrap();
        assert!(kept.is_some());

        // push in until even the relaxed floor trips (H...O = 1.84)
        let tight = lone_oxygen(2.8);
        let dropped = donor
            .combined_with(&Rotation3::identity(), &Vector3::zeros(), &tight)
            .unwrap();
        assert!(dropped.is_none());
    }

    #[test]
    fn combined_with_honors_the_placement_transform() {
        let donor = hydroxyl();
        let acceptor = lone_oxygen(0.0);
        // slide the donor back so the acceptor lands 3.2 A past the H
        let combined = donor
            .combined_with(&Rotation3::identity(), &Vector3::new(-3.2, 0.0, 0.0), &acceptor)
            .unwrap()
            .unwrap();
        assert!((combined.atom(1).unwrap().position.x + 3.2).abs() < 1e-12);
        // the source molecule is untouched
        assert_eq!(donor.atom(1).unwrap().position, Point3::new(0.0, 0.0, 0.0));
    }
}
