use super::element::Element;
use crate::core::error::GeometryError;
use nalgebra::{Point3, Rotation3, Vector3};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};

/// An immutable atom: an element, a 3D position, and an opaque integer
/// force-field type tag.
///
/// Atom identity is **bit-exact**: two atoms are equal iff element, type
/// tag, and all three coordinate `f64`s compare equal at the bit level.
/// There is no floating tolerance. This is a deliberate contract inherited
/// from the legacy engine: geometric edits produce fresh atoms, and a
/// molecule tracks which atoms moved by exact-value lookup. Two
/// geometrically coincident atoms reached through different arithmetic
/// paths may therefore compare unequal.
#[derive(Debug, Clone, Copy)]
pub struct Atom {
    /// The chemical element of this atom.
    pub element: Element,
    /// The location of this atom in Angstroms.
    pub position: Point3<f64>,
    /// Opaque force-field atom type tag; always non-negative.
    pub atom_type: i32,
}

impl Atom {
    /// Creates a new atom.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::InvalidArgument` if `atom_type` is negative.
    pub fn new(element: Element, position: Point3<f64>, atom_type: i32) -> Result<Self, GeometryError> {
        if atom_type < 0 {
            return Err(GeometryError::InvalidArgument(format!(
                "atom type must be non-negative, got {}",
                atom_type
            )));
        }
        Ok(Self {
            element,
            position,
            atom_type,
        })
    }

    /// Creates a new atom from an element symbol (legacy aliases accepted).
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::UnrecognizedSymbol` for an unknown symbol and
    /// `GeometryError::InvalidArgument` for a negative type tag.
    pub fn from_symbol(
        symbol: &str,
        position: Point3<f64>,
        atom_type: i32,
    ) -> Result<Self, GeometryError> {
        Self::new(Element::from_symbol(symbol)?, position, atom_type)
    }

    /// Returns a copy of this atom with a new type tag.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::InvalidArgument` if `atom_type` is negative.
    pub fn with_type(&self, atom_type: i32) -> Result<Self, GeometryError> {
        Self::new(self.element, self.position, atom_type)
    }

    /// Returns a copy of this atom at a new position.
    pub fn with_position(&self, position: Point3<f64>) -> Self {
        Self {
            element: self.element,
            position,
            atom_type: self.atom_type,
        }
    }

    /// Returns a copy of this atom with the rotation applied first, then
    /// the translation.
    pub fn transformed(&self, rotation: &Rotation3<f64>, shift: &Vector3<f64>) -> Self {
        self.with_position(rotation * self.position + shift)
    }

    /// Applies a sparse set of replacements: if this atom is a key in the
    /// map, returns the mapped atom, otherwise returns self unchanged.
    pub fn move_using(&self, atom_map: &HashMap<Atom, Atom>) -> Self {
        atom_map.get(self).copied().unwrap_or(*self)
    }
}

impl PartialEq for Atom {
    fn eq(&self, other: &Self) -> bool {
        self.element == other.element
            && self.atom_type == other.atom_type
            && self.position.x.to_bits() == other.position.x.to_bits()
            && self.position.y.to_bits() == other.position.y.to_bits()
            && self.position.z.to_bits() == other.position.z.to_bits()
    }
}

impl Eq for Atom {}

impl Hash for Atom {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.element.hash(state);
        self.atom_type.hash(state);
        self.position.x.to_bits().hash(state);
        self.position.y.to_bits().hash(state);
        self.position.z.to_bits().hash(state);
    }
}

impl PartialOrd for Atom {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Atom {
    /// Lexicographic over (x, y, z), with element and type tag as
    /// tiebreakers. Used only for canonical sequencing, never for chemical
    /// comparison.
    fn cmp(&self, other: &Self) -> Ordering {
        self.position
            .x
            .total_cmp(&other.position.x)
            .then_with(|| self.position.y.total_cmp(&other.position.y))
            .then_with(|| self.position.z.total_cmp(&other.position.z))
            .then_with(|| self.element.cmp(&other.element))
            .then_with(|| self.atom_type.cmp(&other.atom_type))
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<2} {:10.6} {:10.6} {:10.6}",
            self.element.symbol(),
            self.position.x,
            self.position.y,
            self.position.z
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn carbon(x: f64, y: f64, z: f64) -> Atom {
        Atom::new(Element::Carbon, Point3::new(x, y, z), 1).unwrap()
    }

    #[test]
    fn negative_type_tag_is_rejected() {
        let result = Atom::new(Element::Carbon, Point3::origin(), -1);
        assert!(matches!(result, Err(GeometryError::InvalidArgument(_))));
        let atom = carbon(0.0, 0.0, 0.0);
        assert!(atom.with_type(-5).is_err());
    }

    #[test]
    fn with_position_and_with_type_produce_new_values() {
        let atom = carbon(1.0, 2.0, 3.0);
        let moved = atom.with_position(Point3::new(4.0, 5.0, 6.0));
        assert_eq!(moved.element, Element::Carbon);
        assert_eq!(moved.atom_type, 1);
        assert_eq!(moved.position, Point3::new(4.0, 5.0, 6.0));
        assert_eq!(atom.position, Point3::new(1.0, 2.0, 3.0));

        let retyped = atom.with_type(7).unwrap();
        assert_eq!(retyped.atom_type, 7);
        assert_eq!(retyped.position, atom.position);
    }

    #[test]
    fn transformed_applies_rotation_before_translation() {
        let atom = carbon(1.0, 0.0, 0.0);
        // 90 degrees about z takes +x to +y
        let rotation = Rotation3::from_axis_angle(&Vector3::z_axis(), std::f64::consts::FRAC_PI_2);
        let shift = Vector3::new(0.0, 0.0, 2.0);
        let result = atom.transformed(&rotation, &shift);
        assert!((result.position.x - 0.0).abs() < 1e-12);
        assert!((result.position.y - 1.0).abs() < 1e-12);
        assert!((result.position.z - 2.0).abs() < 1e-12);
    }

    #[test]
    fn move_using_replaces_only_mapped_atoms() {
        let a = carbon(0.0, 0.0, 0.0);
        let b = carbon(1.0, 0.0, 0.0);
        let replacement = carbon(9.0, 9.0, 9.0);
        let mut map = HashMap::new();
        map.insert(a, replacement);

        assert_eq!(a.move_using(&map), replacement);
        assert_eq!(b.move_using(&map), b);
    }

    #[test]
    fn equality_is_bit_exact_over_position() {
        let a = carbon(0.1 + 0.2, 0.0, 0.0);
        let b = carbon(0.3, 0.0, 0.0);
        // 0.1 + 0.2 != 0.3 in binary floating point: these atoms are
        // geometrically coincident for all practical purposes but compare
        // unequal. Expected behavior, not a defect.
        assert_ne!(a, b);

        let c = carbon(0.3, 0.0, 0.0);
        assert_eq!(b, c);
    }

    #[test]
    fn equality_distinguishes_element_and_type() {
        let a = carbon(1.0, 2.0, 3.0);
        let b = Atom::new(Element::Oxygen, Point3::new(1.0, 2.0, 3.0), 1).unwrap();
        let c = Atom::new(Element::Carbon, Point3::new(1.0, 2.0, 3.0), 2).unwrap();
        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn ordering_is_lexicographic_over_coordinates() {
        let mut atoms = vec![
            carbon(3.0, 3.0, 3.0),
            carbon(1.0, 2.0, 3.0),
            carbon(3.0, 2.0, 4.0),
            carbon(2.0, 2.0, 3.0),
            carbon(3.0, 2.0, 3.0),
        ];
        atoms.sort();
        let xs: Vec<(f64, f64, f64)> = atoms
            .iter()
            .map(|a| (a.position.x, a.position.y, a.position.z))
            .collect();
        assert_eq!(
            xs,
            vec![
                (1.0, 2.0, 3.0),
                (2.0, 2.0, 3.0),
                (3.0, 2.0, 3.0),
                (3.0, 2.0, 4.0),
                (3.0, 3.0, 3.0),
            ]
        );
    }

    #[test]
    fn display_uses_fixed_width_geometry_format() {
        let atom = carbon(1.0, -2.5, 3.25);
        assert_eq!(format!("{}", atom), "C    1.000000  -2.500000   3.250000");
    }
}
