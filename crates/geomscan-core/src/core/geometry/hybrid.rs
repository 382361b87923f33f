use crate::core::error::GeometryError;
use crate::core::models::atom::Atom;
use crate::core::models::molecule::Molecule;
use nalgebra::{Matrix3, Rotation3, Unit, Vector3};

const DEGENERATE_EPS: f64 = 1e-9;

/// The ideal sp2 frame: two unit vectors 120 degrees apart in the z=0
/// plane plus the plane normal. The third vertex of the equilateral
/// triangle is the +x axis.
fn sp2_targets() -> Matrix3<f64> {
    let half_sqrt3 = 3.0_f64.sqrt() / 2.0;
    Matrix3::from_columns(&[
        Vector3::new(-0.5, half_sqrt3, 0.0),
        Vector3::new(-0.5, -half_sqrt3, 0.0),
        Vector3::new(0.0, 0.0, 1.0),
    ])
}

impl Molecule {
    /// Derives a molecule in which `moved` (and its half-graph) is placed
    /// at the third vertex of an ideal trigonal-planar arrangement around
    /// `center`, whose other two neighbors define the plane. With
    /// `force_angle` the in-plane neighbor angle is first driven to 120
    /// degrees. The center-moved bond length is restored afterwards.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` unless `center` has exactly three neighbors and
    /// `moved` is one of them; `DegenerateGeometry` when the two anchor
    /// bonds are collinear and no plane exists; `RingDetected` when the
    /// center-moved bond lies on a ring.
    pub fn set_sp2(
        &self,
        center: &Atom,
        moved: &Atom,
        force_angle: bool,
    ) -> Result<Self, GeometryError> {
        let ic = self.index_of(center)?;
        let im = self.index_of(moved)?;
        let (i_alpha, i_beta) = self.anchor_pair(ic, im, 3)?;

        let working = if force_angle {
            self.set_angle_numbered(i_alpha + 1, ic + 1, i_beta + 1, 120.0)?
        } else {
            self.clone()
        };

        let pc = working.atoms()[ic].position;
        let u = normalized(working.atoms()[i_alpha].position - pc)?;
        let v = normalized(working.atoms()[i_beta].position - pc)?;
        let frame = Matrix3::from_columns(&[u, v, u.cross(&v)]);
        if frame.determinant().abs() < DEGENERATE_EPS {
            return Err(GeometryError::DegenerateGeometry(
                "anchor bonds are collinear; the sp2 plane is undefined".to_string(),
            ));
        }
        let inverse_targets = sp2_targets().try_inverse().ok_or_else(|| {
            GeometryError::DegenerateGeometry("sp2 target frame is singular".to_string())
        })?;
        let target_direction = frame * (inverse_targets * Vector3::x());

        working.align_bond(ic, im, &target_direction)
    }

    /// Derives a molecule in which `moved` (and its half-graph) is placed
    /// at the fourth tetrahedral vertex around `center`: opposite the sum
    /// of the other three unit bond vectors. The center-moved bond length
    /// is restored afterwards.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` unless `center` has exactly four neighbors and
    /// `moved` is one of them; `DegenerateGeometry` when the three anchor
    /// bonds cancel and no opposing direction exists; `RingDetected` when
    /// the center-moved bond lies on a ring.
    pub fn set_sp3(&self, center: &Atom, moved: &Atom) -> Result<Self, GeometryError> {
        let ic = self.index_of(center)?;
        let im = self.index_of(moved)?;

        let neighbors: Vec<usize> = self
            .neighbors_numbered(ic + 1)?
            .into_iter()
            .map(|n| n - 1)
            .collect();
        if neighbors.len() != 4 {
            return Err(GeometryError::InvalidArgument(format!(
                "sp3 center must have exactly 4 neighbors, atom {} has {}",
                ic + 1,
                neighbors.len()
            )));
        }
        if !neighbors.contains(&im) {
            return Err(GeometryError::InvalidArgument(format!(
                "atom {} is not bonded to the sp3 center {}",
                im + 1,
                ic + 1
            )));
        }

        let pc = self.atoms()[ic].position;
        let mut sum = Vector3::zeros();
        for &i in neighbors.iter().filter(|&&i| i != im) {
            sum += normalized(self.atoms()[i].position - pc)?;
        }
        if sum.norm() < DEGENERATE_EPS {
            return Err(GeometryError::DegenerateGeometry(
                "anchor bonds cancel; the sp3 direction is undefined".to_string(),
            ));
        }

        self.align_bond(ic, im, &-sum)
    }

    /// The two neighbors of `center` other than `moved`, checking that the
    /// neighbor count is exactly `expected` and that `moved` is bonded.
    fn anchor_pair(
        &self,
        ic: usize,
        im: usize,
        expected: usize,
    ) -> Result<(usize, usize), GeometryError> {
        let neighbors: Vec<usize> = self
            .neighbors_numbered(ic + 1)?
            .into_iter()
            .map(|n| n - 1)
            .collect();
        if neighbors.len() != expected {
            return Err(GeometryError::InvalidArgument(format!(
                "sp2 center must have exactly {} neighbors, atom {} has {}",
                expected,
                ic + 1,
                neighbors.len()
            )));
        }
        if !neighbors.contains(&im) {
            return Err(GeometryError::InvalidArgument(format!(
                "atom {} is not bonded to the sp2 center {}",
                im + 1,
                ic + 1
            )));
        }
        let others: Vec<usize> = neighbors.into_iter().filter(|&i| i != im).collect();
        Ok((others[0], others[1]))
    }

    /// Rotates the `moved`-side half-graph so the center-moved bond points
    /// along `direction`, then restores the original bond length.
    fn align_bond(
        &self,
        ic: usize,
        im: usize,
        direction: &Vector3<f64>,
    ) -> Result<Self, GeometryError> {
        let pc = self.atoms()[ic].position;
        let current = self.atoms()[im].position - pc;
        let length = current.norm();
        if length < DEGENERATE_EPS {
            return Err(GeometryError::DegenerateGeometry(format!(
                "atoms {} and {} are coincident",
                ic + 1,
                im + 1
            )));
        }

        let fragment = self.half_graph_indices(ic, im)?;
        let rotation = rotation_aligning(&current, direction)?;
        let rotated = self.rotate_fragment(&fragment, &rotation, &pc);
        rotated.set_distance(&rotated.atoms()[ic], &rotated.atoms()[im], length)
    }
}

fn normalized(v: Vector3<f64>) -> Result<Vector3<f64>, GeometryError> {
    let norm = v.norm();
    if norm < DEGENERATE_EPS {
        return Err(GeometryError::DegenerateGeometry(
            "zero-length bond vector".to_string(),
        ));
    }
    Ok(v / norm)
}

/// The rotation taking `from` onto `to`, with an explicit half-turn for
/// the antiparallel case `rotation_between` cannot express.
fn rotation_aligning(
    from: &Vector3<f64>,
    to: &Vector3<f64>,
) -> Result<Rotation3<f64>, GeometryError> {
    if from.norm() < DEGENERATE_EPS || to.norm() < DEGENERATE_EPS {
        return Err(GeometryError::DegenerateGeometry(
            "cannot align a zero-length vector".to_string(),
        ));
    }
    if let Some(rotation) = Rotation3::rotation_between(from, to) {
        return Ok(rotation);
    }
    let mut axis = from.cross(&Vector3::x());
    if axis.norm() < DEGENERATE_EPS {
        axis = from.cross(&Vector3::y());
    }
    Ok(Rotation3::from_axis_angle(
        &Unit::new_normalize(axis),
        std::f64::consts::PI,
    ))
}
