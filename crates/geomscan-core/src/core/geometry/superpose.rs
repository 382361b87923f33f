use crate::core::error::GeometryError;
use crate::core::models::molecule::Molecule;
use nalgebra::{Matrix3, Point3, Rotation3, Vector3};

/// Positional root-mean-square deviation between two molecules of equal
/// size, atom number by atom number, without any alignment.
///
/// # Errors
///
/// `InvalidArgument` when the sizes differ or the molecules are empty.
pub fn rmsd(a: &Molecule, b: &Molecule) -> Result<f64, GeometryError> {
    check_same_size(a, b)?;
    let sum: f64 = a
        .atoms()
        .iter()
        .zip(b.atoms())
        .map(|(x, y)| (x.position - y.position).norm_squared())
        .sum();
    Ok((sum / a.len() as f64).sqrt())
}

/// RMSD over a 1-based atom subset after optimally superimposing `b` onto
/// `a` on that subset.
///
/// The sum runs over the subset but the normalization divides by the total
/// atom count, matching the historical definition scan reports were
/// calibrated against.
pub fn rmsd_subset(a: &Molecule, b: &Molecule, subset: &[usize]) -> Result<f64, GeometryError> {
    let aligned = superimpose(a, b, subset)?;
    let mut sum = 0.0;
    for &number in subset {
        let pa = a.atom(number)?.position;
        let pb = aligned.atom(number)?.position;
        sum += (pa - pb).norm_squared();
    }
    Ok((sum / a.len() as f64).sqrt())
}

/// Rigidly superimposes `b` onto `a` using the Kabsch algorithm over a
/// 1-based atom subset of at least three atoms.
///
/// The optimal proper rotation comes from the SVD of the cross-covariance
/// of the centered subsets, with the last singular direction flipped when
/// the determinant is negative (never a reflection). Every atom of `b` is
/// transformed; the result carries `b`'s name, bonds, and energy, with its
/// subset centroid moved onto `a`'s.
///
/// # Errors
///
/// `InvalidArgument` when the sizes differ, the subset has fewer than
/// three atoms, or a subset number is out of range;
/// `DegenerateGeometry` when the SVD fails to produce the factor pair.
pub fn superimpose(
    a: &Molecule,
    b: &Molecule,
    subset: &[usize],
) -> Result<Molecule, GeometryError> {
    check_same_size(a, b)?;
    if subset.len() < 3 {
        return Err(GeometryError::InvalidArgument(format!(
            "superposition needs at least 3 subset atoms, got {}",
            subset.len()
        )));
    }

    let mut p = Vec::with_capacity(subset.len());
    let mut q = Vec::with_capacity(subset.len());
    for &number in subset {
        p.push(a.atom(number)?.position);
        q.push(b.atom(number)?.position);
    }
    let centroid_p = centroid(&p);
    let centroid_q = centroid(&q);

    let mut h = Matrix3::zeros();
    for (pp, qq) in p.iter().zip(&q) {
        let pc = pp - centroid_p;
        let qc = qq - centroid_q;
        h += qc * pc.transpose();
    }

    let svd = h.svd(true, true);
    let u = svd.u.ok_or_else(|| {
        GeometryError::DegenerateGeometry("superposition SVD produced no U factor".to_string())
    })?;
    let v_t = svd.v_t.ok_or_else(|| {
        GeometryError::DegenerateGeometry("superposition SVD produced no V factor".to_string())
    })?;

    let sign = if (u * v_t).determinant() < 0.0 { -1.0 } else { 1.0 };
    let correction = Matrix3::from_diagonal(&Vector3::new(1.0, 1.0, sign));
    let rotation = Rotation3::from_matrix_unchecked(v_t.transpose() * correction * u.transpose());

    let shift = centroid_p.coords - rotation * centroid_q.coords;
    Ok(b.rigid_transform(&rotation, &shift))
}

fn check_same_size(a: &Molecule, b: &Molecule) -> Result<(), GeometryError> {
    if a.is_empty() || b.is_empty() {
        return Err(GeometryError::InvalidArgument(
            "cannot compare empty molecules".to_string(),
        ));
    }
    if a.len() != b.len() {
        return Err(GeometryError::InvalidArgument(format!(
            "molecule sizes differ: {} vs {}",
            a.len(),
            b.len()
        )));
    }
    Ok(())
}

fn centroid(points: &[Point3<f64>]) -> Point3<f64> {
    let sum: Vector3<f64> = points.iter().map(|p| p.coords).sum();
    Point3::from(sum / points.len() as f64)
}
