//! Grid-scan drivers: the loops that turn one template molecule into a
//! batch of perturbed structures, plus the two-distance angle search used
//! to pose reactive pairs.

use crate::core::error::GeometryError;
use crate::core::models::molecule::Molecule;
use crate::core::models::torsion::IndexTorsion;

/// Tuning for `solve_angle_for_distance`: a coarse sweep over the angle
/// window followed by a fine sweep around the best coarse hit.
#[derive(Debug, Clone, PartialEq)]
pub struct AngleSearch {
    /// Coarse sweep lower bound, degrees.
    pub coarse_start: f64,
    /// Coarse sweep upper bound, degrees.
    pub coarse_stop: f64,
    /// Coarse sweep step, degrees.
    pub coarse_step: f64,
    /// Fine sweep half-width around the best coarse angle, degrees.
    pub fine_window: f64,
    /// Fine sweep step, degrees.
    pub fine_step: f64,
    /// Acceptable residual on the probe distance, Angstroms.
    pub tolerance: f64,
}

impl Default for AngleSearch {
    fn default() -> Self {
        Self {
            coarse_start: 70.0,
            coarse_stop: 130.0,
            coarse_step: 5.0,
            fine_window: 5.0,
            fine_step: 0.001,
            tolerance: 0.001,
        }
    }
}

/// An inclusive f64 grid from `start` to `stop` by `step`, tolerant of
/// accumulation error at the top end.
///
/// # Errors
///
/// `InvalidArgument` when `step` is not positive.
pub fn distance_grid(start: f64, stop: f64, step: f64) -> Result<Vec<f64>, GeometryError> {
    if !(step > 0.0) {
        return Err(GeometryError::InvalidArgument(format!(
            "grid step must be positive, got {}",
            step
        )));
    }
    let slack = step * 1e-6;
    let mut grid = Vec::new();
    let mut index = 0usize;
    loop {
        let value = start + step * index as f64;
        if value > stop + slack {
            break;
        }
        grid.push(value);
        index += 1;
    }
    Ok(grid)
}

/// Derives one molecule per grid distance with the `from`-`to` bond set to
/// that length. The pair must be directly bonded up front, so an empty
/// grid cannot mask a bad selection.
///
/// # Errors
///
/// `InvalidArgument` when the atoms are not bonded, plus anything
/// `set_distance` can raise per point.
pub fn bond_scan(
    molecule: &Molecule,
    from: usize,
    to: usize,
    distances: &[f64],
) -> Result<Vec<Molecule>, GeometryError> {
    if !molecule.directly_connected_numbered(from, to) {
        return Err(GeometryError::InvalidArgument(format!(
            "atoms {} and {} are not bonded; cannot scan their distance",
            from, to
        )));
    }
    tracing::info!(
        points = distances.len(),
        from,
        to,
        "scanning bond length grid"
    );
    let mut frames = Vec::with_capacity(distances.len());
    for &distance in distances {
        tracing::debug!(distance, "bond scan point");
        let frame = molecule
            .set_distance_numbered(from, to, distance)?
            .with_name(format!("{}_d{:.3}", molecule.name(), distance));
        frames.push(frame);
    }
    Ok(frames)
}

/// Derives one molecule per grid angle with the torsion driven to that
/// dihedral.
pub fn dihedral_scan(
    molecule: &Molecule,
    torsion: &IndexTorsion,
    angles: &[f64],
) -> Result<Vec<Molecule>, GeometryError> {
    tracing::info!(points = angles.len(), "scanning dihedral grid");
    let mut frames = Vec::with_capacity(angles.len());
    for &theta in angles {
        tracing::debug!(theta, "dihedral scan point");
        let frame = molecule
            .set_dihedral_index(torsion, theta)?
            .with_name(format!("{}_t{:.1}", molecule.name(), theta));
        frames.push(frame);
    }
    Ok(frames)
}

/// The two-distance constraint search: fix the `bond` pair at
/// `bond_length`, then find the `angle` bend that puts the `probe` pair at
/// `probe_length`, by a coarse sweep over the angle window and a fine
/// sweep around the best coarse hit.
///
/// # Errors
///
/// `GeometryError::Convergence` when no swept angle brings the probe
/// distance within tolerance, plus anything the underlying edits raise.
pub fn solve_angle_for_distance(
    molecule: &Molecule,
    bond: (usize, usize),
    bond_length: f64,
    angle: (usize, usize, usize),
    probe: (usize, usize),
    probe_length: f64,
    options: &AngleSearch,
) -> Result<Molecule, GeometryError> {
    let working = molecule.set_distance_numbered(bond.0, bond.1, bond_length)?;

    let coarse = sweep(
        &working,
        angle,
        probe,
        probe_length,
        options.coarse_start,
        options.coarse_stop,
        options.coarse_step,
        None,
    )?;
    tracing::debug!(
        theta = coarse.theta,
        residual = coarse.residual,
        "coarse angle sweep done"
    );

    let best = sweep(
        &working,
        angle,
        probe,
        probe_length,
        coarse.theta - options.fine_window,
        coarse.theta + options.fine_window,
        options.fine_step,
        Some(options.tolerance),
    )?;

    if best.residual > options.tolerance {
        return Err(GeometryError::Convergence {
            best_delta: best.residual,
            tolerance: options.tolerance,
        });
    }
    tracing::info!(
        theta = best.theta,
        residual = best.residual,
        "angle search converged"
    );
    Ok(best.molecule)
}

struct SweepHit {
    molecule: Molecule,
    theta: f64,
    residual: f64,
}

/// Sweeps the bend angle over an inclusive grid, tracking the candidate
/// whose probe distance lands closest to the target. Stops early once
/// inside `early_out` if given.
#[allow(clippy::too_many_arguments)]
fn sweep(
    molecule: &Molecule,
    angle: (usize, usize, usize),
    probe: (usize, usize),
    probe_length: f64,
    start: f64,
    stop: f64,
    step: f64,
    early_out: Option<f64>,
) -> Result<SweepHit, GeometryError> {
    let mut best: Option<SweepHit> = None;
    for theta in distance_grid(start, stop, step)? {
        let candidate = molecule.set_angle_numbered(angle.0, angle.1, angle.2, theta)?;
        let residual = (candidate.distance_numbered(probe.0, probe.1)? - probe_length).abs();
        if best.as_ref().is_none_or(|b| residual < b.residual) {
            best = Some(SweepHit {
                molecule: candidate,
                theta,
                residual,
            });
        }
        if let Some(tolerance) = early_out {
            if best.as_ref().is_some_and(|b| b.residual <= tolerance) {
                break;
            }
        }
    }
    best.ok_or_else(|| {
        GeometryError::InvalidArgument("empty angle sweep window".to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::Atom;
    use crate::core::models::element::Element;
    use nalgebra::Point3;

    fn atom(element: Element, x: f64, y: f64, z: f64) -> Atom {
        Atom::new(element, Point3::new(x, y, z), 0).unwrap()
    }

    /// Bent three-carbon chain 1-2-3 with a pendant hydrogen on atom 3.
    fn probe_molecule() -> Molecule {
        Molecule::new(
            "probe",
            vec![
                atom(Element::Carbon, 0.0, 1.5, 0.0),
                atom(Element::Carbon, 0.0, 0.0, 0.0),
                atom(Element::Carbon, 1.5, 0.0, 0.0),
                atom(Element::Hydrogen, 2.0, 0.9, 0.0),
            ],
            &[(1, 2, 1.0), (2, 3, 1.0), (3, 4, 1.0)],
            0.0,
        )
        .unwrap()
    }

    #[test]
    fn distance_grid_is_inclusive_and_accumulation_tolerant() {
        let grid = distance_grid(1.0, 2.0, 0.25).unwrap();
        assert_eq!(grid.len(), 5);
        assert!((grid[4] - 2.0).abs() < 1e-12);

        // a step that does not divide the span evenly stops short
        let grid = distance_grid(1.0, 2.0, 0.3).unwrap();
        assert_eq!(grid.len(), 4);

        // the classic float trap: 0.1 steps still reach the endpoint
        let grid = distance_grid(1.0, 1.3, 0.1).unwrap();
        assert_eq!(grid.len(), 4);

        assert!(distance_grid(1.0, 2.0, 0.0).is_err());
        assert!(distance_grid(1.0, 2.0, -0.1).is_err());
        assert!(distance_grid(2.0, 1.0, 0.5).unwrap().is_empty());
    }

    #[test]
    fn bond_scan_produces_one_frame_per_distance() {
        let molecule = probe_molecule();
        let grid = [1.3, 1.5, 1.7];
        let frames = bond_scan(&molecule, 2, 3, &grid).unwrap();

        assert_eq!(frames.len(), 3);
        for (frame, &target) in frames.iter().zip(&grid) {
            assert!((frame.distance_numbered(2, 3).unwrap() - target).abs() < 1e-9);
            assert_eq!(frame.len(), molecule.len());
        }
        assert_eq!(frames[0].name(), "probe_d1.300");
        // template untouched
        assert!((molecule.distance_numbered(2, 3).unwrap() - 1.5).abs() < 1e-12);
    }

    #[test]
    fn bond_scan_rejects_unbonded_pairs() {
        let molecule = probe_molecule();
        assert!(matches!(
            bond_scan(&molecule, 1, 3, &[1.5]),
            Err(GeometryError::InvalidArgument(_))
        ));
    }

    #[test]
    fn dihedral_scan_hits_each_grid_angle() {
        let molecule = probe_molecule();
        let torsion = IndexTorsion::from_molecule(&molecule, 1, 2, 3, 4).unwrap();
        let grid = [-120.0, 0.0, 120.0];
        let frames = dihedral_scan(&molecule, &torsion, &grid).unwrap();

        assert_eq!(frames.len(), 3);
        for (frame, &theta) in frames.iter().zip(&grid) {
            let measured = torsion.dihedral_in(frame).unwrap();
            assert!((measured - theta).abs() < 1e-6, "theta {} got {}", theta, measured);
        }
    }

    #[test]
    fn angle_search_hits_an_achievable_target() {
        let molecule = probe_molecule();
        // target distance between atoms 1 and 3 achievable inside the
        // 70-130 degree window: at 100 degrees and arms 1.5/1.5,
        // |p1 - p3| = 2 * 1.5 * sin(50 deg) = 2.2981
        let solved = solve_angle_for_distance(
            &molecule,
            (1, 2),
            1.5,
            (1, 2, 3),
            (1, 3),
            2.2981,
            &AngleSearch::default(),
        )
        .unwrap();

        let residual = (solved.distance_numbered(1, 3).unwrap() - 2.2981).abs();
        assert!(residual <= 0.001, "residual {}", residual);
        assert!((solved.distance_numbered(1, 2).unwrap() - 1.5).abs() < 1e-9);
        let theta = solved.angle_numbered(1, 2, 3).unwrap();
        assert!((theta - 100.0).abs() < 0.5, "theta {}", theta);
    }

    #[test]
    fn angle_search_reports_nonconvergence() {
        let molecule = probe_molecule();
        // no bend in the window can bring atoms 1 and 3 to 10 A
        let err = solve_angle_for_distance(
            &molecule,
            (1, 2),
            1.5,
            (1, 2, 3),
            (1, 3),
            10.0,
            &AngleSearch::default(),
        )
        .unwrap_err();
        assert!(matches!(err, GeometryError::Convergence { .. }), "{}", err);
    }

    #[test]
    fn tighter_tolerance_still_converges_on_the_fine_sweep() {
        let molecule = probe_molecule();
        let options = AngleSearch {
            tolerance: 0.0005,
            ..AngleSearch::default()
        };
        let solved = solve_angle_for_distance(
            &molecule,
            (1, 2),
            1.4,
            (1, 2, 3),
            (1, 3),
            2.1,
            &options,
        )
        .unwrap();
        let residual = (solved.distance_numbered(1, 3).unwrap() - 2.1).abs();
        assert!(residual <= 0.0005, "residual {}", residual);
    }
}
