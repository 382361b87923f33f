use crate::core::models::atom::Atom;
use crate::core::models::molecule::Molecule;

/// Non-bonded pairs closer than this are a hard clash.
pub const MINIMUM_DISTANCE: f64 = 1.0;
/// Pairs beyond this contribute nothing to the steric screen.
pub const CUTOFF_DISTANCE: f64 = 6.0;
/// Distances are floored here before the 12-6 evaluation so a single
/// overlapping pair cannot blow the score out to infinity.
const DISTANCE_FLOOR: f64 = 0.5;

impl Molecule {
    /// Whether two atoms are at least three bonds apart: not bonded to
    /// each other and sharing no common neighbor. Atoms outside the
    /// molecule are vacuously separated.
    pub fn separated_by_three_or_more_bonds(&self, a: &Atom, b: &Atom) -> bool {
        let (Ok(i), Ok(j)) = (self.index_of(a), self.index_of(b)) else {
            return true;
        };
        if self.graph.directly_connected(i, j) {
            return false;
        }
        let Ok(adjacent) = self.graph.neighbors(i) else {
            return true;
        };
        !adjacent
            .iter()
            .any(|&(n, _)| self.graph.directly_connected(n, j))
    }

    /// A coarse intramolecular strain score: a 12-6 Lennard-Jones sum over
    /// pairs separated by three or more bonds, within the cutoff, with
    /// geometric-mean element parameters, normalized by atom count.
    ///
    /// This is a screening heuristic for ranking scan candidates, not a
    /// force field; the absolute value means nothing outside comparisons
    /// between conformers of the same molecule.
    pub fn steric_energy(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        let atoms = self.atoms();
        let mut energy = 0.0;
        for i in 0..atoms.len() {
            for j in (i + 1)..atoms.len() {
                if !self.separated_by_three_or_more_bonds(&atoms[i], &atoms[j]) {
                    continue;
                }
                let r = Molecule::distance(&atoms[i], &atoms[j]);
                if r > CUTOFF_DISTANCE {
                    continue;
                }
                let r = r.max(DISTANCE_FLOOR);
                let sigma = (atoms[i].element.sigma() * atoms[j].element.sigma()).sqrt();
                let epsilon = (atoms[i].element.epsilon() * atoms[j].element.epsilon()).sqrt();
                let t = (sigma / r).powi(6);
                energy += 4.0 * epsilon * t * (t - 1.0);
            }
        }
        energy / atoms.len() as f64
    }

    /// Whether any non-bonded pair sits inside the hard clash distance.
    pub fn has_close_contact(&self) -> bool {
        let atoms = self.atoms();
        for i in 0..atoms.len() {
            for j in (i + 1)..atoms.len() {
                if self.graph.directly_connected(i, j) {
                    continue;
                }
                if Molecule::distance(&atoms[i], &atoms[j]) < MINIMUM_DISTANCE {
                    return true;
                }
            }
        }
        false
    }

    /// Like `has_close_contact`, but only over pairs involving at least
    /// one atom that is new relative to `prior`. Incremental build loops
    /// use this to check each addition without re-flagging clashes the
    /// prior structure already carried.
    pub fn has_close_contact_with_prior(&self, prior: &Molecule) -> bool {
        let atoms = self.atoms();
        for i in 0..atoms.len() {
            for j in (i + 1)..atoms.len() {
                if prior.contains_atom(&atoms[i]) && prior.contains_atom(&atoms[j]) {
                    continue;
                }
                if self.graph.directly_connected(i, j) {
                    continue;
                }
                if Molecule::distance(&atoms[i], &atoms[j]) < MINIMUM_DISTANCE {
                    return true;
                }
            }
        }
        false
    }
}
