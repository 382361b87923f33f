use crate::core::error::GeometryError;
use std::collections::{HashSet, VecDeque};

/// An undirected simple graph of bonds over atom indices.
///
/// Vertices are the 0-based positions of atoms in a molecule's ordered
/// contents; edges carry a positive bond order. Keying the adjacency by
/// index rather than by atom value means a geometric edit that replaces
/// atom positions leaves the graph untouched: derived molecules share the
/// structure cheaply instead of deep-copying an object graph, while the
/// public `Molecule` API still observes full immutability.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BondGraph {
    adjacency: Vec<Vec<(usize, f64)>>,
}

impl BondGraph {
    /// Creates a graph with `vertex_count` isolated vertices.
    pub fn new(vertex_count: usize) -> Self {
        Self {
            adjacency: vec![Vec::new(); vertex_count],
        }
    }

    /// The number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.adjacency.len()
    }

    /// The number of undirected edges.
    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(|n| n.len()).sum::<usize>() / 2
    }

    /// Adds an undirected bond of the given order.
    ///
    /// Adding an edge that already exists replaces its order.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::InvalidArgument` for out-of-range indices,
    /// a self-loop, or a non-positive order.
    pub fn add_bond(&mut self, i: usize, j: usize, order: f64) -> Result<(), GeometryError> {
        self.check_vertex(i)?;
        self.check_vertex(j)?;
        if i == j {
            return Err(GeometryError::InvalidArgument(format!(
                "cannot bond atom {} to itself",
                i + 1
            )));
        }
        if !(order > 0.0) {
            return Err(GeometryError::InvalidArgument(format!(
                "bond order must be positive, got {}",
                order
            )));
        }
        self.remove_bond(i, j);
        self.adjacency[i].push((j, order));
        self.adjacency[j].push((i, order));
        Ok(())
    }

    /// Removes the bond between `i` and `j`; a no-op if it does not exist.
    pub fn remove_bond(&mut self, i: usize, j: usize) {
        if i >= self.adjacency.len() || j >= self.adjacency.len() {
            return;
        }
        self.adjacency[i].retain(|&(n, _)| n != j);
        self.adjacency[j].retain(|&(n, _)| n != i);
    }

    /// Returns the order of the `i`-`j` bond, if it exists.
    pub fn bond_order(&self, i: usize, j: usize) -> Option<f64> {
        self.adjacency
            .get(i)?
            .iter()
            .find(|&&(n, _)| n == j)
            .map(|&(_, order)| order)
    }

    /// The bonded neighbors of vertex `i` with their bond orders.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::InvalidArgument` if `i` is out of range.
    pub fn neighbors(&self, i: usize) -> Result<&[(usize, f64)], GeometryError> {
        self.check_vertex(i)?;
        Ok(&self.adjacency[i])
    }

    /// The number of bonds at vertex `i`.
    pub fn degree(&self, i: usize) -> Result<usize, GeometryError> {
        Ok(self.neighbors(i)?.len())
    }

    /// Whether `i` and `j` share an edge.
    ///
    /// Out-of-range indices yield `false` rather than an error. This
    /// permissive behavior is deliberate (and asymmetric with the loud
    /// failures of `neighbors`): callers probe speculative pairs here.
    pub fn directly_connected(&self, i: usize, j: usize) -> bool {
        self.bond_order(i, j).is_some()
    }

    /// All vertices reachable from `start`, including `start` itself.
    /// Breadth-first.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::InvalidArgument` if `start` is out of range.
    pub fn explore_connected_component(
        &self,
        start: usize,
    ) -> Result<HashSet<usize>, GeometryError> {
        self.check_vertex(start)?;
        let mut seen = HashSet::new();
        let mut queue = VecDeque::new();
        seen.insert(start);
        queue.push_back(start);
        while let Some(current) = queue.pop_front() {
            for &(neighbor, _) in &self.adjacency[current] {
                if seen.insert(neighbor) {
                    queue.push_back(neighbor);
                }
            }
        }
        Ok(seen)
    }

    /// The connected fragment on the `include` side of the
    /// `exclude`-`include` bond, including `include` and excluding
    /// `exclude`.
    ///
    /// Returns an empty set if the two vertices are not directly bonded.
    /// The bond must be a bridge: if the breadth-first walk starting from
    /// `include`'s other neighbors ever reaches `exclude` again, the bond
    /// lies on a ring and the split is ill-defined.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::RingDetected` (with 1-based atom numbers)
    /// when the bond spans a ring, or `GeometryError::InvalidArgument` for
    /// out-of-range indices.
    pub fn half_graph(
        &self,
        exclude: usize,
        include: usize,
    ) -> Result<HashSet<usize>, GeometryError> {
        self.check_vertex(exclude)?;
        self.check_vertex(include)?;

        let mut fragment = HashSet::new();
        if !self.directly_connected(exclude, include) {
            return Ok(fragment);
        }

        fragment.insert(include);
        let mut queue = VecDeque::new();
        for &(neighbor, _) in &self.adjacency[include] {
            if neighbor != exclude && fragment.insert(neighbor) {
                queue.push_back(neighbor);
            }
        }

        while let Some(current) = queue.pop_front() {
            for &(neighbor, _) in &self.adjacency[current] {
                if neighbor == exclude {
                    return Err(GeometryError::RingDetected {
                        exclude: exclude + 1,
                        include: include + 1,
                    });
                }
                if fragment.insert(neighbor) {
                    queue.push_back(neighbor);
                }
            }
        }
        Ok(fragment)
    }

    /// Iterates over every undirected edge exactly once, as
    /// `(smaller_index, larger_index, order)`.
    pub fn bonds(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        self.adjacency.iter().enumerate().flat_map(|(i, neighbors)| {
            neighbors
                .iter()
                .filter(move |&&(j, _)| i < j)
                .map(move |&(j, order)| (i, j, order))
        })
    }

    fn check_vertex(&self, i: usize) -> Result<(), GeometryError> {
        if i >= self.adjacency.len() {
            return Err(GeometryError::InvalidArgument(format!(
                "atom index {} out of range for {} atoms",
                i,
                self.adjacency.len()
            )));
        }
        Ok(())
    }
}
