use thiserror::Error;

/// Errors produced by the geometry engine.
///
/// The engine never retries or recovers internally: every precondition
/// violation surfaces immediately as one of these variants, and a failed
/// edit produces no partial molecule.
#[derive(Debug, Error)]
pub enum GeometryError {
    /// Malformed construction parameters or a query against an absent atom.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// An element symbol that the static table does not recognize.
    #[error("unrecognized element symbol '{symbol}'")]
    UnrecognizedSymbol { symbol: String },

    /// A half-graph traversal revisited the excluded atom: the caller asked
    /// to split a bond that lies on a ring. Atom numbers are 1-based.
    #[error("bond between atoms {exclude} and {include} lies on a ring and cannot split the graph")]
    RingDetected { exclude: usize, include: usize },

    /// Geometry too degenerate for the requested operation (e.g. a
    /// non-invertible hybridization frame).
    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(String),

    /// An iterative search could not satisfy its constraints within
    /// tolerance.
    #[error("search did not converge: best residual {best_delta} exceeds tolerance {tolerance}")]
    Convergence { best_delta: f64, tolerance: f64 },
}
