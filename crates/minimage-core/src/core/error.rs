use thiserror::Error;

/// Errors produced by the coordinate geometry routines.
///
/// Every variant is a validation failure: the caller supplied data that
/// violates a documented precondition. None of these are recoverable by
/// retrying, since all computations are deterministic; the caller must
/// correct the input (deduplicate points, adjust tolerances, supply a
/// non-degenerate basis) and call again. No routine returns a partial
/// result alongside an error.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GeomError {
    #[error("Lattice matrix is singular (determinant is zero within floating precision)")]
    SingularLattice,

    #[error("Supercell matrix has zero determinant")]
    SingularSupercell,

    #[error(
        "Enumerated {found} lattice points inside the supercell, expected {expected} from |det(M)|"
    )]
    SupercellCountMismatch { expected: usize, found: usize },

    #[error("Coordinate list is not a subset of the superset (point {index} has no match)")]
    NotASubset { index: usize },

    #[error("Point {index} matches more than one superset row; superset contains duplicates")]
    DuplicateMatches { index: usize },

    #[error("Mask shape {found:?} does not match (n_subset, n_superset) = {expected:?}")]
    MaskShape {
        expected: (usize, usize),
        found: (usize, usize),
    },

    #[error("Simplex with {rows} vertices in {cols}-dimensional space is not full-dimensional")]
    NotFullDimensional { rows: usize, cols: usize },

    #[error("Found {found} line-simplex intersections; a convex simplex admits at most 2")]
    TooManyIntersections { found: usize },

    #[error("Expected a {expected}-dimensional coordinate, got {found}")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("x = {x} is out of the interpolation range ({min}, {max})")]
    OutOfRange { x: f64, min: f64, max: f64 },

    #[error("Input length mismatch: {left} x values vs {right} y values")]
    LengthMismatch { left: usize, right: usize },

    #[error("Invalid angle unit {0:?}, expected \"degrees\" or \"radians\"")]
    InvalidAngleUnit(String),
}
