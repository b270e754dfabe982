use itertools::Itertools;
use nalgebra::{DMatrix, DVector};
use std::fmt;

use crate::core::error::GeomError;

/// A generalized simplex: an ordered list of vertices in an ambient space of
/// equal or higher dimension.
///
/// Vertices are the rows of the coordinate matrix. A simplex with d + 1
/// vertices in d-dimensional space is *full-dimensional*; the augmented
/// vertex matrix (coordinates extended with a column of ones) and its
/// inverse are computed once at construction and reused for every
/// barycentric query. Simplices that are not full-dimensional (fewer or
/// more vertices than d + 1, or geometrically degenerate vertices) can
/// still be constructed, but every barycentric operation on them fails
/// with [`GeomError::NotFullDimensional`].
///
/// Immutable after construction.
#[derive(Debug, Clone)]
pub struct Simplex {
    coords: DMatrix<f64>,
    aug: DMatrix<f64>,
    aug_inv: Option<DMatrix<f64>>,
}

impl Simplex {
    /// Builds a simplex from its vertex rows.
    pub fn new(coords: DMatrix<f64>) -> Self {
        let n = coords.nrows();
        let d = coords.ncols();
        let mut aug = DMatrix::zeros(n, d + 1);
        aug.view_mut((0, 0), (n, d)).copy_from(&coords);
        aug.column_mut(d).fill(1.0);
        // Inversion only makes sense for a full-dimensional simplex; a
        // square-but-singular augmented matrix means the vertices are
        // degenerate, which is the same failure to the caller.
        let aug_inv = if n == d + 1 {
            aug.clone().try_inverse()
        } else {
            None
        };
        Self {
            coords,
            aug,
            aug_inv,
        }
    }

    /// Ambient space dimension.
    pub fn dim(&self) -> usize {
        self.coords.ncols()
    }

    /// Dimension of the simplex itself (vertex count minus one).
    pub fn simplex_dim(&self) -> usize {
        self.coords.nrows() - 1
    }

    pub fn num_vertices(&self) -> usize {
        self.coords.nrows()
    }

    pub fn is_full_dimensional(&self) -> bool {
        self.aug_inv.is_some()
    }

    /// A copy of the vertex coordinate matrix (rows are vertices).
    pub fn coords(&self) -> DMatrix<f64> {
        self.coords.clone()
    }

    /// Volume of the simplex, `|det(aug)| / d!`.
    pub fn volume(&self) -> Result<f64, GeomError> {
        if self.coords.nrows() != self.coords.ncols() + 1 {
            return Err(self.not_full_dimensional());
        }
        Ok(self.aug.determinant().abs() / factorial(self.dim()))
    }

    /// Barycentric coordinates of a Cartesian point, via the precomputed
    /// augmented-matrix inverse.
    pub fn bary_coords(&self, point: &DVector<f64>) -> Result<DVector<f64>, GeomError> {
        let aug_inv = self
            .aug_inv
            .as_ref()
            .ok_or_else(|| self.not_full_dimensional())?;
        if point.len() != self.dim() {
            return Err(GeomError::DimensionMismatch {
                expected: self.dim(),
                found: point.len(),
            });
        }
        let mut extended = DVector::zeros(self.dim() + 1);
        extended.rows_mut(0, self.dim()).copy_from(point);
        extended[self.dim()] = 1.0;
        // Row-vector convention: [point, 1] · aug⁻¹.
        Ok(aug_inv.transpose() * extended)
    }

    /// Cartesian point of a barycentric coordinate vector.
    pub fn point_from_bary_coords(&self, bary: &DVector<f64>) -> Result<DVector<f64>, GeomError> {
        if self.aug_inv.is_none() {
            return Err(self.not_full_dimensional());
        }
        if bary.len() != self.num_vertices() {
            return Err(GeomError::DimensionMismatch {
                expected: self.num_vertices(),
                found: bary.len(),
            });
        }
        Ok(self.coords.transpose() * bary)
    }

    /// Whether `point` lies inside the simplex, allowing each barycentric
    /// coordinate to dip to `-tolerance` so boundary points are included.
    pub fn in_simplex(&self, point: &DVector<f64>, tolerance: f64) -> Result<bool, GeomError> {
        Ok(self.bary_coords(point)?.iter().all(|&b| b >= -tolerance))
    }

    /// Points where the line through `point1` and `point2` crosses the
    /// simplex boundary.
    ///
    /// For each facet (each barycentric component), the line parameter at
    /// which that component vanishes is solved for; candidates inside the
    /// simplex are kept, coincident solutions within `tolerance` are
    /// deduplicated. A convex simplex admits at most two boundary
    /// crossings, so three or more surviving points fail with
    /// [`GeomError::TooManyIntersections`].
    pub fn line_intersection(
        &self,
        point1: &DVector<f64>,
        point2: &DVector<f64>,
        tolerance: f64,
    ) -> Result<Vec<DVector<f64>>, GeomError> {
        let b1 = self.bary_coords(point1)?;
        let b2 = self.bary_coords(point2)?;
        let line = &b1 - &b2;

        let mut barys: Vec<DVector<f64>> = Vec::new();
        for k in 0..line.len() {
            // A component the line never changes is parallel to that facet.
            if line[k].abs() <= 1e-10 {
                continue;
            }
            let candidate = &b1 - &line * (b1[k] / line[k]);
            if candidate.iter().all(|&b| b >= -tolerance) {
                let duplicate = barys
                    .iter()
                    .any(|b| (b - &candidate).iter().all(|d| d.abs() <= tolerance));
                if !duplicate {
                    barys.push(candidate);
                }
            }
        }
        if barys.len() >= 3 {
            return Err(GeomError::TooManyIntersections { found: barys.len() });
        }
        barys
            .iter()
            .map(|b| self.point_from_bary_coords(b))
            .collect()
    }

    fn not_full_dimensional(&self) -> GeomError {
        GeomError::NotFullDimensional {
            rows: self.coords.nrows(),
            cols: self.coords.ncols(),
        }
    }
}

/// Equality is vertex-set equality up to permutation, compared exactly with
/// no floating tolerance. This matches how facets are deduplicated by the
/// phase-diagram callers; see DESIGN.md for why it is not tolerance-based.
impl PartialEq for Simplex {
    fn eq(&self, other: &Self) -> bool {
        if self.coords.shape() != other.coords.shape() {
            return false;
        }
        let n = self.coords.nrows();
        (0..n).permutations(n).any(|perm| {
            perm.iter()
                .enumerate()
                .all(|(dst, &src)| self.coords.row(src) == other.coords.row(dst))
        })
    }
}

impl fmt::Display for Simplex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{}-simplex in {}D space\nVertices:",
            self.simplex_dim(),
            self.dim()
        )?;
        for row in self.coords.row_iter() {
            let parts: Vec<String> = row.iter().map(|v| v.to_string()).collect();
            writeln!(f, "\t({})", parts.join(", "))?;
        }
        Ok(())
    }
}

/// Barycentric coordinates of `points` (rows) with respect to a simplex
/// given directly as its vertex matrix, without constructing a [`Simplex`].
///
/// Solves the vertex-difference system per point; the simplex must be
/// full-dimensional.
pub fn barycentric_coords(
    points: &DMatrix<f64>,
    simplex: &DMatrix<f64>,
) -> Result<DMatrix<f64>, GeomError> {
    let n_vertices = simplex.nrows();
    let d = simplex.ncols();
    if n_vertices != d + 1 {
        return Err(GeomError::NotFullDimensional {
            rows: n_vertices,
            cols: d,
        });
    }
    if points.ncols() != d {
        return Err(GeomError::DimensionMismatch {
            expected: d,
            found: points.ncols(),
        });
    }

    let origin = simplex.row(n_vertices - 1);

    // Columns of t are the first d vertices relative to the last.
    let mut t = DMatrix::zeros(d, d);
    for k in 0..d {
        t.set_column(k, &(simplex.row(k) - origin).transpose());
    }
    let lu = t.lu();

    let mut rhs = DMatrix::zeros(d, points.nrows());
    for (i, row) in points.row_iter().enumerate() {
        rhs.set_column(i, &(row - origin).transpose());
    }
    let solution = lu.solve(&rhs).ok_or(GeomError::NotFullDimensional {
        rows: n_vertices,
        cols: d,
    })?;

    let mut out = DMatrix::zeros(points.nrows(), d + 1);
    for i in 0..points.nrows() {
        let mut sum = 0.0;
        for k in 0..d {
            out[(i, k)] = solution[(k, i)];
            sum += solution[(k, i)];
        }
        out[(i, d)] = 1.0 - sum;
    }
    Ok(out)
}

fn factorial(n: usize) -> f64 {
    (1..=n).map(|v| v as f64).product()
}
