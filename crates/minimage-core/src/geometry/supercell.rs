use itertools::iproduct;
use nalgebra::{Matrix3, Vector3};
use tracing::trace;

use crate::core::error::GeomError;

/// Tolerance at the unit-cube boundary: points at exactly 0 are kept,
/// points at exactly 1 are not.
const BOUNDARY_TOL: f64 = 1e-10;

/// Enumerates the points of the primitive lattice that fall inside the
/// supercell described by the integer matrix `M` (supercell basis rows in
/// units of the primitive basis), expressed in fractional coordinates of
/// the supercell.
///
/// The transformed unit cube's corners bound the integer search range; each
/// candidate integer point is mapped through `M⁻¹` and kept when it lies in
/// the half-open cube `[0, 1)³` (with [`BOUNDARY_TOL`] slack at the lower
/// bound). E.g. `[[2,0,0],[0,1,0],[0,0,1]]` yields `[0,0,0]` and
/// `[0.5,0,0]`.
///
/// The number of retained points must equal `|det(M)|`; any mismatch is an
/// enumeration or tolerance bug and fails with
/// [`GeomError::SupercellCountMismatch`] rather than returning a wrong
/// count.
pub fn lattice_points_in_supercell(
    supercell_matrix: &Matrix3<i64>,
) -> Result<Vec<Vector3<f64>>, GeomError> {
    let det = det3_i64(supercell_matrix);
    if det == 0 {
        return Err(GeomError::SingularSupercell);
    }
    let expected = det.unsigned_abs() as usize;

    let matrix_f = supercell_matrix.map(|v| v as f64);
    let inverse = matrix_f
        .try_inverse()
        .ok_or(GeomError::SingularSupercell)?;

    // Corners of the unit cube under M, row-vector convention.
    let mut mins = [i64::MAX; 3];
    let mut maxes = [i64::MIN; 3];
    for (a, b, c) in iproduct!(0..=1i64, 0..=1i64, 0..=1i64) {
        let corner = Vector3::new(a, b, c);
        let transformed = supercell_matrix.transpose() * corner;
        for axis in 0..3 {
            mins[axis] = mins[axis].min(transformed[axis]);
            maxes[axis] = maxes[axis].max(transformed[axis]);
        }
    }

    trace!(?mins, ?maxes, expected, "enumerating supercell lattice points");

    let mut points = Vec::with_capacity(expected);
    for (a, b, c) in iproduct!(
        mins[0]..=maxes[0],
        mins[1]..=maxes[1],
        mins[2]..=maxes[2]
    ) {
        let lattice_point = Vector3::new(a as f64, b as f64, c as f64);
        let frac = inverse.transpose() * lattice_point;
        if frac
            .iter()
            .all(|&x| x >= -BOUNDARY_TOL && x < 1.0 - BOUNDARY_TOL)
        {
            points.push(frac);
        }
    }

    if points.len() != expected {
        return Err(GeomError::SupercellCountMismatch {
            expected,
            found: points.len(),
        });
    }
    Ok(points)
}

fn det3_i64(m: &Matrix3<i64>) -> i64 {
    m[(0, 0)] * (m[(1, 1)] * m[(2, 2)] - m[(1, 2)] * m[(2, 1)])
        - m[(0, 1)] * (m[(1, 0)] * m[(2, 2)] - m[(1, 2)] * m[(2, 0)])
        + m[(0, 2)] * (m[(1, 0)] * m[(2, 1)] - m[(1, 1)] * m[(2, 0)])
}
