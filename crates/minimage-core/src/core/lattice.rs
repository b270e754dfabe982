use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};

use super::error::GeomError;

/// A periodic cell defined by three row vectors.
///
/// The rows of `matrix` are the lattice vectors **a**, **b**, **c**, so a
/// fractional coordinate `f` maps to the Cartesian point `f · M` (row-vector
/// convention). The inverse is computed once at construction and reused for
/// every Cartesian-to-fractional conversion; a singular basis is rejected
/// up front rather than on first use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lattice {
    matrix: Matrix3<f64>,
    inverse: Matrix3<f64>,
}

impl Lattice {
    /// Builds a lattice from its 3x3 row-vector basis.
    ///
    /// Fails with [`GeomError::SingularLattice`] when the basis is
    /// degenerate, since fractional/Cartesian conversion and supercell
    /// operations all require the inverse.
    pub fn new(matrix: Matrix3<f64>) -> Result<Self, GeomError> {
        let inverse = matrix.try_inverse().ok_or(GeomError::SingularLattice)?;
        Ok(Self { matrix, inverse })
    }

    /// Convenience constructor for an orthorhombic cell with the given edge
    /// lengths.
    pub fn orthorhombic(a: f64, b: f64, c: f64) -> Result<Self, GeomError> {
        Self::new(Matrix3::from_diagonal(&Vector3::new(a, b, c)))
    }

    /// Convenience constructor for a cubic cell.
    pub fn cubic(a: f64) -> Result<Self, GeomError> {
        Self::orthorhombic(a, a, a)
    }

    pub fn matrix(&self) -> &Matrix3<f64> {
        &self.matrix
    }

    pub fn inverse(&self) -> &Matrix3<f64> {
        &self.inverse
    }

    /// Cell volume, `|det(M)|`.
    pub fn volume(&self) -> f64 {
        self.matrix.determinant().abs()
    }

    /// Converts a fractional coordinate to Cartesian: `f · M`.
    pub fn get_cartesian(&self, frac: &Vector3<f64>) -> Vector3<f64> {
        self.matrix.transpose() * frac
    }

    /// Converts a Cartesian coordinate to fractional: `x · M⁻¹`.
    pub fn get_fractional(&self, cart: &Vector3<f64>) -> Vector3<f64> {
        self.inverse.transpose() * cart
    }

    /// Largest `|cos|` of the angles between distinct lattice vectors.
    ///
    /// Zero for an orthogonal basis, approaching one as the cell degenerates.
    /// The minimum-image search widens its translation window when this
    /// exceeds [`crate::geometry::displacement::SKEW_THRESHOLD`].
    pub fn skewness(&self) -> f64 {
        let rows: [Vector3<f64>; 3] = [
            self.matrix.row(0).transpose(),
            self.matrix.row(1).transpose(),
            self.matrix.row(2).transpose(),
        ];
        let mut max_cos: f64 = 0.0;
        for i in 0..3 {
            for j in (i + 1)..3 {
                let denom = rows[i].norm() * rows[j].norm();
                if denom > 0.0 {
                    max_cos = max_cos.max((rows[i].dot(&rows[j]) / denom).abs());
                }
            }
        }
        max_cos
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-9;

    fn f64_approx_equal(a: f64, b: f64) -> bool {
        (a - b).abs() < TOLERANCE
    }

    #[test]
    fn singular_matrix_is_rejected_at_construction() {
        let matrix = Matrix3::new(1.0, 0.0, 0.0, 2.0, 0.0, 0.0, 0.0, 0.0, 1.0);
        assert_eq!(Lattice::new(matrix), Err(GeomError::SingularLattice));
    }

    #[test]
    fn fractional_cartesian_round_trip_recovers_input() {
        let matrix = Matrix3::new(4.0, 0.0, 0.0, 1.0, 3.0, 0.0, 0.5, 0.5, 5.0);
        let lattice = Lattice::new(matrix).unwrap();
        let frac = Vector3::new(0.25, 0.5, 0.75);
        let cart = lattice.get_cartesian(&frac);
        let back = lattice.get_fractional(&cart);
        assert!((back - frac).norm() < TOLERANCE);
    }

    #[test]
    fn cartesian_conversion_follows_row_vector_convention() {
        let matrix = Matrix3::new(2.0, 0.0, 0.0, 0.0, 3.0, 0.0, 0.0, 0.0, 4.0);
        let lattice = Lattice::new(matrix).unwrap();
        let cart = lattice.get_cartesian(&Vector3::new(0.5, 0.5, 0.5));
        assert!(f64_approx_equal(cart.x, 1.0));
        assert!(f64_approx_equal(cart.y, 1.5));
        assert!(f64_approx_equal(cart.z, 2.0));
    }

    #[test]
    fn volume_of_orthorhombic_cell_is_edge_product() {
        let lattice = Lattice::orthorhombic(2.0, 3.0, 4.0).unwrap();
        assert!(f64_approx_equal(lattice.volume(), 24.0));
    }

    #[test]
    fn skewness_is_zero_for_cubic_and_half_for_hexagonal() {
        let cubic = Lattice::cubic(3.0).unwrap();
        assert!(cubic.skewness() < TOLERANCE);

        // Hexagonal cell: a and b at 120 degrees, |cos| = 0.5.
        let matrix = Matrix3::new(3.0, 0.0, 0.0, -1.5, 3.0 * 0.75f64.sqrt(), 0.0, 0.0, 0.0, 5.0);
        let hex = Lattice::new(matrix).unwrap();
        assert!(f64_approx_equal(hex.skewness(), 0.5));
    }
}
