use itertools::iproduct;
use nalgebra::{DMatrix, Vector3};
use tracing::debug;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::pbc::{Pbc, check_mask_shape};
use crate::core::config::BatchConfig;
use crate::core::error::GeomError;
use crate::core::lattice::Lattice;

/// Lattice skewness (largest `|cos|` between basis vectors) above which the
/// minimum-image search widens its translation window from `{-1, 0, 1}` to
/// `{-2, ..., 2}` per periodic axis.
pub const SKEW_THRESHOLD: f64 = 0.5;

/// Result of a minimum-image shortest-vector query: an n x m table of
/// Cartesian displacement vectors together with their squared lengths.
///
/// Squared distances are computed in the same pass as the vectors, so both
/// are always available. Masked pairs hold the documented sentinel: every
/// displacement component and the squared distance are `f64::INFINITY`.
#[derive(Debug, Clone, PartialEq)]
pub struct ShortestVectors {
    nrows: usize,
    ncols: usize,
    vectors: Vec<Vector3<f64>>,
    d2: Vec<f64>,
}

impl ShortestVectors {
    /// Shape of the table, `(n, m)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.nrows, self.ncols)
    }

    /// Minimum-image Cartesian displacement from point `i` of the first set
    /// to point `j` of the second.
    pub fn get(&self, i: usize, j: usize) -> &Vector3<f64> {
        &self.vectors[i * self.ncols + j]
    }

    /// Squared length of the displacement at `(i, j)`.
    pub fn d2(&self, i: usize, j: usize) -> f64 {
        self.d2[i * self.ncols + j]
    }

    /// Length of the displacement at `(i, j)`.
    pub fn distance(&self, i: usize, j: usize) -> f64 {
        self.d2(i, j).sqrt()
    }

    /// Row `i` as a slice of m displacement vectors.
    pub fn row(&self, i: usize) -> &[Vector3<f64>] {
        &self.vectors[i * self.ncols..(i + 1) * self.ncols]
    }
}

/// Computes, for every pair of one point from `fcoords1` and one from
/// `fcoords2`, the Cartesian displacement vector of minimum length over the
/// periodic images of the lattice, along with its squared length.
///
/// Both inputs are fractional; each coordinate is first wrapped into `[0, 1)`
/// on periodic axes, then a fixed window of lattice translations is searched
/// per pair (27 images for a fully periodic, reasonably orthogonal cell).
/// For lattices whose [`Lattice::skewness`] exceeds [`SKEW_THRESHOLD`] the
/// window widens to 5 translations per periodic axis.
///
/// `mask` entries set to `true` skip the pair; skipped pairs report
/// `f64::INFINITY` for the squared distance and for every displacement
/// component.
///
/// Rows are processed in chunks of `config.pair_threshold / m` rows, which
/// bounds in-flight intermediates and, with the `parallel` feature, is the
/// unit of work handed to rayon. The n x m output table itself is the peak
/// allocation; callers that cannot afford it should query in row batches.
///
/// # Known limitation
///
/// The widened window is a heuristic. For severely non-reduced bases (basis
/// vectors many cells long compared to the reduced cell) the true minimum
/// image can lie outside even the widened window; reduce the basis (Niggli
/// or LLL) before calling.
pub fn pbc_shortest_vectors(
    lattice: &Lattice,
    fcoords1: &[Vector3<f64>],
    fcoords2: &[Vector3<f64>],
    mask: Option<&DMatrix<bool>>,
    pbc: Pbc,
    config: &BatchConfig,
) -> Result<ShortestVectors, GeomError> {
    let n = fcoords1.len();
    let m = fcoords2.len();
    check_mask_shape(mask, n, m)?;

    if n == 0 || m == 0 {
        return Ok(ShortestVectors {
            nrows: n,
            ncols: m,
            vectors: Vec::new(),
            d2: Vec::new(),
        });
    }

    let images = image_window(lattice, pbc);
    let cart_images: Vec<Vector3<f64>> = images.iter().map(|t| lattice.get_cartesian(t)).collect();

    let cart1: Vec<Vector3<f64>> = fcoords1
        .iter()
        .map(|f| lattice.get_cartesian(&wrap_frac(f, pbc)))
        .collect();
    let cart2: Vec<Vector3<f64>> = fcoords2
        .iter()
        .map(|f| lattice.get_cartesian(&wrap_frac(f, pbc)))
        .collect();

    let chunk_rows = config.rows_per_chunk(m);
    if n * m > config.pair_threshold {
        debug!(
            n,
            m,
            images = cart_images.len(),
            chunk_rows,
            "shortest-vector search exceeds pair threshold, processing in row chunks"
        );
    }

    let compute_row = |i: usize| -> (Vec<Vector3<f64>>, Vec<f64>) {
        let mut row_vectors = Vec::with_capacity(m);
        let mut row_d2 = Vec::with_capacity(m);
        for j in 0..m {
            if mask.map(|mk| mk[(i, j)]).unwrap_or(false) {
                row_vectors.push(Vector3::repeat(f64::INFINITY));
                row_d2.push(f64::INFINITY);
                continue;
            }
            let base = cart2[j] - cart1[i];
            let mut best = base + cart_images[0];
            let mut best_d2 = best.norm_squared();
            for translation in &cart_images[1..] {
                let candidate = base + translation;
                let candidate_d2 = candidate.norm_squared();
                if candidate_d2 < best_d2 {
                    best_d2 = candidate_d2;
                    best = candidate;
                }
            }
            row_vectors.push(best);
            row_d2.push(best_d2);
        }
        (row_vectors, row_d2)
    };

    let mut vectors = Vec::with_capacity(n * m);
    let mut d2 = Vec::with_capacity(n * m);
    for chunk_start in (0..n).step_by(chunk_rows) {
        let chunk_end = (chunk_start + chunk_rows).min(n);

        #[cfg(feature = "parallel")]
        let rows: Vec<(Vec<Vector3<f64>>, Vec<f64>)> = (chunk_start..chunk_end)
            .into_par_iter()
            .map(compute_row)
            .collect();

        #[cfg(not(feature = "parallel"))]
        let rows: Vec<(Vec<Vector3<f64>>, Vec<f64>)> =
            (chunk_start..chunk_end).map(compute_row).collect();

        for (row_vectors, row_d2) in rows {
            vectors.extend(row_vectors);
            d2.extend(row_d2);
        }
    }

    Ok(ShortestVectors {
        nrows: n,
        ncols: m,
        vectors,
        d2,
    })
}

/// Wraps a fractional coordinate into `[0, 1)` on periodic axes.
fn wrap_frac(f: &Vector3<f64>, pbc: Pbc) -> Vector3<f64> {
    let mut wrapped = *f;
    for axis in 0..3 {
        if pbc.0[axis] {
            wrapped[axis] -= wrapped[axis].floor();
        }
    }
    wrapped
}

/// Fractional lattice translations searched per pair. Non-periodic axes
/// contribute only the zero translation.
fn image_window(lattice: &Lattice, pbc: Pbc) -> Vec<Vector3<f64>> {
    let reach: i64 = if lattice.skewness() > SKEW_THRESHOLD {
        2
    } else {
        1
    };
    let axis_range = |periodic: bool| {
        if periodic { -reach..=reach } else { 0..=0 }
    };
    iproduct!(
        axis_range(pbc.0[0]),
        axis_range(pbc.0[1]),
        axis_range(pbc.0[2])
    )
    .map(|(a, b, c)| Vector3::new(a as f64, b as f64, c as f64))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-9;

    fn f64_approx_equal(a: f64, b: f64) -> bool {
        (a - b).abs() < TOLERANCE
    }

    /// Reference implementation: exhaustive search over a 7^3 window with no
    /// wrapping shortcuts.
    fn brute_force_d2(lattice: &Lattice, f1: &Vector3<f64>, f2: &Vector3<f64>) -> f64 {
        let mut best = f64::INFINITY;
        for a in -3..=3 {
            for b in -3..=3 {
                for c in -3..=3 {
                    let image = Vector3::new(a as f64, b as f64, c as f64);
                    let cart = lattice.get_cartesian(&(f2 - f1 + image));
                    best = best.min(cart.norm_squared());
                }
            }
        }
        best
    }

    #[test]
    fn cubic_cell_wraps_across_the_boundary() {
        let lattice = Lattice::cubic(2.0).unwrap();
        let fc1 = vec![Vector3::zeros()];
        let fc2 = vec![Vector3::new(0.9, 0.0, 0.0)];
        let result = pbc_shortest_vectors(
            &lattice,
            &fc1,
            &fc2,
            None,
            Pbc::all(),
            &BatchConfig::default(),
        )
        .unwrap();
        let v = result.get(0, 0);
        assert!(f64_approx_equal(v.x, -0.2));
        assert!(f64_approx_equal(v.y, 0.0));
        assert!(f64_approx_equal(result.d2(0, 0), 0.04));
    }

    #[test]
    fn squared_distance_equals_vector_norm_for_triclinic_cell() {
        let matrix = nalgebra::Matrix3::new(3.1, 0.0, 0.0, 0.4, 2.9, 0.0, -0.3, 0.7, 4.2);
        let lattice = Lattice::new(matrix).unwrap();
        let fc1 = vec![Vector3::new(0.12, 0.88, 0.4), Vector3::new(0.6, 0.1, 0.95)];
        let fc2 = vec![Vector3::new(0.97, 0.03, 0.5), Vector3::new(0.33, 0.33, 0.33)];
        let result = pbc_shortest_vectors(
            &lattice,
            &fc1,
            &fc2,
            None,
            Pbc::all(),
            &BatchConfig::default(),
        )
        .unwrap();
        for i in 0..2 {
            for j in 0..2 {
                assert!(f64_approx_equal(
                    result.get(i, j).norm_squared(),
                    result.d2(i, j)
                ));
            }
        }
    }

    #[test]
    fn agrees_with_brute_force_on_a_skewed_lattice() {
        let matrix = nalgebra::Matrix3::new(4.0, 0.0, 0.0, 3.2, 1.5, 0.0, 0.5, 0.9, 3.8);
        let lattice = Lattice::new(matrix).unwrap();
        let fc1 = vec![
            Vector3::new(0.05, 0.95, 0.5),
            Vector3::new(0.7, 0.2, 0.01),
            Vector3::new(0.5, 0.5, 0.5),
        ];
        let fc2 = vec![Vector3::new(0.9, 0.04, 0.88), Vector3::new(0.02, 0.5, 0.5)];
        let result = pbc_shortest_vectors(
            &lattice,
            &fc1,
            &fc2,
            None,
            Pbc::all(),
            &BatchConfig::default(),
        )
        .unwrap();
        for (i, f1) in fc1.iter().enumerate() {
            for (j, f2) in fc2.iter().enumerate() {
                let expected = brute_force_d2(&lattice, f1, f2);
                assert!(
                    (result.d2(i, j) - expected).abs() < 1e-9,
                    "pair ({i}, {j}): got {}, brute force {}",
                    result.d2(i, j),
                    expected
                );
            }
        }
    }

    #[test]
    fn distance_to_self_is_zero() {
        let lattice = Lattice::orthorhombic(3.0, 4.0, 5.0).unwrap();
        let fc = vec![Vector3::new(0.1, 0.2, 0.3), Vector3::new(0.8, 0.9, 0.99)];
        let result =
            pbc_shortest_vectors(&lattice, &fc, &fc, None, Pbc::all(), &BatchConfig::default())
                .unwrap();
        assert!(f64_approx_equal(result.d2(0, 0), 0.0));
        assert!(f64_approx_equal(result.d2(1, 1), 0.0));
    }

    #[test]
    fn masked_pairs_report_infinite_sentinel() {
        let lattice = Lattice::cubic(2.0).unwrap();
        let fc1 = vec![Vector3::zeros()];
        let fc2 = vec![Vector3::new(0.5, 0.5, 0.5), Vector3::new(0.25, 0.0, 0.0)];
        let mut mask = DMatrix::from_element(1, 2, false);
        mask[(0, 0)] = true;
        let result = pbc_shortest_vectors(
            &lattice,
            &fc1,
            &fc2,
            Some(&mask),
            Pbc::all(),
            &BatchConfig::default(),
        )
        .unwrap();
        assert!(result.d2(0, 0).is_infinite());
        assert!(result.get(0, 0).iter().all(|c| c.is_infinite()));
        assert!(f64_approx_equal(result.d2(0, 1), 0.25));
    }

    #[test]
    fn non_periodic_axis_does_not_wrap() {
        let lattice = Lattice::cubic(2.0).unwrap();
        let fc1 = vec![Vector3::zeros()];
        let fc2 = vec![Vector3::new(0.0, 0.0, 0.9)];
        let slab = Pbc([true, true, false]);
        let result =
            pbc_shortest_vectors(&lattice, &fc1, &fc2, None, slab, &BatchConfig::default())
                .unwrap();
        // Raw z separation of 0.9 cells = 1.8, unwrapped.
        assert!(f64_approx_equal(result.d2(0, 0), 1.8 * 1.8));
    }

    #[test]
    fn chunked_processing_matches_single_pass() {
        let lattice = Lattice::orthorhombic(2.0, 3.0, 4.0).unwrap();
        let fc1: Vec<Vector3<f64>> = (0..7)
            .map(|i| Vector3::new(i as f64 * 0.13, i as f64 * 0.07, i as f64 * 0.29))
            .collect();
        let fc2: Vec<Vector3<f64>> = (0..5)
            .map(|i| Vector3::new(i as f64 * 0.21, i as f64 * 0.17, i as f64 * 0.11))
            .collect();
        let whole = pbc_shortest_vectors(
            &lattice,
            &fc1,
            &fc2,
            None,
            Pbc::all(),
            &BatchConfig::default(),
        )
        .unwrap();
        let chunked = pbc_shortest_vectors(
            &lattice,
            &fc1,
            &fc2,
            None,
            Pbc::all(),
            &BatchConfig { pair_threshold: 1 },
        )
        .unwrap();
        assert_eq!(whole, chunked);
    }

    #[test]
    fn skewed_lattice_widens_the_image_window() {
        let matrix = nalgebra::Matrix3::new(4.0, 0.0, 0.0, 3.2, 1.5, 0.0, 0.5, 0.9, 3.8);
        let lattice = Lattice::new(matrix).unwrap();
        assert!(lattice.skewness() > SKEW_THRESHOLD);
        assert_eq!(image_window(&lattice, Pbc::all()).len(), 125);

        let cubic = Lattice::cubic(2.0).unwrap();
        assert_eq!(image_window(&cubic, Pbc::all()).len(), 27);
        assert_eq!(image_window(&cubic, Pbc([true, true, false])).len(), 9);
    }
}
