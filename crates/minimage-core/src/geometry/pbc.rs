use nalgebra::{DMatrix, Vector3};

use crate::core::error::GeomError;

/// Per-axis periodic boundary flags for the three lattice directions.
///
/// The default is fully periodic. Axes flagged `false` are compared without
/// wraparound, which is how slab and wire geometries are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pbc(pub [bool; 3]);

impl Default for Pbc {
    fn default() -> Self {
        Self::all()
    }
}

impl Pbc {
    pub fn all() -> Self {
        Pbc([true, true, true])
    }

    pub fn none() -> Self {
        Pbc([false, false, false])
    }

    pub fn is_fully_periodic(&self) -> bool {
        self.0.iter().all(|&p| p)
    }
}

/// Minimum-image fractional difference `f1 - f2`.
///
/// On each periodic axis the raw difference `d` is replaced by
/// `d - d.round()`, keeping it in `[-0.5, 0.5)`; non-periodic axes keep the
/// raw difference.
pub fn pbc_diff(f1: &Vector3<f64>, f2: &Vector3<f64>, pbc: Pbc) -> Vector3<f64> {
    let mut diff = f1 - f2;
    for axis in 0..3 {
        if pbc.0[axis] {
            diff[axis] -= diff[axis].round();
        }
    }
    diff
}

/// Indices of all fractional coords in `fcoord_list` equal to `fcoord`
/// within `atol` under periodic wraparound.
pub fn find_in_coord_list_pbc(
    fcoord_list: &[Vector3<f64>],
    fcoord: &Vector3<f64>,
    atol: f64,
    pbc: Pbc,
) -> Vec<usize> {
    fcoord_list
        .iter()
        .enumerate()
        .filter(|(_, c)| frac_match(c, fcoord, atol, pbc))
        .map(|(i, _)| i)
        .collect()
}

/// Whether `fcoord` appears in `fcoord_list` within `atol` under periodic
/// wraparound.
pub fn in_coord_list_pbc(
    fcoord_list: &[Vector3<f64>],
    fcoord: &Vector3<f64>,
    atol: f64,
    pbc: Pbc,
) -> bool {
    fcoord_list.iter().any(|c| frac_match(c, fcoord, atol, pbc))
}

/// Whether every fractional coord in `subset` has a match in `superset`
/// under periodic wraparound.
///
/// `mask`, when present, must have shape `(subset.len(), superset.len())`;
/// a `true` entry at `(i, j)` forbids matching `subset[i]` to `superset[j]`
/// regardless of distance.
pub fn is_coord_subset_pbc(
    subset: &[Vector3<f64>],
    superset: &[Vector3<f64>],
    atol: f64,
    mask: Option<&DMatrix<bool>>,
    pbc: Pbc,
) -> Result<bool, GeomError> {
    check_mask_shape(mask, subset.len(), superset.len())?;
    Ok(subset.iter().enumerate().all(|(i, c1)| {
        superset.iter().enumerate().any(|(j, c2)| {
            let forbidden = mask.map(|m| m[(i, j)]).unwrap_or(false);
            !forbidden && frac_match(c2, c1, atol, pbc)
        })
    }))
}

/// Index mapping from `subset` into `superset` under periodic wraparound:
/// `superset[result[i]]` is the unique wrapped match of `subset[i]`.
///
/// The superset must not contain rows that wrap onto the same subset point.
/// Fails with [`GeomError::NotASubset`] on a missing match and
/// [`GeomError::DuplicateMatches`] on an ambiguous one.
pub fn coord_list_mapping_pbc(
    subset: &[Vector3<f64>],
    superset: &[Vector3<f64>],
    atol: f64,
    pbc: Pbc,
) -> Result<Vec<usize>, GeomError> {
    let mut mapping = Vec::with_capacity(subset.len());
    for (i, coord) in subset.iter().enumerate() {
        let matches = find_in_coord_list_pbc(superset, coord, atol, pbc);
        match matches.as_slice() {
            [] => return Err(GeomError::NotASubset { index: i }),
            [j] => mapping.push(*j),
            _ => return Err(GeomError::DuplicateMatches { index: i }),
        }
    }
    Ok(mapping)
}

fn frac_match(a: &Vector3<f64>, b: &Vector3<f64>, atol: f64, pbc: Pbc) -> bool {
    let diff = pbc_diff(a, b, pbc);
    diff.iter().all(|d| d.abs() <= atol)
}

pub(crate) fn check_mask_shape(
    mask: Option<&DMatrix<bool>>,
    n: usize,
    m: usize,
) -> Result<(), GeomError> {
    if let Some(mask) = mask {
        if mask.nrows() != n || mask.ncols() != m {
            return Err(GeomError::MaskShape {
                expected: (n, m),
                found: (mask.nrows(), mask.ncols()),
            });
        }
    }
    Ok(())
}
