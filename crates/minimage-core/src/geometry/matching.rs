use nalgebra::Vector3;

use crate::core::error::GeomError;

/// Indices of all points in `coord_list` whose every component differs from
/// `coord` by at most `atol`, so an exact duplicate is found even at zero
/// tolerance.
///
/// Empty result when nothing matches. Comparison is componentwise absolute,
/// not Euclidean.
pub fn find_in_coord_list(
    coord_list: &[Vector3<f64>],
    coord: &Vector3<f64>,
    atol: f64,
) -> Vec<usize> {
    coord_list
        .iter()
        .enumerate()
        .filter(|(_, c)| {
            let diff = *c - coord;
            diff.iter().all(|d| d.abs() <= atol)
        })
        .map(|(i, _)| i)
        .collect()
}

/// Whether `coord` appears in `coord_list` within `atol`.
pub fn in_coord_list(coord_list: &[Vector3<f64>], coord: &Vector3<f64>, atol: f64) -> bool {
    coord_list.iter().any(|c| {
        let diff = c - coord;
        diff.iter().all(|d| d.abs() <= atol)
    })
}

/// Whether every point of `subset` has at least one componentwise match in
/// `superset`. No periodic wraparound is applied.
pub fn is_coord_subset(subset: &[Vector3<f64>], superset: &[Vector3<f64>], atol: f64) -> bool {
    subset.iter().all(|c| in_coord_list(superset, c, atol))
}

/// Index mapping from `subset` into `superset`: `result[i]` is the position
/// of `subset[i]`'s unique match, so `superset[result[i]] ~= subset[i]`.
///
/// Both lists must be free of duplicate rows. A subset point with no match
/// fails with [`GeomError::NotASubset`]; a point matching several superset
/// rows fails with [`GeomError::DuplicateMatches`].
pub fn coord_list_mapping(
    subset: &[Vector3<f64>],
    superset: &[Vector3<f64>],
    atol: f64,
) -> Result<Vec<usize>, GeomError> {
    let mut mapping = Vec::with_capacity(subset.len());
    for (i, coord) in subset.iter().enumerate() {
        let matches = find_in_coord_list(superset, coord, atol);
        match matches.as_slice() {
            [] => return Err(GeomError::NotASubset { index: i }),
            [j] => mapping.push(*j),
            _ => return Err(GeomError::DuplicateMatches { index: i }),
        }
    }
    Ok(mapping)
}

/// Pairwise Euclidean distances between two Cartesian coordinate lists.
///
/// `result[i][j]` is the distance from `coords1[i]` to `coords2[j]`.
pub fn all_distances(coords1: &[Vector3<f64>], coords2: &[Vector3<f64>]) -> Vec<Vec<f64>> {
    coords1
        .iter()
        .map(|c1| coords2.iter().map(|c2| (c1 - c2).norm()).collect())
        .collect()
}
