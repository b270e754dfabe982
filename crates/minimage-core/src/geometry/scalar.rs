use nalgebra::Vector3;
use std::cmp::Ordering;
use std::str::FromStr;

use crate::core::error::GeomError;

/// Unit of the angle returned by [`get_angle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AngleUnit {
    #[default]
    Degrees,
    Radians,
}

impl FromStr for AngleUnit {
    type Err = GeomError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "degrees" => Ok(Self::Degrees),
            "radians" => Ok(Self::Radians),
            other => Err(GeomError::InvalidAngleUnit(other.to_string())),
        }
    }
}

/// Angle between two vectors.
///
/// The normalized dot product is clamped to `[-1, 1]` before the arccos so
/// floating-point overshoot on nearly parallel vectors cannot produce NaN.
pub fn get_angle(v1: &Vector3<f64>, v2: &Vector3<f64>, unit: AngleUnit) -> f64 {
    let d = (v1.dot(v2) / (v1.norm() * v2.norm())).clamp(-1.0, 1.0);
    let angle = d.acos();
    match unit {
        AngleUnit::Degrees => angle.to_degrees(),
        AngleUnit::Radians => angle,
    }
}

/// Linearly interpolates `y(x)` from sampled `(x, y)` pairs.
///
/// The pairs are sorted by x, the bracketing interval is located, and the
/// value is interpolated linearly within it. `x` outside
/// `[min(x_values), max(x_values)]` fails with [`GeomError::OutOfRange`];
/// querying exactly at the maximum returns its y value.
pub fn get_linear_interpolated_value(
    x_values: &[f64],
    y_values: &[f64],
    x: f64,
) -> Result<f64, GeomError> {
    if x_values.len() != y_values.len() {
        return Err(GeomError::LengthMismatch {
            left: x_values.len(),
            right: y_values.len(),
        });
    }
    let mut pairs: Vec<(f64, f64)> = x_values
        .iter()
        .copied()
        .zip(y_values.iter().copied())
        .collect();
    if pairs.is_empty() {
        return Err(GeomError::OutOfRange {
            x,
            min: f64::NAN,
            max: f64::NAN,
        });
    }
    pairs.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));

    let min = pairs[0].0;
    let max = pairs[pairs.len() - 1].0;
    if x < min || x > max {
        return Err(GeomError::OutOfRange { x, min, max });
    }

    match pairs.iter().position(|p| p.0 > x) {
        Some(idx) => {
            let (x1, y1) = pairs[idx - 1];
            let (x2, y2) = pairs[idx];
            Ok(y1 + (y2 - y1) / (x2 - x1) * (x - x1))
        }
        // No sample greater than x, so x is exactly the maximum.
        None => Ok(pairs[pairs.len() - 1].1),
    }
}
