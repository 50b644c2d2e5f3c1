//! Free functions over `nalgebra` vectors with sentinel semantics for degenerate input.

use nalgebra::Vector3;

/// Cartesian displacement in ångströms.
pub type Vector = Vector3<f64>;

/// Below this length a vector is treated as having no direction.
const ZERO_LENGTH: f64 = 1e-12;

/// Squared-length threshold used by [`angle_between`].
const TEENY: f64 = 1e-10;

/// Returns the Euclidean length of `v`.
pub fn vlen(v: &Vector) -> f64 {
    v.norm()
}

/// Scales `v` to unit length.
///
/// Vectors shorter than a tiny epsilon are returned unchanged rather than divided by zero, so
/// a zero vector stays the zero vector and downstream products remain finite.
///
/// # Arguments
///
/// * `v` - Vector to normalize.
///
/// # Returns
///
/// The unit vector along `v`, or `v` itself when it has no usable direction.
pub fn normalize(v: &Vector) -> Vector {
    let length = v.norm();
    if length < ZERO_LENGTH { *v } else { v / length }
}

/// Measures the angle between two vectors in degrees.
///
/// Either vector being (nearly) zero yields `0.0`. The cosine is tested against the closed
/// interval bounds before `acos` is taken, so round-off that pushes it past ±1 produces exactly
/// `0.0` or `180.0` instead of NaN.
///
/// # Arguments
///
/// * `v1` - First direction.
/// * `v2` - Second direction.
///
/// # Returns
///
/// The unsigned angle in degrees within `[0, 180]`.
pub fn angle_between(v1: &Vector, v2: &Vector) -> f64 {
    let l1 = v1.norm_squared();
    let l2 = v2.norm_squared();
    if l1 < TEENY || l2 < TEENY {
        return 0.0;
    }

    let cos = v1.dot(v2) / (l1 * l2).sqrt();
    if cos >= 1.0 {
        0.0
    } else if cos <= -1.0 {
        180.0
    } else {
        cos.acos().to_degrees()
    }
}
