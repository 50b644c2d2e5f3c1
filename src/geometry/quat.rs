//! Rotation state stored as a (possibly drifting) quaternion with a lazily cached matrix.
//!
//! [`Quat`] is the single rotation type used by placement, orientation, and splicing. It is
//! composed in "apply-then-apply" order: `a.then(&b)` rotates by `a` first and `b` second.
//! Incremental composition renormalizes periodically, and the equivalent 3×3 matrix is derived
//! on first use and discarded whenever the components change.

use super::vector::{Vector, normalize};
use nalgebra::{Matrix3, Quaternion, Rotation3, UnitQuaternion};
use std::cell::OnceCell;
use std::f64::consts::PI;
use std::fmt;

/// Incremental compositions allowed before the quaternion is renormalized.
const RENORMALIZE_EVERY: u32 = 50;

/// Cross-product magnitude under which two directions are treated as collinear.
const COLLINEAR: f64 = 1e-6;

/// Rotation in three dimensions.
#[derive(Debug, Clone)]
pub struct Quat {
    q: Quaternion<f64>,
    compositions: u32,
    matrix: OnceCell<Matrix3<f64>>,
}

impl Quat {
    /// The rotation that leaves every vector in place.
    pub fn identity() -> Self {
        Self::from_parts(1.0, Vector::zeros())
    }

    /// Builds a quaternion directly from its scalar and vector parts.
    ///
    /// No normalization is applied; call [`Quat::normalize`] if the inputs are not already
    /// unit length.
    pub fn from_parts(w: f64, v: Vector) -> Self {
        Self {
            q: Quaternion::new(w, v.x, v.y, v.z),
            compositions: 0,
            matrix: OnceCell::new(),
        }
    }

    /// Rotation by `angle` radians about `axis` using the right-hand rule.
    ///
    /// The axis is normalized internally. A zero axis yields the identity because the vector
    /// part collapses to zero.
    ///
    /// # Arguments
    ///
    /// * `axis` - Rotation axis; need not be unit length.
    /// * `angle` - Rotation angle in radians.
    pub fn from_axis_angle(axis: &Vector, angle: f64) -> Self {
        let half = 0.5 * angle;
        Self::from_parts(half.cos(), normalize(axis) * half.sin())
    }

    /// Shortest-arc rotation carrying the direction of `x` onto the direction of `y`.
    ///
    /// Both inputs are normalized first. When the two directions are collinear the cross
    /// product carries no usable axis:
    ///
    /// - antiparallel inputs rotate half a turn about whichever of `x × X` and `x × Y` is
    ///   longer, guaranteeing a well-defined perpendicular axis;
    /// - (nearly) parallel inputs are built straight from the cross product, which stays
    ///   accurate where `acos` loses precision.
    ///
    /// # Arguments
    ///
    /// * `x` - Source direction.
    /// * `y` - Target direction.
    ///
    /// # Returns
    ///
    /// A unit quaternion `q` with `q.rotate(normalize(x)) ≈ normalize(y)`.
    pub fn rotation_between(x: &Vector, y: &Vector) -> Self {
        let x = normalize(x);
        let y = normalize(y);
        let dot = x.dot(&y);
        let v = x.cross(&y);
        let vl = v.norm();

        if vl < COLLINEAR {
            if dot < 0.0 {
                let ax1 = x.cross(&Vector::x());
                let ax2 = x.cross(&Vector::y());
                let axis = if ax1.norm() > ax2.norm() { ax1 } else { ax2 };
                let mut q = Self::from_parts(0.0, axis);
                q.normalize();
                q
            } else {
                let half = 0.5 * vl;
                Self::from_parts((1.0 - half * half).sqrt(), v * 0.5)
            }
        } else {
            let mut theta = dot.clamp(-1.0, 1.0).acos();
            if y.dot(&x.cross(&v)) > 0.0 {
                theta = 2.0 * PI - theta;
            }
            let w = (0.5 * theta).cos();
            let s = (1.0 - w * w).max(0.0).sqrt() / vl;
            Self::from_parts(w, v * s)
        }
    }

    /// Rotation carrying the reference axes X, Y, Z onto the frame `x`, `y`, `z`.
    ///
    /// The inputs are expected to be orthonormal and right-handed. Slightly skewed input is
    /// projected onto the nearest proper rotation.
    pub fn from_frame(x: &Vector, y: &Vector, z: &Vector) -> Self {
        let basis = Matrix3::from_columns(&[*x, *y, *z]);
        let rotation = Rotation3::from_matrix(&basis);
        let unit = UnitQuaternion::from_rotation_matrix(&rotation);
        let q = unit.into_inner();
        Self::from_parts(q.w, q.imag())
    }

    /// Scalar component.
    pub fn w(&self) -> f64 {
        self.q.w
    }

    /// Vector component.
    pub fn vector(&self) -> Vector {
        self.q.imag()
    }

    /// Composes two rotations: the result rotates by `self` first, then by `other`.
    ///
    /// This is the Hamilton product `other ⊗ self`.
    pub fn then(&self, other: &Quat) -> Quat {
        let mut out = self.clone();
        out.then_assign(other);
        out
    }

    /// In-place form of [`Quat::then`].
    ///
    /// Every few dozen compositions the quaternion is renormalized so accumulated round-off
    /// cannot drift it away from a pure rotation.
    pub fn then_assign(&mut self, other: &Quat) {
        self.q = other.q * self.q;
        self.compositions += 1;
        if self.compositions >= RENORMALIZE_EVERY {
            self.normalize();
        } else {
            self.matrix = OnceCell::new();
        }
    }

    /// The inverse rotation for a unit quaternion.
    pub fn conjugate(&self) -> Quat {
        Self::from_parts(self.q.w, -self.q.imag())
    }

    /// Rescales the vector part so the quaternion has unit length while keeping its angle.
    ///
    /// The scalar part is preserved (clamped to `[-1, 1]`). A zero vector part resets the
    /// rotation to the identity.
    pub fn normalize(&mut self) {
        let w = self.q.w.clamp(-1.0, 1.0);
        let v = self.q.imag();
        let length = v.norm();
        self.q = if length > 0.0 {
            let s = (1.0 - w * w).sqrt() / length;
            Quaternion::new(w, v.x * s, v.y * s, v.z * s)
        } else {
            Quaternion::identity()
        };
        self.compositions = 0;
        self.matrix = OnceCell::new();
    }

    /// Rotation angle in radians within `[0, 2π)`.
    pub fn angle(&self) -> f64 {
        let w = self.q.w;
        if -1.0 < w && w < 1.0 {
            2.0 * w.acos()
        } else {
            0.0
        }
    }

    /// Unit rotation axis, or the zero vector for the identity.
    pub fn axis(&self) -> Vector {
        normalize(&self.q.imag())
    }

    /// Equivalent 3×3 rotation matrix, computed once per set of components.
    pub fn matrix(&self) -> &Matrix3<f64> {
        self.matrix.get_or_init(|| {
            let (w, x, y, z) = (self.q.w, self.q.i, self.q.j, self.q.k);
            Matrix3::new(
                1.0 - 2.0 * (y * y + z * z),
                2.0 * (x * y - z * w),
                2.0 * (x * z + y * w),
                2.0 * (x * y + z * w),
                1.0 - 2.0 * (x * x + z * z),
                2.0 * (y * z - x * w),
                2.0 * (x * z - y * w),
                2.0 * (y * z + x * w),
                1.0 - 2.0 * (x * x + y * y),
            )
        })
    }

    /// Applies the rotation to a vector.
    pub fn rotate(&self, v: &Vector) -> Vector {
        self.matrix() * v
    }

    /// Applies the inverse rotation to a vector.
    pub fn unrotate(&self, v: &Vector) -> Vector {
        self.matrix().transpose() * v
    }
}

impl Default for Quat {
    fn default() -> Self {
        Self::identity()
    }
}

impl fmt::Display for Quat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Quat({:.6}, {:.6}, {:.6}, {:.6})",
            self.q.w, self.q.i, self.q.j, self.q.k
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_vec_close(a: &Vector, b: &Vector) {
        assert!((a - b).norm() < 1e-9, "expected {b:?}, got {a:?}");
    }

    fn sample_vectors() -> Vec<Vector> {
        vec![
            Vector::new(1.0, 0.0, 0.0),
            Vector::new(0.0, -2.0, 0.0),
            Vector::new(0.3, 0.4, -1.2),
            Vector::new(-5.0, 2.5, 7.0),
            Vector::new(0.0, 0.0, -1.0),
        ]
    }

    #[test]
    fn identity_leaves_vectors_in_place() {
        let v = Vector::new(1.0, 2.0, 3.0);
        assert_vec_close(&Quat::identity().rotate(&v), &v);
    }

    #[test]
    fn axis_angle_quarter_turn_about_z_maps_x_to_y() {
        let q = Quat::from_axis_angle(&Vector::z(), PI / 2.0);
        assert_vec_close(&q.rotate(&Vector::x()), &Vector::y());
        assert!((q.angle() - PI / 2.0).abs() < 1e-12);
        assert_vec_close(&q.axis(), &Vector::z());
    }

    #[test]
    fn conjugate_round_trip_restores_vector() {
        let q = Quat::from_axis_angle(&Vector::new(1.0, -2.0, 0.5), 1.234);
        let round_trip = q.then(&q.conjugate());
        for v in sample_vectors() {
            assert_vec_close(&round_trip.rotate(&v), &v);
            assert_vec_close(&q.unrotate(&q.rotate(&v)), &v);
        }
    }

    #[test]
    fn then_applies_left_operand_first() {
        let a = Quat::from_axis_angle(&Vector::z(), PI / 2.0);
        let b = Quat::from_axis_angle(&Vector::x(), PI / 2.0);
        let v = Vector::x();

        let expected = b.rotate(&a.rotate(&v));
        assert_vec_close(&a.then(&b).rotate(&v), &expected);

        let reversed = a.rotate(&b.rotate(&v));
        assert!((a.then(&b).rotate(&v) - reversed).norm() > 0.5);
    }

    #[test]
    fn rotation_between_maps_source_onto_target() {
        for x in sample_vectors() {
            for y in sample_vectors() {
                let q = Quat::rotation_between(&x, &y);
                assert_vec_close(&q.rotate(&normalize(&x)), &normalize(&y));
            }
        }
    }

    #[test]
    fn rotation_between_antiparallel_uses_perpendicular_axis() {
        let x = Vector::new(0.0, 0.0, 2.0);
        let q = Quat::rotation_between(&x, &-x);
        assert!(q.axis().dot(&Vector::z()).abs() < 1e-12);
        assert!((q.angle() - PI).abs() < 1e-12);
        assert_vec_close(&q.rotate(&Vector::z()), &-Vector::z());
    }

    #[test]
    fn rotation_between_nearly_parallel_is_small_and_stable() {
        let x = Vector::new(1.0, 0.0, 0.0);
        let y = Vector::new(1.0, 1e-8, 0.0);
        let q = Quat::rotation_between(&x, &y);
        assert!(q.w().is_finite());
        assert!(q.angle() < 1e-6);
        assert_vec_close(&q.rotate(&x), &normalize(&y));
    }

    #[test]
    fn rotation_between_zero_vector_is_identity() {
        let q = Quat::rotation_between(&Vector::x(), &Vector::zeros());
        assert_eq!(q.angle(), 0.0);
    }

    #[test]
    fn from_frame_maps_reference_axes() {
        let x = Vector::new(0.0, 1.0, 0.0);
        let y = Vector::new(-1.0, 0.0, 0.0);
        let z = Vector::new(0.0, 0.0, 1.0);
        let q = Quat::from_frame(&x, &y, &z);
        assert_vec_close(&q.rotate(&Vector::x()), &x);
        assert_vec_close(&q.rotate(&Vector::y()), &y);
        assert_vec_close(&q.rotate(&Vector::z()), &z);
    }

    #[test]
    fn repeated_composition_stays_unit_length() {
        let step = Quat::from_axis_angle(&Vector::new(0.2, 0.9, -0.4), 0.01);
        let mut acc = Quat::identity();
        for _ in 0..(RENORMALIZE_EVERY * 4 + 7) {
            acc.then_assign(&step);
        }
        let norm = (acc.w().powi(2) + acc.vector().norm_squared()).sqrt();
        assert!((norm - 1.0).abs() < 1e-9);
    }

    #[test]
    fn matrix_cache_is_refreshed_after_mutation() {
        let mut q = Quat::from_axis_angle(&Vector::z(), PI / 2.0);
        assert_vec_close(&q.rotate(&Vector::x()), &Vector::y());
        q.then_assign(&Quat::from_axis_angle(&Vector::z(), PI / 2.0));
        assert_vec_close(&q.rotate(&Vector::x()), &-Vector::x());
    }

    #[test]
    fn normalize_preserves_angle_and_handles_zero_vector_part() {
        let mut q = Quat::from_parts(0.5, Vector::new(3.0, 0.0, 0.0));
        q.normalize();
        assert!((q.w() - 0.5).abs() < 1e-12);
        assert!((q.vector().norm() - 0.75f64.sqrt()).abs() < 1e-12);

        let mut degenerate = Quat::from_parts(0.3, Vector::zeros());
        degenerate.normalize();
        assert_eq!(degenerate.w(), 1.0);
    }
}
