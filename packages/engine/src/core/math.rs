//! Vector and rotation glue over `glam`'s double precision types.
//!
//! The solver only needs a handful of 2D operations on top of glam:
//! the scalar cross product and a checked normalization that reports the
//! original length (constraints need both).

/// Scalar type used throughout the solver.
pub type Real = f64;

/// 2D vector (x, y).
pub type Vec2 = glam::DVec2;

/// 2x2 rotation / basis matrix.
pub type Mat2 = glam::DMat2;

/// 2D cross product (z component of the 3D cross product).
#[inline]
pub fn cross(a: Vec2, b: Vec2) -> Real {
    a.perp_dot(b)
}

/// Rotation basis for an angle in radians.
#[inline]
pub fn rotation_basis(angle: Real) -> Mat2 {
    Mat2::from_angle(angle)
}

/// Splits `v` into its unit direction and length.
///
/// Returns `None` for zero-length (or non-finite) vectors, which have no
/// stable direction.
#[inline]
pub fn direction_and_length(v: Vec2) -> Option<(Vec2, Real)> {
    let len = v.length();
    if len > 0.0 && len.is_finite() {
        Some((v / len, len))
    } else {
        None
    }
}
