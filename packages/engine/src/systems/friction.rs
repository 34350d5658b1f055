//! Ground friction for bodies that roll on a synthetic ground line.
//!
//! Not part of the generic constraint set: each frictional body resolves its
//! own contact after the constraint solve, with the same Lagrange update as
//! the constraints but a clamped multiplier (Coulomb limit).

use crate::core::math::{cross, Real, Vec2};
use crate::domain::Body;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Friction {
    Wheel(WheelFriction),
}

impl Friction {
    pub fn wheel(radius: Real, coefficient: Real, normal_force: Real) -> Self {
        Friction::Wheel(WheelFriction {
            radius,
            coefficient,
            normal_force,
            ground_normal: Vec2::Y,
        })
    }

    pub fn apply(&self, body: &mut Body, delta: Real) {
        match self {
            Friction::Wheel(wheel) => wheel.apply(body, delta),
        }
    }
}

/// A wheel of `radius` touching a ground whose normal is `ground_normal`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WheelFriction {
    pub radius: Real,
    pub coefficient: Real,
    /// Normal force pressing the wheel onto the ground
    pub normal_force: Real,
    pub ground_normal: Vec2,
}

impl WheelFriction {
    /// World position of the contact point.
    pub fn contact_point(&self, body: &Body) -> Vec2 {
        body.position - self.ground_normal.normalize_or_zero() * self.radius
    }

    /// Cancel the contact's slip along the ground, bounded by
    /// `coefficient * normal_force`.
    pub fn apply(&self, body: &mut Body, delta: Real) {
        let normal = self.ground_normal.normalize_or_zero();
        if normal == Vec2::ZERO {
            return;
        }
        let tangent = normal.perp();
        let contact = body.position - normal * self.radius;

        let slip = body.point_velocity(contact).dot(tangent) * delta;
        let arm = cross(contact - body.position, tangent);
        let w = body.inverse_mass + body.inverse_inertia * arm * arm;
        if w <= 0.0 {
            return;
        }

        let limit = (self.coefficient * self.normal_force).abs() * delta * delta;
        let d_lambda = (-slip / w).clamp(-limit, limit);
        if d_lambda == 0.0 {
            return;
        }
        body.add_immediate_impulse_at(tangent * d_lambda, contact, delta);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sliding_wheel(coefficient: Real, normal_force: Real) -> Body {
        let mut body = Body::new()
            .with_inverse_inertia(0.0)
            .with_friction(Friction::wheel(0.5, coefficient, normal_force));
        body.velocity = Vec2::new(1.0, 0.0);
        body
    }

    #[test]
    fn strong_friction_stops_sliding() {
        let mut body = sliding_wheel(1.0, 1000.0);
        body.apply_friction(0.01);
        assert_relative_eq!(body.velocity.x, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn weak_friction_is_clamped_to_coulomb_limit() {
        let mut body = sliding_wheel(0.5, 4.0);
        body.apply_friction(0.01);
        // Velocity change = μ N Δt / m
        assert_relative_eq!(body.velocity.x, 1.0 - 0.5 * 4.0 * 0.01, epsilon = 1e-12);
    }

    #[test]
    fn rolling_without_slip_is_untouched() {
        let mut body = Body::new().with_friction(Friction::wheel(0.5, 1.0, 10.0));
        body.velocity = Vec2::new(1.0, 0.0);
        // Contact at (0, -0.5): ω × r = (0.5 ω, 0) must cancel v.
        body.angular_velocity = -2.0;
        body.apply_friction(0.01);
        assert_relative_eq!(body.velocity.x, 1.0, epsilon = 1e-12);
        assert_relative_eq!(body.angular_velocity, -2.0, epsilon = 1e-12);
    }

    #[test]
    fn sliding_wheel_starts_to_spin() {
        let mut body = Body::new().with_friction(Friction::wheel(0.5, 1.0, 1000.0));
        body.velocity = Vec2::new(1.0, 0.0);
        body.apply_friction(0.01);
        assert!(body.velocity.x < 1.0);
        assert!(body.angular_velocity < 0.0);
    }
}
