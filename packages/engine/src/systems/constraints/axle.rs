use crate::core::math::Real;
use crate::domain::{Body, BodyHandle};

use super::{damping_impulse, delta_lambda};

/// Couples the rotation of two bodies: `θb = gear_ratio · θa + rest_offset`.
///
/// Position-independent; solved in angle space with each body's inverse
/// inertia as its generalized inverse mass.
#[derive(Clone, Debug)]
pub struct AxleConstraint {
    a: BodyHandle,
    b: BodyHandle,
    pub gear_ratio: Real,
    pub rest_offset: Real,
}

impl AxleConstraint {
    pub fn new(a: BodyHandle, b: BodyHandle, gear_ratio: Real) -> Self {
        Self {
            a,
            b,
            gear_ratio,
            rest_offset: 0.0,
        }
    }

    pub fn a(&self) -> BodyHandle {
        self.a
    }

    pub fn b(&self) -> BodyHandle {
        self.b
    }

    /// Current coupling error, if both bodies exist.
    pub fn error(&self, bodies: &[Body]) -> Option<Real> {
        let a = bodies.get(self.a.index())?;
        let b = bodies.get(self.b.index())?;
        Some(b.rotation() - self.gear_ratio * a.rotation() - self.rest_offset)
    }

    /// Keep the current relative orientation instead of forcing it to zero.
    pub fn reset_rest_offset(&mut self, bodies: &[Body]) {
        if let Some(error) = self.error(bodies) {
            self.rest_offset += error;
        }
    }

    fn generalized_inverse_mass(&self, bodies: &[Body]) -> Real {
        let ratio = self.gear_ratio;
        ratio * ratio * bodies[self.a.index()].inverse_inertia + bodies[self.b.index()].inverse_inertia
    }

    pub(super) fn solve(
        &self,
        lambda: &mut Real,
        alpha: Real,
        delta: Real,
        bodies: &mut [Body],
    ) -> Option<Real> {
        let c = self.error(bodies)?;
        let w = self.generalized_inverse_mass(bodies);

        let d_lambda = delta_lambda(c, *lambda, alpha, w)?;
        *lambda += d_lambda;

        bodies[self.a.index()].add_immediate_angular_impulse(-self.gear_ratio * d_lambda, delta);
        bodies[self.b.index()].add_immediate_angular_impulse(d_lambda, delta);
        Some(d_lambda)
    }

    pub(super) fn damp(&self, factor: Real, bodies: &mut [Body]) {
        let (Some(a), Some(b)) = (bodies.get(self.a.index()), bodies.get(self.b.index())) else {
            return;
        };
        let relative = b.angular_velocity - self.gear_ratio * a.angular_velocity;
        let w = self.generalized_inverse_mass(bodies);
        if let Some(j) = damping_impulse(relative, factor, w) {
            bodies[self.a.index()].add_angular_velocity_impulse(-self.gear_ratio * j);
            bodies[self.b.index()].add_angular_velocity_impulse(j);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn rigid_gear_couples_arbitrary_rotations() {
        for (ra, rb, ratio) in [(0.3, -1.2, 2.0), (2.5, 0.0, -0.5), (-4.0, 7.0, 3.0)] {
            let mut bodies = vec![Body::new().with_inverse_inertia(0.1), Body::new()];
            bodies[0].set_rotation(ra);
            bodies[1].set_rotation(rb);
            let axle = AxleConstraint::new(BodyHandle(0), BodyHandle(1), ratio);
            let mut lambda = 0.0;
            axle.solve(&mut lambda, 0.0, 0.01, &mut bodies).unwrap();
            assert_relative_eq!(
                bodies[1].rotation(),
                ratio * bodies[0].rotation(),
                epsilon = 1e-9
            );
        }
    }

    #[test]
    fn rest_offset_preserves_initial_phase() {
        let mut bodies = vec![Body::new(), Body::new()];
        bodies[1].set_rotation(0.5);
        let mut axle = AxleConstraint::new(BodyHandle(0), BodyHandle(1), 1.0);
        axle.reset_rest_offset(&bodies);
        let mut lambda = 0.0;
        axle.solve(&mut lambda, 0.0, 0.01, &mut bodies).unwrap();
        assert_relative_eq!(bodies[1].rotation(), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn both_unrotatable_is_skipped() {
        let mut bodies = vec![Body::fixed(), Body::fixed()];
        bodies[1].set_rotation(1.0);
        let axle = AxleConstraint::new(BodyHandle(0), BodyHandle(1), 1.0);
        let mut lambda = 0.0;
        assert!(axle.solve(&mut lambda, 0.0, 0.01, &mut bodies).is_none());
    }

    #[test]
    fn damping_matches_angular_velocities() {
        let mut bodies = vec![Body::new(), Body::new()];
        bodies[0].angular_velocity = 1.0;
        bodies[1].angular_velocity = -1.0;
        let axle = AxleConstraint::new(BodyHandle(0), BodyHandle(1), 1.0);
        axle.damp(1.0, &mut bodies);
        assert_relative_eq!(bodies[0].angular_velocity, bodies[1].angular_velocity, epsilon = 1e-12);
    }
}
