use crate::core::math::{direction_and_length, Real, Vec2};
use crate::domain::{Attachment, Body};

use super::{damping_impulse, delta_lambda};

/// Keeps two attachment points `rest_distance` apart.
#[derive(Clone, Debug)]
pub struct DistanceConstraint {
    from: Attachment,
    to: Attachment,
    pub rest_distance: Real,
}

impl DistanceConstraint {
    pub fn new(from: Attachment, to: Attachment, rest_distance: Real) -> Self {
        Self {
            from,
            to,
            rest_distance: rest_distance.max(0.0),
        }
    }

    pub fn from(&self) -> Attachment {
        self.from
    }

    pub fn to(&self) -> Attachment {
        self.to
    }

    pub(crate) fn set_from(&mut self, from: Attachment) {
        self.from = from;
    }

    pub(crate) fn set_to(&mut self, to: Attachment) {
        self.to = to;
    }

    /// World positions of both endpoints, if both bodies exist.
    pub fn endpoints(&self, bodies: &[Body]) -> Option<(Vec2, Vec2)> {
        let a = bodies.get(self.from.body.index())?;
        let b = bodies.get(self.to.body.index())?;
        Some((self.from.global_position(a), self.to.global_position(b)))
    }

    /// Current distance between the endpoints.
    pub fn current_distance(&self, bodies: &[Body]) -> Option<Real> {
        self.endpoints(bodies).map(|(a, b)| a.distance(b))
    }

    /// Make the current configuration the rest configuration.
    pub fn reset_rest_distance(&mut self, bodies: &[Body]) {
        if let Some(distance) = self.current_distance(bodies) {
            self.rest_distance = distance;
        }
    }

    /// Returns the impulse applied at `to`; `from` received its negation.
    pub(super) fn solve(
        &self,
        lambda: &mut Real,
        alpha: Real,
        delta: Real,
        bodies: &mut [Body],
    ) -> Option<Vec2> {
        let (pa, pb) = self.endpoints(bodies)?;
        let (n, distance) = direction_and_length(pb - pa)?;

        let w1 = self.from.generalized_inverse_mass(&bodies[self.from.body.index()], n);
        let w2 = self.to.generalized_inverse_mass(&bodies[self.to.body.index()], n);

        let c = distance - self.rest_distance;
        let d_lambda = delta_lambda(c, *lambda, alpha, w1 + w2)?;
        *lambda += d_lambda;

        let impulse = n * d_lambda;
        bodies[self.from.body.index()].add_immediate_impulse_at(-impulse, pa, delta);
        bodies[self.to.body.index()].add_immediate_impulse_at(impulse, pb, delta);
        Some(impulse)
    }

    pub(super) fn damp(&self, factor: Real, bodies: &mut [Body]) {
        let Some((pa, pb)) = self.endpoints(bodies) else {
            return;
        };
        let Some((n, _)) = direction_and_length(pb - pa) else {
            return;
        };
        let a = &bodies[self.from.body.index()];
        let b = &bodies[self.to.body.index()];

        let relative = (b.point_velocity(pb) - a.point_velocity(pa)).dot(n);
        let w = self.from.generalized_inverse_mass(a, n) + self.to.generalized_inverse_mass(b, n);
        let Some(j) = damping_impulse(relative, factor, w) else {
            return;
        };

        bodies[self.from.body.index()].add_velocity_impulse_at(-n * j, pa);
        bodies[self.to.body.index()].add_velocity_impulse_at(n * j, pb);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::BodyHandle;
    use approx::assert_relative_eq;

    fn pair(a: Body, b: Body) -> Vec<Body> {
        vec![a, b]
    }

    fn link(rest: Real) -> DistanceConstraint {
        DistanceConstraint::new(
            Attachment::central(BodyHandle(0)),
            Attachment::central(BodyHandle(1)),
            rest,
        )
    }

    #[test]
    fn impulses_are_equal_and_opposite() {
        // Unequal masses: mass-weighted displacements must cancel.
        let mut bodies = pair(
            Body::at(0.0, 0.0).with_inverse_mass(1.0),
            Body::at(2.0, 1.0).with_inverse_mass(0.25),
        );
        let c = link(1.0);
        let mut lambda = 0.0;
        let impulse = c.solve(&mut lambda, 0.0, 0.01, &mut bodies).unwrap();

        let da = bodies[0].position - Vec2::new(0.0, 0.0);
        let db = bodies[1].position - Vec2::new(2.0, 1.0);
        let momentum = da / 1.0 + db / 0.25;
        assert_relative_eq!(momentum.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(momentum.y, 0.0, epsilon = 1e-12);
        assert_relative_eq!(db.x, impulse.x * 0.25, epsilon = 1e-12);
        assert_relative_eq!(da.x, -impulse.x, epsilon = 1e-12);
    }

    #[test]
    fn rigid_link_converges_within_bound() {
        let d0: Real = 3.0;
        let rest = 1.0;
        for passes in 1..=5 {
            let mut bodies = pair(Body::at(0.0, 0.0), Body::at(d0, 0.0));
            let c = link(rest);
            let mut lambda = 0.0;
            let mut previous_error = (d0 - rest).abs();
            for _ in 0..passes {
                c.solve(&mut lambda, 0.0, 0.01, &mut bodies);
                let error = (c.current_distance(&bodies).unwrap() - rest).abs();
                assert!(error <= previous_error + 1e-12);
                previous_error = error;
            }
            assert!(previous_error <= d0 / (passes as Real + 1.0));
        }
    }

    #[test]
    fn coincident_endpoints_are_skipped() {
        let mut bodies = pair(Body::at(1.0, 1.0), Body::at(1.0, 1.0));
        let c = link(1.0);
        let mut lambda = 0.0;
        assert!(c.solve(&mut lambda, 0.0, 0.01, &mut bodies).is_none());
        assert_eq!(lambda, 0.0);
    }

    #[test]
    fn two_fixed_bodies_do_not_produce_nan() {
        let mut bodies = pair(Body::fixed(), Body::fixed());
        bodies[1].translate_to(3.0, 0.0);
        let c = link(1.0);
        let mut lambda = 0.0;
        assert!(c.solve(&mut lambda, 0.0, 0.01, &mut bodies).is_none());
        assert_eq!(bodies[1].position, Vec2::new(3.0, 0.0));
    }

    #[test]
    fn compliant_link_only_partially_corrects() {
        let mut bodies = pair(Body::at(0.0, 0.0), Body::at(3.0, 0.0));
        let c = link(1.0);
        let mut lambda = 0.0;
        let delta: Real = 0.1;
        let alpha = 0.02 / (delta * delta);
        c.solve(&mut lambda, alpha, delta, &mut bodies);
        let distance = c.current_distance(&bodies).unwrap();
        assert!(distance > 1.0 && distance < 3.0);
    }

    #[test]
    fn reset_rest_distance_uses_current_layout() {
        let bodies = pair(Body::at(0.0, 0.0), Body::at(0.0, 2.5));
        let mut c = link(0.0);
        c.reset_rest_distance(&bodies);
        assert_relative_eq!(c.rest_distance, 2.5);
    }

    #[test]
    fn damping_removes_separating_velocity() {
        let mut bodies = pair(Body::at(0.0, 0.0), Body::at(1.0, 0.0));
        bodies[0].velocity = Vec2::new(-1.0, 0.0);
        bodies[1].velocity = Vec2::new(1.0, 0.0);
        link(1.0).damp(0.5, &mut bodies);
        let relative = bodies[1].velocity.x - bodies[0].velocity.x;
        assert_relative_eq!(relative, 1.0, epsilon = 1e-12);
    }
}
