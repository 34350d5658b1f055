use crate::core::math::{direction_and_length, Real, Vec2};
use crate::domain::{Attachment, Body};

use super::{damping_impulse, delta_lambda};

/// Pulls an attachment onto a world point.
///
/// A zero-length distance constraint whose second endpoint is not a body.
/// `origin` can be moved between updates (e.g. to follow a pointer).
#[derive(Clone, Debug)]
pub struct PinConstraint {
    attachment: Attachment,
    pub origin: Vec2,
}

impl PinConstraint {
    pub fn new(attachment: Attachment, origin: Vec2) -> Self {
        Self { attachment, origin }
    }

    pub fn attachment(&self) -> Attachment {
        self.attachment
    }

    pub(crate) fn set_attachment(&mut self, attachment: Attachment) {
        self.attachment = attachment;
    }

    pub fn set_origin(&mut self, x: Real, y: Real) {
        self.origin = Vec2::new(x, y);
    }

    pub fn attachment_position(&self, bodies: &[Body]) -> Option<Vec2> {
        let body = bodies.get(self.attachment.body.index())?;
        Some(self.attachment.global_position(body))
    }

    pub(super) fn solve(
        &self,
        lambda: &mut Real,
        alpha: Real,
        delta: Real,
        bodies: &mut [Body],
    ) -> Option<Vec2> {
        let p = self.attachment_position(bodies)?;
        let (n, distance) = direction_and_length(self.origin - p)?;

        let body = &bodies[self.attachment.body.index()];
        let w = self.attachment.generalized_inverse_mass(body, n);

        let d_lambda = delta_lambda(distance, *lambda, alpha, w)?;
        *lambda += d_lambda;

        let impulse = n * d_lambda;
        bodies[self.attachment.body.index()].add_immediate_impulse_at(-impulse, p, delta);
        Some(-impulse)
    }

    pub(super) fn damp(&self, factor: Real, bodies: &mut [Body]) {
        let Some(p) = self.attachment_position(bodies) else {
            return;
        };
        let Some((n, _)) = direction_and_length(self.origin - p) else {
            return;
        };
        let body = &bodies[self.attachment.body.index()];
        let approach = body.point_velocity(p).dot(n);
        let w = self.attachment.generalized_inverse_mass(body, n);
        if let Some(j) = damping_impulse(approach, factor, w) {
            bodies[self.attachment.body.index()].add_velocity_impulse_at(n * j, p);
        }
    }
}
