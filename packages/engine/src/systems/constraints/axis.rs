use crate::core::math::{direction_and_length, Real, Vec2};
use crate::domain::{Attachment, Body};

use super::{damping_impulse, delta_lambda};

/// Keeps an attachment on the line through `origin` along `axis`
/// (a prismatic guide, e.g. piston walls).
#[derive(Clone, Debug)]
pub struct AxisConstraint {
    attachment: Attachment,
    pub origin: Vec2,
    axis: Vec2,
}

impl AxisConstraint {
    pub fn new(attachment: Attachment, origin: Vec2, axis: Vec2) -> Self {
        Self {
            attachment,
            origin,
            axis: axis.normalize_or_zero(),
        }
    }

    pub fn attachment(&self) -> Attachment {
        self.attachment
    }

    pub(crate) fn set_attachment(&mut self, attachment: Attachment) {
        self.attachment = attachment;
    }

    /// Unit direction of the guide line.
    pub fn axis(&self) -> Vec2 {
        self.axis
    }

    pub fn set_axis(&mut self, axis: Vec2) {
        self.axis = axis.normalize_or_zero();
    }

    pub fn attachment_position(&self, bodies: &[Body]) -> Option<Vec2> {
        let body = bodies.get(self.attachment.body.index())?;
        Some(self.attachment.global_position(body))
    }

    /// Offset of the attachment from the guide line, perpendicular to it.
    fn off_axis(&self, p: Vec2) -> Vec2 {
        let offset = p - self.origin;
        offset - self.axis * offset.dot(self.axis)
    }

    pub(super) fn solve(
        &self,
        lambda: &mut Real,
        alpha: Real,
        delta: Real,
        bodies: &mut [Body],
    ) -> Option<Vec2> {
        let p = self.attachment_position(bodies)?;
        let (n, c) = direction_and_length(self.off_axis(p))?;

        let body = &bodies[self.attachment.body.index()];
        let w = self.attachment.generalized_inverse_mass(body, n);

        let d_lambda = delta_lambda(c, *lambda, alpha, w)?;
        *lambda += d_lambda;

        let impulse = n * d_lambda;
        bodies[self.attachment.body.index()].add_immediate_impulse_at(impulse, p, delta);
        Some(impulse)
    }

    pub(super) fn damp(&self, factor: Real, bodies: &mut [Body]) {
        let Some(p) = self.attachment_position(bodies) else {
            return;
        };
        let normal = self.axis.perp();
        if normal == Vec2::ZERO {
            return;
        }
        let body = &bodies[self.attachment.body.index()];
        let drift = body.point_velocity(p).dot(normal);
        let w = self.attachment.generalized_inverse_mass(body, normal);
        if let Some(j) = damping_impulse(drift, factor, w) {
            bodies[self.attachment.body.index()].add_velocity_impulse_at(normal * j, p);
        }
    }
}
