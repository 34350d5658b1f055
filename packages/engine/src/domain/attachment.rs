//! Constraint endpoints bound to a body.

use crate::core::math::{cross, Real, Vec2};

use super::body::{Body, BodyHandle};

/// A constraint's binding point on a body, offset in body-local space.
///
/// Attachments are immutable; re-targeting a constraint means building a new
/// attachment and swapping it in.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Attachment {
    pub body: BodyHandle,
    pub relative_position: Vec2,
}

impl Attachment {
    /// Attachment at the body's center of mass.
    pub fn central(body: BodyHandle) -> Self {
        Self {
            body,
            relative_position: Vec2::ZERO,
        }
    }

    pub fn new(body: BodyHandle, relative_position: Vec2) -> Self {
        Self {
            body,
            relative_position,
        }
    }

    /// Attachment whose global position is currently `point`
    /// (e.g. where a pointer grabbed the body).
    pub fn at_world_point(handle: BodyHandle, body: &Body, point: Vec2) -> Self {
        Self::new(handle, body.world_to_local(point))
    }

    pub fn is_central(&self) -> bool {
        self.relative_position == Vec2::ZERO
    }

    pub fn global_position(&self, body: &Body) -> Vec2 {
        if self.is_central() {
            return body.position;
        }
        body.position + body.basis() * self.relative_position
    }

    pub fn local_direction(&self, body: &Body, direction: Vec2) -> Vec2 {
        body.basis_inverse() * direction
    }

    /// Effective inverse mass seen along a body-local direction.
    ///
    /// `w = m⁻¹ + I⁻¹ (r × d)²`; for central attachments the torque arm is
    /// zero and this is exactly `inverse_mass`.
    pub fn local_generalized_inverse_mass(&self, body: &Body, local_direction: Vec2) -> Real {
        if self.is_central() {
            return body.inverse_mass;
        }
        let arm = cross(self.relative_position, local_direction);
        body.inverse_mass + body.inverse_inertia * arm * arm
    }

    /// Generalized inverse mass along a world direction.
    pub fn generalized_inverse_mass(&self, body: &Body, direction: Vec2) -> Real {
        if self.is_central() {
            return body.inverse_mass;
        }
        let local = self.local_direction(body, direction);
        self.local_generalized_inverse_mass(body, local)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn central_attachment_reduces_to_inverse_mass() {
        let mut body = Body::new().with_inverse_mass(0.25).with_inverse_inertia(40.0);
        body.set_rotation(1.3);
        let attachment = Attachment::central(BodyHandle(0));
        for dir in [Vec2::X, Vec2::Y, Vec2::new(0.6, 0.8)] {
            assert_eq!(attachment.local_generalized_inverse_mass(&body, dir), 0.25);
        }
    }

    #[test]
    fn offset_attachment_adds_torque_arm_term() {
        let body = Body::new().with_inverse_mass(1.0).with_inverse_inertia(2.0);
        let attachment = Attachment::new(BodyHandle(0), Vec2::new(0.5, 0.0));
        // Perpendicular pull: full lever arm.
        assert_relative_eq!(attachment.local_generalized_inverse_mass(&body, Vec2::Y), 1.5);
        // Radial pull: no lever arm.
        assert_relative_eq!(attachment.local_generalized_inverse_mass(&body, Vec2::X), 1.0);
    }

    #[test]
    fn global_position_follows_body_rotation() {
        let mut body = Body::at(1.0, 2.0);
        body.set_rotation(std::f64::consts::FRAC_PI_2);
        let attachment = Attachment::new(BodyHandle(0), Vec2::new(1.0, 0.0));
        let p = attachment.global_position(&body);
        assert_relative_eq!(p.x, 1.0, epsilon = 1e-12);
        assert_relative_eq!(p.y, 3.0, epsilon = 1e-12);
    }

    #[test]
    fn world_point_attachment_round_trips() {
        let mut body = Body::at(-1.0, 0.5);
        body.set_rotation(0.4);
        let grab = Vec2::new(0.2, 0.9);
        let attachment = Attachment::at_world_point(BodyHandle(3), &body, grab);
        let p = attachment.global_position(&body);
        assert_relative_eq!(p.x, grab.x, epsilon = 1e-12);
        assert_relative_eq!(p.y, grab.y, epsilon = 1e-12);
    }
}
