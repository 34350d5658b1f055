use std::cell::Cell;
use std::fmt;

use crate::core::math::{cross, rotation_basis, Mat2, Real, Vec2};
use crate::systems::friction::Friction;

/// Index of a body inside its scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyHandle(pub(crate) u32);

impl BodyHandle {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for BodyHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Rigid Body - mass, inertia and kinematic state
#[derive(Clone, Debug)]
pub struct Body {
    // === Physics State ===
    /// World position (center of mass)
    pub position: Vec2,
    /// Linear velocity (units per second)
    pub velocity: Vec2,
    /// Angular velocity (radians per second)
    pub angular_velocity: Real,
    /// 1 / mass, zero for bodies that cannot translate
    pub inverse_mass: Real,
    /// 1 / moment of inertia, zero for bodies that cannot rotate
    pub inverse_inertia: Real,
    /// Rotation angle (radians), private so the basis cache stays coherent
    rotation: Real,

    // === Cached basis ===
    basis: Cell<Option<Mat2>>,
    basis_inverse: Cell<Option<Mat2>>,

    // === Substep start snapshot ===
    pub(crate) previous_position: Vec2,
    pub(crate) previous_rotation: Real,

    // === Material ===
    /// Ground friction model, if any
    pub friction: Option<Friction>,
}

impl Body {
    /// Body at the origin with unit inverse mass and inertia.
    pub fn new() -> Self {
        Self {
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            angular_velocity: 0.0,
            inverse_mass: 1.0,
            inverse_inertia: 1.0,
            rotation: 0.0,
            basis: Cell::new(None),
            basis_inverse: Cell::new(None),
            previous_position: Vec2::ZERO,
            previous_rotation: 0.0,
            friction: None,
        }
    }

    /// Immovable, un-rotatable anchor body.
    pub fn fixed() -> Self {
        Self {
            inverse_mass: 0.0,
            inverse_inertia: 0.0,
            ..Self::new()
        }
    }

    pub fn at(x: Real, y: Real) -> Self {
        let mut body = Self::new();
        body.translate_to(x, y);
        body
    }

    pub fn with_inverse_mass(mut self, inverse_mass: Real) -> Self {
        self.inverse_mass = inverse_mass;
        self
    }

    pub fn with_inverse_inertia(mut self, inverse_inertia: Real) -> Self {
        self.inverse_inertia = inverse_inertia;
        self
    }

    pub fn with_friction(mut self, friction: Friction) -> Self {
        self.friction = Some(friction);
        self
    }

    /// Mass (infinite for fixed bodies)
    pub fn mass(&self) -> Real {
        1.0 / self.inverse_mass
    }

    pub fn set_mass(&mut self, mass: Real) {
        self.inverse_mass = 1.0 / mass;
    }

    /// Moment of inertia (infinite for bodies with zero inverse inertia)
    pub fn inertia(&self) -> Real {
        1.0 / self.inverse_inertia
    }

    pub fn set_inertia(&mut self, inertia: Real) {
        self.inverse_inertia = 1.0 / inertia;
    }

    pub fn rotation(&self) -> Real {
        self.rotation
    }

    /// Teleport to an absolute angle. The substep snapshot moves along, so
    /// the jump never shows up as angular velocity.
    pub fn set_rotation(&mut self, rotation: Real) {
        self.previous_rotation += rotation - self.rotation;
        self.write_rotation(rotation);
    }

    /// Rotate by `angle`; counts as motion for derived velocities.
    pub fn rotate(&mut self, angle: Real) {
        self.write_rotation(self.rotation + angle);
    }

    pub fn translate(&mut self, x: Real, y: Real) {
        self.position += Vec2::new(x, y);
    }

    /// Teleport to (x, y). The substep snapshot is shifted by the same
    /// displacement, so velocity is kept under both velocity strategies.
    pub fn translate_to(&mut self, x: Real, y: Real) {
        let target = Vec2::new(x, y);
        self.previous_position += target - self.position;
        self.position = target;
    }

    /// Local-to-world rotation matrix for the current rotation.
    pub fn basis(&self) -> Mat2 {
        match self.basis.get() {
            Some(basis) => basis,
            None => {
                let basis = rotation_basis(self.rotation);
                self.basis.set(Some(basis));
                basis
            }
        }
    }

    /// World-to-local rotation matrix for the current rotation.
    pub fn basis_inverse(&self) -> Mat2 {
        match self.basis_inverse.get() {
            Some(inverse) => inverse,
            None => {
                let inverse = self.basis().inverse();
                self.basis_inverse.set(Some(inverse));
                inverse
            }
        }
    }

    /// Transform a body-local offset to world coordinates.
    #[inline]
    pub fn local_to_world(&self, local: Vec2) -> Vec2 {
        self.position + self.basis() * local
    }

    /// Transform a world point to a body-local offset.
    #[inline]
    pub fn world_to_local(&self, world: Vec2) -> Vec2 {
        self.basis_inverse() * (world - self.position)
    }

    /// Velocity of a world point rigidly attached to this body.
    #[inline]
    pub fn point_velocity(&self, point: Vec2) -> Vec2 {
        let r = point - self.position;
        self.velocity + r.perp() * self.angular_velocity
    }

    /// Save current position/rotation as the substep start state.
    pub fn save_prev_state(&mut self) {
        self.previous_position = self.position;
        self.previous_rotation = self.rotation;
    }

    /// Predict phase: advance position and rotation by the current velocities.
    pub fn apply_motion(&mut self, delta: Real) {
        self.position += self.velocity * delta;
        if self.angular_velocity != 0.0 {
            self.rotate(self.angular_velocity * delta);
        }
    }

    /// Apply a continuous force at the center of mass for one substep.
    ///
    /// Both velocity and the already predicted position are advanced, so the
    /// force takes effect before constraints are solved.
    pub fn add_immediate_force(&mut self, force: Vec2, delta: Real) {
        let acceleration = force * self.inverse_mass;
        self.velocity += acceleration * delta;
        self.position += acceleration * delta * delta;
    }

    /// Angular counterpart of [`Body::add_immediate_force`].
    pub fn add_immediate_torque(&mut self, torque: Real, delta: Real) {
        let acceleration = torque * self.inverse_inertia;
        self.angular_velocity += acceleration * delta;
        self.rotate(acceleration * delta * delta);
    }

    /// Apply a positional impulse at a world point.
    ///
    /// Position and rotation move by the mass-weighted impulse; velocities
    /// move by the same delta over `delta`. Positional constraints move
    /// bodies only through this routine.
    pub fn add_immediate_impulse_at(&mut self, impulse: Vec2, point: Vec2, delta: Real) {
        let r = point - self.position;

        let dx = impulse * self.inverse_mass;
        self.position += dx;
        self.velocity += dx / delta;

        let angular = self.inverse_inertia * cross(r, impulse);
        if angular != 0.0 {
            self.rotate(angular);
            self.angular_velocity += angular / delta;
        }
    }

    /// Apply a positional impulse at the center of mass.
    pub fn add_immediate_central_impulse(&mut self, impulse: Vec2, delta: Real) {
        let dx = impulse * self.inverse_mass;
        self.position += dx;
        self.velocity += dx / delta;
    }

    /// Apply an angle-space impulse (used by angular couplings).
    pub fn add_immediate_angular_impulse(&mut self, impulse: Real, delta: Real) {
        let angular = impulse * self.inverse_inertia;
        if angular != 0.0 {
            self.rotate(angular);
            self.angular_velocity += angular / delta;
        }
    }

    /// Velocity-only impulse at a world point (no positional change).
    pub fn add_velocity_impulse_at(&mut self, impulse: Vec2, point: Vec2) {
        let r = point - self.position;
        self.velocity += impulse * self.inverse_mass;
        self.angular_velocity += self.inverse_inertia * cross(r, impulse);
    }

    /// Velocity-only angular impulse.
    pub fn add_angular_velocity_impulse(&mut self, impulse: Real) {
        self.angular_velocity += impulse * self.inverse_inertia;
    }

    /// Derive velocities from the movement since [`Body::save_prev_state`].
    pub fn recalculate_velocity(&mut self, delta: Real) {
        self.velocity = (self.position - self.previous_position) / delta;
        self.angular_velocity = (self.rotation - self.previous_rotation) / delta;
    }

    /// Resolve ground friction, if this body has a friction model.
    pub fn apply_friction(&mut self, delta: Real) {
        if let Some(friction) = self.friction {
            friction.apply(self, delta);
        }
    }

    fn write_rotation(&mut self, rotation: Real) {
        self.rotation = rotation;
        self.mark_basis_dirty();
    }

    fn mark_basis_dirty(&mut self) {
        self.basis.set(None);
        self.basis_inverse.set(None);
    }
}

impl Default for Body {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn basis_follows_rotation_after_mutation() {
        let mut body = Body::new();
        assert_relative_eq!(body.basis().x_axis.x, 1.0);

        body.set_rotation(std::f64::consts::FRAC_PI_2);
        let x_axis = body.basis() * Vec2::X;
        assert_relative_eq!(x_axis.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(x_axis.y, 1.0, epsilon = 1e-12);

        body.rotate(std::f64::consts::FRAC_PI_2);
        let back = body.basis_inverse() * (body.basis() * Vec2::new(0.3, 0.4));
        assert_relative_eq!(back.x, 0.3, epsilon = 1e-12);
        assert_relative_eq!(back.y, 0.4, epsilon = 1e-12);
        let x_axis = body.basis() * Vec2::X;
        assert_relative_eq!(x_axis.x, -1.0, epsilon = 1e-12);
    }

    #[test]
    fn immediate_force_advances_velocity_and_position() {
        let mut body = Body::new().with_inverse_mass(0.5);
        body.add_immediate_force(Vec2::new(0.0, -10.0), 0.1);
        assert_relative_eq!(body.velocity.y, -0.5);
        assert_relative_eq!(body.position.y, -0.05);
    }

    #[test]
    fn off_center_impulse_spins_the_body() {
        let mut body = Body::new();
        body.add_immediate_impulse_at(Vec2::new(0.0, 1.0), Vec2::new(1.0, 0.0), 0.5);
        assert_relative_eq!(body.position.y, 1.0);
        assert_relative_eq!(body.velocity.y, 2.0);
        assert_relative_eq!(body.rotation(), 1.0);
        assert_relative_eq!(body.angular_velocity, 2.0);
    }

    #[test]
    fn fixed_body_ignores_impulses_and_forces() {
        let mut body = Body::fixed();
        body.translate_to(2.0, 3.0);
        body.add_immediate_impulse_at(Vec2::new(5.0, -1.0), Vec2::new(4.0, 4.0), 0.01);
        body.add_immediate_force(Vec2::new(0.0, -9.81), 0.01);
        body.add_immediate_torque(3.0, 0.01);
        body.add_immediate_angular_impulse(2.0, 0.01);
        assert_eq!(body.position, Vec2::new(2.0, 3.0));
        assert_eq!(body.rotation(), 0.0);
    }

    #[test]
    fn recalculate_velocity_uses_snapshot() {
        let mut body = Body::at(1.0, 1.0);
        body.save_prev_state();
        body.translate(0.5, -0.25);
        body.rotate(0.1);
        body.recalculate_velocity(0.5);
        assert_relative_eq!(body.velocity.x, 1.0);
        assert_relative_eq!(body.velocity.y, -0.5);
        assert_relative_eq!(body.angular_velocity, 0.2, epsilon = 1e-12);
    }

    #[test]
    fn teleports_keep_derived_velocity() {
        let mut body = Body::at(1.0, 1.0);
        body.velocity = Vec2::new(1.0, 0.0);
        body.angular_velocity = 0.5;
        body.save_prev_state();
        body.apply_motion(0.1);

        body.translate_to(body.position.x, body.position.y);
        body.translate_to(-4.0, 7.0);
        body.set_rotation(2.0);
        body.recalculate_velocity(0.1);

        assert_relative_eq!(body.velocity.x, 1.0, epsilon = 1e-12);
        assert_relative_eq!(body.velocity.y, 0.0, epsilon = 1e-12);
        assert_relative_eq!(body.angular_velocity, 0.5, epsilon = 1e-12);
        assert_eq!(body.position, Vec2::new(-4.0, 7.0));
        assert_eq!(body.rotation(), 2.0);
    }
}
