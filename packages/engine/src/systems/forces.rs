//! External forces: callbacks run once per substep, before constraints.

use crate::core::math::{Real, Vec2};
use crate::domain::BodyHandle;
use crate::simulation::Scene;

/// Callback invoked with the substep length and the scene.
///
/// Callbacks may read and write any body and may register further forces;
/// those run from the next substep on.
pub type ExternalForce = Box<dyn FnMut(Real, &mut Scene)>;

/// Uniform gravitational acceleration on every movable body.
pub fn gravity(acceleration: Vec2) -> ExternalForce {
    Box::new(move |delta, scene| {
        for body in scene.bodies_mut() {
            if body.inverse_mass > 0.0 {
                let force = acceleration * body.mass();
                body.add_immediate_force(force, delta);
            }
        }
    })
}

/// Constant torque on one body (e.g. an engine driving a crank).
pub fn drive_torque(body: BodyHandle, torque: Real) -> ExternalForce {
    Box::new(move |delta, scene| {
        if let Some(body) = scene.body_mut(body) {
            body.add_immediate_torque(torque, delta);
        }
    })
}

/// Constant force at one body's center of mass.
pub fn constant_force(body: BodyHandle, force: Vec2) -> ExternalForce {
    Box::new(move |delta, scene| {
        if let Some(body) = scene.body_mut(body) {
            body.add_immediate_force(force, delta);
        }
    })
}
