use crate::core::error::{SceneError, SceneResult};
use crate::core::math::{Real, Vec2};
use crate::domain::{Attachment, BodyHandle};
use crate::systems::constraints::{ConstraintHandle, ConstraintKind};

use super::Scene;

fn wrong_kind(handle: ConstraintHandle, expected: &'static str, actual: &ConstraintKind) -> SceneError {
    SceneError::WrongConstraintKind {
        handle,
        expected,
        actual: actual.name(),
    }
}

pub(super) fn pick_body(scene: &Scene, point: Vec2, radius: Real) -> Option<BodyHandle> {
    let mut best = None;
    let mut best_distance = radius;
    for (index, body) in scene.bodies.iter().enumerate() {
        let d = body.position.distance(point);
        if d < best_distance {
            best_distance = d;
            best = Some(BodyHandle(index as u32));
        }
    }
    best
}

pub(super) fn set_constraint_enabled(
    scene: &mut Scene,
    handle: ConstraintHandle,
    enabled: bool,
) -> SceneResult<()> {
    scene.require_constraint_mut(handle)?.enabled = enabled;
    Ok(())
}

pub(super) fn set_pin_origin(scene: &mut Scene, handle: ConstraintHandle, origin: Vec2) -> SceneResult<()> {
    let constraint = scene.require_constraint_mut(handle)?;
    match constraint.kind_mut() {
        ConstraintKind::Pin(pin) => {
            pin.origin = origin;
            Ok(())
        }
        other => Err(wrong_kind(handle, "pin", other)),
    }
}

pub(super) fn retarget_pin(
    scene: &mut Scene,
    handle: ConstraintHandle,
    body: Option<BodyHandle>,
    grab_point: Vec2,
) -> SceneResult<()> {
    let attachment = match body {
        Some(body) => Some(Attachment::at_world_point(body, scene.require_body(body)?, grab_point)),
        None => None,
    };

    let constraint = scene.require_constraint_mut(handle)?;
    match constraint.kind_mut() {
        ConstraintKind::Pin(pin) => {
            if let Some(attachment) = attachment {
                pin.set_attachment(attachment);
                pin.origin = grab_point;
            }
        }
        other => return Err(wrong_kind(handle, "pin", other)),
    }
    constraint.enabled = attachment.is_some();
    Ok(())
}

pub(super) fn retarget_attachment(
    scene: &mut Scene,
    handle: ConstraintHandle,
    attachment: Attachment,
) -> SceneResult<()> {
    scene.require_body(attachment.body)?;
    let constraint = scene.require_constraint_mut(handle)?;
    match constraint.kind_mut() {
        ConstraintKind::Pin(pin) => pin.set_attachment(attachment),
        ConstraintKind::Axis(axis) => axis.set_attachment(attachment),
        other => return Err(wrong_kind(handle, "pin or axis", other)),
    }
    Ok(())
}

pub(super) fn retarget_distance(
    scene: &mut Scene,
    handle: ConstraintHandle,
    from: Attachment,
    to: Attachment,
) -> SceneResult<()> {
    scene.require_body(from.body)?;
    scene.require_body(to.body)?;
    let constraint = scene.require_constraint_mut(handle)?;
    match constraint.kind_mut() {
        ConstraintKind::Distance(distance) => {
            distance.set_from(from);
            distance.set_to(to);
            Ok(())
        }
        other => Err(wrong_kind(handle, "distance", other)),
    }
}

pub(super) fn reset_rest_distance(scene: &mut Scene, handle: ConstraintHandle) -> SceneResult<()> {
    let constraint = scene
        .constraints
        .get_mut(handle.index())
        .ok_or(SceneError::UnknownConstraint(handle))?;
    match constraint.kind_mut() {
        ConstraintKind::Distance(distance) => {
            distance.reset_rest_distance(&scene.bodies);
            Ok(())
        }
        other => Err(wrong_kind(handle, "distance", other)),
    }
}

pub(super) fn reset_rest_offset(scene: &mut Scene, handle: ConstraintHandle) -> SceneResult<()> {
    let constraint = scene
        .constraints
        .get_mut(handle.index())
        .ok_or(SceneError::UnknownConstraint(handle))?;
    match constraint.kind_mut() {
        ConstraintKind::Axle(axle) => {
            axle.reset_rest_offset(&scene.bodies);
            Ok(())
        }
        other => Err(wrong_kind(handle, "axle", other)),
    }
}
