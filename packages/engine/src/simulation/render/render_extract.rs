use serde::Serialize;

use crate::core::math::{Real, Vec2};
use crate::systems::constraints::ConstraintKind;

use super::Scene;

/// Something the debug renderer can draw. Vectors serialize as `[x, y]`.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DebugPrimitive {
    Body {
        position: Vec2,
        rotation: Real,
        /// Body-local x axis in world space
        x_axis: Vec2,
    },
    Distance {
        from: Vec2,
        to: Vec2,
    },
    Pin {
        attachment: Vec2,
        origin: Vec2,
    },
    Axis {
        attachment: Vec2,
        origin: Vec2,
        axis: Vec2,
    },
    Axle {
        a: Vec2,
        b: Vec2,
        gear_ratio: Real,
    },
}

pub(super) fn extract_debug_primitives(scene: &Scene) -> Vec<DebugPrimitive> {
    let bodies = &scene.bodies;
    let mut out = Vec::with_capacity(bodies.len() + scene.constraints.len());

    for body in bodies.iter() {
        out.push(DebugPrimitive::Body {
            position: body.position,
            rotation: body.rotation(),
            x_axis: body.basis() * Vec2::X,
        });
    }

    // Disabled constraints (e.g. an idle drag pin) are not drawn.
    for constraint in scene.constraints.iter().filter(|c| c.enabled) {
        let primitive = match constraint.kind() {
            ConstraintKind::Distance(c) => c
                .endpoints(bodies)
                .map(|(from, to)| DebugPrimitive::Distance { from, to }),
            ConstraintKind::Pin(c) => c
                .attachment_position(bodies)
                .map(|attachment| DebugPrimitive::Pin {
                    attachment,
                    origin: c.origin,
                }),
            ConstraintKind::Axis(c) => c
                .attachment_position(bodies)
                .map(|attachment| DebugPrimitive::Axis {
                    attachment,
                    origin: c.origin,
                    axis: c.axis(),
                }),
            ConstraintKind::Axle(c) => match (bodies.get(c.a().index()), bodies.get(c.b().index())) {
                (Some(a), Some(b)) => Some(DebugPrimitive::Axle {
                    a: a.position,
                    b: b.position,
                    gear_ratio: c.gear_ratio,
                }),
                _ => None,
            },
        };
        out.extend(primitive);
    }

    out
}

pub(super) fn debug_json(scene: &Scene) -> String {
    serde_json::to_string(&extract_debug_primitives(scene)).unwrap_or_else(|_| "[]".to_string())
}
