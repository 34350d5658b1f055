use wasm_bindgen::prelude::*;

use crate::core::error::SceneError;
use crate::core::math::{Real, Vec2};
use crate::domain::{Attachment, Body, BodyHandle};
use crate::systems::constraints::{Constraint, ConstraintHandle};
use crate::systems::forces;
use crate::systems::friction::Friction;

use super::perf_stats::PerfStats;
use super::Scene;

fn to_js(err: SceneError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

#[wasm_bindgen]
pub struct Simulation {
    core: Scene,
}

#[wasm_bindgen]
impl Simulation {
    /// Create an empty simulation with default settings
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self { core: Scene::new() }
    }

    #[wasm_bindgen(js_name = fromSettingsJson)]
    pub fn from_settings_json(json: &str) -> Result<Simulation, JsValue> {
        let core = Scene::from_settings_json(json).map_err(to_js)?;
        Ok(Self { core })
    }

    #[wasm_bindgen(getter)]
    pub fn frame(&self) -> u64 { self.core.frame() }

    #[wasm_bindgen(getter)]
    pub fn body_count(&self) -> u32 { self.core.body_count() as u32 }

    #[wasm_bindgen(getter)]
    pub fn constraint_count(&self) -> u32 { self.core.constraint_count() as u32 }

    #[wasm_bindgen(getter)]
    pub fn substeps(&self) -> u32 { self.core.substeps() }

    #[wasm_bindgen(setter)]
    pub fn set_substeps(&mut self, substeps: u32) {
        self.core.set_substeps(substeps);
    }

    pub fn set_solver_iterations(&mut self, iterations: u32) {
        self.core.set_solver_iterations(iterations);
    }

    pub fn settings_json(&self) -> String {
        self.core.settings().to_json()
    }

    /// Enable or disable per-update perf metrics (adds timing overhead when enabled)
    pub fn enable_perf_metrics(&mut self, enabled: bool) {
        self.core.enable_perf_metrics(enabled);
    }

    /// Get last update perf snapshot (zeros when perf disabled)
    pub fn get_perf_stats(&self) -> PerfStats {
        self.core.perf_stats()
    }

    // === BODIES ===

    /// Add a body; zero inverse mass / inertia makes it fixed.
    pub fn add_body(&mut self, x: f64, y: f64, inverse_mass: f64, inverse_inertia: f64) -> u32 {
        let body = Body::at(x, y)
            .with_inverse_mass(inverse_mass.max(0.0))
            .with_inverse_inertia(inverse_inertia.max(0.0));
        self.core.add_body(body).0
    }

    /// Give a body wheel friction against a horizontal ground.
    pub fn set_wheel_friction(
        &mut self,
        body: u32,
        radius: f64,
        coefficient: f64,
        normal_force: f64,
    ) -> Result<(), JsValue> {
        let handle = BodyHandle(body);
        let body = self
            .core
            .body_mut(handle)
            .ok_or_else(|| to_js(SceneError::UnknownBody(handle)))?;
        body.friction = Some(Friction::wheel(radius, coefficient, normal_force));
        Ok(())
    }

    pub fn body_x(&self, body: u32) -> Option<f64> {
        self.core.body(BodyHandle(body)).map(|b| b.position.x)
    }

    pub fn body_y(&self, body: u32) -> Option<f64> {
        self.core.body(BodyHandle(body)).map(|b| b.position.y)
    }

    pub fn body_rotation(&self, body: u32) -> Option<f64> {
        self.core.body(BodyHandle(body)).map(|b| b.rotation())
    }

    // === CONSTRAINTS ===

    /// Distance constraint between two body-local points.
    #[allow(clippy::too_many_arguments)]
    pub fn add_distance_constraint(
        &mut self,
        a: u32,
        ax: f64,
        ay: f64,
        b: u32,
        bx: f64,
        by: f64,
        rest_distance: f64,
        compliance: f64,
    ) -> Result<u32, JsValue> {
        let constraint = Constraint::distance(
            Attachment::new(BodyHandle(a), Vec2::new(ax, ay)),
            Attachment::new(BodyHandle(b), Vec2::new(bx, by)),
            rest_distance.max(0.0),
        )
        .with_compliance(compliance);
        self.add(constraint)
    }

    /// Pin a body-local point to a world position.
    pub fn add_pin_constraint(
        &mut self,
        body: u32,
        local_x: f64,
        local_y: f64,
        origin_x: f64,
        origin_y: f64,
        compliance: f64,
    ) -> Result<u32, JsValue> {
        let constraint = Constraint::pin(
            Attachment::new(BodyHandle(body), Vec2::new(local_x, local_y)),
            Vec2::new(origin_x, origin_y),
        )
        .with_compliance(compliance);
        self.add(constraint)
    }

    /// Keep a body's center on the line through `origin` along `axis`.
    pub fn add_axis_constraint(
        &mut self,
        body: u32,
        origin_x: f64,
        origin_y: f64,
        axis_x: f64,
        axis_y: f64,
        compliance: f64,
    ) -> Result<u32, JsValue> {
        let constraint = Constraint::axis(
            Attachment::central(BodyHandle(body)),
            Vec2::new(origin_x, origin_y),
            Vec2::new(axis_x, axis_y),
        )
        .with_compliance(compliance);
        self.add(constraint)
    }

    pub fn add_axle_constraint(
        &mut self,
        a: u32,
        b: u32,
        gear_ratio: f64,
        compliance: f64,
    ) -> Result<u32, JsValue> {
        let constraint = Constraint::axle(BodyHandle(a), BodyHandle(b), gear_ratio).with_compliance(compliance);
        self.add(constraint)
    }

    pub fn set_constraint_damping(&mut self, constraint: u32, damping: f64) -> Result<(), JsValue> {
        let handle = ConstraintHandle(constraint);
        let constraint = self
            .core
            .constraint_mut(handle)
            .ok_or_else(|| to_js(SceneError::UnknownConstraint(handle)))?;
        constraint.damping = damping.max(0.0);
        Ok(())
    }

    pub fn set_constraint_enabled(&mut self, constraint: u32, enabled: bool) -> Result<(), JsValue> {
        self.core
            .set_constraint_enabled(ConstraintHandle(constraint), enabled)
            .map_err(to_js)
    }

    pub fn set_pin_origin(&mut self, pin: u32, x: f64, y: f64) -> Result<(), JsValue> {
        self.core
            .set_pin_origin(ConstraintHandle(pin), Vec2::new(x, y))
            .map_err(to_js)
    }

    /// Pointer down: grab the closest body within `radius` with `pin`.
    /// Returns the grabbed body, if any.
    pub fn grab(&mut self, pin: u32, x: f64, y: f64, radius: f64) -> Result<Option<u32>, JsValue> {
        let point = Vec2::new(x, y);
        let body = self.core.pick_body(point, radius);
        self.core
            .retarget_pin(ConstraintHandle(pin), body, point)
            .map_err(to_js)?;
        Ok(body.map(|b| b.0))
    }

    /// Pointer up: disable the drag pin.
    pub fn release(&mut self, pin: u32) -> Result<(), JsValue> {
        self.core
            .retarget_pin(ConstraintHandle(pin), None, Vec2::ZERO)
            .map_err(to_js)
    }

    pub fn reset_rest_distance(&mut self, constraint: u32) -> Result<(), JsValue> {
        self.core
            .reset_rest_distance(ConstraintHandle(constraint))
            .map_err(to_js)
    }

    pub fn reset_rest_offset(&mut self, constraint: u32) -> Result<(), JsValue> {
        self.core
            .reset_rest_offset(ConstraintHandle(constraint))
            .map_err(to_js)
    }

    // === FORCES ===

    pub fn add_gravity(&mut self, x: f64, y: f64) {
        self.core.add_external_force(forces::gravity(Vec2::new(x, y)));
    }

    pub fn add_drive_torque(&mut self, body: u32, torque: f64) -> Result<(), JsValue> {
        let handle = BodyHandle(body);
        if self.core.body(handle).is_none() {
            return Err(to_js(SceneError::UnknownBody(handle)));
        }
        self.core.add_external_force(forces::drive_torque(handle, torque));
        Ok(())
    }

    // === SIMULATION ===

    /// Advance by a frame delta in seconds, clamped to `max_frame_delta`.
    pub fn update(&mut self, delta: f64) {
        let delta = clamp_frame_delta(delta, self.core.settings().max_frame_delta);
        self.core.update(delta);
    }

    /// Bodies and enabled constraints as a JSON array for debug drawing
    pub fn debug_json(&self) -> String {
        self.core.debug_json()
    }
}

impl Simulation {
    fn add(&mut self, constraint: Constraint) -> Result<u32, JsValue> {
        self.core.add_constraint(constraint).map(|h| h.0).map_err(to_js)
    }

    pub fn scene(&self) -> &Scene {
        &self.core
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.core
    }
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new()
    }
}

pub(super) fn clamp_frame_delta(delta: Real, max_frame_delta: Real) -> Real {
    if delta.is_nan() {
        return delta;
    }
    delta.min(max_frame_delta)
}
