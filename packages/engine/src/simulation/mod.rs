//! Scene - XPBD simulation of jointed rigid bodies
//!
//! The scene only orchestrates: bodies live in `domain/`, constraints,
//! friction and forces in `systems/`. Each `update` is split into fixed
//! substeps and every substep runs the same pipeline:
//!
//! 1. predict motion
//! 2. external forces
//! 3. constraint init
//! 4. constraint solve (Gauss-Seidel, `solver_iterations` passes)
//! 5. velocity update
//! 6. friction
//! 7. damping
//!
//! Insertion order of bodies and constraints is the iteration order, so
//! results are deterministic for a given scene, Δt and substep count.

use tracing::{debug, trace};

use crate::core::error::{SceneError, SceneResult};
use crate::core::math::{Real, Vec2};
use crate::domain::{Attachment, Body, BodyHandle};
use crate::systems::constraints::{Constraint, ConstraintHandle};
use crate::systems::forces::ExternalForce;

#[path = "perf/perf_timer.rs"]
mod perf_timer;
#[path = "perf/perf_stats.rs"]
mod perf_stats;
#[path = "step/step.rs"]
mod step;
#[path = "commands/commands.rs"]
mod commands;
#[path = "render/render_extract.rs"]
mod render_extract;
#[path = "init/init.rs"]
mod init;
#[path = "init/settings.rs"]
mod settings;
mod facade;

pub use facade::Simulation;
pub use perf_stats::PerfStats;
pub use render_extract::DebugPrimitive;
pub use settings::{SceneSettings, VelocityStrategy};

use perf_timer::PerfTimer;

/// The simulation scene
pub struct Scene {
    bodies: Vec<Body>,
    constraints: Vec<Constraint>,
    external_forces: Vec<ExternalForce>,

    // Settings
    settings: SceneSettings,

    // State
    frame: u64,
    /// Set while `update` runs, so force callbacks cannot re-enter it
    in_step: bool,

    // Perf metrics
    perf_enabled: bool,
    perf_stats: PerfStats,
}

impl Scene {
    /// Empty scene with default settings
    pub fn new() -> Self {
        init::create_scene(SceneSettings::default())
    }

    /// Empty scene with validated settings
    pub fn with_settings(settings: SceneSettings) -> SceneResult<Self> {
        settings.validate()?;
        Ok(init::create_scene(settings))
    }

    pub fn from_settings_json(json: &str) -> SceneResult<Self> {
        Self::with_settings(SceneSettings::from_json(json)?)
    }

    pub fn settings(&self) -> &SceneSettings {
        &self.settings
    }

    pub fn substeps(&self) -> u32 {
        self.settings.substeps
    }

    /// Set substeps per update (clamped to at least 1)
    pub fn set_substeps(&mut self, substeps: u32) {
        settings::set_substeps(self, substeps);
    }

    pub fn solver_iterations(&self) -> u32 {
        self.settings.solver_iterations
    }

    /// Set constraint passes per substep (clamped to at least 1)
    pub fn set_solver_iterations(&mut self, iterations: u32) {
        settings::set_solver_iterations(self, iterations);
    }

    pub fn set_velocity_strategy(&mut self, strategy: VelocityStrategy) {
        settings::set_velocity_strategy(self, strategy);
    }

    /// Number of completed `update` calls
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Enable or disable per-update perf metrics (adds timing overhead when enabled)
    pub fn enable_perf_metrics(&mut self, enabled: bool) {
        settings::enable_perf_metrics(self, enabled);
    }

    /// Last update's perf snapshot (zeros when perf disabled)
    pub fn perf_stats(&self) -> PerfStats {
        settings::get_perf_stats(self)
    }

    // === BODIES ===

    pub fn add_body(&mut self, body: Body) -> BodyHandle {
        let handle = BodyHandle(self.bodies.len() as u32);
        trace!(body = %handle, "body added");
        self.bodies.push(body);
        handle
    }

    pub fn body(&self, handle: BodyHandle) -> Option<&Body> {
        self.bodies.get(handle.index())
    }

    pub fn body_mut(&mut self, handle: BodyHandle) -> Option<&mut Body> {
        self.bodies.get_mut(handle.index())
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub fn bodies_mut(&mut self) -> &mut [Body] {
        &mut self.bodies
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Closest body whose center lies within `radius` of `point`
    pub fn pick_body(&self, point: Vec2, radius: Real) -> Option<BodyHandle> {
        commands::pick_body(self, point, radius)
    }

    // === CONSTRAINTS ===

    /// Add a constraint; every body it references must already exist.
    pub fn add_constraint(&mut self, constraint: Constraint) -> SceneResult<ConstraintHandle> {
        for body in constraint.bodies() {
            self.require_body(body)?;
        }
        let handle = ConstraintHandle(self.constraints.len() as u32);
        trace!(constraint = %handle, kind = constraint.name(), "constraint added");
        self.constraints.push(constraint);
        Ok(handle)
    }

    pub fn constraint(&self, handle: ConstraintHandle) -> Option<&Constraint> {
        self.constraints.get(handle.index())
    }

    pub fn constraint_mut(&mut self, handle: ConstraintHandle) -> Option<&mut Constraint> {
        self.constraints.get_mut(handle.index())
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    pub fn set_constraint_enabled(&mut self, handle: ConstraintHandle, enabled: bool) -> SceneResult<()> {
        commands::set_constraint_enabled(self, handle, enabled)
    }

    /// Move a pin's world anchor
    pub fn set_pin_origin(&mut self, handle: ConstraintHandle, origin: Vec2) -> SceneResult<()> {
        commands::set_pin_origin(self, handle, origin)
    }

    /// Point a pin at another body, grabbing it at `grab_point` (world space).
    /// `None` releases the pin by disabling it.
    pub fn retarget_pin(
        &mut self,
        handle: ConstraintHandle,
        body: Option<BodyHandle>,
        grab_point: Vec2,
    ) -> SceneResult<()> {
        commands::retarget_pin(self, handle, body, grab_point)
    }

    /// Replace the attachment of a pin or axis constraint
    pub fn retarget_attachment(&mut self, handle: ConstraintHandle, attachment: Attachment) -> SceneResult<()> {
        commands::retarget_attachment(self, handle, attachment)
    }

    /// Replace both attachments of a distance constraint
    pub fn retarget_distance(
        &mut self,
        handle: ConstraintHandle,
        from: Attachment,
        to: Attachment,
    ) -> SceneResult<()> {
        commands::retarget_distance(self, handle, from, to)
    }

    /// Set a distance constraint's rest length to its current length
    pub fn reset_rest_distance(&mut self, handle: ConstraintHandle) -> SceneResult<()> {
        commands::reset_rest_distance(self, handle)
    }

    /// Keep an axle's current relative orientation as its rest state
    pub fn reset_rest_offset(&mut self, handle: ConstraintHandle) -> SceneResult<()> {
        commands::reset_rest_offset(self, handle)
    }

    // === FORCES ===

    pub fn add_external_force(&mut self, force: ExternalForce) {
        self.external_forces.push(force);
    }

    pub fn external_force_count(&self) -> usize {
        self.external_forces.len()
    }

    // === SIMULATION ===

    /// Advance by `delta` seconds, split into `substeps` equal substeps.
    ///
    /// Callers clamp large frame deltas; non-positive or non-finite deltas
    /// are ignored, as are calls made from an external force callback.
    pub fn update(&mut self, delta: Real) {
        if !(delta > 0.0 && delta.is_finite()) {
            debug!(delta, "update skipped: delta must be positive and finite");
            return;
        }
        if self.in_step {
            debug!(delta, "update skipped: called from inside an update");
            return;
        }
        step::update(self, delta);
    }

    // === DEBUG ===

    /// Primitives for debug rendering (bodies and enabled constraints)
    pub fn debug_primitives(&self) -> Vec<DebugPrimitive> {
        render_extract::extract_debug_primitives(self)
    }

    /// Debug primitives as a JSON array
    pub fn debug_json(&self) -> String {
        render_extract::debug_json(self)
    }

    fn require_body(&self, handle: BodyHandle) -> SceneResult<&Body> {
        self.bodies.get(handle.index()).ok_or(SceneError::UnknownBody(handle))
    }

    fn require_constraint_mut(&mut self, handle: ConstraintHandle) -> SceneResult<&mut Constraint> {
        self.constraints
            .get_mut(handle.index())
            .ok_or(SceneError::UnknownConstraint(handle))
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "tests/tests.rs"]
mod tests;
