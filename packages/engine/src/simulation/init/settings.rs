use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::core::error::{SceneError, SceneResult};
use crate::core::math::Real;

use super::perf_stats::PerfStats;
use super::Scene;

/// How body velocities are brought up to date after the constraint solve.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VelocityStrategy {
    /// Every positional impulse also updates velocity; nothing left to do.
    #[default]
    Incremental,
    /// `v = (x - x_prev) / Δt` from a snapshot taken at substep start.
    DeriveFromPositions,
}

/// Solver configuration, loadable from JSON.
///
/// Missing fields take their defaults:
///
/// ```
/// use xpbd_engine::simulation::SceneSettings;
///
/// let settings = SceneSettings::from_json(r#"{ "substeps": 20 }"#).unwrap();
/// assert_eq!(settings.substeps, 20);
/// assert_eq!(settings.solver_iterations, 1);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneSettings {
    /// Substeps per `update`
    pub substeps: u32,
    /// Constraint passes per substep
    pub solver_iterations: u32,
    pub velocity_strategy: VelocityStrategy,
    /// Largest frame delta the WASM facade forwards to `update` (seconds)
    pub max_frame_delta: Real,
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            substeps: 10,
            solver_iterations: 1,
            velocity_strategy: VelocityStrategy::Incremental,
            max_frame_delta: 0.2,
        }
    }
}

impl SceneSettings {
    pub fn from_json(json: &str) -> SceneResult<Self> {
        let settings: SceneSettings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn validate(&self) -> SceneResult<()> {
        if self.substeps == 0 {
            return Err(SceneError::InvalidSettings("substeps must be at least 1".to_string()));
        }
        if self.solver_iterations == 0 {
            return Err(SceneError::InvalidSettings(
                "solver_iterations must be at least 1".to_string(),
            ));
        }
        if !(self.max_frame_delta > 0.0 && self.max_frame_delta.is_finite()) {
            return Err(SceneError::InvalidSettings(format!(
                "max_frame_delta must be positive and finite, got {}",
                self.max_frame_delta
            )));
        }
        Ok(())
    }
}

pub(super) fn set_substeps(scene: &mut Scene, substeps: u32) {
    if substeps == 0 {
        warn!("substeps must be at least 1; using 1");
    }
    scene.settings.substeps = substeps.max(1);
}

pub(super) fn set_solver_iterations(scene: &mut Scene, iterations: u32) {
    if iterations == 0 {
        warn!("solver_iterations must be at least 1; using 1");
    }
    scene.settings.solver_iterations = iterations.max(1);
}

pub(super) fn set_velocity_strategy(scene: &mut Scene, strategy: VelocityStrategy) {
    scene.settings.velocity_strategy = strategy;
}

pub(super) fn enable_perf_metrics(scene: &mut Scene, enabled: bool) {
    scene.perf_enabled = enabled;
}

pub(super) fn get_perf_stats(scene: &Scene) -> PerfStats {
    scene.perf_stats.clone()
}
