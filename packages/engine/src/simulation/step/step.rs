use tracing::trace;

use crate::core::math::Real;
use crate::systems::constraints::SolveOutcome;

use super::settings::VelocityStrategy;
use super::{PerfTimer, Scene};

pub(super) fn update(scene: &mut Scene, delta: Real) {
    let perf_on = scene.perf_enabled;
    if perf_on {
        scene.perf_stats.reset();
        scene.perf_stats.body_count = scene.bodies.len() as u32;
        scene.perf_stats.constraint_count = scene.constraints.len() as u32;
    }
    let update_start = perf_on.then(PerfTimer::start);

    let substeps = scene.settings.substeps.max(1);
    let sub_delta = delta / substeps as Real;
    trace!(delta, substeps, "update");

    scene.in_step = true;
    for _ in 0..substeps {
        step(scene, sub_delta);
    }
    scene.in_step = false;

    if let Some(start) = update_start {
        scene.perf_stats.substeps = substeps;
        scene.perf_stats.update_ms = start.elapsed_ms();
    }
    scene.frame += 1;
}

/// One substep of the XPBD pipeline. The phase order matters for stability.
pub(super) fn step(scene: &mut Scene, delta: Real) {
    let perf_on = scene.perf_enabled;
    let derive_velocity = scene.settings.velocity_strategy == VelocityStrategy::DeriveFromPositions;

    // === PREDICT ===
    let t0 = perf_on.then(PerfTimer::start);
    for body in scene.bodies.iter_mut() {
        if derive_velocity {
            body.save_prev_state();
        }
        body.apply_motion(delta);
    }
    if let Some(t0) = t0 {
        scene.perf_stats.predict_ms += t0.elapsed_ms();
    }

    // === EXTERNAL FORCES ===
    // Forces get the whole scene, so take them out while they run. Forces
    // registered by a callback land behind the existing ones.
    let t0 = perf_on.then(PerfTimer::start);
    let mut forces = std::mem::take(&mut scene.external_forces);
    for force in forces.iter_mut() {
        force(delta, scene);
    }
    forces.append(&mut scene.external_forces);
    scene.external_forces = forces;
    if let Some(t0) = t0 {
        scene.perf_stats.forces_ms += t0.elapsed_ms();
    }

    // === CONSTRAINTS ===
    let t0 = perf_on.then(PerfTimer::start);
    for constraint in scene.constraints.iter_mut().filter(|c| c.enabled) {
        constraint.init(delta);
    }

    let mut applied = 0u32;
    let mut skipped = 0u32;
    for _ in 0..scene.settings.solver_iterations.max(1) {
        for constraint in scene.constraints.iter_mut().filter(|c| c.enabled) {
            match constraint.apply(delta, &mut scene.bodies) {
                SolveOutcome::Applied => applied += 1,
                SolveOutcome::Skipped => skipped += 1,
            }
        }
    }
    if let Some(t0) = t0 {
        scene.perf_stats.solve_ms += t0.elapsed_ms();
        scene.perf_stats.constraints_applied += applied;
        scene.perf_stats.constraints_skipped += skipped;
    }

    // === VELOCITY ===
    // Incremental strategy: impulses already kept velocities current.
    if derive_velocity {
        let t0 = perf_on.then(PerfTimer::start);
        for body in scene.bodies.iter_mut() {
            body.recalculate_velocity(delta);
        }
        if let Some(t0) = t0 {
            scene.perf_stats.velocity_ms += t0.elapsed_ms();
        }
    }

    // === FRICTION ===
    let t0 = perf_on.then(PerfTimer::start);
    for body in scene.bodies.iter_mut() {
        body.apply_friction(delta);
    }
    if let Some(t0) = t0 {
        scene.perf_stats.friction_ms += t0.elapsed_ms();
    }

    // === DAMPING ===
    let t0 = perf_on.then(PerfTimer::start);
    for constraint in scene.constraints.iter().filter(|c| c.enabled) {
        constraint.apply_damping(delta, &mut scene.bodies);
    }
    if let Some(t0) = t0 {
        scene.perf_stats.damping_ms += t0.elapsed_ms();
    }
}
