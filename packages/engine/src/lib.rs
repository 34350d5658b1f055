//! XPBD Engine - 2D position-based dynamics for jointed mechanisms in WASM
//!
//! Rigid bodies are held together by compliant constraints (distance, axis,
//! pin, axle) and advanced with Extended Position-Based Dynamics in fixed
//! substeps.
//!
//! Architecture:
//! - core/          - Math glue and error types
//! - domain/        - Bodies and attachments
//! - systems/       - Constraints, friction, external forces
//! - simulation/    - Scene orchestration and the WASM facade

pub mod core;
pub mod domain;
pub mod systems;
pub mod simulation;

use wasm_bindgen::prelude::*;

// Better error messages in debug mode
#[cfg(feature = "console_error_panic_hook")]
pub fn set_panic_hook() {
    console_error_panic_hook::set_once();
}

/// Initialize the engine
#[wasm_bindgen]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    set_panic_hook();

    web_sys::console::log_1(&"XPBD engine initialized".into());
}

/// Get engine version
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

// Re-export main types
pub use crate::core::error::{SceneError, SceneResult};
pub use crate::core::math::{Real, Vec2};
pub use domain::{Attachment, Body, BodyHandle};
pub use simulation::{DebugPrimitive, PerfStats, Scene, SceneSettings, Simulation, VelocityStrategy};
pub use systems::constraints::{Constraint, ConstraintHandle, ConstraintKind};
pub use systems::forces;
pub use systems::friction::Friction;
