use wasm_bindgen::prelude::*;

/// Per-update timings (summed over substeps) and solver counters.
#[wasm_bindgen]
#[derive(Clone, Debug, Default)]
pub struct PerfStats {
    pub(super) update_ms: f64,
    pub(super) predict_ms: f64,
    pub(super) forces_ms: f64,
    pub(super) solve_ms: f64,
    pub(super) velocity_ms: f64,
    pub(super) friction_ms: f64,
    pub(super) damping_ms: f64,
    pub(super) substeps: u32,
    pub(super) constraints_applied: u32,
    pub(super) constraints_skipped: u32,
    pub(super) body_count: u32,
    pub(super) constraint_count: u32,
}

impl PerfStats {
    pub(crate) fn reset(&mut self) {
        *self = PerfStats::default();
    }
}

#[wasm_bindgen]
impl PerfStats {
    #[wasm_bindgen(getter)]
    pub fn update_ms(&self) -> f64 { self.update_ms }
    #[wasm_bindgen(getter)]
    pub fn predict_ms(&self) -> f64 { self.predict_ms }
    #[wasm_bindgen(getter)]
    pub fn forces_ms(&self) -> f64 { self.forces_ms }
    #[wasm_bindgen(getter)]
    pub fn solve_ms(&self) -> f64 { self.solve_ms }
    #[wasm_bindgen(getter)]
    pub fn velocity_ms(&self) -> f64 { self.velocity_ms }
    #[wasm_bindgen(getter)]
    pub fn friction_ms(&self) -> f64 { self.friction_ms }
    #[wasm_bindgen(getter)]
    pub fn damping_ms(&self) -> f64 { self.damping_ms }
    #[wasm_bindgen(getter)]
    pub fn substeps(&self) -> u32 { self.substeps }
    #[wasm_bindgen(getter)]
    pub fn constraints_applied(&self) -> u32 { self.constraints_applied }
    #[wasm_bindgen(getter)]
    pub fn constraints_skipped(&self) -> u32 { self.constraints_skipped }
    #[wasm_bindgen(getter)]
    pub fn body_count(&self) -> u32 { self.body_count }
    #[wasm_bindgen(getter)]
    pub fn constraint_count(&self) -> u32 { self.constraint_count }
}
