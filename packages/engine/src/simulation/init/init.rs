use super::perf_stats::PerfStats;
use super::settings::SceneSettings;
use super::Scene;

pub(super) fn create_scene(settings: SceneSettings) -> Scene {
    Scene {
        bodies: Vec::new(),
        constraints: Vec::new(),
        external_forces: Vec::new(),
        settings,
        frame: 0,
        in_step: false,
        perf_enabled: false,
        perf_stats: PerfStats::default(),
    }
}
