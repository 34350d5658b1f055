//! Millisecond timer for the perf counters: monotonic `Instant` natively,
//! the browser clock on wasm32 (no `std::time` clock there).

#[derive(Clone, Copy, Debug)]
pub(crate) struct PerfTimer {
    #[cfg(target_arch = "wasm32")]
    start_ms: f64,
    #[cfg(not(target_arch = "wasm32"))]
    start: std::time::Instant,
}

#[cfg(target_arch = "wasm32")]
impl PerfTimer {
    pub(crate) fn start() -> Self {
        PerfTimer { start_ms: js_sys::Date::now() }
    }

    pub(crate) fn elapsed_ms(&self) -> f64 {
        js_sys::Date::now() - self.start_ms
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl PerfTimer {
    pub(crate) fn start() -> Self {
        PerfTimer { start: std::time::Instant::now() }
    }

    pub(crate) fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;

    #[test]
    fn elapsed_is_monotonic() {
        let timer = PerfTimer::start();
        let first = timer.elapsed_ms();
        let second = timer.elapsed_ms();
        assert!(first >= 0.0);
        assert!(second >= first);
    }
}
