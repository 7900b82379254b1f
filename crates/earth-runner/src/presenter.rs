//! Log-based renderer for simulation states.

use earth_coord::Presenter;
use earth_sim::SimulationState;
use std::time::{Duration, Instant};
use tracing::{info, trace};

/// Summarises states in the log, at most once per refresh interval.
///
/// Every state is received. Only the render is throttled.
pub struct LoggingPresenter {
    refresh_rate: Duration,
    last_render: Option<Instant>,
    received: u64,
    rendered: u64,
}

impl LoggingPresenter {
    pub fn new(refresh_rate: Duration) -> Self {
        Self {
            refresh_rate,
            last_render: None,
            received: 0,
            rendered: 0,
        }
    }

    fn due(&self, now: Instant) -> bool {
        match self.last_render {
            Some(last) => now.duration_since(last) >= self.refresh_rate,
            None => true,
        }
    }

    fn render(&mut self, state: &SimulationState) {
        self.rendered += 1;
        let simulated = state
            .simulated_datetime()
            .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "out of range".to_string());

        info!(
            event = "frame",
            frame = self.rendered,
            states = self.received,
            simulated = %simulated,
            sun_longitude = state.sun_longitude(),
            min_k = state.min_temperature(),
            mean_k = state.mean_temperature(),
            max_k = state.max_temperature(),
            "Rendered simulation state"
        );
        crate::record_gauge!("mean_temperature_k", state.mean_temperature());
    }
}

impl Presenter for LoggingPresenter {
    fn present(&mut self, state: SimulationState) {
        self.received += 1;
        let now = Instant::now();
        if self.due(now) {
            self.last_render = Some(now);
            self.render(&state);
        } else {
            trace!(running_minutes = state.running_minutes(), "Skipped frame");
        }
    }
}
