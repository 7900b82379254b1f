//! Time stepping over a double-buffered pair of grids.

use crate::grid::Grid;
use crate::state::SimulationState;
use earth_core::constants::MINUTES_PER_DAY;
use earth_core::{clamp_timestep, Result, RunConfig};
use tracing::{debug, trace};

/// Sub-solar longitude after `running_minutes` of simulated time.
///
/// One full revolution per simulated day, in `[-180, 180)`.
pub fn sun_longitude_at(running_minutes: u64) -> f64 {
    let minute_of_day = running_minutes % MINUTES_PER_DAY as u64;
    minute_of_day as f64 * 360.0 / MINUTES_PER_DAY as f64 - 180.0
}

/// Advances simulated time.
///
/// Owns two grids of identical geometry. Each step heats the current grid,
/// diffuses it into the other one and swaps, so a grid is never read
/// while it is being written.
#[derive(Debug, Clone)]
pub struct Stepper {
    grids: [Grid; 2],
    current: usize,
    timestep_minutes: u32,
    running_minutes: u64,
    sun_longitude: f64,
    steps: u64,
}

impl Stepper {
    pub fn new(spacing: u32, timestep_minutes: u32) -> Result<Self> {
        Ok(Self::from_grid(Grid::new(spacing)?, timestep_minutes))
    }

    pub fn from_config(config: &RunConfig) -> Result<Self> {
        Self::new(config.grid_spacing, config.timestep_minutes)
    }

    /// Start from an existing grid, e.g. one with a custom initial field
    pub fn from_grid(grid: Grid, timestep_minutes: u32) -> Self {
        let timestep_minutes = clamp_timestep(timestep_minutes);
        debug!(
            spacing = grid.spacing(),
            width = grid.width(),
            height = grid.height(),
            timestep_minutes,
            "Created stepper"
        );

        Self {
            grids: [grid.clone(), grid],
            current: 0,
            timestep_minutes,
            running_minutes: 0,
            sun_longitude: sun_longitude_at(0),
            steps: 0,
        }
    }

    /// Run one step and package the result
    pub fn step(&mut self) -> SimulationState {
        let (first, second) = self.grids.split_at_mut(1);
        let (current, next) = if self.current == 0 {
            (&mut first[0], &mut second[0])
        } else {
            (&mut second[0], &mut first[0])
        };

        current.calculate_radiant_heating_over(self.sun_longitude, self.timestep_minutes);
        next.process_convection(current);
        self.current = 1 - self.current;

        let state = self.grids[self.current].snapshot(self.sun_longitude, self.running_minutes);

        self.running_minutes += self.timestep_minutes as u64;
        self.sun_longitude = sun_longitude_at(self.running_minutes);
        self.steps += 1;

        trace!(
            step = self.steps,
            running_minutes = self.running_minutes,
            sun_longitude = self.sun_longitude,
            "Stepped grid"
        );

        state
    }

    pub fn current(&self) -> &Grid {
        &self.grids[self.current]
    }

    pub fn sun_longitude(&self) -> f64 {
        self.sun_longitude
    }

    pub fn running_minutes(&self) -> u64 {
        self.running_minutes
    }

    pub fn timestep_minutes(&self) -> u32 {
        self.timestep_minutes
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }
}
