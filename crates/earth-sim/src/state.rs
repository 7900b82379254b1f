//! Immutable snapshots handed from the simulation to the presentation.

use crate::cell::Cell;
use chrono::{DateTime, Duration, TimeZone, Utc};
use earth_core::constants::SIMULATION_EPOCH_UNIX;
use serde::{Deserialize, Serialize};

/// A complete grid at one instant of simulated time, plus the sun's
/// position. Never mutated after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationState {
    width: usize,
    height: usize,
    spacing: u32,
    cells: Vec<Cell>,
    sun_longitude: f64,
    running_minutes: u64,
}

impl SimulationState {
    pub fn new(
        width: usize,
        height: usize,
        spacing: u32,
        cells: Vec<Cell>,
        sun_longitude: f64,
        running_minutes: u64,
    ) -> Self {
        debug_assert_eq!(cells.len(), width * height);
        Self {
            width,
            height,
            spacing,
            cells,
            sun_longitude,
            running_minutes,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn spacing(&self) -> u32 {
        self.spacing
    }

    /// Cells in row-major order, southernmost row first
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cell(&self, x: usize, y: usize) -> Option<&Cell> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.cells.get(y * self.width + x)
    }

    /// Sub-solar longitude (degrees, -180..180)
    pub fn sun_longitude(&self) -> f64 {
        self.sun_longitude
    }

    /// Simulated minutes elapsed since the start of the run
    pub fn running_minutes(&self) -> u64 {
        self.running_minutes
    }

    /// Wall-calendar instant of this state; the run starts at
    /// 2000-01-01T00:00Z. `None` once the instant is past what `chrono`
    /// can represent.
    pub fn simulated_datetime(&self) -> Option<DateTime<Utc>> {
        let minutes = i64::try_from(self.running_minutes).ok()?;
        let epoch = Utc.timestamp_opt(SIMULATION_EPOCH_UNIX, 0).single()?;
        epoch.checked_add_signed(Duration::try_minutes(minutes)?)
    }

    pub fn mean_temperature(&self) -> f64 {
        if self.cells.is_empty() {
            return 0.0;
        }
        self.cells.iter().map(Cell::temperature).sum::<f64>() / self.cells.len() as f64
    }

    pub fn min_temperature(&self) -> f64 {
        self.cells
            .iter()
            .map(Cell::temperature)
            .fold(f64::INFINITY, f64::min)
    }

    pub fn max_temperature(&self) -> f64 {
        self.cells
            .iter()
            .map(Cell::temperature)
            .fold(f64::NEG_INFINITY, f64::max)
    }
}

#[cfg(test)]
mod tests {
    use crate::grid::Grid;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_state_accessors() {
        let grid = Grid::new(15).unwrap();
        let state = grid.snapshot(-90.0, 360);

        assert_eq!(state.width(), 24);
        assert_eq!(state.height(), 12);
        assert_eq!(state.spacing(), 15);
        assert_eq!(state.sun_longitude(), -90.0);
        assert_eq!(state.running_minutes(), 360);
        assert_eq!(state.cell(12, 6).unwrap().longitude(), 0.0);
        assert!(state.cell(24, 0).is_none());
        assert!(state.cell(0, 12).is_none());
    }

    #[test]
    fn test_temperature_summary() {
        let mut grid = Grid::new(30).unwrap();
        grid.calculate_radiant_heating(0.0);
        let state = grid.snapshot(0.0, 0);

        assert!(state.min_temperature() < state.mean_temperature());
        assert!(state.mean_temperature() < state.max_temperature());
    }

    #[test]
    fn test_simulated_datetime() {
        let grid = Grid::new(90).unwrap();

        let start = grid.snapshot(-180.0, 0).simulated_datetime().unwrap();
        assert_eq!((start.year(), start.month(), start.day()), (2000, 1, 1));
        assert_eq!(start.hour(), 0);

        let later = grid.snapshot(0.0, 1440 + 90).simulated_datetime().unwrap();
        assert_eq!(later.day(), 2);
        assert_eq!((later.hour(), later.minute()), (1, 30));
    }

    #[test]
    fn test_simulated_datetime_out_of_range() {
        let grid = Grid::new(90).unwrap();

        // Too long for a chrono duration
        assert!(grid.snapshot(0.0, 1u64 << 60).simulated_datetime().is_none());
        // Too long for an i64
        assert!(grid.snapshot(0.0, u64::MAX).simulated_datetime().is_none());
        // A valid duration that lands past the last representable year
        assert!(grid
            .snapshot(0.0, 10_000_000_000_000)
            .simulated_datetime()
            .is_none());
    }
}
