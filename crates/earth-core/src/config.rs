//! Configuration types for the simulation.

use crate::constants::{MAX_GRID_SPACING, MINUTES_PER_DAY};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::warn;

/// Which role decides when a step happens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Initiative {
    /// Neither role waits for the other; both poll opportunistically
    #[default]
    MasterControl,
    /// The simulation paces the run
    SimulationDrives,
    /// The presentation paces the run
    PresentationDrives,
}

/// Per-role threading flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Threading {
    /// The simulation runs on its own thread
    pub simulation: bool,
    /// The presentation runs on its own thread
    pub presentation: bool,
}

impl Threading {
    pub fn new(simulation: bool, presentation: bool) -> Self {
        Self {
            simulation,
            presentation,
        }
    }

    /// All four flag combinations
    pub fn all() -> [Threading; 4] {
        [
            Threading::new(false, false),
            Threading::new(true, false),
            Threading::new(false, true),
            Threading::new(true, true),
        ]
    }
}

/// Raw run settings as supplied by a command line or a config file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Capacity of the hand-off buffer
    pub buffer_capacity: usize,
    /// Run the simulation on its own thread
    pub simulation_threaded: bool,
    /// Run the presentation on its own thread
    pub presentation_threaded: bool,
    /// The simulation takes the initiative
    pub simulation_initiative: bool,
    /// The presentation takes the initiative
    pub presentation_initiative: bool,
    /// Grid spacing in degrees
    pub grid_spacing: u32,
    /// Simulated minutes per step
    pub timestep_minutes: u32,
    /// Display refresh cadence (milliseconds), used by the renderer only
    pub refresh_rate_ms: u64,
    /// Sleep between idle polls (milliseconds)
    pub idle_poll_ms: u64,
    /// Stop after this many steps; run until cancelled when absent
    pub step_limit: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            buffer_capacity: 1,
            simulation_threaded: false,
            presentation_threaded: false,
            simulation_initiative: false,
            presentation_initiative: false,
            grid_spacing: 15,
            timestep_minutes: 1,
            refresh_rate_ms: 1000,
            idle_poll_ms: 50,
            step_limit: None,
        }
    }
}

impl Settings {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Validate the raw settings and freeze them into a [`RunConfig`].
    pub fn validate(&self) -> Result<RunConfig> {
        if self.grid_spacing == 0 || self.grid_spacing > MAX_GRID_SPACING {
            return Err(Error::InvalidSpacing(self.grid_spacing));
        }
        if 180 % self.grid_spacing != 0 || 360 % self.grid_spacing != 0 {
            warn!(
                grid_spacing = self.grid_spacing,
                "Grid spacing does not evenly divide the globe; grid dimensions will be truncated"
            );
        }

        if self.buffer_capacity == 0 {
            return Err(Error::InvalidBufferCapacity(self.buffer_capacity));
        }

        let initiative = match (self.simulation_initiative, self.presentation_initiative) {
            (true, true) => return Err(Error::ConflictingInitiative),
            (true, false) => Initiative::SimulationDrives,
            (false, true) => Initiative::PresentationDrives,
            (false, false) => Initiative::MasterControl,
        };

        if self.idle_poll_ms == 0 {
            return Err(Error::Validation(
                "Idle poll interval must be at least 1 ms".to_string(),
            ));
        }

        Ok(RunConfig {
            buffer_capacity: self.buffer_capacity,
            initiative,
            threading: Threading::new(self.simulation_threaded, self.presentation_threaded),
            grid_spacing: self.grid_spacing,
            timestep_minutes: clamp_timestep(self.timestep_minutes),
            refresh_rate: Duration::from_millis(self.refresh_rate_ms),
            idle_poll: Duration::from_millis(self.idle_poll_ms),
            step_limit: self.step_limit,
        })
    }
}

/// Clamp a timestep into one minute .. one day.
pub fn clamp_timestep(minutes: u32) -> u32 {
    minutes.clamp(1, MINUTES_PER_DAY)
}

/// Validated configuration, immutable for the lifetime of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub buffer_capacity: usize,
    pub initiative: Initiative,
    pub threading: Threading,
    pub grid_spacing: u32,
    pub timestep_minutes: u32,
    pub refresh_rate: Duration,
    pub idle_poll: Duration,
    pub step_limit: Option<u64>,
}

impl RunConfig {
    /// Build a config for a given topology, otherwise using default settings.
    pub fn for_topology(initiative: Initiative, threading: Threading) -> Self {
        Self {
            initiative,
            threading,
            ..Self::default()
        }
    }

    pub fn with_step_limit(mut self, limit: u64) -> Self {
        self.step_limit = Some(limit);
        self
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        let defaults = Settings::default();
        Self {
            buffer_capacity: defaults.buffer_capacity,
            initiative: Initiative::default(),
            threading: Threading::default(),
            grid_spacing: defaults.grid_spacing,
            timestep_minutes: defaults.timestep_minutes,
            refresh_rate: Duration::from_millis(defaults.refresh_rate_ms),
            idle_poll: Duration::from_millis(defaults.idle_poll_ms),
            step_limit: defaults.step_limit,
        }
    }
}
