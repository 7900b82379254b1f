//! Grid simulation engine.
//!
//! This module implements heat transport over a longitude/latitude grid:
//! per-cell trapezoid geometry, solar heating against a moving sub-solar
//! longitude, and neighbour diffusion with pole-crossing topology.

pub mod cell;
pub mod grid;
pub mod state;
pub mod stepper;

pub use cell::Cell;
pub use grid::{Grid, Neighbors};
pub use state::SimulationState;
pub use stepper::{sun_longitude_at, Stepper};
