//! Core types and utilities for the Heated Earth simulation.

pub mod config;
pub mod constants;
pub mod error;
pub mod types;

pub use config::*;
pub use error::{Error, Result};
pub use types::*;
