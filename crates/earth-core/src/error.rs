//! Error types for the simulation.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Grid spacing must be between 1 and 90 degrees, got {0}")]
    InvalidSpacing(u32),

    #[error("Buffer capacity must be at least 1, got {0}")]
    InvalidBufferCapacity(usize),

    #[error("Simulation and presentation cannot both take the initiative")]
    ConflictingInitiative,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),
}

impl Error {
    /// True for the errors raised while validating settings.
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Error::InvalidSpacing(_)
                | Error::InvalidBufferCapacity(_)
                | Error::ConflictingInitiative
                | Error::Validation(_)
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}
