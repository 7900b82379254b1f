//! Producer/consumer coordination between the grid simulation and its
//! presentation.
//!
//! The two roles exchange immutable [`earth_sim::SimulationState`]s over a
//! bounded channel. Which role paces the run, and which roles get their
//! own thread, is fixed by the [`earth_core::RunConfig`].

pub mod channel;
pub mod consumer;
pub mod control;
pub mod coordinator;
pub mod handshake;
pub mod producer;
mod shared;

pub use channel::{BoundedChannel, Closed, OfferError, PollError};
pub use consumer::{Consumed, Consumer, Presenter};
pub use control::{RoleControl, RoleHandle, RoleState};
pub use coordinator::{ControlPath, Controls, Coordinator, Plan, RunSummary};
pub use handshake::Handshake;
pub use producer::{Produced, Producer};
