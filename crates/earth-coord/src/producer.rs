//! The simulation role: steps the grid and feeds the channel.

use crate::channel::{Closed, OfferError};
use crate::consumer::Consumer;
use crate::control::RoleControl;
use crate::shared::Shared;
use earth_sim::{SimulationState, Stepper};
use std::sync::Arc;
use std::thread;
use tracing::{debug, trace};

/// Outcome of one production attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Produced {
    /// A state was enqueued
    Offered,
    /// The channel is full; the state is held and retried next time
    Backpressured,
    Paused,
    /// The step limit is reached and every state has been enqueued
    Exhausted,
    /// The run was cancelled or the channel closed
    Closed,
}

impl Produced {
    pub fn made_progress(&self) -> bool {
        matches!(self, Produced::Offered)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Produced::Exhausted | Produced::Closed)
    }
}

/// Wraps the stepper with the channel end and the role's control.
///
/// A step whose state could not be enqueued is kept and offered again
/// before any new step runs, so no state is ever dropped.
pub struct Producer {
    stepper: Stepper,
    pending: Option<SimulationState>,
    produced: u64,
    control: Arc<RoleControl>,
    shared: Arc<Shared>,
}

impl Producer {
    pub(crate) fn new(stepper: Stepper, control: Arc<RoleControl>, shared: Arc<Shared>) -> Self {
        Self {
            stepper,
            pending: None,
            produced: 0,
            control,
            shared,
        }
    }

    /// Steps run so far, including one still waiting for room
    pub fn produced(&self) -> u64 {
        self.produced
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn stepper(&self) -> &Stepper {
        &self.stepper
    }

    pub fn control(&self) -> &RoleControl {
        &self.control
    }

    /// Still allowed to feed the channel
    pub fn is_live(&self) -> bool {
        !self.control.is_cancelled() && !self.shared.channel.is_closed()
    }

    fn limit_reached(&self) -> bool {
        self.shared
            .config
            .step_limit
            .is_some_and(|limit| self.produced >= limit)
    }

    fn next_state(&mut self) -> Option<SimulationState> {
        if let Some(state) = self.pending.take() {
            return Some(state);
        }
        if self.limit_reached() {
            return None;
        }
        self.produced += 1;
        Some(self.stepper.step())
    }

    fn after_enqueue(&mut self) {
        if self.pending.is_none() && self.limit_reached() {
            self.exhaust();
        }
    }

    fn exhaust(&mut self) {
        debug!(produced = self.produced, "Simulation reached its step limit");
        self.shared.finish();
        self.control.finish();
    }

    /// Try to enqueue one state without blocking
    pub fn produce_once(&mut self) -> Produced {
        if !self.is_live() {
            return Produced::Closed;
        }
        if self.control.is_paused() {
            return Produced::Paused;
        }
        let Some(state) = self.next_state() else {
            self.exhaust();
            return Produced::Exhausted;
        };

        match self.shared.channel.offer(state) {
            Ok(()) => {
                trace!(produced = self.produced, "Offered state");
                self.after_enqueue();
                Produced::Offered
            }
            Err(OfferError::Full(state)) => {
                self.pending = Some(state);
                Produced::Backpressured
            }
            Err(OfferError::Closed(_)) => Produced::Closed,
        }
    }

    /// Enqueue one state, waiting for room
    pub fn produce_blocking(&mut self) -> Produced {
        if !self.is_live() {
            return Produced::Closed;
        }
        if self.control.is_paused() {
            return Produced::Paused;
        }
        let Some(state) = self.next_state() else {
            self.exhaust();
            return Produced::Exhausted;
        };

        match self.shared.channel.put(state) {
            Ok(()) => {
                trace!(produced = self.produced, "Put state");
                self.after_enqueue();
                Produced::Offered
            }
            Err(Closed) => Produced::Closed,
        }
    }

    /// Produce whenever there is room, idling otherwise
    pub(crate) fn run_opportunistic(&mut self) {
        debug!("Simulation polling opportunistically");
        loop {
            match self.produce_once() {
                Produced::Offered => thread::yield_now(),
                Produced::Backpressured | Produced::Paused => self.shared.idle(),
                Produced::Exhausted | Produced::Closed => break,
            }
        }
        self.control.finish();
    }

    /// Produce, then hand everything queued straight to the consumer
    pub(crate) fn drive_inline(&mut self, consumer: &mut Consumer) {
        debug!("Simulation driving inline presentation");
        while self.is_live() {
            let produced = self.produce_once();
            if produced.is_terminal() {
                break;
            }
            let presented = consumer.drain();
            if presented == 0 && !produced.made_progress() {
                self.shared.idle();
            }
        }
        consumer.finish_draining();
        self.control.finish();
    }

    /// Produce until the channel fills, then ask the consumer to drain it
    pub(crate) fn drive_with_handshake(&mut self) {
        debug!("Simulation driving presentation through handshake");
        let shared = Arc::clone(&self.shared);
        while self.is_live() {
            if shared.handshake.is_requested() {
                shared.handshake.wait_for_completion(shared.config.idle_poll);
                continue;
            }
            match self.produce_once() {
                Produced::Offered => {
                    if shared.channel.is_full() {
                        shared.handshake.request();
                    }
                }
                Produced::Backpressured => shared.handshake.request(),
                Produced::Paused => shared.idle(),
                Produced::Exhausted | Produced::Closed => break,
            }
        }
        self.control.finish();
    }

    /// Fill the channel each time the consumer asks for more
    pub(crate) fn respond_to_requests(&mut self) {
        debug!("Simulation responding to presentation requests");
        let shared = Arc::clone(&self.shared);
        while self.is_live() {
            if self.control.is_paused() {
                shared.idle();
                continue;
            }
            if !shared.handshake.wait_for_request(shared.config.idle_poll) {
                continue;
            }
            match self.produce_blocking() {
                Produced::Offered => {
                    if shared.channel.is_full() || !self.is_live() {
                        shared.handshake.complete();
                    }
                }
                Produced::Paused => shared.idle(),
                Produced::Backpressured => shared.handshake.complete(),
                Produced::Exhausted | Produced::Closed => {
                    shared.handshake.complete();
                    break;
                }
            }
        }
        self.control.finish();
    }
}
