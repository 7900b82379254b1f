//! The presentation role: drains the channel into a presenter.

use crate::channel::{Closed, PollError};
use crate::control::RoleControl;
use crate::producer::Producer;
use crate::shared::Shared;
use earth_sim::SimulationState;
use std::fmt;
use std::sync::Arc;
use std::thread;
use tracing::{debug, trace};

/// Receives each simulation state, in production order.
pub trait Presenter: Send {
    fn present(&mut self, state: SimulationState);
}

impl<F> Presenter for F
where
    F: FnMut(SimulationState) + Send,
{
    fn present(&mut self, state: SimulationState) {
        self(state)
    }
}

/// Outcome of one consumption attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Consumed {
    Presented,
    Empty,
    Paused,
    /// Cancelled, or the channel is closed and drained
    Closed,
}

pub struct Consumer {
    presenter: Box<dyn Presenter>,
    presented: u64,
    control: Arc<RoleControl>,
    shared: Arc<Shared>,
}

impl Consumer {
    pub(crate) fn new(
        presenter: Box<dyn Presenter>,
        control: Arc<RoleControl>,
        shared: Arc<Shared>,
    ) -> Self {
        Self {
            presenter,
            presented: 0,
            control,
            shared,
        }
    }

    pub fn presented(&self) -> u64 {
        self.presented
    }

    pub fn control(&self) -> &RoleControl {
        &self.control
    }

    /// Nothing left to present
    pub fn is_done(&self) -> bool {
        self.control.is_cancelled()
            || (self.shared.channel.is_closed() && self.shared.channel.is_empty())
    }

    fn present(&mut self, state: SimulationState) {
        self.presented += 1;
        trace!(
            presented = self.presented,
            running_minutes = state.running_minutes(),
            "Presenting state"
        );
        self.presenter.present(state);
    }

    /// Present one state if one is queued
    pub fn consume_once(&mut self) -> Consumed {
        if self.control.is_cancelled() {
            return Consumed::Closed;
        }
        if self.control.is_paused() {
            return Consumed::Paused;
        }
        match self.shared.channel.poll() {
            Ok(state) => {
                self.present(state);
                Consumed::Presented
            }
            Err(PollError::Empty) => Consumed::Empty,
            Err(PollError::Closed) => Consumed::Closed,
        }
    }

    /// Present one state, waiting for it
    pub fn consume_blocking(&mut self) -> Consumed {
        if self.control.is_cancelled() {
            return Consumed::Closed;
        }
        if self.control.is_paused() {
            return Consumed::Paused;
        }
        match self.shared.channel.take() {
            Ok(state) => {
                self.present(state);
                Consumed::Presented
            }
            Err(Closed) => Consumed::Closed,
        }
    }

    /// Present everything currently queued. Returns how many were presented.
    pub fn drain(&mut self) -> u64 {
        let mut count = 0;
        while self.consume_once() == Consumed::Presented {
            count += 1;
        }
        count
    }

    /// Keep draining until the channel is closed and empty
    pub(crate) fn finish_draining(&mut self) {
        while !self.is_done() {
            if self.drain() == 0 {
                self.shared.idle();
            }
        }
    }

    /// Present whenever something is queued, idling otherwise
    pub(crate) fn run_opportunistic(&mut self) {
        debug!("Presentation polling opportunistically");
        loop {
            match self.consume_once() {
                Consumed::Presented => thread::yield_now(),
                Consumed::Empty | Consumed::Paused => self.shared.idle(),
                Consumed::Closed => break,
            }
        }
        self.control.finish();
    }

    /// Ask the producer for a state each time the channel runs dry
    pub(crate) fn drive_inline(&mut self, producer: &mut Producer) {
        debug!("Presentation driving inline simulation");
        while !self.is_done() {
            if self.control.is_paused() {
                self.shared.idle();
                continue;
            }
            let produced = producer.produce_once();
            let presented = self.drain();
            if presented == 0 && !produced.made_progress() {
                self.shared.idle();
            }
        }
        producer.control().finish();
        self.control.finish();
    }

    /// Request a refill whenever the channel is empty
    pub(crate) fn drive_with_handshake(&mut self) {
        debug!("Presentation driving simulation through handshake");
        let shared = Arc::clone(&self.shared);
        loop {
            match self.consume_once() {
                Consumed::Presented => {}
                Consumed::Empty => {
                    shared.handshake.request();
                    shared.handshake.wait_for_completion(shared.config.idle_poll);
                }
                Consumed::Paused => shared.idle(),
                Consumed::Closed => break,
            }
        }
        self.control.finish();
    }

    /// Drain the channel each time the producer asks
    pub(crate) fn respond_to_requests(&mut self) {
        debug!("Presentation responding to simulation requests");
        let shared = Arc::clone(&self.shared);
        while !self.is_done() {
            if self.control.is_paused() {
                shared.idle();
                continue;
            }
            let closed = shared.channel.is_closed();
            if !closed && !shared.handshake.wait_for_request(shared.config.idle_poll) {
                continue;
            }
            if shared.channel.is_empty() {
                shared.handshake.complete();
                continue;
            }
            if self.consume_blocking() == Consumed::Closed {
                break;
            }
        }
        shared.handshake.complete();
        self.control.finish();
    }
}

impl fmt::Debug for Consumer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Consumer")
            .field("presented", &self.presented)
            .field("state", &self.control.state())
            .finish_non_exhaustive()
    }
}
