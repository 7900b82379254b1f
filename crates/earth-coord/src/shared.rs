use crate::channel::BoundedChannel;
use crate::handshake::Handshake;
use earth_core::RunConfig;
use earth_sim::SimulationState;
use std::thread;
use tracing::debug;

/// State both roles see for the lifetime of a run
#[derive(Debug)]
pub(crate) struct Shared {
    pub(crate) channel: BoundedChannel<SimulationState>,
    pub(crate) handshake: Handshake,
    pub(crate) config: RunConfig,
}

impl Shared {
    pub(crate) fn new(config: RunConfig) -> Self {
        Self {
            channel: BoundedChannel::new(config.buffer_capacity),
            handshake: Handshake::new(),
            config,
        }
    }

    /// Back off before the next poll
    pub(crate) fn idle(&self) {
        thread::sleep(self.config.idle_poll);
    }

    /// No more states will be produced. Queued states stay deliverable.
    pub(crate) fn finish(&self) {
        self.channel.close();
        self.handshake.wake_all();
    }

    /// Tear the run down: close, discard queued states and wake every waiter.
    pub(crate) fn shutdown(&self) {
        self.channel.close();
        let discarded = self.channel.clear();
        self.handshake.wake_all();
        debug!(discarded, "Shut down hand-off channel");
    }
}
