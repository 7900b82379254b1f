//! Start, pause, resume and cancel for each role.

use crate::shared::Shared;
use earth_core::Role;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RoleState {
    Idle = 0,
    Running = 1,
    Paused = 2,
    /// Terminal: cancelled by a caller, or finished on its own
    Cancelled = 3,
}

impl RoleState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => RoleState::Idle,
            1 => RoleState::Running,
            2 => RoleState::Paused,
            _ => RoleState::Cancelled,
        }
    }
}

#[derive(Debug, Default)]
struct Timing {
    started: Option<Instant>,
    stopped: Option<Instant>,
}

/// Lifecycle flags for one role, safe to flip from any thread.
///
/// Role loops check these between steps, so a pause or cancel takes
/// effect at the next step boundary.
#[derive(Debug)]
pub struct RoleControl {
    role: Role,
    state: AtomicU8,
    timing: Mutex<Timing>,
}

impl RoleControl {
    pub fn new(role: Role) -> Self {
        Self {
            role,
            state: AtomicU8::new(RoleState::Idle as u8),
            timing: Mutex::new(Timing::default()),
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn state(&self) -> RoleState {
        RoleState::from_u8(self.state.load(Ordering::Acquire))
    }

    fn transition(&self, from: RoleState, to: RoleState) -> bool {
        self.state
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Idle to Running. Returns false if the role was already started.
    pub fn start(&self) -> bool {
        if !self.transition(RoleState::Idle, RoleState::Running) {
            return false;
        }
        self.timing.lock().started = Some(Instant::now());
        debug!(role = %self.role, "Role started");
        true
    }

    /// Running to Paused. Pausing a paused role changes nothing.
    pub fn pause(&self) -> bool {
        let paused = self.transition(RoleState::Running, RoleState::Paused);
        if paused {
            debug!(role = %self.role, "Role paused");
        }
        paused
    }

    /// Paused to Running; a no-op in any other state
    pub fn resume(&self) -> bool {
        let resumed = self.transition(RoleState::Paused, RoleState::Running);
        if resumed {
            debug!(role = %self.role, "Role resumed");
        }
        resumed
    }

    /// Any state to Cancelled. Returns false if already cancelled.
    pub fn cancel(&self) -> bool {
        let cancelled = self.stop();
        if cancelled {
            debug!(role = %self.role, "Role cancelled");
        }
        cancelled
    }

    /// The role's loop ended on its own
    pub(crate) fn finish(&self) {
        if self.stop() {
            debug!(role = %self.role, "Role finished");
        }
    }

    fn stop(&self) -> bool {
        let previous = self.state.swap(RoleState::Cancelled as u8, Ordering::AcqRel);
        if RoleState::from_u8(previous) == RoleState::Cancelled {
            return false;
        }
        let mut timing = self.timing.lock();
        if timing.started.is_some() {
            timing.stopped = Some(Instant::now());
        }
        true
    }

    /// Started and not yet cancelled. A paused role is still running.
    pub fn is_running(&self) -> bool {
        matches!(self.state(), RoleState::Running | RoleState::Paused)
    }

    pub fn is_paused(&self) -> bool {
        self.state() == RoleState::Paused
    }

    pub fn is_cancelled(&self) -> bool {
        self.state() == RoleState::Cancelled
    }

    /// Wall time since start, frozen once the role stops
    pub fn elapsed_time(&self) -> Duration {
        let timing = self.timing.lock();
        match (timing.started, timing.stopped) {
            (Some(started), Some(stopped)) => stopped.duration_since(started),
            (Some(started), None) => started.elapsed(),
            _ => Duration::ZERO,
        }
    }
}

/// Cloneable control surface for one role of a running coordinator.
///
/// Cancelling either role tears the whole run down: the channel is closed
/// and emptied so a partner blocked on it wakes up.
#[derive(Debug, Clone)]
pub struct RoleHandle {
    control: Arc<RoleControl>,
    shared: Arc<Shared>,
}

impl RoleHandle {
    pub(crate) fn new(control: Arc<RoleControl>, shared: Arc<Shared>) -> Self {
        Self { control, shared }
    }

    pub fn role(&self) -> Role {
        self.control.role()
    }

    pub fn state(&self) -> RoleState {
        self.control.state()
    }

    pub fn start(&self) -> bool {
        self.control.start()
    }

    pub fn pause(&self) -> bool {
        self.control.pause()
    }

    pub fn resume(&self) -> bool {
        self.control.resume()
    }

    pub fn cancel(&self) -> bool {
        let cancelled = self.control.cancel();
        if cancelled {
            self.shared.shutdown();
        }
        cancelled
    }

    pub fn is_running(&self) -> bool {
        self.control.is_running()
    }

    pub fn is_paused(&self) -> bool {
        self.control.is_paused()
    }

    pub fn is_cancelled(&self) -> bool {
        self.control.is_cancelled()
    }

    pub fn elapsed_time(&self) -> Duration {
        self.control.elapsed_time()
    }
}
