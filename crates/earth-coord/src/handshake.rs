//! Single-slot request/completed signal between the two roles.

use parking_lot::{Condvar, Mutex};
use std::time::Duration;

/// The pacing role raises a request; the partner lowers it once the
/// requested work is done. Waits are bounded so callers can keep polling
/// their cancellation flags.
#[derive(Debug, Default)]
pub struct Handshake {
    requested: Mutex<bool>,
    changed: Condvar,
}

impl Handshake {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) {
        let mut requested = self.requested.lock();
        if !*requested {
            *requested = true;
            self.changed.notify_all();
        }
    }

    pub fn complete(&self) {
        let mut requested = self.requested.lock();
        if *requested {
            *requested = false;
            self.changed.notify_all();
        }
    }

    pub fn is_requested(&self) -> bool {
        *self.requested.lock()
    }

    /// Wait up to `timeout` for a request. Returns whether one is pending.
    pub fn wait_for_request(&self, timeout: Duration) -> bool {
        let mut requested = self.requested.lock();
        if !*requested {
            self.changed.wait_for(&mut requested, timeout);
        }
        *requested
    }

    /// Wait up to `timeout` for the pending request to be completed.
    /// Returns whether it was.
    pub fn wait_for_completion(&self, timeout: Duration) -> bool {
        let mut requested = self.requested.lock();
        if *requested {
            self.changed.wait_for(&mut requested, timeout);
        }
        !*requested
    }

    /// Wake every waiter without changing the flag
    pub fn wake_all(&self) {
        let _guard = self.requested.lock();
        self.changed.notify_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Instant;

    #[test]
    fn test_request_and_complete() {
        let handshake = Handshake::new();
        assert!(!handshake.is_requested());

        handshake.request();
        handshake.request();
        assert!(handshake.is_requested());

        handshake.complete();
        assert!(!handshake.is_requested());
    }

    #[test]
    fn test_waits_are_bounded() {
        let handshake = Handshake::new();
        let start = Instant::now();
        assert!(!handshake.wait_for_request(Duration::from_millis(20)));
        assert!(start.elapsed() >= Duration::from_millis(15));

        // Nothing pending, so completion is immediate
        assert!(handshake.wait_for_completion(Duration::from_secs(5)));
    }

    #[test]
    fn test_completion_wakes_requester() {
        let handshake = Arc::new(Handshake::new());
        handshake.request();

        let partner = Arc::clone(&handshake);
        let handle = thread::spawn(move || {
            assert!(partner.wait_for_request(Duration::from_secs(5)));
            thread::sleep(Duration::from_millis(10));
            partner.complete();
        });

        let start = Instant::now();
        while !handshake.wait_for_completion(Duration::from_millis(50)) {
            assert!(start.elapsed() < Duration::from_secs(5));
        }
        handle.join().unwrap();
    }
}
