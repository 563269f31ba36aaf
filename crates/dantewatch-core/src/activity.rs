// ── Consumer activity gate ──
//
// Records when a host last asked for the fleet. The collection loop
// only polls the Director while that request is within the window.

use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;

/// Deadline-based activity tracker. Starts inactive.
pub struct ActivityGate {
    window: Duration,
    deadline: watch::Sender<Option<Instant>>,
}

impl ActivityGate {
    pub fn new(window: Duration) -> Self {
        let (deadline, _) = watch::channel(None);
        Self { window, deadline }
    }

    /// Push the deadline out to now + window.
    pub fn touch(&self) {
        self.deadline.send_replace(Some(Instant::now() + self.window));
    }

    /// True while the last touch is younger than the window.
    pub fn is_active(&self) -> bool {
        self.deadline
            .borrow()
            .is_some_and(|deadline| Instant::now() < deadline)
    }

    /// Forget any previous touch.
    pub fn reset(&self) {
        self.deadline.send_replace(None);
    }
}
