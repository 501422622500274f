//! Lightweight wall-clock timing.
//!
//! Timers always measure; reporting goes through `tracing` at debug level so
//! it costs nothing unless a subscriber asks for it.

use std::time::Instant;

/// A simple timer that measures elapsed time.
pub struct Timer {
    label: &'static str,
    start: Instant,
}

impl Timer {
    /// Create and start a new timer with the given label.
    pub fn start(label: &'static str) -> Self {
        Self {
            label,
            start: Instant::now(),
        }
    }

    /// Seconds since the timer was started.
    pub fn elapsed_s(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }

    /// Stop the timer, log the elapsed time and return it in seconds.
    pub fn stop(self) -> f64 {
        let elapsed = self.elapsed_s();
        tracing::debug!(label = self.label, elapsed_s = elapsed, "timer stopped");
        elapsed
    }
}
