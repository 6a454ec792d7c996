//! Monotonic timebase for the simulation

use std::time::Instant;

/// Monotonic clock anchored at simulation start.
///
/// Every timestamp in the simulation is a seconds reading from one of
/// these, so comparisons across threads are always against the same
/// origin.
#[derive(Debug, Clone, Copy)]
pub struct SimClock {
    origin: Instant,
}

impl SimClock {
    /// Start a new clock at the current instant
    pub fn start() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    /// Seconds elapsed since the clock was started
    pub fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}
