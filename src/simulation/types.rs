//! Core types for the ring-signal simulation
//!
//! Standalone identifier and configuration types shared across modules.

use std::fmt;

use anyhow::{bail, Result};

/// Default number of interlinked signals in the ring
pub const DEFAULT_SIGNAL_COUNT: u32 = 4;

/// Default total run duration in seconds
pub const DEFAULT_RUN_DURATION: f64 = 30.0;

/// Default time each signal stays green, in seconds
pub const DEFAULT_GREEN_SECS: f64 = 3.0;

/// Default interval between release attempts, in seconds
pub const DEFAULT_TICK_SECS: f64 = 0.3;

/// Default probability of releasing a vehicle on each tick
pub const DEFAULT_RELEASE_PROBABILITY: f64 = 0.2;

/// Default extra window for adjacent-signal collisions, in seconds
pub const DEFAULT_COLLISION_WINDOW: f64 = 0.3;

/// A 1-based identifier for a signal in the ring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SignalId(pub u32);

impl SignalId {
    /// The next signal in cyclic order
    pub fn successor(self, signal_count: u32) -> SignalId {
        SignalId(self.0 % signal_count + 1)
    }

    /// The immediately preceding signal, if any
    ///
    /// Signal 1 opens the cycle and has no predecessor; adjacency never
    /// wraps around the ring.
    pub fn predecessor(self) -> Option<SignalId> {
        if self.0 > 1 {
            Some(SignalId(self.0 - 1))
        } else {
            None
        }
    }
}

impl fmt::Display for SignalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S{}", self.0)
    }
}

/// Identity of one released vehicle: per-signal sequence number plus the
/// origin signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VehicleId {
    pub seq: u32,
    pub signal: SignalId,
}

impl fmt::Display for VehicleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "car{}_s{}", self.seq, self.signal.0)
    }
}

/// Seconds a vehicle released at `origin` takes to clear the street.
///
/// Vehicles from lower-numbered signals are modeled with longer transit.
/// The formula is a fixed convention, not derived from distance.
pub fn transit_time(signal_count: u32, origin: SignalId) -> f64 {
    signal_count as f64 - origin.0 as f64 + 2.0
}

/// Immutable configuration for one simulation run
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Number of interlinked signals in the ring
    pub signal_count: u32,
    /// Total run duration in seconds
    pub run_duration: f64,
    /// Seconds each signal stays green
    pub green_secs: f64,
    /// Seconds between release attempts during a green phase
    pub tick_secs: f64,
    /// Probability of releasing a vehicle on each tick
    pub release_probability: f64,
    /// Extra seconds of overlap that count as a collision
    pub collision_window: f64,
    /// Optional seed for reproducible release draws
    pub seed: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            signal_count: DEFAULT_SIGNAL_COUNT,
            run_duration: DEFAULT_RUN_DURATION,
            green_secs: DEFAULT_GREEN_SECS,
            tick_secs: DEFAULT_TICK_SECS,
            release_probability: DEFAULT_RELEASE_PROBABILITY,
            collision_window: DEFAULT_COLLISION_WINDOW,
            seed: None,
        }
    }
}

impl SimConfig {
    /// Check that the configuration describes a runnable ring
    pub fn validate(&self) -> Result<()> {
        if self.signal_count < 2 {
            bail!(
                "at least two signals are required, got {}",
                self.signal_count
            );
        }
        if self.run_duration <= 0.0 {
            bail!("run duration must be positive, got {}", self.run_duration);
        }
        if self.green_secs <= 0.0 {
            bail!("green duration must be positive, got {}", self.green_secs);
        }
        if self.tick_secs <= 0.0 {
            bail!("tick interval must be positive, got {}", self.tick_secs);
        }
        if !(0.0..=1.0).contains(&self.release_probability) {
            bail!(
                "release probability must be between 0.0 and 1.0, got {}",
                self.release_probability
            );
        }
        if self.collision_window < 0.0 {
            bail!(
                "collision window must not be negative, got {}",
                self.collision_window
            );
        }
        Ok(())
    }
}
