//! Per-signal bookkeeping

use super::types::{SignalId, VehicleId};

/// Right-of-way state of a signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Green,
    Red,
}

/// A signal in the ring and its private release statistics.
///
/// Owned exclusively by the signal's controller thread and handed back to
/// the driver at join time, so none of the counters need locking.
#[derive(Debug, Clone)]
pub struct SimSignal {
    pub id: SignalId,
    pub phase: Phase,
    /// Total vehicles released
    pub released: u32,
    /// Clock reading of every release, append-only
    pub release_times: Vec<f64>,
    /// Green phases actually served
    pub greens_served: u32,
    next_seq: u32,
}

impl SimSignal {
    pub fn new(id: SignalId) -> Self {
        Self {
            id,
            phase: Phase::Red,
            released: 0,
            release_times: Vec::new(),
            greens_served: 0,
            next_seq: 0,
        }
    }

    /// Record one successful release draw and mint the vehicle's identity.
    ///
    /// Sequence numbers are per-signal and strictly increasing.
    pub fn record_release(&mut self, now: f64) -> VehicleId {
        self.next_seq += 1;
        self.released += 1;
        self.release_times.push(now);
        VehicleId {
            seq: self.next_seq,
            signal: self.id,
        }
    }
}
