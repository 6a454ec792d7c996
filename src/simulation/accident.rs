//! Terminal accident record

use std::collections::BTreeSet;
use std::sync::{Mutex, PoisonError};

use super::types::{SignalId, VehicleId};

/// A detected collision: the implicated signals and vehicles
#[derive(Debug, Clone)]
pub struct Accident {
    /// Signal ids involved, in ascending order
    pub signals: BTreeSet<SignalId>,
    /// Vehicle ids judged to be in conflict, the newly released one last
    pub vehicles: Vec<VehicleId>,
}

/// Shared accident record. Once set it is terminal and never cleared.
#[derive(Debug, Default)]
pub struct AccidentLog {
    accident: Mutex<Option<Accident>>,
}

impl AccidentLog {
    pub fn new() -> Self {
        Self {
            accident: Mutex::new(None),
        }
    }

    /// Record a collision. The first writer wins; later reports are
    /// dropped. Returns `true` when this call set the record.
    pub fn record(&self, signals: [SignalId; 2], vehicles: Vec<VehicleId>) -> bool {
        let mut slot = self.accident.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.is_some() {
            return false;
        }
        *slot = Some(Accident {
            signals: signals.into_iter().collect(),
            vehicles,
        });
        true
    }

    /// The recorded accident, if any
    pub fn get(&self) -> Option<Accident> {
        self.accident
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn has_accident(&self) -> bool {
        self.accident
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}
