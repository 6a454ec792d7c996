//! Shared collection of in-transit vehicles

use std::sync::{Mutex, MutexGuard, PoisonError};

use super::types::VehicleId;
use super::vehicle::{SimVehicle, VehicleStatus};

/// The shared, time-indexed set of vehicles currently crossing the street.
///
/// Every mutation happens under one internal mutex. Readers take a
/// point-in-time copy via [`snapshot`](VehicleLedger::snapshot), so the
/// lock is never held across a scan.
#[derive(Debug, Default)]
pub struct VehicleLedger {
    vehicles: Mutex<Vec<SimVehicle>>,
}

impl VehicleLedger {
    pub fn new() -> Self {
        Self {
            vehicles: Mutex::new(Vec::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<SimVehicle>> {
        self.vehicles.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert a newly released vehicle
    pub fn add(&self, vehicle: SimVehicle) {
        self.lock().push(vehicle);
    }

    /// Remove every entry matching `id`. Removing an absent id is a no-op.
    pub fn remove(&self, id: VehicleId) {
        self.lock().retain(|v| v.id != id);
    }

    /// A consistent point-in-time copy of the street
    pub fn snapshot(&self) -> Vec<SimVehicle> {
        self.lock().clone()
    }

    /// Remove and return the vehicles whose expected completion has passed,
    /// with their status transitioned to `Completed`
    pub fn remove_expired(&self, now: f64) -> Vec<SimVehicle> {
        let mut vehicles = self.lock();
        let mut done = Vec::new();
        let mut index = 0;
        while index < vehicles.len() {
            if vehicles[index].completes_at <= now {
                let mut vehicle = vehicles.swap_remove(index);
                vehicle.status = VehicleStatus::Completed;
                done.push(vehicle);
            } else {
                index += 1;
            }
        }
        done
    }

    /// Remove and return everything still on the street
    pub fn drain(&self) -> Vec<SimVehicle> {
        std::mem::take(&mut *self.lock())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
