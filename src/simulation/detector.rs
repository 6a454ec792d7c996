//! Rear-end collision detection between adjacent signals

use super::types::VehicleId;
use super::vehicle::SimVehicle;

/// Check a newly released vehicle against a street snapshot.
///
/// Only vehicles whose origin is the immediately preceding signal are
/// considered; signal 1 has no predecessor and can never rear-end anyone.
/// A snapshot vehicle conflicts when its time on the street falls inside
/// `[transit_gap, transit_gap + window]`, both bounds inclusive. The check
/// is pure and deterministic given the timestamps.
pub fn check_rear_end(
    new_vehicle: &SimVehicle,
    snapshot: &[SimVehicle],
    now: f64,
    window: f64,
) -> Vec<VehicleId> {
    let Some(preceding) = new_vehicle.origin.predecessor() else {
        return Vec::new();
    };

    // Fixed structural gap per adjacency, not a physical distance
    let transit_gap = 1.0 + (new_vehicle.origin.0 as f64 - preceding.0 as f64).abs();

    snapshot
        .iter()
        .filter(|v| v.origin == preceding)
        .filter(|v| {
            let delta = v.age(now);
            transit_gap <= delta && delta <= transit_gap + window
        })
        .map(|v| v.id)
        .collect()
}
