//! Dispatch-policy comparison: one junction, many contending vehicles
//!
//! A simpler, separate exercise from the ring: a batch of vehicles contend
//! for a single-slot junction, ordered either by arrival time or by static
//! signal priority, and the per-vehicle waiting times are measured. The
//! policy is a pluggable comparator over the batch, not a different
//! machine.

use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::clock::SimClock;
use super::types::VehicleId;

/// Ordering strategy for junction entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchPolicy {
    /// First-come, first-served: vehicles queue in arrival order
    ArrivalOrder,
    /// Static signal priority: lowest rank crosses first
    SignalPriority,
}

impl DispatchPolicy {
    /// Sort `vehicles` into their expected entry order under this policy
    pub fn order(&self, vehicles: &mut [DispatchVehicle]) {
        match self {
            DispatchPolicy::ArrivalOrder => {
                vehicles.sort_by(|a, b| a.arrival_offset.total_cmp(&b.arrival_offset));
            }
            DispatchPolicy::SignalPriority => vehicles.sort_by_key(|v| v.priority),
        }
    }
}

/// One vehicle contending for the junction
#[derive(Debug, Clone)]
pub struct DispatchVehicle {
    pub id: VehicleId,
    /// Seconds after batch start at which the vehicle arrives
    pub arrival_offset: f64,
    /// Static priority of the vehicle's signal, 1 being highest
    pub priority: u32,
}

/// Waiting times measured for one policy run
#[derive(Debug, Clone)]
pub struct DispatchOutcome {
    pub policy: DispatchPolicy,
    /// Seconds each vehicle waited, in junction entry order
    pub waits: Vec<(VehicleId, f64)>,
    pub mean_wait: f64,
}

/// Run one batch of vehicles through the junction under `policy`.
///
/// Each vehicle is a task contending for the junction lock. Arrival order
/// lets them race in after their offsets; priority order runs them one at
/// a time, ignoring offsets, so the rank fully decides entry. Crossing
/// times are drawn from `crossing_range` up front so every task owns its
/// duration.
pub fn run_dispatch(
    policy: DispatchPolicy,
    mut vehicles: Vec<DispatchVehicle>,
    crossing_range: (f64, f64),
    seed: Option<u64>,
) -> Result<DispatchOutcome> {
    policy.order(&mut vehicles);
    info!("--- Simulating {:?} ---", policy);
    for (position, vehicle) in vehicles.iter().enumerate() {
        info!(
            "  position {}: {} (priority {})",
            position + 1,
            vehicle.id,
            vehicle.priority
        );
    }

    let mut rng = seed.map(StdRng::seed_from_u64);
    let crossings: Vec<f64> = vehicles
        .iter()
        .map(|_| draw_crossing(&mut rng, crossing_range))
        .collect();

    let clock = SimClock::start();
    let junction = Arc::new(Mutex::new(()));
    let waits = Arc::new(Mutex::new(Vec::new()));

    match policy {
        DispatchPolicy::ArrivalOrder => {
            let mut handles = Vec::new();
            for (vehicle, crossing_secs) in vehicles.iter().cloned().zip(crossings) {
                let junction = Arc::clone(&junction);
                let waits = Arc::clone(&waits);
                let name = format!("dispatch-{}", vehicle.id);
                let handle = thread::Builder::new()
                    .name(name)
                    .spawn(move || cross(vehicle, crossing_secs, clock, &junction, &waits))
                    .context("failed to spawn a dispatch task")?;
                handles.push(handle);
            }
            for handle in handles {
                handle
                    .join()
                    .map_err(|_| anyhow!("a dispatch task panicked"))?;
            }
        }
        DispatchPolicy::SignalPriority => {
            // Rank decides entry: tasks run one at a time, already queued
            for (mut vehicle, crossing_secs) in vehicles.iter().cloned().zip(crossings) {
                vehicle.arrival_offset = 0.0;
                let junction = Arc::clone(&junction);
                let waits = Arc::clone(&waits);
                let name = format!("dispatch-{}", vehicle.id);
                thread::Builder::new()
                    .name(name)
                    .spawn(move || cross(vehicle, crossing_secs, clock, &junction, &waits))
                    .context("failed to spawn a dispatch task")?
                    .join()
                    .map_err(|_| anyhow!("a dispatch task panicked"))?;
            }
        }
    }

    let waits = waits.lock().unwrap_or_else(PoisonError::into_inner).clone();
    let mean_wait = if waits.is_empty() {
        0.0
    } else {
        waits.iter().map(|(_, w)| w).sum::<f64>() / waits.len() as f64
    };
    info!("Mean waiting time ({:?}): {:.2}s", policy, mean_wait);

    Ok(DispatchOutcome {
        policy,
        waits,
        mean_wait,
    })
}

/// One vehicle's trip: wait for arrival, take the junction, cross
fn cross(
    vehicle: DispatchVehicle,
    crossing_secs: f64,
    clock: SimClock,
    junction: &Mutex<()>,
    waits: &Mutex<Vec<(VehicleId, f64)>>,
) {
    let pending = vehicle.arrival_offset - clock.now();
    if pending > 0.0 {
        thread::sleep(Duration::from_secs_f64(pending));
    }

    let _slot = junction.lock().unwrap_or_else(PoisonError::into_inner);
    let wait = (clock.now() - vehicle.arrival_offset).max(0.0);
    info!("  {} entered the junction after waiting {:.3}s", vehicle.id, wait);
    waits
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push((vehicle.id, wait));
    thread::sleep(Duration::from_secs_f64(crossing_secs));
}

fn draw_crossing(rng: &mut Option<StdRng>, range: (f64, f64)) -> f64 {
    if range.0 >= range.1 {
        return range.0;
    }
    match rng {
        Some(rng) => rng.random_range(range.0..range.1),
        None => rand::rng().random_range(range.0..range.1),
    }
}
