//! Signal controller: the green-phase release loop

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use log::{info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::accident::AccidentLog;
use super::clock::SimClock;
use super::detector::check_rear_end;
use super::ledger::VehicleLedger;
use super::scheduler::TurnScheduler;
use super::signal::{Phase, SimSignal};
use super::types::{transit_time, SimConfig, SignalId};
use super::vehicle::SimVehicle;

/// How a green phase ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PhaseOutcome {
    /// The phase duration ran out, or stop arrived mid-phase
    Elapsed,
    /// A collision was detected; the controller terminates without handoff
    Collision,
}

/// Runs one signal's waiting/green cycle on its own thread.
///
/// The controller owns its signal's private counters outright; the shared
/// pieces it touches are the scheduler, the ledger, and the accident log.
pub struct SignalController {
    config: SimConfig,
    clock: SimClock,
    scheduler: Arc<TurnScheduler>,
    ledger: Arc<VehicleLedger>,
    accidents: Arc<AccidentLog>,
    signal: SimSignal,
    rng: Option<StdRng>,
}

impl SignalController {
    pub fn new(
        id: SignalId,
        config: SimConfig,
        clock: SimClock,
        scheduler: Arc<TurnScheduler>,
        ledger: Arc<VehicleLedger>,
        accidents: Arc<AccidentLog>,
    ) -> Self {
        // Each signal gets its own stream so seeded runs stay reproducible
        let rng = config
            .seed
            .map(|seed| StdRng::seed_from_u64(seed.wrapping_add(id.0 as u64)));
        Self {
            config,
            clock,
            scheduler,
            ledger,
            accidents,
            signal: SimSignal::new(id),
            rng,
        }
    }

    fn id(&self) -> SignalId {
        self.signal.id
    }

    /// Bernoulli draw for one tick, using the seeded RNG if available
    fn draw_release(&mut self) -> bool {
        let probability = self.config.release_probability;
        match &mut self.rng {
            Some(rng) => rng.random_bool(probability),
            None => rand::rng().random_bool(probability),
        }
    }

    /// Drive the signal until global stop or a collision.
    ///
    /// Returns the signal's private statistics for the final report.
    pub fn run(mut self) -> SimSignal {
        while self.scheduler.acquire_turn(self.id()) {
            if self.green_phase() == PhaseOutcome::Collision {
                // Terminal: no handoff after a collision
                break;
            }
            self.scheduler.release_turn(self.id());
        }
        self.signal.phase = Phase::Red;
        self.signal
    }

    /// One full green phase: tick, draw, release, check
    fn green_phase(&mut self) -> PhaseOutcome {
        self.signal.phase = Phase::Green;
        self.signal.greens_served += 1;
        info!("[{}] GREEN ({:.0}s)", self.id(), self.config.green_secs);

        let phase_start = self.clock.now();
        let phase_end = phase_start + self.config.green_secs;

        while self.clock.now() < phase_end && !self.scheduler.is_stopped() {
            thread::sleep(Duration::from_secs_f64(self.config.tick_secs));
            let now = self.clock.now();
            if now > phase_end {
                break;
            }
            if self.draw_release()
                && self.release_vehicle(now, phase_start) == PhaseOutcome::Collision
            {
                return PhaseOutcome::Collision;
            }
        }

        self.signal.phase = Phase::Red;
        info!("[{}] RED", self.id());
        PhaseOutcome::Elapsed
    }

    /// Release one vehicle, then run the adjacency collision check
    fn release_vehicle(&mut self, now: f64, phase_start: f64) -> PhaseOutcome {
        let vehicle_id = self.signal.record_release(now);
        let completes_at = now + transit_time(self.config.signal_count, self.id());
        let vehicle = SimVehicle::new(vehicle_id, self.id(), now, completes_at);

        self.ledger.add(vehicle.clone());

        // Snapshot once: the street report and the collision check both
        // read the same point-in-time copy
        let street = self.ledger.snapshot();
        let states: Vec<String> = street
            .iter()
            .map(|v| format!("({}, {:.2}s)", v.id, v.age(now)))
            .collect();
        info!(
            "{} released {} {:.2}s into green. Street: {}",
            self.id(),
            vehicle_id,
            now - phase_start,
            states.join(" ")
        );

        let mut involved = check_rear_end(&vehicle, &street, now, self.config.collision_window);
        if involved.is_empty() {
            return PhaseOutcome::Elapsed;
        }
        involved.push(vehicle_id);

        if let Some(preceding) = self.id().predecessor() {
            if self.accidents.record([preceding, self.id()], involved.clone()) {
                let names: Vec<String> = involved.iter().map(ToString::to_string).collect();
                warn!("ACCIDENT! Signals involved: {}, {}", preceding, self.id());
                warn!("  Vehicles involved: {}", names.join(", "));
            }
            self.scheduler.shutdown();
        }
        PhaseOutcome::Collision
    }
}
