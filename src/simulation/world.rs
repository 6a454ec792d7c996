//! Simulation driver: thread lifecycle, deadline, drain, and report

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use log::{debug, info};

use super::accident::{Accident, AccidentLog};
use super::clock::SimClock;
use super::controller::SignalController;
use super::ledger::VehicleLedger;
use super::scheduler::TurnScheduler;
use super::signal::SimSignal;
use super::types::{SimConfig, SignalId};
use super::vehicle::SimVehicle;

/// Seconds between driver checks of the deadline and the stop flag
const DRIVER_POLL_SECS: f64 = 0.05;

/// Seconds between reaper scans for vehicles that finished crossing
const REAPER_SCAN_SECS: f64 = 0.05;

/// Final report of one simulation run
#[derive(Debug, Clone)]
pub struct SimReport {
    /// Per-signal statistics, in signal order
    pub signals: Vec<SimSignal>,
    /// The accident that ended the run, if any
    pub accident: Option<Accident>,
    /// Vehicles whose crossing was reaped as complete during the run,
    /// plus stragglers already overdue at drain time
    pub completed: u32,
    /// Vehicles still mid-crossing at stop time, forcibly removed
    pub forcibly_removed: Vec<SimVehicle>,
    /// Wall-clock seconds the run lasted
    pub elapsed: f64,
}

impl SimReport {
    /// Total vehicles released across all signals
    pub fn total_released(&self) -> u32 {
        self.signals.iter().map(|s| s.released).sum()
    }

    /// Emit the end-of-run summary through the log facade
    pub fn log_summary(&self) {
        info!("=== SIMULATION COMPLETE ===");
        info!("Elapsed time: {:.2}s", self.elapsed);
        for signal in &self.signals {
            info!(
                "  {}: {} released over {} green phases",
                signal.id, signal.released, signal.greens_served
            );
        }
        match &self.accident {
            Some(accident) => {
                let signals: Vec<String> =
                    accident.signals.iter().map(ToString::to_string).collect();
                let vehicles: Vec<String> =
                    accident.vehicles.iter().map(ToString::to_string).collect();
                info!("Signals in the accident: {}", signals.join(", "));
                info!("Vehicles in the accident: {}", vehicles.join(", "));
            }
            None => info!("No accident occurred."),
        }
    }
}

/// Owns one complete simulation run
pub struct SimWorld {
    config: SimConfig,
}

impl SimWorld {
    pub fn new(config: SimConfig) -> Self {
        Self { config }
    }

    /// Run the ring until the deadline or an accident, whichever first
    pub fn run(&self) -> Result<SimReport> {
        self.config.validate()?;

        let clock = SimClock::start();
        let scheduler = Arc::new(TurnScheduler::new(self.config.signal_count));
        let ledger = Arc::new(VehicleLedger::new());
        let accidents = Arc::new(AccidentLog::new());

        let mut controllers: Vec<JoinHandle<SimSignal>> = Vec::new();
        for raw_id in 1..=self.config.signal_count {
            let id = SignalId(raw_id);
            let controller = SignalController::new(
                id,
                self.config.clone(),
                clock,
                Arc::clone(&scheduler),
                Arc::clone(&ledger),
                Arc::clone(&accidents),
            );
            let spawned = thread::Builder::new()
                .name(format!("signal-{raw_id}"))
                .spawn(move || controller.run());
            match spawned {
                Ok(handle) => controllers.push(handle),
                Err(err) => {
                    // Unwind the threads already running before bailing out
                    scheduler.shutdown();
                    for handle in controllers {
                        let _ = handle.join();
                    }
                    return Err(err)
                        .with_context(|| format!("failed to spawn controller for signal {raw_id}"));
                }
            }
        }

        let reaper = {
            let ledger = Arc::clone(&ledger);
            let scheduler = Arc::clone(&scheduler);
            let reaper_scheduler = Arc::clone(&scheduler);
            let spawned = thread::Builder::new().name("reaper".into()).spawn(move || {
                let mut reaped = 0u32;
                while !reaper_scheduler.is_stopped() {
                    thread::sleep(Duration::from_secs_f64(REAPER_SCAN_SECS));
                    for vehicle in ledger.remove_expired(clock.now()) {
                        info!("  {} crossed the street completely.", vehicle.id);
                        reaped += 1;
                    }
                }
                reaped
            });
            match spawned {
                Ok(handle) => handle,
                Err(err) => {
                    scheduler.shutdown();
                    for handle in controllers {
                        let _ = handle.join();
                    }
                    return Err(err).context("failed to spawn the expiry reaper");
                }
            }
        };

        // The driver itself just watches the deadline; an accident raises
        // the stop flag from inside a controller
        while clock.now() < self.config.run_duration && !scheduler.is_stopped() {
            thread::sleep(Duration::from_secs_f64(DRIVER_POLL_SECS));
        }
        scheduler.shutdown();

        let mut signals = Vec::new();
        for handle in controllers {
            let signal = handle
                .join()
                .map_err(|_| anyhow!("a signal controller panicked"))?;
            signals.push(signal);
        }
        let mut completed = reaper
            .join()
            .map_err(|_| anyhow!("the expiry reaper panicked"))?;

        info!("Clearing the remaining street...");
        let now = clock.now();
        let mut forcibly_removed = Vec::new();
        for vehicle in ledger.drain() {
            if vehicle.completes_at > now {
                info!("  {} removed before completing its crossing.", vehicle.id);
                forcibly_removed.push(vehicle);
            } else {
                // Finished between the last reaper scan and the drain
                debug!("  {} had already finished crossing.", vehicle.id);
                completed += 1;
            }
        }

        let report = SimReport {
            signals,
            accident: accidents.get(),
            completed,
            forcibly_removed,
            elapsed: clock.now(),
        };
        report.log_summary();
        Ok(report)
    }
}
