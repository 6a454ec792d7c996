//! Ring-signal simulation core
//!
//! This module contains the whole coordination core: the round-robin turn
//! scheduler, the shared vehicle ledger, collision detection, the
//! per-signal controllers, and the driver that runs them. It has no
//! dependency on any particular frontend and can be driven from tests or
//! the CLI alike.

mod accident;
mod clock;
mod controller;
mod detector;
mod dispatch;
mod ledger;
mod scheduler;
mod signal;
mod types;
mod vehicle;
mod world;

// Re-export public types for external use
// These may not be used within this crate but are part of the public API
#[allow(unused_imports)]
pub use accident::{Accident, AccidentLog};
#[allow(unused_imports)]
pub use clock::SimClock;
#[allow(unused_imports)]
pub use controller::SignalController;
#[allow(unused_imports)]
pub use detector::check_rear_end;
#[allow(unused_imports)]
pub use dispatch::{run_dispatch, DispatchOutcome, DispatchPolicy, DispatchVehicle};
#[allow(unused_imports)]
pub use ledger::VehicleLedger;
#[allow(unused_imports)]
pub use scheduler::TurnScheduler;
#[allow(unused_imports)]
pub use signal::{Phase, SimSignal};
#[allow(unused_imports)]
pub use types::{
    transit_time, SimConfig, SignalId, VehicleId, DEFAULT_COLLISION_WINDOW, DEFAULT_GREEN_SECS,
    DEFAULT_RELEASE_PROBABILITY, DEFAULT_RUN_DURATION, DEFAULT_SIGNAL_COUNT, DEFAULT_TICK_SECS,
};
#[allow(unused_imports)]
pub use vehicle::{SimVehicle, VehicleStatus};
pub use world::{SimReport, SimWorld};
