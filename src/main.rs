use anyhow::Result;
use clap::Parser;
use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use signal_ring::simulation::{
    self, run_dispatch, DispatchPolicy, DispatchVehicle, SignalId, SimConfig, SimWorld, VehicleId,
};

#[derive(Parser)]
#[command(name = "signal_ring")]
#[command(about = "Round-robin ring of traffic signals with collision detection")]
struct Cli {
    /// Number of interlinked signals in the ring
    #[arg(long, default_value_t = simulation::DEFAULT_SIGNAL_COUNT)]
    signals: u32,

    /// Total run duration in seconds
    #[arg(long, default_value_t = simulation::DEFAULT_RUN_DURATION)]
    duration: f64,

    /// Seconds each signal stays green
    #[arg(long, default_value_t = simulation::DEFAULT_GREEN_SECS)]
    green: f64,

    /// Seconds between release attempts during a green phase
    #[arg(long, default_value_t = simulation::DEFAULT_TICK_SECS)]
    tick: f64,

    /// Probability of releasing a vehicle on each tick (0.0 to 1.0)
    #[arg(long, default_value_t = simulation::DEFAULT_RELEASE_PROBABILITY)]
    probability: f64,

    /// Extra seconds of overlap that count as a collision
    #[arg(long, default_value_t = simulation::DEFAULT_COLLISION_WINDOW)]
    window: f64,

    /// Seed for reproducible random draws
    #[arg(long)]
    seed: Option<u64>,

    /// Run the dispatch-policy comparison instead of the ring simulation
    #[arg(long)]
    compare_dispatch: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    if cli.compare_dispatch {
        return run_dispatch_comparison(cli.signals, cli.seed);
    }

    let config = SimConfig {
        signal_count: cli.signals,
        run_duration: cli.duration,
        green_secs: cli.green,
        tick_secs: cli.tick,
        release_probability: cli.probability,
        collision_window: cli.window,
        seed: cli.seed,
    };
    SimWorld::new(config).run()?;
    Ok(())
}

/// Compare FCFS against static-priority dispatch over one random batch.
///
/// Each signal gets a random load and arrival delays; the priority rank
/// comes from sorting the signals by their drawn release probability, so
/// the busiest signal ranks first. Both policies replay the same batch.
fn run_dispatch_comparison(signal_count: u32, seed: Option<u64>) -> Result<()> {
    let mut rng = seed.map(StdRng::seed_from_u64);

    let mut loads: Vec<(SignalId, f64, u32)> = (1..=signal_count)
        .map(|raw_id| {
            let probability = draw(&mut rng, 0.0..1.0);
            let cars = draw(&mut rng, 0.0..4.0) as u32;
            (SignalId(raw_id), probability, cars)
        })
        .collect();
    loads.sort_by(|a, b| b.1.total_cmp(&a.1));

    info!("Initial signal setup:");
    let mut vehicles = Vec::new();
    for (rank, (signal, probability, cars)) in loads.iter().enumerate() {
        let priority = rank as u32 + 1;
        info!(
            "  {}: probability {:.1}%, {} cars, priority {}",
            signal,
            probability * 100.0,
            cars,
            priority
        );
        for seq in 1..=*cars {
            vehicles.push(DispatchVehicle {
                id: VehicleId {
                    seq,
                    signal: *signal,
                },
                arrival_offset: draw(&mut rng, 0.0..3.0),
                priority,
            });
        }
    }

    let fcfs = run_dispatch(
        DispatchPolicy::ArrivalOrder,
        vehicles.clone(),
        (1.0, 2.0),
        seed,
    )?;
    let priority = run_dispatch(DispatchPolicy::SignalPriority, vehicles, (1.0, 2.0), seed)?;
    info!(
        "Mean waits: {:.2}s under arrival order vs {:.2}s under priority",
        fcfs.mean_wait, priority.mean_wait
    );
    Ok(())
}

/// Random draw in `range`, seeded when a seed was supplied
fn draw(rng: &mut Option<StdRng>, range: std::ops::Range<f64>) -> f64 {
    match rng {
        Some(rng) => rng.random_range(range),
        None => rand::rng().random_range(range),
    }
}
