//! Ricochet Runtime
//!
//! Headless binary: spawns a batch of bodies, runs the simulation for a
//! fixed number of ticks at a fixed timestep, and logs collision-state
//! transitions plus timing.

use anyhow::{Context, Result};
use ricochet_core::time::{SimulationTime, TICK_DT_SECONDS};
use ricochet_core::{BodyId, CollisionSink, SimConfig, Simulation};
use ricochet_metrics::TickTimer;

const RUN_TICKS: u64 = 600;

/// Stand-in for a renderer: a state change becomes a log line instead of
/// a material swap.
struct LogSink;

impl CollisionSink for LogSink {
    fn on_collision_change(&mut self, body: BodyId, colliding: bool) {
        if colliding {
            tracing::info!(%body, "contact");
        } else {
            tracing::info!(%body, "separated");
        }
    }
}

fn load_config() -> Result<SimConfig> {
    match std::env::args().nth(1) {
        Some(path) => {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("reading config file {path}"))?;
            let config: SimConfig =
                serde_json::from_str(&raw).with_context(|| format!("parsing config {path}"))?;
            tracing::info!(path = %path, "loaded config");
            Ok(config)
        }
        None => Ok(SimConfig::default()),
    }
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    tracing::info!("Ricochet v{}", ricochet_core::VERSION);

    let config = load_config()?;
    let mut sim = Simulation::new(config)?;
    let spawned = sim.spawn_batch();
    tracing::info!(
        bodies = spawned.len(),
        seed = sim.config().seed,
        "simulation ready"
    );

    let mut sink = LogSink;
    let mut clock = SimulationTime::new();
    let mut timer = TickTimer::new(60);

    while clock.tick_count() < RUN_TICKS {
        timer.begin();
        let summary = sim.step(TICK_DT_SECONDS, &mut sink)?;
        timer.end();
        clock.advance_tick();

        if clock.tick_count() % 60 == 0 {
            tracing::info!(
                tick = summary.tick,
                bodies = summary.bodies,
                wall_hits = summary.wall_hits,
                colliding = summary.colliding,
                tick_ms = timer.tick_time_ms(),
                last_ms = timer.last_tick_ms(),
                tps = timer.ticks_per_second(),
                "progress"
            );
        }
    }

    for (stage, elapsed) in sim.profiler().iter() {
        tracing::info!(stage = %stage, total_ms = elapsed.as_secs_f64() * 1000.0, "stage time");
    }
    tracing::info!(
        ticks = clock.tick_count(),
        simulated_s = clock.total_time().as_secs_f64(),
        "done"
    );

    Ok(())
}
