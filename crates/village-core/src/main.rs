//! Village Economy Simulation
//!
//! Headless runner: builds the reference village, advances it for a number
//! of ticks and logs periodic market summaries.

use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use village_core::config::DEFAULT_CONFIG_PATH;
use village_core::output::StatsCollector;
use village_core::{SimConfig, Simulation, TickPacer};

/// Command line arguments for the simulation
#[derive(Parser, Debug)]
#[command(name = "village_sim")]
#[command(about = "A fixed-tick village economy simulation")]
struct Args {
    /// Random seed for reproducibility (defaults to the configured seed)
    #[arg(long)]
    seed: Option<u64>,

    /// Number of ticks to simulate
    #[arg(long, default_value_t = 1000)]
    ticks: u64,

    /// TOML configuration file (defaults to village.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Interval between summary log lines (in ticks)
    #[arg(long, default_value_t = 100)]
    summary_interval: u64,

    /// Pace ticks at the configured real-time rate
    #[arg(long)]
    realtime: bool,

    /// Print the final world snapshot as JSON
    #[arg(long)]
    snapshot: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => SimConfig::load_or_default(path),
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
            SimConfig::load_or_default(DEFAULT_CONFIG_PATH)
        }
        None => SimConfig::default(),
    };
    let seed = args.seed.unwrap_or(config.simulation.seed);

    info!(seed, ticks = args.ticks, realtime = args.realtime, "starting village simulation");

    let mut pacer = TickPacer::from_config(&config.simulation);
    let mut sim = Simulation::new(config, seed);

    if args.realtime {
        pacer.frame();
        while sim.tick_count() < args.ticks {
            let due = pacer.frame();
            for _ in 0..due {
                if sim.tick_count() >= args.ticks {
                    break;
                }
                step(&mut sim, args.summary_interval);
            }
            std::thread::sleep(pacer.until_next_tick());
        }
    } else {
        for _ in 0..args.ticks {
            step(&mut sim, args.summary_interval);
        }
    }

    let stats = sim.stats();
    info!(
        ticks = stats.total_ticks,
        trades = stats.total_trades,
        settlements = stats.total_settlements,
        kills = stats.total_kills,
        births = stats.total_births,
        things = stats.final_things,
        "simulation complete"
    );

    if args.snapshot {
        let snapshot = sim.snapshot();
        match snapshot.to_json_pretty() {
            Ok(json) => println!("{}", json),
            Err(e) => warn!(error = %e, "could not serialize snapshot"),
        }
    }
}

fn step(sim: &mut Simulation, summary_interval: u64) {
    sim.tick();
    let tick = sim.tick_count();
    if summary_interval > 0 && tick % summary_interval == 0 {
        log_summary(sim.world().resource::<StatsCollector>());
    }
}

fn log_summary(collector: &StatsCollector) {
    let last = &collector.last;
    let debt: f32 = last.outstanding_debt.values().sum();
    info!(
        tick = last.tick,
        trades = last.trades,
        settlements = last.settlements,
        kills = last.kills,
        things = last.things,
        outstanding_debt = debt,
        total_trades = collector.total_trades,
        "summary"
    );
}
