//! Village Trade Simulation
//!
//! Runs a seeded village and writes every trade, gossip, and pickup to a
//! JSONL event log.

use anyhow::Context;
use clap::Parser;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use village_sim::events::types::EventType;
use village_sim::{EventLogger, SimConfig, Simulation};

/// Command line arguments for the simulation
#[derive(Parser, Debug)]
#[command(name = "village_sim")]
#[command(about = "Villagers trading surplus items with each other")]
struct Args {
    /// TOML configuration file (defaults to village.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Random seed for reproducibility
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Number of ticks to simulate
    #[arg(long, default_value_t = 2000)]
    ticks: u64,

    /// Number of villagers, overriding the configuration
    #[arg(long)]
    villagers: Option<usize>,

    /// Where to write the JSONL event log
    #[arg(long, default_value = "output/events.jsonl")]
    events: PathBuf,

    /// Print the default configuration as TOML and exit
    #[arg(long)]
    print_default_config: bool,
}

fn load_config(args: &Args) -> anyhow::Result<SimConfig> {
    let mut config = match &args.config {
        Some(path) => SimConfig::from_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => SimConfig::load_or_default(),
    };
    if let Some(villagers) = args.villagers {
        config.simulation.villager_count = villagers;
    }
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    if args.print_default_config {
        print!("{}", SimConfig::default().to_toml()?);
        return Ok(());
    }

    let config = load_config(&args)?;

    println!("Village Trade Simulation");
    println!("========================");
    println!("Seed: {}", args.seed);
    println!("Ticks: {}", args.ticks);
    println!("Event log: {}", args.events.display());
    println!();

    let mut sim = Simulation::new(&config, args.seed);
    let summary = sim.spawn_summary();
    print!("{}", summary);
    println!();

    let mut logger = EventLogger::new(&args.events)
        .with_context(|| format!("opening event log {}", args.events.display()))?;
    let items_before = sim.total_items();
    let mut counts: BTreeMap<String, u64> = BTreeMap::new();

    sim.run(args.ticks, |tick, events| -> anyhow::Result<()> {
        logger.log_batch(events).context("writing events")?;
        for event in events {
            *counts.entry(event_type_name(event.event_type)).or_insert(0) += 1;
        }
        if tick > 0 && tick % 500 == 0 {
            tracing::info!(tick, events = logger.event_count(), "progress");
        }
        Ok(())
    })?;
    logger.flush().context("flushing event log")?;

    let items_after = sim.total_items();
    tracing::info!(items_before, items_after, "item totals");

    println!();
    println!("Simulation complete. Ran {} ticks.", args.ticks);
    println!("Logged {} events:", logger.event_count());
    for (event_type, count) in &counts {
        println!("  {}: {}", event_type, count);
    }

    Ok(())
}

fn event_type_name(event_type: EventType) -> String {
    serde_json::to_value(event_type)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_else(|| format!("{:?}", event_type))
}
