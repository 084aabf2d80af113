#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays a Dice Defence session headlessly.

mod autopilot;
mod config;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use dice_defence_world::{query, World};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::autopilot::Outcome;

/// Plays a Dice Defence session with a simple autopilot.
#[derive(Parser, Debug)]
#[command(name = "dice-defence")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// TOML file with session and autopilot settings
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seed for board generation and every random draw
    #[arg(short, long)]
    seed: Option<u64>,

    /// Number of tiles on the generated board
    #[arg(long)]
    board_size: Option<usize>,

    /// Stop after this many waves were cleared
    #[arg(long)]
    max_waves: Option<u32>,
}

/// Entry point for the Dice Defence command-line interface.
fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let mut config = config::load(args.config.as_deref())?;
    if let Some(seed) = args.seed {
        config.session.seed = seed;
    }
    if let Some(board_size) = args.board_size {
        config.session.board_size = board_size;
    }
    if args.max_waves.is_some() {
        config.autopilot.max_waves = args.max_waves;
    }
    config::validate(&config)?;

    info!(
        seed = config.session.seed,
        board_size = config.session.board_size,
        "starting session"
    );
    let mut world = World::new(config.session);
    for line in query::log_lines(&world) {
        println!("{line}");
    }

    let summary = autopilot::run(&mut world, &config.autopilot)?;

    println!();
    for line in query::log_lines(&world) {
        println!("{line}");
    }
    println!();
    match summary.outcome {
        Outcome::BaseDestroyed { wave } => println!("The base fell during wave {wave}."),
        Outcome::WaveLimit => println!("Stopped after the requested number of waves."),
        Outcome::StepLimit => println!("Stopped after {} steps.", summary.steps),
    }
    println!(
        "Rolls: {}  Waves cleared: {}  Enemies defeated: {}  Weapons placed: {}  Base health: {}",
        summary.rolls,
        summary.waves_cleared,
        summary.enemies_defeated,
        summary.weapons_placed,
        summary.base_health
    );
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
