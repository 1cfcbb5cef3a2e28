//! Rewind Debugger - terminal replay for recorded sessions
//!
//! Loads a recorded session (a JSON array of records) or a built-in demo,
//! captures it into bounded logs and replays it with the original timing:
//! - Speed control and direct seeking
//! - Pause/resume from stdin while the replay runs
//! - A text timeline with position, progress and speed

mod commands;
mod config;
mod player;
mod session;
mod timeline;

use anyhow::{Context, Result};
use clap::Parser;
use config::DebuggerConfig;
use player::Player;
use rewind_recorder::ReplayScheduler;
use session::Selection;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

/// Replay recorded UI commands and events in the terminal
#[derive(Parser, Debug)]
#[command(name = "rewind-debugger")]
#[command(about = "Replay recorded UI commands and events in the terminal")]
#[command(version)]
struct Args {
    /// Recording file to open (JSON array of records); plays a demo if omitted
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Configuration file with [recording] and [replay] sections
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Playback speed multiplier
    #[arg(short, long)]
    speed: Option<f64>,

    /// Records kept per capture log
    #[arg(long)]
    capacity: Option<usize>,

    /// Record index to start from
    #[arg(long, allow_hyphen_values = true)]
    from: Option<i64>,

    /// Which records to replay
    #[arg(long, value_enum, default_value_t = Selection::All)]
    select: Selection,

    /// Accept playback commands on stdin
    #[arg(short, long)]
    interactive: bool,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    print_config: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match &args.config {
        Some(path) => DebuggerConfig::load(path)?,
        None => DebuggerConfig::default(),
    }
    .with_overrides(args.speed, args.capacity)
    .context("Invalid configuration")?;

    if args.print_config {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    let records = match &args.file {
        Some(path) => {
            tracing::info!("Opening recording: {}", path.display());
            session::read_records(path)?
        }
        None => {
            tracing::info!("No recording given, replaying the demo session");
            session::demo_records()
        }
    };

    let recorder = session::capture(records, config.recording.clone());
    let snapshot = session::snapshot(&recorder, args.select);
    if snapshot.is_empty() {
        tracing::warn!("Nothing to replay");
        return Ok(());
    }

    let scheduler = ReplayScheduler::new(snapshot, config.replay.clone());

    let runtime = runtime()?;

    runtime.block_on(async {
        let mut player = Player::new(scheduler, std::io::stdout());
        player.start(args.from);

        if args.interactive {
            println!("{}", commands::HELP);
            let input = BufReader::new(tokio::io::stdin()).lines();
            player.run_interactive(input).await;
        } else {
            player.run().await;
        }

        tracing::info!(
            emitted = player.emitted(),
            state = player.scheduler().state().label(),
            "Replay finished"
        );
    });

    Ok(())
}

/// Single-threaded runtime with timers. Stdin is read on the blocking pool,
/// so no IO driver is needed.
fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .context("Failed to start runtime")
}
