//! CLI harness for the Castaway survival simulation.

mod commands;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "cw",
    about = "Castaway: run and inspect the island survival simulation",
    version,
    propagate_version = true
)]
struct Cli {
    /// Log filter used when RUST_LOG is unset (e.g. "info", "cw_simulation=debug")
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a headless session on the island and report what happened
    Simulate {
        /// Seconds of game time to simulate (default: until the game ends)
        #[arg(long)]
        seconds: Option<f64>,

        /// Seconds per frame
        #[arg(long, default_value = "0.5")]
        dt: f64,

        /// RNG seed for deterministic simulation (overrides the config file)
        #[arg(short, long)]
        seed: Option<u64>,

        /// JSON configuration file (partial files are merged over defaults)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Let a scripted survivor drink, eat, sleep and talk
        #[arg(short, long)]
        autopilot: bool,

        /// Show all events (not just notable ones)
        #[arg(short, long)]
        verbose: bool,

        /// Print the final HUD snapshot as JSON instead of tables
        #[arg(long)]
        json: bool,
    },

    /// Validate a JSON configuration file
    Check {
        /// Configuration file to validate
        file: PathBuf,
    },

    /// Print the default configuration as JSON
    Config {
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let result = match cli.command {
        Commands::Simulate {
            seconds,
            dt,
            seed,
            config,
            autopilot,
            verbose,
            json,
        } => commands::simulate::run(&commands::simulate::Options {
            seconds,
            dt,
            seed,
            config,
            autopilot,
            verbose,
            json,
        }),
        Commands::Check { file } => commands::check::run(&file),
        Commands::Config { output } => commands::config::run(output.as_deref()),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
