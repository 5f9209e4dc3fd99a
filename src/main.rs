//! FlameCafe CLI
//!
//! Replays scripted captures through the sampling pipeline and inspects
//! the folded-stack files it produces.

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;

use flamecafe::commands::{execute_inspect, execute_replay, execute_settings, ReplayArgs};
use flamecafe::sampler::MAX_STACK_DEPTH;
use flamecafe::utils::config::DEFAULT_TRACE_DIR;

/// FlameCafe - sampling call-stack profiler
#[derive(Parser, Debug)]
#[command(name = "flamecafe")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Replay a scripted capture and write its folded stacks
    Replay {
        /// Scenario JSON file
        #[arg(short, long)]
        scenario: PathBuf,

        /// Directory for capture files
        #[arg(short, long, default_value = DEFAULT_TRACE_DIR)]
        out_dir: PathBuf,

        /// Settings file (created with defaults if missing)
        #[arg(long, env = "FLAMECAFE_SETTINGS")]
        settings: Option<PathBuf>,
    },

    /// Validate and summarise a folded-stack capture file
    Inspect {
        /// Path to capture file
        #[arg(short, long)]
        file: PathBuf,

        /// Number of hottest stacks to list
        #[arg(long, default_value = "10")]
        top: usize,
    },

    /// Show the profiler settings
    Settings {
        /// Settings file
        #[arg(short, long, default_value = "flamecafe.json", env = "FLAMECAFE_SETTINGS")]
        file: PathBuf,

        /// Create the file with defaults if it does not exist
        #[arg(long)]
        init: bool,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    // Execute command
    match cli.command {
        Commands::Replay {
            scenario,
            out_dir,
            settings,
        } => {
            let written = execute_replay(ReplayArgs {
                scenario,
                out_dir,
                settings,
            })?;

            for path in written {
                println!("{}", path.display());
            }
        }

        Commands::Inspect { file, top } => {
            execute_inspect(&file, top)?;
        }

        Commands::Settings { file, init } => {
            execute_settings(&file, init)?;
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}

/// Display version information
fn display_version() {
    println!("FlameCafe v{}", env!("CARGO_PKG_VERSION"));
    println!("Max stack depth: {} frames", MAX_STACK_DEPTH);
    println!();
    println!("Sampling call-stack profiler with folded-stack output.");
}
