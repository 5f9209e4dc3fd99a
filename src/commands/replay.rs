//! Replay command implementation.
//!
//! The replay command:
//! 1. Loads the scenario and settings
//! 2. Runs every scripted frame through the capture pipeline
//! 3. Reports the capture files written

use crate::replay::{run_scenario, Scenario};
use crate::utils::config::{Settings, DEFAULT_TRACE_DIR};
use anyhow::{Context, Result};
use log::{info, warn};
use std::path::PathBuf;
use std::time::Instant;

/// Arguments for the replay command
#[derive(Debug, Clone)]
pub struct ReplayArgs {
    /// Scenario JSON file
    pub scenario: PathBuf,

    /// Directory receiving capture files
    pub out_dir: PathBuf,

    /// Settings file overriding the scenario's own settings
    pub settings: Option<PathBuf>,
}

impl Default for ReplayArgs {
    fn default() -> Self {
        Self {
            scenario: PathBuf::from("scenario.json"),
            out_dir: PathBuf::from(DEFAULT_TRACE_DIR),
            settings: None,
        }
    }
}

/// Execute the replay command, returning the capture files written
pub fn execute_replay(args: ReplayArgs) -> Result<Vec<PathBuf>> {
    let start_time = Instant::now();

    info!("Loading scenario: {}", args.scenario.display());
    let scenario = Scenario::load(&args.scenario)
        .with_context(|| format!("Failed to load scenario {}", args.scenario.display()))?;

    let settings = resolve_settings(&args, &scenario)?;
    info!(
        "Settings: {} frames per capture, {} us interval, enabled = {}",
        settings.frames_per_capture, settings.interval_micros, settings.enabled
    );

    let report = run_scenario(&scenario, settings, &args.out_dir);
    let skipped = report.samples_skipped();

    let mut written = Vec::new();
    for window in report.windows {
        match window.output {
            Ok(path) => {
                info!(
                    "✓ Window closed at frame {}: {}",
                    window.closed_at_frame,
                    window.stats.summary()
                );
                written.push(path);
            }
            Err(err) => warn!(
                "Window closed at frame {} was not written: {}",
                window.closed_at_frame, err
            ),
        }
    }

    if report.window_open_at_end {
        warn!("Scenario ended with a capture window still open; its samples were discarded");
    }

    info!(
        "Replayed {} frames, {} ticks ({} skipped) in {:.2}s",
        report.frames,
        report.ticks_fired,
        skipped,
        start_time.elapsed().as_secs_f64()
    );

    Ok(written)
}

/// Settings file wins over the scenario, which wins over defaults
fn resolve_settings(args: &ReplayArgs, scenario: &Scenario) -> Result<Settings> {
    match &args.settings {
        Some(path) => Settings::load_or_store_default(path)
            .with_context(|| format!("Failed to load settings {}", path.display())),
        None => Ok(scenario.settings.clone().unwrap_or_default()),
    }
}
