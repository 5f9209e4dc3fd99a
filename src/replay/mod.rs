//! Deterministic replay of the capture pipeline without a live host.
//!
//! The host collaborators (timer, sampled thread, memory, symbols) are
//! replaced by scripted stand-ins so a whole capture, from trigger to
//! exported file, can be reproduced from a JSON scenario.

pub mod memory;
pub mod scenario;
pub mod timer;

// Re-export main types
pub use memory::{MemoryImage, MemoryRegion};
pub use scenario::{Scenario, ScriptedFrame};
pub use timer::{ManualTimer, ScriptedThread};

use crate::aggregator::{SampleAggregator, WindowStats};
use crate::capture::{CaptureController, CaptureState, FrameAction};
use crate::output::Exporter;
use crate::sampler::{FrameMemory, Sampler};
use crate::utils::config::Settings;
use crate::utils::error::OutputError;
use log::{debug, info};
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::Arc;

/// A capture window closed during a replay
#[derive(Debug)]
pub struct WindowReport {
    /// Index of the frame whose boundary closed the window
    pub closed_at_frame: usize,
    pub stats: WindowStats,
    pub output: Result<PathBuf, OutputError>,
}

/// What happened during a replay
#[derive(Debug, Default)]
pub struct ReplayReport {
    pub frames: usize,
    pub ticks_fired: usize,
    pub windows: Vec<WindowReport>,

    /// The script ended with a window still armed or capturing
    pub window_open_at_end: bool,
}

impl ReplayReport {
    /// Ticks that ran but produced no sample
    pub fn samples_skipped(&self) -> usize {
        let recorded: u64 = self.windows.iter().map(|w| w.stats.total_samples).sum();
        self.ticks_fired.saturating_sub(recorded as usize)
    }
}

/// Replay `scenario` with `settings`, exporting windows into `out_dir`
pub fn run_scenario(
    scenario: &Scenario,
    settings: Settings,
    out_dir: impl Into<PathBuf>,
) -> ReplayReport {
    let thread = Arc::new(ScriptedThread::new());
    let memory: Arc<dyn FrameMemory> = Arc::new(scenario.memory_image());
    let aggregator = Arc::new(Mutex::new(SampleAggregator::new()));
    let sampler = Arc::new(Sampler::new(Arc::clone(&thread) as _, memory, aggregator));

    let exporter = Exporter::new(out_dir, Arc::new(scenario.symbol_table()));
    let timer = ManualTimer::new();
    let mut controller =
        CaptureController::new(settings.shared(), sampler, timer.clone(), exporter);
    let trigger = controller.trigger_handle();

    info!(
        "Replaying {} frames ({} scripted ticks)",
        scenario.frames.len(),
        scenario.tick_count()
    );

    let mut report = ReplayReport::default();

    for (index, frame) in scenario.frames.iter().enumerate() {
        if frame.trigger && !trigger.activate() {
            debug!("Frame {}: trigger ignored", index);
        }

        for &stack_pointer in &frame.ticks {
            thread.set_stack_pointer(stack_pointer);
            if timer.fire() {
                report.ticks_fired += 1;
            }
        }

        if let FrameAction::Closed { stats, output } = controller.on_frame_boundary() {
            report.windows.push(WindowReport {
                closed_at_frame: index,
                stats,
                output,
            });
        }

        report.frames += 1;
    }

    report.window_open_at_end = controller.state() != CaptureState::Idle;
    report
}
