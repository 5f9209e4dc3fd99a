//! Capture controller: opens and closes sampling windows.
//!
//! Two call sites share state here:
//! - the frame hook, on the main thread, once per presented frame
//! - the timer callback, on the timer's own context, at the sampling rate
//!
//! The window and the aggregator each sit behind a mutex. The frame hook
//! never holds a lock while cancelling the timer, so a tick blocked on the
//! aggregator cannot deadlock the cancel.

use super::host::{PeriodicTimer, TickCallback};
use super::state::{CaptureState, CaptureWindow, Transition};
use crate::aggregator::WindowStats;
use crate::output::Exporter;
use crate::sampler::Sampler;
use crate::utils::config::SharedSettings;
use crate::utils::error::OutputError;
use chrono::Local;
use log::{debug, info, warn};
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Outcome of one frame boundary
#[derive(Debug)]
pub enum FrameAction {
    /// No window open or armed
    Idle,
    /// The timer was started
    Started,
    /// A pending frame was consumed
    Countdown { remaining: u32 },
    /// The window was closed, drained and exported
    Closed {
        stats: WindowStats,
        output: Result<PathBuf, OutputError>,
    },
}

/// Arms capture windows from the trigger-combo callback.
///
/// Cheap to clone and safe to use from any thread.
#[derive(Clone)]
pub struct TriggerHandle {
    window: Arc<Mutex<CaptureWindow>>,
    settings: SharedSettings,
}

impl TriggerHandle {
    /// Arm (or re-arm) a window of `frames_per_capture` frames.
    ///
    /// Ignored while profiling is disabled; returns whether the window was armed.
    pub fn activate(&self) -> bool {
        let (enabled, frames) = {
            let settings = self.settings.read();
            (settings.enabled, settings.frames_per_capture)
        };

        if !enabled {
            debug!("Trigger ignored: profiling disabled");
            return false;
        }

        self.window.lock().arm(frames);
        debug!("Capture armed for {} frames", frames);
        true
    }
}

/// Drives the capture window from frame boundaries
pub struct CaptureController<T: PeriodicTimer> {
    window: Arc<Mutex<CaptureWindow>>,
    settings: SharedSettings,
    sampler: Arc<Sampler>,
    timer: T,
    exporter: Exporter,
}

impl<T: PeriodicTimer> CaptureController<T> {
    pub fn new(
        settings: SharedSettings,
        sampler: Arc<Sampler>,
        timer: T,
        exporter: Exporter,
    ) -> Self {
        Self {
            window: Arc::new(Mutex::new(CaptureWindow::new())),
            settings,
            sampler,
            timer,
            exporter,
        }
    }

    /// Handle for the trigger-combo callback
    pub fn trigger_handle(&self) -> TriggerHandle {
        TriggerHandle {
            window: Arc::clone(&self.window),
            settings: Arc::clone(&self.settings),
        }
    }

    /// Shortcut for `trigger_handle().activate()`
    pub fn trigger(&self) -> bool {
        self.trigger_handle().activate()
    }

    pub fn state(&self) -> CaptureState {
        self.window.lock().state()
    }

    pub fn pending_frames(&self) -> u32 {
        self.window.lock().pending_frames
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }

    /// Advance the state machine by one presented frame
    pub fn on_frame_boundary(&mut self) -> FrameAction {
        // read settings before taking the window lock; the trigger path
        // takes them in the same order
        let interval_micros = self.settings.read().interval_micros;
        let transition = self.window.lock().on_frame_boundary(interval_micros);

        match transition {
            Transition::None => FrameAction::Idle,
            Transition::Start { interval_micros } => {
                let sampler = Arc::clone(&self.sampler);
                let on_tick: TickCallback = Arc::new(move || sampler.tick());
                self.timer
                    .start(Duration::from_micros(u64::from(interval_micros)), on_tick);
                info!("Capture window opened ({} us interval)", interval_micros);
                FrameAction::Started
            }
            Transition::Countdown { remaining } => {
                debug!("Capture window: {} frames remaining", remaining);
                FrameAction::Countdown { remaining }
            }
            Transition::Close => self.close_window(),
        }
    }

    fn close_window(&mut self) -> FrameAction {
        self.timer.cancel();

        // cleared whether or not the export below succeeds
        let entries = self.sampler.aggregator().lock().drain();
        let stats =
            WindowStats::from_depths(entries.iter().map(|(key, count)| (key.depth(), *count)));
        info!("Capture window closed: {}", stats.summary());

        let output = self.exporter.export(&Local::now().naive_local(), &entries);
        if let Err(err) = &output {
            warn!("Capture export failed: {}", err);
        }

        FrameAction::Closed { stats, output }
    }
}

/// Wraps the host's per-frame present call.
///
/// The controller runs first, then the original call is always forwarded
/// and its result returned unchanged.
pub struct FrameHook<T: PeriodicTimer, F> {
    controller: CaptureController<T>,
    original: F,
}

impl<T: PeriodicTimer, F> FrameHook<T, F> {
    pub fn new(controller: CaptureController<T>, original: F) -> Self {
        Self {
            controller,
            original,
        }
    }

    pub fn present<R>(&mut self) -> R
    where
        F: FnMut() -> R,
    {
        self.controller.on_frame_boundary();
        (self.original)()
    }

    pub fn controller(&self) -> &CaptureController<T> {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut CaptureController<T> {
        &mut self.controller
    }
}
