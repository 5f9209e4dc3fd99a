//! Capture windows: trigger, frame-boundary countdown and periodic sampling.
//!
//! This module handles:
//! - The Idle / Armed / Capturing state machine
//! - The periodic timer capability and a thread-backed implementation
//! - The controller tying timer, sampler and exporter together

pub mod controller;
pub mod host;
pub mod state;

// Re-export main types
pub use controller::{CaptureController, FrameAction, FrameHook, TriggerHandle};
pub use host::{PeriodicTimer, ThreadTimer, TickCallback};
pub use state::{CaptureState, CaptureWindow, Transition};
