//! FlameCafe
//!
//! Low-overhead statistical call-stack profiler. On a user-triggered
//! capture window it samples the call stack of one thread at a fixed
//! interval, counts identical stacks, and when the window closes writes
//! them as folded stacks ready for flamegraph rendering.
//!
//! Pipeline:
//!
//! ```text
//! trigger ──► CaptureController ──start/cancel──► PeriodicTimer
//!                   │                                  │ tick
//!              frame boundary                       Sampler ──walk──► SampleKey
//!                   │                                  │
//!                   └──── close ──► drain ◄── SampleAggregator
//!                                     │
//!                                  Exporter ──► <dir>/<YYYY-MM-DD_hh-mm-ss>.txt
//! ```

pub mod aggregator;
pub mod capture;
pub mod commands;
pub mod output;
pub mod replay;
pub mod sampler;
pub mod symbols;
pub mod utils;
