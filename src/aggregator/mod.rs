//! Aggregation of captured stacks into per-window counts.
//!
//! This module provides:
//! - The counting table filled by timer ticks
//! - Summary statistics of a drained window

pub mod table;
pub mod stats;

// Re-export main types
pub use table::SampleAggregator;
pub use stats::WindowStats;
