//! Stack sampling: capture one call stack per timer tick.
//!
//! This module handles:
//! - The fixed-capacity stack key and its hash
//! - Walking the back chain of the sampled thread
//! - Recording each successful walk into the shared aggregator

pub mod key;
pub mod walker;

// Re-export main types
pub use key::{stack_hash, SampleKey, StackKeyBuildHasher, StackKeyHasher, MAX_STACK_DEPTH};
pub use walker::{walk, ExecutionSnapshot, FrameMemory};

use crate::aggregator::SampleAggregator;
use crate::utils::error::WalkError;
use log::trace;
use parking_lot::Mutex;
use std::sync::Arc;

/// Access to the designated thread whose stack is sampled.
pub trait ThreadAccessor: Send + Sync {
    /// Register state of the sampled thread, `None` if it cannot be resolved
    fn snapshot(&self) -> Option<ExecutionSnapshot>;
}

/// Work done on every timer tick: locate the thread, walk its stack and
/// count the result.
///
/// A failed tick is dropped; it never touches the aggregator.
pub struct Sampler {
    thread: Arc<dyn ThreadAccessor>,
    memory: Arc<dyn FrameMemory>,
    aggregator: Arc<Mutex<SampleAggregator>>,
}

impl Sampler {
    pub fn new(
        thread: Arc<dyn ThreadAccessor>,
        memory: Arc<dyn FrameMemory>,
        aggregator: Arc<Mutex<SampleAggregator>>,
    ) -> Self {
        Self {
            thread,
            memory,
            aggregator,
        }
    }

    /// Take one sample, reporting why it was skipped
    pub fn sample(&self) -> Result<SampleKey, WalkError> {
        let snapshot = self.thread.snapshot().ok_or(WalkError::ThreadUnavailable)?;
        let key = walk(&snapshot, self.memory.as_ref())?;
        self.aggregator.lock().record(key);
        Ok(key)
    }

    /// Timer entry point; skipped samples are only traced
    pub fn tick(&self) {
        if let Err(err) = self.sample() {
            trace!("Sample skipped: {}", err);
        }
    }

    /// The aggregator this sampler records into
    pub fn aggregator(&self) -> &Arc<Mutex<SampleAggregator>> {
        &self.aggregator
    }
}
