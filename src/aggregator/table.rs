//! Counting table of captured stacks for one capture window.
//!
//! Identical stacks are folded into one entry whose counter records how
//! many ticks observed them. The table is filled while a window is open and
//! drained exactly once when it closes.

use crate::sampler::key::{SampleKey, StackKeyBuildHasher};
use log::trace;
use std::collections::HashMap;

/// Occurrence counts keyed by captured stack
#[derive(Debug, Default)]
pub struct SampleAggregator {
    counts: HashMap<SampleKey, u32, StackKeyBuildHasher>,
    total: u64,
}

impl SampleAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one more occurrence of `key`, inserting it at 1 if new
    pub fn record(&mut self, key: SampleKey) {
        let count = self.counts.entry(key).or_insert(0);
        *count = count.saturating_add(1);
        self.total += 1;
        trace!("Recorded stack of depth {} (count {})", key.depth(), count);
    }

    /// Take every entry out of the table, leaving it empty.
    ///
    /// The order of the returned entries is unspecified.
    pub fn drain(&mut self) -> Vec<(SampleKey, u32)> {
        self.total = 0;
        self.counts.drain().collect()
    }

    /// Current count for `key` (0 if never recorded)
    pub fn count(&self, key: &SampleKey) -> u32 {
        self.counts.get(key).copied().unwrap_or(0)
    }

    /// Number of distinct stacks
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Number of samples recorded since the last drain
    pub fn total_samples(&self) -> u64 {
        self.total
    }
}
