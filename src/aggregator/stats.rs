//! Summary statistics for a drained capture window.
//!
//! Computed from the drained entries right before export, for logging and
//! the `inspect` command.

/// Shape of one capture window's samples
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WindowStats {
    /// Samples taken (sum of all counts)
    pub total_samples: u64,

    /// Number of distinct stacks
    pub distinct_stacks: usize,

    /// Depth of the deepest stack seen
    pub max_depth: usize,

    /// Count of the most frequent stack
    pub hottest_count: u32,
}

impl WindowStats {
    /// Build stats from `(depth, count)` pairs
    pub fn from_depths<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (usize, u32)>,
    {
        entries
            .into_iter()
            .fold(Self::default(), |mut stats, (depth, count)| {
                stats.total_samples += u64::from(count);
                stats.distinct_stacks += 1;
                stats.max_depth = stats.max_depth.max(depth);
                stats.hottest_count = stats.hottest_count.max(count);
                stats
            })
    }

    /// Share of all samples taken by the hottest stack, in percent
    pub fn hottest_percentage(&self) -> f64 {
        if self.total_samples == 0 {
            return 0.0;
        }
        (f64::from(self.hottest_count) / self.total_samples as f64) * 100.0
    }

    /// Get human-readable summary
    pub fn summary(&self) -> String {
        format!(
            "Samples: {} | Stacks: {} | Max depth: {} | Hottest: {} ({:.1}%)",
            self.total_samples,
            self.distinct_stacks,
            self.max_depth,
            self.hottest_count,
            self.hottest_percentage()
        )
    }
}
