//! Inspect command: validate a capture file and summarise it.

use crate::aggregator::WindowStats;
use crate::output::{read_folded, FoldedStack};
use anyhow::{Context, Result};
use log::debug;
use std::path::Path;

/// A stack ranked by sample count
#[derive(Debug, Clone, PartialEq)]
pub struct HotStack {
    pub stack: String,
    pub count: u64,
    pub percentage: f64,
}

/// Top `top_n` stacks by count (descending), ties in file order
pub fn hot_stacks(stacks: &[FoldedStack], top_n: usize) -> Vec<HotStack> {
    let total: u64 = stacks.iter().map(|s| s.count).sum();

    let mut ranked: Vec<&FoldedStack> = stacks.iter().collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count));

    ranked
        .into_iter()
        .take(top_n)
        .map(|stack| HotStack {
            stack: stack.frames.join(";"),
            count: stack.count,
            percentage: if total > 0 {
                (stack.count as f64 / total as f64) * 100.0
            } else {
                0.0
            },
        })
        .collect()
}

/// Summary statistics of parsed folded stacks
pub fn folded_stats(stacks: &[FoldedStack]) -> WindowStats {
    let mut stats = WindowStats::from_depths(
        stacks
            .iter()
            .map(|s| (s.frames.len(), u32::try_from(s.count).unwrap_or(u32::MAX))),
    );
    // counts in a file are not bounded by u32
    stats.total_samples = stacks.iter().map(|s| s.count).sum();
    stats
}

/// Execute the inspect command
pub fn execute_inspect(file_path: &Path, top_n: usize) -> Result<WindowStats> {
    println!("Inspecting capture: {}", file_path.display());

    let stacks = read_folded(file_path)
        .with_context(|| format!("Failed to read capture {}", file_path.display()))?;
    debug!("Parsed {} folded stacks", stacks.len());

    let stats = folded_stats(&stacks);

    println!("✓ Valid folded-stack file");
    println!("  Samples:        {}", stats.total_samples);
    println!("  Unique stacks:  {}", stats.distinct_stacks);
    println!("  Deepest stack:  {} frames", stats.max_depth);

    let hot = hot_stacks(&stacks, top_n);
    if !hot.is_empty() {
        println!();
        println!("  Hottest stacks:");
        for (i, entry) in hot.iter().enumerate() {
            println!(
                "  {:>3}. {:>8} ({:>5.1}%)  {}",
                i + 1,
                entry.count,
                entry.percentage,
                entry.stack
            );
        }
    }

    Ok(stats)
}
