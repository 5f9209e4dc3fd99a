//! Output writers and readers for capture files.
//!
//! This module handles:
//! - Naming capture files by timestamp
//! - Rendering drained windows as folded stacks
//! - Parsing folded stacks back for inspection

pub mod folded;

// Re-export main functions
pub use folded::{
    capture_file_name, parse_folded, read_folded, render_folded, write_folded, Exporter,
    FoldedStack,
};
