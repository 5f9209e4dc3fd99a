//! CLI command implementations.
//!
//! Each command is implemented in its own module.
//! Commands orchestrate the various library components to perform user tasks.

pub mod inspect;
pub mod replay;
pub mod settings;

// Re-export main command functions
pub use inspect::{execute_inspect, hot_stacks, HotStack};
pub use replay::{execute_replay, ReplayArgs};
pub use settings::execute_settings;
