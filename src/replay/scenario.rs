//! Scripted replay scenarios (JSON).
//!
//! A scenario describes the sampled program's memory, its symbols and a
//! sequence of presented frames. Each frame may press the trigger combo and
//! lists the stack pointer seen at every timer tick during that frame
//! (`null` for a tick where the thread could not be resolved).
//!
//! ```json
//! {
//!   "settings": { "frames_per_capture": 2 },
//!   "memory": [ { "base": 4096, "words": [4104, 33554436, 0, 33554692] } ],
//!   "symbols": [ { "address": 33554432, "name": "main", "size": 256 } ],
//!   "frames": [ { "trigger": true }, { "ticks": [4096, 4096, null] } ]
//! }
//! ```

use super::memory::{MemoryImage, MemoryRegion};
use crate::symbols::{Symbol, SymbolTable};
use crate::utils::config::Settings;
use crate::utils::error::ReplayError;
use log::debug;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One presented frame of the script
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptedFrame {
    /// Press the trigger combo during this frame
    #[serde(default)]
    pub trigger: bool,

    /// Stack pointer at each tick fired during this frame
    #[serde(default)]
    pub ticks: Vec<Option<u32>>,
}

/// A complete replay script
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scenario {
    /// Settings to replay with; defaults when absent
    #[serde(default)]
    pub settings: Option<Settings>,

    pub memory: Vec<MemoryRegion>,

    #[serde(default)]
    pub symbols: Vec<Symbol>,

    pub frames: Vec<ScriptedFrame>,
}

impl Scenario {
    /// Parse a scenario from JSON text
    pub fn from_json(json: &str) -> Result<Self, ReplayError> {
        let scenario: Scenario = serde_json::from_str(json)?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Read and parse a scenario file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ReplayError> {
        let path = path.as_ref();
        debug!("Loading scenario from: {}", path.display());
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Check the memory layout and any embedded settings
    pub fn validate(&self) -> Result<(), ReplayError> {
        if let Some(settings) = &self.settings {
            settings.validate()?;
        }

        self.memory_image()
            .check()
            .map_err(ReplayError::InvalidScenario)?;

        Ok(())
    }

    pub fn memory_image(&self) -> MemoryImage {
        MemoryImage::new(self.memory.clone())
    }

    pub fn symbol_table(&self) -> SymbolTable {
        self.symbols.iter().cloned().collect()
    }

    /// Total ticks scripted across all frames
    pub fn tick_count(&self) -> usize {
        self.frames.iter().map(|frame| frame.ticks.len()).sum()
    }
}
