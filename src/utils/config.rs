//! Configuration and constants for the profiler.

use super::error::ConfigError;
use log::{debug, info};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// Frame link value that marks the bottom of a thread's stack
pub const END_OF_STACK: u32 = 0xFFFF_FFFF;

/// Longest symbol name handed out by a resolver, in bytes
pub const SYMBOL_NAME_MAX: usize = 255;

/// Default directory (relative to the working directory) for capture files
pub const DEFAULT_TRACE_DIR: &str = "FlameCafe";

/// chrono format string for capture file names
pub const CAPTURE_FILE_FORMAT: &str = "%Y-%m-%d_%H-%M-%S.txt";

// Ranges accepted by the in-game settings menu
pub const FRAMES_PER_CAPTURE_RANGE: (u32, u32) = (1, 255);
pub const INTERVAL_MICROS_RANGE: (u32, u32) = (20, 1000);

pub const DEFAULT_FRAMES_PER_CAPTURE: u32 = 3;
pub const DEFAULT_INTERVAL_MICROS: u32 = 50;

/// Button bitmask that arms a capture window.
///
/// The core never interprets the mask; it is only stored and displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ButtonCombo(pub u32);

impl ButtonCombo {
    pub const A: u32 = 1 << 0;
    pub const B: u32 = 1 << 1;
    pub const X: u32 = 1 << 2;
    pub const Y: u32 = 1 << 3;
    pub const L: u32 = 1 << 4;
    pub const R: u32 = 1 << 5;
    pub const ZL: u32 = 1 << 6;
    pub const ZR: u32 = 1 << 7;
    pub const PLUS: u32 = 1 << 8;
    pub const MINUS: u32 = 1 << 9;

    const NAMES: [(u32, &'static str); 10] = [
        (Self::A, "A"),
        (Self::B, "B"),
        (Self::X, "X"),
        (Self::Y, "Y"),
        (Self::L, "L"),
        (Self::R, "R"),
        (Self::ZL, "ZL"),
        (Self::ZR, "ZR"),
        (Self::PLUS, "+"),
        (Self::MINUS, "-"),
    ];
}

impl Default for ButtonCombo {
    fn default() -> Self {
        Self(Self::L | Self::R)
    }
}

impl fmt::Display for ButtonCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = Self::NAMES
            .iter()
            .filter(|(bit, _)| self.0 & bit != 0)
            .map(|(_, name)| *name)
            .collect();

        if names.is_empty() {
            write!(f, "<none>")
        } else {
            write!(f, "{}", names.join("+"))
        }
    }
}

/// User-tunable profiler settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Whether the trigger combo arms capture windows at all
    pub enabled: bool,

    /// Number of frames a capture window spans
    pub frames_per_capture: u32,

    /// Sampling period in microseconds
    pub interval_micros: u32,

    /// Button combination that arms a capture window
    pub trigger_combo: ButtonCombo,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enabled: true,
            frames_per_capture: DEFAULT_FRAMES_PER_CAPTURE,
            interval_micros: DEFAULT_INTERVAL_MICROS,
            trigger_combo: ButtonCombo::default(),
        }
    }
}

/// Settings shared between the controller and whoever edits them.
///
/// Readers take the current value each time; nothing is snapshotted.
pub type SharedSettings = Arc<RwLock<Settings>>;

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_frames_per_capture(mut self, frames: u32) -> Self {
        self.frames_per_capture = frames;
        self
    }

    pub fn with_interval_micros(mut self, micros: u32) -> Self {
        self.interval_micros = micros;
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Wrap into the shared handle used by the capture controller
    pub fn shared(self) -> SharedSettings {
        Arc::new(RwLock::new(self))
    }

    /// Check every numeric field against its accepted range
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_range(
            "frames_per_capture",
            self.frames_per_capture,
            FRAMES_PER_CAPTURE_RANGE,
        )?;
        check_range(
            "interval_micros",
            self.interval_micros,
            INTERVAL_MICROS_RANGE,
        )?;
        Ok(())
    }

    /// Load settings from `path`, writing the defaults there first if the
    /// file does not exist yet.
    ///
    /// Fields missing from an existing file take their default value.
    pub fn load_or_store_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            info!("No settings at {}, storing defaults", path.display());
            let settings = Self::default();
            settings.store(path)?;
            return Ok(settings);
        }

        let contents = std::fs::read_to_string(path)?;
        let settings: Settings = serde_json::from_str(&contents)?;
        settings.validate()?;

        debug!("Loaded settings from {}: {:?}", path.display(), settings);
        Ok(settings)
    }

    /// Persist settings as pretty JSON, creating parent directories
    pub fn store(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

fn check_range(field: &'static str, value: u32, (min, max): (u32, u32)) -> Result<(), ConfigError> {
    if value < min || value > max {
        return Err(ConfigError::OutOfRange {
            field,
            value,
            min,
            max,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_match_plugin_defaults() {
        let settings = Settings::default();
        assert!(settings.enabled);
        assert_eq!(settings.frames_per_capture, 3);
        assert_eq!(settings.interval_micros, 50);
        assert_eq!(settings.trigger_combo.to_string(), "L+R");
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        assert!(Settings::new().with_frames_per_capture(0).validate().is_err());
        assert!(Settings::new().with_frames_per_capture(256).validate().is_err());
        assert!(Settings::new().with_interval_micros(19).validate().is_err());
        assert!(Settings::new().with_interval_micros(1001).validate().is_err());
        assert!(Settings::new().with_interval_micros(1000).validate().is_ok());
    }

    #[test]
    fn test_load_or_store_default_creates_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/settings.json");

        let settings = Settings::load_or_store_default(&path).unwrap();

        assert_eq!(settings, Settings::default());
        assert!(path.exists());
    }

    #[test]
    fn test_load_fills_missing_fields() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{ "interval_micros": 200 }"#).unwrap();

        let settings = Settings::load_or_store_default(&path).unwrap();

        assert_eq!(settings.interval_micros, 200);
        assert_eq!(settings.frames_per_capture, DEFAULT_FRAMES_PER_CAPTURE);
    }

    #[test]
    fn test_load_rejects_invalid_range() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{ "frames_per_capture": 0 }"#).unwrap();

        let err = Settings::load_or_store_default(&path).unwrap_err();
        assert!(matches!(err, ConfigError::OutOfRange { field: "frames_per_capture", .. }));
    }

    #[test]
    fn test_combo_display() {
        assert_eq!(ButtonCombo(0).to_string(), "<none>");
        assert_eq!(ButtonCombo(ButtonCombo::A | ButtonCombo::ZR).to_string(), "A+ZR");
    }
}
