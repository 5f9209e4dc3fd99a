//! Settings command: show (and optionally create) the settings file.

use crate::utils::config::{
    Settings, FRAMES_PER_CAPTURE_RANGE, INTERVAL_MICROS_RANGE,
};
use anyhow::{Context, Result};
use std::path::Path;

/// Load the settings at `path` and print them.
///
/// With `init`, a missing file is created with the defaults; otherwise a
/// missing file just shows the defaults.
pub fn execute_settings(path: &Path, init: bool) -> Result<Settings> {
    let settings = if init || path.exists() {
        Settings::load_or_store_default(path)
            .with_context(|| format!("Failed to load settings {}", path.display()))?
    } else {
        println!("(no settings file at {}, showing defaults)", path.display());
        Settings::default()
    };

    println!("FlameCafe settings: {}", path.display());
    println!("  enabled:            {}", settings.enabled);
    println!(
        "  frames_per_capture: {} ({}..={})",
        settings.frames_per_capture, FRAMES_PER_CAPTURE_RANGE.0, FRAMES_PER_CAPTURE_RANGE.1
    );
    println!(
        "  interval_micros:    {} ({}..={})",
        settings.interval_micros, INTERVAL_MICROS_RANGE.0, INTERVAL_MICROS_RANGE.1
    );
    println!("  trigger_combo:      {}", settings.trigger_combo);

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_show_without_init_does_not_create() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let settings = execute_settings(&path, false).unwrap();
        assert_eq!(settings, Settings::default());
        assert!(!path.exists());
    }

    #[test]
    fn test_init_creates_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");

        execute_settings(&path, true).unwrap();
        assert!(path.exists());
    }
}
