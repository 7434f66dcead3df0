//! Configuration module.
//!
//! Holds the compiled-in application settings and resolves the location
//! of the bundled sound file. Nothing here is read from or written to disk.

use crate::volume::Volume;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Sound file location relative to the executable or working directory.
pub const SOUND_FILE: &str = "sfx/dj-airhorn-one.wav";

/// Menu bar title while the horn is armed.
pub const TITLE_ON: &str = "၊၊||၊";

/// Menu bar title after the user switched the horn off.
pub const TITLE_OFF: &str = "🔊";

/// Main application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Relative path of the sound file.
    pub sound_file: PathBuf,
    /// Volume selected at startup.
    pub default_volume: Volume,
    /// Title shown while listening.
    pub title_on: String,
    /// Title shown while switched off.
    pub title_off: String,
    /// Tray tooltip.
    pub tooltip: String,
    /// How often the main loop polls for menu events.
    pub poll_interval: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            sound_file: PathBuf::from(SOUND_FILE),
            default_volume: Volume::DEFAULT,
            title_on: TITLE_ON.to_string(),
            title_off: TITLE_OFF.to_string(),
            tooltip: "Keyboard Airhorn".to_string(),
            poll_interval: Duration::from_millis(16),
        }
    }
}

impl AppConfig {
    /// Finds the sound file.
    ///
    /// Looks next to the executable, then in `../Resources` (the layout of a
    /// macOS app bundle), then in the current directory. When nothing exists
    /// the executable-relative path is returned so the error names it.
    pub fn resolve_sound_path(&self) -> PathBuf {
        let exe_dir = std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(Path::to_path_buf));
        let cwd = std::env::current_dir().ok();
        let candidates = sound_candidates(&self.sound_file, exe_dir.as_deref(), cwd.as_deref());

        candidates
            .iter()
            .find(|path| path.is_file())
            .or_else(|| candidates.first())
            .cloned()
            .unwrap_or_else(|| self.sound_file.clone())
    }
}

/// Lists the places the sound file may live, in lookup order.
fn sound_candidates(relative: &Path, exe_dir: Option<&Path>, cwd: Option<&Path>) -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    if let Some(dir) = exe_dir {
        candidates.push(dir.join(relative));
        candidates.push(dir.join("..").join("Resources").join(relative));
    }
    if let Some(dir) = cwd {
        candidates.push(dir.join(relative));
    }
    candidates
}
