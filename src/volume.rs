//! Volume selection.
//!
//! The menu offers eleven fixed volume steps, exactly one of which is
//! checked at any time.

use crate::error::{Error, Result};
use std::fmt;

/// Percentage step between two menu entries.
const STEP: u8 = 10;

/// Number of volume entries in the menu.
pub const VOLUME_STEPS: usize = 11;

/// A volume level, always a multiple of ten between 0 and 100 percent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Volume(u8);

impl Volume {
    #[cfg(test)]
    pub const MUTE: Volume = Volume(0);
    pub const DEFAULT: Volume = Volume(10);
    #[cfg(test)]
    pub const FULL: Volume = Volume(100);

    /// Creates a volume from a percentage. Only the menu steps are accepted.
    pub fn from_percent(percent: u8) -> Option<Self> {
        (percent <= 100 && percent % STEP == 0).then_some(Self(percent))
    }

    /// Parses a menu label such as `"40%"`.
    pub fn from_label(label: &str) -> Result<Self> {
        let invalid = || Error::InvalidVolume(label.to_string());
        let percent = label
            .trim()
            .strip_suffix('%')
            .ok_or_else(invalid)?
            .trim()
            .parse::<u8>()
            .map_err(|_| invalid())?;
        Self::from_percent(percent).ok_or_else(invalid)
    }

    /// All menu steps, quietest first.
    pub fn all() -> impl Iterator<Item = Volume> {
        (0..VOLUME_STEPS as u8).map(|i| Volume(i * STEP))
    }

    pub fn percent(self) -> u8 {
        self.0
    }

    /// Linear gain applied to every sample.
    pub fn gain(self) -> f64 {
        f64::from(self.0) / 100.0
    }

    /// Position of this volume in the menu.
    pub fn index(self) -> usize {
        usize::from(self.0 / STEP)
    }

    /// Text shown on the menu entry.
    pub fn label(self) -> String {
        self.to_string()
    }
}

impl Default for Volume {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for Volume {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.percent())
    }
}

/// Checked state of the eleven volume entries.
#[derive(Debug, Clone)]
pub struct VolumeChoices {
    checked: [bool; VOLUME_STEPS],
    selected: Volume,
}

impl VolumeChoices {
    pub fn new(initial: Volume) -> Self {
        let mut choices = Self {
            checked: [false; VOLUME_STEPS],
            selected: initial,
        };
        choices.select(initial);
        choices
    }

    /// Unchecks every entry, then checks `volume`.
    pub fn select(&mut self, volume: Volume) {
        self.checked = [false; VOLUME_STEPS];
        self.checked[volume.index()] = true;
        self.selected = volume;
    }

    /// Selects the entry carrying `label` and returns its volume.
    pub fn select_label(&mut self, label: &str) -> Result<Volume> {
        let volume = Volume::from_label(label)?;
        self.select(volume);
        Ok(volume)
    }

    pub fn selected(&self) -> Volume {
        self.selected
    }

    pub fn is_checked(&self, volume: Volume) -> bool {
        self.checked[volume.index()]
    }

    /// Entries with their checked state, in menu order.
    pub fn entries(&self) -> impl Iterator<Item = (Volume, bool)> + '_ {
        Volume::all().zip(self.checked.iter().copied())
    }
}

impl Default for VolumeChoices {
    fn default() -> Self {
        Self::new(Volume::DEFAULT)
    }
}
