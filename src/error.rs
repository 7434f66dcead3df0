//! Error types shared across the application.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading the sound, talking to the audio device,
/// installing the keyboard hook or building the tray menu.
#[derive(Error, Debug)]
pub enum Error {
    /// The bundled sound file could not be found.
    #[error("Sound file not found at: {}", .0.display())]
    AssetMissing(PathBuf),

    /// The sound file exists but is not a readable WAV file.
    #[error("Failed to decode sound file: {0}")]
    Decode(#[from] hound::Error),

    /// The WAV file uses a sample format we cannot rescale.
    #[error("Unsupported sample format: {bits}-bit {format}")]
    UnsupportedFormat { bits: u16, format: &'static str },

    /// No audio output device, or the device refused a new stream.
    #[error("Audio output unavailable: {0}")]
    Output(String),

    /// The global keyboard hook could not be installed.
    #[error("Keyboard hook failed: {0}")]
    Hook(String),

    /// A volume label that is not one of the menu choices.
    #[error("Invalid volume label: {0:?}")]
    InvalidVolume(String),

    /// The tray icon or its menu could not be created.
    #[error("Tray icon failed: {0}")]
    Tray(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<tray_icon::Error> for Error {
    fn from(e: tray_icon::Error) -> Self {
        Error::Tray(e.to_string())
    }
}

impl From<tray_icon::menu::Error> for Error {
    fn from(e: tray_icon::menu::Error) -> Self {
        Error::Tray(e.to_string())
    }
}

impl From<tray_icon::BadIcon> for Error {
    fn from(e: tray_icon::BadIcon) -> Self {
        Error::Tray(e.to_string())
    }
}
