//! Application controller.
//!
//! Turns menu actions into listener, volume and sound changes. Knows
//! nothing about the tray toolkit or the OS hook, so it runs unchanged
//! against fakes in tests.

use crate::config::AppConfig;
use crate::error::Result;
use crate::keyboard_hook::{HookControl, KeyCallback, KeyHook, KeyPress};
use crate::listener::Listener;
use crate::pcm::PcmBuffer;
use crate::sound::{AudioOutput, SoundEngine};
use crate::volume::{Volume, VolumeChoices};
use std::sync::Arc;

/// A click on one of the menu entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuAction {
    On,
    Off,
    /// A volume entry, identified by its label.
    Volume(String),
    Quit,
}

/// Whether the main loop should keep running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Application state owned by the main thread.
pub struct App<H: KeyHook, O: AudioOutput + 'static> {
    engine: Arc<SoundEngine<O>>,
    listener: Listener<H>,
    volume: VolumeChoices,
    config: AppConfig,
    title: String,
}

impl<H: KeyHook, O: AudioOutput + 'static> App<H, O> {
    /// Builds the app with the default volume applied. The listener starts
    /// disabled; call [`App::start`] to arm it.
    pub fn new(asset: PcmBuffer, output: O, hook: H, config: AppConfig) -> Self {
        let volume = VolumeChoices::new(config.default_volume);
        let engine = Arc::new(SoundEngine::new(asset, output, volume.selected().gain()));
        let listener = Listener::new(hook, key_callback(Arc::clone(&engine)));
        let title = config.title_on.clone();

        Self {
            engine,
            listener,
            volume,
            config,
            title,
        }
    }

    /// Arms the listener at launch.
    pub fn start(&mut self) -> Result<()> {
        self.listener.enable()?;
        Ok(())
    }

    /// Applies a menu click.
    pub fn handle(&mut self, action: MenuAction) -> Flow {
        log::debug!("Menu action: {:?}", action);
        match action {
            MenuAction::On => self.enable(),
            MenuAction::Off => self.disable(),
            MenuAction::Volume(label) => self.set_volume(&label),
            MenuAction::Quit => {
                self.quit();
                return Flow::Exit;
            }
        }
        Flow::Continue
    }

    fn enable(&mut self) {
        if let Err(e) = self.listener.enable() {
            log::error!("Failed to enable key listener: {}", e);
        }
    }

    fn disable(&mut self) {
        if self.listener.disable() {
            self.title = self.config.title_off.clone();
        }
    }

    fn set_volume(&mut self, label: &str) {
        match self.volume.select_label(label) {
            Ok(volume) => {
                log::info!("Volume set to {}", volume);
                self.engine.rescale(volume.gain());
            }
            Err(e) => log::warn!("{}", e),
        }
    }

    /// Stops listening and silences any sound still playing.
    pub fn quit(&mut self) {
        self.listener.disable();
        self.engine.stop();
        log::info!("Quit requested");
    }

    pub fn is_enabled(&self) -> bool {
        self.listener.is_enabled()
    }

    pub fn volume(&self) -> &VolumeChoices {
        &self.volume
    }

    pub fn selected_volume(&self) -> Volume {
        self.volume.selected()
    }

    /// Text shown in the menu bar.
    pub fn title(&self) -> &str {
        &self.title
    }

    #[cfg(test)]
    pub fn engine(&self) -> &Arc<SoundEngine<O>> {
        &self.engine
    }
}

/// Callback run on the listener thread for every key press.
fn key_callback<O: AudioOutput + 'static>(engine: Arc<SoundEngine<O>>) -> KeyCallback {
    Arc::new(move |press: &KeyPress| {
        if let Err(e) = engine.trigger() {
            log::warn!("Failed to play sound for {}: {}", press.key, e);
        }
        HookControl::Continue
    })
}
