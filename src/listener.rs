//! Key listener state.
//!
//! Tracks whether the horn is armed. The hook exists exactly while the
//! listener is enabled.

use crate::error::Result;
use crate::keyboard_hook::{HookHandle, KeyCallback, KeyHook};

/// Enabled flag plus the live hook, if any.
pub struct Listener<H: KeyHook> {
    hook: H,
    callback: KeyCallback,
    handle: Option<HookHandle>,
}

impl<H: KeyHook> Listener<H> {
    /// Creates a disabled listener that will deliver presses to `callback`.
    pub fn new(hook: H, callback: KeyCallback) -> Self {
        Self {
            hook,
            callback,
            handle: None,
        }
    }

    /// True while the installed hook is still delivering key presses.
    pub fn is_enabled(&self) -> bool {
        self.handle.is_some_and(|h| self.hook.is_active(h))
    }

    /// Installs the hook unless a live one is already installed.
    ///
    /// Returns `true` when a new hook was installed.
    pub fn enable(&mut self) -> Result<bool> {
        if self.is_enabled() {
            return Ok(false);
        }
        if let Some(stale) = self.handle.take() {
            log::debug!("Key hook detached itself, reinstalling");
            self.hook.stop(stale);
        }
        let handle = self.hook.install(self.callback.clone())?;
        self.handle = Some(handle);
        log::info!("Key listener enabled");
        Ok(true)
    }

    /// Removes the hook if one is installed.
    ///
    /// Returns `true` when a live hook was removed.
    pub fn disable(&mut self) -> bool {
        let was_enabled = self.is_enabled();
        if let Some(handle) = self.handle.take() {
            self.hook.stop(handle);
        }
        if was_enabled {
            log::info!("Key listener disabled");
        }
        was_enabled
    }
}

impl<H: KeyHook> Drop for Listener<H> {
    fn drop(&mut self) {
        self.disable();
    }
}
