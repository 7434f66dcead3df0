//! Keyboard hook module.
//!
//! Observes every key press on the system, not only those aimed at this
//! application. On macOS this goes through a Quartz event tap and needs the
//! Accessibility (Input Monitoring) permission.

use crate::error::{Error, Result};
use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// A key press delivered by the hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPress {
    /// Platform key name, for logging only.
    pub key: String,
}

/// What the hook should do after a callback returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookControl {
    /// Keep delivering key presses.
    Continue,
    /// Detach the callback.
    #[allow(dead_code)]
    Stop,
}

/// Callback type for key presses. Runs on the listener thread.
pub type KeyCallback = Arc<dyn Fn(&KeyPress) -> HookControl + Send + Sync>;

/// Identifies an installed hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HookHandle(u64);

/// A global key hook. At most one hook is active at a time.
pub trait KeyHook {
    /// Starts delivering key presses to `callback`.
    fn install(&mut self, callback: KeyCallback) -> Result<HookHandle>;

    /// Removes the hook. Stopping a removed hook does nothing.
    fn stop(&mut self, handle: HookHandle);

    /// Whether `handle` is still installed. A hook whose callback returned
    /// [`HookControl::Stop`] is no longer active.
    fn is_active(&self, handle: HookHandle) -> bool;
}

/// Installed callback.
struct HookState {
    id: u64,
    callback: KeyCallback,
}

static HOOK_STATE: Mutex<Option<HookState>> = Mutex::new(None);
static NEXT_HOOK_ID: AtomicU64 = AtomicU64::new(1);
static LISTENER_THREAD: OnceCell<JoinHandle<()>> = OnceCell::new();

/// System-wide key hook backed by `rdev`.
///
/// The OS tap is created once, on first install, on a background thread
/// and lives for the rest of the process. Installing and stopping attach
/// and detach the callback it dispatches to.
#[derive(Debug, Default)]
pub struct RdevHook;

impl RdevHook {
    pub fn new() -> Self {
        Self
    }
}

impl KeyHook for RdevHook {
    fn install(&mut self, callback: KeyCallback) -> Result<HookHandle> {
        let mut state = HOOK_STATE.lock();
        if let Some(ref s) = *state {
            return Err(Error::Hook(format!("hook {} is already active", s.id)));
        }

        ensure_listener_thread()?;

        let id = NEXT_HOOK_ID.fetch_add(1, Ordering::SeqCst);
        *state = Some(HookState { id, callback });
        log::debug!("Keyboard hook {} installed", id);
        Ok(HookHandle(id))
    }

    fn stop(&mut self, handle: HookHandle) {
        if clear_hook(handle.0) {
            log::debug!("Keyboard hook {} removed", handle.0);
        } else {
            log::trace!("Keyboard hook {} already removed", handle.0);
        }
    }

    fn is_active(&self, handle: HookHandle) -> bool {
        matches!(*HOOK_STATE.lock(), Some(ref s) if s.id == handle.0)
    }
}

/// Removes the hook with `id` if it is still the active one.
fn clear_hook(id: u64) -> bool {
    let mut state = HOOK_STATE.lock();
    if matches!(*state, Some(ref s) if s.id == id) {
        *state = None;
        true
    } else {
        false
    }
}

/// Starts the OS listener thread if it is not running yet.
fn ensure_listener_thread() -> Result<()> {
    LISTENER_THREAD
        .get_or_try_init(|| {
            thread::Builder::new()
                .name("key-listener".to_string())
                .spawn(|| {
                    log::info!("Key listener thread started");
                    // Blocks for the lifetime of the tap.
                    if let Err(e) = rdev::listen(dispatch) {
                        log::error!(
                            "Keyboard listener failed: {:?}. Check the accessibility permission.",
                            e
                        );
                    }
                })
        })
        .map(|_| ())
        .map_err(|e| Error::Hook(e.to_string()))
}

/// Forwards key presses from the OS tap to the installed callback.
fn dispatch(event: rdev::Event) {
    let rdev::EventType::KeyPress(key) = event.event_type else {
        return;
    };

    // Call the callback outside of the lock
    let installed = HOOK_STATE
        .lock()
        .as_ref()
        .map(|s| (s.id, Arc::clone(&s.callback)));

    if let Some((id, callback)) = installed {
        let press = KeyPress {
            key: format!("{:?}", key),
        };
        log::trace!("Key press: {}", press.key);
        if callback(&press) == HookControl::Stop {
            clear_hook(id);
        }
    }
}
