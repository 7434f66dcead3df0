//! System tray module.
//!
//! Provides the menu bar entry with On / Off / Volume / Quit.

use crate::app::MenuAction;
use crate::config::AppConfig;
use crate::error::Result;
use crate::volume::{Volume, VolumeChoices};
use tray_icon::{
    menu::{CheckMenuItem, Menu, MenuEvent, MenuId, MenuItem, PredefinedMenuItem, Submenu},
    Icon, TrayIcon, TrayIconBuilder,
};

/// Tray icon manager.
pub struct TrayIconManager {
    tray_icon: Option<TrayIcon>,
    menu_on_id: Option<MenuId>,
    menu_off_id: Option<MenuId>,
    menu_quit_id: Option<MenuId>,
    volume_items: Vec<(Volume, CheckMenuItem)>,
}

impl TrayIconManager {
    /// Creates a new tray icon manager.
    pub fn new() -> Self {
        Self {
            tray_icon: None,
            menu_on_id: None,
            menu_off_id: None,
            menu_quit_id: None,
            volume_items: Vec::new(),
        }
    }

    /// Creates the tray icon image: five vertical bars like the title glyph.
    fn create_icon() -> Result<Icon> {
        let size = 32u32;
        let mut rgba = vec![0u8; (size * size * 4) as usize];

        // (left edge, height) of each bar, bottom aligned
        let bars = [(3u32, 10u32), (9, 14), (15, 26), (21, 20), (27, 12)];
        let bottom = size - 3;

        for y in 0..size {
            for x in 0..size {
                let idx = ((y * size + x) * 4) as usize;
                let lit = bars.iter().any(|&(left, height)| {
                    x >= left && x < left + 3 && y < bottom && y >= bottom - height
                });

                if lit {
                    rgba[idx] = 0xFF; // R
                    rgba[idx + 1] = 0xB3; // G
                    rgba[idx + 2] = 0x00; // B
                    rgba[idx + 3] = 255; // A
                }
            }
        }

        Ok(Icon::from_rgba(rgba, size, size)?)
    }

    /// Starts the tray icon.
    ///
    /// On macOS this must run after the event loop has started.
    pub fn start(&mut self, config: &AppConfig, volume: &VolumeChoices) -> Result<()> {
        // Create menu items
        let menu_on = MenuItem::new("On", true, None);
        let menu_off = MenuItem::new("Off", true, None);
        let menu_quit = MenuItem::new("Quit", true, None);
        let menu_volume = Submenu::new("Volume", true);

        self.volume_items = volume
            .entries()
            .map(|(v, checked)| (v, CheckMenuItem::new(v.label(), true, checked, None)))
            .collect();
        for (_, item) in &self.volume_items {
            menu_volume.append(item)?;
        }

        // Store menu IDs
        self.menu_on_id = Some(menu_on.id().clone());
        self.menu_off_id = Some(menu_off.id().clone());
        self.menu_quit_id = Some(menu_quit.id().clone());

        // Create menu
        let menu = Menu::new();
        menu.append(&menu_on)?;
        menu.append(&menu_off)?;
        menu.append(&PredefinedMenuItem::separator())?;
        menu.append(&menu_volume)?;
        menu.append(&PredefinedMenuItem::separator())?;
        menu.append(&menu_quit)?;

        // The macOS menu bar shows the title; other trays need an image
        let mut builder = TrayIconBuilder::new()
            .with_title(&config.title_on)
            .with_tooltip(&config.tooltip)
            .with_menu(Box::new(menu));
        if !cfg!(target_os = "macos") {
            builder = builder.with_icon(Self::create_icon()?);
        }

        self.tray_icon = Some(builder.build()?);

        Ok(())
    }

    /// Returns the next pending menu click, if any. Should be called from
    /// the main event loop.
    pub fn next_action(&self) -> Option<MenuAction> {
        let event = MenuEvent::receiver().try_recv().ok()?;
        self.action_for(&event.id)
    }

    /// Maps a menu item id to the action it stands for.
    fn action_for(&self, id: &MenuId) -> Option<MenuAction> {
        if Some(id) == self.menu_on_id.as_ref() {
            Some(MenuAction::On)
        } else if Some(id) == self.menu_off_id.as_ref() {
            Some(MenuAction::Off)
        } else if Some(id) == self.menu_quit_id.as_ref() {
            Some(MenuAction::Quit)
        } else {
            self.volume_items
                .iter()
                .find(|(_, item)| item.id() == id)
                .map(|(_, item)| MenuAction::Volume(item.text()))
        }
    }

    /// Mirrors the app state into the menu: title text and volume checks.
    ///
    /// Check items toggle themselves when clicked, so the checks are always
    /// rewritten from `volume`.
    pub fn sync(&self, title: &str, volume: &VolumeChoices) {
        if let Some(ref tray) = self.tray_icon {
            tray.set_title(Some(title));
        }
        for (v, item) in &self.volume_items {
            item.set_checked(volume.is_checked(*v));
        }
    }

    /// Stops the tray icon.
    pub fn stop(&mut self) {
        self.tray_icon = None;
    }
}

impl Default for TrayIconManager {
    fn default() -> Self {
        Self::new()
    }
}
