//! keyhorn - menu bar utility that blows an airhorn on every key press.

// Hide console window in release builds
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod alert;
mod app;
mod config;
mod error;
mod keyboard_hook;
mod listener;
mod pcm;
mod sound;
mod tray;
mod volume;

use anyhow::{anyhow, Context};
use app::{App, Flow};
use config::AppConfig;
use keyboard_hook::RdevHook;
use pcm::PcmBuffer;
use sound::RodioOutput;
use std::time::Instant;
use tray::TrayIconManager;
use winit::event::{Event, StartCause};
use winit::event_loop::{ControlFlow, EventLoop, EventLoopBuilder};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("keyhorn starting...");

    if let Err(e) = run() {
        alert::show_fatal_error("Error", &format!("{:#}", e));
        std::process::exit(1);
    }

    log::info!("keyhorn stopped");
}

fn run() -> anyhow::Result<()> {
    let config = AppConfig::default();

    let sound_path = config.resolve_sound_path();
    let asset = PcmBuffer::load(&sound_path)?;
    log::info!(
        "Loaded {} ({} ch, {}-bit, {} Hz, {:.2?})",
        sound_path.display(),
        asset.channels,
        asset.samples.width() * 8,
        asset.sample_rate,
        asset.duration()
    );

    // The stream stays on this thread; only its handle is shared
    let (output, _stream) = RodioOutput::open_default().context("failed to open audio output")?;

    let event_loop = build_event_loop().context("failed to create event loop")?;

    let mut app = App::new(asset, output, RdevHook::new(), config.clone());
    let mut tray = TrayIconManager::new();

    event_loop
        .run(move |event, target| match event {
            Event::NewEvents(StartCause::Init) => {
                // The tray has to be created once the loop is running
                if let Err(e) = tray.start(&config, app.volume()) {
                    log::error!("Failed to start tray icon: {}", e);
                    target.exit();
                    return;
                }
                if let Err(e) = app.start() {
                    log::error!("Failed to start key listener: {}", e);
                }
                tray.sync(app.title(), app.volume());
                log::info!(
                    "keyhorn running (listening: {}, volume: {})",
                    app.is_enabled(),
                    app.selected_volume()
                );
            }
            Event::AboutToWait => {
                while let Some(action) = tray.next_action() {
                    let flow = app.handle(action);
                    tray.sync(app.title(), app.volume());
                    if flow == Flow::Exit {
                        tray.stop();
                        target.exit();
                        return;
                    }
                }
                target.set_control_flow(ControlFlow::WaitUntil(
                    Instant::now() + config.poll_interval,
                ));
            }
            Event::LoopExiting => {
                log::info!("keyhorn shutting down...");
                app.quit();
                tray.stop();
            }
            _ => {}
        })
        .map_err(|err| anyhow!(err))?;

    Ok(())
}

/// Builds the event loop. On macOS the app stays out of the Dock.
fn build_event_loop() -> anyhow::Result<EventLoop<()>> {
    #[allow(unused_mut)]
    let mut builder = EventLoopBuilder::new();

    #[cfg(target_os = "macos")]
    {
        use winit::platform::macos::{ActivationPolicy, EventLoopBuilderExtMacOS};
        builder.with_activation_policy(ActivationPolicy::Accessory);
    }

    Ok(builder.build()?)
}
