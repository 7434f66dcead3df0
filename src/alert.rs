//! Alert module.
//!
//! Shows a blocking native alert for errors that stop the app before the
//! menu bar entry exists.

/// Shows `message` to the user and waits until the alert is dismissed.
pub fn show_fatal_error(title: &str, message: &str) {
    log::error!("{}: {}", title, message);
    show(title, message);
}

#[cfg(target_os = "macos")]
fn show(title: &str, message: &str) {
    use std::process::Command;

    let script = format!(
        "display alert {} message {} as critical buttons {{\"OK\"}} default button \"OK\"",
        applescript_string(title),
        applescript_string(message)
    );
    match Command::new("osascript").arg("-e").arg(&script).status() {
        Ok(status) if !status.success() => log::warn!("osascript exited with {}", status),
        Err(e) => log::warn!("Failed to run osascript: {}", e),
        Ok(_) => {}
    }
}

#[cfg(windows)]
fn show(title: &str, message: &str) {
    use windows::{
        core::PCWSTR,
        Win32::UI::WindowsAndMessaging::{MessageBoxW, MB_ICONERROR, MB_OK},
    };

    let title: Vec<u16> = title.encode_utf16().chain(std::iter::once(0)).collect();
    let message: Vec<u16> = message.encode_utf16().chain(std::iter::once(0)).collect();

    unsafe {
        let _ = MessageBoxW(
            None,
            PCWSTR(message.as_ptr()),
            PCWSTR(title.as_ptr()),
            MB_OK | MB_ICONERROR,
        );
    }
}

#[cfg(not(any(target_os = "macos", windows)))]
fn show(title: &str, message: &str) {
    eprintln!("{}: {}", title, message);
}

/// Quotes `s` as an AppleScript string literal.
#[cfg_attr(not(target_os = "macos"), allow(dead_code))]
fn applescript_string(s: &str) -> String {
    let mut quoted = String::with_capacity(s.len() + 2);
    quoted.push('"');
    for c in s.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            _ => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}
