//! System browser integration.
//!
//! Opens URLs (the OAuth provider page) with the platform's opener.

use anyhow::{Context, Result};
use std::process::{Command, Stdio};

/// Opener commands to try, in order, for the current platform.
fn openers() -> Vec<(&'static str, Vec<&'static str>)> {
    if cfg!(target_os = "macos") {
        vec![("open", vec![])]
    } else if cfg!(target_os = "windows") {
        vec![("cmd", vec!["/C", "start", ""])]
    } else {
        vec![
            ("xdg-open", vec![]),
            ("gio", vec!["open"]),
            ("sensible-browser", vec![]),
        ]
    }
}

/// Open a URL in the default browser.
///
/// # Arguments
/// * `url` - URL to open
///
/// # Returns
/// * `Result<()>` - Success or error
///
/// # Details
/// `$BROWSER` wins when set. Otherwise tries the platform openers in order
/// and returns once one of them starts. Output is discarded so it cannot
/// draw over the terminal UI.
pub fn open_in_browser(url: &str) -> Result<()> {
    if let Ok(browser) = std::env::var("BROWSER")
        && !browser.is_empty()
        && spawn_quiet(&browser, &[], url).is_ok()
    {
        return Ok(());
    }

    for (program, args) in openers() {
        if spawn_quiet(program, &args, url).is_ok() {
            return Ok(());
        }
    }

    Err(anyhow::anyhow!(
        "Failed to open a browser. Open this URL manually: {}",
        url
    ))
}

fn spawn_quiet(program: &str, args: &[&str], url: &str) -> Result<()> {
    Command::new(program)
        .args(args)
        .arg(url)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .with_context(|| format!("Failed to run {}", program))?;
    Ok(())
}
