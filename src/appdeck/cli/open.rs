use appdeck::error::{DeckError, Result};
use std::process::{Command, Stdio};

/// Overrides the platform opener, e.g. `BROWSER=firefox`.
const ENV_BROWSER: &str = "BROWSER";

/// Hands the URL to the browser and returns without waiting for it.
pub(super) fn open_url(url: &str) -> Result<()> {
    let mut command = opener(url);
    command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());
    tracing::debug!(?command, "opening url");

    command
        .spawn()
        .map(|_| ())
        .map_err(|e| DeckError::Api(format!("Could not open {}: {}", url, e)))
}

fn opener(url: &str) -> Command {
    if let Some(browser) = std::env::var(ENV_BROWSER)
        .ok()
        .filter(|b| !b.trim().is_empty())
    {
        let mut command = Command::new(browser.trim());
        command.arg(url);
        return command;
    }

    if cfg!(target_os = "macos") {
        let mut command = Command::new("open");
        command.arg(url);
        command
    } else if cfg!(target_os = "windows") {
        let mut command = Command::new("cmd");
        command.args(["/C", "start", "", url]);
        command
    } else {
        let mut command = Command::new("xdg-open");
        command.arg(url);
        command
    }
}
