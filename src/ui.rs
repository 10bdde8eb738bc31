// Terminal side effects around the pipeline: logging setup, the upload
// spinner, printing the URL and handing it to the browser. None of these can
// change whether an upload succeeded.

use crate::api::{RawResponse, Transport, UploadRequest};
use crate::error::UploadError;
use crate::platform::ExternalCommand;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::Write;
use std::process::Stdio;
use std::time::Duration;
use tracing::{debug, warn};

/// Install the stderr log subscriber. WARN by default, DEBUG when verbose.
pub fn setup_logging(verbose: bool) -> anyhow::Result<()> {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialise logging: {e}"))
}

/// Shows a spinner on stderr while the wrapped transport is sending.
pub struct Spinning<T>(pub T);

impl<T: Transport> Transport for Spinning<T> {
    fn send(&self, request: UploadRequest) -> Result<RawResponse, UploadError> {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.set_message("Uploading...");
        spinner.enable_steady_tick(Duration::from_millis(100));

        let result = self.0.send(request);
        spinner.finish_and_clear();
        result
    }
}

/// Write the URL as one line, adding the newline only if the server did not.
pub fn print_url(out: &mut impl Write, url: &str) -> std::io::Result<()> {
    if url.ends_with('\n') {
        write!(out, "{url}")
    } else {
        writeln!(out, "{url}")
    }
}

/// Fire-and-forget: spawn the opener and do not wait for it.
pub fn open_in_browser(opener: Option<&ExternalCommand>, url: &str) {
    let Some(opener) = opener else {
        debug!("No browser opener on this platform");
        return;
    };

    let spawned = opener
        .to_command(url.trim())
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn();
    if let Err(e) = spawned {
        warn!("Failed to open by default browser: {}", e);
    }
}
