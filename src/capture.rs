// Screen capture via the platform's interactive region-capture utility.

use crate::error::UploadError;
use crate::platform::{Capabilities, ExternalCommand, Platform};
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::debug;

#[cfg(test)]
use mockall::automock;

/// Produces an image file on disk when no input file was given.
#[cfg_attr(test, automock)]
pub trait Capturer {
    fn capture(&self) -> Result<PathBuf, UploadError>;
}

/// Capture file for this process. Named by pid so concurrent invocations
/// never write to the same file.
pub fn capture_target() -> PathBuf {
    std::env::temp_dir().join(format!("image_upload{}.png", std::process::id()))
}

pub struct ScreenCapturer {
    platform: Platform,
    command: Option<ExternalCommand>,
    target: PathBuf,
}

impl ScreenCapturer {
    pub fn new(caps: &Capabilities) -> Self {
        ScreenCapturer {
            platform: caps.platform,
            command: caps.capture.clone(),
            target: capture_target(),
        }
    }
}

impl Capturer for ScreenCapturer {
    fn capture(&self) -> Result<PathBuf, UploadError> {
        let command = self
            .command
            .as_ref()
            .ok_or_else(|| UploadError::UnsupportedPlatform(self.platform.name().to_string()))?;

        debug!("Capturing screen with {} into {}", command.program, self.target.display());
        let status = command
            .to_command(&self.target)
            .status()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => {
                    UploadError::CaptureFailed(format!("'{}' command not found", command.program))
                }
                _ => UploadError::CaptureFailed(format!("{}: {}", command.program, e)),
            })?;

        if !status.success() {
            return Err(UploadError::CaptureFailed(format!(
                "{} exited with {}",
                command.program, status
            )));
        }

        // Cancelling the selection exits cleanly on some platforms but writes nothing.
        if !self.target.is_file() {
            return Err(UploadError::CaptureFailed(format!(
                "{} produced no image",
                command.program
            )));
        }

        Ok(self.target.clone())
    }
}
