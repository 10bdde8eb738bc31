// Per-platform capability table. Built once in `main` and handed to the
// components that need it, so capture, identity storage and the browser
// opener never branch on the OS themselves.

use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    MacOs,
    Linux,
    Windows,
    Other(&'static str),
}

impl Platform {
    pub fn current() -> Self {
        match std::env::consts::OS {
            "macos" => Platform::MacOs,
            "linux" => Platform::Linux,
            "windows" => Platform::Windows,
            other => Platform::Other(other),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Platform::MacOs => "macos",
            Platform::Linux => "linux",
            Platform::Windows => "windows",
            Platform::Other(name) => name,
        }
    }
}

/// An external program plus its leading arguments. The caller appends the
/// final argument (output path or URL).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalCommand {
    pub program: &'static str,
    pub args: &'static [&'static str],
}

impl ExternalCommand {
    pub fn to_command(&self, last_arg: impl AsRef<std::ffi::OsStr>) -> std::process::Command {
        let mut cmd = std::process::Command::new(self.program);
        cmd.args(self.args).arg(last_arg);
        cmd
    }
}

#[derive(Debug, Clone)]
pub struct Capabilities {
    pub platform: Platform,
    /// Interactive region capture utility, if the platform has one.
    pub capture: Option<ExternalCommand>,
    /// Opens a URL in the default browser.
    pub opener: Option<ExternalCommand>,
    /// Canonical location of the identity file.
    pub identity_path: PathBuf,
}

impl Capabilities {
    /// Capabilities for the running OS and user.
    pub fn detect() -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        let app_data = dirs::data_dir();
        Capabilities::for_platform(Platform::current(), &home, app_data.as_deref())
    }

    /// Pure function of platform and home/app-data directories.
    pub fn for_platform(platform: Platform, home: &Path, app_data: Option<&Path>) -> Self {
        let (capture, opener) = match platform {
            Platform::MacOs => (
                Some(ExternalCommand {
                    program: "screencapture",
                    args: &["-i"],
                }),
                Some(ExternalCommand {
                    program: "open",
                    args: &[],
                }),
            ),
            Platform::Linux => (
                Some(ExternalCommand {
                    program: "import",
                    args: &[],
                }),
                Some(ExternalCommand {
                    program: "xdg-open",
                    args: &[],
                }),
            ),
            Platform::Windows => (
                None,
                Some(ExternalCommand {
                    program: "rundll32",
                    args: &["url.dll,FileProtocolHandler"],
                }),
            ),
            Platform::Other(_) => (None, None),
        };

        Capabilities {
            platform,
            capture,
            opener,
            identity_path: identity_path(platform, home, app_data),
        }
    }
}

fn identity_path(platform: Platform, home: &Path, app_data: Option<&Path>) -> PathBuf {
    match platform {
        Platform::MacOs => home.join("Library").join("Gyazo").join("id"),
        Platform::Windows => app_data
            .unwrap_or(home)
            .join("Gyazo")
            .join("id.txt"),
        Platform::Linux | Platform::Other(_) => home.join(".gyazo.id"),
    }
}
