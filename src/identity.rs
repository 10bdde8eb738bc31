// Local persistence of the anonymous-upload identity issued by the server.
//
// One current identity file lives at the canonical path. Replacing it first
// renames the old file to `<old-id>_<YYYYMMDDHHMMSS>.bak` in the same
// directory, then writes the new value. Backups are never pruned.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Opaque server-issued token attributing anonymous uploads to one install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity(String);

impl Identity {
    pub fn new(value: impl Into<String>) -> Self {
        Identity(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

const BACKUP_TIMESTAMP: &str = "%Y%m%d%H%M%S";

pub struct IdentityStore {
    path: PathBuf,
}

impl IdentityStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        IdentityStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current identity, or `None` if the file is missing, unreadable or empty.
    pub fn load(&self) -> Option<Identity> {
        match fs::read_to_string(&self.path) {
            Ok(body) if !body.is_empty() => Some(Identity(body)),
            Ok(_) => None,
            Err(e) => {
                debug!("No stored identity at {}: {}", self.path.display(), e);
                None
            }
        }
    }

    /// Make `id` the current identity, rotating any previous value to a
    /// timestamped backup first. Empty identities and the already-current
    /// identity are ignored.
    pub fn store(&self, id: &Identity) -> io::Result<()> {
        if id.is_empty() {
            return Ok(());
        }

        let previous = self.load();
        if previous.as_ref() == Some(id) {
            debug!("Identity unchanged, nothing to store");
            return Ok(());
        }

        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }

        if self.path.exists() {
            let backup = self.backup_path(previous.as_ref());
            fs::rename(&self.path, &backup)?;
            info!("Previous identity moved to {}", backup.display());
        }

        fs::write(&self.path, id.as_str())?;
        info!("Stored identity at {}", self.path.display());
        Ok(())
    }

    fn backup_path(&self, previous: Option<&Identity>) -> PathBuf {
        let stamp = chrono::Local::now().format(BACKUP_TIMESTAMP);
        let stem: String = previous
            .map(|p| p.as_str())
            .unwrap_or_default()
            .chars()
            .map(|c| if c == '/' || c == '\\' { '_' } else { c })
            .collect();
        let name = format!("{}_{}.bak", stem, stamp);
        match self.path.parent() {
            Some(dir) => dir.join(name),
            None => PathBuf::from(name),
        }
    }
}
