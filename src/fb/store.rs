//! JSON file persistence for the watchlist.

use std::fs;
use std::path::{Path, PathBuf};

use super::error::FbError;
use super::watchlist::Watchlist;

/// Location of the watchlist inside the dotfile directory.
pub const DEFAULT_STORE_FILE: &str = ".fo/fb-watchlist.json";

/// Persists a [`Watchlist`] as pretty-printed JSON, readable only by the
/// owner on unix.
#[derive(Debug, Clone)]
pub struct WatchlistStore {
    path: PathBuf,
}

impl WatchlistStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store under `~/.fo/fb-watchlist.json`. Fails when no home directory
    /// can be determined.
    pub fn in_home() -> Result<Self, FbError> {
        let home = std::env::var_os("HOME")
            .or_else(|| std::env::var_os("USERPROFILE"))
            .ok_or_else(|| FbError::Store("no home directory".into()))?;
        Ok(Self::new(Path::new(&home).join(DEFAULT_STORE_FILE)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the watchlist. A missing file is an empty list.
    pub fn load(&self) -> Result<Watchlist, FbError> {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Watchlist::new()),
            Err(e) => return Err(self.io_err("reading", e)),
        };
        Ok(serde_json::from_str(&data)?)
    }

    /// Write the watchlist, creating parent directories as needed.
    pub fn save(&self, watchlist: &Watchlist) -> Result<(), FbError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.io_err("creating directory for", e))?;
        }
        let json = serde_json::to_string_pretty(watchlist)?;
        fs::write(&self.path, json).map_err(|e| self.io_err("writing", e))?;
        restrict_permissions(&self.path)?;
        tracing::debug!(path = %self.path.display(), entries = watchlist.len(), "watchlist saved");
        Ok(())
    }

    fn io_err(&self, action: &str, e: std::io::Error) -> FbError {
        FbError::Store(format!("{action} {}: {e}", self.path.display()))
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<(), FbError> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
        .map_err(|e| FbError::Store(format!("setting permissions on {}: {e}", path.display())))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<(), FbError> {
    Ok(())
}
