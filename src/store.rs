// Local credential persistence: a single JSON object at a fixed path,
// written atomically and restricted to the owner.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::config::default_credentials_path;
use crate::error::{CliError, Result};

/// What gets written to `credentials.json`. Registration fills in the
/// optional fields; a plain "save key" only sets `api_key`.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialRecord {
    pub api_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claim_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verification_code: Option<String>,
}

impl CredentialRecord {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Default::default()
        }
    }
}

/// Reads and writes the credential record at one path.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `<config dir>/moltbook/credentials.json`.
    pub fn default_location() -> Self {
        Self::new(default_credentials_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the saved record. Missing, unreadable or malformed files all
    /// yield `None`; other key sources can still be tried.
    pub fn load(&self) -> Option<CredentialRecord> {
        let content = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No credentials file");
                return None;
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Failed to read credentials file");
                return None;
            }
        };
        match serde_json::from_str::<CredentialRecord>(&content) {
            Ok(record) => {
                debug!(path = %self.path.display(), "Loaded credentials file");
                Some(record)
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Ignoring malformed credentials file");
                None
            }
        }
    }

    /// Replace the record on disk.
    ///
    /// Writes `<file>.tmp` next to the destination and renames it into
    /// place, so readers see either the old or the new file. Permission
    /// tightening is best effort.
    pub fn save(&self, record: &CredentialRecord) -> Result<()> {
        let io_err = |source| CliError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if !parent.exists() {
                debug!(path = %parent.display(), "Creating credentials directory");
                fs::create_dir_all(parent).map_err(io_err)?;
                restrict_dir_permissions(parent);
            }
        }

        let json = serde_json::to_string_pretty(record)?;
        let temp_path = temp_path_for(&self.path);
        {
            let mut file = create_private_file(&temp_path).map_err(io_err)?;
            file.write_all(json.as_bytes()).map_err(io_err)?;
            file.write_all(b"\n").map_err(io_err)?;
            file.sync_all().map_err(io_err)?;
        }
        if let Err(e) = fs::rename(&temp_path, &self.path) {
            let _ = fs::remove_file(&temp_path);
            return Err(io_err(e));
        }
        restrict_file_permissions(&self.path);

        debug!(path = %self.path.display(), "Saved credentials file");
        Ok(())
    }
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "credentials.json".into());
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(unix)]
fn create_private_file(path: &Path) -> std::io::Result<fs::File> {
    use std::os::unix::fs::OpenOptionsExt;
    fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)
}

#[cfg(not(unix))]
fn create_private_file(path: &Path) -> std::io::Result<fs::File> {
    fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
}

#[cfg(unix)]
fn restrict_file_permissions(path: &Path) {
    use std::os::unix::fs::PermissionsExt;
    if let Err(e) = fs::set_permissions(path, fs::Permissions::from_mode(0o600)) {
        warn!(path = %path.display(), error = %e, "Could not restrict credentials file permissions");
    }
}

#[cfg(not(unix))]
fn restrict_file_permissions(_path: &Path) {}

#[cfg(unix)]
fn restrict_dir_permissions(path: &Path) {
    use std::os::unix::fs::PermissionsExt;
    if let Err(e) = fs::set_permissions(path, fs::Permissions::from_mode(0o700)) {
        warn!(path = %path.display(), error = %e, "Could not restrict credentials directory permissions");
    }
}

#[cfg(not(unix))]
fn restrict_dir_permissions(_path: &Path) {}
