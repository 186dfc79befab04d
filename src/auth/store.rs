use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use log::{info, warn};

use super::{AuthError, Credential};

/// A single credential persisted as JSON on local disk.
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load the stored credential.
    ///
    /// A missing or unreadable file yields `None`. A file that does not parse
    /// is deleted and also yields `None`, so the caller falls back to
    /// bootstrapping.
    pub fn load(&self) -> Option<Credential> {
        let raw = match fs::read(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!("cannot read {}: {}", self.path.display(), e);
                return None;
            }
        };

        match serde_json::from_slice(&raw) {
            Ok(credential) => {
                info!("credential loaded from {}", self.path.display());
                Some(credential)
            }
            Err(e) => {
                warn!("discarding corrupt credential {}: {}", self.path.display(), e);
                if let Err(e) = fs::remove_file(&self.path) {
                    warn!("could not delete {}: {}", self.path.display(), e);
                }
                None
            }
        }
    }

    /// Overwrite the stored credential. On unix the file is readable by the owner only.
    pub fn save(&self, credential: &Credential) -> Result<(), AuthError> {
        let json = serde_json::to_string_pretty(credential)?;
        write_private(&self.path, json.as_bytes()).map_err(|source| AuthError::Store {
            path: self.path.clone(),
            source,
        })?;
        info!("credential saved to {}", self.path.display());
        Ok(())
    }
}

fn write_private(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let mut opts = OpenOptions::new();
    opts.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        opts.mode(0o600);
    }
    let mut file = opts.open(path)?;

    // mode() only applies on creation; tighten a file left by an older run
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(fs::Permissions::from_mode(0o600))?;
    }

    file.write_all(data)?;
    file.flush()
}
