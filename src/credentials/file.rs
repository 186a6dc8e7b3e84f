//! File-backed credential repository with atomic saves.

use super::{CredentialRepository, CredentialStore};
use crate::error::{ApiError, StorageError};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

#[cfg(unix)]
const FILE_MODE: u32 = 0o600;

/// JSON credential store at a fixed path.
#[derive(Debug, Clone)]
pub struct FileCredentialRepository {
    path: PathBuf,
}

impl FileCredentialRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Sibling temp file used for atomic replacement.
    ///
    /// Lives in the target's directory so the final rename never crosses filesystems.
    /// The pid suffix keeps concurrent invocations from sharing one temp file.
    pub fn temp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "credentials.json".to_string());
        self.path
            .with_file_name(format!(".{}.tmp.{}", name, std::process::id()))
    }

    fn ensure_parent_dir(&self) -> Result<(), StorageError> {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => {
                fs::create_dir_all(parent).map_err(|e| StorageError::io(parent, e))
            }
            _ => Ok(()),
        }
    }

    /// The temp file is owner-only before any key material reaches it.
    fn write_temp(&self, contents: &[u8]) -> Result<PathBuf, StorageError> {
        let temp = self.temp_path();
        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(FILE_MODE);
        }
        let mut file = options.open(&temp).map_err(|e| StorageError::io(&temp, e))?;

        // A stale temp file keeps its old mode through open
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(fs::Permissions::from_mode(FILE_MODE))
                .map_err(|e| StorageError::io(&temp, e))?;
        }

        file.write_all(contents)
            .and_then(|_| file.sync_all())
            .map_err(|e| StorageError::io(&temp, e))?;
        Ok(temp)
    }

    fn commit(&self, temp: &Path) -> Result<(), StorageError> {
        fs::rename(temp, &self.path).map_err(|e| StorageError::io(&self.path, e))
    }
}

pub(crate) fn render(store: &CredentialStore) -> Result<String, StorageError> {
    let mut rendered = serde_json::to_string_pretty(store)?;
    rendered.push('\n');
    Ok(rendered)
}

impl CredentialRepository for FileCredentialRepository {
    fn load(&self) -> Result<CredentialStore, ApiError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(
                    "Credential store {} not found, starting empty",
                    self.path.display()
                );
                return Ok(CredentialStore::default());
            }
            Err(e) => return Err(StorageError::io(&self.path, e).into()),
        };

        serde_json::from_str(&content).map_err(|source| {
            ApiError::from(StorageError::Malformed {
                path: self.path.clone(),
                source,
            })
        })
    }

    fn save(&self, store: &CredentialStore) -> Result<(), ApiError> {
        self.ensure_parent_dir()?;
        let rendered = render(store)?;

        let temp = match self.write_temp(rendered.as_bytes()) {
            Ok(temp) => temp,
            Err(e) => {
                let _ = fs::remove_file(self.temp_path());
                return Err(e.into());
            }
        };
        if let Err(e) = self.commit(&temp) {
            let _ = fs::remove_file(&temp);
            return Err(e.into());
        }

        tracing::debug!(
            agents = store.agents.len(),
            devices = store.devices.len(),
            "Saved credential store {}",
            self.path.display()
        );
        Ok(())
    }

    fn path(&self) -> &Path {
        &self.path
    }
}
