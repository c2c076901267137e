//! JSON-file credential store.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use bearer_core::{AccessToken, CredentialStore, RefreshToken, TokenPair};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// On-disk representation of the credential pair.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredTokens {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    saved_at: Option<DateTime<Utc>>,
}

/// A [`CredentialStore`] persisted as a single JSON file.
///
/// The file survives process restarts, so a session established by one run
/// is picked up by the next. Writes replace the file atomically (temporary
/// file + rename) while holding an exclusive lock on a sidecar `.lock`
/// file; reads hold a shared lock. Several processes can therefore share one
/// session file without observing half of a pair.
///
/// A missing, unreadable, or corrupt file reads as an empty pair.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Create a store backed by the file at `path`.
    ///
    /// Nothing is touched on disk until the first write.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Path of the session file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".lock");
        self.path.with_file_name(name)
    }

    fn open_lock(&self) -> io::Result<File> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.lock_path())
    }

    fn load(&self) -> io::Result<Option<StoredTokens>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let lock = self.open_lock()?;
        lock.lock_shared()?;
        let result = fs::read_to_string(&self.path);
        let _ = FileExt::unlock(&lock);

        let json = match result {
            Ok(json) => json,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        };

        match serde_json::from_str::<StoredTokens>(&json) {
            Ok(stored) => Ok(Some(stored)),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Ignoring corrupt session file");
                Ok(None)
            }
        }
    }

    fn write(&self, tokens: &TokenPair) -> io::Result<()> {
        let stored = StoredTokens {
            access_token: tokens.access.as_ref().map(|t| t.as_str().to_string()),
            refresh_token: tokens.refresh.as_ref().map(|t| t.as_str().to_string()),
            saved_at: Some(Utc::now()),
        };
        let json = serde_json::to_string_pretty(&stored).map_err(io::Error::other)?;

        let lock = self.open_lock()?;
        lock.lock_exclusive()?;
        let result = self.replace_with(json.as_bytes());
        let _ = FileExt::unlock(&lock);
        result
    }

    fn replace_with(&self, contents: &[u8]) -> io::Result<()> {
        let tmp = self
            .path
            .with_file_name(format!(".session-{}.tmp", Uuid::new_v4()));

        let written = (|| {
            let mut file = OpenOptions::new()
                .create_new(true)
                .write(true)
                .open(&tmp)?;

            // Set restrictive permissions before any secret is written (Unix only)
            #[cfg(unix)]
            file.set_permissions(fs::Permissions::from_mode(0o600))?;

            file.write_all(contents)?;
            file.sync_all()?;
            fs::rename(&tmp, &self.path)
        })();

        if written.is_err() {
            let _ = fs::remove_file(&tmp);
        }
        written
    }

    fn remove(&self) -> io::Result<()> {
        let lock = self.open_lock()?;
        lock.lock_exclusive()?;
        let result = match fs::remove_file(&self.path) {
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            other => other,
        };
        let _ = FileExt::unlock(&lock);
        result
    }
}

impl CredentialStore for FileStore {
    fn tokens(&self) -> TokenPair {
        match self.load() {
            Ok(Some(stored)) => TokenPair {
                access: stored.access_token.map(AccessToken::new),
                refresh: stored.refresh_token.map(RefreshToken::new),
            },
            Ok(None) => TokenPair::empty(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Failed to read session file");
                TokenPair::empty()
            }
        }
    }

    #[instrument(skip(self, tokens), fields(path = %self.path.display()))]
    fn set_tokens(&self, tokens: &TokenPair) {
        match self.write(tokens) {
            Ok(()) => debug!("Session file written"),
            Err(e) => warn!(error = %e, "Failed to write session file"),
        }
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    fn clear(&self) {
        match self.remove() {
            Ok(()) => debug!("Session file removed"),
            Err(e) => warn!(error = %e, "Failed to remove session file"),
        }
    }
}
