//! Session storage for persisting login state.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use directories::ProjectDirs;

use bearer_core::ApiUrl;
use bearer_core::error::{AuthError, Error};
use bearer_file::FileStore;
use bearer_http::{AuthenticatedClient, ClientConfig};

use crate::cli::GlobalArgs;
use crate::output;

/// Get the session file path.
///
/// An explicit `--session-file` wins over the platform data directory.
pub fn session_path(global: &GlobalArgs) -> Result<PathBuf> {
    if let Some(path) = &global.session_file {
        return Ok(path.clone());
    }

    let dirs =
        ProjectDirs::from("", "", "bearer").context("Could not determine data directory")?;

    let data_dir = dirs.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data directory")?;

    Ok(data_dir.join("session.json"))
}

/// Open the file-backed session store.
pub fn open_store(global: &GlobalArgs) -> Result<Arc<FileStore>> {
    let path = session_path(global)?;
    tracing::debug!(path = %path.display(), "Using session file");
    Ok(Arc::new(FileStore::new(path)))
}

/// Build a client over the stored session.
///
/// When a refresh fails the session file is cleared by the client and the
/// user is told to log in again.
pub fn open_client(global: &GlobalArgs) -> Result<AuthenticatedClient> {
    let api = ApiUrl::new(&global.api).context("Invalid API URL")?;
    let mut config = ClientConfig::new(api).with_rotation(global.rotation);
    if let Some(path) = &global.refresh_path {
        config = config.with_refresh_path(path.as_str());
    }

    let store = open_store(global)?;
    let client = AuthenticatedClient::new(
        config,
        store,
        Arc::new(|| output::warning("Session expired. Run 'bearer login' to sign in again.")),
    )
    .context("Failed to create API client")?;

    Ok(client)
}

/// Build a client over the stored session, failing if there is none.
pub fn open_session(global: &GlobalArgs) -> Result<AuthenticatedClient> {
    let client = open_client(global)?;
    if !client.is_authenticated() {
        return Err(Error::from(AuthError::NotAuthenticated))
            .context("No active session. Run 'bearer login' first.");
    }
    Ok(client)
}
