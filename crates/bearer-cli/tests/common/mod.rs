use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use bearer_core::{AccessToken, CredentialStore, RefreshToken, TokenPair};
use bearer_file::FileStore;

/// Run the CLI against `api` with an isolated session file.
pub fn run_cli(args: &[&str], session_file: &Path, api: &str) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_bearer"));
    cmd.args(args);
    cmd.env("BEARER_SESSION_FILE", session_file);
    cmd.env("BEARER_API", api);
    cmd.env_remove("BEARER_ID_TOKEN");
    cmd.env("NO_COLOR", "1");
    cmd.output().expect("Failed to execute CLI")
}

/// Run the CLI on a blocking thread so a mock server on the test runtime
/// keeps serving.
pub async fn run_cli_async(args: &[&str], session_file: &Path, api: &str) -> Output {
    let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
    let session_file = session_file.to_path_buf();
    let api = api.to_string();
    tokio::task::spawn_blocking(move || {
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        run_cli(&args, &session_file, &api)
    })
    .await
    .expect("CLI thread panicked")
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

/// Session file path inside a temp directory.
pub fn session_file(dir: &tempfile::TempDir) -> PathBuf {
    dir.path().join("session.json")
}

/// Write a session directly, as a previous login would have.
pub fn seed_session(path: &Path, access: &str, refresh: Option<&str>) {
    FileStore::new(path).set_tokens(&TokenPair::new(
        AccessToken::new(access),
        refresh.map(RefreshToken::new),
    ));
}

pub fn stored_tokens(path: &Path) -> TokenPair {
    FileStore::new(path).tokens()
}
