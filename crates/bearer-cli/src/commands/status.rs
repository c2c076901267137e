//! Status command implementation.

use anyhow::Result;
use clap::Args;

use bearer_core::CredentialStore;

use crate::cli::GlobalArgs;
use crate::output;
use crate::session::storage;

#[derive(Args, Debug)]
pub struct StatusArgs {}

pub async fn run(global: &GlobalArgs, _args: StatusArgs) -> Result<()> {
    let store = storage::open_store(global)?;
    let tokens = store.tokens();

    if tokens.is_empty() {
        println!("Not logged in");
        return Ok(());
    }

    output::success("Logged in");
    output::field("Session file", &store.path().display().to_string());
    output::field(
        "Refresh token",
        if tokens.refresh.is_some() {
            "stored"
        } else {
            "none"
        },
    );

    Ok(())
}
