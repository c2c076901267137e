//! Refresh command implementation.

use anyhow::{Context, Result};
use clap::Args;

use crate::cli::GlobalArgs;
use crate::output;
use crate::session::storage;

#[derive(Args, Debug)]
pub struct RefreshArgs {}

pub async fn run(global: &GlobalArgs, _args: RefreshArgs) -> Result<()> {
    let client = storage::open_session(global)?;

    output::progress("Refreshing access token...");

    client.refresh().await.context("Failed to refresh session")?;

    output::success("Access token refreshed");

    Ok(())
}
