//! Whoami command implementation.

use anyhow::{Context, Result};
use clap::Args;

use bearer_core::ApiRequest;

use crate::cli::GlobalArgs;
use crate::output;
use crate::session::storage;

#[derive(Args, Debug)]
pub struct WhoamiArgs {}

pub async fn run(global: &GlobalArgs, _args: WhoamiArgs) -> Result<()> {
    let client = storage::open_session(global)?;

    let profile: serde_json::Value = client
        .send_json(ApiRequest::get("/my"))
        .await
        .context("Failed to fetch profile")?;

    output::json_pretty(&profile)
}
