//! Logout command implementation.

use anyhow::Result;
use clap::Args;

use crate::cli::GlobalArgs;
use crate::output;
use crate::session::storage;

#[derive(Args, Debug)]
pub struct LogoutArgs {}

pub async fn run(global: &GlobalArgs, _args: LogoutArgs) -> Result<()> {
    let client = storage::open_client(global)?;
    if !client.is_authenticated() {
        println!("Not logged in");
        return Ok(());
    }

    client.logout().await;

    output::success("Logged out");

    Ok(())
}
