//! Login command implementation.

use anyhow::{Context, Result};
use clap::Args;

use bearer_core::Credentials;

use crate::cli::GlobalArgs;
use crate::output;
use crate::session::storage;

#[derive(Args, Debug)]
pub struct LoginArgs {
    /// ID token issued by the identity provider
    #[arg(long, env = "BEARER_ID_TOKEN", hide_env_values = true)]
    pub id_token: String,
}

pub async fn run(global: &GlobalArgs, args: LoginArgs) -> Result<()> {
    let client = storage::open_client(global)?;
    let credentials = Credentials::new(args.id_token);

    output::progress("Logging in...");

    let outcome = client
        .login(&credentials)
        .await
        .context("Failed to login")?;

    output::success("Logged in successfully");
    println!();
    output::field("API", client.config().api.as_str());
    if let Some(user) = outcome.user {
        output::field("User", &user.id);
        if let Some(email) = user.email {
            output::field("Email", &email);
        }
        if let Some(name) = user.name {
            output::field("Name", &name);
        }
    }

    Ok(())
}
