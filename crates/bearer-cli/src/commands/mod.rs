//! Subcommand implementations.

mod login;
mod logout;
mod refresh;
mod request;
mod status;
mod whoami;

use anyhow::Result;
use clap::Subcommand;

use crate::cli::GlobalArgs;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Exchange an identity-provider ID token for a session
    Login(login::LoginArgs),

    /// Show whether a session is stored
    Status(status::StatusArgs),

    /// Fetch the signed-in user's profile
    Whoami(whoami::WhoamiArgs),

    /// Send an authenticated request
    Request(request::RequestArgs),

    /// Refresh the access token now
    Refresh(refresh::RefreshArgs),

    /// End the session
    Logout(logout::LogoutArgs),
}

pub async fn handle(global: GlobalArgs, command: Command) -> Result<()> {
    match command {
        Command::Login(args) => login::run(&global, args).await,
        Command::Status(args) => status::run(&global, args).await,
        Command::Whoami(args) => whoami::run(&global, args).await,
        Command::Request(args) => request::run(&global, args).await,
        Command::Refresh(args) => refresh::run(&global, args).await,
        Command::Logout(args) => logout::run(&global, args).await,
    }
}
