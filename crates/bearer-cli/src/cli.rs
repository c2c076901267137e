//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser};

use bearer_http::RotationPolicy;

use crate::commands::Command;

/// Talk to an API with automatic access-token refresh.
#[derive(Parser, Debug)]
#[command(name = "bearer")]
#[command(author, version = env!("BEARER_VERSION"), about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Options shared by every command.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// API base URL
    #[arg(long, env = "BEARER_API", default_value = "http://localhost:5000", global = true)]
    pub api: String,

    /// Session file (defaults to the platform data directory)
    #[arg(long, env = "BEARER_SESSION_FILE", global = true)]
    pub session_file: Option<PathBuf>,

    /// What to do with a refresh token returned by the refresh endpoint
    #[arg(long, default_value_t = RotationPolicy::AcceptRotated, global = true)]
    pub rotation: RotationPolicy,

    /// Refresh endpoint path (defaults to the client's refresh endpoint)
    #[arg(long, global = true)]
    pub refresh_path: Option<String>,
}
