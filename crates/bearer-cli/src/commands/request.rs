//! Request command implementation.

use anyhow::{Context, Result, anyhow, bail};
use clap::Args;

use bearer_core::{ApiRequest, Method};

use crate::cli::GlobalArgs;
use crate::session::storage;

#[derive(Args, Debug)]
pub struct RequestArgs {
    /// HTTP method (GET, POST, PUT, PATCH, DELETE)
    pub method: String,

    /// Path relative to the API base URL
    pub path: String,

    /// JSON request body
    #[arg(long, short)]
    pub data: Option<String>,

    /// Query parameter as KEY=VALUE (repeatable)
    #[arg(long, short)]
    pub query: Vec<String>,

    /// Extra header as NAME:VALUE (repeatable)
    #[arg(long = "header", short = 'H')]
    pub headers: Vec<String>,
}

fn split_pair(raw: &str, separator: char) -> Result<(String, String)> {
    let (key, value) = raw
        .split_once(separator)
        .ok_or_else(|| anyhow!("expected '{}' in '{}'", separator, raw))?;
    Ok((key.trim().to_string(), value.trim().to_string()))
}

fn build_request(args: RequestArgs) -> Result<ApiRequest> {
    let method: Method = args.method.parse().context("Invalid method")?;
    let mut request = ApiRequest::new(method, args.path);

    for raw in &args.query {
        let (key, value) = split_pair(raw, '=').context("Invalid query parameter")?;
        request = request.query(key, value);
    }

    for raw in &args.headers {
        let (name, value) = split_pair(raw, ':').context("Invalid header")?;
        request = request.header(name, value);
    }

    if let Some(data) = args.data {
        let body: serde_json::Value =
            serde_json::from_str(&data).context("Request body is not valid JSON")?;
        request = request.with_body(body);
    }

    Ok(request)
}

pub async fn run(global: &GlobalArgs, args: RequestArgs) -> Result<()> {
    let request = build_request(args)?;
    let client = storage::open_client(global)?;

    let response = client.send(request).await.context("Request failed")?;

    let text = response.text();
    if !text.is_empty() {
        println!("{}", text);
    }

    if !response.is_success() {
        bail!("Server responded with status {}", response.status());
    }

    Ok(())
}
