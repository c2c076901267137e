//! bearer-http - Authenticated HTTP client with single-flight credential refresh.
//!
//! [`AuthenticatedClient`] attaches the stored access token to every request.
//! When the server answers `401`, the shared [`RefreshCoordinator`] performs
//! one refresh exchange for every request that failed in the meantime,
//! replays each of them with the renewed token, and ends the session if the
//! exchange itself fails.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use bearer_core::{ApiRequest, ApiUrl, MemoryStore, NoopLogout};
//! use bearer_http::{AuthenticatedClient, ClientConfig};
//!
//! # async fn example() -> Result<(), bearer_core::Error> {
//! let config = ClientConfig::new(ApiUrl::new("https://example.com/api")?);
//! let store = Arc::new(MemoryStore::new());
//! let client = AuthenticatedClient::new(config, store, Arc::new(NoopLogout))?;
//!
//! let response = client.send(ApiRequest::get("/chat")).await?;
//! println!("{}: {}", response.status(), response.text());
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod coordinator;
mod endpoints;
mod transport;

#[cfg(test)]
mod testing;

pub use client::AuthenticatedClient;
pub use config::{ClientConfig, RotationPolicy};
pub use coordinator::RefreshCoordinator;
pub use endpoints::{LoginOutcome, UserSummary};
pub use transport::ReqwestTransport;
