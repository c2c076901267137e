//! bearer-core - Core types and traits for the bearer API client.
//!
//! Everything here is transport-agnostic: token and credential types, the
//! request/response descriptors exchanged with a [`Transport`], the
//! [`CredentialStore`] that holds the current [`TokenPair`], and the unified
//! [`Error`] type.

pub mod credentials;
pub mod error;
pub mod store;
pub mod tokens;
pub mod traits;
pub mod types;

pub use credentials::Credentials;
pub use error::Error;
pub use store::MemoryStore;
pub use tokens::{AccessToken, RefreshToken, TokenPair};
pub use traits::{CredentialStore, LogoutSignal, NoopLogout, Transport};
pub use types::{ApiRequest, ApiResponse, ApiUrl, Method};

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
