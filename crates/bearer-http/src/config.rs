//! Client configuration.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use bearer_core::error::{Error, InvalidInputError};
use bearer_core::{ApiUrl, RefreshToken};

use crate::endpoints::{DEFAULT_LOGIN_PATH, DEFAULT_LOGOUT_PATH, DEFAULT_REFRESH_PATH};

/// What to do with the refresh token after a successful refresh exchange.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RotationPolicy {
    /// Store the refresh token returned by the exchange, if any; otherwise
    /// keep the current one.
    #[default]
    AcceptRotated,
    /// Always keep the current refresh token, ignoring any returned one.
    KeepExisting,
}

impl RotationPolicy {
    /// Pick the refresh token to store after an exchange.
    pub fn resolve(self, current: RefreshToken, issued: Option<RefreshToken>) -> RefreshToken {
        match (self, issued) {
            (RotationPolicy::AcceptRotated, Some(issued)) => issued,
            _ => current,
        }
    }
}

impl fmt::Display for RotationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RotationPolicy::AcceptRotated => f.write_str("accept-rotated"),
            RotationPolicy::KeepExisting => f.write_str("keep-existing"),
        }
    }
}

impl FromStr for RotationPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "accept-rotated" | "accept" => Ok(RotationPolicy::AcceptRotated),
            "keep-existing" | "keep" => Ok(RotationPolicy::KeepExisting),
            other => Err(InvalidInputError::Other {
                message: format!(
                    "unknown rotation policy '{}' (expected accept-rotated or keep-existing)",
                    other
                ),
            }
            .into()),
        }
    }
}

/// Configuration for [`AuthenticatedClient`](crate::AuthenticatedClient).
///
/// Paths are relative to [`api`](Self::api).
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the API.
    pub api: ApiUrl,
    /// Endpoint exchanging identity-provider credentials for a token pair.
    pub login_path: String,
    /// Endpoint exchanging a refresh token for a new access token.
    pub refresh_path: String,
    /// Endpoint notified on explicit logout.
    pub logout_path: String,
    /// Refresh-token rotation behavior.
    pub rotation: RotationPolicy,
    /// Timeout applied to every request.
    pub request_timeout: Duration,
    /// Upper bound on a whole refresh exchange.
    pub refresh_timeout: Duration,
    /// User-Agent header value.
    pub user_agent: String,
}

impl ClientConfig {
    /// Configuration with default endpoints and timeouts.
    pub fn new(api: ApiUrl) -> Self {
        Self {
            api,
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            refresh_path: DEFAULT_REFRESH_PATH.to_string(),
            logout_path: DEFAULT_LOGOUT_PATH.to_string(),
            rotation: RotationPolicy::default(),
            request_timeout: Duration::from_secs(30),
            refresh_timeout: Duration::from_secs(15),
            user_agent: concat!("bearer/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }

    pub fn with_login_path(mut self, path: impl Into<String>) -> Self {
        self.login_path = path.into();
        self
    }

    pub fn with_refresh_path(mut self, path: impl Into<String>) -> Self {
        self.refresh_path = path.into();
        self
    }

    pub fn with_logout_path(mut self, path: impl Into<String>) -> Self {
        self.logout_path = path.into();
        self
    }

    pub fn with_rotation(mut self, rotation: RotationPolicy) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_refresh_timeout(mut self, timeout: Duration) -> Self {
        self.refresh_timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}
