//! Auth endpoint paths and request/response types.

use serde::{Deserialize, Serialize};

// ============================================================================
// Endpoint Paths
// ============================================================================

/// Exchanges an identity-provider ID token for a token pair.
pub const DEFAULT_LOGIN_PATH: &str = "/auth/google";

/// Exchanges a refresh token for a new access token.
pub const DEFAULT_REFRESH_PATH: &str = "/auth/refresh";

/// Acknowledges an explicit logout.
pub const DEFAULT_LOGOUT_PATH: &str = "/auth/logout";

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for the login endpoint.
#[derive(Debug, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub token: &'a str,
}

/// Response from the login endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub user: Option<UserSummary>,
}

/// Request body for the refresh endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RefreshRequest<'a> {
    pub refresh_token: &'a str,
}

/// Response from the refresh endpoint.
/// The refresh token is only present if the server rotates it.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RefreshResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// The account summary returned alongside a fresh token pair.
///
/// Only the identifying fields are typed; everything else the server sends
/// (profile settings, counters) is kept verbatim in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Result of a successful login.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoginOutcome {
    pub user: Option<UserSummary>,
}
