//! Login credentials type.

use std::fmt;

/// Credentials exchanged for a session at the login endpoint.
///
/// The backend authenticates users through an external identity provider;
/// the client forwards the provider-issued ID token and receives a
/// credential pair in return.
///
/// # Security
///
/// The ID token is never exposed in Debug output to prevent accidental logging.
///
/// # Example
///
/// ```
/// use bearer_core::Credentials;
///
/// let creds = Credentials::new("eyJhbGciOiJSUzI1NiJ9.payload.sig");
/// assert!(!format!("{:?}", creds).contains("payload"));
/// ```
#[derive(Clone)]
pub struct Credentials {
    id_token: String,
}

impl Credentials {
    /// Create credentials from an identity-provider ID token.
    pub fn new(id_token: impl Into<String>) -> Self {
        Self {
            id_token: id_token.into(),
        }
    }

    /// Returns the ID token.
    ///
    /// # Security
    ///
    /// Use this only when constructing the login request.
    pub fn id_token(&self) -> &str {
        &self.id_token
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("id_token", &"[REDACTED]")
            .finish()
    }
}
