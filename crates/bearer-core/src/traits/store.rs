//! Credential store trait.

use crate::tokens::{AccessToken, RefreshToken, TokenPair};

/// Single source of truth for the current credential pair.
///
/// Implementations have no error conditions: a missing or unreadable store
/// reads as an empty pair, and a failed write is the implementation's to
/// report (typically by logging). Both tokens always change together.
pub trait CredentialStore: Send + Sync {
    /// Returns a consistent snapshot of both tokens.
    fn tokens(&self) -> TokenPair;

    /// Replaces both tokens atomically.
    fn set_tokens(&self, tokens: &TokenPair);

    /// Removes both tokens.
    fn clear(&self);

    /// Returns the current access token, if any.
    fn access_token(&self) -> Option<AccessToken> {
        self.tokens().access
    }

    /// Returns the current refresh token, if any.
    fn refresh_token(&self) -> Option<RefreshToken> {
        self.tokens().refresh
    }
}
