//! In-memory credential store.

use std::sync::RwLock;

use crate::tokens::TokenPair;
use crate::traits::CredentialStore;

/// A [`CredentialStore`] that lives only as long as the process.
///
/// Useful for tests and for short-lived tools that log in on every run.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tokens: RwLock<TokenPair>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store already holding `tokens`.
    pub fn with_tokens(tokens: TokenPair) -> Self {
        Self {
            tokens: RwLock::new(tokens),
        }
    }
}

impl CredentialStore for MemoryStore {
    fn tokens(&self) -> TokenPair {
        // A poisoned lock still holds a whole pair; writers never leave it half-updated.
        self.tokens
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn set_tokens(&self, tokens: &TokenPair) {
        let mut guard = self
            .tokens
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = tokens.clone();
    }

    fn clear(&self) {
        self.set_tokens(&TokenPair::empty());
    }
}
