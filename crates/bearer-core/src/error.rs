//! Error types for the bearer client.
//!
//! This module provides a unified error type with explicit variants for
//! transport, authentication, protocol, and input validation errors.

use std::fmt;

use serde::Deserialize;
use thiserror::Error;

use crate::types::ApiResponse;

/// The unified error type for bearer operations.
///
/// Note that an HTTP error status is not an error at this level: requests
/// sent through the client return the response as received. Only failures
/// the client cannot hand back as a response end up here.
#[derive(Debug, Error)]
pub enum Error {
    /// Network transport errors (DNS, TLS, connection, timeout).
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Authentication errors (rejected login, expired session).
    #[error("authentication error: {0}")]
    Auth(#[from] AuthError),

    /// Protocol errors (unexpected status or body from an auth endpoint).
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Input validation errors (bad URL, unserializable body).
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),
}

impl Error {
    /// Returns true if this error ended the session.
    pub fn is_session_expired(&self) -> bool {
        matches!(self, Error::Auth(AuthError::SessionExpired))
    }
}

/// Transport-level errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network connection failed.
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// Request timed out.
    #[error("request timed out after {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    /// Response body could not be read or decoded.
    #[error("invalid response body: {message}")]
    Body { message: String },

    /// Generic HTTP error.
    #[error("HTTP error: {message}")]
    Http { message: String },
}

/// Authentication-related errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// The login endpoint rejected the credentials.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The refresh exchange failed and the session was torn down.
    #[error("session expired")]
    SessionExpired,

    /// No usable refresh token is stored.
    #[error("refresh token invalid")]
    RefreshTokenInvalid,

    /// The operation needs a stored session and there is none.
    #[error("not authenticated")]
    NotAuthenticated,
}

/// Protocol-level errors from auth endpoint responses.
#[derive(Debug)]
pub struct ProtocolError {
    /// HTTP status code.
    pub status: u16,
    /// Error code or short description (if present).
    pub error: Option<String>,
    /// Error message from the server.
    pub message: Option<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}", self.status)?;
        if let Some(ref error) = self.error {
            write!(f, " [{}]", error)?;
        }
        if let Some(ref message) = self.message {
            write!(f, ": {}", message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ProtocolError {}

impl ProtocolError {
    /// Create a new protocol error.
    pub fn new(status: u16, error: Option<String>, message: Option<String>) -> Self {
        Self {
            status,
            error,
            message,
        }
    }

    /// Build a protocol error from a non-success response.
    ///
    /// Bodies of the form `{"error": ..., "message": ...}` are picked apart;
    /// anything else yields a bare status.
    pub fn from_response(response: &ApiResponse) -> Self {
        match serde_json::from_slice::<ErrorBody>(response.body()) {
            Ok(body) => Self::new(response.status(), body.error, body.message),
            Err(_) => Self::new(response.status(), None, None),
        }
    }

    /// Check if this is an authentication error.
    pub fn is_auth_error(&self) -> bool {
        self.status == 401
    }
}

/// Input validation errors.
#[derive(Debug, Error)]
pub enum InvalidInputError {
    /// Invalid API base URL.
    #[error("invalid API URL '{value}': {reason}")]
    ApiUrl { value: String, reason: String },

    /// Request body could not be serialized.
    #[error("invalid request body: {reason}")]
    Body { reason: String },

    /// Generic invalid input.
    #[error("invalid input: {message}")]
    Other { message: String },
}
