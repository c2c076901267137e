//! Authenticated API client.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument, warn};

use bearer_core::error::{AuthError, ProtocolError};
use bearer_core::{
    AccessToken, ApiRequest, ApiResponse, CredentialStore, Credentials, LogoutSignal,
    RefreshToken, Result, TokenPair, Transport,
};

use crate::config::ClientConfig;
use crate::coordinator::RefreshCoordinator;
use crate::endpoints::{LoginOutcome, LoginRequest, LoginResponse};
use crate::transport::ReqwestTransport;

/// The entry point for talking to the API.
///
/// Every request carries the stored access token as a bearer credential.
/// A `401` is recovered transparently through the client's
/// [`RefreshCoordinator`]; every other response, error statuses included,
/// is returned as received.
///
/// Cheap to clone; clones share the store and the coordinator.
#[derive(Clone)]
pub struct AuthenticatedClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    config: ClientConfig,
    store: Arc<dyn CredentialStore>,
    transport: Arc<dyn Transport>,
    coordinator: RefreshCoordinator,
}

impl AuthenticatedClient {
    /// Create a client talking HTTP to `config.api`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(
        config: ClientConfig,
        store: Arc<dyn CredentialStore>,
        logout: Arc<dyn LogoutSignal>,
    ) -> Result<Self> {
        let transport = Arc::new(ReqwestTransport::new(&config)?);
        Ok(Self::with_transport(config, transport, store, logout))
    }

    /// Create a client over an arbitrary transport.
    pub fn with_transport(
        config: ClientConfig,
        transport: Arc<dyn Transport>,
        store: Arc<dyn CredentialStore>,
        logout: Arc<dyn LogoutSignal>,
    ) -> Self {
        let coordinator =
            RefreshCoordinator::new(&config, store.clone(), transport.clone(), logout);

        Self {
            inner: Arc::new(ClientInner {
                config,
                store,
                transport,
                coordinator,
            }),
        }
    }

    /// Send a request with the current access token.
    ///
    /// A `401` triggers (or joins) a refresh when a refresh token is stored,
    /// and the request is replayed once with the renewed token.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`](bearer_core::Error::Transport) if no
    /// response was received and
    /// [`AuthError::SessionExpired`] if recovering from a `401` failed.
    #[instrument(skip_all, fields(method = %request.method(), path = request.path()))]
    pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        let bearer = self.inner.store.access_token();
        let response = self
            .inner
            .transport
            .execute(&request, bearer.as_ref())
            .await?;

        if !response.is_unauthorized() {
            return Ok(response);
        }

        if self.inner.store.refresh_token().is_none() {
            debug!("Unauthorized and no refresh token stored");
            return Ok(response);
        }

        self.inner
            .coordinator
            .handle_unauthorized(request, bearer.as_ref(), response)
            .await
    }

    /// Send a request and decode a successful JSON response.
    ///
    /// # Errors
    ///
    /// Non-2xx responses become [`ProtocolError`]s, on top of the errors of
    /// [`send`](Self::send).
    pub async fn send_json<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T> {
        let response = self.send(request).await?;
        if !response.is_success() {
            return Err(ProtocolError::from_response(&response).into());
        }
        response.json()
    }

    /// Exchange identity-provider credentials for a session.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] if the server rejects the
    /// credentials. The stored session is left untouched on failure.
    #[instrument(skip(self, credentials))]
    pub async fn login(&self, credentials: &Credentials) -> Result<LoginOutcome> {
        info!("Creating new session");

        let request = ApiRequest::post(self.inner.config.login_path.as_str()).json(&LoginRequest {
            token: credentials.id_token(),
        })?;
        let response = self.inner.transport.execute(&request, None).await?;

        if !response.is_success() {
            let err = ProtocolError::from_response(&response);
            if err.is_auth_error() {
                debug!(error = ?err.error, "Login rejected");
                return Err(AuthError::InvalidCredentials.into());
            }
            return Err(err.into());
        }

        let body: LoginResponse = response.json()?;
        self.inner.store.set_tokens(&TokenPair::new(
            AccessToken::new(body.access_token),
            Some(RefreshToken::new(body.refresh_token)),
        ));

        debug!(user = ?body.user.as_ref().map(|u| &u.id), "Session created successfully");
        Ok(LoginOutcome { user: body.user })
    }

    /// End the session.
    ///
    /// The server is notified on a best-effort basis; the stored credentials
    /// are cleared whatever it answers. The logout signal is not fired.
    #[instrument(skip(self))]
    pub async fn logout(&self) {
        if let Some(token) = self.inner.store.access_token() {
            let request = ApiRequest::post(self.inner.config.logout_path.as_str());
            match self.inner.transport.execute(&request, Some(&token)).await {
                Ok(response) if !response.is_success() => {
                    debug!(status = response.status(), "Logout endpoint refused")
                }
                Ok(_) => {}
                Err(e) => warn!(error = %e, "Logout endpoint unreachable"),
            }
        }

        self.inner.store.clear();
        info!("Logged out");
    }

    /// Refresh the access token now, collapsing with any refresh in flight.
    ///
    /// # Errors
    ///
    /// See [`RefreshCoordinator::refresh_now`].
    pub async fn refresh(&self) -> Result<()> {
        self.inner.coordinator.refresh_now().await.map(|_| ())
    }

    /// Returns true if an access token is stored.
    pub fn is_authenticated(&self) -> bool {
        self.inner.store.access_token().is_some()
    }

    /// The client's credential store.
    pub fn store(&self) -> &dyn CredentialStore {
        self.inner.store.as_ref()
    }

    /// The client's refresh coordinator.
    pub fn coordinator(&self) -> &RefreshCoordinator {
        &self.inner.coordinator
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }
}

impl std::fmt::Debug for AuthenticatedClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthenticatedClient")
            .field("api", &self.inner.config.api)
            .field("tokens", &"[REDACTED]")
            .finish()
    }
}
