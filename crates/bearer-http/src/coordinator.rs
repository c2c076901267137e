//! Single-flight refresh of the access token.
//!
//! Any number of requests may come back `401` while one refresh exchange is
//! in flight. The first one moves the coordinator from `Idle` to
//! `Refreshing` and starts the exchange; it and every later arrival become
//! waiters in a FIFO queue. When the exchange settles the queue is drained in
//! one step, back to `Idle`, and every waiter is served exactly once: replayed
//! with the new access token, or failed with
//! [`AuthError::SessionExpired`].
//!
//! The exchange runs on its own task. Dropping the future of a request that
//! triggered or joined it never cancels the exchange, so the rest of the
//! cohort is unaffected; a waiter whose caller has gone is simply not
//! replayed.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use futures_util::future::join_all;
use tokio::sync::oneshot;
use tracing::{debug, info, instrument, warn};

use bearer_core::error::{AuthError, ProtocolError, TransportError};
use bearer_core::{
    AccessToken, ApiRequest, ApiResponse, CredentialStore, LogoutSignal, RefreshToken, Result,
    TokenPair, Transport,
};

use crate::config::{ClientConfig, RotationPolicy};
use crate::endpoints::{RefreshRequest, RefreshResponse};

/// Coordinates refresh exchanges for one client.
///
/// Cheap to clone; clones share the same state, so every request issued
/// through the same client collapses into the same refresh.
#[derive(Clone)]
pub struct RefreshCoordinator {
    inner: Arc<CoordinatorInner>,
}

struct CoordinatorInner {
    store: Arc<dyn CredentialStore>,
    transport: Arc<dyn Transport>,
    logout: Arc<dyn LogoutSignal>,
    refresh_path: String,
    rotation: RotationPolicy,
    refresh_timeout: Duration,
    phase: Mutex<Phase>,
}

enum Phase {
    Idle,
    Refreshing { waiters: VecDeque<Waiter> },
}

/// A caller parked until the in-flight exchange settles.
enum Waiter {
    /// Replay `request` with the new token and hand back the response.
    Replay {
        request: ApiRequest,
        reply: oneshot::Sender<Result<ApiResponse>>,
    },
    /// Only wants the new token.
    Token {
        reply: oneshot::Sender<Result<AccessToken>>,
    },
}

impl Waiter {
    fn is_abandoned(&self) -> bool {
        match self {
            Waiter::Replay { reply, .. } => reply.is_closed(),
            Waiter::Token { reply } => reply.is_closed(),
        }
    }

    fn expire(self) {
        match self {
            Waiter::Replay { reply, .. } => {
                let _ = reply.send(Err(AuthError::SessionExpired.into()));
            }
            Waiter::Token { reply } => {
                let _ = reply.send(Err(AuthError::SessionExpired.into()));
            }
        }
    }
}

/// How a caller entered the coordinator.
enum Join {
    /// No refresh token is stored; nothing can be recovered.
    NoRefreshToken,
    /// A refresh already completed after the request was sent.
    AlreadyRefreshed(AccessToken),
    /// Queued behind the exchange in flight.
    Queued,
    /// Queued first; the caller must start the exchange.
    Started(RefreshToken),
}

impl RefreshCoordinator {
    /// Create a coordinator sharing `store` and `transport` with its client.
    pub fn new(
        config: &ClientConfig,
        store: Arc<dyn CredentialStore>,
        transport: Arc<dyn Transport>,
        logout: Arc<dyn LogoutSignal>,
    ) -> Self {
        Self {
            inner: Arc::new(CoordinatorInner {
                store,
                transport,
                logout,
                refresh_path: config.refresh_path.clone(),
                rotation: config.rotation,
                refresh_timeout: config.refresh_timeout,
                phase: Mutex::new(Phase::Idle),
            }),
        }
    }

    /// Recover a request that came back `401`.
    ///
    /// `sent_with` is the access token the request carried. Returns the
    /// replayed response once the credential has been refreshed, the
    /// original `unauthorized` response if no refresh token is stored, or
    /// [`AuthError::SessionExpired`] if the refresh exchange failed.
    #[instrument(skip_all, fields(method = %request.method(), path = request.path()))]
    pub async fn handle_unauthorized(
        &self,
        request: ApiRequest,
        sent_with: Option<&AccessToken>,
        unauthorized: ApiResponse,
    ) -> Result<ApiResponse> {
        let (reply, receiver) = oneshot::channel();
        let waiter = Waiter::Replay {
            request: request.clone(),
            reply,
        };

        match self.join(waiter, Some(sent_with)) {
            Join::NoRefreshToken => {
                debug!("No refresh token, returning 401 to caller");
                return Ok(unauthorized);
            }
            Join::AlreadyRefreshed(current) => {
                debug!("Token was refreshed while request was in flight, replaying");
                return self.inner.transport.execute(&request, Some(&current)).await;
            }
            Join::Queued => debug!("Refresh in progress, queued"),
            Join::Started(refresh_token) => self.start_exchange(refresh_token),
        }

        receiver
            .await
            .unwrap_or_else(|_| Err(AuthError::SessionExpired.into()))
    }

    /// Refresh the access token now, joining any exchange already in flight.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::RefreshTokenInvalid`] if no refresh token is
    /// stored and [`AuthError::SessionExpired`] if the exchange fails.
    #[instrument(skip(self))]
    pub async fn refresh_now(&self) -> Result<AccessToken> {
        let (reply, receiver) = oneshot::channel();

        match self.join(Waiter::Token { reply }, None) {
            Join::NoRefreshToken => return Err(AuthError::RefreshTokenInvalid.into()),
            Join::AlreadyRefreshed(current) => return Ok(current),
            Join::Queued => debug!("Refresh in progress, queued"),
            Join::Started(refresh_token) => self.start_exchange(refresh_token),
        }

        receiver
            .await
            .unwrap_or_else(|_| Err(AuthError::SessionExpired.into()))
    }

    /// Returns true while an exchange is in flight.
    pub fn is_refreshing(&self) -> bool {
        matches!(*self.lock_phase(), Phase::Refreshing { .. })
    }

    /// Number of callers waiting on the exchange in flight.
    pub fn pending(&self) -> usize {
        match &*self.lock_phase() {
            Phase::Idle => 0,
            Phase::Refreshing { waiters } => waiters.len(),
        }
    }

    fn lock_phase(&self) -> MutexGuard<'_, Phase> {
        // Every critical section leaves the phase whole, so a poisoned lock is still usable.
        self.inner
            .phase
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Enter the state machine. `sent_with` is `None` for an explicit
    /// refresh, which never counts as already refreshed.
    fn join(&self, waiter: Waiter, sent_with: Option<Option<&AccessToken>>) -> Join {
        let mut phase = self.lock_phase();

        if let Phase::Refreshing { waiters } = &mut *phase {
            waiters.push_back(waiter);
            return Join::Queued;
        }

        // Idle: the store reflects every exchange that has settled.
        let tokens = self.inner.store.tokens();
        let Some(refresh_token) = tokens.refresh else {
            return Join::NoRefreshToken;
        };

        if let (Some(sent_with), Some(current)) = (sent_with, tokens.access)
            && sent_with != Some(&current)
        {
            return Join::AlreadyRefreshed(current);
        }

        *phase = Phase::Refreshing {
            waiters: VecDeque::from([waiter]),
        };
        Join::Started(refresh_token)
    }

    /// Take every waiter and return to `Idle`.
    fn drain(&self) -> VecDeque<Waiter> {
        match std::mem::replace(&mut *self.lock_phase(), Phase::Idle) {
            Phase::Idle => VecDeque::new(),
            Phase::Refreshing { waiters } => waiters,
        }
    }

    fn start_exchange(&self, refresh_token: RefreshToken) {
        let coordinator = self.clone();
        tokio::spawn(async move { coordinator.run_exchange(refresh_token).await });
    }

    async fn run_exchange(self, refresh_token: RefreshToken) {
        let mut guard = SettleGuard {
            coordinator: &self,
            armed: true,
        };

        info!("Refreshing access token");

        let outcome = self.exchange(&refresh_token).await;

        // A login or logout that landed mid-exchange owns the store now.
        if self.inner.store.refresh_token().as_ref() != Some(&refresh_token) {
            let waiters = self.drain();
            guard.armed = false;

            debug!(
                waiters = waiters.len(),
                "Session replaced during refresh, discarding result"
            );
            self.resume_superseded(waiters).await;
            return;
        }

        match outcome {
            Ok(response) => {
                let access = AccessToken::new(response.access_token);
                let refresh = self
                    .inner
                    .rotation
                    .resolve(refresh_token, response.refresh_token.map(RefreshToken::new));

                self.inner
                    .store
                    .set_tokens(&TokenPair::new(access.clone(), Some(refresh)));
                let waiters = self.drain();
                guard.armed = false;

                info!(waiters = waiters.len(), "Access token refreshed");
                self.serve(waiters, &access).await;
            }
            Err(err) => {
                warn!(error = %err, "Refresh failed, ending session");

                self.inner.store.clear();
                let waiters = self.drain();
                guard.armed = false;

                self.inner.logout.session_ended();
                for waiter in waiters {
                    waiter.expire();
                }
            }
        }
    }

    async fn exchange(&self, refresh_token: &RefreshToken) -> Result<RefreshResponse> {
        let request = ApiRequest::post(self.inner.refresh_path.as_str()).json(&RefreshRequest {
            refresh_token: refresh_token.as_str(),
        })?;

        let timeout = self.inner.refresh_timeout;
        let response = tokio::time::timeout(timeout, self.inner.transport.execute(&request, None))
            .await
            .map_err(|_| TransportError::Timeout {
                duration_ms: timeout.as_millis() as u64,
            })??;

        if !response.is_success() {
            return Err(ProtocolError::from_response(&response).into());
        }

        response.json()
    }

    /// Replay every request with the new token. Requests are issued in queue
    /// order and then run concurrently.
    async fn serve(&self, waiters: VecDeque<Waiter>, access: &AccessToken) {
        let replays = waiters.into_iter().map(|waiter| async move {
            if waiter.is_abandoned() {
                debug!("Caller went away, skipping replay");
                return;
            }
            match waiter {
                Waiter::Replay { request, reply } => {
                    let result = self.inner.transport.execute(&request, Some(access)).await;
                    let _ = reply.send(result);
                }
                Waiter::Token { reply } => {
                    let _ = reply.send(Ok(access.clone()));
                }
            }
        });

        join_all(replays).await;
    }

    /// Settle waiters against whatever session replaced the one being
    /// refreshed: replay with its token, or expire them if there is none.
    async fn resume_superseded(&self, waiters: VecDeque<Waiter>) {
        match self.inner.store.access_token() {
            Some(current) => self.serve(waiters, &current).await,
            None => {
                for waiter in waiters {
                    waiter.expire();
                }
            }
        }
    }
}

/// Returns the coordinator to `Idle` if an exchange task stops before
/// settling (panic or runtime shutdown). Dropping the waiters closes their
/// channels, which callers observe as an expired session.
struct SettleGuard<'a> {
    coordinator: &'a RefreshCoordinator,
    armed: bool,
}

impl Drop for SettleGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            let abandoned = self.coordinator.drain();
            warn!(waiters = abandoned.len(), "Refresh exchange aborted");
        }
    }
}

impl std::fmt::Debug for RefreshCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshCoordinator")
            .field("refresh_path", &self.inner.refresh_path)
            .field("rotation", &self.inner.rotation)
            .field("refreshing", &self.is_refreshing())
            .finish()
    }
}
