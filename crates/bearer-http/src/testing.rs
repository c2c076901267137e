//! Scripted in-process transport for unit tests.

use std::collections::{HashSet, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::json;
use tokio::sync::Semaphore;

use bearer_core::error::TransportError;
use bearer_core::{
    AccessToken, ApiRequest, ApiResponse, LogoutSignal, Method, RefreshToken, Result, Transport,
};

pub(crate) const REFRESH: &str = "/auth/refresh";
pub(crate) const LOGIN: &str = "/auth/google";
pub(crate) const LOGOUT: &str = "/auth/logout";

/// One request as seen by the transport.
#[derive(Debug, Clone)]
pub(crate) struct Call {
    pub method: Method,
    pub path: String,
    pub bearer: Option<String>,
    pub body: Option<serde_json::Value>,
}

/// Scripted outcome of the next refresh exchange.
#[derive(Debug, Clone)]
pub(crate) enum RefreshScript {
    Grant {
        access: &'static str,
        refresh: Option<&'static str>,
    },
    Reject(u16),
    Unreachable,
}

/// Mimics the API server: a request succeeds only if its bearer is in the
/// accepted set, a granted refresh adds the new access token to that set.
pub(crate) struct ScriptedTransport {
    calls: Mutex<Vec<Call>>,
    accepted: Mutex<HashSet<String>>,
    refreshes: Mutex<VecDeque<RefreshScript>>,
    gate: Option<Semaphore>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            accepted: Mutex::new(HashSet::new()),
            refreshes: Mutex::new(VecDeque::new()),
            gate: None,
        }
    }

    /// Refresh exchanges block until [`release`](Self::release) is called.
    pub fn gated() -> Self {
        Self {
            gate: Some(Semaphore::new(0)),
            ..Self::new()
        }
    }

    pub fn accept(self, token: &str) -> Self {
        self.accepted.lock().unwrap().insert(token.to_string());
        self
    }

    pub fn script_refresh(&self, script: RefreshScript) {
        self.refreshes.lock().unwrap().push_back(script);
    }

    /// Let one gated refresh exchange proceed.
    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.add_permits(1);
        }
    }

    /// Expire every token the server currently accepts.
    pub fn expire_all(&self) {
        self.accepted.lock().unwrap().clear();
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, path: &str) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| c.path == path)
            .collect()
    }

    pub fn refresh_calls(&self) -> usize {
        self.calls_to(REFRESH).len()
    }

    async fn refresh(&self) -> Result<ApiResponse> {
        if let Some(gate) = &self.gate {
            gate.acquire().await.expect("gate closed").forget();
        }

        let script = self
            .refreshes
            .lock()
            .unwrap()
            .pop_front()
            .expect("unscripted refresh exchange");

        match script {
            RefreshScript::Grant { access, refresh } => {
                self.accepted.lock().unwrap().insert(access.to_string());
                let mut body = json!({ "accessToken": access });
                if let Some(refresh) = refresh {
                    body["refreshToken"] = json!(refresh);
                }
                Ok(json_response(200, body))
            }
            RefreshScript::Reject(status) => Ok(json_response(
                status,
                json!({ "error": "Refresh token expired" }),
            )),
            RefreshScript::Unreachable => Err(TransportError::Connection {
                message: "connection refused".to_string(),
            }
            .into()),
        }
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn execute(
        &self,
        request: &ApiRequest,
        bearer: Option<&AccessToken>,
    ) -> Result<ApiResponse> {
        let bearer = bearer.map(|t| t.as_str().to_string());
        self.calls.lock().unwrap().push(Call {
            method: request.method(),
            path: request.path().to_string(),
            bearer: bearer.clone(),
            body: request.body().cloned(),
        });

        match request.path() {
            REFRESH => self.refresh().await,
            LOGIN => {
                let token = request.body().and_then(|b| b["token"].as_str());
                if token == Some("valid-id-token") {
                    self.accepted.lock().unwrap().insert("login-access".to_string());
                    Ok(json_response(
                        200,
                        json!({
                            "accessToken": "login-access",
                            "refreshToken": "login-refresh",
                            "user": {
                                "id": "u1",
                                "email": "alice@example.com",
                                "name": "Alice",
                                "mbti": "INFP"
                            }
                        }),
                    ))
                } else {
                    Ok(json_response(401, json!({ "error": "Invalid Google Token" })))
                }
            }
            LOGOUT => Ok(json_response(200, json!({ "message": "Logged out successfully" }))),
            "/offline" => Err(TransportError::Connection {
                message: "connection refused".to_string(),
            }
            .into()),
            "/missing" => Ok(json_response(404, json!({ "error": "Post not found" }))),
            path => {
                let authorized = bearer
                    .as_ref()
                    .is_some_and(|b| self.accepted.lock().unwrap().contains(b));
                if authorized {
                    Ok(json_response(200, json!({ "path": path, "bearer": bearer })))
                } else {
                    Ok(json_response(401, json!({ "error": "Token has expired" })))
                }
            }
        }
    }
}

pub(crate) fn json_response(status: u16, body: serde_json::Value) -> ApiResponse {
    ApiResponse::new(status, body.to_string().into_bytes())
}

/// Counts logout notifications.
#[derive(Default)]
pub(crate) struct LogoutCounter(AtomicUsize);

impl LogoutCounter {
    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

impl LogoutSignal for LogoutCounter {
    fn session_ended(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

pub(crate) fn pair(access: &str, refresh: Option<&str>) -> bearer_core::TokenPair {
    bearer_core::TokenPair::new(AccessToken::new(access), refresh.map(RefreshToken::new))
}
