//! Mock API tests for the bearer client.
//!
//! These tests use wiremock to simulate the API server and exercise the
//! client over real HTTP without network access or real credentials.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use bearer_core::{
    AccessToken, ApiRequest, ApiUrl, CredentialStore, Credentials, MemoryStore, RefreshToken,
    TokenPair,
};
use bearer_http::{AuthenticatedClient, ClientConfig, RotationPolicy};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Helper to create an API URL from a mock server.
fn mock_api_url(server: &MockServer) -> ApiUrl {
    ApiUrl::new(server.uri()).unwrap()
}

fn tokens(access: &str, refresh: Option<&str>) -> TokenPair {
    TokenPair::new(AccessToken::new(access), refresh.map(RefreshToken::new))
}

struct Fixture {
    client: AuthenticatedClient,
    store: Arc<MemoryStore>,
    logouts: Arc<AtomicUsize>,
}

fn fixture(server: &MockServer, initial: TokenPair, rotation: RotationPolicy) -> Fixture {
    let store = Arc::new(MemoryStore::with_tokens(initial));
    let logouts = Arc::new(AtomicUsize::new(0));
    let counter = logouts.clone();
    let config = ClientConfig::new(mock_api_url(server)).with_rotation(rotation);
    let client = AuthenticatedClient::new(
        config,
        store.clone(),
        Arc::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }),
    )
    .unwrap();

    Fixture {
        client,
        store,
        logouts,
    }
}

async fn mount_expired(server: &MockServer, route: &str, token: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .and(header("authorization", format!("Bearer {}", token).as_str()))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": "Token has expired"
        })))
        .mount(server)
        .await;
}

// ============================================================================
// Refresh Coordination Tests
// ============================================================================

#[tokio::test]
async fn test_concurrent_401s_refresh_once() {
    let server = MockServer::start().await;

    mount_expired(&server, "/chat", "T1").await;

    Mock::given(method("GET"))
        .and(path("/chat"))
        .and(header("authorization", "Bearer T2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(3)
        .mount(&server)
        .await;

    // The delay keeps the exchange in flight while all three requests fail.
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .and(body_json(json!({ "refreshToken": "R1" })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "accessToken": "T2" }))
                .set_delay(Duration::from_millis(300)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let f = fixture(&server, tokens("T1", Some("R1")), RotationPolicy::AcceptRotated);

    let (a, b, c) = tokio::join!(
        f.client.send(ApiRequest::get("/chat")),
        f.client.send(ApiRequest::get("/chat")),
        f.client.send(ApiRequest::get("/chat")),
    );

    for response in [a, b, c] {
        assert_eq!(response.unwrap().status(), 200);
    }
    assert_eq!(f.store.access_token(), Some(AccessToken::new("T2")));
    assert_eq!(f.store.refresh_token(), Some(RefreshToken::new("R1")));
    assert_eq!(f.logouts.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_missing_refresh_token_returns_401() {
    let server = MockServer::start().await;

    mount_expired(&server, "/my", "T1").await;

    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "accessToken": "T2" })))
        .expect(0)
        .mount(&server)
        .await;

    let f = fixture(&server, tokens("T1", None), RotationPolicy::AcceptRotated);

    let response = f.client.send(ApiRequest::get("/my")).await.unwrap();

    assert_eq!(response.status(), 401);
    assert!(response.text().contains("Token has expired"));
    assert_eq!(f.store.access_token(), Some(AccessToken::new("T1")));
}

#[tokio::test]
async fn test_failed_refresh_ends_session_once() {
    let server = MockServer::start().await;

    mount_expired(&server, "/chat", "T1").await;

    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({ "error": "Refresh token expired" }))
                .set_delay(Duration::from_millis(300)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let f = fixture(&server, tokens("T1", Some("R1")), RotationPolicy::AcceptRotated);

    let (a, b) = tokio::join!(
        f.client.send(ApiRequest::get("/chat")),
        f.client.send(ApiRequest::get("/chat")),
    );

    assert!(a.unwrap_err().is_session_expired());
    assert!(b.unwrap_err().is_session_expired());
    assert!(f.store.tokens().is_empty());
    assert_eq!(f.logouts.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_rotated_refresh_token_is_stored() {
    let server = MockServer::start().await;

    mount_expired(&server, "/community", "T1").await;

    Mock::given(method("GET"))
        .and(path("/community"))
        .and(header("authorization", "Bearer T2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "accessToken": "T2",
            "refreshToken": "R2"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let f = fixture(&server, tokens("T1", Some("R1")), RotationPolicy::AcceptRotated);

    let response = f.client.send(ApiRequest::get("/community")).await.unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(f.store.tokens(), tokens("T2", Some("R2")));
}

#[tokio::test]
async fn test_server_errors_pass_through() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/chat/messages"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "error": "Internal Server Error"
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "accessToken": "T2" })))
        .expect(0)
        .mount(&server)
        .await;

    let f = fixture(&server, tokens("T1", Some("R1")), RotationPolicy::AcceptRotated);

    let response = f
        .client
        .send(ApiRequest::get("/chat/messages").query("conversation_id", "7"))
        .await
        .unwrap();

    assert_eq!(response.status(), 500);
    assert_eq!(f.store.access_token(), Some(AccessToken::new("T1")));
}

// ============================================================================
// Session Lifecycle Tests
// ============================================================================

#[tokio::test]
async fn test_login_then_authenticated_request() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/google"))
        .and(body_json(json!({ "token": "google-id-token" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "accessToken": "T1",
            "refreshToken": "R1",
            "user": {
                "id": "8d2c",
                "email": "alice@example.com",
                "name": "Alice",
                "style": "calm"
            }
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/my"))
        .and(header("authorization", "Bearer T1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "Alice"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let f = fixture(&server, TokenPair::empty(), RotationPolicy::AcceptRotated);

    let outcome = f
        .client
        .login(&Credentials::new("google-id-token"))
        .await
        .unwrap();
    assert_eq!(outcome.user.unwrap().email.as_deref(), Some("alice@example.com"));
    assert!(f.client.is_authenticated());

    let profile: serde_json::Value = f.client.send_json(ApiRequest::get("/my")).await.unwrap();
    assert_eq!(profile["name"], "Alice");
}

#[tokio::test]
async fn test_login_invalid_credentials() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/google"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": "Invalid Google Token"
        })))
        .mount(&server)
        .await;

    let f = fixture(&server, TokenPair::empty(), RotationPolicy::AcceptRotated);

    let result = f.client.login(&Credentials::new("forged")).await;

    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("invalid credentials"));
    assert!(f.store.tokens().is_empty());
}

#[tokio::test]
async fn test_login_server_error_is_protocol_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/google"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "error": "Internal Server Error"
        })))
        .mount(&server)
        .await;

    let f = fixture(&server, tokens("T1", Some("R1")), RotationPolicy::AcceptRotated);

    let err = f
        .client
        .login(&Credentials::new("google-id-token"))
        .await
        .unwrap_err();

    match err {
        bearer_core::Error::Protocol(protocol) => {
            assert_eq!(protocol.status, 500);
            assert!(!protocol.is_auth_error());
        }
        other => panic!("expected protocol error, got {:?}", other),
    }
    assert_eq!(f.store.tokens(), tokens("T1", Some("R1")));
}

#[tokio::test]
async fn test_logout_clears_session() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/logout"))
        .and(header("authorization", "Bearer T1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Logged out successfully"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let f = fixture(&server, tokens("T1", Some("R1")), RotationPolicy::KeepExisting);

    f.client.logout().await;

    assert!(f.store.tokens().is_empty());
    assert_eq!(f.logouts.load(Ordering::SeqCst), 0);
}
