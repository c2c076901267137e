//! reqwest-backed transport.

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderName, HeaderValue};
use tracing::{debug, instrument, trace};

use bearer_core::error::{Error, InvalidInputError, TransportError};
use bearer_core::{AccessToken, ApiRequest, ApiResponse, ApiUrl, Method, Result, Transport};

use crate::config::ClientConfig;

/// HTTP transport for API requests.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    api: ApiUrl,
    timeout_ms: u64,
}

impl ReqwestTransport {
    /// Create a transport for the API described by `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built
    /// (for example when no TLS backend is available).
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| TransportError::Http {
                message: format!("failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            api: config.api.clone(),
            timeout_ms: config.request_timeout.as_millis() as u64,
        })
    }

    /// Returns the API base URL this transport is configured for.
    pub fn api(&self) -> &ApiUrl {
        &self.api
    }

    fn map_error(&self, err: reqwest::Error) -> Error {
        let err = if err.is_timeout() {
            TransportError::Timeout {
                duration_ms: self.timeout_ms,
            }
        } else if err.is_connect() {
            TransportError::Connection {
                message: err.to_string(),
            }
        } else if err.is_body() || err.is_decode() {
            TransportError::Body {
                message: err.to_string(),
            }
        } else {
            TransportError::Http {
                message: err.to_string(),
            }
        };
        err.into()
    }
}

fn to_reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Patch => reqwest::Method::PATCH,
        Method::Delete => reqwest::Method::DELETE,
    }
}

fn bearer_header(token: &AccessToken) -> Result<HeaderValue> {
    let mut value = HeaderValue::from_str(&format!("Bearer {}", token.as_str())).map_err(|_| {
        InvalidInputError::Other {
            message: "access token contains characters not allowed in a header".to_string(),
        }
    })?;
    value.set_sensitive(true);
    Ok(value)
}

#[async_trait]
impl Transport for ReqwestTransport {
    #[instrument(
        skip(self, request, bearer),
        fields(method = %request.method(), path = request.path())
    )]
    async fn execute(
        &self,
        request: &ApiRequest,
        bearer: Option<&AccessToken>,
    ) -> Result<ApiResponse> {
        let url = self.api.endpoint_url(request.path());
        debug!(authenticated = bearer.is_some(), "API request");

        let mut builder = self
            .client
            .request(to_reqwest_method(request.method()), &url);

        if !request.query_pairs().is_empty() {
            builder = builder.query(request.query_pairs());
        }

        for (name, value) in request.headers() {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| {
                InvalidInputError::Other {
                    message: format!("invalid header name '{}'", name),
                }
            })?;
            let value = HeaderValue::from_str(value).map_err(|_| InvalidInputError::Other {
                message: format!("invalid value for header '{}'", name),
            })?;
            builder = builder.header(name, value);
        }

        if let Some(token) = bearer {
            builder = builder.header(AUTHORIZATION, bearer_header(token)?);
        }

        if let Some(body) = request.body() {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| self.map_error(e))?;

        let status = response.status().as_u16();
        trace!(status, "API response");

        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();

        let body = response.bytes().await.map_err(|e| self.map_error(e))?;

        Ok(ApiResponse::new(status, body.to_vec()).with_headers(headers))
    }
}
