//! Transport trait.

use async_trait::async_trait;

use crate::Result;
use crate::tokens::AccessToken;
use crate::types::{ApiRequest, ApiResponse};

/// Performs a single HTTP-like request.
///
/// Every status code the server answers with is an `Ok` response; `Err` is
/// reserved for failures that produced no response at all (connection,
/// timeout, unreadable body). The client inspects only the status for `401`.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send `request`, attaching `bearer` as the `Authorization` credential
    /// when present.
    async fn execute(
        &self,
        request: &ApiRequest,
        bearer: Option<&AccessToken>,
    ) -> Result<ApiResponse>;
}
