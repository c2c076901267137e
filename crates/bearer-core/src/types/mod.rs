//! Request, response and endpoint types.
//!
//! [`ApiUrl`] validates the base URL once at construction; [`ApiRequest`]
//! describes a request well enough to replay it after a credential refresh.

mod api_url;
mod request;
mod response;

pub use api_url::ApiUrl;
pub use request::{ApiRequest, Method};
pub use response::ApiResponse;
