//! Typed operations over the routing backend's REST endpoints
//!
//! Each operation is an inherent method on [`ApiClient`], so it goes through
//! the access gate and the response normalizer like any other call.
//!
//! [`ApiClient`]: crate::client::ApiClient

pub mod auth;
pub mod locations;
pub mod routes;
pub mod transportations;

pub use auth::{LOGIN_PATH, LoginResponse};
pub use routes::LegacyRouteQuery;

/// Percent-encode a value used as a single path segment
pub(crate) fn path_segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}
