//! Authorized API client
//!
//! Every call runs the same pipeline: normalize the endpoint path, consult
//! the [`AccessGate`], attach headers, send through a [`Transport`], map the
//! status code, and hand the body to the [`ResponseNormalizer`].

pub mod transport;

use std::sync::Arc;
use std::time::Instant;

use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use tracing::{info, instrument, warn};

use crate::access::AccessGate;
use crate::normalize::{Arity, Normalized, ResponseNormalizer};
use crate::session::{Session, SessionStore};
use crate::{ConsoleError, Result};

pub use transport::{ApiRequest, HttpTransport, RawResponse, Transport};

pub const API_PREFIX: &str = "/api";

/// Strip a leading `/api` and make sure the path starts with `/`
#[must_use]
pub fn normalize_endpoint(endpoint: &str) -> String {
    let trimmed = endpoint
        .strip_prefix(API_PREFIX)
        .filter(|rest| rest.is_empty() || rest.starts_with('/'))
        .unwrap_or(endpoint);
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

/// `Bearer` for three-part JWTs, `Basic` for anything else
#[must_use]
pub fn authorization_header(token: &str) -> String {
    if token.split('.').count() == 3 {
        format!("Bearer {token}")
    } else {
        format!("Basic {token}")
    }
}

fn request_headers(session: Option<&Session>) -> Vec<(&'static str, String)> {
    let mut headers = vec![("Content-Type", "application/json".to_string())];
    if let Some(token) = session.and_then(Session::token).filter(|t| !t.is_empty()) {
        headers.push(("Authorization", authorization_header(token)));
    }
    headers
}

pub struct ApiClient<T = HttpTransport> {
    transport: T,
    session: Arc<SessionStore>,
}

impl<T: Transport> ApiClient<T> {
    pub fn new(transport: T, session: Arc<SessionStore>) -> Self {
        Self { transport, session }
    }

    #[must_use]
    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    pub(crate) fn transport(&self) -> &T {
        &self.transport
    }

    pub async fn get(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
        arity: Arity,
    ) -> Result<Normalized> {
        let query = params
            .iter()
            .map(|(key, value)| ((*key).to_string(), value.clone()))
            .collect();
        let response = self.send(Method::GET, endpoint, query, None).await?;
        ResponseNormalizer::new(arity).parse_body(&response.body)
    }

    pub async fn post<B: Serialize>(&self, endpoint: &str, body: &B, arity: Arity) -> Result<Normalized> {
        let body = to_json(body)?;
        let response = self.send(Method::POST, endpoint, Vec::new(), Some(body)).await?;
        ResponseNormalizer::new(arity).parse_body(&response.body)
    }

    pub async fn put<B: Serialize>(&self, endpoint: &str, body: &B, arity: Arity) -> Result<Normalized> {
        let body = to_json(body)?;
        let response = self.send(Method::PUT, endpoint, Vec::new(), Some(body)).await?;
        ResponseNormalizer::new(arity).parse_body(&response.body)
    }

    pub async fn delete(&self, endpoint: &str) -> Result<()> {
        self.send(Method::DELETE, endpoint, Vec::new(), None).await?;
        Ok(())
    }

    #[instrument(skip(self, method, query, body), fields(method = %method))]
    async fn send(
        &self,
        method: Method,
        endpoint: &str,
        query: Vec<(String, String)>,
        body: Option<Value>,
    ) -> Result<RawResponse> {
        let endpoint = normalize_endpoint(endpoint);
        let session = self.session.current();

        // Denied calls never reach the network
        AccessGate::check(session.as_ref(), &endpoint)?;

        let request = ApiRequest {
            method,
            path: format!("{API_PREFIX}{endpoint}"),
            query,
            headers: request_headers(session.as_ref()),
            body,
        };

        let start_time = Instant::now();
        let response = self.transport.execute(request).await?;
        let response = self.check_status(response, &endpoint, session.as_ref())?;

        info!(
            "{} completed with HTTP {} in {:.3}s",
            endpoint,
            response.status,
            start_time.elapsed().as_secs_f64()
        );
        Ok(response)
    }

    fn check_status(
        &self,
        response: RawResponse,
        endpoint: &str,
        session: Option<&Session>,
    ) -> Result<RawResponse> {
        if response.is_success() {
            return Ok(response);
        }

        let role = session
            .map(|s| s.role.to_string())
            .unwrap_or_else(|| "unknown".to_string());

        match response.status {
            401 => {
                warn!("Backend rejected credentials for {}", endpoint);
                self.session.invalidate("backend answered HTTP 401");
                Err(ConsoleError::unauthenticated(
                    "the server rejected the session token",
                ))
            }
            403 => {
                warn!("Server rejected access: {} users may not use {}", role, endpoint);
                Err(ConsoleError::forbidden(endpoint, role))
            }
            404 => Err(ConsoleError::not_found(endpoint.to_string())),
            status => {
                let body = if response.body.trim().is_empty() {
                    reqwest::StatusCode::from_u16(status)
                        .ok()
                        .and_then(|s| s.canonical_reason())
                        .unwrap_or("Unknown error")
                        .to_string()
                } else {
                    response.body
                };
                warn!("API error {} on {}: {}", status, endpoint, body);
                Err(ConsoleError::request(status, body))
            }
        }
    }
}

fn to_json<B: Serialize>(body: &B) -> Result<Value> {
    serde_json::to_value(body)
        .map_err(|e| ConsoleError::validation(format!("Request body is not serializable: {e}")))
}
