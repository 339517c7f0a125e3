//! Client-side access gate
//!
//! Decides, before any request is sent, whether the signed-in role may use an
//! endpoint. The backend remains the authority: an `Allow` here can still be
//! answered with HTTP 403, which the client maps to the same
//! [`DenyReason::ForbiddenResource`].

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::session::Session;
use crate::{ConsoleError, Result};

const ROUTES_SEGMENT: &str = "/routes";
const LOCATIONS_SEGMENT: &str = "/locations";

/// Account role, canonicalised to lowercase
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    Admin,
    Agency,
    Other(String),
}

impl Role {
    /// Parse a role name as the backend sends it (`ADMIN`, `admin`, ` Agency `)
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let canonical = raw.trim().to_lowercase();
        match canonical.as_str() {
            "admin" => Role::Admin,
            "agency" => Role::Agency,
            _ => Role::Other(canonical),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Role::Admin => "admin",
            Role::Agency => "agency",
            Role::Other(name) => name,
        }
    }
}

impl From<String> for Role {
    fn from(raw: String) -> Self {
        Role::parse(&raw)
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.as_str().to_string()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    Unauthenticated,
    ForbiddenResource,
    UnknownRole,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Allow,
    Deny(DenyReason),
}

impl Access {
    /// Turn a denial into the error the caller surfaces
    pub fn into_result(self, session: Option<&Session>, endpoint: &str) -> Result<()> {
        let role = || {
            session
                .map(|s| s.role.to_string())
                .unwrap_or_else(|| "unknown".to_string())
        };
        match self {
            Access::Allow => Ok(()),
            Access::Deny(DenyReason::Unauthenticated) => Err(ConsoleError::unauthenticated(
                format!("sign in to access {endpoint}"),
            )),
            Access::Deny(DenyReason::ForbiddenResource) => {
                Err(ConsoleError::forbidden(endpoint, role()))
            }
            Access::Deny(DenyReason::UnknownRole) => {
                Err(ConsoleError::unknown_role(endpoint, role()))
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AccessGate;

impl AccessGate {
    /// Evaluate the role table top to bottom; the first matching row wins
    #[must_use]
    pub fn authorize(session: Option<&Session>, endpoint: &str) -> Access {
        let Some(session) = session.filter(|s| s.has_token()) else {
            return Access::Deny(DenyReason::Unauthenticated);
        };

        let routes_or_locations =
            endpoint.contains(ROUTES_SEGMENT) || endpoint.contains(LOCATIONS_SEGMENT);

        let access = match &session.role {
            Role::Admin => Access::Allow,
            // Location mutations must still be refused by the backend
            Role::Agency if routes_or_locations => Access::Allow,
            Role::Agency => Access::Deny(DenyReason::ForbiddenResource),
            Role::Other(_) if routes_or_locations => Access::Allow,
            Role::Other(_) => Access::Deny(DenyReason::UnknownRole),
        };

        debug!(role = %session.role, endpoint, ?access, "Access gate decision");
        access
    }

    /// [`AccessGate::authorize`] followed by [`Access::into_result`]
    pub fn check(session: Option<&Session>, endpoint: &str) -> Result<()> {
        Self::authorize(session, endpoint).into_result(session, endpoint)
    }
}
