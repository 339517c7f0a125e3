//! Error types and handling for the route console

use thiserror::Error;

/// Stable classification of a [`ConsoleError`], used by callers that only
/// need to branch on the kind of failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    Unauthenticated,
    ForbiddenResource,
    UnknownRole,
    MalformedResponse,
    NotFound,
    NetworkFailure,
    RequestFailed,
    InvalidInput,
    Configuration,
    Storage,
}

/// Main error type for the route console
#[derive(Error, Debug)]
pub enum ConsoleError {
    /// No session, no token, or the backend rejected the credentials
    #[error("Not authenticated: {message}")]
    Unauthenticated { message: String },

    /// The caller's role may not use the endpoint (client gate or HTTP 403)
    #[error("Forbidden: {role} users do not have permission to access {endpoint}")]
    Forbidden { endpoint: String, role: String },

    /// A token is present but the role is not one the console knows
    #[error("Unknown role '{role}' may not access {endpoint}")]
    UnknownRole { endpoint: String, role: String },

    /// Response body was expected to be JSON but could not be parsed
    #[error("Malformed response: {message}")]
    MalformedResponse { message: String },

    /// The requested resource does not exist
    #[error("Not found: {message}")]
    NotFound { message: String },

    /// Transport-level failure (connect, timeout, TLS)
    #[error("Network error: {message}")]
    Network { message: String },

    /// Any other non-2xx response
    #[error("API error {status}: {body}")]
    Request { status: u16, body: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Profile storage errors
    #[error("Storage error: {message}")]
    Storage { message: String },
}

impl ConsoleError {
    pub fn unauthenticated<S: Into<String>>(message: S) -> Self {
        Self::Unauthenticated {
            message: message.into(),
        }
    }

    pub fn forbidden<E: Into<String>, R: Into<String>>(endpoint: E, role: R) -> Self {
        Self::Forbidden {
            endpoint: endpoint.into(),
            role: role.into(),
        }
    }

    pub fn unknown_role<E: Into<String>, R: Into<String>>(endpoint: E, role: R) -> Self {
        Self::UnknownRole {
            endpoint: endpoint.into(),
            role: role.into(),
        }
    }

    pub fn malformed<S: Into<String>>(message: S) -> Self {
        Self::MalformedResponse {
            message: message.into(),
        }
    }

    pub fn not_found<S: Into<String>>(message: S) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn network<S: Into<String>>(message: S) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    pub fn request<S: Into<String>>(status: u16, body: S) -> Self {
        Self::Request {
            status,
            body: body.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn storage<S: Into<String>>(message: S) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            ConsoleError::Unauthenticated { .. } => ErrorCode::Unauthenticated,
            ConsoleError::Forbidden { .. } => ErrorCode::ForbiddenResource,
            ConsoleError::UnknownRole { .. } => ErrorCode::UnknownRole,
            ConsoleError::MalformedResponse { .. } => ErrorCode::MalformedResponse,
            ConsoleError::NotFound { .. } => ErrorCode::NotFound,
            ConsoleError::Network { .. } => ErrorCode::NetworkFailure,
            ConsoleError::Request { .. } => ErrorCode::RequestFailed,
            ConsoleError::Validation { .. } => ErrorCode::InvalidInput,
            ConsoleError::Config { .. } => ErrorCode::Configuration,
            ConsoleError::Storage { .. } => ErrorCode::Storage,
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            ConsoleError::Unauthenticated { .. } => {
                "You are not signed in or your session has expired. Please log in again."
                    .to_string()
            }
            ConsoleError::Forbidden { role, .. } => {
                format!("Your account ({role}) is not allowed to perform this operation.")
            }
            ConsoleError::UnknownRole { role, .. } => {
                format!("Your account role '{role}' is not recognised for this operation.")
            }
            ConsoleError::MalformedResponse { .. } => {
                "The server sent a response that could not be read.".to_string()
            }
            ConsoleError::NotFound { message } => format!("Not found: {message}"),
            ConsoleError::Network { .. } => {
                "Unable to reach the routing server. Please check your connection.".to_string()
            }
            ConsoleError::Request { status, body } if body.is_empty() => {
                format!("The server rejected the request (HTTP {status}).")
            }
            ConsoleError::Request { status, body } => {
                format!("The server rejected the request (HTTP {status}): {body}")
            }
            ConsoleError::Validation { message } => format!("Invalid input: {message}"),
            ConsoleError::Config { .. } => {
                "Configuration error. Please check your config file.".to_string()
            }
            ConsoleError::Storage { .. } => {
                "Local profile storage failed. You may need to clear it.".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = ConsoleError::forbidden("/transportations", "agency");
        assert!(matches!(err, ConsoleError::Forbidden { .. }));
        assert_eq!(err.code(), ErrorCode::ForbiddenResource);

        let err = ConsoleError::request(500, "boom");
        assert_eq!(err.code(), ErrorCode::RequestFailed);
        assert_eq!(err.to_string(), "API error 500: boom");
    }

    #[test]
    fn test_forbidden_message_names_role_and_endpoint() {
        let err = ConsoleError::forbidden("/transportations", "agency");
        assert_eq!(
            err.to_string(),
            "Forbidden: agency users do not have permission to access /transportations"
        );
        assert!(err.user_message().contains("agency"));
    }

    #[test]
    fn test_user_messages() {
        let err = ConsoleError::network("connection refused");
        assert!(err.user_message().contains("Unable to reach"));

        let err = ConsoleError::validation("Username is required");
        assert!(err.user_message().contains("Username is required"));

        let err = ConsoleError::request(502, "");
        assert_eq!(
            err.user_message(),
            "The server rejected the request (HTTP 502)."
        );
    }
}
