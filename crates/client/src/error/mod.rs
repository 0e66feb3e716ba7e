//! Structured error type for API client operations
//!
//! Every failure the client surfaces is an [`ApiError`]: a human-readable
//! message, the HTTP-like status it maps to, an [`ErrorKind`] discriminator
//! naming which terminal condition produced it, and an `is_internal` flag
//! separating programmer/configuration errors from transient network or
//! remote failures.
//!
//! Recognition is structural: an error produced anywhere in the client is
//! identified by its `kind` and `status`, never by type identity of a
//! particular constructor.

use thiserror::Error;

/// Standard result type for client operations
pub type ApiResult<T> = Result<T, ApiError>;

/// Discriminator naming the terminal condition that produced an [`ApiError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The bounded authenticate-retry count was exceeded
    MaxAuthenticationRequests,
    /// The bounded dispatch-retry count was exceeded after repeated 401s
    MaxAuthenticatedRequests,
    /// A client-credentials exchange was rejected before any token was issued;
    /// permanent for the life of the client instance
    InvalidApplicationCredentials,
    /// The remote API answered with a non-2xx status
    Remote,
    /// The HTTP transport failed (connect, timeout, body decode)
    Network,
    /// Construction or validation error (bad base URL, missing path parameter)
    Config,
}

/// API client error with status and classification metadata
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct ApiError {
    /// Human-readable description of the failure
    pub message: String,
    /// HTTP status code associated with the failure
    pub status: u16,
    /// Which terminal condition produced this error
    pub kind: ErrorKind,
    /// `true` for programmer/configuration errors, `false` for transient
    /// network or remote failures
    pub is_internal: bool,
}

impl ApiError {
    /// Wrap a non-2xx remote response, preserving its status code
    #[must_use]
    pub fn remote(status: u16, message: impl Into<String>) -> Self {
        Self { message: message.into(), status, kind: ErrorKind::Remote, is_internal: false }
    }

    /// Wrap a transport-level failure
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self { message: message.into(), status: 500, kind: ErrorKind::Network, is_internal: false }
    }

    /// Construction or validation error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self { message: message.into(), status: 500, kind: ErrorKind::Config, is_internal: true }
    }

    /// The bounded authenticate-retry count was exceeded
    #[must_use]
    pub fn max_authentication_requests_reached() -> Self {
        Self {
            message: "max authentication requests reached".to_string(),
            status: 401,
            kind: ErrorKind::MaxAuthenticationRequests,
            is_internal: true,
        }
    }

    /// The bounded dispatch-retry count was exceeded
    #[must_use]
    pub fn max_authenticated_requests_reached() -> Self {
        Self {
            message: "max authenticated requests reached".to_string(),
            status: 401,
            kind: ErrorKind::MaxAuthenticatedRequests,
            is_internal: true,
        }
    }

    /// A client-credentials exchange was rejected with no token ever issued
    #[must_use]
    pub fn invalid_application_credentials() -> Self {
        Self {
            message: "invalid application credentials".to_string(),
            status: 401,
            kind: ErrorKind::InvalidApplicationCredentials,
            is_internal: true,
        }
    }

    /// `true` if the failure is an authorization failure (status 401)
    #[must_use]
    pub const fn is_authorization_failure(&self) -> bool {
        self.status == 401
    }

    /// `true` for any 400-class status
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        self.status >= 400 && self.status < 500
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        let status = err.status().map_or(500, |s| s.as_u16());
        Self {
            message: format!("HTTP request failed: {err}"),
            status,
            kind: ErrorKind::Network,
            is_internal: false,
        }
    }
}
