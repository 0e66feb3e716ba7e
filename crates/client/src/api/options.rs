//! Per-request options for the `send` primitive

use serde_json::Value;

/// Options accepted by [`crate::ApiClient::send`]
///
/// `is_public` requests are sent without an Authorization header and are
/// exempt from the 401 retry. `token` overrides the authenticator for a
/// single call.
#[derive(Debug, Clone, Default)]
pub struct SendOptions {
    /// Extra headers to send
    pub headers: Vec<(String, String)>,
    /// Query parameters to send
    pub query: Vec<(String, String)>,
    /// JSON request body
    pub payload: Option<Value>,
    /// Skip authentication entirely for this call
    pub is_public: bool,
    /// Explicit credential overriding the authenticator for this call
    pub token: Option<String>,
}

impl SendOptions {
    /// Empty options: no headers, no query, no body, authenticated.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a header
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Add a query parameter
    #[must_use]
    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    /// Set the JSON request body
    #[must_use]
    pub fn payload(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Mark the call public: no Authorization header, no 401 retry
    #[must_use]
    pub fn public(mut self) -> Self {
        self.is_public = true;
        self
    }

    /// Override the credential for this call, bypassing the authenticator
    #[must_use]
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }
}
