//! Mutable session state owned by the authenticator
//!
//! Holds the current scheme-prefixed credential, the refresh token that came
//! with it, the failure flag the dispatcher sets on 401, and the permanently
//! cached lockout error. The session itself never performs network calls;
//! expiry is decided purely from the stored token.

use chrono::Utc;

use super::jwt;
use super::types::Grant;
use crate::error::ApiError;

/// What the authenticator should do next for the current session
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum GrantDecision {
    /// The stored credential is usable as-is
    Cached(String),
    /// A token exchange with the given grant is required
    Exchange(Grant),
}

#[derive(Debug, Default)]
pub(crate) struct Session {
    token: Option<String>,
    refresh_token: Option<String>,
    last_request_failed: bool,
    locked_error: Option<ApiError>,
}

impl Session {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Whether the stored credential is expired.
    ///
    /// `Basic` credentials never expire. Anything else is treated as a JWT:
    /// an undecodable token counts as expired (never trust an undecodable
    /// token), and a decoded one is expired iff `exp * 1000` is in the past.
    pub(crate) fn is_expired(&self) -> bool {
        let Some(token) = self.token.as_deref() else {
            return true;
        };
        if token.starts_with("Basic") {
            return false;
        }

        let raw = token.strip_prefix("Bearer ").unwrap_or(token);
        let exp = jwt::decode_expiry(raw).unwrap_or(0);
        exp.saturating_mul(1000) < Utc::now().timestamp_millis()
    }

    /// Select the grant for the next `authenticate()` step.
    pub(crate) fn select_grant(&self, base_grant: Grant) -> GrantDecision {
        match &self.token {
            Some(token) => {
                if self.is_expired() {
                    GrantDecision::Exchange(Grant::RefreshToken)
                } else if self.last_request_failed {
                    // The refresh token itself may be the cause; go back to
                    // the original grant instead of refreshing.
                    GrantDecision::Exchange(base_grant)
                } else {
                    GrantDecision::Cached(token.clone())
                }
            }
            None => GrantDecision::Exchange(base_grant),
        }
    }

    pub(crate) fn has_token(&self) -> bool {
        self.token.is_some()
    }

    pub(crate) fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref()
    }

    /// Record a successful exchange. The only place the credential is written.
    pub(crate) fn store(&mut self, token: String, refresh_token: Option<String>) {
        self.token = Some(token);
        self.refresh_token = refresh_token;
    }

    /// Drop the stored credential (stale refresh token path).
    pub(crate) fn clear_token(&mut self) {
        self.token = None;
    }

    pub(crate) fn mark_request_failed(&mut self) {
        self.last_request_failed = true;
    }

    pub(crate) fn clear_request_failed(&mut self) {
        self.last_request_failed = false;
    }

    pub(crate) fn locked_error(&self) -> Option<&ApiError> {
        self.locked_error.as_ref()
    }

    /// Cache a terminal failure; every later call replays it.
    pub(crate) fn lock_with(&mut self, error: ApiError) {
        self.locked_error = Some(error);
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for auth::session.
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine;

    use super::*;

    fn bearer_with_exp(exp: i64) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(format!(r#"{{"exp":{exp}}}"#).as_bytes());
        format!("Bearer {header}.{payload}.sig")
    }

    fn future_exp() -> i64 {
        Utc::now().timestamp() + 3600
    }

    #[test]
    fn undecodable_token_is_expired() {
        let mut session = Session::new();
        session.store("Bearer not-a-jwt".to_string(), None);
        assert!(session.is_expired());
    }

    #[test]
    fn basic_credentials_never_expire() {
        let mut session = Session::new();
        session.store("Basic dTpw".to_string(), None);
        assert!(!session.is_expired());
    }

    #[test]
    fn valid_token_is_not_expired() {
        let mut session = Session::new();
        session.store(bearer_with_exp(future_exp()), None);
        assert!(!session.is_expired());
    }

    #[test]
    fn past_expiry_is_expired() {
        let mut session = Session::new();
        session.store(bearer_with_exp(1_000), None);
        assert!(session.is_expired());
    }

    #[test]
    fn no_token_selects_base_grant() {
        let session = Session::new();
        assert_eq!(session.select_grant(Grant::Password), GrantDecision::Exchange(Grant::Password));
    }

    #[test]
    fn expired_token_selects_refresh_grant() {
        let mut session = Session::new();
        session.store(bearer_with_exp(1_000), Some("r1".to_string()));
        assert_eq!(
            session.select_grant(Grant::Password),
            GrantDecision::Exchange(Grant::RefreshToken)
        );
    }

    #[test]
    fn failed_request_selects_base_grant_over_refresh() {
        let mut session = Session::new();
        session.store(bearer_with_exp(future_exp()), Some("r1".to_string()));
        session.mark_request_failed();
        assert_eq!(
            session.select_grant(Grant::ClientCredentials),
            GrantDecision::Exchange(Grant::ClientCredentials)
        );
    }

    #[test]
    fn valid_unflagged_token_is_cached() {
        let token = bearer_with_exp(future_exp());
        let mut session = Session::new();
        session.store(token.clone(), None);
        assert_eq!(session.select_grant(Grant::Password), GrantDecision::Cached(token));
    }

    #[test]
    fn clearing_token_keeps_refresh_token() {
        let mut session = Session::new();
        session.store(bearer_with_exp(1_000), Some("r1".to_string()));
        session.clear_token();
        assert!(!session.has_token());
        assert_eq!(session.refresh_token(), Some("r1"));
    }
}
