//! Grant selection and bounded token exchange
//!
//! The authenticator owns the session behind a `tokio::sync::Mutex`; the
//! lock is held across the whole exchange, so concurrent `authenticate()`
//! calls funnel into a single in-flight token request and every waiter
//! observes the freshly cached credential instead of racing its own
//! exchange.

use std::sync::Arc;

use reqwest::Method;
use tokio::sync::Mutex;
use tracing::{debug, error, warn};

use super::session::{GrantDecision, Session};
use super::types::{Grant, TokenRequest, TokenResponse};
use crate::config::{ClientConfig, CredentialMode};
use crate::error::{ApiError, ApiResult};
use crate::http::HttpClient;

/// Maximum re-entries of the authenticate loop after the initial attempt.
/// Bounds refresh/retry chains caused by a server rejecting every grant.
const MAX_AUTH_RETRIES: u32 = 1;

const TOKEN_PATH: &str = "/oauth/token";

/// Normalize a credential into a header-ready value: tokens that already
/// carry a scheme are used as-is, bare tokens get the `Bearer` prefix.
pub(crate) fn normalize_scheme(token: &str) -> String {
    if token.starts_with("Bearer ") || token.starts_with("Basic ") {
        token.to_string()
    } else {
        format!("Bearer {token}")
    }
}

#[derive(Debug)]
pub(crate) struct Authenticator {
    config: Arc<ClientConfig>,
    http: HttpClient,
    token_url: String,
    session: Mutex<Session>,
}

impl Authenticator {
    pub(crate) fn new(config: Arc<ClientConfig>, http: HttpClient) -> Self {
        let token_url = format!("{}{}", config.base_url.trim_end_matches('/'), TOKEN_PATH);
        Self { config, http, token_url, session: Mutex::new(Session::new()) }
    }

    /// The permanently cached terminal failure, if any.
    pub(crate) async fn locked_error(&self) -> Option<ApiError> {
        self.session.lock().await.locked_error().cloned()
    }

    /// Record that the most recent authenticated call was rejected with an
    /// authorization failure; the next `authenticate()` re-requests a token
    /// with the original grant instead of reusing or refreshing.
    pub(crate) async fn mark_request_failed(&self) {
        self.session.lock().await.mark_request_failed();
    }

    pub(crate) async fn clear_request_failed(&self) {
        self.session.lock().await.clear_request_failed();
    }

    /// Produce a header-ready bearer credential, exchanging tokens as needed.
    pub(crate) async fn authenticate(&self) -> ApiResult<String> {
        // Static-token mode: never expires, never refreshed, no network.
        if let Some(token) = self.config.token.as_deref() {
            return Ok(normalize_scheme(token));
        }

        let mut session = self.session.lock().await;
        let base_grant = self.base_grant();
        let mut attempts: u32 = 0;

        loop {
            if attempts > MAX_AUTH_RETRIES {
                return Err(ApiError::max_authentication_requests_reached());
            }
            if let Some(err) = session.locked_error() {
                return Err(err.clone());
            }

            let grant = match session.select_grant(base_grant) {
                GrantDecision::Cached(token) => return Ok(token),
                GrantDecision::Exchange(grant) => grant,
            };

            let request = TokenRequest::new(&self.config, grant, session.refresh_token());
            match self.exchange(&request, grant).await {
                Ok(response) => {
                    let token = format!("Bearer {}", response.access_token);
                    session.store(token.clone(), response.refresh_token);
                    return Ok(token);
                }
                Err(err) if err.is_client_error() && grant == Grant::RefreshToken => {
                    // Stale or rejected refresh token: drop the credential and
                    // fall back to a fresh full login with the base grant.
                    debug!("refresh grant rejected, retrying with base grant");
                    session.clear_token();
                    attempts += 1;
                }
                Err(err)
                    if err.is_client_error()
                        && grant == Grant::ClientCredentials
                        && !session.has_token() =>
                {
                    // The application credentials themselves are bad. Cache
                    // the failure; it is permanent for this client instance.
                    let locked = ApiError::invalid_application_credentials();
                    error!(status = err.status, "token exchange rejected: {locked}");
                    session.lock_with(locked.clone());
                    return Err(locked);
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn exchange(
        &self,
        request: &TokenRequest<'_>,
        grant: Grant,
    ) -> ApiResult<TokenResponse> {
        debug!(grant = grant.as_str(), "requesting token exchange");

        // Public request: the token endpoint never sees an Authorization
        // header from this client.
        let builder = self.http.request(Method::POST, &self.token_url).json(request);
        let response = self.http.send(builder).await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(grant = grant.as_str(), status = status.as_u16(), "token exchange failed");
            return Err(ApiError::remote(
                status.as_u16(),
                format!("token exchange failed with status {}: {body}", status.as_u16()),
            ));
        }

        response
            .json()
            .await
            .map_err(|err| ApiError::network(format!("failed to parse token response: {err}")))
    }

    fn base_grant(&self) -> Grant {
        match self.config.credential_mode() {
            CredentialMode::ClientCredentials => Grant::ClientCredentials,
            CredentialMode::StaticToken | CredentialMode::Password => Grant::Password,
        }
    }
}
