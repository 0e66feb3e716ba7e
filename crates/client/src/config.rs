//! Client configuration
//!
//! All defaults are hoisted into explicit constants here; there is no hidden
//! module-level mutable state. Exactly one credential mode wins at
//! construction: a pre-supplied static token, application credentials
//! (client id + secret), or user credentials (username + password).

use std::time::Duration;

/// Default production API endpoint
pub const DEFAULT_BASE_URL: &str = "https://iotinabox-api.mydevices.com";

/// Default public client id
pub const DEFAULT_CLIENT_ID: &str = "iotinabox";

/// Scope requested on every grant when offline access is enabled
pub(crate) const OFFLINE_SCOPE: &str = "offline_access";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Which credential mode the configuration resolved to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialMode {
    /// A pre-supplied token is used verbatim; no token exchange ever happens
    StaticToken,
    /// Application credentials via the `client_credentials` grant
    ClientCredentials,
    /// User credentials via the `password` grant
    Password,
}

/// Immutable client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the remote API
    pub base_url: String,
    /// OAuth client id sent with every token exchange
    pub client_id: String,
    /// OAuth client secret (enables client-credentials mode)
    pub client_secret: Option<String>,
    /// Username for the password grant
    pub username: Option<String>,
    /// Password for the password grant
    pub password: Option<String>,
    /// Pre-supplied static token (enables static-token mode)
    pub token: Option<String>,
    /// Request the `offline_access` scope with every grant
    pub offline_access: bool,
    /// Request timeout applied to every HTTP call
    pub timeout: Duration,
    /// User agent sent with every HTTP call
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            client_id: DEFAULT_CLIENT_ID.to_string(),
            client_secret: None,
            username: None,
            password: None,
            token: None,
            offline_access: false,
            timeout: DEFAULT_TIMEOUT,
            user_agent: format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientConfig {
    /// Start building a configuration
    #[must_use]
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Resolve the credential mode. Static token wins over application
    /// credentials, which win over user credentials.
    #[must_use]
    pub fn credential_mode(&self) -> CredentialMode {
        if self.token.is_some() {
            CredentialMode::StaticToken
        } else if self.client_secret.is_some() {
            CredentialMode::ClientCredentials
        } else {
            CredentialMode::Password
        }
    }
}

/// Builder for [`ClientConfig`]
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Override the base URL
    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.base_url = base_url.into();
        self
    }

    /// Override the OAuth client id
    #[must_use]
    pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
        self.config.client_id = client_id.into();
        self
    }

    /// Set the OAuth client secret (selects client-credentials mode)
    #[must_use]
    pub fn client_secret(mut self, client_secret: impl Into<String>) -> Self {
        self.config.client_secret = Some(client_secret.into());
        self
    }

    /// Set the username for the password grant
    #[must_use]
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.config.username = Some(username.into());
        self
    }

    /// Set the password for the password grant
    #[must_use]
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.config.password = Some(password.into());
        self
    }

    /// Supply a static token (selects static-token mode)
    #[must_use]
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.config.token = Some(token.into());
        self
    }

    /// Request the `offline_access` scope with every grant
    #[must_use]
    pub fn offline_access(mut self, enabled: bool) -> Self {
        self.config.offline_access = enabled;
        self
    }

    /// Override the request timeout
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Override the user agent
    #[must_use]
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Finish building
    #[must_use]
    pub fn build(self) -> ClientConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for config.
    use super::*;

    #[test]
    fn defaults_point_at_production() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.client_id, DEFAULT_CLIENT_ID);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(!config.offline_access);
    }

    #[test]
    fn password_mode_is_the_fallback() {
        let config = ClientConfig::builder().username("u").password("p").build();
        assert_eq!(config.credential_mode(), CredentialMode::Password);
    }

    #[test]
    fn client_secret_selects_client_credentials_mode() {
        let config = ClientConfig::builder().client_id("app").client_secret("shh").build();
        assert_eq!(config.credential_mode(), CredentialMode::ClientCredentials);
    }

    #[test]
    fn static_token_wins_over_everything() {
        let config = ClientConfig::builder()
            .token("abc")
            .client_secret("shh")
            .username("u")
            .password("p")
            .build();
        assert_eq!(config.credential_mode(), CredentialMode::StaticToken);
    }
}
