//! OAuth grant and token-exchange wire types

use serde::{Deserialize, Serialize};

use crate::config::{ClientConfig, OFFLINE_SCOPE};

/// OAuth2 token-exchange strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Grant {
    Password,
    ClientCredentials,
    RefreshToken,
}

impl Grant {
    pub(crate) const fn as_str(self) -> &'static str {
        match self {
            Self::Password => "password",
            Self::ClientCredentials => "client_credentials",
            Self::RefreshToken => "refresh_token",
        }
    }
}

/// Token-exchange request payload for `POST /oauth/token`
///
/// Conditional fields follow the configured credentials, not the grant:
/// username/password ride along whenever user credentials are configured and
/// the client secret whenever application credentials are, with the refresh
/// token added only for refresh grants.
#[derive(Debug, Serialize)]
pub(crate) struct TokenRequest<'a> {
    client_id: &'a str,
    grant_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    scope: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    username: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    password: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    client_secret: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    refresh_token: Option<&'a str>,
}

impl<'a> TokenRequest<'a> {
    pub(crate) fn new(
        config: &'a ClientConfig,
        grant: Grant,
        refresh_token: Option<&'a str>,
    ) -> Self {
        let has_user = config.username.is_some() && config.password.is_some();

        Self {
            client_id: &config.client_id,
            grant_type: grant.as_str(),
            scope: config.offline_access.then_some(OFFLINE_SCOPE),
            username: if has_user { config.username.as_deref() } else { None },
            password: if has_user { config.password.as_deref() } else { None },
            client_secret: config.client_secret.as_deref(),
            refresh_token: if grant == Grant::RefreshToken { refresh_token } else { None },
        }
    }
}

/// Token-exchange response from the authorization server
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

#[cfg(test)]
mod tests {
    //! Unit tests for auth::types.
    use super::*;
    use crate::config::ClientConfig;

    #[test]
    fn password_grant_payload_carries_user_credentials() {
        let config = ClientConfig::builder().username("u").password("p").build();

        let request = TokenRequest::new(&config, Grant::Password, None);
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value["client_id"], "iotinabox");
        assert_eq!(value["grant_type"], "password");
        assert_eq!(value["username"], "u");
        assert_eq!(value["password"], "p");
        assert!(value.get("client_secret").is_none());
        assert!(value.get("refresh_token").is_none());
        assert!(value.get("scope").is_none());
    }

    #[test]
    fn client_credentials_payload_carries_secret() {
        let config = ClientConfig::builder().client_id("app").client_secret("shh").build();

        let request = TokenRequest::new(&config, Grant::ClientCredentials, None);
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value["grant_type"], "client_credentials");
        assert_eq!(value["client_secret"], "shh");
        assert!(value.get("username").is_none());
    }

    #[test]
    fn refresh_grant_includes_stored_refresh_token() {
        let config = ClientConfig::builder().username("u").password("p").build();

        let request = TokenRequest::new(&config, Grant::RefreshToken, Some("r1"));
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value["grant_type"], "refresh_token");
        assert_eq!(value["refresh_token"], "r1");
        // User credentials still ride along, as configured
        assert_eq!(value["username"], "u");
    }

    #[test]
    fn offline_access_adds_scope_to_every_grant() {
        let config =
            ClientConfig::builder().username("u").password("p").offline_access(true).build();

        for grant in [Grant::Password, Grant::RefreshToken] {
            let request = TokenRequest::new(&config, grant, Some("r1"));
            let value = serde_json::to_value(&request).unwrap();
            assert_eq!(value["scope"], "offline_access");
        }
    }
}
