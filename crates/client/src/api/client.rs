//! Request dispatcher
//!
//! [`ApiClient::send`] is the single choke point every outbound call funnels
//! through: it resolves the Authorization header (unless the call is
//! public), performs the HTTP request, retries exactly once on an
//! authorization failure by forcing re-authentication, and classifies and
//! logs failures. Retry depth is an explicit counter, never recursion.

use std::sync::Arc;
use std::time::Instant;

use reqwest::header::AUTHORIZATION;
use reqwest::Method;
use serde_json::Value;
use tracing::{debug, error, instrument};
use url::Url;

use super::options::SendOptions;
use super::routes;
use crate::auth::{normalize_scheme, Authenticator};
use crate::config::ClientConfig;
use crate::error::{ApiError, ApiResult, ErrorKind};
use crate::http::HttpClient;

/// Maximum re-entries of the dispatch loop after the initial attempt.
/// Prevents infinite 401-retry loops.
const MAX_SEND_RETRIES: u32 = 1;

/// Client for the IoT in a Box REST API
#[derive(Debug)]
pub struct ApiClient {
    config: Arc<ClientConfig>,
    http: HttpClient,
    auth: Authenticator,
}

impl ApiClient {
    /// Create a client from the given configuration.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the base URL is invalid or the HTTP
    /// transport cannot be built.
    pub fn new(config: ClientConfig) -> ApiResult<Self> {
        Url::parse(&config.base_url).map_err(|err| {
            ApiError::config(format!("invalid base URL `{}`: {err}", config.base_url))
        })?;

        let http = HttpClient::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()?;
        let config = Arc::new(config);
        let auth = Authenticator::new(Arc::clone(&config), http.clone());

        Ok(Self { config, http, auth })
    }

    /// Return a header-ready bearer credential, exchanging tokens as needed.
    ///
    /// # Errors
    ///
    /// Fails with the cached lockout error, the bounded-retry error, or
    /// whatever the token endpoint answered.
    pub async fn authenticate(&self) -> ApiResult<String> {
        self.auth.authenticate().await
    }

    /// Send a request to the remote API.
    ///
    /// This is the sole primitive every endpoint operation goes through.
    /// Authenticated calls that come back 401 are retried exactly once after
    /// forcing re-authentication; public calls are exempt.
    ///
    /// # Errors
    ///
    /// Returns the classified failure after logging it once.
    #[instrument(skip(self, options), fields(path = %path))]
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        options: SendOptions,
    ) -> ApiResult<Value> {
        let url = format!("{}{}", self.config.base_url.trim_end_matches('/'), path);
        let mut attempts: u32 = 0;

        loop {
            if let Some(err) = self.auth.locked_error().await {
                return Err(err);
            }

            let started = Instant::now();

            if attempts > MAX_SEND_RETRIES {
                let err = ApiError::max_authenticated_requests_reached();
                log_failure(&method, &url, &options, started, &err);
                return Err(err);
            }

            let authorization = if options.is_public {
                None
            } else if let Some(token) = options.token.as_deref() {
                Some(normalize_scheme(token))
            } else {
                match self.auth.authenticate().await {
                    Ok(token) => Some(token),
                    Err(err) if should_force_reauth(&err) => {
                        self.auth.mark_request_failed().await;
                        attempts += 1;
                        continue;
                    }
                    Err(err) => {
                        log_failure(&method, &url, &options, started, &err);
                        return Err(err);
                    }
                }
            };

            let mut builder = self.http.request(method.clone(), &url);
            if let Some(value) = &authorization {
                builder = builder.header(AUTHORIZATION, value.as_str());
            }
            for (name, value) in &options.headers {
                builder = builder.header(name.as_str(), value.as_str());
            }
            if !options.query.is_empty() {
                builder = builder.query(&options.query);
            }
            if let Some(payload) = &options.payload {
                builder = builder.json(payload);
            }

            let response = match self.http.send(builder).await {
                Ok(response) => response,
                Err(err) => {
                    // Transport failures surface on first occurrence.
                    log_failure(&method, &url, &options, started, &err);
                    return Err(err);
                }
            };

            let status = response.status();
            if status.is_success() {
                self.auth.clear_request_failed().await;
                debug!(
                    method = %method,
                    status = status.as_u16(),
                    elapsed_ms = elapsed_ms(started),
                    path,
                    query = ?options.query,
                    "request completed"
                );
                return parse_body(response).await;
            }

            let body = response.text().await.unwrap_or_default();
            let message = if body.is_empty() {
                format!("{url} returned status {}", status.as_u16())
            } else {
                format!("{url} returned status {}: {body}", status.as_u16())
            };
            let err = ApiError::remote(status.as_u16(), message);

            if !options.is_public && should_force_reauth(&err) {
                // The credential was rejected; make the next authenticate()
                // re-request a token instead of reusing this one.
                self.auth.mark_request_failed().await;
                attempts += 1;
                continue;
            }

            log_failure(&method, &url, &options, started, &err);
            return Err(err);
        }
    }

    /// Invoke an operation from the routing table.
    ///
    /// Resolves the route, renders its path template from `params`, and
    /// forwards to [`Self::send`]. Routes marked public in the table are
    /// always sent public.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for unknown operations or missing path
    /// parameters, otherwise whatever [`Self::send`] returns.
    pub async fn execute(
        &self,
        operation: &str,
        params: &[(&str, &str)],
        options: SendOptions,
    ) -> ApiResult<Value> {
        let route = routes::lookup(operation)
            .ok_or_else(|| ApiError::config(format!("unknown operation `{operation}`")))?;
        let path = routes::render_path(route.path, params)?;

        let mut options = options;
        if route.public {
            options.is_public = true;
        }

        self.send(route.method.clone(), &path, options).await
    }

    /// Public health probe of the remote API.
    ///
    /// # Errors
    ///
    /// Returns the classified failure if the API is unreachable.
    pub async fn status(&self) -> ApiResult<Value> {
        self.execute("status", &[], SendOptions::new()).await
    }

    /// Fetch the authenticated user's own record.
    ///
    /// # Errors
    ///
    /// Returns the classified failure from [`Self::send`].
    pub async fn get_self(&self, options: SendOptions) -> ApiResult<Value> {
        self.execute("get_user", &[("user_id", "me")], options).await
    }
}

/// An authorization failure forces re-authentication and one retry; the
/// bounded-retry error itself must not re-enter the loop.
fn should_force_reauth(err: &ApiError) -> bool {
    err.is_authorization_failure() && err.kind != ErrorKind::MaxAuthenticatedRequests
}

fn log_failure(method: &Method, url: &str, options: &SendOptions, started: Instant, err: &ApiError) {
    error!(
        method = %method,
        status = err.status,
        elapsed_ms = elapsed_ms(started),
        url,
        query = ?options.query,
        "request failed: {err}"
    );
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

async fn parse_body(response: reqwest::Response) -> ApiResult<Value> {
    let text = response.text().await.map_err(ApiError::from)?;
    if text.is_empty() {
        return Ok(Value::Null);
    }
    // Non-JSON bodies are surfaced verbatim.
    Ok(serde_json::from_str(&text).unwrap_or(Value::String(text)))
}

#[cfg(test)]
mod tests {
    //! Unit tests for the dispatcher plumbing.
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn static_client(server: &MockServer) -> ApiClient {
        let config = ClientConfig::builder().base_url(server.uri()).token("abc").build();
        ApiClient::new(config).unwrap()
    }

    #[test]
    fn rejects_invalid_base_url() {
        let config = ClientConfig::builder().base_url("not a url").build();
        let err = ApiClient::new(config).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Config);
    }

    #[tokio::test]
    async fn forwards_headers_query_and_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/notify"))
            .and(header("Authorization", "Bearer abc"))
            .and(header("X-Request-Id", "42"))
            .and(query_param("limit", "5"))
            .and(body_json(serde_json::json!({ "message": "hi" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        let client = static_client(&server);
        let options = SendOptions::new()
            .header("X-Request-Id", "42")
            .query("limit", "5")
            .payload(serde_json::json!({ "message": "hi" }));

        let body = client.send(Method::POST, "/notify", options).await.unwrap();
        assert_eq!(body, serde_json::json!({ "ok": true }));
    }

    #[tokio::test]
    async fn empty_body_parses_as_null() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/users"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let client = static_client(&server);
        let body = client.send(Method::DELETE, "/users", SendOptions::new()).await.unwrap();
        assert_eq!(body, Value::Null);
    }

    #[tokio::test]
    async fn explicit_token_override_bypasses_authenticator() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users"))
            .and(header("Authorization", "Bearer override"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .expect(1)
            .mount(&server)
            .await;

        // Password mode: if the override were ignored the client would hit
        // /oauth/token, which is not mocked.
        let config =
            ClientConfig::builder().base_url(server.uri()).username("u").password("p").build();
        let client = ApiClient::new(config).unwrap();

        let options = SendOptions::new().token("override");
        client.send(Method::GET, "/users", options).await.unwrap();
    }

    #[tokio::test]
    async fn execute_renders_route_templates() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/companies/c1/locations/l1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "l1"})))
            .expect(1)
            .mount(&server)
            .await;

        let client = static_client(&server);
        let body = client
            .execute(
                "get_location",
                &[("company_id", "c1"), ("location_id", "l1")],
                SendOptions::new(),
            )
            .await
            .unwrap();
        assert_eq!(body["id"], "l1");
    }

    #[tokio::test]
    async fn execute_rejects_unknown_operations() {
        let server = MockServer::start().await;
        let client = static_client(&server);

        let err = client.execute("no_such_operation", &[], SendOptions::new()).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Config);
    }

    #[tokio::test]
    async fn status_is_sent_public() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/status"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"up": true})))
            .expect(1)
            .mount(&server)
            .await;

        // Password mode with no token endpoint mocked: a non-public call
        // would fail trying to authenticate.
        let config =
            ClientConfig::builder().base_url(server.uri()).username("u").password("p").build();
        let client = ApiClient::new(config).unwrap();

        let body = client.status().await.unwrap();
        assert_eq!(body["up"], true);

        let requests = server.received_requests().await.unwrap();
        assert!(requests[0].headers.get("Authorization").is_none());
    }
}
