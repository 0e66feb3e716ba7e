use std::time::Duration;

use reqwest::{Client as ReqwestClient, Method, RequestBuilder, Response};

use crate::error::{ApiError, ApiResult};

/// Thin wrapper over reqwest with client-wide timeout and user agent.
///
/// Deliberately carries no retry of its own: the only retry in this system
/// is the dispatcher's bounded 401 retry.
#[derive(Clone, Debug)]
pub(crate) struct HttpClient {
    client: ReqwestClient,
}

impl HttpClient {
    /// Start building a new HTTP client.
    pub(crate) fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Create a request builder using the underlying reqwest client.
    pub(crate) fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.client.request(method, url)
    }

    /// Execute the provided request builder, mapping transport failures.
    pub(crate) async fn send(&self, builder: RequestBuilder) -> ApiResult<Response> {
        builder.send().await.map_err(ApiError::from)
    }
}

/// Builder for [`HttpClient`].
#[derive(Debug)]
pub(crate) struct HttpClientBuilder {
    timeout: Duration,
    user_agent: Option<String>,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self { timeout: Duration::from_secs(30), user_agent: None }
    }
}

impl HttpClientBuilder {
    pub(crate) fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub(crate) fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    pub(crate) fn build(self) -> ApiResult<HttpClient> {
        let mut builder = ReqwestClient::builder().timeout(self.timeout).no_proxy();

        if let Some(agent) = self.user_agent {
            builder = builder.user_agent(agent);
        }

        let client = builder
            .build()
            .map_err(|err| ApiError::config(format!("failed to build HTTP client: {err}")))?;

        Ok(HttpClient { client })
    }
}
