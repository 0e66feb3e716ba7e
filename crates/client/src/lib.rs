//! Rust client for the IoT in a Box REST API.
//!
//! Authenticates against the API's OAuth-style token endpoint and drives the
//! whole endpoint surface through a single dispatch primitive.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │    ApiClient    │  send / execute / authenticate
//! └────────┬────────┘
//!          │
//!          ├──► Authenticator   (grant selection, bounded token exchange)
//!          │         │
//!          │         └──► Session   (token state, failure flag, lockout)
//!          │
//!          ├──► routing table   (operation name → method + path template)
//!          │
//!          └──► HttpClient      (reqwest transport, timeout, user agent)
//! ```
//!
//! Every call passes through [`ApiClient::send`]: it attaches the bearer
//! credential (unless the call is public), performs the request, and retries
//! exactly once on an authorization failure after forcing
//! re-authentication. Failures are classified into [`ApiError`] with a
//! structural [`ErrorKind`] tag.
//!
//! # Usage Example
//!
//! ```no_run
//! use tinabox_client::{ApiClient, ClientConfig, SendOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::builder()
//!         .username("user@example.com")
//!         .password("hunter2")
//!         .offline_access(true)
//!         .build();
//!     let client = ApiClient::new(config)?;
//!
//!     // Routing-table invocation
//!     let companies = client.execute("get_all_companies", &[], SendOptions::new()).await?;
//!     println!("{companies}");
//!
//!     // Raw dispatch
//!     let me = client.get_self(SendOptions::new()).await?;
//!     println!("{me}");
//!
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

pub mod api;
mod auth;
pub mod config;
pub mod error;
mod http;

pub use api::client::ApiClient;
pub use api::options::SendOptions;
pub use api::routes::{Route, ROUTES};
pub use config::{
    ClientConfig, ClientConfigBuilder, CredentialMode, DEFAULT_BASE_URL, DEFAULT_CLIENT_ID,
};
pub use error::{ApiError, ApiResult, ErrorKind};
