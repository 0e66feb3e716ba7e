//! Authentication core
//!
//! Token state, grant selection, and the bounded token exchange that backs
//! every authenticated request.
//!
//! # Module Organization
//!
//! - [`jwt`]: decode-only expiry extraction (no signature verification)
//! - [`session`]: mutable session state (token, refresh token, failure flag,
//!   lockout)
//! - [`types`]: grant and token-exchange wire types
//! - [`authenticator`]: the bounded authenticate loop and single-flight lock

pub(crate) mod authenticator;
mod jwt;
pub(crate) mod session;
pub(crate) mod types;

pub(crate) use authenticator::{normalize_scheme, Authenticator};
