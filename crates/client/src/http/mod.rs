//! HTTP transport layer

mod client;

pub(crate) use client::HttpClient;
