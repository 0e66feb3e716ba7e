//! Request dispatch and the endpoint routing table

pub mod client;
pub mod options;
pub mod routes;

pub use client::ApiClient;
pub use options::SendOptions;
pub use routes::{lookup, render_path, Route, ROUTES};
