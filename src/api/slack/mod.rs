//! Slack Web API backend
//!
//! Implements `SlackApi` over HTTPS with reqwest. Every method is a
//! form-encoded POST to `<api_url>/<method>` authenticated with the
//! configured bearer token.

mod client;
mod wire;

pub use client::SlackClient;
