// src/fetch/mod.rs
pub mod release;
pub mod zips;

use std::time::Duration;

use reqwest::Client;

use crate::config::USER_AGENT;

/// Shared HTTP client for all upstream calls: rustls, identifying user
/// agent, and a hard per-request timeout so a stalled portal surfaces as
/// `UpstreamUnavailable` instead of hanging the endpoint.
pub fn build_client(timeout: Duration) -> reqwest::Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
}
