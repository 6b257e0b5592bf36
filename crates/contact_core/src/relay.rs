//! Delivery of a contact message to the third-party form relay.

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::{header::ACCEPT, Client};
use shared::{
    error::RelayError,
    protocol::{relay_error_message, RelaySubmission},
};
use tracing::{debug, warn};
use url::Url;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Capability the contact form uses to hand a message to the relay.
#[async_trait]
pub trait MessageRelay: Send + Sync {
    async fn send(&self, submission: &RelaySubmission) -> std::result::Result<(), RelayError>;
}

/// Posts form-encoded submissions to an HTTPS form relay and asks for a JSON reply.
pub struct HttpRelay {
    http: Client,
    endpoint: Url,
}

impl HttpRelay {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self> {
        let endpoint = parse_endpoint(endpoint)?;
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build relay http client")?;
        Ok(Self { http, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

pub fn parse_endpoint(raw: &str) -> Result<Url> {
    let endpoint = Url::parse(raw.trim())
        .with_context(|| format!("invalid relay endpoint '{raw}'"))?;
    match endpoint.scheme() {
        "https" | "http" => Ok(endpoint),
        other => Err(anyhow!(
            "relay endpoint '{raw}' uses unsupported scheme '{other}'"
        )),
    }
}

#[async_trait]
impl MessageRelay for HttpRelay {
    async fn send(&self, submission: &RelaySubmission) -> std::result::Result<(), RelayError> {
        let response = self
            .http
            .post(self.endpoint.clone())
            .header(ACCEPT, "application/json")
            .form(submission)
            .send()
            .await
            .map_err(|err| {
                warn!(endpoint = %self.endpoint, "relay request failed: {err}");
                RelayError::Transport(err.to_string())
            })?;

        let status = response.status();
        if status.is_success() {
            debug!(endpoint = %self.endpoint, status = status.as_u16(), "relay accepted message");
            return Ok(());
        }

        let body = match response.bytes().await {
            Ok(body) => body.to_vec(),
            Err(err) => {
                warn!(status = status.as_u16(), "failed to read relay error body: {err}");
                Vec::new()
            }
        };
        Err(RelayError::Rejected {
            status: status.as_u16(),
            message: relay_error_message(&body),
        })
    }
}

#[cfg(test)]
#[path = "tests/relay_tests.rs"]
mod tests;
