//! HTTP client seam and the `ureq` implementation.
//!
//! Every send attempt ends in exactly one [`SendOutcome`], which the handler
//! switches over explicitly instead of unwinding through error types.

use std::sync::Arc;
use std::time::Duration;

use native_tls::TlsConnector;
use thiserror::Error;
use ureq::{Agent, AgentBuilder};

use super::payload::SendMessagePayload;

/// Longest slice of a non-JSON error body quoted in diagnostics.
const BODY_SNIPPET_CHARS: usize = 500;

/// Result of a single `sendMessage` attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SendOutcome {
    /// The endpoint answered with a 2xx status.
    Delivered,
    /// No usable HTTP response: connection, DNS, TLS or timeout failure.
    Transport(String),
    /// The endpoint answered with an error status.
    Rejected {
        status: u16,
        description: Option<String>,
    },
    /// Anything else that prevented the attempt, e.g. payload encoding.
    Other(String),
}

/// Errors raised while constructing a client.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("failed to initialise TLS: {0}")]
    Tls(#[from] native_tls::Error),
}

/// A connection-pooling client able to post a payload.
pub trait ChatClient: Send + Sync {
    fn send(&self, url: &str, payload: &SendMessagePayload<'_>) -> SendOutcome;
}

/// Produces fresh clients, e.g. after a transport failure.
pub trait ClientFactory: Send + Sync {
    fn create(&self, timeout: Duration) -> Result<Arc<dyn ChatClient>, ClientError>;
}

/// Builds `ureq` agents backed by the platform TLS stack.
#[derive(Clone, Copy, Debug, Default)]
pub struct UreqClientFactory;

impl ClientFactory for UreqClientFactory {
    fn create(&self, timeout: Duration) -> Result<Arc<dyn ChatClient>, ClientError> {
        let tls = TlsConnector::new()?;
        let agent = AgentBuilder::new()
            .timeout(timeout)
            .tls_connector(Arc::new(tls))
            .build();
        Ok(Arc::new(UreqClient { agent }))
    }
}

struct UreqClient {
    agent: Agent,
}

impl ChatClient for UreqClient {
    fn send(&self, url: &str, payload: &SendMessagePayload<'_>) -> SendOutcome {
        let body = match serde_json::to_string(payload) {
            Ok(body) => body,
            Err(err) => return SendOutcome::Other(format!("failed to encode payload: {err}")),
        };
        let result = self
            .agent
            .post(url)
            .set("Content-Type", "application/json")
            .send_string(&body);
        match result {
            Ok(_) => SendOutcome::Delivered,
            Err(ureq::Error::Status(status, response)) => SendOutcome::Rejected {
                status,
                description: describe_error_body(response.into_string().ok().as_deref()),
            },
            Err(ureq::Error::Transport(err)) => SendOutcome::Transport(err.to_string()),
        }
    }
}

/// Extract a human-readable reason from an error response body.
///
/// Prefers the Bot API's JSON `description` field, falling back to the first
/// 500 characters of the raw body.
pub fn describe_error_body(body: Option<&str>) -> Option<String> {
    let body = body?.trim();
    if body.is_empty() {
        return None;
    }
    let description = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("description")
                .and_then(serde_json::Value::as_str)
                .map(str::to_owned)
        });
    description.or_else(|| Some(body.chars().take(BODY_SNIPPET_CHARS).collect()))
}
