//! Push delivery abstraction
//!
//! Detection components never talk to a push service directly; they hold
//! a `PushGateway` so tests can substitute a fake. Delivery is
//! fire-and-forget from the caller's perspective: no retries live here.
//!
//! # Configuration
//!
//! Environment variables (for `ExpoGateway::from_env`):
//! - `REIGN_PUSH_ENDPOINT`: Override the Expo push API URL (optional)

use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

/// Default Expo push API endpoint
const EXPO_PUSH_URL: &str = "https://exp.host/--/api/v2/push/send";

/// A single outbound push notification
#[derive(Debug, Clone, Serialize)]
pub struct PushMessage {
    pub token: String,
    pub title: String,
    pub body: String,
}

/// Outcome of a delivery attempt that reached the gateway
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryResult {
    Accepted,
    Rejected(String),
}

/// Trait defining the interface for push delivery backends
///
/// Implementations should be Send + Sync to allow use across async tasks.
#[async_trait]
pub trait PushGateway: Send + Sync {
    /// Deliver a single notification to a device token
    async fn send(&self, token: &str, title: &str, body: &str) -> Result<DeliveryResult>;

    /// Deliver a batch of notifications
    ///
    /// The default implementation sends sequentially; gateways with a
    /// native batch API should override it.
    async fn send_batch(&self, messages: &[PushMessage]) -> Vec<Result<DeliveryResult>> {
        let mut results = Vec::with_capacity(messages.len());
        for msg in messages {
            results.push(self.send(&msg.token, &msg.title, &msg.body).await);
        }
        results
    }
}

/// Expo push API request body
#[derive(Debug, Serialize)]
struct ExpoPushRequest<'a> {
    to: &'a str,
    title: &'a str,
    body: &'a str,
}

/// Expo push API response: `{"data": {"status": "ok" | "error", "message": ...}}`
#[derive(Debug, Deserialize)]
struct ExpoPushResponse {
    data: ExpoPushTicket,
}

#[derive(Debug, Deserialize)]
struct ExpoPushTicket {
    status: String,
    message: Option<String>,
}

/// Push gateway backed by the Expo push service
pub struct ExpoGateway {
    client: reqwest::Client,
    endpoint: String,
}

impl ExpoGateway {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }

    /// Create a gateway from the environment, falling back to the public
    /// Expo endpoint
    pub fn from_env() -> Self {
        let endpoint =
            std::env::var("REIGN_PUSH_ENDPOINT").unwrap_or_else(|_| EXPO_PUSH_URL.to_string());
        Self::new(endpoint)
    }
}

impl Default for ExpoGateway {
    fn default() -> Self {
        Self::from_env()
    }
}

#[async_trait]
impl PushGateway for ExpoGateway {
    async fn send(&self, token: &str, title: &str, body: &str) -> Result<DeliveryResult> {
        let request = ExpoPushRequest { to: token, title, body };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::Delivery(format!(
                "push gateway returned HTTP {}",
                response.status()
            )));
        }

        let ticket: ExpoPushResponse = response.json().await?;
        debug!(token = token, status = %ticket.data.status, "Push ticket received");

        if ticket.data.status == "ok" {
            Ok(DeliveryResult::Accepted)
        } else {
            Ok(DeliveryResult::Rejected(
                ticket
                    .data
                    .message
                    .unwrap_or_else(|| "unspecified gateway rejection".to_string()),
            ))
        }
    }
}

/// Mock gateway for testing
///
/// Records every message it is asked to send. Can be configured to fail
/// so callers' delivery-failure handling can be exercised.
#[derive(Default)]
pub struct MockGateway {
    fail: bool,
    sent: Mutex<Vec<PushMessage>>,
}

impl MockGateway {
    /// Create a mock gateway that accepts everything
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock gateway whose every send fails
    pub fn failing() -> Self {
        Self {
            fail: true,
            sent: Mutex::new(Vec::new()),
        }
    }

    /// Messages successfully handed to this gateway so far
    pub fn sent(&self) -> Vec<PushMessage> {
        self.sent.lock().expect("mock gateway lock").clone()
    }
}

#[async_trait]
impl PushGateway for MockGateway {
    async fn send(&self, token: &str, title: &str, body: &str) -> Result<DeliveryResult> {
        if self.fail {
            return Err(Error::Delivery("mock gateway failure".to_string()));
        }
        self.sent.lock().expect("mock gateway lock").push(PushMessage {
            token: token.to_string(),
            title: title.to_string(),
            body: body.to_string(),
        });
        Ok(DeliveryResult::Accepted)
    }
}
