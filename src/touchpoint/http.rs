//! HTTP implementation of the touchpoint seam, built on `reqwest`.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use crate::config::FlowConfig;

use super::{TouchpointApi, TouchpointRequest, TouchpointResponse, retry};

/// Internal per-attempt failure. Absorbed by the retry helper; never leaves
/// this module.
#[derive(Debug, thiserror::Error)]
enum CallError {
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("touchpoint service returned {0}")]
    Status(reqwest::StatusCode),
}

/// POSTs touchpoint requests to the configured endpoint with bounded retry
/// and a fresh per-attempt deadline.
pub struct HttpTouchpointClient {
    client: reqwest::Client,
    endpoint: String,
    bearer_token: Option<SecretString>,
    attempts: u32,
    deadline: Duration,
}

impl HttpTouchpointClient {
    pub fn new(
        endpoint: impl Into<String>,
        bearer_token: Option<SecretString>,
        config: &FlowConfig,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            bearer_token,
            attempts: config.touchpoint_attempts,
            deadline: config.touchpoint_deadline,
        }
    }

    async fn attempt(&self, request: &TouchpointRequest) -> Result<String, CallError> {
        let mut builder = self.client.post(&self.endpoint).json(request);
        if let Some(token) = &self.bearer_token {
            builder = builder.bearer_auth(token.expose_secret());
        }
        let response = builder.send().await?;
        if !response.status().is_success() {
            return Err(CallError::Status(response.status()));
        }
        let body: TouchpointResponse = response.json().await?;
        Ok(body.response)
    }
}

#[async_trait]
impl TouchpointApi for HttpTouchpointClient {
    async fn generate(&self, request: &TouchpointRequest) -> Option<String> {
        retry::bounded(self.attempts, self.deadline, "touchpoint", || {
            self.attempt(request)
        })
        .await
    }
}
