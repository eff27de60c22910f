//! Submission gateway — posts finalized answers to the booking service.
//!
//! Invoked exactly once per user action from the review screen, never
//! automatically. Success maps to terminal identifiers the orchestrator
//! writes back into the session; failure maps to a user-visible message and
//! leaves the session untouched so the user can press submit again.

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::SubmissionError;
use crate::session::BookingAnswers;

/// Terminal identifiers returned by a successful submission.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingConfirmation {
    pub booking_id: String,
    pub reference: String,
}

/// Failure body: `{"error": "..."}`, surfaced to the user verbatim.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// The seam the orchestrator submits through.
#[async_trait]
pub trait BookingApi: Send + Sync {
    async fn submit(&self, answers: &BookingAnswers)
    -> Result<BookingConfirmation, SubmissionError>;
}

/// POSTs the full answers record to the booking persistence service.
pub struct HttpBookingGateway {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpBookingGateway {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl BookingApi for HttpBookingGateway {
    async fn submit(
        &self,
        answers: &BookingAnswers,
    ) -> Result<BookingConfirmation, SubmissionError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(answers)
            .send()
            .await
            .map_err(|e| SubmissionError::Network(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            response
                .json::<BookingConfirmation>()
                .await
                .map_err(|e| SubmissionError::InvalidResponse(e.to_string()))
        } else {
            let message = response
                .json::<ErrorBody>()
                .await
                .map(|body| body.error)
                .unwrap_or_else(|_| format!("booking service returned {status}"));
            Err(SubmissionError::Rejected { message })
        }
    }
}
