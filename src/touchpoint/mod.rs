//! Touchpoint client — wraps the external generative-text service.
//!
//! A touchpoint is a point in the flow where a contextual assistant-style
//! line is generated. The call is strictly an embellishment: every failure
//! mode (network error, non-2xx status, bad body, deadline) resolves to
//! `None`, and the caller substitutes static fallback text or skips the
//! line. Nothing in this module ever propagates an error to the
//! orchestrator.

mod http;
pub(crate) mod retry;

pub use http::HttpTouchpointClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Which kind of assistant line is being requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TouchpointKind {
    /// The answer just accepted closes out a phase.
    PhaseTransition,
    /// A contextual acknowledgment of a free-text answer.
    QuestionResponse,
    /// The one-shot human-readable synopsis shown on the review screen.
    ReviewSummary,
}

/// Wire request for the touchpoint service.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TouchpointRequest {
    pub touchpoint: TouchpointKind,
    pub phase: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_answer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booking_data: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
}

/// Wire response: `{"response": "..."}`. Any other shape is a failure.
#[derive(Debug, Deserialize)]
pub(crate) struct TouchpointResponse {
    pub response: String,
}

/// The seam the orchestrator calls through.
///
/// Implementations must be infallible in the `Result` sense: degraded
/// service is expressed as `None`, never as an error.
#[async_trait]
pub trait TouchpointApi: Send + Sync {
    async fn generate(&self, request: &TouchpointRequest) -> Option<String>;
}

/// A client for hosts that have no touchpoint service configured. Every
/// call resolves to `None`, so the flow runs entirely on fallback text.
pub struct DisabledTouchpoints;

#[async_trait]
impl TouchpointApi for DisabledTouchpoints {
    async fn generate(&self, _request: &TouchpointRequest) -> Option<String> {
        None
    }
}

/// Static fallback lines, keyed by the phase being left. Used when a
/// `PHASE_TRANSITION` call resolves to `None`.
pub fn phase_transition_fallback(leaving_phase: u8) -> &'static str {
    match leaving_phase {
        1 => "Great choices! Now let's talk about the performance itself.",
        2 => "Perfect — that gives me a clear picture of the set. Now I just need a few details so I can get back to you.",
        _ => "Wonderful! Let's make sure I've got everything right.",
    }
}

/// Static fallback for the review-screen synopsis.
pub const REVIEW_SUMMARY_FALLBACK: &str =
    "Here's a summary of your booking request. Please look it over and confirm once everything is right.";
