//! Flow orchestrator — the state machine that drives the booking chat.

mod orchestrator;

pub use orchestrator::{FollowupKey, Orchestrator, StepEvent, UiState};
