//! The wizard's position and terminal flags.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::questions::{self, PHASE_MAX, PHASE_MIN, Question};

use super::BookingAnswers;

/// One visitor's booking session.
///
/// `(phase, question)` always addresses a defined entry in the question
/// table; the mutation operations below never step outside it. The state is
/// serde-serializable so a host can persist a half-finished session and
/// restore it later.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    pub id: Uuid,
    pub phase: u8,
    pub question: usize,
    pub answers: BookingAnswers,
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub booking_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub booking_reference: Option<String>,
}

impl SessionState {
    /// A fresh session at phase 1, question 0, with no answers.
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            phase: PHASE_MIN,
            question: 0,
            answers: BookingAnswers::default(),
            completed: false,
            booking_id: None,
            booking_reference: None,
        }
    }

    /// The question table entry the session currently points at.
    pub fn current_question(&self) -> &'static Question {
        questions::question_at(self.phase, self.question)
            .expect("(phase, question) always addresses a defined question")
    }

    /// Whether the session is at the absolute start, `(1, 0)`.
    pub fn is_at_start(&self) -> bool {
        self.phase == PHASE_MIN && self.question == 0
    }

    /// Advance one step: within the phase if another question exists there,
    /// otherwise to the next phase's first question. No-op past the review
    /// step.
    pub fn next_question(&mut self) {
        if questions::question_at(self.phase, self.question + 1).is_some() {
            self.question += 1;
        } else if self.phase < PHASE_MAX {
            self.phase += 1;
            self.question = 0;
        }
    }

    /// Step back one: within the phase, or to the previous phase's last
    /// question. No-op at `(1, 0)`.
    pub fn prev_question(&mut self) {
        if self.question > 0 {
            self.question -= 1;
        } else if self.phase > PHASE_MIN {
            self.phase -= 1;
            self.question = questions::phase_len(self.phase) - 1;
        }
    }

    /// Unchecked jump used by the review screen's "Edit" action. Prior
    /// answers are kept so the re-shown inputs come pre-filled.
    pub fn go_to(&mut self, phase: u8, question: usize) {
        debug_assert!(
            questions::question_at(phase, question).is_some(),
            "edit-jump target ({phase}, {question}) is not a defined question"
        );
        self.phase = phase;
        self.question = question;
    }

    pub fn set_booking_id(&mut self, id: impl Into<String>) {
        self.booking_id = Some(id.into());
    }

    pub fn set_booking_reference(&mut self, reference: impl Into<String>) {
        self.booking_reference = Some(reference.into());
    }

    /// Mark the session terminal. Set exactly once, after a successful
    /// submission; the orchestrator performs no further mutation afterward.
    pub fn complete(&mut self) {
        self.completed = true;
    }

    /// Fraction of the flow completed, for the host's progress bar.
    pub fn progress(&self) -> f32 {
        if self.completed {
            return 1.0;
        }
        questions::absolute_index(self.phase, self.question) as f32 / questions::total() as f32
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}
