//! The booking flow state machine.
//!
//! Layered on top of the session store. All transitions are driven by
//! discrete events: an answer is submitted, an interstitial settles, the
//! user navigates. The orchestrator owns the only live [`SessionState`];
//! validators, the touchpoint client, and the submission gateway return
//! values that it applies.

use std::sync::Arc;

use crate::error::{FlowError, ValidationErrors};
use crate::questions::{self, InputKind, PHASE_MAX, Question};
use crate::session::{AnswerKey, AnswerValue, BookingAnswers, SessionState};
use crate::submit::{BookingApi, BookingConfirmation};
use crate::touchpoint::{
    REVIEW_SUMMARY_FALLBACK, TouchpointApi, TouchpointKind, TouchpointRequest,
    phase_transition_fallback,
};
use crate::validate;

/// Which secondary slot an active follow-up sub-dialog will fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowupKey {
    CustomEventType,
    CustomDuration,
}

impl FollowupKey {
    fn answer_key(self) -> AnswerKey {
        match self {
            Self::CustomEventType => AnswerKey::CustomEventType,
            Self::CustomDuration => AnswerKey::CustomDuration,
        }
    }

    fn prompt(self) -> &'static str {
        match self {
            Self::CustomEventType => questions::CUSTOM_EVENT_TYPE_PROMPT,
            Self::CustomDuration => questions::CUSTOM_DURATION_PROMPT,
        }
    }
}

/// A touchpoint call decided at answer acceptance, issued when the
/// interstitial settles. Held only transiently; never part of the session.
#[derive(Debug, Clone)]
pub struct PendingTouchpoint {
    kind: TouchpointKind,
    question: &'static str,
    user_answer: String,
    /// Static text substituted when the call resolves to `None`. Phase
    /// transitions always have one; contextual acknowledgments are skipped
    /// silently instead.
    fallback: Option<&'static str>,
}

/// UI-sequencing state, distinct from the session's `(phase, question)`.
#[derive(Debug, Clone)]
pub enum UiState {
    /// The current question is presented; an input affordance is shown.
    Prompting,
    /// A follow-up sub-dialog captures free text for a secondary slot.
    AwaitingFollowup { key: FollowupKey },
    /// The just-given answer is echoed; a touchpoint call may be pending.
    /// Inputs are hidden and back-navigation is disabled until settled.
    Interstitial { pending: Option<PendingTouchpoint> },
}

/// What happened when an answer was submitted.
#[derive(Debug, Clone)]
pub enum StepEvent {
    /// The answer opened a follow-up sub-dialog instead of advancing.
    FollowupOpened { prompt: &'static str },
    /// The answer was accepted; the flow is now in an interstitial.
    /// `touchpoint_pending` tells the host whether settling will await the
    /// external service.
    AnswerAccepted {
        echo: String,
        touchpoint_pending: bool,
    },
}

pub struct Orchestrator {
    state: SessionState,
    ui: UiState,
    touchpoints: Arc<dyn TouchpointApi>,
    bookings: Arc<dyn BookingApi>,
    /// Cached review synopsis. Fetched once per arrival at phase 4 and
    /// invalidated by any edit-jump, so re-edited answers produce a fresh
    /// summary.
    review_summary: Option<String>,
}

impl Orchestrator {
    pub fn new(touchpoints: Arc<dyn TouchpointApi>, bookings: Arc<dyn BookingApi>) -> Self {
        Self::resume(SessionState::new(), touchpoints, bookings)
    }

    /// Continue a previously persisted session.
    pub fn resume(
        state: SessionState,
        touchpoints: Arc<dyn TouchpointApi>,
        bookings: Arc<dyn BookingApi>,
    ) -> Self {
        Self {
            state,
            ui: UiState::Prompting,
            touchpoints,
            bookings,
            review_summary: None,
        }
    }

    pub fn session(&self) -> &SessionState {
        &self.state
    }

    pub fn ui(&self) -> &UiState {
        &self.ui
    }

    pub fn current_question(&self) -> &'static Question {
        self.state.current_question()
    }

    /// The prompt to present, with `{name}` interpolated once known.
    pub fn prompt(&self) -> String {
        let raw = match &self.ui {
            UiState::AwaitingFollowup { key } => key.prompt(),
            _ => self.current_question().prompt,
        };
        let name = self.state.answers.first_name().unwrap_or("there");
        raw.replace("{name}", name)
    }

    /// The cached review synopsis, if one has been fetched. Never issues a
    /// call; hosts presenting the review screen should go through
    /// [`ensure_review_summary`](Self::ensure_review_summary) instead.
    pub fn review_summary(&self) -> Option<&str> {
        self.review_summary.as_deref()
    }

    /// Fetch the review synopsis if the session is at phase 4 and nothing
    /// is cached, then return it. At most one call per arrival; the cache
    /// is dropped only by [`edit_jump`](Self::edit_jump). This also covers
    /// arrivals that never pass through
    /// [`settle_interstitial`](Self::settle_interstitial), such as a
    /// resumed session or an edit-jump straight to the review step.
    pub async fn ensure_review_summary(&mut self) -> Option<&str> {
        if self.state.phase == PHASE_MAX && self.review_summary.is_none() {
            let request = self.touchpoint_request(TouchpointKind::ReviewSummary, None, None);
            let summary = self
                .touchpoints
                .generate(&request)
                .await
                .unwrap_or_else(|| REVIEW_SUMMARY_FALLBACK.to_string());
            self.review_summary = Some(summary);
        }
        self.review_summary.as_deref()
    }

    /// Whether the host should intercept an attempt to leave the flow.
    pub fn should_warn_on_exit(&self) -> bool {
        !self.state.completed && self.state.phase < PHASE_MAX
    }

    /// Submit an answer for the current question (or the active follow-up).
    ///
    /// On acceptance the flow enters an interstitial; the host must then call
    /// [`settle_interstitial`](Self::settle_interstitial) to advance.
    pub fn submit_answer(&mut self, value: AnswerValue) -> Result<StepEvent, FlowError> {
        if self.state.completed {
            return Err(FlowError::AlreadyCompleted);
        }
        match self.ui {
            UiState::Interstitial { .. } => return Err(FlowError::NotAcceptingInput),
            UiState::AwaitingFollowup { key } => return self.submit_followup(key, value),
            UiState::Prompting => {}
        }

        let question = self.current_question();
        match (question.input, value) {
            (InputKind::Choice(options), AnswerValue::Text(choice)) => {
                let choice = choice.trim().to_string();
                if !options.contains(&choice.as_str()) {
                    return Err(invalid(question, "is not one of the offered options"));
                }
                // "other"/"custom" open a sub-dialog instead of advancing
                if let Some(followup) = followup_for(question, &choice) {
                    let key = question.key.expect("choice questions fill a slot");
                    self.state.answers.set(key, AnswerValue::Text(choice));
                    self.ui = UiState::AwaitingFollowup { key: followup };
                    return Ok(StepEvent::FollowupOpened {
                        prompt: followup.prompt(),
                    });
                }
                Ok(self.accept(question, AnswerValue::Text(choice), false))
            }
            (InputKind::MultiChoice(options), AnswerValue::Many(picked)) => {
                if picked.is_empty() {
                    return Err(invalid(question, "needs at least one selection"));
                }
                if let Some(unknown) = picked.iter().find(|p| !options.contains(&p.as_str())) {
                    return Err(invalid(question, format!("\"{unknown}\" is not an option")));
                }
                Ok(self.accept(question, AnswerValue::Many(picked), false))
            }
            (InputKind::Date, AnswerValue::Date(date)) => {
                Ok(self.accept(question, AnswerValue::Date(date), false))
            }
            (InputKind::Number, AnswerValue::Number(n)) => {
                validate::guest_count(n).map_err(|e| ValidationErrors(vec![e]))?;
                Ok(self.accept(question, AnswerValue::Number(n), false))
            }
            (InputKind::FreeText, AnswerValue::Text(text)) => {
                validate::require(field_of(question), &text)
                    .map_err(|e| ValidationErrors(vec![e]))?;
                Ok(self.accept(question, AnswerValue::Text(text.trim().to_string()), false))
            }
            (InputKind::Contact, AnswerValue::Contact { name, email, phone }) => {
                validate::contact(&name, &email, &phone)?;
                let (name, email, phone) = (
                    name.trim().to_string(),
                    email.trim().to_string(),
                    phone.trim().to_string(),
                );
                let echo = AnswerValue::Contact {
                    name: name.clone(),
                    email: email.clone(),
                    phone: phone.clone(),
                }
                .to_string();
                // All three validated; commit atomically as one batch merge.
                self.state.answers.merge(BookingAnswers {
                    name: Some(name),
                    email: Some(email),
                    phone: Some(phone),
                    ..Default::default()
                });
                Ok(self.accept_committed(question, echo, false))
            }
            (InputKind::Review, _) => Err(FlowError::NotAcceptingInput),
            (_, other) => Err(invalid(
                question,
                format!("cannot be answered with {other:?}"),
            )),
        }
    }

    /// Free-text submission for an active follow-up sub-dialog. Writes the
    /// secondary slot and then proceeds exactly as a normal answer would.
    fn submit_followup(
        &mut self,
        key: FollowupKey,
        value: AnswerValue,
    ) -> Result<StepEvent, FlowError> {
        let AnswerValue::Text(text) = value else {
            return Err(FlowError::Invalid(ValidationErrors::single(
                key.answer_key().field(),
                "expects free text",
            )));
        };
        validate::require(key.answer_key().field(), &text)
            .map_err(|e| ValidationErrors(vec![e]))?;

        let question = self.current_question();
        let text = text.trim().to_string();
        self.state
            .answers
            .set(key.answer_key(), AnswerValue::Text(text.clone()));
        Ok(self.accept_committed(question, text, true))
    }

    /// Write the answer slot, then enter the interstitial.
    fn accept(&mut self, question: &'static Question, value: AnswerValue, ack: bool) -> StepEvent {
        let echo = value.to_string();
        if let Some(key) = question.key {
            self.state.answers.set(key, value);
        }
        self.accept_committed(question, echo, ack)
    }

    /// Enter the interstitial for an answer whose slots are already written.
    fn accept_committed(
        &mut self,
        question: &'static Question,
        echo: String,
        followup_ack: bool,
    ) -> StepEvent {
        let pending = self.decide_touchpoint(question, followup_ack, &echo);
        let touchpoint_pending = pending.is_some();
        self.ui = UiState::Interstitial { pending };
        StepEvent::AnswerAccepted {
            echo,
            touchpoint_pending,
        }
    }

    /// At most one touchpoint per accepted answer: a phase transition wins
    /// over a contextual acknowledgment; most answers warrant neither.
    fn decide_touchpoint(
        &self,
        question: &'static Question,
        followup_ack: bool,
        echo: &str,
    ) -> Option<PendingTouchpoint> {
        if questions::is_last_in_phase(question) {
            return Some(PendingTouchpoint {
                kind: TouchpointKind::PhaseTransition,
                question: question.prompt,
                user_answer: echo.to_string(),
                fallback: Some(phase_transition_fallback(question.phase)),
            });
        }
        let contextual = followup_ack
            || matches!(
                question.key,
                Some(AnswerKey::SongRequests | AnswerKey::SpecialRequirements)
            );
        contextual.then(|| PendingTouchpoint {
            kind: TouchpointKind::QuestionResponse,
            question: question.prompt,
            user_answer: echo.to_string(),
            fallback: None,
        })
    }

    /// Resolve the active interstitial: issue the pending touchpoint call
    /// (if any), advance one step, and return the assistant line to present
    /// — `None` means no line, advance silently.
    ///
    /// Arriving at phase 4 additionally fetches the one-shot review
    /// synopsis, unless a cached one is already present.
    pub async fn settle_interstitial(&mut self) -> Result<Option<String>, FlowError> {
        let pending = match &mut self.ui {
            UiState::Interstitial { pending } => pending.take(),
            _ => return Err(FlowError::NoInterstitial),
        };

        let mut line = None;
        if let Some(p) = pending {
            let request = self.touchpoint_request(p.kind, Some(p.question), Some(p.user_answer));
            line = self.touchpoints.generate(&request).await;
            if line.is_none() {
                line = p.fallback.map(str::to_string);
            }
        }

        let leaving = self.state.phase;
        self.state.next_question();
        if self.state.phase != leaving {
            tracing::info!(from = leaving, to = self.state.phase, "phase transition");
        }
        self.ui = UiState::Prompting;

        self.ensure_review_summary().await;

        Ok(line)
    }

    /// Step back one question. A no-op (returning `false`) during an
    /// interstitial, at `(1, 0)`, or after completion. Backing out of an
    /// open follow-up sub-dialog closes it first, re-presenting the primary
    /// question at the same position; a second back then moves.
    pub fn go_back(&mut self) -> bool {
        if self.state.completed || matches!(self.ui, UiState::Interstitial { .. }) {
            return false;
        }
        if matches!(self.ui, UiState::AwaitingFollowup { .. }) {
            self.ui = UiState::Prompting;
            return true;
        }
        if self.state.is_at_start() {
            return false;
        }
        self.state.prev_question();
        true
    }

    /// Jump to a question from the review screen's "Edit" action. Answers
    /// are kept; the cached review synopsis is dropped so it is rebuilt from
    /// the edited data on the next arrival at phase 4.
    pub fn edit_jump(&mut self, phase: u8, question: usize) -> Result<(), FlowError> {
        if self.state.completed {
            return Err(FlowError::AlreadyCompleted);
        }
        self.state.go_to(phase, question);
        self.ui = UiState::Prompting;
        self.review_summary = None;
        Ok(())
    }

    /// Post the finalized answers. Only valid from the review step, never
    /// auto-invoked, and idempotently rejected once completed. Failure
    /// leaves every answer and the session position untouched; the user may
    /// simply press submit again.
    pub async fn submit_booking(&mut self) -> Result<BookingConfirmation, FlowError> {
        if self.state.completed {
            return Err(FlowError::AlreadyCompleted);
        }
        if self.state.phase != PHASE_MAX || !matches!(self.ui, UiState::Prompting) {
            return Err(FlowError::NotAtReview);
        }

        let confirmation = self.bookings.submit(&self.state.answers).await?;
        self.state.set_booking_id(&confirmation.booking_id);
        self.state.set_booking_reference(&confirmation.reference);
        self.state.complete();
        tracing::info!(
            booking_id = %confirmation.booking_id,
            reference = %confirmation.reference,
            "booking submitted"
        );
        Ok(confirmation)
    }

    fn touchpoint_request(
        &self,
        kind: TouchpointKind,
        question: Option<&'static str>,
        user_answer: Option<String>,
    ) -> TouchpointRequest {
        TouchpointRequest {
            touchpoint: kind,
            phase: self.state.phase,
            question: question.map(str::to_string),
            user_answer,
            booking_data: serde_json::to_value(&self.state.answers).ok(),
            user_name: self.state.answers.first_name().map(str::to_string),
        }
    }
}

fn field_of(question: &'static Question) -> &'static str {
    question.key.map(|k| k.field()).unwrap_or("answer")
}

fn invalid(question: &'static Question, message: impl Into<String>) -> FlowError {
    FlowError::Invalid(ValidationErrors::single(field_of(question), message))
}

/// Which follow-up, if any, a choice value opens.
fn followup_for(question: &Question, choice: &str) -> Option<FollowupKey> {
    match (question.key, choice) {
        (Some(AnswerKey::EventType), "other") => Some(FollowupKey::CustomEventType),
        (Some(AnswerKey::Duration), "custom") => Some(FollowupKey::CustomDuration),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use chrono::NaiveDate;

    use super::*;
    use crate::error::SubmissionError;
    use crate::touchpoint::DisabledTouchpoints;

    /// Scripted touchpoint stub: pops the next line per call and counts
    /// calls per kind.
    #[derive(Default)]
    struct ScriptedTouchpoints {
        lines: Mutex<Vec<Option<String>>>,
        phase_transitions: AtomicUsize,
        question_responses: AtomicUsize,
        review_summaries: AtomicUsize,
    }

    impl ScriptedTouchpoints {
        fn always(line: &str) -> Self {
            Self {
                lines: Mutex::new(vec![Some(line.to_string()); 64]),
                ..Default::default()
            }
        }

        fn failing() -> Self {
            Self::default()
        }
    }

    #[async_trait]
    impl TouchpointApi for ScriptedTouchpoints {
        async fn generate(&self, request: &TouchpointRequest) -> Option<String> {
            match request.touchpoint {
                TouchpointKind::PhaseTransition => &self.phase_transitions,
                TouchpointKind::QuestionResponse => &self.question_responses,
                TouchpointKind::ReviewSummary => &self.review_summaries,
            }
            .fetch_add(1, Ordering::SeqCst);
            self.lines.lock().unwrap().pop().flatten()
        }
    }

    struct StubBookings {
        result: Mutex<Option<Result<BookingConfirmation, SubmissionError>>>,
        calls: AtomicUsize,
    }

    impl StubBookings {
        fn ok(id: &str, reference: &str) -> Self {
            Self {
                result: Mutex::new(Some(Ok(BookingConfirmation {
                    booking_id: id.to_string(),
                    reference: reference.to_string(),
                }))),
                calls: AtomicUsize::new(0),
            }
        }

        fn rejected(message: &str) -> Self {
            Self {
                result: Mutex::new(Some(Err(SubmissionError::Rejected {
                    message: message.to_string(),
                }))),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl BookingApi for StubBookings {
        async fn submit(
            &self,
            _answers: &BookingAnswers,
        ) -> Result<BookingConfirmation, SubmissionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result
                .lock()
                .unwrap()
                .take()
                .expect("stub submit called more than scripted")
        }
    }

    fn orchestrator_with(
        touchpoints: Arc<dyn TouchpointApi>,
        bookings: Arc<dyn BookingApi>,
    ) -> Orchestrator {
        Orchestrator::new(touchpoints, bookings)
    }

    fn quiet() -> Orchestrator {
        orchestrator_with(
            Arc::new(DisabledTouchpoints),
            Arc::new(StubBookings::ok("b0", "BK-0")),
        )
    }

    fn text(s: &str) -> AnswerValue {
        AnswerValue::Text(s.to_string())
    }

    async fn answer_and_settle(orch: &mut Orchestrator, value: AnswerValue) -> Option<String> {
        orch.submit_answer(value).unwrap();
        orch.settle_interstitial().await.unwrap()
    }

    /// Walk the full phase 1 so tests can start from phase 2.
    async fn complete_phase_1(orch: &mut Orchestrator) {
        answer_and_settle(orch, text("wedding")).await;
        answer_and_settle(
            orch,
            AnswerValue::Date(NaiveDate::from_ymd_opt(2026, 6, 20).unwrap()),
        )
        .await;
        answer_and_settle(orch, text("evening")).await;
        answer_and_settle(orch, text("Riverside Hall")).await;
        answer_and_settle(orch, AnswerValue::Number(120)).await;
        answer_and_settle(orch, text("outdoor")).await;
    }

    #[tokio::test]
    async fn other_event_type_opens_followup_and_advances_one_step() {
        let mut orch = quiet();
        let event = orch.submit_answer(text("other")).unwrap();
        assert!(matches!(event, StepEvent::FollowupOpened { .. }));
        assert!(orch.prompt().contains("what kind of event"));
        // Primary slot written, position unchanged
        assert_eq!(orch.session().answers.event_type.as_deref(), Some("other"));
        assert_eq!((orch.session().phase, orch.session().question), (1, 0));

        orch.submit_answer(text("Fundraiser gala")).unwrap();
        orch.settle_interstitial().await.unwrap();

        assert_eq!(
            orch.session().answers.custom_event_type.as_deref(),
            Some("Fundraiser gala")
        );
        // Exactly one logical step, not two
        assert_eq!((orch.session().phase, orch.session().question), (1, 1));
    }

    #[tokio::test]
    async fn custom_duration_followup_fills_secondary_slot() {
        let mut orch = quiet();
        complete_phase_1(&mut orch).await;
        assert_eq!(orch.session().phase, 2);

        orch.submit_answer(text("custom")).unwrap();
        orch.submit_answer(text("Two 45-minute sets")).unwrap();
        orch.settle_interstitial().await.unwrap();

        assert_eq!(orch.session().answers.duration.as_deref(), Some("custom"));
        assert_eq!(
            orch.session().answers.custom_duration.as_deref(),
            Some("Two 45-minute sets")
        );
        assert_eq!((orch.session().phase, orch.session().question), (2, 1));
    }

    #[tokio::test]
    async fn failing_touchpoint_falls_back_and_still_advances() {
        let touchpoints = Arc::new(ScriptedTouchpoints::failing());
        let mut orch = orchestrator_with(
            touchpoints.clone(),
            Arc::new(StubBookings::ok("b0", "BK-0")),
        );
        complete_phase_1(&mut orch).await;

        // Last answer of phase 1 produced the PHASE_TRANSITION fallback.
        // Re-run the boundary explicitly to inspect the line.
        orch.edit_jump(1, 5).unwrap();
        orch.submit_answer(text("indoor")).unwrap();
        let line = orch.settle_interstitial().await.unwrap();
        assert_eq!(
            line.as_deref(),
            Some("Great choices! Now let's talk about the performance itself.")
        );
        assert_eq!(orch.session().phase, 2);
        assert!(touchpoints.phase_transitions.load(Ordering::SeqCst) >= 1);
    }

    #[tokio::test]
    async fn free_text_ack_skips_silently_when_degraded() {
        let touchpoints = Arc::new(ScriptedTouchpoints::failing());
        let mut orch = orchestrator_with(
            touchpoints.clone(),
            Arc::new(StubBookings::ok("b0", "BK-0")),
        );
        complete_phase_1(&mut orch).await;
        answer_and_settle(&mut orch, text("1_hour")).await;
        answer_and_settle(&mut orch, AnswerValue::Many(vec!["jazz".to_string()])).await;

        // Song requests is a contextual-ack question; with the service
        // down there is no fallback line, just a silent advance.
        orch.submit_answer(text("At Last — Etta James")).unwrap();
        let line = orch.settle_interstitial().await.unwrap();
        assert_eq!(line, None);
        assert_eq!((orch.session().phase, orch.session().question), (2, 3));
        assert_eq!(touchpoints.question_responses.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn at_most_one_touchpoint_per_answer() {
        // specialRequirements is free text AND last of phase 2: the phase
        // transition wins and no contextual ack is issued for that answer.
        let touchpoints = Arc::new(ScriptedTouchpoints::always("nice"));
        let mut orch = orchestrator_with(
            touchpoints.clone(),
            Arc::new(StubBookings::ok("b0", "BK-0")),
        );
        complete_phase_1(&mut orch).await;
        answer_and_settle(&mut orch, text("90_minutes")).await;
        answer_and_settle(&mut orch, AnswerValue::Many(vec!["folk".to_string()])).await;
        answer_and_settle(&mut orch, text("None")).await;

        let before = touchpoints.question_responses.load(Ordering::SeqCst);
        answer_and_settle(&mut orch, text("Quiet hours after 10pm")).await;
        assert_eq!(orch.session().phase, 3);
        assert_eq!(touchpoints.question_responses.load(Ordering::SeqCst), before);
    }

    #[tokio::test]
    async fn contact_validation_is_atomic() {
        let mut orch = quiet();
        orch.edit_jump(3, 0).unwrap();

        let err = orch
            .submit_answer(AnswerValue::Contact {
                name: String::new(),
                email: "bad".to_string(),
                phone: "123".to_string(),
            })
            .unwrap_err();
        let FlowError::Invalid(errors) = err else {
            panic!("expected validation errors");
        };
        assert_eq!(errors.len(), 3);
        assert!(orch.session().answers.name.is_none());
        assert!(orch.session().answers.email.is_none());
        assert!(orch.session().answers.phone.is_none());

        // A valid submission commits all three at once, echoed in the
        // contact display format
        let event = orch
            .submit_answer(AnswerValue::Contact {
                name: "  Dana Whitfield ".to_string(),
                email: "dana@example.com".to_string(),
                phone: "+1 555 123 4567".to_string(),
            })
            .unwrap();
        let StepEvent::AnswerAccepted { echo, .. } = event else {
            panic!("expected an accepted answer");
        };
        assert_eq!(
            echo,
            AnswerValue::Contact {
                name: "Dana Whitfield".to_string(),
                email: "dana@example.com".to_string(),
                phone: "+1 555 123 4567".to_string(),
            }
            .to_string()
        );
        assert_eq!(orch.session().answers.first_name(), Some("Dana"));
    }

    #[tokio::test]
    async fn back_is_a_noop_during_interstitial_and_at_start() {
        let mut orch = quiet();
        assert!(!orch.go_back(), "at (1,0)");

        orch.submit_answer(text("wedding")).unwrap();
        assert!(matches!(orch.ui(), UiState::Interstitial { .. }));
        assert!(!orch.go_back(), "during interstitial");
        assert_eq!((orch.session().phase, orch.session().question), (1, 0));

        orch.settle_interstitial().await.unwrap();
        assert!(orch.go_back());
        assert!(orch.session().is_at_start());
    }

    #[tokio::test]
    async fn back_closes_followup_before_stepping() {
        let mut orch = quiet();
        complete_phase_1(&mut orch).await;

        orch.submit_answer(text("custom")).unwrap();
        assert!(matches!(orch.ui(), UiState::AwaitingFollowup { .. }));

        // First back abandons the sub-dialog in place
        assert!(orch.go_back());
        assert!(matches!(orch.ui(), UiState::Prompting));
        assert_eq!((orch.session().phase, orch.session().question), (2, 0));
        assert!(orch.session().answers.custom_duration.is_none());

        // Second back moves to the previous question
        assert!(orch.go_back());
        assert_eq!((orch.session().phase, orch.session().question), (1, 5));
    }

    #[tokio::test]
    async fn back_closes_followup_at_the_first_question() {
        let mut orch = quiet();
        orch.submit_answer(text("other")).unwrap();
        assert!(matches!(orch.ui(), UiState::AwaitingFollowup { .. }));

        // Even at (1,0) the sub-dialog can be backed out of, so the
        // primary question can be re-answered directly.
        assert!(orch.go_back());
        assert!(matches!(orch.ui(), UiState::Prompting));
        assert!(orch.session().is_at_start());

        answer_and_settle(&mut orch, text("wedding")).await;
        assert_eq!(orch.session().answers.event_type.as_deref(), Some("wedding"));
        assert!(orch.session().answers.custom_event_type.is_none());
        assert_eq!((orch.session().phase, orch.session().question), (1, 1));
    }

    #[tokio::test]
    async fn review_summary_fetched_once_and_invalidated_by_edit() {
        let touchpoints = Arc::new(ScriptedTouchpoints::always("Your booking in brief."));
        let mut orch = orchestrator_with(
            touchpoints.clone(),
            Arc::new(StubBookings::ok("b0", "BK-0")),
        );

        // Arrive at phase 4 via the last question of phase 3.
        orch.edit_jump(3, 1).unwrap();
        orch.state.answers.name = Some("Dana Whitfield".to_string());
        answer_and_settle(&mut orch, text("word_of_mouth")).await;
        assert_eq!(orch.session().phase, 4);
        assert_eq!(orch.review_summary(), Some("Your booking in brief."));
        assert_eq!(touchpoints.review_summaries.load(Ordering::SeqCst), 1);

        // Leaving with back and returning does not re-fetch
        orch.go_back();
        answer_and_settle(&mut orch, text("saw_a_show")).await;
        assert_eq!(touchpoints.review_summaries.load(Ordering::SeqCst), 1);

        // An edit-jump invalidates the cache; next arrival re-fetches
        orch.edit_jump(3, 1).unwrap();
        assert_eq!(orch.review_summary(), None);
        answer_and_settle(&mut orch, text("search")).await;
        assert_eq!(touchpoints.review_summaries.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn resumed_session_at_review_fetches_summary_on_demand() {
        let touchpoints = Arc::new(ScriptedTouchpoints::always("All set for June."));
        let mut orch = orchestrator_with(
            touchpoints.clone(),
            Arc::new(StubBookings::ok("b0", "BK-0")),
        );
        orch.edit_jump(4, 0).unwrap();

        let saved = serde_json::to_string(orch.session()).unwrap();
        let restored: SessionState = serde_json::from_str(&saved).unwrap();
        let mut resumed = Orchestrator::resume(
            restored,
            touchpoints.clone(),
            Arc::new(StubBookings::ok("b0", "BK-0")),
        );
        assert_eq!(resumed.review_summary(), None);

        assert_eq!(
            resumed.ensure_review_summary().await,
            Some("All set for June.")
        );
        assert_eq!(touchpoints.review_summaries.load(Ordering::SeqCst), 1);

        // Cached on the first call; asking again does not re-fetch
        resumed.ensure_review_summary().await;
        assert_eq!(touchpoints.review_summaries.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn edit_jump_into_review_fetches_summary_on_demand() {
        let touchpoints = Arc::new(ScriptedTouchpoints::always("Fresh synopsis."));
        let mut orch = orchestrator_with(
            touchpoints.clone(),
            Arc::new(StubBookings::ok("b0", "BK-0")),
        );
        orch.edit_jump(4, 0).unwrap();
        assert_eq!(orch.review_summary(), None);

        assert_eq!(
            orch.ensure_review_summary().await,
            Some("Fresh synopsis.")
        );
        assert_eq!(touchpoints.review_summaries.load(Ordering::SeqCst), 1);

        // Below phase 4 the call is never issued
        orch.edit_jump(1, 0).unwrap();
        assert_eq!(orch.ensure_review_summary().await, None);
        assert_eq!(touchpoints.review_summaries.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn review_summary_uses_fallback_when_degraded() {
        let mut orch = quiet();
        orch.edit_jump(3, 1).unwrap();
        answer_and_settle(&mut orch, text("search")).await;
        assert_eq!(orch.review_summary(), Some(REVIEW_SUMMARY_FALLBACK));
    }

    #[tokio::test]
    async fn successful_submission_completes_the_session() {
        let bookings = Arc::new(StubBookings::ok("b1", "BK-1"));
        let mut orch = orchestrator_with(Arc::new(DisabledTouchpoints), bookings.clone());
        orch.edit_jump(4, 0).unwrap();

        let confirmation = orch.submit_booking().await.unwrap();
        assert_eq!(confirmation.booking_id, "b1");
        assert_eq!(confirmation.reference, "BK-1");

        let session = orch.session();
        assert!(session.completed);
        assert_eq!(session.booking_id.as_deref(), Some("b1"));
        assert_eq!(session.booking_reference.as_deref(), Some("BK-1"));
        assert_eq!(bookings.calls.load(Ordering::SeqCst), 1);

        // Never auto-invoked again; a second call is rejected without
        // reaching the gateway.
        let err = orch.submit_booking().await.unwrap_err();
        assert!(matches!(err, FlowError::AlreadyCompleted));
        assert_eq!(bookings.calls.load(Ordering::SeqCst), 1);
        assert!(!orch.should_warn_on_exit());
    }

    #[tokio::test]
    async fn failed_submission_leaves_state_intact_and_allows_retry() {
        let bookings = Arc::new(StubBookings::rejected("That date is no longer available"));
        let mut orch = orchestrator_with(Arc::new(DisabledTouchpoints), bookings.clone());
        orch.edit_jump(4, 0).unwrap();
        orch.state.answers.venue = Some("Riverside Hall".to_string());

        let err = orch.submit_booking().await.unwrap_err();
        assert_eq!(err.to_string(), "That date is no longer available");
        assert!(!orch.session().completed);
        assert!(orch.session().booking_id.is_none());
        assert_eq!(
            orch.session().answers.venue.as_deref(),
            Some("Riverside Hall")
        );

        // Retry is a manual user action and reaches the gateway again
        *bookings.result.lock().unwrap() = Some(Ok(BookingConfirmation {
            booking_id: "b2".to_string(),
            reference: "BK-2".to_string(),
        }));
        orch.submit_booking().await.unwrap();
        assert!(orch.session().completed);
        assert_eq!(bookings.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn submit_outside_review_is_rejected() {
        let mut orch = quiet();
        let err = orch.submit_booking().await.unwrap_err();
        assert!(matches!(err, FlowError::NotAtReview));
    }

    #[tokio::test]
    async fn exit_warning_policy() {
        let mut orch = quiet();
        assert!(orch.should_warn_on_exit());
        orch.edit_jump(4, 0).unwrap();
        assert!(!orch.should_warn_on_exit());
    }

    #[tokio::test]
    async fn prompt_interpolates_first_name() {
        let mut orch = quiet();
        orch.edit_jump(3, 1).unwrap();
        assert!(orch.prompt().contains("there"));
        orch.state.answers.name = Some("Dana Whitfield".to_string());
        assert!(orch.prompt().contains("Dana"));
        assert!(!orch.prompt().contains("{name}"));
    }

    #[tokio::test]
    async fn rejects_out_of_table_choice() {
        let mut orch = quiet();
        let err = orch.submit_answer(text("rave")).unwrap_err();
        assert!(matches!(err, FlowError::Invalid(_)));
        assert!(orch.session().answers.event_type.is_none());
    }
}
