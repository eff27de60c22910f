//! Static question table for the booking wizard.
//!
//! The wizard walks four phases: event details, performance, contact, and
//! review. Every `(phase, index)` the session can point at addresses exactly
//! one entry here; the table is fixed data and never mutated at runtime.

use crate::session::AnswerKey;

/// First phase number.
pub const PHASE_MIN: u8 = 1;
/// Last phase number (the review step).
pub const PHASE_MAX: u8 = 4;

/// What kind of input widget the host should show for a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// Single choice from a fixed set of pill values.
    Choice(&'static [&'static str]),
    /// Multiple choices, order of selection preserved.
    MultiChoice(&'static [&'static str]),
    /// A date reported by the host's date-picker widget.
    Date,
    /// A positive integer (guest count).
    Number,
    /// Free text.
    FreeText,
    /// The combined name/email/phone step, committed atomically.
    Contact,
    /// The terminal review-and-confirm step.
    Review,
}

/// One entry in the static question table.
#[derive(Debug, Clone, Copy)]
pub struct Question {
    pub phase: u8,
    pub index: usize,
    /// The answer slot this question fills. `None` for the contact step
    /// (which fills three slots) and the review step (which fills none).
    pub key: Option<AnswerKey>,
    /// Prompt template. `{name}` is replaced with the user's first name once
    /// the contact step has been completed.
    pub prompt: &'static str,
    pub input: InputKind,
}

pub const EVENT_TYPES: &[&str] = &["wedding", "corporate", "private_party", "festival", "other"];
pub const TIME_PREFERENCES: &[&str] = &["morning", "afternoon", "evening"];
pub const SETTINGS: &[&str] = &["indoor", "outdoor", "both"];
pub const DURATIONS: &[&str] = &["1_hour", "90_minutes", "2_hours", "custom"];
pub const MUSIC_STYLES: &[&str] = &["acoustic", "jazz", "pop", "folk", "classical", "soul"];
pub const REFERRAL_SOURCES: &[&str] = &[
    "search",
    "social_media",
    "word_of_mouth",
    "saw_a_show",
    "other",
];

/// The full question table, ordered by `(phase, index)`.
pub static QUESTIONS: &[Question] = &[
    // ── Phase 1: event details ──────────────────────────────────────────
    Question {
        phase: 1,
        index: 0,
        key: Some(AnswerKey::EventType),
        prompt: "What kind of event are you planning?",
        input: InputKind::Choice(EVENT_TYPES),
    },
    Question {
        phase: 1,
        index: 1,
        key: Some(AnswerKey::EventDate),
        prompt: "When is the big day?",
        input: InputKind::Date,
    },
    Question {
        phase: 1,
        index: 2,
        key: Some(AnswerKey::TimePreference),
        prompt: "What time of day will the performance be?",
        input: InputKind::Choice(TIME_PREFERENCES),
    },
    Question {
        phase: 1,
        index: 3,
        key: Some(AnswerKey::Venue),
        prompt: "Where will the event take place? A venue name or a city is perfect.",
        input: InputKind::FreeText,
    },
    Question {
        phase: 1,
        index: 4,
        key: Some(AnswerKey::GuestCount),
        prompt: "Roughly how many guests are you expecting?",
        input: InputKind::Number,
    },
    Question {
        phase: 1,
        index: 5,
        key: Some(AnswerKey::Setting),
        prompt: "Will the performance be indoors or outdoors?",
        input: InputKind::Choice(SETTINGS),
    },
    // ── Phase 2: the performance ────────────────────────────────────────
    Question {
        phase: 2,
        index: 0,
        key: Some(AnswerKey::Duration),
        prompt: "How long would you like the performance to be?",
        input: InputKind::Choice(DURATIONS),
    },
    Question {
        phase: 2,
        index: 1,
        key: Some(AnswerKey::MusicStyles),
        prompt: "Which styles should the set lean into? Pick as many as you like.",
        input: InputKind::MultiChoice(MUSIC_STYLES),
    },
    Question {
        phase: 2,
        index: 2,
        key: Some(AnswerKey::SongRequests),
        prompt: "Any must-play songs or artists?",
        input: InputKind::FreeText,
    },
    Question {
        phase: 2,
        index: 3,
        key: Some(AnswerKey::SpecialRequirements),
        prompt: "Anything else the performance needs to account for? Sound limits, a first dance, a surprise moment...",
        input: InputKind::FreeText,
    },
    // ── Phase 3: contact ────────────────────────────────────────────────
    Question {
        phase: 3,
        index: 0,
        key: None,
        prompt: "How can I reach you to confirm the details? I'll need your name, email, and phone number.",
        input: InputKind::Contact,
    },
    Question {
        phase: 3,
        index: 1,
        key: Some(AnswerKey::ReferralSource),
        prompt: "Last one, {name} — how did you hear about me?",
        input: InputKind::Choice(REFERRAL_SOURCES),
    },
    // ── Phase 4: review ─────────────────────────────────────────────────
    Question {
        phase: 4,
        index: 0,
        key: None,
        prompt: "Here's everything I've got — take a look and confirm when you're ready.",
        input: InputKind::Review,
    },
];

/// Follow-up prompt shown when the primary answer was "other" (event type).
pub const CUSTOM_EVENT_TYPE_PROMPT: &str = "No problem at all — what kind of event is it?";
/// Follow-up prompt shown when the primary answer was "custom" (duration).
pub const CUSTOM_DURATION_PROMPT: &str = "Sure — how long are you thinking?";

/// Look up the question at `(phase, index)`, if one is defined.
pub fn question_at(phase: u8, index: usize) -> Option<&'static Question> {
    QUESTIONS
        .iter()
        .find(|q| q.phase == phase && q.index == index)
}

/// Number of questions in a phase.
pub fn phase_len(phase: u8) -> usize {
    QUESTIONS.iter().filter(|q| q.phase == phase).count()
}

/// Whether this question is the last of its phase (answering it causes a
/// phase transition).
pub fn is_last_in_phase(question: &Question) -> bool {
    question.index + 1 == phase_len(question.phase)
}

/// Total number of questions across all phases.
pub fn total() -> usize {
    QUESTIONS.len()
}

/// Zero-based position of `(phase, index)` in the overall question order.
pub fn absolute_index(phase: u8, index: usize) -> usize {
    QUESTIONS
        .iter()
        .take_while(|q| (q.phase, q.index) < (phase, index))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_ordered_and_contiguous() {
        for phase in PHASE_MIN..=PHASE_MAX {
            let len = phase_len(phase);
            assert!(len > 0, "phase {phase} has no questions");
            for index in 0..len {
                assert!(
                    question_at(phase, index).is_some(),
                    "missing question at ({phase}, {index})"
                );
            }
            assert!(question_at(phase, len).is_none());
        }
        assert_eq!(
            total(),
            (PHASE_MIN..=PHASE_MAX).map(phase_len).sum::<usize>()
        );
    }

    #[test]
    fn review_phase_has_exactly_one_question() {
        assert_eq!(phase_len(PHASE_MAX), 1);
        let review = question_at(PHASE_MAX, 0).unwrap();
        assert_eq!(review.input, InputKind::Review);
        assert!(review.key.is_none());
    }

    #[test]
    fn last_in_phase_detection() {
        let setting = question_at(1, 5).unwrap();
        assert!(is_last_in_phase(setting));
        let event_type = question_at(1, 0).unwrap();
        assert!(!is_last_in_phase(event_type));
    }

    #[test]
    fn absolute_index_walks_table() {
        assert_eq!(absolute_index(1, 0), 0);
        assert_eq!(absolute_index(2, 0), phase_len(1));
        assert_eq!(absolute_index(PHASE_MAX, 0), total() - 1);
    }

    #[test]
    fn choice_questions_have_options() {
        for q in QUESTIONS {
            if let InputKind::Choice(opts) | InputKind::MultiChoice(opts) = q.input {
                assert!(!opts.is_empty(), "({}, {}) has no options", q.phase, q.index);
            }
        }
    }
}
