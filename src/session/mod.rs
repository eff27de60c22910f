//! Session state store — the wizard's position, answers, and terminal flags.
//!
//! Pure data with total, synchronous mutations. No I/O happens at this
//! layer; the orchestrator owns the only live instance and applies values
//! the other components return.

mod answers;
mod state;

pub use answers::{AnswerKey, AnswerValue, BookingAnswers};
pub use state::SessionState;
