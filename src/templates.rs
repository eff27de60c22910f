//! Email template identifiers.
//!
//! Rendering lives in an external template service consumed as
//! `render(kind, data) -> markup`; the core only knows which identifiers to
//! pass and what data accompanies them.

use serde_json::{Value, json};

use crate::session::BookingAnswers;
use crate::submit::BookingConfirmation;

/// Template kinds the host passes to the external renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailTemplate {
    /// Confirmation sent to the person who booked.
    ClientConfirmation,
    /// Notification sent to the artist with the full request.
    ArtistNotification,
}

impl EmailTemplate {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ClientConfirmation => "booking_confirmation",
            Self::ArtistNotification => "booking_notification",
        }
    }
}

/// The data record accompanying either template kind.
pub fn template_data(answers: &BookingAnswers, confirmation: &BookingConfirmation) -> Value {
    json!({
        "reference": confirmation.reference,
        "bookingId": confirmation.booking_id,
        "booking": answers,
    })
}
