//! The accumulated booking answers — one sparse slot per question key.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Identifies one answer slot. Wire names (camelCase) come from
/// [`AnswerKey::field`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerKey {
    EventType,
    CustomEventType,
    EventDate,
    TimePreference,
    Venue,
    GuestCount,
    Setting,
    Duration,
    CustomDuration,
    MusicStyles,
    SongRequests,
    SpecialRequirements,
    Name,
    Email,
    Phone,
    ReferralSource,
}

impl AnswerKey {
    /// The wire-format field name for this slot.
    pub fn field(&self) -> &'static str {
        match self {
            Self::EventType => "eventType",
            Self::CustomEventType => "customEventType",
            Self::EventDate => "eventDate",
            Self::TimePreference => "timePreference",
            Self::Venue => "venue",
            Self::GuestCount => "guestCount",
            Self::Setting => "setting",
            Self::Duration => "duration",
            Self::CustomDuration => "customDuration",
            Self::MusicStyles => "musicStyles",
            Self::SongRequests => "songRequests",
            Self::SpecialRequirements => "specialRequirements",
            Self::Name => "name",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::ReferralSource => "referralSource",
        }
    }
}

/// A single answer as produced by an input widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerValue {
    Text(String),
    Date(NaiveDate),
    Number(u32),
    Many(Vec<String>),
    Contact {
        name: String,
        email: String,
        phone: String,
    },
}

impl std::fmt::Display for AnswerValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text(s) => write!(f, "{}", s.replace('_', " ")),
            Self::Date(d) => write!(f, "{d}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Many(v) => write!(f, "{}", v.join(", ")),
            Self::Contact { name, email, phone } => {
                write!(f, "{name} · {email} · {phone}")
            }
        }
    }
}

/// The sparse record of everything the user has answered so far.
///
/// `None` means "not yet answered", not "empty". Once a slot is set it is
/// never implicitly cleared; the only way back is an explicit edit-jump that
/// re-shows the question with the prior value pre-filled.
///
/// Serializes with camelCase keys — the serialized form is exactly the body
/// posted to the booking submission service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingAnswers {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_event_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_preference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub venue: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guest_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub setting: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub music_styles: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub song_requests: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_requirements: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referral_source: Option<String>,
}

impl BookingAnswers {
    /// Write one answer slot.
    ///
    /// The orchestrator only produces key/value pairings that match the
    /// question table, so a mismatched pairing is a programmer error.
    pub fn set(&mut self, key: AnswerKey, value: AnswerValue) {
        use AnswerKey::*;
        match (key, value) {
            (EventType, AnswerValue::Text(s)) => self.event_type = Some(s),
            (CustomEventType, AnswerValue::Text(s)) => self.custom_event_type = Some(s),
            (EventDate, AnswerValue::Date(d)) => self.event_date = Some(d),
            (TimePreference, AnswerValue::Text(s)) => self.time_preference = Some(s),
            (Venue, AnswerValue::Text(s)) => self.venue = Some(s),
            (GuestCount, AnswerValue::Number(n)) => self.guest_count = Some(n),
            (Setting, AnswerValue::Text(s)) => self.setting = Some(s),
            (Duration, AnswerValue::Text(s)) => self.duration = Some(s),
            (CustomDuration, AnswerValue::Text(s)) => self.custom_duration = Some(s),
            (MusicStyles, AnswerValue::Many(v)) => self.music_styles = Some(dedup(v)),
            (SongRequests, AnswerValue::Text(s)) => self.song_requests = Some(s),
            (SpecialRequirements, AnswerValue::Text(s)) => self.special_requirements = Some(s),
            (Name, AnswerValue::Text(s)) => self.name = Some(s),
            (Email, AnswerValue::Text(s)) => self.email = Some(s),
            (Phone, AnswerValue::Text(s)) => self.phone = Some(s),
            (ReferralSource, AnswerValue::Text(s)) => self.referral_source = Some(s),
            (key, value) => {
                panic!("answer slot {:?} cannot hold {value:?}", key)
            }
        }
    }

    /// Read one answer slot, if answered.
    pub fn get(&self, key: AnswerKey) -> Option<AnswerValue> {
        use AnswerKey::*;
        let text = |v: &Option<String>| v.clone().map(AnswerValue::Text);
        match key {
            EventType => text(&self.event_type),
            CustomEventType => text(&self.custom_event_type),
            EventDate => self.event_date.map(AnswerValue::Date),
            TimePreference => text(&self.time_preference),
            Venue => text(&self.venue),
            GuestCount => self.guest_count.map(AnswerValue::Number),
            Setting => text(&self.setting),
            Duration => text(&self.duration),
            CustomDuration => text(&self.custom_duration),
            MusicStyles => self.music_styles.clone().map(AnswerValue::Many),
            SongRequests => text(&self.song_requests),
            SpecialRequirements => text(&self.special_requirements),
            Name => text(&self.name),
            Email => text(&self.email),
            Phone => text(&self.phone),
            ReferralSource => text(&self.referral_source),
        }
    }

    /// Batch merge: every answered slot in `patch` overwrites the
    /// corresponding slot here; unanswered slots are left alone. Used by the
    /// contact step to commit name/email/phone atomically.
    pub fn merge(&mut self, patch: BookingAnswers) {
        macro_rules! take {
            ($field:ident) => {
                if patch.$field.is_some() {
                    self.$field = patch.$field;
                }
            };
        }
        take!(event_type);
        take!(custom_event_type);
        take!(event_date);
        take!(time_preference);
        take!(venue);
        take!(guest_count);
        take!(setting);
        take!(duration);
        take!(custom_duration);
        take!(music_styles);
        take!(song_requests);
        take!(special_requirements);
        take!(name);
        take!(email);
        take!(phone);
        take!(referral_source);
    }

    /// The user's first name, once the contact step has been completed.
    pub fn first_name(&self) -> Option<&str> {
        self.name
            .as_deref()
            .and_then(|n| n.split_whitespace().next())
    }
}

/// Drop duplicate selections while preserving the order of first selection.
fn dedup(values: Vec<String>) -> Vec<String> {
    let mut seen = Vec::with_capacity(values.len());
    for v in values {
        if !seen.contains(&v) {
            seen.push(v);
        }
    }
    seen
}
