//! Per-field answer validators.
//!
//! Pure functions: they return acceptance or a field-keyed error and never
//! touch session state. The contact step validates all three fields before
//! any of them are committed.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::error::{FieldError, ValidationErrors};

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));

/// Guest counts outside this range are almost certainly typos.
pub const MAX_GUEST_COUNT: u32 = 10_000;

/// Reject empty or whitespace-only input.
pub fn require(field: &'static str, value: &str) -> Result<(), FieldError> {
    if value.trim().is_empty() {
        Err(FieldError::new(field, "is required"))
    } else {
        Ok(())
    }
}

/// `local@domain.tld` shape.
pub fn email(value: &str) -> Result<(), FieldError> {
    require("email", value)?;
    if EMAIL_RE.is_match(value.trim()) {
        Ok(())
    } else {
        Err(FieldError::new(
            "email",
            "does not look like an email address",
        ))
    }
}

/// 7–15 digits after stripping spaces, dashes, parens, and a leading `+`.
pub fn phone(value: &str) -> Result<(), FieldError> {
    require("phone", value)?;
    let digits = value.chars().filter(char::is_ascii_digit).count();
    if (7..=15).contains(&digits) {
        Ok(())
    } else {
        Err(FieldError::new(
            "phone",
            "should contain between 7 and 15 digits",
        ))
    }
}

pub fn guest_count(value: u32) -> Result<(), FieldError> {
    if value == 0 {
        Err(FieldError::new("guestCount", "must be at least 1"))
    } else if value > MAX_GUEST_COUNT {
        Err(FieldError::new(
            "guestCount",
            format!("must be at most {MAX_GUEST_COUNT}"),
        ))
    } else {
        Ok(())
    }
}

/// Parse the value a date widget reports (ISO `YYYY-MM-DD`).
pub fn event_date(value: &str) -> Result<NaiveDate, FieldError> {
    value
        .trim()
        .parse::<NaiveDate>()
        .map_err(|_| FieldError::new("eventDate", "is not a valid date"))
}

/// Validate the contact step atomically: all three fields are checked and
/// every failure is reported together, so the caller commits either all of
/// name/email/phone or none of them.
pub fn contact(name: &str, email_addr: &str, phone_number: &str) -> Result<(), ValidationErrors> {
    let mut errors = Vec::new();
    if let Err(e) = require("name", name) {
        errors.push(e);
    }
    if let Err(e) = email(email_addr) {
        errors.push(e);
    }
    if let Err(e) = phone(phone_number) {
        errors.push(e);
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationErrors(errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_rejects_blank() {
        assert!(require("venue", "").is_err());
        assert!(require("venue", "   ").is_err());
        assert!(require("venue", "Riverside Hall").is_ok());
    }

    #[test]
    fn email_shapes() {
        assert!(email("dana@example.com").is_ok());
        assert!(email("dana.whitfield+band@mail.example.co").is_ok());
        assert!(email("bad").is_err());
        assert!(email("no@tld").is_err());
        assert!(email("spaces in@example.com").is_err());
        assert!(email("").is_err());
    }

    #[test]
    fn phone_counts_digits_only() {
        assert!(phone("5551234").is_ok());
        assert!(phone("+1 (555) 123-4567").is_ok());
        assert!(phone("123").is_err());
        assert!(phone("1234567890123456").is_err());
        assert!(phone("").is_err());
    }

    #[test]
    fn guest_count_bounds() {
        assert!(guest_count(1).is_ok());
        assert!(guest_count(250).is_ok());
        assert!(guest_count(0).is_err());
        assert!(guest_count(MAX_GUEST_COUNT + 1).is_err());
    }

    #[test]
    fn event_date_parses_iso() {
        assert_eq!(
            event_date("2026-06-20").unwrap(),
            NaiveDate::from_ymd_opt(2026, 6, 20).unwrap()
        );
        assert!(event_date("June 20th").is_err());
        assert!(event_date("2026-13-01").is_err());
    }

    #[test]
    fn contact_reports_all_failures_together() {
        let errs = contact("", "bad", "123").unwrap_err();
        assert_eq!(errs.len(), 3);
        let fields: Vec<_> = errs.0.iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["name", "email", "phone"]);
    }

    #[test]
    fn contact_accepts_valid_input() {
        assert!(contact("Dana Whitfield", "dana@example.com", "+1 555 123 4567").is_ok());
    }
}
