//! Booking flow — conversational booking intake core.
//!
//! A phase-structured question/answer wizard for a performing musician's
//! booking page: four phases (event details, performance, contact, review),
//! optional assistant lines generated through an external touchpoint
//! service, follow-up sub-dialogs for "other"/"custom" answers, back/edit
//! navigation, and a final review-and-submit step.

pub mod config;
pub mod error;
pub mod flow;
pub mod questions;
pub mod session;
pub mod submit;
pub mod templates;
pub mod touchpoint;
pub mod validate;
