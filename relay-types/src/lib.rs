//! Shared types for the relay gateway.
//!
//! The JSON shapes here are the wire contract with the chat front-end, so
//! field names stay camelCase on the wire even though the Rust fields are
//! snake_case.

pub mod chat;
pub mod error;
pub mod feedback;
pub mod log;
pub mod timestamp;

pub use chat::ChatRequest;
pub use error::ValidationError;
pub use feedback::{FeedbackRequest, FeedbackUpdate};
pub use log::LogEntry;

use validator::Validate;

/// Run the derived field checks on `value`.
pub fn check<T: Validate>(value: &T) -> Result<(), ValidationError> {
    value.validate().map_err(ValidationError::from)
}

/// Rejects strings that are empty or whitespace only.
pub(crate) fn not_blank(value: &str) -> Result<(), validator::ValidationError> {
    if value.trim().is_empty() {
        let mut err = validator::ValidationError::new("blank");
        err.message = Some("must not be blank".into());
        return Err(err);
    }
    Ok(())
}
