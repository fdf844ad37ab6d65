//! Request orchestration: answering questions and reconciling feedback.

pub mod exchange;
pub mod feedback;

#[cfg(test)]
pub(crate) mod testing;

pub use exchange::{ExchangePipeline, TECHNICAL_FALLBACK, TRANSPORT_FALLBACK};
pub use feedback::{FeedbackError, FeedbackOutcome, FeedbackReconciler};
