//! Outbound inference calls.
//!
//! [`InferenceClient`] is the seam the exchange pipeline depends on;
//! [`ScoringClient`] talks to an HTTPS scoring endpoint.

mod scoring;

pub use scoring::{GenerationParams, ScoringClient};

use std::future::Future;

use thiserror::Error;

/// Why an inference call produced no answer.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Connect, timeout or body-read failure.
    #[error("inference transport failed: {0}")]
    Transport(#[source] reqwest::Error),

    /// The endpoint answered with a non-success status.
    #[error("inference endpoint returned {status}: {body}")]
    Status { status: u16, body: String },

    /// A success status whose body could not be understood.
    #[error("malformed inference response: {0}")]
    MalformedResponse(String),
}

impl ProviderError {
    /// `true` for transport and HTTP-status failures, `false` for anything the
    /// provider returned that we could not interpret.
    pub fn is_transport(&self) -> bool {
        matches!(self, ProviderError::Transport(_) | ProviderError::Status { .. })
    }
}

/// A single, non-retried call to a text-generation service.
pub trait InferenceClient: Send + Sync + 'static {
    /// Answer `question` under the system `instructions`.
    fn infer(
        &self,
        instructions: &str,
        question: &str,
    ) -> impl Future<Output = Result<String, ProviderError>> + Send;
}
