//! Client for a hosted model scoring endpoint.
//!
//! Request shape:
//!
//! ```json
//! {"input_data": {
//!     "input_string": [{"role": "system", "content": "..."},
//!                      {"role": "user",   "content": "..."}],
//!     "parameters": {"temperature": 0.7, "max_tokens": 2000}}}
//! ```
//!
//! The answer is the top-level `output` field of the response object.

use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use super::{InferenceClient, ProviderError};

/// Longest slice of an error body kept for logging.
const MAX_ERROR_BODY_CHARS: usize = 512;

/// Fixed sampling parameters sent with every call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GenerationParams {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self { temperature: 0.7, max_tokens: 2000 }
    }
}

#[derive(Serialize)]
struct ScoreRequest<'a> {
    input_data: InputData<'a>,
}

#[derive(Serialize)]
struct InputData<'a> {
    input_string: [PromptMessage<'a>; 2],
    parameters: GenerationParams,
}

#[derive(Serialize)]
struct PromptMessage<'a> {
    role: &'static str,
    content: &'a str,
}

/// [`InferenceClient`] over HTTPS with bearer-token auth.
#[derive(Debug, Clone)]
pub struct ScoringClient {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    params: GenerationParams,
}

impl ScoringClient {
    /// `timeout` of `None` leaves the transport default in place.
    pub fn new(
        endpoint: impl Into<String>,
        api_key: Option<String>,
        params: GenerationParams,
        timeout: Option<Duration>,
    ) -> Result<Self, ProviderError> {
        let mut builder =
            Client::builder().user_agent(concat!("relay-server/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(ProviderError::Transport)?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key,
            params,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl InferenceClient for ScoringClient {
    async fn infer(&self, instructions: &str, question: &str) -> Result<String, ProviderError> {
        let body = ScoreRequest {
            input_data: InputData {
                input_string: [
                    PromptMessage { role: "system", content: instructions },
                    PromptMessage { role: "user", content: question },
                ],
                parameters: self.params,
            },
        };

        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let resp = request.send().await.map_err(ProviderError::Transport)?;
        let status = resp.status();
        if !status.is_success() {
            // The body is only for the log line; a failed read is not worse
            // than the status itself.
            let body = resp.text().await.unwrap_or_default();
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        let bytes = resp.bytes().await.map_err(ProviderError::Transport)?;
        let output = extract_output(&bytes)?;
        debug!(status = status.as_u16(), output_len = output.len(), "inference call done");
        Ok(output)
    }
}

/// Pull the answer out of a scoring response. A missing or null `output`
/// is an empty answer; a body that is not a JSON object is malformed.
fn extract_output(bytes: &[u8]) -> Result<String, ProviderError> {
    let value: Value = serde_json::from_slice(bytes)
        .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;
    let Value::Object(mut fields) = value else {
        return Err(ProviderError::MalformedResponse(
            "expected a JSON object".to_owned(),
        ));
    };
    Ok(match fields.remove("output") {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s,
        Some(other) => other.to_string(),
    })
}

// ── Tests ──────────────────────────────────────────────────────────────────────
