use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::ChatRequest;

/// Durable record of one chat exchange.
///
/// Created once by the exchange pipeline with `feedback = None`; the feedback
/// fields are overwritten later when the user rates the answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub user_id: String,
    pub user_name: String,
    pub conversation_id: String,
    pub message_id: String,
    pub question: String,
    pub answer: String,
    #[serde(with = "crate::timestamp")]
    #[schema(value_type = String, format = DateTime)]
    pub question_timestamp: DateTime<Utc>,
    #[serde(with = "crate::timestamp")]
    #[schema(value_type = String, format = DateTime)]
    pub answer_timestamp: DateTime<Utc>,
    pub feedback: Option<String>,
    #[serde(with = "crate::timestamp")]
    #[schema(value_type = String, format = DateTime)]
    pub log_timestamp: DateTime<Utc>,
}

impl LogEntry {
    /// Build the entry for an answered `request`, observed at `now`.
    ///
    /// `answer_timestamp` never precedes `question_timestamp`, even when the
    /// client clock runs ahead of ours.
    pub fn for_exchange(request: &ChatRequest, answer: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            user_id: request.user_id.clone(),
            user_name: request.user_name.clone(),
            conversation_id: request.conversation_id.clone(),
            message_id: request.message_id.clone(),
            question: request.question.clone(),
            answer: answer.into(),
            question_timestamp: request.question_timestamp,
            answer_timestamp: now.max(request.question_timestamp),
            feedback: None,
            log_timestamp: now,
        }
    }
}
