use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::not_blank;

/// Body of `POST /feedback`. Refers to an earlier exchange by `message_id`
/// and repeats its content so a record can be rebuilt if the log is missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackRequest {
    pub question: String,
    pub answer: String,
    #[validate(custom(function = "not_blank"))]
    pub user_id: String,
    #[validate(custom(function = "not_blank"))]
    pub message_id: String,
    #[validate(custom(function = "not_blank"))]
    pub conversation_id: String,
    /// Free-form rating; an empty string is a valid (neutral) rating.
    pub feedback: String,
    #[serde(with = "crate::timestamp")]
    #[schema(value_type = String, format = DateTime)]
    pub question_timestamp: DateTime<Utc>,
    #[serde(with = "crate::timestamp")]
    #[schema(value_type = String, format = DateTime)]
    pub answer_timestamp: DateTime<Utc>,
}

/// The fields a feedback submission overwrites on an existing log entry.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedbackUpdate {
    pub feedback: String,
    pub question_timestamp: DateTime<Utc>,
    pub answer_timestamp: DateTime<Utc>,
}

impl From<&FeedbackRequest> for FeedbackUpdate {
    fn from(req: &FeedbackRequest) -> Self {
        Self {
            feedback: req.feedback.clone(),
            question_timestamp: req.question_timestamp,
            answer_timestamp: req.answer_timestamp,
        }
    }
}
