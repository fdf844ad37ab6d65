use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::not_blank;

/// Body of `POST /chat`: a single question from the front-end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    /// The user's question, forwarded verbatim to the inference provider.
    #[validate(custom(function = "not_blank"), length(max = 131072))]
    pub question: String,
    #[validate(custom(function = "not_blank"))]
    pub user_id: String,
    /// Unique per message; the logical key of the persisted log entry.
    #[validate(custom(function = "not_blank"))]
    pub message_id: String,
    pub user_name: String,
    #[validate(custom(function = "not_blank"))]
    pub conversation_id: String,
    #[serde(with = "crate::timestamp")]
    #[schema(value_type = String, format = DateTime)]
    pub question_timestamp: DateTime<Utc>,
}
