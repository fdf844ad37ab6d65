use chrono::{DateTime, Utc};
use relay_types::{FeedbackRequest, LogEntry};

/// What a record in the `conversations` table was created from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    /// Written by the exchange pipeline after answering a question.
    Exchange,
    /// Written by the feedback reconciler when no exchange was found.
    FeedbackOnly,
}

impl RecordKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RecordKind::Exchange => "exchange",
            RecordKind::FeedbackOnly => "feedback_only",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "exchange" => Some(RecordKind::Exchange),
            "feedback_only" => Some(RecordKind::FeedbackOnly),
            _ => None,
        }
    }
}

/// A document handed to [`crate::entities::ConversationStore::insert`].
#[derive(Debug, Clone, PartialEq)]
pub enum ConversationDocument {
    Exchange(LogEntry),
    /// The raw feedback payload; has no user name or log timestamp.
    FeedbackOnly(FeedbackRequest),
}

impl ConversationDocument {
    pub fn kind(&self) -> RecordKind {
        match self {
            ConversationDocument::Exchange(_) => RecordKind::Exchange,
            ConversationDocument::FeedbackOnly(_) => RecordKind::FeedbackOnly,
        }
    }

    pub fn message_id(&self) -> &str {
        match self {
            ConversationDocument::Exchange(entry) => &entry.message_id,
            ConversationDocument::FeedbackOnly(req) => &req.message_id,
        }
    }
}

/// A single row in the `conversations` table.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversationRecord {
    /// Store-assigned, increasing row id.
    pub id: i64,
    pub kind: RecordKind,
    pub user_id: String,
    /// `None` on feedback-only records.
    pub user_name: Option<String>,
    pub conversation_id: String,
    pub message_id: String,
    pub question: String,
    pub answer: String,
    pub question_timestamp: DateTime<Utc>,
    pub answer_timestamp: DateTime<Utc>,
    pub feedback: Option<String>,
    /// `None` on feedback-only records.
    pub log_timestamp: Option<DateTime<Utc>>,
}
