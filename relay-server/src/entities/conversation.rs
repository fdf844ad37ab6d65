use std::future::Future;

use chrono::{DateTime, Utc};
use relay_types::{timestamp, FeedbackUpdate};

use crate::entities::{
    ConversationDocument, ConversationRecord, RecordKind, SqliteStore, StorageError,
};

/// Append-mostly log of chat exchanges keyed by message id.
///
/// Each method is a single statement against the backing store; nothing here
/// spans more than one write, so callers get per-document atomicity only.
pub trait ConversationStore: Send + Sync + 'static {
    /// Append a new document.
    fn insert(
        &self,
        doc: ConversationDocument,
    ) -> impl Future<Output = Result<(), StorageError>> + Send;

    /// Overwrite the feedback fields of the oldest record for `message_id`.
    ///
    /// Returns the number of records matched (0 or 1). A record whose fields
    /// already hold the same values still counts as matched.
    fn update_feedback(
        &self,
        message_id: &str,
        update: &FeedbackUpdate,
    ) -> impl Future<Output = Result<u64, StorageError>> + Send;

    /// All records for `message_id`, oldest first.
    fn find_by_message_id(
        &self,
        message_id: &str,
    ) -> impl Future<Output = Result<Vec<ConversationRecord>, StorageError>> + Send;

    /// Cheap connectivity probe.
    fn ping(&self) -> impl Future<Output = Result<(), StorageError>> + Send;
}

type RecordRow = (
    i64,
    String,
    String,
    Option<String>,
    String,
    String,
    String,
    String,
    String,
    String,
    Option<String>,
    Option<String>,
);

impl ConversationStore for SqliteStore {
    async fn insert(&self, doc: ConversationDocument) -> Result<(), StorageError> {
        let kind = doc.kind().as_str();
        let query = sqlx::query(
            "INSERT INTO conversations (kind, user_id, user_name, conversation_id, message_id, \
             question, answer, question_timestamp, answer_timestamp, feedback, log_timestamp) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        )
        .bind(kind);

        let query = match doc {
            ConversationDocument::Exchange(entry) => query
                .bind(entry.user_id)
                .bind(Some(entry.user_name))
                .bind(entry.conversation_id)
                .bind(entry.message_id)
                .bind(entry.question)
                .bind(entry.answer)
                .bind(timestamp::format(&entry.question_timestamp))
                .bind(timestamp::format(&entry.answer_timestamp))
                .bind(entry.feedback)
                .bind(Some(timestamp::format(&entry.log_timestamp))),
            ConversationDocument::FeedbackOnly(req) => query
                .bind(req.user_id)
                .bind(None::<String>)
                .bind(req.conversation_id)
                .bind(req.message_id)
                .bind(req.question)
                .bind(req.answer)
                .bind(timestamp::format(&req.question_timestamp))
                .bind(timestamp::format(&req.answer_timestamp))
                .bind(Some(req.feedback))
                .bind(None::<String>),
        };

        query.execute(&self.pool).await?;
        Ok(())
    }

    async fn update_feedback(
        &self,
        message_id: &str,
        update: &FeedbackUpdate,
    ) -> Result<u64, StorageError> {
        let result = sqlx::query(
            "UPDATE conversations \
             SET feedback = ?1, question_timestamp = ?2, answer_timestamp = ?3 \
             WHERE id = (SELECT id FROM conversations WHERE message_id = ?4 ORDER BY id ASC LIMIT 1)",
        )
        .bind(&update.feedback)
        .bind(timestamp::format(&update.question_timestamp))
        .bind(timestamp::format(&update.answer_timestamp))
        .bind(message_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn find_by_message_id(
        &self,
        message_id: &str,
    ) -> Result<Vec<ConversationRecord>, StorageError> {
        let rows: Vec<RecordRow> = sqlx::query_as(
            "SELECT id, kind, user_id, user_name, conversation_id, message_id, question, answer, \
             question_timestamp, answer_timestamp, feedback, log_timestamp \
             FROM conversations WHERE message_id = ?1 ORDER BY id ASC",
        )
        .bind(message_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(to_record).collect())
    }

    async fn ping(&self) -> Result<(), StorageError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

fn to_record(row: RecordRow) -> ConversationRecord {
    let (
        id,
        kind,
        user_id,
        user_name,
        conversation_id,
        message_id,
        question,
        answer,
        question_timestamp,
        answer_timestamp,
        feedback,
        log_timestamp,
    ) = row;
    ConversationRecord {
        id,
        kind: RecordKind::parse(&kind).unwrap_or_else(|| {
            tracing::warn!(id, raw = %kind, "unknown record kind; treating as exchange");
            RecordKind::Exchange
        }),
        user_id,
        user_name,
        conversation_id,
        message_id,
        question,
        answer,
        question_timestamp: parse_or_now(id, &question_timestamp),
        answer_timestamp: parse_or_now(id, &answer_timestamp),
        feedback,
        log_timestamp: log_timestamp.map(|raw| parse_or_now(id, &raw)),
    }
}

fn parse_or_now(id: i64, raw: &str) -> DateTime<Utc> {
    timestamp::parse(raw).unwrap_or_else(|| {
        tracing::warn!(id, raw = %raw, "failed to parse stored timestamp; using now");
        Utc::now()
    })
}

// ── Tests ──────────────────────────────────────────────────────────────────────
