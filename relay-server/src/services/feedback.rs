//! Attach user feedback to a logged exchange.
//!
//! This is update-then-insert, not an atomic upsert. If feedback for a
//! message races the exchange log write for the same message, the store can
//! end up with both an exchange record and a feedback-only record for it.

use std::sync::Arc;

use relay_types::{FeedbackRequest, FeedbackUpdate, ValidationError};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::entities::{ConversationDocument, ConversationStore, StorageError};

/// How a feedback submission ended up in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackOutcome {
    /// An existing log entry now carries the feedback.
    Updated,
    /// No log entry was found; a feedback-only record was written.
    Inserted,
}

#[derive(Debug, Error)]
pub enum FeedbackError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Neither the update nor the fallback insert reached the store.
    #[error("feedback could not be stored: {0}")]
    Storage(#[source] StorageError),
}

pub struct FeedbackReconciler<S> {
    store: Arc<S>,
}

impl<S> std::fmt::Debug for FeedbackReconciler<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeedbackReconciler").finish_non_exhaustive()
    }
}

impl<S: ConversationStore> FeedbackReconciler<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub async fn record_feedback(
        &self,
        request: FeedbackRequest,
    ) -> Result<FeedbackOutcome, FeedbackError> {
        relay_types::check(&request)?;

        let update = FeedbackUpdate::from(&request);
        match self.store.update_feedback(&request.message_id, &update).await {
            Ok(matched) if matched > 0 => {
                info!(message_id = %request.message_id, "feedback attached to log entry");
                return Ok(FeedbackOutcome::Updated);
            }
            Ok(_) => warn!(
                message_id = %request.message_id,
                "no log entry for message; inserting feedback-only record"
            ),
            Err(e) => warn!(
                message_id = %request.message_id,
                error = %e,
                "feedback update failed; inserting feedback-only record"
            ),
        }

        let message_id = request.message_id.clone();
        self.store
            .insert(ConversationDocument::FeedbackOnly(request))
            .await
            .map_err(|e| {
                error!(message_id = %message_id, error = %e, "failed to store feedback");
                FeedbackError::Storage(e)
            })?;
        Ok(FeedbackOutcome::Inserted)
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test {
    use chrono::Utc;
    use relay_types::LogEntry;
    use tracing_test::traced_test;

    use super::*;
    use crate::entities::RecordKind;
    use crate::services::testing::{chat_request, feedback_request, RecordingStore};

    fn logged(message_id: &str) -> ConversationDocument {
        ConversationDocument::Exchange(LogEntry::for_exchange(
            &chat_request(message_id),
            "X is Y",
            Utc::now(),
        ))
    }

    #[tokio::test]
    async fn existing_message_is_updated_in_place() {
        let store = Arc::new(RecordingStore::with(vec![logged("m1")]));
        let reconciler = FeedbackReconciler::new(Arc::clone(&store));

        let outcome = reconciler
            .record_feedback(feedback_request("m1", "helpful"))
            .await
            .unwrap();
        assert_eq!(outcome, FeedbackOutcome::Updated);

        let entries = store.exchanges();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].feedback.as_deref(), Some("helpful"));
        assert_eq!(store.insert_attempts(), 0);
    }

    #[tokio::test]
    async fn repeated_feedback_does_not_duplicate() {
        let store = Arc::new(RecordingStore::with(vec![logged("m1")]));
        let reconciler = FeedbackReconciler::new(Arc::clone(&store));

        for _ in 0..2 {
            let outcome = reconciler
                .record_feedback(feedback_request("m1", "helpful"))
                .await
                .unwrap();
            assert_eq!(outcome, FeedbackOutcome::Updated);
        }
        assert_eq!(store.docs().len(), 1);
        assert_eq!(store.exchanges()[0].feedback.as_deref(), Some("helpful"));
    }

    #[tokio::test]
    #[traced_test]
    async fn unknown_message_inserts_one_feedback_only_record() {
        let store = Arc::new(RecordingStore::default());
        let reconciler = FeedbackReconciler::new(Arc::clone(&store));

        let request = feedback_request("m404", "helpful");
        let outcome = reconciler.record_feedback(request.clone()).await.unwrap();
        assert_eq!(outcome, FeedbackOutcome::Inserted);
        assert_eq!(store.docs(), vec![ConversationDocument::FeedbackOnly(request)]);
        assert!(logs_contain("inserting feedback-only record"));

        let records = store.find_by_message_id("m404").await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].kind, RecordKind::FeedbackOnly);
        assert_eq!(records[0].user_name, None);
        assert!(store.find_by_message_id("m1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn failed_update_falls_back_to_insert() {
        let store = Arc::new(RecordingStore::failing_updates());
        let reconciler = FeedbackReconciler::new(Arc::clone(&store));

        let outcome = reconciler
            .record_feedback(feedback_request("m1", "helpful"))
            .await
            .unwrap();
        assert_eq!(outcome, FeedbackOutcome::Inserted);
        assert_eq!(store.docs().len(), 1);
    }

    #[tokio::test]
    async fn storage_error_only_when_both_writes_fail() {
        let store = Arc::new(RecordingStore::failing());
        let reconciler = FeedbackReconciler::new(Arc::clone(&store));

        let err = reconciler
            .record_feedback(feedback_request("m1", "helpful"))
            .await
            .unwrap_err();
        assert!(matches!(err, FeedbackError::Storage(_)));
        assert_eq!(store.insert_attempts(), 1);
    }

    #[tokio::test]
    async fn empty_rating_is_stored() {
        let store = Arc::new(RecordingStore::with(vec![logged("m1")]));
        let reconciler = FeedbackReconciler::new(Arc::clone(&store));

        let outcome = reconciler
            .record_feedback(feedback_request("m1", ""))
            .await
            .unwrap();
        assert_eq!(outcome, FeedbackOutcome::Updated);

        let records = store.find_by_message_id("m1").await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].kind, RecordKind::Exchange);
        assert_eq!(records[0].feedback.as_deref(), Some(""));
    }

    #[tokio::test]
    async fn blank_message_id_is_rejected_before_touching_the_store() {
        let store = Arc::new(RecordingStore::failing());
        let reconciler = FeedbackReconciler::new(Arc::clone(&store));

        let err = reconciler
            .record_feedback(feedback_request(" ", "helpful"))
            .await
            .unwrap_err();
        assert!(matches!(err, FeedbackError::Validation(_)));
        assert_eq!(store.insert_attempts(), 0);
    }
}
