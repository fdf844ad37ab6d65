//! Trait doubles shared by the service tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use chrono::{TimeZone, Utc};
use relay_types::{ChatRequest, FeedbackRequest, FeedbackUpdate, LogEntry};

use crate::entities::{ConversationDocument, ConversationRecord, ConversationStore, StorageError};
use crate::inference::{InferenceClient, ProviderError};

pub(crate) fn chat_request(message_id: &str) -> ChatRequest {
    ChatRequest {
        question: "What is X?".into(),
        user_id: "u1".into(),
        message_id: message_id.into(),
        user_name: "Sara".into(),
        conversation_id: "c1".into(),
        question_timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap(),
    }
}

pub(crate) fn feedback_request(message_id: &str, feedback: &str) -> FeedbackRequest {
    FeedbackRequest {
        question: "What is X?".into(),
        answer: "X is Y".into(),
        user_id: "u1".into(),
        message_id: message_id.into(),
        conversation_id: "c1".into(),
        feedback: feedback.into(),
        question_timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap(),
        answer_timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 4).unwrap(),
    }
}

/// What [`ScriptedInference`] does on every call.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Script {
    Answer(&'static str),
    /// Fails like an unreachable or erroring endpoint.
    Unavailable,
    /// Fails like an endpoint returning a body we cannot read.
    Malformed,
    Panic,
}

pub(crate) struct ScriptedInference {
    script: Script,
    calls: AtomicUsize,
    last_prompt: Mutex<Option<(String, String)>>,
}

impl ScriptedInference {
    pub(crate) fn new(script: Script) -> Self {
        Self {
            script,
            calls: AtomicUsize::new(0),
            last_prompt: Mutex::new(None),
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn last_prompt(&self) -> Option<(String, String)> {
        self.last_prompt.lock().unwrap().clone()
    }
}

impl InferenceClient for ScriptedInference {
    async fn infer(&self, instructions: &str, question: &str) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_prompt.lock().unwrap() = Some((instructions.to_owned(), question.to_owned()));
        match self.script {
            Script::Answer(text) => Ok(text.to_owned()),
            Script::Unavailable => Err(ProviderError::Status {
                status: 504,
                body: "gateway timeout".into(),
            }),
            Script::Malformed => Err(ProviderError::MalformedResponse("not json".into())),
            Script::Panic => panic!("scripted provider panic"),
        }
    }
}

/// In-memory store that records every document and can be told to fail.
#[derive(Default)]
pub(crate) struct RecordingStore {
    docs: Mutex<Vec<ConversationDocument>>,
    insert_attempts: AtomicUsize,
    fail_inserts: bool,
    fail_updates: bool,
}

impl RecordingStore {
    /// Every write fails.
    pub(crate) fn failing() -> Self {
        Self {
            fail_inserts: true,
            fail_updates: true,
            ..Self::default()
        }
    }

    /// Updates fail, inserts succeed.
    pub(crate) fn failing_updates() -> Self {
        Self {
            fail_updates: true,
            ..Self::default()
        }
    }

    pub(crate) fn with(docs: Vec<ConversationDocument>) -> Self {
        Self {
            docs: Mutex::new(docs),
            ..Self::default()
        }
    }

    pub(crate) fn docs(&self) -> Vec<ConversationDocument> {
        self.docs.lock().unwrap().clone()
    }

    pub(crate) fn exchanges(&self) -> Vec<LogEntry> {
        self.docs()
            .into_iter()
            .filter_map(|doc| match doc {
                ConversationDocument::Exchange(entry) => Some(entry),
                ConversationDocument::FeedbackOnly(_) => None,
            })
            .collect()
    }

    pub(crate) fn insert_attempts(&self) -> usize {
        self.insert_attempts.load(Ordering::SeqCst)
    }
}

/// Row view of a stored document; `id` is its 1-based insertion position.
fn to_record(id: i64, doc: ConversationDocument) -> ConversationRecord {
    let kind = doc.kind();
    match doc {
        ConversationDocument::Exchange(entry) => ConversationRecord {
            id,
            kind,
            user_id: entry.user_id,
            user_name: Some(entry.user_name),
            conversation_id: entry.conversation_id,
            message_id: entry.message_id,
            question: entry.question,
            answer: entry.answer,
            question_timestamp: entry.question_timestamp,
            answer_timestamp: entry.answer_timestamp,
            feedback: entry.feedback,
            log_timestamp: Some(entry.log_timestamp),
        },
        ConversationDocument::FeedbackOnly(req) => ConversationRecord {
            id,
            kind,
            user_id: req.user_id,
            user_name: None,
            conversation_id: req.conversation_id,
            message_id: req.message_id,
            question: req.question,
            answer: req.answer,
            question_timestamp: req.question_timestamp,
            answer_timestamp: req.answer_timestamp,
            feedback: Some(req.feedback),
            log_timestamp: None,
        },
    }
}

fn unavailable() -> StorageError {
    StorageError::Database(sqlx::Error::PoolClosed)
}

impl ConversationStore for RecordingStore {
    async fn insert(&self, doc: ConversationDocument) -> Result<(), StorageError> {
        self.insert_attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail_inserts {
            return Err(unavailable());
        }
        self.docs.lock().unwrap().push(doc);
        Ok(())
    }

    async fn update_feedback(
        &self,
        message_id: &str,
        update: &FeedbackUpdate,
    ) -> Result<u64, StorageError> {
        if self.fail_updates {
            return Err(unavailable());
        }
        let mut docs = self.docs.lock().unwrap();
        let target = docs.iter_mut().find(|doc| doc.message_id() == message_id);
        match target {
            Some(ConversationDocument::Exchange(entry)) => {
                entry.feedback = Some(update.feedback.clone());
                entry.question_timestamp = update.question_timestamp;
                entry.answer_timestamp = update.answer_timestamp;
                Ok(1)
            }
            Some(ConversationDocument::FeedbackOnly(req)) => {
                req.feedback = update.feedback.clone();
                req.question_timestamp = update.question_timestamp;
                req.answer_timestamp = update.answer_timestamp;
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn find_by_message_id(
        &self,
        message_id: &str,
    ) -> Result<Vec<ConversationRecord>, StorageError> {
        Ok(self
            .docs()
            .into_iter()
            .zip(1..)
            .filter(|(doc, _)| doc.message_id() == message_id)
            .map(|(doc, id)| to_record(id, doc))
            .collect())
    }

    async fn ping(&self) -> Result<(), StorageError> {
        Ok(())
    }
}
