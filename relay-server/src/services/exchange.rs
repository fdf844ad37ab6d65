//! Question → answer → log.
//!
//! [`ExchangePipeline::handle`] validates the request, then runs the exchange
//! on its own task so neither the provider call nor the log write is
//! cancelled when the caller disconnects. The caller reads the answer from a
//! lazy stream of text chunks. The stream ends only after the log write has
//! finished, whether or not it succeeded.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use chrono::Utc;
use futures::{FutureExt, Stream};
use relay_types::{ChatRequest, LogEntry, ValidationError};
use tokio::sync::mpsc;
use tracing::{debug, error, info, info_span, warn, Instrument};

use crate::entities::{ConversationDocument, ConversationStore};
use crate::inference::InferenceClient;

/// Sent instead of an answer when the provider cannot be reached or rejects
/// the call.
pub const TRANSPORT_FALLBACK: &str = "I'm sorry, I'm having trouble accessing the necessary information right now. Please try again later.";

/// Sent instead of an answer on any other failure.
pub const TECHNICAL_FALLBACK: &str =
    "I apologize, but I'm experiencing technical difficulties. Please try again later.";

const ANSWER_CHANNEL_CAPACITY: usize = 16;

/// Answers chat questions and logs every exchange exactly once.
pub struct ExchangePipeline<I, S> {
    inference: Arc<I>,
    store: Arc<S>,
    instructions: Arc<str>,
}

impl<I, S> std::fmt::Debug for ExchangePipeline<I, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExchangePipeline")
            .field("instructions_len", &self.instructions.len())
            .finish_non_exhaustive()
    }
}

impl<I: InferenceClient, S: ConversationStore> ExchangePipeline<I, S> {
    pub fn new(inference: Arc<I>, store: Arc<S>, instructions: impl Into<Arc<str>>) -> Self {
        Self {
            inference,
            store,
            instructions: instructions.into(),
        }
    }

    /// Start answering `request`.
    ///
    /// Fails only on validation. Every valid request yields a stream with at
    /// least one chunk: the provider's answer, or a fallback string.
    pub fn handle(
        &self,
        request: ChatRequest,
    ) -> Result<impl Stream<Item = String> + Send + use<I, S>, ValidationError> {
        relay_types::check(&request)?;

        let (tx, rx) = mpsc::channel::<String>(ANSWER_CHANNEL_CAPACITY);
        let span = info_span!(
            "exchange",
            message_id = %request.message_id,
            conversation_id = %request.conversation_id,
        );
        tokio::spawn(
            run_exchange(
                Arc::clone(&self.inference),
                Arc::clone(&self.store),
                Arc::clone(&self.instructions),
                request,
                tx,
            )
            .instrument(span),
        );

        Ok(answer_stream(rx))
    }
}

/// Yields chunks in send order and ends once every sender is dropped.
fn answer_stream(rx: mpsc::Receiver<String>) -> impl Stream<Item = String> + Send {
    futures::stream::unfold(rx, |mut rx| async move {
        rx.recv().await.map(|chunk| (chunk, rx))
    })
}

async fn run_exchange<I: InferenceClient, S: ConversationStore>(
    inference: Arc<I>,
    store: Arc<S>,
    instructions: Arc<str>,
    request: ChatRequest,
    tx: mpsc::Sender<String>,
) {
    let answer = answer_question(inference.as_ref(), &instructions, &request.question).await;

    if tx.send(answer.clone()).await.is_err() {
        debug!("caller went away before the answer was delivered");
    }

    let entry = LogEntry::for_exchange(&request, answer, Utc::now());
    match store.insert(ConversationDocument::Exchange(entry)).await {
        Ok(()) => info!("exchange logged"),
        Err(e) => error!(error = %e, "failed to persist exchange log"),
    }

    // Closing the channel is what ends the caller's stream.
    drop(tx);
}

/// The provider's answer, or the fallback for its failure category.
async fn answer_question<I: InferenceClient>(
    inference: &I,
    instructions: &str,
    question: &str,
) -> String {
    match AssertUnwindSafe(inference.infer(instructions, question))
        .catch_unwind()
        .await
    {
        Ok(Ok(answer)) => answer,
        Ok(Err(e)) if e.is_transport() => {
            warn!(error = %e, "inference provider unavailable; sending fallback");
            TRANSPORT_FALLBACK.to_owned()
        }
        Ok(Err(e)) => {
            error!(error = %e, "unexpected inference failure; sending fallback");
            TECHNICAL_FALLBACK.to_owned()
        }
        Err(_) => {
            error!("inference call panicked; sending fallback");
            TECHNICAL_FALLBACK.to_owned()
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
