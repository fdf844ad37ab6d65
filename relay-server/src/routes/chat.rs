//! `POST /chat`: answer a question as a streamed plain-text body.

use std::convert::Infallible;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use futures::StreamExt;
use relay_types::ChatRequest;
use tracing::info;
use utoipa::OpenApi;

use crate::error::ServerError;
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(paths(chat), components(schemas(ChatRequest)))]
pub struct ChatApi;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/chat", post(chat))
}

/// Answer a single question.
///
/// The body is streamed as it is produced. Provider failures still answer
/// 200 with an apology text.
#[utoipa::path(
    post,
    path = "/chat",
    tag = "chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Answer text (possibly a fallback)", content_type = "text/plain", body = String),
        (status = 400, description = "Malformed or incomplete request"),
    )
)]
pub async fn chat(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Response, ServerError> {
    let Json(req) = payload?;
    info!(
        message_id = %req.message_id,
        conversation_id = %req.conversation_id,
        user_id = %req.user_id,
        question_len = req.question.len(),
        "chat request received"
    );

    let answer = state.pipeline.handle(req)?;
    let body = Body::from_stream(answer.map(Ok::<_, Infallible>));

    Ok(([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], body).into_response())
}
