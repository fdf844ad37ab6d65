//! `POST /feedback`: attach a rating to a previous answer.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use relay_types::FeedbackRequest;
use serde::Serialize;
use tracing::info;
use utoipa::{OpenApi, ToSchema};

use crate::error::ServerError;
use crate::services::FeedbackOutcome;
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(paths(feedback), components(schemas(FeedbackRequest, FeedbackResponse)))]
pub struct FeedbackApi;

#[derive(Debug, Serialize, ToSchema)]
pub struct FeedbackResponse {
    pub message: &'static str,
    /// `"updated"` or `"inserted"`.
    #[schema(value_type = String)]
    pub outcome: FeedbackOutcome,
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/feedback", post(feedback))
}

#[utoipa::path(
    post,
    path = "/feedback",
    tag = "feedback",
    request_body = FeedbackRequest,
    responses(
        (status = 200, description = "Feedback recorded", body = FeedbackResponse),
        (status = 400, description = "Malformed or incomplete request"),
        (status = 500, description = "Feedback could not be stored"),
    )
)]
pub async fn feedback(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<FeedbackRequest>, JsonRejection>,
) -> Result<Json<FeedbackResponse>, ServerError> {
    let Json(req) = payload?;
    info!(
        message_id = %req.message_id,
        conversation_id = %req.conversation_id,
        feedback = %req.feedback,
        "feedback received"
    );

    let outcome = state.reconciler.record_feedback(req).await?;
    Ok(Json(FeedbackResponse {
        message: "Feedback recorded successfully",
        outcome,
    }))
}
