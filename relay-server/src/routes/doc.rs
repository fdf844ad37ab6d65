//! OpenAPI document assembled from the per-route definitions.

use std::sync::Arc;

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(info(title = "relay-server", description = "Chat gateway: questions, answers, feedback"))]
pub struct ApiDoc;

pub fn get_docs() -> utoipa::openapi::OpenApi {
    let mut doc = ApiDoc::openapi();
    doc.merge(super::chat::ChatApi::openapi());
    doc.merge(super::feedback::FeedbackApi::openapi());
    doc.merge(super::health::HealthApi::openapi());
    doc
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route(
        "/api-docs/openapi.json",
        get(|| async { Json(get_docs()) }),
    )
}
