//! Axum router construction.
//!
//! [`build`] assembles the complete application router:
//! - Middleware layers (CORS, per-request trace-ID injection)
//! - `POST /chat` and `POST /feedback`
//! - Health route
//! - Optional OpenAPI document (disable with `RELAY_ENABLE_OPENAPI=false`)

mod chat;
pub mod doc;
mod feedback;
mod health;

use std::sync::Arc;

use axum::{middleware, Router};
use tower::ServiceBuilder;

use crate::middleware::{cors, trace};
use crate::state::AppState;

/// Build the complete Axum [`Router`] for the application.
pub fn build(state: Arc<AppState>) -> Router {
    let mut app = Router::new()
        .merge(health::router())
        .merge(chat::router())
        .merge(feedback::router());

    if state.config.enable_openapi {
        app = app.merge(doc::router());
    }

    app.layer(
        // Outermost layers execute first on the way in.
        ServiceBuilder::new()
            .layer(middleware::from_fn(trace::trace_middleware))
            .layer(cors::cors_layer(&state.config)),
    )
    .with_state(state)
}
