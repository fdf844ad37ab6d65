//! Per-request trace id, span and access logging.
//!
//! Request bodies are buffered so small JSON bodies can be logged. Response
//! bodies are left untouched because `/chat` streams its answer.

use std::time::Instant;

use axum::body::{Body, Bytes};
use axum::extract::Request;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

pub static X_TRACE_ID: &str = "x-trace-id";

/// Upper bound on a buffered request body.
const MAX_REQUEST_BODY_BYTES: usize = 2 * 1024 * 1024;

/// JSON bodies below this size are logged in full.
const MAX_LOGGED_BODY_BYTES: usize = 1024;

pub async fn trace_middleware(req: Request<Body>, next: Next) -> Response {
    let start_time = Instant::now();

    // Reuse the caller's trace id when it is a valid UUID.
    let trace_id = req
        .headers()
        .get(X_TRACE_ID)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| Uuid::parse_str(s).ok())
        .unwrap_or_else(Uuid::new_v4);

    let span = info_span!(
        "http_request",
        trace_id = %trace_id,
        method = %req.method(),
        path = %req.uri().path(),
    );

    async move {
        info!("→ request started");
        let (mut parts, body) = req.into_parts();

        let req_bytes = match axum::body::to_bytes(body, MAX_REQUEST_BODY_BYTES).await {
            Ok(bytes) => bytes,
            Err(e) => {
                info!(error = %e, "request body rejected");
                return (StatusCode::PAYLOAD_TOO_LARGE, "request body too large").into_response();
            }
        };
        log_body(&parts.headers, &req_bytes);

        let trace_header = HeaderValue::from_str(&trace_id.to_string()).ok();
        if let Some(value) = &trace_header {
            parts.headers.insert(X_TRACE_ID, value.clone());
        }

        let mut response = next.run(Request::from_parts(parts, Body::from(req_bytes))).await;

        if let Some(value) = trace_header {
            response.headers_mut().insert(X_TRACE_ID, value);
        }

        info!(
            status = response.status().as_u16(),
            latency_ms = start_time.elapsed().as_millis(),
            "← response headers sent"
        );

        response
    }
    .instrument(span)
    .await
}

fn log_body(headers: &HeaderMap, bytes: &Bytes) {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    if content_type.contains("application/json") && bytes.len() < MAX_LOGGED_BODY_BYTES {
        if let Ok(text) = std::str::from_utf8(bytes) {
            info!(body = %text, "request body");
        }
    } else if !bytes.is_empty() {
        info!(content_type, size = bytes.len(), "request body skipped");
    }
}
