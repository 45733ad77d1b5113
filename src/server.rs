//! Thin HTTP edge around the inference pipeline.
//!
//! Carries no classification logic: bytes in, JSON out. Failures from the
//! pipeline are serialized as `{"error": "..."}` with HTTP 200, matching the
//! contract the frontend consumes.

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::metrics::InferenceMetrics;
use crate::models::InferencePipeline;

/// Maximum accepted upload size (16 MiB)
const MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

/// Shared state for the HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<InferencePipeline>,
    pub metrics: Arc<InferenceMetrics>,
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/predict", post(predict))
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn predict(State(state): State<AppState>, mut multipart: Multipart) -> Json<Value> {
    let start = Instant::now();

    let mut image_bytes = None;
    loop {
        match multipart.next_field().await {
            Ok(Some(field)) => {
                if field.name() == Some("image") {
                    match field.bytes().await {
                        Ok(bytes) => image_bytes = Some(bytes),
                        Err(e) => {
                            state.metrics.record_failure();
                            return Json(json!({ "error": format!("failed to read upload: {}", e) }));
                        }
                    }
                    break;
                }
            }
            Ok(None) => break,
            Err(e) => {
                state.metrics.record_failure();
                return Json(json!({ "error": format!("invalid multipart body: {}", e) }));
            }
        }
    }

    let Some(bytes) = image_bytes else {
        state.metrics.record_failure();
        return Json(json!({ "error": "missing 'image' field in upload" }));
    };

    match state.pipeline.predict(&bytes) {
        Ok(result) => {
            state
                .metrics
                .record_prediction(start.elapsed(), result.raw_score, result.risk);
            Json(json!(result))
        }
        Err(e) => {
            warn!(error = %e, "Prediction failed");
            state.metrics.record_failure();
            Json(json!({ "error": e.to_string() }))
        }
    }
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!(state.pipeline.health()))
}
