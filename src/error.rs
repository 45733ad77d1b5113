//! Error taxonomy for the bulge detection pipeline

use thiserror::Error;

/// Errors raised by the model handle
#[derive(Debug, Error)]
pub enum ModelError {
    /// The model artifact could not be loaded at startup
    #[error("model load failed: {0}")]
    Load(String),

    /// The handle is disabled because the artifact never loaded
    #[error("Model not loaded")]
    NotLoaded,

    /// Input tensor does not match the shape the model was trained on
    #[error("input tensor has {actual} values, expected {expected}")]
    BadShape { expected: usize, actual: usize },

    /// The forward pass itself failed
    #[error("inference failed: {0}")]
    Inference(String),
}

/// Errors surfaced by the prediction entry point.
///
/// Every variant is terminal for one request only; the `Display` string is
/// what the serving layer puts into the `{"error": ...}` response body.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Input bytes are not a decodable image
    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    /// Model unavailable or forward pass failure
    #[error("{0}")]
    Model(#[from] ModelError),

    /// Anything unexpected, reported with a human-readable message
    #[error("internal error: {0}")]
    Internal(String),
}
