//! Battery Bulge Detection Pipeline
//!
//! Classifies battery images as structurally bulging (defective) or regular
//! using a pretrained ONNX model: deterministic image normalization, a
//! load-once model handle, and a score-to-decision mapping with discretized
//! risk tiers.

pub mod config;
pub mod error;
pub mod metrics;
pub mod models;
pub mod preprocess;
pub mod server;
pub mod types;

pub use config::AppConfig;
pub use error::{ModelError, PipelineError};
pub use models::{InferencePipeline, ModelHandle, Scorer};
pub use preprocess::{ImagePreprocessor, NormalizedTensor};
pub use types::{HealthStatus, Label, PredictionResult, RiskTier};
