//! ML model inference components

pub mod inference;
pub mod loader;

use crate::error::ModelError;
use crate::preprocess::NormalizedTensor;

pub use inference::InferencePipeline;
pub use loader::ModelHandle;

/// Source of raw scores for the pipeline.
///
/// Implemented by [`ModelHandle`]; test scorers substitute a fixed forward
/// pass. Implementations must be safe for concurrent read-only invocation.
pub trait Scorer: Send + Sync {
    /// Run the forward pass on one normalized image
    fn score(&self, tensor: &NormalizedTensor) -> Result<f32, ModelError>;

    /// Whether the underlying model is available
    fn is_loaded(&self) -> bool;
}
