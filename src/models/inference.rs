//! Inference pipeline: raw image bytes in, classification result out

use std::sync::Arc;
use tracing::debug;

use crate::config::DecisionConfig;
use crate::error::{ModelError, PipelineError};
use crate::models::Scorer;
use crate::preprocess::ImagePreprocessor;
use crate::types::{HealthStatus, Label, PredictionResult, RiskTier};

/// Round to a fixed number of decimal places
fn round_to(value: f32, decimals: i32) -> f32 {
    let factor = 10f32.powi(decimals);
    (value * factor).round() / factor
}

/// End-to-end inference pipeline for battery images.
///
/// Owns the preprocessing stage and a shared, read-only scorer. Each call to
/// [`predict`](Self::predict) is independent; failures are returned as
/// values and never escape the pipeline boundary.
pub struct InferencePipeline {
    preprocessor: ImagePreprocessor,
    scorer: Arc<dyn Scorer>,
    decision: DecisionConfig,
}

impl InferencePipeline {
    /// Create a pipeline around a scorer and decision configuration.
    pub fn new(scorer: Arc<dyn Scorer>, decision: DecisionConfig) -> Self {
        Self {
            preprocessor: ImagePreprocessor::new(),
            scorer,
            decision,
        }
    }

    /// Classify one uploaded image.
    ///
    /// Steps: short-circuit if the model never loaded, decode and normalize
    /// the bytes, run the forward pass, map the raw score to the user-facing
    /// result. The decision is always computed from the unrounded score.
    pub fn predict(&self, image_bytes: &[u8]) -> Result<PredictionResult, PipelineError> {
        if !self.scorer.is_loaded() {
            return Err(ModelError::NotLoaded.into());
        }

        let tensor = self.preprocessor.prepare(image_bytes)?;
        let score = self.scorer.score(&tensor)?;

        let result = self.decide(score);
        debug!(
            score = score,
            prediction = ?result.prediction,
            risk = ?result.risk,
            "Inference complete"
        );

        Ok(result)
    }

    /// Map a raw score to the user-facing prediction result.
    fn decide(&self, score: f32) -> PredictionResult {
        let prediction = Label::from_score(score, self.decision.threshold);

        // Confidence is the probability mass behind the chosen label; scores
        // outside [0, 1] pass through unclamped.
        let confidence = match prediction {
            Label::Bulging => score,
            Label::Regular => 1.0 - score,
        };

        PredictionResult {
            prediction,
            confidence: round_to(confidence * 100.0, 1),
            raw_score: round_to(score, 4),
            risk: RiskTier::from_score(score, &self.decision.risk_bands),
        }
    }

    /// Report whether the pipeline can serve predictions.
    pub fn health(&self) -> HealthStatus {
        HealthStatus::new(self.scorer.is_loaded())
    }
}
