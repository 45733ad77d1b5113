//! Prediction result data structures

use serde::{Deserialize, Serialize};

/// Structural classification of the battery image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Label {
    Bulging,
    Regular,
}

impl Label {
    /// Determine the label from a raw score and the decision threshold.
    ///
    /// A score exactly at the threshold classifies as regular.
    pub fn from_score(score: f32, threshold: f32) -> Self {
        if score > threshold {
            Label::Bulging
        } else {
            Label::Regular
        }
    }
}

/// Risk tier classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskTier {
    Low,
    Medium,
    High,
}

impl RiskTier {
    /// Determine the risk tier from a raw score and the band thresholds.
    ///
    /// The two conditions overlap for some scores; HIGH is checked first and
    /// wins, which makes the effective partition HIGH on (0.8,1]∪[0,0.2),
    /// MEDIUM on (0.6,0.8]∪[0.2,0.4) and LOW on [0.4,0.6] with the default
    /// bands. The evaluation order is part of the contract.
    pub fn from_score(score: f32, bands: &RiskBands) -> Self {
        if score > bands.high_upper || score < bands.high_lower {
            RiskTier::High
        } else if score > bands.medium_upper || score < bands.medium_lower {
            RiskTier::Medium
        } else {
            RiskTier::Low
        }
    }
}

/// Configurable risk band thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskBands {
    pub high_upper: f32,
    pub high_lower: f32,
    pub medium_upper: f32,
    pub medium_lower: f32,
}

impl Default for RiskBands {
    fn default() -> Self {
        Self {
            high_upper: 0.8,
            high_lower: 0.2,
            medium_upper: 0.6,
            medium_lower: 0.4,
        }
    }
}

/// Classification result for one submitted image.
///
/// Field names match the wire format consumed by the frontend; the decision
/// itself is always computed from the unrounded score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Predicted structural state
    pub prediction: Label,

    /// Confidence in the prediction, as a percentage rounded to 1 decimal
    pub confidence: f32,

    /// Raw model score rounded to 4 decimals
    #[serde(rename = "rawScore")]
    pub raw_score: f32,

    /// Coarse risk bucket derived from the score
    pub risk: RiskTier,
}

/// Health report for the serving layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub model_loaded: bool,
}

impl HealthStatus {
    pub fn new(model_loaded: bool) -> Self {
        Self {
            status: "ok".to_string(),
            model_loaded,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_from_score() {
        assert_eq!(Label::from_score(0.51, 0.5), Label::Bulging);
        assert_eq!(Label::from_score(0.5, 0.5), Label::Regular);
        assert_eq!(Label::from_score(0.49, 0.5), Label::Regular);
    }

    #[test]
    fn test_risk_tier_boundary_table() {
        let bands = RiskBands::default();

        let expected = [
            (0.1, RiskTier::High),
            (0.2, RiskTier::Medium),
            (0.3, RiskTier::Medium),
            (0.4, RiskTier::Low),
            (0.5, RiskTier::Low),
            (0.6, RiskTier::Low),
            (0.65, RiskTier::Medium),
            (0.8, RiskTier::Medium),
            (0.85, RiskTier::High),
            (0.95, RiskTier::High),
        ];

        for (score, tier) in expected {
            assert_eq!(
                RiskTier::from_score(score, &bands),
                tier,
                "score {} should map to {:?}",
                score,
                tier
            );
        }
    }

    #[test]
    fn test_risk_tier_extremes() {
        let bands = RiskBands::default();
        assert_eq!(RiskTier::from_score(0.0, &bands), RiskTier::High);
        assert_eq!(RiskTier::from_score(1.0, &bands), RiskTier::High);
    }

    #[test]
    fn test_prediction_result_serialization() {
        let result = PredictionResult {
            prediction: Label::Bulging,
            confidence: 90.0,
            raw_score: 0.9,
            risk: RiskTier::High,
        };

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["prediction"], "BULGING");
        assert_eq!(json["confidence"], 90.0);
        assert!((json["rawScore"].as_f64().unwrap() - 0.9).abs() < 1e-6);
        assert_eq!(json["risk"], "HIGH");
    }

    #[test]
    fn test_health_status_serialization() {
        let health = HealthStatus::new(false);
        let json = serde_json::to_value(&health).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["model_loaded"], false);
    }
}
