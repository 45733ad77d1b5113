//! Type definitions for the bulge detection pipeline

pub mod prediction;

pub use prediction::{HealthStatus, Label, PredictionResult, RiskBands, RiskTier};
