//! ONNX model handle: load-once session with a disabled-state sentinel

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use ort::session::{builder::GraphOptimizationLevel, Session};
use std::path::Path;
use std::sync::Mutex;
use tracing::{error, info};

use crate::config::ModelConfig;
use crate::error::ModelError;
use crate::models::Scorer;
use crate::preprocess::{
    NormalizedTensor, INPUT_CHANNELS, INPUT_HEIGHT, INPUT_WIDTH, TENSOR_ELEMENTS,
};

/// Metadata recorded when the artifact loads
#[derive(Debug, Clone)]
pub struct ModelMetadata {
    /// Path the artifact was loaded from
    pub model_path: String,
    /// Input name for the model
    pub input_name: String,
    /// Output name for the score
    pub output_name: String,
    /// Load timestamp
    pub loaded_at: DateTime<Utc>,
}

/// Handle to the pretrained bulge classifier.
///
/// Constructed once at process start. If the artifact fails to load the
/// handle is permanently disabled: the failure is logged once and every
/// inference call returns [`ModelError::NotLoaded`]. The session is guarded
/// by a mutex so concurrent requests serialize the forward pass.
pub struct ModelHandle {
    session: Option<Mutex<Session>>,
    metadata: Option<ModelMetadata>,
}

impl ModelHandle {
    /// Load the model artifact from the configured path.
    ///
    /// Never fails: a load error produces a disabled handle and the process
    /// keeps serving in degraded mode.
    pub fn load(config: &ModelConfig) -> Self {
        match Self::try_load(&config.path, config.onnx_threads) {
            Ok(handle) => handle,
            Err(e) => {
                error!(path = %config.path, error = %e, "Failed to load model, serving degraded");
                Self::disabled()
            }
        }
    }

    /// A handle with no session; every inference call fails
    pub fn disabled() -> Self {
        Self {
            session: None,
            metadata: None,
        }
    }

    fn try_load(path: &str, onnx_threads: usize) -> Result<Self> {
        let path = Path::new(path);
        if !path.exists() {
            anyhow::bail!("model artifact not found at {}", path.display());
        }

        ort::init().commit()?;

        info!(path = %path.display(), threads = onnx_threads, "Loading ONNX model");

        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(onnx_threads)?
            .commit_from_file(path)
            .context(format!("Failed to load model from {:?}", path))?;

        let input_name = session
            .inputs
            .first()
            .map(|i| i.name.clone())
            .unwrap_or_else(|| "input_1".to_string());

        let output_name = session
            .outputs
            .first()
            .map(|o| o.name.clone())
            .unwrap_or_else(|| "output_1".to_string());

        let metadata = ModelMetadata {
            model_path: path.display().to_string(),
            input_name,
            output_name,
            loaded_at: Utc::now(),
        };

        info!(
            input = %metadata.input_name,
            output = %metadata.output_name,
            "Model loaded successfully"
        );

        Ok(Self {
            session: Some(Mutex::new(session)),
            metadata: Some(metadata),
        })
    }

    /// Get metadata for the loaded artifact, if any
    pub fn metadata(&self) -> Option<&ModelMetadata> {
        self.metadata.as_ref()
    }

    /// Run the forward pass on one normalized image.
    ///
    /// The tensor is wrapped in a synthetic batch axis of size 1 and the
    /// first scalar of the output is returned. The score is passed through
    /// numerically even if it falls outside [0, 1].
    pub fn infer(&self, tensor: &NormalizedTensor) -> Result<f32, ModelError> {
        use ort::value::Tensor;

        let session = self.session.as_ref().ok_or(ModelError::NotLoaded)?;

        if tensor.len() != TENSOR_ELEMENTS {
            return Err(ModelError::BadShape {
                expected: TENSOR_ELEMENTS,
                actual: tensor.len(),
            });
        }

        let shape = vec![
            1_i64,
            INPUT_HEIGHT as i64,
            INPUT_WIDTH as i64,
            INPUT_CHANNELS as i64,
        ];
        let input_tensor = Tensor::from_array((shape, tensor.data().to_vec()))
            .map_err(|e| ModelError::Inference(format!("failed to create input tensor: {}", e)))?;

        let (input_name, output_name) = self
            .metadata
            .as_ref()
            .map(|m| (m.input_name.clone(), m.output_name.clone()))
            .ok_or(ModelError::NotLoaded)?;

        let mut session = session
            .lock()
            .map_err(|e| ModelError::Inference(format!("session lock poisoned: {}", e)))?;

        let outputs = session
            .run(ort::inputs![input_name.as_str() => input_tensor])
            .map_err(|e| ModelError::Inference(e.to_string()))?;

        let output = outputs
            .get(&output_name)
            .ok_or_else(|| ModelError::Inference("model produced no outputs".to_string()))?;

        let (_, data) = output
            .try_extract_tensor::<f32>()
            .map_err(|e| ModelError::Inference(format!("failed to extract output: {}", e)))?;

        data.first()
            .copied()
            .ok_or_else(|| ModelError::Inference("model output tensor is empty".to_string()))
    }

    /// Whether the artifact loaded and inference is available
    pub fn is_loaded(&self) -> bool {
        self.session.is_some()
    }
}

impl Scorer for ModelHandle {
    fn score(&self, tensor: &NormalizedTensor) -> Result<f32, ModelError> {
        self.infer(tensor)
    }

    fn is_loaded(&self) -> bool {
        ModelHandle::is_loaded(self)
    }
}
