//! Battery Bulge Detection Service - Main Entry Point
//!
//! Loads the model once at startup and serves the prediction and health
//! endpoints. A failed model load degrades the service rather than killing
//! it: health reports `model_loaded: false` and every prediction errors.

use anyhow::Result;
use bulge_detection_pipeline::{
    config::AppConfig,
    metrics::{InferenceMetrics, MetricsReporter},
    models::{InferencePipeline, ModelHandle},
    server::{router, AppState},
};
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("bulge_detection_pipeline=info".parse()?),
        )
        .init();

    info!("Starting Battery Bulge Detection Service");

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            warn!(error = %e, "Failed to load configuration, using defaults");
            AppConfig::default()
        }
    };
    info!(
        "Decision threshold: {:.2}, risk bands: high >{:.2}/<{:.2}, medium >{:.2}/<{:.2}",
        config.decision.threshold,
        config.decision.risk_bands.high_upper,
        config.decision.risk_bands.high_lower,
        config.decision.risk_bands.medium_upper,
        config.decision.risk_bands.medium_lower
    );

    let handle = ModelHandle::load(&config.model);
    if handle.is_loaded() {
        info!(path = %config.model.path, "Model loaded");
    } else {
        warn!("Serving without a model; all predictions will fail");
    }

    let pipeline = Arc::new(InferencePipeline::new(
        Arc::new(handle),
        config.decision.clone(),
    ));
    let metrics = Arc::new(InferenceMetrics::new());

    // Periodic metrics summary
    let metrics_clone = metrics.clone();
    tokio::spawn(async move {
        let reporter = MetricsReporter::new(metrics_clone, 30);
        reporter.start().await;
    });

    let app = router(AppState { pipeline, metrics });

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
