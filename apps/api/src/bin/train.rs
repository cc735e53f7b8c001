use anyhow::{Context, Result};
use tracing::info;

use careerlens::config::TrainingConfig;
use careerlens::telemetry::init_tracing;
use careerlens::training::{persist, train, Dataset, TrainingOptions};

#[tokio::main]
async fn main() -> Result<()> {
    let config = TrainingConfig::from_env()?;

    init_tracing(&config.rust_log, env!("CARGO_CRATE_NAME"));

    let dataset = Dataset::from_path(&config.dataset_path)
        .with_context(|| format!("Failed to load dataset {}", config.dataset_path.display()))?;

    let options = TrainingOptions::from(&config);
    let outcome = train(&dataset, &options).context("Training failed")?;

    info!("Accuracy: {:.4}", outcome.report.accuracy);
    info!(
        "Top-{} accuracy: {:.4}",
        outcome.report.k, outcome.report.top_k_accuracy
    );

    let store = config.artifacts.open().await;
    persist(&outcome, store.as_ref())
        .await
        .with_context(|| format!("Failed to persist artifacts to {}", store.location()))?;

    info!("Training complete, model {}", outcome.artifacts.model_id());
    Ok(())
}
