//! Standalone feature dataflow
//!
//! Tails `CSV_PATH` and writes derived feature rows as JSON Lines under
//! `FEATURES_OUTPUT_DIR` until Ctrl-C.

use fraud_rag_core::config::PipelineConfig;
use fraud_rag_core::constants::{APP_NAME, APP_VERSION};
use fraud_rag_core::logic::dataflow::{FeatureDataflow, JsonlFeatureSink};

#[tokio::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Starting {} feature dataflow v{}", APP_NAME, APP_VERSION);

    let config = PipelineConfig::from_env();
    let sink = JsonlFeatureSink::new(config.features_output_dir.clone())?;
    log::info!(
        "Reading {} -> {}",
        config.csv_path.display(),
        config.features_output_dir.display()
    );

    let handle = FeatureDataflow::new(&config.csv_path, Box::new(sink), config.dataflow_poll_interval).spawn();

    tokio::signal::ctrl_c().await?;
    log::info!("Shutting down...");

    let stats = tokio::task::spawn_blocking(move || handle.stop())
        .await
        .map_err(std::io::Error::other)??;
    log::info!("Done: {} rows emitted, {} skipped", stats.emitted, stats.skipped);

    Ok(())
}
