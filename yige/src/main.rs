// YiGe - one day, one keepsake
// Entry point: opens the journal and prints the shelf of artifacts

use anyhow::Context;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "yige=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting YiGe");

    let app_data_dir = std::env::var_os("YIGE_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(".yige"));

    let state = yige::app::setup(app_data_dir)
        .await
        .context("failed to initialize application")?;

    let records = state.records.list_records().await?;
    tracing::info!("{} records on the shelf", records.len());

    let renderings: Vec<_> = records
        .iter()
        .map(|record| state.factory.render(record))
        .collect();
    println!("{}", serde_json::to_string_pretty(&renderings)?);

    if state.auth.registration_required_for_records().await? {
        tracing::info!("Guest record limit reached; sign in to keep going");
    }

    Ok(())
}
