use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use citybike_ingest::{
    config::Config,
    database::Database,
    ingestor::{ConsoleProgress, ImportService},
    jobs,
};

#[derive(Parser)]
#[command(name = "citybike-ingest")]
#[command(version = "0.1.0")]
#[command(about = "Bulk CSV importer for city bike journey and station open data")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Database URL (overrides config file)
    #[arg(short = 'd', long, value_name = "URL")]
    database_url: Option<String>,

    /// Batch size for bulk writes (overrides config file)
    #[arg(short, long, value_name = "N")]
    batch_size: Option<usize>,

    /// Log level
    #[arg(short = 'v', long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging with specified level
    let log_filter = format!("citybike_ingest={}", cli.log_level);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting city bike import v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration from specified file
    std::env::set_var("CONFIG_FILE", &cli.config);
    let mut config = Config::load()?;
    info!("Configuration loaded from: {}", cli.config);

    // Override config with CLI arguments
    if let Some(database_url) = cli.database_url {
        config.database.url = database_url;
    }
    if let Some(batch_size) = cli.batch_size {
        config.ingestion.batch_size = batch_size;
    }

    info!("Using database: {}", config.database.url);

    let database = Database::new(&config.database).await?;
    database.migrate().await?;
    info!("Database connection established and migrations applied");

    let service = ImportService::new(
        Arc::new(database.clone()),
        Arc::new(ConsoleProgress),
        &config.http,
        config.ingestion.batch_size,
    );

    let journey_job = jobs::journey_job(&database, config.sources.journey_urls.clone());
    service.run_job(&journey_job).await;

    let station_job = jobs::station_job(&database, config.sources.station_urls.clone());
    service.run_job(&station_job).await;

    info!("All import jobs finished");

    Ok(())
}
