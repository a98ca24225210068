use anyhow::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub http: HttpConfig,
    pub ingestion: IngestionConfig,
    pub sources: SourcesConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestionConfig {
    pub batch_size: usize,
}

/// Static source lists for one import run.
///
/// Each URL is a whole-source unit of work: already-imported URLs are
/// skipped via the ledger, so adding next month's journey export here is
/// enough to pick it up on the next run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesConfig {
    pub journey_urls: Vec<String>,
    pub station_urls: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "sqlite://./citybike.db".to_string(),
                max_connections: Some(10),
            },
            http: HttpConfig {
                timeout_secs: 300,
                user_agent: "citybike-ingest/0.1".to_string(),
            },
            ingestion: IngestionConfig { batch_size: 1000 },
            sources: SourcesConfig {
                journey_urls: vec![
                    "https://dev.hsl.fi/citybikes/od-trips-2021/2021-05.csv".to_string(),
                    "https://dev.hsl.fi/citybikes/od-trips-2021/2021-06.csv".to_string(),
                    "https://dev.hsl.fi/citybikes/od-trips-2021/2021-07.csv".to_string(),
                ],
                station_urls: vec![
                    "https://opendata.arcgis.com/datasets/726277c507ef4914b0aec3cbcfcbfafc_0.csv"
                        .to_string(),
                ],
            },
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_file =
            std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".to_string());

        if std::path::Path::new(&config_file).exists() {
            let contents = std::fs::read_to_string(&config_file)?;
            Ok(toml::from_str(&contents)?)
        } else {
            let default_config = Self::default();
            let contents = toml::to_string_pretty(&default_config)?;
            std::fs::write(&config_file, contents)?;
            Ok(default_config)
        }
    }
}
