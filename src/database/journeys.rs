//! Bulk journey persistence
//!
//! Writes are unordered within a batch: each row is inserted on its own,
//! so one failed row never blocks the rest. Individual failures are
//! logged at row granularity and rolled up into a batch-level error for
//! the orchestrator to log; nothing is retried or rolled back.

use async_trait::async_trait;
use sqlx::{Pool, Sqlite};
use tracing::{debug, warn};

use crate::errors::WriteError;
use crate::ingestor::RecordSink;
use crate::models::{CsvRecord, Journey};
use crate::utils::datetime;

pub struct JourneySink {
    pool: Pool<Sqlite>,
}

impl JourneySink {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    async fn insert(&self, journey: &Journey) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO journeys
             (id, departure_time, return_time, departure_station_id, departure_station_name,
              return_station_id, return_station_name, distance_m, duration_sec, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(journey.id.to_string())
        .bind(datetime::format_for_storage(&journey.departure_time))
        .bind(datetime::format_for_storage(&journey.return_time))
        .bind(journey.departure_station_id)
        .bind(&journey.departure_station_name)
        .bind(journey.return_station_id)
        .bind(&journey.return_station_name)
        .bind(journey.distance_m)
        .bind(journey.duration_sec)
        .bind(datetime::format_for_storage(&journey.created_at))
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl RecordSink for JourneySink {
    async fn write_batch(&self, batch: &[CsvRecord]) -> Result<(), WriteError> {
        let mut failed = 0usize;

        for record in batch {
            let Some(journey) = Journey::from_record(record) else {
                debug!("Dropping journey row with missing or mistyped fields");
                continue;
            };
            if let Err(e) = self.insert(&journey).await {
                warn!("Failed to write journey row: {}", e);
                failed += 1;
            }
        }

        if failed > 0 {
            return Err(WriteError::other(format!(
                "{} of {} journey rows failed to write",
                failed,
                batch.len()
            )));
        }
        Ok(())
    }
}
