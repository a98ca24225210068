//! Bulk station persistence
//!
//! Same write discipline as the journey sink: per-row inserts, no
//! intra-batch atomicity, failures logged and rolled up.

use async_trait::async_trait;
use sqlx::{Pool, Sqlite};
use tracing::{debug, warn};

use crate::errors::WriteError;
use crate::ingestor::RecordSink;
use crate::models::{CsvRecord, Station};
use crate::utils::datetime;

pub struct StationSink {
    pool: Pool<Sqlite>,
}

impl StationSink {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    async fn insert(&self, station: &Station) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO stations
             (id, fid, station_id, name_fi, name_sv, name_en, address_fi, address_sv,
              city_fi, city_sv, operator, capacity, x, y, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(station.id.to_string())
        .bind(station.fid)
        .bind(station.station_id)
        .bind(&station.name_fi)
        .bind(&station.name_sv)
        .bind(&station.name_en)
        .bind(&station.address_fi)
        .bind(&station.address_sv)
        .bind(&station.city_fi)
        .bind(&station.city_sv)
        .bind(&station.operator)
        .bind(station.capacity)
        .bind(station.x)
        .bind(station.y)
        .bind(datetime::format_for_storage(&station.created_at))
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl RecordSink for StationSink {
    async fn write_batch(&self, batch: &[CsvRecord]) -> Result<(), WriteError> {
        let mut failed = 0usize;

        for record in batch {
            let Some(station) = Station::from_record(record) else {
                debug!("Dropping station row without a numeric station id");
                continue;
            };
            if let Err(e) = self.insert(&station).await {
                warn!("Failed to write station row: {}", e);
                failed += 1;
            }
        }

        if failed > 0 {
            return Err(WriteError::other(format!(
                "{} of {} station rows failed to write",
                failed,
                batch.len()
            )));
        }
        Ok(())
    }
}
