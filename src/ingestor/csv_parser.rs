//! Streaming CSV record parser
//!
//! Reads records incrementally off an `AsyncRead` (in production the
//! reqwest byte stream bridged through a `StreamReader`), applies the
//! column policy to the header row and type coercion to every cell.
//! Individually malformed rows are skipped without aborting the stream;
//! transport-level failures mid-stream abort the source.

use csv_async::{AsyncReaderBuilder, ErrorKind, StringRecord};
use tokio::io::AsyncRead;
use tracing::debug;

use super::column_map::{ColumnPolicy, ColumnTarget};
use crate::errors::IngestError;
use crate::models::{CsvRecord, CsvValue};
use crate::utils::datetime;

/// Coerce one raw cell into a typed value.
///
/// Detection order: empty, integer, float, timestamp literal, text.
pub fn coerce_cell(cell: &str) -> CsvValue {
    let cell = cell.trim();
    if cell.is_empty() {
        return CsvValue::Empty;
    }
    if let Ok(value) = cell.parse::<i64>() {
        return CsvValue::Integer(value);
    }
    if let Ok(value) = cell.parse::<f64>() {
        return CsvValue::Float(value);
    }
    if let Some(value) = datetime::parse_flexible(cell) {
        return CsvValue::Timestamp(value);
    }
    CsvValue::Text(cell.to_string())
}

/// A lazy, consume-once sequence of mapped records from one source fetch.
pub struct CsvRecordStream<R: AsyncRead + Unpin + Send> {
    reader: csv_async::AsyncReader<R>,
    targets: Vec<ColumnTarget>,
    url: String,
    row: StringRecord,
}

impl<R: AsyncRead + Unpin + Send> CsvRecordStream<R> {
    /// Open the stream: read the header row and derive the field
    /// projection. A header that cannot be read is a parse-setup failure.
    pub async fn open(reader: R, policy: &ColumnPolicy, url: &str) -> Result<Self, IngestError> {
        let mut reader = AsyncReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .delimiter(b',')
            .create_reader(reader);

        let headers = reader
            .headers()
            .await
            .map_err(|e| IngestError::parse_setup(url, e.to_string()))?;
        let targets = policy.map_header(headers.iter());

        Ok(Self {
            reader,
            targets,
            url: url.to_string(),
            row: StringRecord::new(),
        })
    }

    /// Pull the next record, skipping rows that fail to parse.
    ///
    /// Returns `Ok(None)` at end of input. Transport errors are fatal;
    /// row-level CSV errors are dropped silently and parsing continues.
    pub async fn next_record(&mut self) -> Result<Option<CsvRecord>, IngestError> {
        loop {
            match self.reader.read_record(&mut self.row).await {
                Ok(true) => return Ok(Some(self.map_row())),
                Ok(false) => return Ok(None),
                Err(e) => match e.kind() {
                    ErrorKind::Io(_) => {
                        return Err(IngestError::parse_setup(&self.url, e.to_string()));
                    }
                    _ => {
                        debug!("Skipping malformed row in {}: {}", self.url, e);
                        continue;
                    }
                },
            }
        }
    }

    /// Materialize the remaining records into memory.
    ///
    /// This is the pipeline's explicit memory/simplicity boundary: peak
    /// memory is one source's row count, and batching happens over the
    /// resulting list. A bounded-memory variant would batch off
    /// `next_record` directly.
    pub async fn drain(mut self) -> Result<Vec<CsvRecord>, IngestError> {
        let mut records = Vec::new();
        while let Some(record) = self.next_record().await? {
            records.push(record);
        }
        Ok(records)
    }

    fn map_row(&self) -> CsvRecord {
        let fields = self
            .targets
            .iter()
            .zip(self.row.iter())
            .filter_map(|(target, cell)| match target {
                ColumnTarget::Field(name) => Some((name.clone(), coerce_cell(cell))),
                ColumnTarget::Skip => None,
            })
            .collect();
        CsvRecord::new(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn journey_policy() -> ColumnPolicy {
        ColumnPolicy::explicit([
            ("Departure", "departure"),
            ("Covered distance (m)", "distance"),
            ("Duration (sec.)", "duration"),
        ])
    }

    #[tokio::test]
    async fn parses_and_coerces_rows() {
        let csv = "Departure,Covered distance (m),Duration (sec.)\n\
                   2021-05-31T23:57:25,2043,500\n\
                   2021-06-01T00:02:00,1870.5,611\n";
        let stream = CsvRecordStream::open(csv.as_bytes(), &journey_policy(), "test://journeys")
            .await
            .unwrap();
        let records = stream.drain().await.unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(
            records[0].timestamp_field("departure"),
            Some(Utc.with_ymd_and_hms(2021, 5, 31, 23, 57, 25).unwrap())
        );
        assert_eq!(records[0].i64_field("distance"), Some(2043));
        assert_eq!(records[1].f64_field("distance"), Some(1870.5));
    }

    #[tokio::test]
    async fn unmapped_columns_are_dropped_from_every_row() {
        let csv = "Departure,Weather,Duration (sec.)\n2021-05-31T23:57:25,sunny,500\n";
        let stream = CsvRecordStream::open(csv.as_bytes(), &journey_policy(), "test://journeys")
            .await
            .unwrap();
        let records = stream.drain().await.unwrap();

        assert_eq!(records[0].len(), 2);
        assert!(records[0].get("Weather").is_none());
        assert_eq!(records[0].i64_field("duration"), Some(500));
    }

    #[tokio::test]
    async fn short_rows_yield_partial_records() {
        let csv = "Departure,Covered distance (m),Duration (sec.)\n2021-05-31T23:57:25,2043\n";
        let stream = CsvRecordStream::open(csv.as_bytes(), &journey_policy(), "test://journeys")
            .await
            .unwrap();
        let records = stream.drain().await.unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].i64_field("distance"), Some(2043));
        assert!(records[0].get("duration").is_none());
    }

    #[tokio::test]
    async fn invalid_utf8_rows_are_skipped_without_aborting() {
        let mut bytes = b"Departure,Covered distance (m),Duration (sec.)\n".to_vec();
        bytes.extend_from_slice(b"2021-05-31T23:57:25,2043,500\n");
        bytes.extend_from_slice(b"bad\xFF\xFErow,1,2\n");
        bytes.extend_from_slice(b"2021-06-01T00:02:00,1870,611\n");

        let stream =
            CsvRecordStream::open(bytes.as_slice(), &journey_policy(), "test://journeys")
                .await
                .unwrap();
        let records = stream.drain().await.unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[1].i64_field("duration"), Some(611));
    }

    #[tokio::test]
    async fn empty_input_yields_zero_records() {
        let csv = "Departure,Covered distance (m),Duration (sec.)\n";
        let stream = CsvRecordStream::open(csv.as_bytes(), &journey_policy(), "test://journeys")
            .await
            .unwrap();
        let records = stream.drain().await.unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn coercion_detects_literals_in_order() {
        assert_eq!(coerce_cell("2043"), CsvValue::Integer(2043));
        assert_eq!(coerce_cell("1870.5"), CsvValue::Float(1870.5));
        assert_eq!(
            coerce_cell("2021-05-31T23:57:25"),
            CsvValue::Timestamp(Utc.with_ymd_and_hms(2021, 5, 31, 23, 57, 25).unwrap())
        );
        assert_eq!(
            coerce_cell(" Teljäntie "),
            CsvValue::Text("Teljäntie".to_string())
        );
        assert_eq!(coerce_cell(""), CsvValue::Empty);
        assert_eq!(coerce_cell("   "), CsvValue::Empty);
    }
}
