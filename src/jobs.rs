//! Concrete import job definitions
//!
//! Two jobs exist: journey exports (explicit header table, trips shorter
//! than 10 meters or 10 seconds are rejected) and the station registry
//! (pass-through headers with the `ID` column renamed to `station_id`).

use std::sync::Arc;

use crate::database::{Database, JourneySink, StationSink};
use crate::ingestor::{ColumnPolicy, CompletionPolicy, ImportJob};
use crate::models::CsvRecord;

/// Journeys below this distance (meters) or duration (seconds) are noise
/// in the source exports and are dropped before persistence.
const MIN_DISTANCE_M: f64 = 10.0;
const MIN_DURATION_SEC: f64 = 10.0;

fn journey_is_plausible(record: &CsvRecord) -> bool {
    match (record.f64_field("distance"), record.f64_field("duration")) {
        (Some(distance), Some(duration)) => {
            distance > MIN_DISTANCE_M && duration > MIN_DURATION_SEC
        }
        _ => false,
    }
}

pub fn journey_job(database: &Database, urls: Vec<String>) -> ImportJob {
    ImportJob {
        name: "journeys".to_string(),
        urls,
        column_policy: ColumnPolicy::explicit([
            ("Departure", "departure"),
            ("Return", "return"),
            ("Departure station id", "departure_station_id"),
            ("Departure station name", "departure_station_name"),
            ("Return station id", "return_station_id"),
            ("Return station name", "return_station_name"),
            ("Covered distance (m)", "distance"),
            ("Duration (sec.)", "duration"),
        ]),
        validate: Arc::new(journey_is_plausible),
        sink: Arc::new(JourneySink::new(database.pool())),
        completion_policy: CompletionPolicy::Always,
    }
}

pub fn station_job(database: &Database, urls: Vec<String>) -> ImportJob {
    ImportJob {
        name: "stations".to_string(),
        urls,
        column_policy: ColumnPolicy::pass_through_with_rename("ID", "station_id"),
        validate: Arc::new(|_record| true),
        sink: Arc::new(StationSink::new(database.pool())),
        completion_policy: CompletionPolicy::Always,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CsvValue;

    fn record(distance: f64, duration: f64) -> CsvRecord {
        CsvRecord::new(vec![
            ("distance".to_string(), CsvValue::Float(distance)),
            ("duration".to_string(), CsvValue::Float(duration)),
        ])
    }

    #[test]
    fn journey_validator_rejects_short_trips() {
        assert!(!journey_is_plausible(&record(5.0, 20.0)));
        assert!(!journey_is_plausible(&record(50.0, 5.0)));
        assert!(journey_is_plausible(&record(50.0, 50.0)));
    }

    #[test]
    fn journey_validator_is_exclusive_at_the_threshold() {
        assert!(!journey_is_plausible(&record(10.0, 50.0)));
        assert!(!journey_is_plausible(&record(50.0, 10.0)));
    }

    #[test]
    fn journey_validator_rejects_records_missing_either_field() {
        let record = CsvRecord::new(vec![(
            "distance".to_string(),
            CsvValue::Float(50.0),
        )]);
        assert!(!journey_is_plausible(&record));
    }
}
