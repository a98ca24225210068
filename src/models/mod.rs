use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single CSV cell after type coercion.
///
/// The parser detects integer, float and timestamp literals; everything
/// else stays text. `Empty` is an empty cell, which is distinct from the
/// literal text of a cell that failed coercion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CsvValue {
    Integer(i64),
    Float(f64),
    Timestamp(DateTime<Utc>),
    Text(String),
    Empty,
}

impl CsvValue {
    /// Integral floats are accepted; fractional values are not silently
    /// truncated and yield `None`.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            CsvValue::Integer(v) => Some(*v),
            CsvValue::Float(v) if v.fract() == 0.0 => Some(*v as i64),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CsvValue::Integer(v) => Some(*v as f64),
            CsvValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            CsvValue::Timestamp(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            CsvValue::Text(v) => Some(v),
            _ => None,
        }
    }
}

/// A parsed, column-mapped row: the unit that flows through batching,
/// validation and persistence.
///
/// Fields keep the column order of the source file so the Nth field name
/// always corresponds to the Nth unskipped input column.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CsvRecord {
    fields: Vec<(String, CsvValue)>,
}

impl CsvRecord {
    pub fn new(fields: Vec<(String, CsvValue)>) -> Self {
        Self { fields }
    }

    pub fn get(&self, name: &str) -> Option<&CsvValue> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }

    pub fn fields(&self) -> &[(String, CsvValue)] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn i64_field(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(CsvValue::as_i64)
    }

    pub fn f64_field(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(CsvValue::as_f64)
    }

    pub fn timestamp_field(&self, name: &str) -> Option<DateTime<Utc>> {
        self.get(name).and_then(CsvValue::as_timestamp)
    }

    pub fn text_field(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(CsvValue::as_text)
    }
}

/// A single city bike journey (one trip between two stations)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Journey {
    pub id: Uuid,
    pub departure_time: DateTime<Utc>,
    pub return_time: DateTime<Utc>,
    pub departure_station_id: i64,
    pub departure_station_name: String,
    pub return_station_id: i64,
    pub return_station_name: String,
    pub distance_m: f64,
    pub duration_sec: f64,
    pub created_at: DateTime<Utc>,
}

impl Journey {
    /// Build a typed journey row from a mapped record.
    ///
    /// Returns `None` when a required field is missing or has the wrong
    /// shape; such rows are dropped the same way validation rejects are.
    pub fn from_record(record: &CsvRecord) -> Option<Self> {
        Some(Self {
            id: Uuid::new_v4(),
            departure_time: record.timestamp_field("departure")?,
            return_time: record.timestamp_field("return")?,
            departure_station_id: record.i64_field("departure_station_id")?,
            departure_station_name: record.text_field("departure_station_name")?.to_string(),
            return_station_id: record.i64_field("return_station_id")?,
            return_station_name: record.text_field("return_station_name")?.to_string(),
            distance_m: record.f64_field("distance")?,
            duration_sec: record.f64_field("duration")?,
            created_at: Utc::now(),
        })
    }
}

/// A city bike station from the station registry export
///
/// The registry is bilingual; only the numeric station id is required,
/// everything else is carried as-is when present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Station {
    pub id: Uuid,
    pub fid: Option<i64>,
    pub station_id: i64,
    pub name_fi: Option<String>,
    pub name_sv: Option<String>,
    pub name_en: Option<String>,
    pub address_fi: Option<String>,
    pub address_sv: Option<String>,
    pub city_fi: Option<String>,
    pub city_sv: Option<String>,
    pub operator: Option<String>,
    pub capacity: Option<i64>,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub created_at: DateTime<Utc>,
}

impl Station {
    pub fn from_record(record: &CsvRecord) -> Option<Self> {
        Some(Self {
            id: Uuid::new_v4(),
            fid: record.i64_field("FID"),
            station_id: record.i64_field("station_id")?,
            name_fi: record.text_field("Nimi").map(str::to_string),
            name_sv: record.text_field("Namn").map(str::to_string),
            name_en: record.text_field("Name").map(str::to_string),
            address_fi: record.text_field("Osoite").map(str::to_string),
            address_sv: record.text_field("Adress").map(str::to_string),
            city_fi: record.text_field("Kaupunki").map(str::to_string),
            city_sv: record.text_field("Stad").map(str::to_string),
            operator: record.text_field("Operaattor").map(str::to_string),
            capacity: record.i64_field("Kapasiteet"),
            x: record.f64_field("x"),
            y: record.f64_field("y"),
            created_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn journey_record() -> CsvRecord {
        let departed = Utc.with_ymd_and_hms(2021, 5, 31, 23, 57, 25).unwrap();
        let returned = Utc.with_ymd_and_hms(2021, 6, 1, 0, 5, 46).unwrap();
        CsvRecord::new(vec![
            ("departure".into(), CsvValue::Timestamp(departed)),
            ("return".into(), CsvValue::Timestamp(returned)),
            ("departure_station_id".into(), CsvValue::Integer(94)),
            (
                "departure_station_name".into(),
                CsvValue::Text("Laajalahden aukio".into()),
            ),
            ("return_station_id".into(), CsvValue::Integer(100)),
            (
                "return_station_name".into(),
                CsvValue::Text("Teljäntie".into()),
            ),
            ("distance".into(), CsvValue::Integer(2043)),
            ("duration".into(), CsvValue::Integer(500)),
        ])
    }

    #[test]
    fn journey_from_record_maps_all_fields() {
        let journey = Journey::from_record(&journey_record()).unwrap();
        assert_eq!(journey.departure_station_id, 94);
        assert_eq!(journey.return_station_name, "Teljäntie");
        assert_eq!(journey.distance_m, 2043.0);
        assert_eq!(journey.duration_sec, 500.0);
    }

    #[test]
    fn journey_from_record_rejects_missing_required_field() {
        let mut fields = journey_record().fields().to_vec();
        fields.retain(|(name, _)| name != "duration");
        assert!(Journey::from_record(&CsvRecord::new(fields)).is_none());
    }

    #[test]
    fn integer_coercion_rejects_fractional_floats() {
        assert_eq!(CsvValue::Integer(12).as_i64(), Some(12));
        assert_eq!(CsvValue::Float(12.0).as_i64(), Some(12));
        assert_eq!(CsvValue::Float(12.5).as_i64(), None);
        assert_eq!(CsvValue::Text("12".to_string()).as_i64(), None);
    }

    #[test]
    fn station_capacity_with_fractional_value_is_dropped_not_truncated() {
        let mut fields = vec![
            ("station_id".to_string(), CsvValue::Integer(94)),
            ("Kapasiteet".to_string(), CsvValue::Float(16.5)),
        ];
        let station = Station::from_record(&CsvRecord::new(fields.clone())).unwrap();
        assert_eq!(station.capacity, None);

        fields[1].1 = CsvValue::Float(16.0);
        let station = Station::from_record(&CsvRecord::new(fields)).unwrap();
        assert_eq!(station.capacity, Some(16));
    }

    #[test]
    fn record_lookup_preserves_first_match_and_order() {
        let record = journey_record();
        assert_eq!(record.fields()[0].0, "departure");
        assert_eq!(record.fields()[7].0, "duration");
        assert_eq!(record.i64_field("distance"), Some(2043));
        assert!(record.get("no-such-field").is_none());
    }
}
