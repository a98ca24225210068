//! Bulk CSV ingestion for city bike open data
//!
//! Fetches remote journey and station CSV exports, parses them as
//! streams of structured records, validates and batches them, persists
//! the batches to SQLite, and keeps a ledger of fully imported source
//! URLs so re-runs skip completed sources.

pub mod config;
pub mod database;
pub mod errors;
pub mod ingestor;
pub mod jobs;
pub mod models;
pub mod utils;
