//! Error type definitions for the city bike ingestion service
//!
//! The taxonomy follows the pipeline's recovery boundaries: fetch and
//! parse-setup failures abort a single source, ledger failures abort a
//! single source, and batch-level write failures are logged where they
//! happen and never surface as an error at all.

use thiserror::Error;

/// Errors that abort the import of a single source
///
/// None of these abort the whole run: the orchestrator logs the error for
/// the current source and moves on to the next one. A source aborted by a
/// fetch or parse-setup failure gets no ledger entry, so the next run
/// retries it from scratch.
#[derive(Error, Debug)]
pub enum IngestError {
    /// Network-level failure while connecting to or streaming a source
    #[error("Fetch failed for {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The source answered but not with a usable response
    #[error("HTTP error {status} from {url}")]
    Http { url: String, status: u16 },

    /// The response stream could not be interpreted as CSV
    #[error("Parse setup failed for {url}: {message}")]
    ParseSetup { url: String, message: String },

    /// Ledger check or write failed; fatal for the current source only
    #[error("Ledger error: {0}")]
    Ledger(#[from] sqlx::Error),
}

/// Batch-granularity persistence failure
///
/// Caught and logged by the orchestrator; never retried and never blocks
/// the following batches or the source's completion marking.
#[derive(Error, Debug)]
pub enum WriteError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Write failed: {message}")]
    Other { message: String },
}

impl IngestError {
    /// Create a parse-setup error with a custom message
    pub fn parse_setup<U: Into<String>, M: Into<String>>(url: U, message: M) -> Self {
        Self::ParseSetup {
            url: url.into(),
            message: message.into(),
        }
    }
}

impl WriteError {
    /// Create a generic write error
    pub fn other<M: Into<String>>(message: M) -> Self {
        Self::Other {
            message: message.into(),
        }
    }
}
