//! Progress reporting for long-running imports
//!
//! Advisory output only: nothing here affects control flow. The sink is a
//! trait so the pipeline stays testable without capturing process output.

use std::io::Write;
use std::time::Duration;

/// Everything known after one batch has been attempted.
#[derive(Debug, Clone)]
pub struct ProgressUpdate {
    pub job_name: String,
    /// Zero-based index of the source within the job.
    pub source_index: usize,
    pub source_count: usize,
    /// Wall-clock duration of the batch that just finished.
    pub batch_elapsed: Duration,
    /// Records not yet attempted at the start of that batch.
    pub remaining_records: usize,
    pub batch_size: usize,
}

pub trait ProgressSink: Send + Sync {
    fn batch_completed(&self, update: &ProgressUpdate);
    fn source_completed(&self, job_name: &str, source_index: usize, source_count: usize);
}

/// Linear extrapolation from the most recent batch's wall-clock duration:
/// if the last `batch_size` records took `batch_elapsed`, the remaining
/// records take proportionally longer.
pub fn estimate_remaining(
    batch_elapsed: Duration,
    remaining_records: usize,
    batch_size: usize,
) -> Duration {
    if batch_size == 0 {
        return Duration::ZERO;
    }
    Duration::from_secs_f64(
        batch_elapsed.as_secs_f64() * remaining_records as f64 / batch_size as f64,
    )
}

/// Writes a single overwritable progress line per batch to stdout, and a
/// final completion line per source.
pub struct ConsoleProgress;

impl ProgressSink for ConsoleProgress {
    fn batch_completed(&self, update: &ProgressUpdate) {
        let eta = estimate_remaining(
            update.batch_elapsed,
            update.remaining_records,
            update.batch_size,
        );
        let minutes = eta.as_secs() / 60;
        let seconds = eta.as_secs() % 60;
        print!(
            "\rImporting {} csv {}/{}, {}m {}s left",
            update.job_name,
            update.source_index + 1,
            update.source_count,
            minutes,
            seconds
        );
        let _ = std::io::stdout().flush();
    }

    fn source_completed(&self, job_name: &str, source_index: usize, source_count: usize) {
        println!(
            "\rImporting {} csv {}/{} 100% completed",
            job_name,
            source_index + 1,
            source_count
        );
        let _ = std::io::stdout().flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn estimate_scales_with_remaining_records() {
        // 1000 records took 2s; 5000 remaining -> 10s.
        let eta = estimate_remaining(Duration::from_secs(2), 5000, 1000);
        assert_eq!(eta.as_secs(), 10);
    }

    #[test]
    fn estimate_is_zero_when_nothing_remains() {
        let eta = estimate_remaining(Duration::from_secs(2), 0, 1000);
        assert_eq!(eta, Duration::ZERO);
    }

    #[test]
    fn estimate_handles_partial_batches() {
        // 500 remaining at one 2s batch per 1000 records -> 1s.
        let eta = estimate_remaining(Duration::from_secs(2), 500, 1000);
        assert_eq!(eta.as_millis(), 1000);
    }

    #[test]
    fn zero_batch_size_does_not_divide_by_zero() {
        assert_eq!(estimate_remaining(Duration::from_secs(2), 100, 0), Duration::ZERO);
    }
}
