//! Record batching for bulk persistence
//!
//! Contiguous, non-overlapping, order-preserving chunks; the final chunk
//! may be short. A zero batch size is clamped to 1 rather than panicking.

pub fn chunks<T>(records: &[T], size: usize) -> std::slice::Chunks<'_, T> {
    records.chunks(size.max(1))
}
