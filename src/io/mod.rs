//! File input and output.

/// CSV Output Sink for aggregate records.
pub mod export;
/// CSV Environment profile loader.
pub mod profile_csv;
