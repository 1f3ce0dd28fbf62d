//! Streaming PGN ingestion.
//!
//! Turns a preprocessed game dump (headers plus movetext whose moves each
//! carry a FEN comment) into aggregate upserts against a
//! [`stats::StatsSink`]. Writes are committed at byte-volume checkpoints;
//! a crash loses only the tail since the last commit, and re-running the
//! same input against a non-empty store double-counts the outcome
//! counters (successor-move sets stay correct). Callers needing exact
//! counts must re-ingest from a clean store.

mod pipeline;
mod scanner;

pub use pipeline::Pipeline;

/// Tunables for one ingestion run.
#[derive(Debug, Clone)]
pub struct IngestOptions {
    /// Reject games whose average rating is below this; games missing a
    /// rating are rejected as unratable. `None` disables the filter.
    pub min_avg_rating: Option<u32>,
    /// Commit the write transaction each time this many input bytes have
    /// been processed.
    pub checkpoint_bytes: u64,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            min_avg_rating: Some(2000),
            checkpoint_bytes: 4 * 1024 * 1024,
        }
    }
}

/// What one ingestion run saw and did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub games_seen: u64,
    pub games_ingested: u64,
    pub games_skipped_rating: u64,
    pub games_unratable: u64,
    pub games_malformed: u64,
    pub positions_recorded: u64,
    pub bytes_processed: u64,
    pub checkpoints: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("store error: {0}")]
    Sink(#[source] Box<dyn std::error::Error + Send + Sync>),
}
