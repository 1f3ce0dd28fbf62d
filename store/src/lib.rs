//! SQLite-backed statistics store.
//!
//! [`Database`] wraps a `sqlx::SqlitePool` with WAL mode and embedded
//! migrations. [`SqliteStatsRepository`] is the read side
//! ([`stats::StatsSource`]); [`SqliteIngestWriter`] is the write side
//! ([`stats::StatsSink`]), holding one long-running transaction that the
//! ingestion pipeline commits at volume checkpoints.
//!
//! Ingestion is meant to run exclusively against the store: one writer,
//! periodic commits, no coordination with concurrent writers. Counter
//! increments are not idempotent across re-runs of the same input; the
//! successor-move set is.

mod database;
mod stats_repo;
mod writer;


pub use database::Database;
pub use stats_repo::SqliteStatsRepository;
pub use writer::SqliteIngestWriter;

/// Errors from the statistics store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("migration error: {0}")]
    Migration(String),
    #[error("unparseable position key: {0:?}")]
    Position(String),
}
