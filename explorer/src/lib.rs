//! Live opening-explorer statistics provider.
//!
//! Queries a remote explorer service for per-position aggregate counters
//! and retries indefinitely on anything that looks transient: transport
//! failures wait a short fixed delay, throttling and unparseable bodies a
//! longer one. No backoff and no retry ceiling: this feeds a batch,
//! non-interactive build, and a permanently broken provider is an
//! operator problem, not something to paper over. Only a definite
//! non-transient response surfaces as an error, which the tree builder
//! turns into a pruned branch.

mod client;
mod models;

pub use client::{CorpusFilter, ExplorerClient, RetryPolicy};
pub use models::{ExplorerMove, ExplorerResponse};

#[derive(Debug, thiserror::Error)]
pub enum ExplorerError {
    /// Non-transient response the retry policy does not cover.
    #[error("explorer returned status {0}")]
    Status(u16),
}
