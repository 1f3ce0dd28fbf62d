//! Explorer HTTP client and retry policy.

use std::time::Duration;

use reqwest::{Client, StatusCode};

use stats::{PositionStats, StatsSource};

use crate::models::ExplorerResponse;
use crate::ExplorerError;

/// Which slice of the game corpus the statistics are drawn from.
#[derive(Debug, Clone)]
pub struct CorpusFilter {
    pub variant: String,
    /// Comma-separated speed classes, e.g. `blitz,rapid,classical`.
    pub speeds: String,
    /// Comma-separated rating bands, e.g. `2200,2500`.
    pub ratings: String,
}

impl Default for CorpusFilter {
    fn default() -> Self {
        Self {
            variant: "standard".to_string(),
            speeds: "blitz,rapid,classical".to_string(),
            ratings: "2200,2500".to_string(),
        }
    }
}

/// Fixed retry delays. Transport hiccups use the short delay; throttling
/// and unparseable bodies the long one.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub transient_delay: Duration,
    pub rate_limit_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            transient_delay: Duration::from_secs(15),
            rate_limit_delay: Duration::from_secs(61),
        }
    }
}

pub struct ExplorerClient {
    http: Client,
    base: String,
    filter: CorpusFilter,
    retry: RetryPolicy,
}

impl ExplorerClient {
    pub const DEFAULT_BASE: &'static str = "https://explorer.lichess.ovh/lichess";

    pub fn new(filter: CorpusFilter, retry: RetryPolicy) -> Self {
        Self::with_base(Self::DEFAULT_BASE.to_string(), filter, retry)
    }

    pub fn with_base(base: String, filter: CorpusFilter, retry: RetryPolicy) -> Self {
        Self {
            http: Client::new(),
            base,
            filter,
            retry,
        }
    }

    /// One logical request; loops until the provider yields a parseable
    /// response or answers with a definite non-transient status.
    async fn fetch(&self, fen: &str, play: &[String]) -> Result<ExplorerResponse, ExplorerError> {
        let mut query: Vec<(&str, String)> = vec![
            ("variant", self.filter.variant.clone()),
            ("speeds", self.filter.speeds.clone()),
            ("ratings", self.filter.ratings.clone()),
            ("fen", fen.to_string()),
        ];
        if !play.is_empty() {
            query.push(("play", play.join(",")));
        }

        loop {
            let response = match self.http.get(&self.base).query(&query).send().await {
                Ok(response) => response,
                Err(err) => {
                    tracing::warn!(%err, "explorer request failed, retrying");
                    tokio::time::sleep(self.retry.transient_delay).await;
                    continue;
                }
            };

            let status = response.status();
            if status == StatusCode::TOO_MANY_REQUESTS {
                tracing::warn!("explorer rate limited, backing off");
                tokio::time::sleep(self.retry.rate_limit_delay).await;
                continue;
            }
            if !status.is_success() {
                return Err(ExplorerError::Status(status.as_u16()));
            }

            let body = match response.text().await {
                Ok(body) => body,
                Err(err) => {
                    tracing::warn!(%err, "explorer response body unreadable, retrying");
                    tokio::time::sleep(self.retry.transient_delay).await;
                    continue;
                }
            };

            // An unparseable body is indistinguishable from throttling
            // without more context from the provider; treat it the same.
            match serde_json::from_str::<ExplorerResponse>(&body) {
                Ok(parsed) => return Ok(parsed),
                Err(err) => {
                    tracing::warn!(%err, "explorer response unparseable, backing off");
                    tokio::time::sleep(self.retry.rate_limit_delay).await;
                }
            }
        }
    }
}

impl StatsSource for ExplorerClient {
    type Error = ExplorerError;

    async fn fetch_stats(
        &self,
        position: &str,
        path_from_root: &[String],
    ) -> Result<Option<PositionStats>, ExplorerError> {
        let stats: PositionStats = self.fetch(position, path_from_root).await?.into();
        if stats.total() == 0 && stats.moves.is_empty() {
            return Ok(None);
        }
        Ok(Some(stats))
    }
}
