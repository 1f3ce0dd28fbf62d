//! Shared statistics data model and provider traits.
//!
//! A statistics provider maps a canonical position (a normalized FEN
//! string, compared by string identity only) to aggregate win/loss/draw
//! counters plus per-successor-move counters. Two implementations exist:
//! the live opening-explorer client (`explorer` crate) and the SQLite
//! store populated by ingestion (`store` crate). The tree builder is
//! generic over [`StatsSource`] so the selection policy can be tested
//! against canned stats with no network or database behind it.
//!
//! Trait methods return `impl Future + Send` rather than using
//! `async fn` so that the futures are guaranteed `Send`.

use std::future::Future;

use cozy_chess::Color;

/// Result of one game, as recorded in a PGN `Result` tag.
///
/// Exactly these three values are upsertable; anything else (`*`, a
/// missing tag, garbage) must be rejected by callers rather than mapped
/// to a default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    WhiteWin,
    BlackWin,
    Draw,
}

impl Outcome {
    /// Parse a PGN result tag value. Returns `None` for anything that is
    /// not one of the three finished-game tags.
    pub fn from_result_tag(tag: &str) -> Option<Self> {
        match tag {
            "1-0" => Some(Self::WhiteWin),
            "0-1" => Some(Self::BlackWin),
            "1/2-1/2" => Some(Self::Draw),
            _ => None,
        }
    }

    /// The PGN tag value this outcome was parsed from.
    pub fn result_tag(self) -> &'static str {
        match self {
            Self::WhiteWin => "1-0",
            Self::BlackWin => "0-1",
            Self::Draw => "1/2-1/2",
        }
    }
}

/// Aggregate counters for one successor move of a position: how the games
/// that continued with this move eventually ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveStats {
    /// Move token, e.g. `e2e4` or `O-O`. Opaque here; only the rules
    /// adapter interprets it.
    pub token: String,
    pub white: u64,
    pub black: u64,
    pub draws: u64,
}

impl MoveStats {
    pub fn new(token: impl Into<String>, white: u64, black: u64, draws: u64) -> Self {
        Self {
            token: token.into(),
            white,
            black,
            draws,
        }
    }

    /// Number of games that went through this move.
    pub fn total(&self) -> u64 {
        self.white + self.black + self.draws
    }

    pub fn wins_for(&self, side: Color) -> u64 {
        match side {
            Color::White => self.white,
            Color::Black => self.black,
        }
    }

    /// Fraction of games through this move won by `side`. A move with no
    /// recorded games rates 0.
    pub fn rate_for(&self, side: Color) -> f64 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            self.wins_for(side) as f64 / total as f64
        }
    }
}

/// Aggregate statistics for one canonical position.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PositionStats {
    pub white: u64,
    pub black: u64,
    pub draws: u64,
    /// Known successor moves with their counters, in provider order.
    pub moves: Vec<MoveStats>,
}

impl PositionStats {
    /// Total games recorded through this position.
    pub fn total(&self) -> u64 {
        self.white + self.black + self.draws
    }
}

/// Read side of a statistics provider.
pub trait StatsSource: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Fetch aggregate stats for `position`. `path_from_root` is the move
    /// path used to reach it, for providers that key on it (the live
    /// explorer); the store ignores it. `Ok(None)` means the provider has
    /// no data for this position, which is not an error.
    fn fetch_stats(
        &self,
        position: &str,
        path_from_root: &[String],
    ) -> impl Future<Output = Result<Option<PositionStats>, Self::Error>> + Send;
}

/// Write side of a statistics provider, used by the ingestion pipeline.
///
/// Implementations must increment exactly the one counter matching
/// `outcome` and add `move_token` to the successor set only if absent
/// (the set is a true set regardless of how often the same move is
/// recorded). An empty `move_token` updates counters only.
pub trait StatsSink: Send {
    type Error: std::error::Error + Send + Sync + 'static;

    fn record(
        &mut self,
        position: &str,
        outcome: Outcome,
        move_token: &str,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Commit writes accumulated since the last checkpoint.
    fn checkpoint(&mut self) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Commit any remaining writes and release the writer.
    fn finish(self) -> impl Future<Output = Result<(), Self::Error>> + Send;
}
