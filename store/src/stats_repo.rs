//! Read side of the store: [`StatsSource`] over the `position_stats` table.

use sqlx::SqlitePool;

use stats::{MoveStats, PositionStats, StatsSource};

use crate::StoreError;

/// Keyed lookup of aggregate position statistics.
///
/// The successor column stores move tokens only; per-move counters are
/// materialized by applying each token to the position and reading the
/// child row, so the tree builder sees the same shape of data from the
/// store as from the live explorer.
pub struct SqliteStatsRepository {
    pool: SqlitePool,
}

impl SqliteStatsRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn counters(&self, fen: &str) -> Result<Option<(i64, i64, i64)>, StoreError> {
        let row = sqlx::query_as(
            "SELECT white_wins, black_wins, draws FROM position_stats WHERE fen = ?",
        )
        .bind(fen)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }
}

impl StatsSource for SqliteStatsRepository {
    type Error = StoreError;

    async fn fetch_stats(
        &self,
        position: &str,
        _path_from_root: &[String],
    ) -> Result<Option<PositionStats>, StoreError> {
        let row: Option<(i64, i64, i64, String)> = sqlx::query_as(
            "SELECT white_wins, black_wins, draws, successor_moves \
             FROM position_stats WHERE fen = ?",
        )
        .bind(position)
        .fetch_optional(&self.pool)
        .await?;

        let Some((white, black, draws, successors)) = row else {
            return Ok(None);
        };

        let board = chess::parse_fen(position)
            .map_err(|_| StoreError::Position(position.to_string()))?;

        let mut moves = Vec::new();
        for token in successors.split(',').filter(|t| !t.is_empty()) {
            let child = match chess::apply_token(&board, token) {
                Ok(child) => child,
                Err(err) => {
                    tracing::warn!(%position, token, %err, "skipping unplayable stored move");
                    continue;
                }
            };
            let (w, b, d) = self
                .counters(&chess::format_fen(&child))
                .await?
                .unwrap_or((0, 0, 0));
            moves.push(MoveStats::new(token, w as u64, b as u64, d as u64));
        }

        Ok(Some(PositionStats {
            white: white as u64,
            black: black as u64,
            draws: draws as u64,
            moves,
        }))
    }
}
