//! Write side of the store: checkpointed [`StatsSink`] for ingestion.

use sqlx::{Sqlite, SqlitePool, Transaction};

use stats::{Outcome, StatsSink};

use crate::{Database, StoreError};

const UPSERT_SQL: &str = "\
    INSERT INTO position_stats (fen, white_wins, black_wins, draws, successor_moves) \
    VALUES (?, ?, ?, ?, ?) \
    ON CONFLICT(fen) DO UPDATE SET \
        white_wins = white_wins + excluded.white_wins, \
        black_wins = black_wins + excluded.black_wins, \
        draws = draws + excluded.draws, \
        successor_moves = CASE \
            WHEN excluded.successor_moves = '' THEN successor_moves \
            WHEN successor_moves = '' THEN excluded.successor_moves \
            WHEN instr(',' || successor_moves || ',', \
                       ',' || excluded.successor_moves || ',') > 0 THEN successor_moves \
            ELSE successor_moves || ',' || excluded.successor_moves \
        END";

/// Accumulates upserts in one long-running transaction, committed when the
/// pipeline calls [`StatsSink::checkpoint`]. A crash between checkpoints
/// loses the tail written since the last commit.
pub struct SqliteIngestWriter {
    pool: SqlitePool,
    tx: Option<Transaction<'static, Sqlite>>,
}

impl SqliteIngestWriter {
    pub fn new(db: &Database) -> Self {
        Self {
            pool: db.pool().clone(),
            tx: None,
        }
    }
}

impl StatsSink for SqliteIngestWriter {
    type Error = StoreError;

    async fn record(
        &mut self,
        position: &str,
        outcome: Outcome,
        move_token: &str,
    ) -> Result<(), StoreError> {
        let (white, black, draws): (i64, i64, i64) = match outcome {
            Outcome::WhiteWin => (1, 0, 0),
            Outcome::BlackWin => (0, 1, 0),
            Outcome::Draw => (0, 0, 1),
        };

        let mut tx = match self.tx.take() {
            Some(tx) => tx,
            None => self.pool.begin().await?,
        };

        // A failed statement drops (rolls back) the transaction; the next
        // record starts a fresh one.
        sqlx::query(UPSERT_SQL)
            .bind(position)
            .bind(white)
            .bind(black)
            .bind(draws)
            .bind(move_token)
            .execute(&mut *tx)
            .await?;

        self.tx = Some(tx);
        Ok(())
    }

    async fn checkpoint(&mut self) -> Result<(), StoreError> {
        if let Some(tx) = self.tx.take() {
            tx.commit().await?;
        }
        Ok(())
    }

    async fn finish(mut self) -> Result<(), StoreError> {
        self.checkpoint().await
    }
}
