//! Streaming ingestion pipeline.
//!
//! One pass over a `pgn-extract --fencomments`-style dump, emitting an
//! upsert per captured `(position, next move)` pair. The parser is a
//! small state machine: header lines are consumed whole
//! (`SeekGameHeader`), then the move body is scanned byte-wise for
//! comment-delimited positions (`SeekPositionComment` /
//! `CapturePosition`) and the move token following each
//! (`CaptureMoveToken`). Running into the next game's `Event` header
//! keyword while scanning for a move is the end-of-game transition.
//!
//! Malformed bodies (unbalanced comment delimiters, movetext without
//! comments) have no recovery path: the scan may consume the rest of the
//! stream without yielding records. The report's counters make such loss
//! visible; no field value is ever guessed.

use std::io::{BufRead, Write};

use stats::{Outcome, StatsSink};

use crate::scanner::ByteScanner;
use crate::{IngestError, IngestOptions, IngestReport};

/// Tag values of interest collected from one game's header block.
#[derive(Debug, Default)]
struct GameHeader {
    result: Option<String>,
    white_elo: Option<u32>,
    black_elo: Option<u32>,
}

impl GameHeader {
    fn average_rating(&self) -> Option<f64> {
        match (self.white_elo, self.black_elo) {
            (Some(w), Some(b)) => Some((w as f64 + b as f64) / 2.0),
            _ => None,
        }
    }
}

/// What to do with a game once its header block has been read.
enum Admission {
    Ingest(Outcome),
    SkipRating,
    Unratable,
    Malformed,
}

pub struct Pipeline<R, S> {
    scanner: ByteScanner<R>,
    sink: S,
    options: IngestOptions,
    dump: Option<Box<dyn Write + Send>>,
    report: IngestReport,
    last_checkpoint: u64,
}

impl<R: BufRead, S: StatsSink> Pipeline<R, S> {
    pub fn new(input: R, sink: S, options: IngestOptions) -> Self {
        Self {
            scanner: ByteScanner::new(input),
            sink,
            options,
            dump: None,
            report: IngestReport::default(),
            last_checkpoint: 0,
        }
    }

    /// Mirror every recorded tuple to `dump` as a
    /// `rating:fen:result:move` line.
    pub fn with_dump(mut self, dump: Box<dyn Write + Send>) -> Self {
        self.dump = Some(dump);
        self
    }

    /// Consume the whole input stream, returning the final report.
    pub async fn run(mut self) -> Result<IngestReport, IngestError> {
        while let Some(header) = self.read_header()? {
            self.report.games_seen += 1;
            match self.admit(&header) {
                Admission::Ingest(outcome) => {
                    self.ingest_moves(outcome, header.average_rating()).await?;
                    self.report.games_ingested += 1;
                }
                // Rejected games are skipped without touching their move
                // bodies; the next header scan walks over the movetext.
                Admission::SkipRating => self.report.games_skipped_rating += 1,
                Admission::Unratable => self.report.games_unratable += 1,
                Admission::Malformed => self.report.games_malformed += 1,
            }
            self.maybe_checkpoint().await?;
        }

        self.sink
            .finish()
            .await
            .map_err(|e| IngestError::Sink(Box::new(e)))?;
        self.report.bytes_processed = self.scanner.bytes_consumed();
        Ok(self.report)
    }

    /// SeekGameHeader: consume lines until a header block has been read.
    /// Returns `None` once the input is exhausted.
    fn read_header(&mut self) -> Result<Option<GameHeader>, IngestError> {
        let mut header = GameHeader::default();
        let mut in_block = false;
        loop {
            let Some(line) = self.scanner.read_line()? else {
                return Ok(in_block.then_some(header));
            };
            if line.contains('[') {
                in_block = true;
                parse_header_line(&line, &mut header);
            } else if in_block {
                // First non-header line ends the block.
                return Ok(Some(header));
            }
        }
    }

    fn admit(&self, header: &GameHeader) -> Admission {
        let Some(outcome) = header
            .result
            .as_deref()
            .and_then(Outcome::from_result_tag)
        else {
            return Admission::Malformed;
        };

        if let Some(cutoff) = self.options.min_avg_rating {
            // The filter needs both ratings; a game missing either is
            // unratable and rejected rather than guessed at.
            match header.average_rating() {
                Some(avg) if avg < cutoff as f64 => return Admission::SkipRating,
                Some(_) => {}
                None => return Admission::Unratable,
            }
        }

        Admission::Ingest(outcome)
    }

    /// Alternate CapturePosition / CaptureMoveToken until the game ends.
    async fn ingest_moves(
        &mut self,
        outcome: Outcome,
        rating: Option<f64>,
    ) -> Result<(), IngestError> {
        loop {
            // SeekPositionComment.
            if !self.scanner.skip_until(b'{')? {
                return Ok(());
            }
            // CapturePosition.
            let mut raw = Vec::new();
            if !self.scanner.read_until(b'}', &mut raw)? {
                return Ok(());
            }
            let position = clean_position(&raw);

            // CaptureMoveToken.
            let (token, game_over) = self.capture_move_token()?;
            self.record(&position, outcome, &token, rating).await?;
            self.maybe_checkpoint().await?;

            if game_over {
                // The scan ran into the next game's Event header line;
                // drop its remainder so the header scan starts clean.
                self.scanner.read_line()?;
                return Ok(());
            }
        }
    }

    /// Scan forward to the move played from the position just captured.
    ///
    /// Skips non-letter bytes (move numbers, result markers, brackets),
    /// then accumulates letters, digits and hyphens (castling). Capturing
    /// the header keyword `Event` means the game has no further moves:
    /// the token is reported empty and the game marked finished.
    fn capture_move_token(&mut self) -> Result<(String, bool), IngestError> {
        let mut token = String::new();
        loop {
            match self.scanner.read_byte()? {
                None => return Ok((String::new(), true)),
                Some(b) if b.is_ascii_alphabetic() => {
                    token.push(b as char);
                    break;
                }
                Some(_) => {}
            }
        }
        loop {
            match self.scanner.read_byte()? {
                Some(b) if b.is_ascii_alphanumeric() || b == b'-' => {
                    token.push(b as char);
                }
                _ => break,
            }
        }
        if token == "Event" {
            Ok((String::new(), true))
        } else {
            Ok((token, false))
        }
    }

    async fn record(
        &mut self,
        position: &str,
        outcome: Outcome,
        token: &str,
        rating: Option<f64>,
    ) -> Result<(), IngestError> {
        self.sink
            .record(position, outcome, token)
            .await
            .map_err(|e| IngestError::Sink(Box::new(e)))?;
        self.report.positions_recorded += 1;

        if let Some(dump) = self.dump.as_mut() {
            match rating {
                Some(avg) => writeln!(dump, "{avg}:{position}:{}:{token}", outcome.result_tag())?,
                None => writeln!(dump, "?:{position}:{}:{token}", outcome.result_tag())?,
            }
        }
        Ok(())
    }

    /// Commit once the configured volume has been processed since the
    /// last commit. Deliberately volume-based, not per game.
    async fn maybe_checkpoint(&mut self) -> Result<(), IngestError> {
        let consumed = self.scanner.bytes_consumed();
        if consumed - self.last_checkpoint >= self.options.checkpoint_bytes {
            self.sink
                .checkpoint()
                .await
                .map_err(|e| IngestError::Sink(Box::new(e)))?;
            self.last_checkpoint = consumed;
            self.report.checkpoints += 1;
            tracing::info!(
                bytes = consumed,
                positions = self.report.positions_recorded,
                games = self.report.games_seen,
                "ingest checkpoint"
            );
        }
        Ok(())
    }
}

/// Parse one `[Tag "value"]` header line into the fields of interest.
/// Lines that do not match the shape are ignored.
fn parse_header_line(line: &str, header: &mut GameHeader) {
    let Some(rest) = line.trim_start().strip_prefix('[') else {
        return;
    };
    let Some((tag, rest)) = rest.split_once(' ') else {
        return;
    };
    let Some(start) = rest.find('"') else {
        return;
    };
    let rest = &rest[start + 1..];
    let Some(end) = rest.find('"') else {
        return;
    };
    let value = &rest[..end];

    match tag {
        "Result" => header.result = Some(value.to_string()),
        "WhiteElo" => header.white_elo = parse_elo(value),
        "BlackElo" => header.black_elo = parse_elo(value),
        _ => {}
    }
}

fn parse_elo(value: &str) -> Option<u32> {
    if value == "?" {
        None
    } else {
        value.parse().ok()
    }
}

/// Turn a captured comment body into a canonical position string.
///
/// Embedded line breaks become single spaces. The body arrives padded
/// with a separator on each side; a leading line break in the source can
/// add a stray one, so everything through the last separator within the
/// first few characters is stripped, then trailing separators trimmed.
fn clean_position(raw: &[u8]) -> String {
    let mut text = String::with_capacity(raw.len());
    for &b in raw {
        match b {
            b'\n' => text.push(' '),
            b'\r' => {}
            _ => text.push(b as char),
        }
    }

    let mut head = text.as_bytes().iter().take(4);
    if let Some(idx) = head.rposition(|&b| b == b' ') {
        text.drain(..=idx);
    }
    let trimmed = text.trim_end_matches(' ').len();
    text.truncate(trimmed);
    text
}
