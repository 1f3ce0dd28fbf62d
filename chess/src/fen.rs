use cozy_chess::Board;

/// Parse a canonical position string (a FEN record) into a board.
pub fn parse_fen(fen: &str) -> Result<Board, FenError> {
    fen.trim()
        .parse()
        .map_err(|_| FenError::Invalid(fen.to_string()))
}

/// Format a board as its canonical position string.
///
/// This is the string used to key the statistics store; equality is
/// textual, so every lookup must go through this one formatter.
pub fn format_fen(board: &Board) -> String {
    board.to_string()
}

#[derive(Debug, thiserror::Error)]
pub enum FenError {
    #[error("invalid FEN: {0:?}")]
    Invalid(String),
}
