//! Chess-rules adapter over cozy-chess.
//!
//! The rest of the workspace treats positions as canonical FEN strings and
//! moves as opaque tokens; this crate is the only place either is
//! interpreted. [`apply_token`] accepts both coordinate (UCI) tokens and
//! the SAN-ish tokens the ingestion pipeline captures from game dumps.

pub mod fen;
pub mod san;
pub mod uci;

pub use cozy_chess::{Board, Color, Move};
pub use fen::{format_fen, parse_fen, FenError};
pub use san::{parse_san, SanError};
pub use uci::{convert_uci_castling, format_uci_move};

/// Failure to apply a move token to a position.
#[derive(Debug, thiserror::Error)]
pub enum MoveError {
    #[error("move {0} is not legal in this position")]
    Illegal(String),
    #[error(transparent)]
    San(#[from] san::SanError),
}

/// All legal moves in `board`, in generation order.
pub fn legal_moves(board: &Board) -> Vec<Move> {
    let mut moves = Vec::new();
    board.generate_moves(|batch| {
        moves.extend(batch);
        false
    });
    moves
}

/// Apply a move token to a board, returning the resulting board.
///
/// Coordinate tokens (`e2e4`, `e7e8q`) are tried first, with UCI castling
/// notation converted to cozy-chess's king-takes-rook encoding; anything
/// else is parsed as SAN (`Nf3`, `exd5`, `O-O`).
pub fn apply_token(board: &Board, token: &str) -> Result<Board, MoveError> {
    let legal = legal_moves(board);

    let mv = match token.parse::<Move>() {
        Ok(parsed) => {
            let converted = convert_uci_castling(parsed, &legal);
            if !legal.contains(&converted) {
                return Err(MoveError::Illegal(token.to_string()));
            }
            converted
        }
        Err(_) => parse_san(board, token)?,
    };

    let mut next = board.clone();
    next.try_play(mv)
        .map_err(|_| MoveError::Illegal(token.to_string()))?;
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;

    const STARTPOS: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    #[test]
    fn test_apply_uci_token() {
        let board = parse_fen(STARTPOS).unwrap();
        let next = apply_token(&board, "e2e4").unwrap();
        assert!(format_fen(&next).starts_with("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq"));
    }

    #[test]
    fn test_apply_san_token() {
        let board = parse_fen(STARTPOS).unwrap();
        let next = apply_token(&board, "Nf3").unwrap();
        assert_eq!(next.side_to_move(), Color::Black);
        assert!(format_fen(&next).starts_with("rnbqkbnr/pppppppp/8/8/8/5N2/"));
    }

    #[test]
    fn test_apply_castling_tokens() {
        // Both sides ready to castle kingside.
        let fen = "r1bqk2r/pppp1ppp/2n2n2/2b1p3/2B1P3/2N2N2/PPPP1PPP/R1BQK2R w KQkq - 6 5";
        let board = parse_fen(fen).unwrap();

        // UCI king-two-squares form.
        let after_uci = apply_token(&board, "e1g1").unwrap();
        // SAN form.
        let after_san = apply_token(&board, "O-O").unwrap();
        assert_eq!(format_fen(&after_uci), format_fen(&after_san));
    }

    #[test]
    fn test_apply_illegal_token() {
        let board = parse_fen(STARTPOS).unwrap();
        assert!(matches!(
            apply_token(&board, "e2e5"),
            Err(MoveError::Illegal(_))
        ));
    }

    #[test]
    fn test_apply_unparseable_token() {
        let board = parse_fen(STARTPOS).unwrap();
        assert!(apply_token(&board, "??").is_err());
    }
}
