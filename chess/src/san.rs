//! Standard Algebraic Notation (SAN) move parsing.
//!
//! Tokens captured from game dumps are SAN with decorations partially
//! stripped (`Nf3`, `exd5`, `O-O`, sometimes a bare `e8` where the
//! promotion suffix was cut off). Parsing works by filtering the legal
//! moves of the position against the constraints the token encodes, so a
//! token either resolves to exactly one legal move or fails loudly.

use cozy_chess::{Board, Color, File, Move, Piece, Rank, Square};

use crate::legal_moves;

/// Parse a SAN move token against a position.
pub fn parse_san(board: &Board, san: &str) -> Result<Move, SanError> {
    let stripped = san.trim_end_matches(['+', '#', '!', '?']);
    if stripped.is_empty() || !stripped.is_ascii() {
        return Err(SanError::InvalidFormat(san.to_string()));
    }

    let legal = legal_moves(board);

    match stripped {
        "O-O" | "0-0" => return castling_move(board, &legal, File::H, san),
        "O-O-O" | "0-0-0" => return castling_move(board, &legal, File::A, san),
        _ => {}
    }

    let (body, promotion) = split_promotion(stripped)?;
    if body.len() < 2 {
        return Err(SanError::InvalidFormat(san.to_string()));
    }
    let (head, square_str) = body.split_at(body.len() - 2);
    let dest = parse_square(square_str)?;

    let (piece, disambig) = match head.chars().next() {
        Some(c) if is_piece_char(c) => (piece_from_char(c), &head[1..]),
        _ => (Piece::Pawn, head),
    };
    let disambig = disambig.strip_suffix('x').unwrap_or(disambig);
    let (want_file, want_rank) = parse_disambiguation(disambig, san)?;

    let mut candidates = legal.iter().copied().filter(|mv| {
        board.piece_on(mv.from) == Some(piece)
            && mv.to == dest
            && mv.promotion == promotion
            && want_file.map_or(true, |f| mv.from.file() == f)
            && want_rank.map_or(true, |r| mv.from.rank() == r)
    });

    match (candidates.next(), candidates.next()) {
        (Some(mv), None) => Ok(mv),
        (Some(_), Some(_)) => Err(SanError::Ambiguous(san.to_string())),
        (None, _) => Err(SanError::NoLegalMove(san.to_string())),
    }
}

/// Find the legal castling move toward `rook_file` for the side to move.
/// cozy-chess encodes castling as the king capturing its own rook.
fn castling_move(
    board: &Board,
    legal: &[Move],
    rook_file: File,
    san: &str,
) -> Result<Move, SanError> {
    let rank = match board.side_to_move() {
        Color::White => Rank::First,
        Color::Black => Rank::Eighth,
    };
    let from = Square::new(File::E, rank);
    let to = Square::new(rook_file, rank);
    legal
        .iter()
        .copied()
        .find(|mv| mv.from == from && mv.to == to && board.piece_on(mv.from) == Some(Piece::King))
        .ok_or_else(|| SanError::NoLegalMove(san.to_string()))
}

/// Split a trailing promotion designator off the token: `e8=Q` and the
/// bare-suffix form `e8Q` both yield (`e8`, queen).
fn split_promotion(s: &str) -> Result<(&str, Option<Piece>), SanError> {
    if let Some(idx) = s.find('=') {
        let rest = &s[idx + 1..];
        let mut chars = rest.chars();
        return match (chars.next(), chars.next()) {
            (Some(c), None) if is_promotion_char(c) => Ok((&s[..idx], Some(piece_from_char(c)))),
            _ => Err(SanError::InvalidPromotion(s.to_string())),
        };
    }

    let bytes = s.as_bytes();
    if bytes.len() >= 3 {
        let last = bytes[bytes.len() - 1] as char;
        if is_promotion_char(last) && bytes[bytes.len() - 2].is_ascii_digit() {
            return Ok((&s[..s.len() - 1], Some(piece_from_char(last))));
        }
    }

    Ok((s, None))
}

fn parse_square(s: &str) -> Result<Square, SanError> {
    s.parse()
        .map_err(|_| SanError::InvalidSquare(s.to_string()))
}

fn parse_disambiguation(
    disambig: &str,
    san: &str,
) -> Result<(Option<File>, Option<Rank>), SanError> {
    let mut want_file = None;
    let mut want_rank = None;
    for c in disambig.chars() {
        match c {
            'a'..='h' => want_file = File::try_index(c as usize - 'a' as usize),
            '1'..='8' => want_rank = Rank::try_index(c as usize - '1' as usize),
            _ => return Err(SanError::InvalidFormat(san.to_string())),
        }
    }
    Ok((want_file, want_rank))
}

fn is_piece_char(c: char) -> bool {
    matches!(c, 'K' | 'Q' | 'R' | 'B' | 'N')
}

fn is_promotion_char(c: char) -> bool {
    matches!(c, 'Q' | 'R' | 'B' | 'N')
}

fn piece_from_char(c: char) -> Piece {
    match c {
        'K' => Piece::King,
        'Q' => Piece::Queen,
        'R' => Piece::Rook,
        'B' => Piece::Bishop,
        _ => Piece::Knight,
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SanError {
    #[error("no legal move matches: {0}")]
    NoLegalMove(String),
    #[error("ambiguous move: {0}")]
    Ambiguous(String),
    #[error("invalid format: {0}")]
    InvalidFormat(String),
    #[error("invalid square: {0}")]
    InvalidSquare(String),
    #[error("invalid promotion: {0}")]
    InvalidPromotion(String),
}
