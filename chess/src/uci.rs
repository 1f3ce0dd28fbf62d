//! Coordinate (UCI-style) move token utilities.

use cozy_chess::{File, Move, Piece, Rank, Square};

/// Convert UCI castling notation to cozy-chess notation.
///
/// UCI writes castling as a two-square king move (e1g1, e1c1, e8g8, e8c8);
/// cozy-chess encodes it king-to-rook (e1h1, e1a1, e8h8, e8a8). If the
/// move looks like a UCI castle and the converted form is legal, the
/// converted move is returned; otherwise the move is returned unchanged.
pub fn convert_uci_castling(mv: Move, legal_moves: &[Move]) -> Move {
    let is_back_rank = matches!(mv.from.rank(), Rank::First | Rank::Eighth);
    let from_e_file = matches!(mv.from.file(), File::E);
    let to_g_or_c_file = matches!(mv.to.file(), File::G | File::C);

    if is_back_rank && from_e_file && to_g_or_c_file && mv.promotion.is_none() {
        let rook_file = match mv.to.file() {
            File::G => File::H,
            _ => File::A,
        };
        let converted = Move {
            from: mv.from,
            to: Square::new(rook_file, mv.from.rank()),
            promotion: None,
        };
        if legal_moves.contains(&converted) {
            return converted;
        }
    }

    mv
}

/// Format a move in UCI notation (e.g., "e2e4", "e7e8q").
pub fn format_uci_move(mv: Move) -> String {
    let mut s = format!("{}{}", mv.from, mv.to);
    if let Some(promo) = mv.promotion {
        s.push(piece_char(promo));
    }
    s
}

fn piece_char(piece: Piece) -> char {
    match piece {
        Piece::Pawn => 'p',
        Piece::Knight => 'n',
        Piece::Bishop => 'b',
        Piece::Rook => 'r',
        Piece::Queen => 'q',
        Piece::King => 'k',
    }
}
