use bitboard::BoardState;
use board::{Color, Piece, PieceKind};

/// The score for delivering checkmate
///
/// Mates found closer to the root score a little higher, by one per ply, so the search goes for
/// the quickest one.
pub const MATE_SCORE: i32 = 1_000_000;

/// Larger than any score a position can get
pub(crate) const INFINITY: i32 = MATE_SCORE + 1_000;

/// What a piece is worth, in tenths of a pawn
pub const fn piece_value(kind: PieceKind) -> i32 {
    match kind {
        PieceKind::Pawn => 10,
        PieceKind::Knight => 30,
        PieceKind::Bishop => 30,
        PieceKind::Rook => 50,
        PieceKind::Queen => 90,
        PieceKind::King => 900,
    }
}

/// Material balance of the position, positive when white is ahead
///
/// ```
/// use bitboard::BoardState;
/// assert_eq!(minimax::evaluate(&BoardState::INITIAL_STATE), 0);
/// ```
pub fn evaluate(board: &BoardState) -> i32 {
    Piece::all_pieces()
        .map(|piece| {
            let material = board.count(piece) as i32 * piece_value(piece.kind);
            match piece.color {
                Color::White => material,
                Color::Black => -material,
            }
        })
        .sum()
}

/// Material balance from the point of view of the side to move
pub(crate) fn evaluate_for_mover(board: &BoardState) -> i32 {
    match board.side_to_move {
        Color::White => evaluate(board),
        Color::Black => -evaluate(board),
    }
}
