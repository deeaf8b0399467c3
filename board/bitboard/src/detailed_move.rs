use core::fmt;

use board::{BoardSquare, Color, Move, Piece, PieceKind};

bitflags::bitflags! {
    /// Facts about a move which follow from the position it was generated in
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct MoveFlags: u8 {
        const Capture = 0b0000_0001;
        const EnPassant = 0b0000_0010;
        const CastleKingside = 0b0000_0100;
        const CastleQueenside = 0b0000_1000;
        /// A mask for either castle
        const Castle = 0b0000_1100;
        const DoublePawnPush = 0b0001_0000;
    }
}

/// All the details of a move figured out
///
/// These are only produced by the move generator, so the flags always agree with the position the
/// move was generated from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DetailedMove {
    piece: Piece,
    source: BoardSquare,
    target: BoardSquare,
    promotion_into: Option<PieceKind>,
    captured: Option<PieceKind>,
    flags: MoveFlags,
}
impl DetailedMove {
    /// A quiet move or capture, with the capture derived from `captured`
    pub(crate) const fn new(
        piece: Piece,
        source: BoardSquare,
        target: BoardSquare,
        captured: Option<PieceKind>,
    ) -> Self {
        Self {
            piece,
            source,
            target,
            promotion_into: None,
            captured,
            flags: if captured.is_some() {
                MoveFlags::Capture
            } else {
                MoveFlags::empty()
            },
        }
    }

    pub(crate) const fn promoting(self, kind: PieceKind) -> Self {
        Self {
            promotion_into: Some(kind),
            ..self
        }
    }

    pub(crate) const fn double_push(piece: Piece, source: BoardSquare, target: BoardSquare) -> Self {
        Self {
            flags: MoveFlags::DoublePawnPush,
            ..Self::new(piece, source, target, None)
        }
    }

    pub(crate) const fn en_passant(color: Color, source: BoardSquare, target: BoardSquare) -> Self {
        Self {
            flags: MoveFlags::Capture.union(MoveFlags::EnPassant),
            ..Self::new(
                Piece::new(PieceKind::Pawn, color),
                source,
                target,
                Some(PieceKind::Pawn),
            )
        }
    }

    /// The castle for the given side, moving the king from the e-file to the c- or g-file
    pub(crate) const fn castle(color: Color, kingside: bool) -> Self {
        let rank = match color {
            Color::White => 0,
            Color::Black => 7,
        };
        let (target_file, flags) = if kingside {
            (6, MoveFlags::CastleKingside)
        } else {
            (2, MoveFlags::CastleQueenside)
        };
        Self {
            flags,
            ..Self::new(
                Piece::new(PieceKind::King, color),
                BoardSquare::from_rank_file(rank, 4),
                BoardSquare::from_rank_file(rank, target_file),
                None,
            )
        }
    }

    pub const fn piece(&self) -> Piece {
        self.piece
    }

    pub const fn source(&self) -> BoardSquare {
        self.source
    }

    pub const fn target(&self) -> BoardSquare {
        self.target
    }

    pub const fn promotion_into(&self) -> Option<PieceKind> {
        self.promotion_into
    }

    /// The kind of piece removed from the board by this move, if any
    pub const fn captured(&self) -> Option<PieceKind> {
        self.captured
    }

    pub const fn flags(&self) -> MoveFlags {
        self.flags
    }

    pub const fn is_capture(&self) -> bool {
        self.flags.contains(MoveFlags::Capture)
    }

    pub const fn is_en_passant(&self) -> bool {
        self.flags.contains(MoveFlags::EnPassant)
    }

    pub const fn is_castle(&self) -> bool {
        self.flags.intersects(MoveFlags::Castle)
    }

    /// The squares the rook moves between when this move is a castle
    pub(crate) const fn castle_rook_squares(&self) -> Option<(BoardSquare, BoardSquare)> {
        let rank = self.source.rank();
        if self.flags.contains(MoveFlags::CastleKingside) {
            Some((
                BoardSquare::from_rank_file(rank, 7),
                BoardSquare::from_rank_file(rank, 5),
            ))
        } else if self.flags.contains(MoveFlags::CastleQueenside) {
            Some((
                BoardSquare::from_rank_file(rank, 0),
                BoardSquare::from_rank_file(rank, 3),
            ))
        } else {
            None
        }
    }

    /// The square of the pawn removed by an en passant capture
    pub(crate) const fn en_passant_victim(&self) -> BoardSquare {
        self.target.offset(-self.piece.color.pawn_direction(), 0)
    }

    /// Returns the square against which the opponent may respond with an en passant.
    ///
    /// If this move is not a double pawn move, then this is [`BoardSquare::INVALID`].
    pub(crate) const fn en_passant_response(&self) -> BoardSquare {
        if self.flags.contains(MoveFlags::DoublePawnPush) {
            self.source.offset(self.piece.color.pawn_direction(), 0)
        } else {
            BoardSquare::INVALID
        }
    }
}
impl From<DetailedMove> for Move {
    fn from(value: DetailedMove) -> Self {
        Self {
            source: value.source,
            target: value.target,
            promotion: value.promotion_into,
        }
    }
}

/// Long algebraic notation, the same as the [`Move`] it boils down to
impl fmt::Display for DetailedMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&Move::from(*self), f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_castle_construction() {
        let castle = DetailedMove::castle(Color::Black, false);
        assert_eq!(castle.source(), BoardSquare::E8);
        assert_eq!(castle.target(), BoardSquare::C8);
        assert!(castle.is_castle());
        assert!(!castle.is_capture());
        assert_eq!(
            castle.castle_rook_squares(),
            Some((BoardSquare::A8, BoardSquare::D8))
        );
        assert_eq!(
            DetailedMove::castle(Color::White, true).castle_rook_squares(),
            Some((BoardSquare::H1, BoardSquare::F1))
        );
    }

    #[test]
    fn test_en_passant_squares() {
        let push = DetailedMove::double_push(
            Piece::new(PieceKind::Pawn, Color::White),
            BoardSquare::E2,
            BoardSquare::E4,
        );
        assert_eq!(push.en_passant_response(), BoardSquare::E3);
        let capture = DetailedMove::en_passant(Color::Black, BoardSquare::D4, BoardSquare::E3);
        assert!(capture.is_capture() && capture.is_en_passant());
        assert_eq!(capture.en_passant_victim(), BoardSquare::E4);
        assert_eq!(capture.captured(), Some(PieceKind::Pawn));
    }

    #[test]
    fn test_long_algebraic_conversion() {
        let mv = DetailedMove::new(
            Piece::new(PieceKind::Pawn, Color::White),
            BoardSquare::B7,
            BoardSquare::A8,
            Some(PieceKind::Rook),
        )
        .promoting(PieceKind::Queen);
        assert_eq!(Move::from(mv).to_string(), "b7a8q");
    }
}
