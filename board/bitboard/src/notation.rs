use core::str::FromStr;

use board::{
    AlgebraicNotationMove, AlgebraicNotationMoveType, AlgebraicNotationNormalMove, CheckStatus,
    Move, PieceKind,
};

use crate::{BoardState, DetailedMove, Error, MoveFlags, Result};

impl BoardState {
    /// Write the given move in standard algebraic notation
    ///
    /// The source square is only given where another piece of the same kind could reach the same
    /// target: first by file, then by rank, then both. Fails with [`Error::IllegalMove`] if the
    /// move isn't legal in this position.
    ///
    /// ```
    /// use bitboard::BoardState;
    /// let board = BoardState::INITIAL_STATE;
    /// let knight = board.resolve("g1f3").unwrap();
    /// assert_eq!(board.san(&knight).unwrap().to_string(), "Nf3");
    /// ```
    pub fn san(&self, m: &DetailedMove) -> Result<AlgebraicNotationMove> {
        let legal = self.legal_moves()?;
        if !legal.contains(m) {
            return Err(Error::IllegalMove);
        }

        let move_type = if m.flags().contains(MoveFlags::CastleKingside) {
            AlgebraicNotationMoveType::CastleKingside
        } else if m.flags().contains(MoveFlags::CastleQueenside) {
            AlgebraicNotationMoveType::CastleQueenside
        } else {
            let source = m.source();
            let (from_file, from_rank) = if m.piece().kind == PieceKind::Pawn {
                (m.is_capture().then(|| source.file_char()), None)
            } else {
                let rivals: Vec<&DetailedMove> = legal
                    .iter()
                    .filter(|other| {
                        other.piece() == m.piece()
                            && other.target() == m.target()
                            && other.source() != source
                    })
                    .collect();
                if rivals.is_empty() {
                    (None, None)
                } else if rivals.iter().all(|other| other.source().file() != source.file()) {
                    (Some(source.file_char()), None)
                } else if rivals.iter().all(|other| other.source().rank() != source.rank()) {
                    (None, Some(source.rank() + 1))
                } else {
                    (Some(source.file_char()), Some(source.rank() + 1))
                }
            };
            AlgebraicNotationMoveType::Normal(AlgebraicNotationNormalMove {
                kind: m.piece().kind,
                from_file,
                from_rank,
                capture: m.is_capture(),
                to_square: m.target(),
                promotion: m.promotion_into(),
            })
        };

        let after = self.after(m);
        let check = if !after.is_check(after.side_to_move) {
            CheckStatus::None
        } else if after.has_legal_move()? {
            CheckStatus::Check
        } else {
            CheckStatus::Checkmate
        };
        Ok(AlgebraicNotationMove { move_type, check })
    }

    /// Find the legal move written in the given notation
    ///
    /// Both coordinate notation (`e2e4`, `e7e8q`) and standard algebraic notation (`e4`, `Nxf3+`,
    /// `O-O`) are accepted. Fails with [`Error::IllegalMove`] if the text doesn't describe a legal
    /// move, and [`Error::AmbiguousMove`] if it could mean more than one.
    pub fn resolve(&self, notation: &str) -> Result<DetailedMove> {
        let legal = self.legal_moves()?;
        if let Ok(mv) = Move::from_str(notation.trim()) {
            return legal
                .into_iter()
                .find(|m| Move::from(*m) == mv)
                .ok_or(Error::IllegalMove);
        }

        let notated =
            AlgebraicNotationMove::from_str(notation).map_err(|_| Error::IllegalMove)?;
        let mut candidates = legal
            .into_iter()
            .filter(|m| matches_notation(m, &notated.move_type));
        match (candidates.next(), candidates.next()) {
            (Some(m), None) => Ok(m),
            (Some(_), Some(_)) => Err(Error::AmbiguousMove),
            (None, _) => Err(Error::IllegalMove),
        }
    }
}

/// Whether the move fits everything the notation says about it
///
/// A capture marker must match a capture, but a capture written without one is still accepted.
fn matches_notation(m: &DetailedMove, notation: &AlgebraicNotationMoveType) -> bool {
    match notation {
        AlgebraicNotationMoveType::CastleKingside => {
            m.flags().contains(MoveFlags::CastleKingside)
        }
        AlgebraicNotationMoveType::CastleQueenside => {
            m.flags().contains(MoveFlags::CastleQueenside)
        }
        AlgebraicNotationMoveType::Normal(normal) => {
            !m.is_castle()
                && m.piece().kind == normal.kind
                && m.target() == normal.to_square
                && m.promotion_into() == normal.promotion
                && (!normal.capture || m.is_capture())
                && normal
                    .from_file
                    .map_or(true, |file| m.source().file_char() == file)
                && normal
                    .from_rank
                    .map_or(true, |rank| m.source().rank() + 1 == rank)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use board::BoardSquare;

    fn play(board: &mut BoardState, moves: &[&str]) {
        for notation in moves {
            let m = board.resolve(notation).unwrap();
            board.apply(&m);
        }
    }

    #[track_caller]
    fn assert_san(fen: &str, coordinates: &str, expected: &str) {
        let board = BoardState::from_fen(fen).unwrap();
        let m = board.resolve(coordinates).unwrap();
        assert_eq!(board.san(&m).unwrap().to_string(), expected);
    }

    #[test]
    fn test_disambiguation() {
        let by_file = "4k3/8/8/8/8/8/8/1N2KN2 w - - 0 1";
        assert_san(by_file, "b1d2", "Nbd2");
        assert_san(by_file, "f1d2", "Nfd2");
        let by_rank = "4k3/8/8/8/8/N7/8/N3K3 w - - 0 1";
        assert_san(by_rank, "a1c2", "N1c2");
        assert_san(by_rank, "a3c2", "N3c2");
        let by_both = "4k3/8/8/8/8/Q7/8/Q1Q1K3 w - - 0 1";
        assert_san(by_both, "a1b2", "Qa1b2");
    }

    #[test]
    fn test_pawn_captures_and_promotions() {
        assert_san(
            "rnbqkbnr/ppp1pppp/8/3p4/4P3/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 2",
            "e4d5",
            "exd5",
        );
        assert_san("8/P7/8/8/8/8/8/k6K w - - 0 1", "a7a8q", "a8=Q+");
        assert_san("8/P7/8/8/8/8/8/k6K w - - 0 1", "a7a8n", "a8=N");
    }

    #[test]
    fn test_castling_notation() {
        let fen = "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1";
        assert_san(fen, "e1g1", "O-O");
        assert_san(fen, "e1c1", "O-O-O");
        let board = BoardState::from_fen(fen).unwrap();
        assert_eq!(
            board.resolve("O-O-O").unwrap().target(),
            BoardSquare::C1
        );
    }

    #[test]
    fn test_scholars_mate_is_marked() {
        let mut board = BoardState::INITIAL_STATE;
        play(&mut board, &["e4", "e5", "Qh5", "Nc6", "Bc4", "Nf6"]);
        let mate = board.resolve("Qxf7").unwrap();
        assert_eq!(board.san(&mate).unwrap().to_string(), "Qxf7#");
        assert_eq!(board.resolve("Qxf7#"), Ok(mate));
    }

    #[test]
    fn test_resolve_failures() {
        let board = BoardState::from_fen("4k3/8/8/8/8/8/8/1N2KN2 w - - 0 1").unwrap();
        assert_eq!(board.resolve("Nd2"), Err(Error::AmbiguousMove));
        assert_eq!(board.resolve("Nd4"), Err(Error::IllegalMove));
        assert_eq!(board.resolve("e2e4"), Err(Error::IllegalMove));
        assert_eq!(board.resolve("Nxd2"), Err(Error::IllegalMove));
        assert_eq!(board.resolve("hello"), Err(Error::IllegalMove));
        // Coordinates must name the promotion
        let promoting = BoardState::from_fen("8/P7/8/8/8/8/8/k6K w - - 0 1").unwrap();
        assert_eq!(promoting.resolve("a7a8"), Err(Error::IllegalMove));
    }

    #[test]
    fn test_san_rejects_moves_from_elsewhere() {
        let board = BoardState::INITIAL_STATE;
        let mut other = BoardState::INITIAL_STATE;
        play(&mut other, &["e4"]);
        let reply = other.resolve("e5").unwrap();
        assert_eq!(board.san(&reply), Err(Error::IllegalMove));
    }
}
