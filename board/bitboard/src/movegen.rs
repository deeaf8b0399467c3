use board::{BoardSquare, BoardSquareOffset, Color, Piece, PieceKind};

use crate::{Bitboard, BoardState, CastleOptions, DetailedMove, Result};

impl BoardState {
    /// All legal moves for the side to move
    ///
    /// Moves are listed by source square ascending (a1, b1, ..., h8), and for each piece in a fixed
    /// rule order: pawns push, double push, capture towards the a-file, capture towards the h-file,
    /// then capture en passant; promotions go queen, rook, bishop, knight. Sliders walk their rays
    /// in table order, and the king tries its eight steps before castling kingside then
    /// queenside.
    ///
    /// Fails with [`crate::Error::CorruptState`] if the position doesn't have exactly one king of
    /// each color.
    ///
    /// ```
    /// use bitboard::BoardState;
    /// let moves = BoardState::INITIAL_STATE.legal_moves().unwrap();
    /// assert_eq!(moves.len(), 20);
    /// assert_eq!(moves[0].to_string(), "b1c3");
    /// ```
    pub fn legal_moves(&self) -> Result<Vec<DetailedMove>> {
        self.validate()?;
        let mut moves = Vec::with_capacity(48);
        for source in self.color_bitboard(self.side_to_move).squares_iter() {
            self.pseudo_legal_moves_from(source, &mut moves);
        }
        moves.retain(|m| self.keeps_king_safe(m));
        Ok(moves)
    }

    /// Whether the side to move has any legal move at all
    ///
    /// This gives up looking as soon as one is found, so it's cheaper than
    /// [`Self::legal_moves`] for telling checkmate and stalemate apart from a live position.
    pub fn has_legal_move(&self) -> Result<bool> {
        self.validate()?;
        let mut moves = Vec::with_capacity(28);
        for source in self.color_bitboard(self.side_to_move).squares_iter() {
            moves.clear();
            self.pseudo_legal_moves_from(source, &mut moves);
            if moves.iter().any(|m| self.keeps_king_safe(m)) {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Returns `true` if making the move leaves the mover's own king unattacked
    fn keeps_king_safe(&self, m: &DetailedMove) -> bool {
        !self.after(m).is_check(m.piece().color)
    }

    /// Push every move the piece on `source` could make, ignoring whether its own king is left in
    /// check afterwards
    fn pseudo_legal_moves_from(&self, source: BoardSquare, moves: &mut Vec<DetailedMove>) {
        let Some(piece) = self.piece_at(source) else {
            return;
        };
        match piece.kind {
            PieceKind::Pawn => self.pawn_moves(piece, source, moves),
            PieceKind::Knight => {
                self.step_moves(piece, source, &BoardSquareOffset::KNIGHT_MOVES, moves)
            }
            PieceKind::Bishop => {
                self.slide_moves(piece, source, &BoardSquareOffset::BISHOP_DIRECTIONS, moves)
            }
            PieceKind::Rook => {
                self.slide_moves(piece, source, &BoardSquareOffset::ROOK_DIRECTIONS, moves)
            }
            PieceKind::Queen => {
                self.slide_moves(piece, source, &BoardSquareOffset::ROOK_DIRECTIONS, moves);
                self.slide_moves(piece, source, &BoardSquareOffset::BISHOP_DIRECTIONS, moves);
            }
            PieceKind::King => {
                self.step_moves(piece, source, &BoardSquareOffset::KING_MOVES, moves);
                for kingside in [true, false] {
                    if self.can_castle(piece.color, kingside) {
                        moves.push(DetailedMove::castle(piece.color, kingside));
                    }
                }
            }
        }
    }

    /// The kind of the opposing piece on the square, if any
    fn enemy_at(&self, square: BoardSquare, color: Color) -> Option<PieceKind> {
        self.piece_at(square)
            .filter(|piece| piece.color != color)
            .map(|piece| piece.kind)
    }

    fn pawn_moves(&self, pawn: Piece, source: BoardSquare, moves: &mut Vec<DetailedMove>) {
        let color = pawn.color;
        let occupied = self.bitboard_occupied();
        let push_pawn_move = |moves: &mut Vec<DetailedMove>, mv: DetailedMove| {
            if mv.target().rank() == color.promotion_rank() {
                moves.extend(PieceKind::PROMOTIONS.map(|kind| mv.promoting(kind)));
            } else {
                moves.push(mv);
            }
        };

        let single = source.offset(color.pawn_direction(), 0);
        if single.is_valid() && !occupied.intersects(Bitboard::from(single)) {
            push_pawn_move(moves, DetailedMove::new(pawn, source, single, None));
            let double = single.offset(color.pawn_direction(), 0);
            if source.rank() == color.pawn_start_rank()
                && !occupied.intersects(Bitboard::from(double))
            {
                moves.push(DetailedMove::double_push(pawn, source, double));
            }
        }

        for attack in BoardSquareOffset::pawn_attacks(color) {
            let target = attack.offset(source);
            if let Some(captured) = self.enemy_at(target, color) {
                push_pawn_move(moves, DetailedMove::new(pawn, source, target, Some(captured)));
            }
        }

        if self.en_passant_target.is_valid()
            && BoardSquareOffset::pawn_attacks(color)
                .into_iter()
                .any(|attack| attack.offset(source) == self.en_passant_target)
        {
            let capture = DetailedMove::en_passant(color, source, self.en_passant_target);
            // A stale or hand-written target with no pawn to take behind it is ignored
            if self.piece_at(capture.en_passant_victim())
                == Some(Piece::new(PieceKind::Pawn, color.other()))
                && self.piece_at(self.en_passant_target).is_none()
            {
                moves.push(capture);
            }
        }
    }

    /// Moves for pieces which jump a fixed offset (knights and kings, minus castling)
    fn step_moves(
        &self,
        piece: Piece,
        source: BoardSquare,
        offsets: &[BoardSquareOffset],
        moves: &mut Vec<DetailedMove>,
    ) {
        let own = self.color_bitboard(piece.color);
        for offset in offsets {
            let target = offset.offset(source);
            if target.is_valid() && !own.intersects(Bitboard::from(target)) {
                let captured = self.enemy_at(target, piece.color);
                moves.push(DetailedMove::new(piece, source, target, captured));
            }
        }
    }

    fn slide_moves(
        &self,
        piece: Piece,
        source: BoardSquare,
        directions: &[BoardSquareOffset],
        moves: &mut Vec<DetailedMove>,
    ) {
        let own = self.color_bitboard(piece.color);
        for direction in directions {
            let mut target = direction.offset(source);
            while target.is_valid() && !own.intersects(Bitboard::from(target)) {
                let captured = self.enemy_at(target, piece.color);
                moves.push(DetailedMove::new(piece, source, target, captured));
                if captured.is_some() {
                    break;
                }
                target = direction.offset(target);
            }
        }
    }

    /// Whether the given castle is legal right now
    fn can_castle(&self, color: Color, kingside: bool) -> bool {
        if !self.castles.contains(CastleOptions::right(color, kingside)) {
            return false;
        }
        let castle = DetailedMove::castle(color, kingside);
        let Some((rook_source, _)) = castle.castle_rook_squares() else {
            return false;
        };
        if self.piece_at(castle.source()) != Some(Piece::new(PieceKind::King, color))
            || self.piece_at(rook_source) != Some(Piece::new(PieceKind::Rook, color))
        {
            return false;
        }
        let rank = castle.source().rank();
        let (between, king_path) = if kingside {
            (&[5, 6][..], [5, 6])
        } else {
            (&[1, 2, 3][..], [3, 2])
        };
        let occupied = self.bitboard_occupied();
        if between.iter().any(|&file| {
            occupied.intersects(Bitboard::from(BoardSquare::from_rank_file(rank, file)))
        }) {
            return false;
        }
        !self.is_check(color)
            && king_path.into_iter().all(|file| {
                !self.is_square_attacked(BoardSquare::from_rank_file(rank, file), color.other())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{tests::Playout, Error};

    use quickcheck::quickcheck;

    fn perft(board: &BoardState, depth: u32) -> u64 {
        let moves = board.legal_moves().unwrap();
        if depth == 1 {
            return moves.len() as u64;
        }
        moves
            .iter()
            .map(|m| perft(&board.after(m), depth - 1))
            .sum()
    }

    #[track_caller]
    fn assert_perft(fen: &str, expected: &[u64]) {
        let board = BoardState::from_fen(fen).unwrap();
        for (depth, &count) in expected.iter().enumerate() {
            assert_eq!(
                perft(&board, depth as u32 + 1),
                count,
                "perft({}) of {fen}",
                depth + 1,
            );
        }
    }

    #[test]
    fn perft_initial_position() {
        assert_perft(
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
            &[20, 400, 8902],
        );
    }

    #[test]
    fn perft_kiwipete() {
        assert_perft(
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
            &[48, 2039, 97862],
        );
    }

    #[test]
    fn perft_rook_endgame() {
        assert_perft("8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1", &[14, 191, 2812]);
    }

    #[test]
    fn perft_promotions_and_castling() {
        assert_perft(
            "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1",
            &[6, 264, 9467],
        );
        assert_perft(
            "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
            &[44, 1486],
        );
    }

    #[test]
    fn test_moves_ordered_by_source_square() {
        let moves = BoardState::INITIAL_STATE.legal_moves().unwrap();
        assert!(moves
            .windows(2)
            .all(|pair| pair[0].source() <= pair[1].source()));
        let pawn_moves: Vec<String> = moves
            .iter()
            .filter(|m| m.source() == BoardSquare::E2)
            .map(|m| m.to_string())
            .collect();
        assert_eq!(pawn_moves, ["e2e3", "e2e4"]);
    }

    #[test]
    fn test_castling_blocked_by_attacked_square() {
        // The black rook on f8 covers f1, so white can only castle queenside
        let board = BoardState::from_fen("5rk1/8/8/8/8/8/8/R3K2R w KQ - 0 1").unwrap();
        let castles: Vec<String> = board
            .legal_moves()
            .unwrap()
            .into_iter()
            .filter(|m| m.is_castle())
            .map(|m| m.to_string())
            .collect();
        assert_eq!(castles, ["e1c1"]);
    }

    #[test]
    fn test_no_castling_out_of_check() {
        let board = BoardState::from_fen("4r1k1/8/8/8/8/8/8/R3K2R w KQ - 0 1").unwrap();
        assert!(board.is_check(Color::White));
        assert!(!board.legal_moves().unwrap().iter().any(|m| m.is_castle()));
    }

    #[test]
    fn test_en_passant_generated() {
        let board =
            BoardState::from_fen("rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3")
                .unwrap();
        let en_passant: Vec<DetailedMove> = board
            .legal_moves()
            .unwrap()
            .into_iter()
            .filter(|m| m.is_en_passant())
            .collect();
        assert_eq!(en_passant.len(), 1);
        assert_eq!(en_passant[0].to_string(), "e5f6");
        let after = board.after(&en_passant[0]);
        assert_eq!(after.piece_at(BoardSquare::F5), None);
        assert_eq!(
            after.piece_at(BoardSquare::F6),
            Some(Piece::new(PieceKind::Pawn, Color::White))
        );
    }

    #[test]
    fn test_pinned_piece_cannot_move() {
        let board = BoardState::from_fen("4r1k1/8/8/8/8/8/4N3/4K3 w - - 0 1").unwrap();
        assert!(!board
            .legal_moves()
            .unwrap()
            .iter()
            .any(|m| m.source() == BoardSquare::E2));
    }

    #[test]
    fn test_checkmate_and_stalemate_have_no_moves() {
        let mate =
            BoardState::from_fen("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3")
                .unwrap();
        assert!(mate.legal_moves().unwrap().is_empty());
        assert_eq!(mate.has_legal_move(), Ok(false));
        assert!(mate.is_check(Color::White));

        let stalemate = BoardState::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        assert_eq!(stalemate.has_legal_move(), Ok(false));
        assert!(!stalemate.is_check(Color::Black));
    }

    #[test]
    fn test_missing_king_is_corrupt() {
        let mut board = BoardState::INITIAL_STATE;
        board.black_king = Bitboard::empty();
        assert!(matches!(board.legal_moves(), Err(Error::CorruptState(_))));
        assert!(matches!(board.has_legal_move(), Err(Error::CorruptState(_))));
    }

    quickcheck! {
        fn test_legal_moves_never_leave_king_in_check(playout: Playout) -> bool {
            let board = playout.position;
            let mover = board.side_to_move;
            board
                .legal_moves()
                .unwrap()
                .iter()
                .all(|m| !board.after(m).is_check(mover))
        }

        fn test_has_legal_move_agrees_with_legal_moves(playout: Playout) -> bool {
            let board = playout.position;
            board.has_legal_move().unwrap() == !board.legal_moves().unwrap().is_empty()
        }
    }
}
