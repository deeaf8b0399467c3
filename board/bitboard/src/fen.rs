use core::{fmt::Write, str::FromStr};

use board::{BoardSquare, Color, Piece};

use crate::{Bitboard, BoardState, CastleOptions, Error, Result};

/// The castling letters, in the order FEN lists them
const CASTLE_LETTERS: [(char, CastleOptions); 4] = [
    ('K', CastleOptions::WhiteKingside),
    ('Q', CastleOptions::WhiteQueenside),
    ('k', CastleOptions::BlackKingside),
    ('q', CastleOptions::BlackQueenside),
];

/// Squares on the first and last ranks, where pawns can never stand
const BACK_RANKS: Bitboard = Bitboard(0xFF000000_000000FF);

fn invalid(reason: impl Into<String>) -> Error {
    Error::InvalidPosition(reason.into())
}

impl BoardState {
    /// Encode this position in Forsyth-Edwards Notation
    ///
    /// ```
    /// use bitboard::BoardState;
    /// assert_eq!(
    ///     BoardState::INITIAL_STATE.to_fen(),
    ///     "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
    /// );
    /// ```
    pub fn to_fen(&self) -> String {
        let mut fen = String::with_capacity(90);
        for rank in (0..8).rev() {
            let mut empty = 0;
            for file in 0..8 {
                match self.piece_at(BoardSquare::from_rank_file(rank, file)) {
                    Some(piece) => {
                        if empty > 0 {
                            let _ = write!(fen, "{empty}");
                            empty = 0;
                        }
                        fen.push(piece.fen_letter());
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                let _ = write!(fen, "{empty}");
            }
            if rank > 0 {
                fen.push('/');
            }
        }

        fen.push_str(match self.side_to_move {
            Color::White => " w ",
            Color::Black => " b ",
        });

        if self.castles.is_empty() {
            fen.push('-');
        }
        for (letter, right) in CASTLE_LETTERS {
            if self.castles.contains(right) {
                fen.push(letter);
            }
        }

        let _ = write!(
            fen,
            " {} {} {}",
            self.en_passant_target.as_str_legal().unwrap_or("-"),
            self.halfmove_clock,
            self.turn_counter,
        );
        fen
    }

    /// Decode a position from Forsyth-Edwards Notation
    ///
    /// The string must have all six fields. Besides the syntax, this rejects positions which
    /// can't come up in a game: anything other than one king per color, pawns on the first or last
    /// rank, or an en passant square on the wrong rank for the side to move.
    pub fn from_fen(fen: &str) -> Result<Self> {
        let fields: Vec<&str> = fen.split_ascii_whitespace().collect();
        let &[placement, side, castling, en_passant, halfmove, fullmove] = fields.as_slice() else {
            return Err(invalid(format!(
                "expected 6 fields, found {}",
                fields.len()
            )));
        };

        let mut board = Self::EMPTY;
        board.read_placement(placement)?;

        board.side_to_move = match side {
            "w" => Color::White,
            "b" => Color::Black,
            _ => return Err(invalid(format!("unknown side to move `{side}`"))),
        };

        if castling != "-" {
            let mut remaining = &CASTLE_LETTERS[..];
            for c in castling.chars() {
                let idx = remaining
                    .iter()
                    .position(|&(letter, _)| letter == c)
                    .ok_or_else(|| invalid(format!("bad castling rights `{castling}`")))?;
                board.castles |= remaining[idx].1;
                remaining = &remaining[idx + 1..];
            }
        }

        if en_passant != "-" {
            let square = BoardSquare::from_str(en_passant)
                .map_err(|_| invalid(format!("bad en passant square `{en_passant}`")))?;
            let expected_rank = match board.side_to_move {
                Color::White => 5,
                Color::Black => 2,
            };
            if square.rank() != expected_rank {
                return Err(invalid(format!(
                    "en passant square {square} is impossible with {} to move",
                    board.side_to_move,
                )));
            }
            board.en_passant_target = square;
        }

        board.halfmove_clock = halfmove
            .parse()
            .map_err(|_| invalid(format!("bad halfmove clock `{halfmove}`")))?;
        board.turn_counter = fullmove
            .parse()
            .ok()
            .filter(|&turn: &u16| turn >= 1)
            .ok_or_else(|| invalid(format!("bad fullmove number `{fullmove}`")))?;

        if board.white_king.num_set() != 1 || board.black_king.num_set() != 1 {
            return Err(invalid("each side needs exactly one king"));
        }
        if board.is_check(board.side_to_move.other()) {
            return Err(invalid(format!(
                "{} is in check with {} to move",
                board.side_to_move.other(),
                board.side_to_move,
            )));
        }
        if (board.white_pawn | board.black_pawn).intersects(BACK_RANKS) {
            return Err(invalid("pawns on the first or last rank"));
        }
        Ok(board)
    }

    /// Fill in the pieces from the first FEN field
    fn read_placement(&mut self, placement: &str) -> Result<()> {
        let ranks: Vec<&str> = placement.split('/').collect();
        if ranks.len() != 8 {
            return Err(invalid(format!("expected 8 ranks, found {}", ranks.len())));
        }
        for (rank_text, rank) in ranks.into_iter().zip((0..8).rev()) {
            let mut file: u8 = 0;
            let mut after_digit = false;
            for c in rank_text.chars() {
                if let Some(skip) = c.to_digit(10).filter(|skip| (1..=8).contains(skip)) {
                    if after_digit {
                        return Err(invalid(format!("consecutive digits in `{rank_text}`")));
                    }
                    after_digit = true;
                    file += skip as u8;
                } else {
                    let piece = Piece::from_fen_letter(c)
                        .ok_or_else(|| invalid(format!("unknown piece `{c}`")))?;
                    after_digit = false;
                    if file >= 8 {
                        return Err(invalid(format!("rank `{rank_text}` is too long")));
                    }
                    *self.piece_bitboard_mut(piece) |= BoardSquare::from_rank_file(rank, file);
                    file += 1;
                }
                if file > 8 {
                    return Err(invalid(format!("rank `{rank_text}` is too long")));
                }
            }
            if file != 8 {
                return Err(invalid(format!("rank `{rank_text}` is too short")));
            }
        }
        Ok(())
    }
}

impl FromStr for BoardState {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_fen(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::Playout;

    use quickcheck::quickcheck;

    #[test]
    fn test_opening_position_fen_parsing() {
        assert_eq!(
            BoardState::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"),
            Ok(BoardState::INITIAL_STATE),
        );
    }

    #[test]
    fn test_fen_after_king_pawn_opening() {
        let mut board = BoardState::INITIAL_STATE;
        let e4 = board
            .legal_moves()
            .unwrap()
            .into_iter()
            .find(|m| m.to_string() == "e2e4")
            .unwrap();
        board.apply(&e4);
        assert_eq!(
            board.to_fen(),
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1",
        );
    }

    #[test]
    fn test_partial_castling_rights() {
        let fen = "r3k2r/8/8/8/8/8/8/R3K2R b Kq - 3 17";
        let board = BoardState::from_fen(fen).unwrap();
        assert_eq!(
            board.castles,
            CastleOptions::WhiteKingside | CastleOptions::BlackQueenside
        );
        assert_eq!(board.halfmove_clock, 3);
        assert_eq!(board.turn_counter, 17);
        assert_eq!(board.to_fen(), fen);
    }

    #[test]
    fn test_rejects_malformed_fen() {
        for bad in [
            "",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1 extra",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP w KQkq - 0 1",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBN w KQkq - 0 1",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNRR w KQkq - 0 1",
            "rnbqkbnr/pppppppp/44/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNX w KQkq - 0 1",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR x KQkq - 0 1",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w QK - 0 1",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KKQ - 0 1",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq e3 0 1",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq z9 0 1",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - x 1",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 0",
            "rnbqqbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBKKBNR w KQkq - 0 1",
            "rnbqkbnP/pppppppp/8/8/8/8/PPPPPPP1/RNBQKBNR w KQkq - 0 1",
            "4k3/8/8/8/8/8/8/K3R3 w - - 0 1",
            "8/8/8/3kK3/8/8/8/8 b - - 0 1",
        ] {
            assert!(
                matches!(BoardState::from_fen(bad), Err(Error::InvalidPosition(_))),
                "{bad:?} should be rejected",
            );
        }
    }

    quickcheck! {
        fn test_fen_round_trip(playout: Playout) -> bool {
            let board = playout.position;
            BoardState::from_fen(&board.to_fen()) == Ok(board)
        }
    }
}
