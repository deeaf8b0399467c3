//! A chess position stored as one bitboard per piece, with legal move generation on top

use board::{BoardSquare, BoardSquareOffset, Color, Piece, PieceKind};

mod bitboard;
mod detailed_move;
mod fen;
mod movegen;
mod notation;

pub use crate::bitboard::Bitboard;
pub use crate::detailed_move::{DetailedMove, MoveFlags};

pub type Result<T, E = Error> = core::result::Result<T, E>;

bitflags::bitflags! {
    /// Which castles are allowed (the king and rook haven't moved yet)
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct CastleOptions: u8 {
        const WhiteKingside = 0b0000_0001;
        const WhiteQueenside = 0b0000_0010;
        /// A mask for whether white can castle in either direction
        const White = 0b0000_0011;
        const BlackKingside = 0b0000_0100;
        const BlackQueenside = 0b0000_1000;
        /// A mask for whether black can castle in either direction
        const Black = 0b0000_1100;
    }
}
impl CastleOptions {
    /// The right to castle the given way
    pub const fn right(color: Color, kingside: bool) -> Self {
        match (kingside, color) {
            (true, Color::White) => Self::WhiteKingside,
            (false, Color::White) => Self::WhiteQueenside,
            (true, Color::Black) => Self::BlackKingside,
            (false, Color::Black) => Self::BlackQueenside,
        }
    }

    /// The rights lost when a piece leaves or lands on the given square
    const fn lost_by_touching(square: BoardSquare) -> Self {
        match square {
            BoardSquare::A1 => Self::WhiteQueenside,
            BoardSquare::H1 => Self::WhiteKingside,
            BoardSquare::E1 => Self::White,
            BoardSquare::A8 => Self::BlackQueenside,
            BoardSquare::H8 => Self::BlackKingside,
            BoardSquare::E8 => Self::Black,
            _ => Self::empty(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error("invalid position: {0}")]
    InvalidPosition(String),
    #[error("board state violates an invariant: {0}")]
    CorruptState(&'static str),
    #[error("given move is not legal in this position")]
    IllegalMove,
    #[error("move notation matches multiple legal moves")]
    AmbiguousMove,
}

/// A chess position
///
/// Every piece of each color is tracked in its own bitboard. On top of the placement, this holds
/// everything FEN records: whose turn it is, castling rights, the en passant target and both
/// clocks.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BoardState {
    // piece placement
    pub white_pawn: Bitboard,
    pub white_rook: Bitboard,
    pub white_knight: Bitboard,
    pub white_bishop: Bitboard,
    pub white_queen: Bitboard,
    pub white_king: Bitboard,
    pub black_pawn: Bitboard,
    pub black_rook: Bitboard,
    pub black_knight: Bitboard,
    pub black_bishop: Bitboard,
    pub black_queen: Bitboard,
    pub black_king: Bitboard,

    // flags
    /// Whether en passant is allowed and, if so, where
    ///
    /// If no en passant is allowed, then this will be an invalid square
    pub en_passant_target: BoardSquare,
    pub side_to_move: Color,
    /// What castles are allowed, given the history of moves
    ///
    /// These castles aren't necessarily legal right now, as it may be blocked by intervening
    /// pieces and/or checks.
    pub castles: CastleOptions,

    // clocks
    /// Number of half-moves since pawn was moved or piece was captured
    ///
    /// Draw by 50 move rule when this counter hits 100
    pub halfmove_clock: u16,
    /// The number of turns elapsed in the game, starting at 1 and incremented after black moves
    pub turn_counter: u16,
}

impl BoardState {
    /// A board with no pieces on it and no moves made
    ///
    /// This has no kings, so it isn't a legal position on its own.
    pub const EMPTY: Self = Self {
        white_pawn: Bitboard::empty(),
        white_rook: Bitboard::empty(),
        white_knight: Bitboard::empty(),
        white_bishop: Bitboard::empty(),
        white_queen: Bitboard::empty(),
        white_king: Bitboard::empty(),
        black_pawn: Bitboard::empty(),
        black_rook: Bitboard::empty(),
        black_knight: Bitboard::empty(),
        black_bishop: Bitboard::empty(),
        black_queen: Bitboard::empty(),
        black_king: Bitboard::empty(),
        en_passant_target: BoardSquare::INVALID,
        side_to_move: Color::White,
        castles: CastleOptions::empty(),
        halfmove_clock: 0,
        turn_counter: 1,
    };

    /// The state at the start of a chess game
    pub const INITIAL_STATE: Self = Self {
        white_pawn: Bitboard(0xFF00),
        white_rook: Bitboard(0x81),
        white_knight: Bitboard(0x42),
        white_bishop: Bitboard(0x24),
        white_queen: Bitboard(0x08),
        white_king: Bitboard(0x10),
        black_pawn: Bitboard(0x00FF0000_00000000),
        black_rook: Bitboard(0x81000000_00000000),
        black_knight: Bitboard(0x42000000_00000000),
        black_bishop: Bitboard(0x24000000_00000000),
        black_queen: Bitboard(0x08000000_00000000),
        black_king: Bitboard(0x10000000_00000000),
        en_passant_target: BoardSquare::INVALID,
        side_to_move: Color::White,
        castles: CastleOptions::all(),
        halfmove_clock: 0,
        turn_counter: 1,
    };

    /// The squares occupied by white's pieces
    pub const fn white_bitboard(&self) -> Bitboard {
        self.white_pawn
            .union(self.white_rook)
            .union(self.white_knight)
            .union(self.white_bishop)
            .union(self.white_queen)
            .union(self.white_king)
    }

    /// The squares occupied by black's pieces
    pub const fn black_bitboard(&self) -> Bitboard {
        self.black_pawn
            .union(self.black_rook)
            .union(self.black_knight)
            .union(self.black_bishop)
            .union(self.black_queen)
            .union(self.black_king)
    }

    /// The squares occupied by the given color's pieces
    pub const fn color_bitboard(&self, color: Color) -> Bitboard {
        match color {
            Color::White => self.white_bitboard(),
            Color::Black => self.black_bitboard(),
        }
    }

    /// Returns a bitboard of all occupied squares
    pub const fn bitboard_occupied(&self) -> Bitboard {
        self.white_bitboard().union(self.black_bitboard())
    }

    /// Find the piece, if any, at the given square
    ///
    /// Returns `None` if the given square is invalid.
    ///
    /// ```
    /// use bitboard::BoardState;
    /// use board::{BoardSquare, Color, Piece, PieceKind};
    /// let board = BoardState::INITIAL_STATE;
    /// assert_eq!(board.piece_at(BoardSquare::D8), Some(Piece::new(PieceKind::Queen, Color::Black)));
    /// assert_eq!(board.piece_at(BoardSquare::D4), None);
    /// assert_eq!(board.piece_at(BoardSquare::INVALID), None);
    /// ```
    pub fn piece_at(&self, square: BoardSquare) -> Option<Piece> {
        if !square.is_valid() {
            return None;
        }
        let query_bitboard = Bitboard::from(square);
        macro_rules! check {
            ($query:ident: $($field:ident => ($color:ident, $kind:ident),)*) => {$(if $query.intersects(self.$field) {
                return Some(Piece { color: Color::$color, kind: PieceKind::$kind, })
            })*};
        }
        check!(query_bitboard:
            white_pawn => (White, Pawn),
            white_rook => (White, Rook),
            white_knight => (White, Knight),
            white_bishop => (White, Bishop),
            white_queen => (White, Queen),
            white_king => (White, King),
            black_pawn => (Black, Pawn),
            black_rook => (Black, Rook),
            black_knight => (Black, Knight),
            black_bishop => (Black, Bishop),
            black_queen => (Black, Queen),
            black_king => (Black, King),
        );
        None
    }

    /// Get the square on which the given player's King resides
    ///
    /// This is [`BoardSquare::INVALID`] if the king is missing.
    pub fn king_square(&self, color: Color) -> BoardSquare {
        self.piece_bitboard(Piece::new(PieceKind::King, color))
            .first_square()
    }

    /// Get the bitboard associated with the given piece
    pub const fn piece_bitboard(&self, piece: Piece) -> Bitboard {
        match (piece.kind, piece.color) {
            (PieceKind::Pawn, Color::White) => self.white_pawn,
            (PieceKind::Rook, Color::White) => self.white_rook,
            (PieceKind::Knight, Color::White) => self.white_knight,
            (PieceKind::Bishop, Color::White) => self.white_bishop,
            (PieceKind::Queen, Color::White) => self.white_queen,
            (PieceKind::King, Color::White) => self.white_king,
            (PieceKind::Pawn, Color::Black) => self.black_pawn,
            (PieceKind::Rook, Color::Black) => self.black_rook,
            (PieceKind::Knight, Color::Black) => self.black_knight,
            (PieceKind::Bishop, Color::Black) => self.black_bishop,
            (PieceKind::Queen, Color::Black) => self.black_queen,
            (PieceKind::King, Color::Black) => self.black_king,
        }
    }

    /// Get a mutable reference to the bitboard associated with the given piece
    pub fn piece_bitboard_mut(&mut self, piece: Piece) -> &mut Bitboard {
        match (piece.kind, piece.color) {
            (PieceKind::Pawn, Color::White) => &mut self.white_pawn,
            (PieceKind::Rook, Color::White) => &mut self.white_rook,
            (PieceKind::Knight, Color::White) => &mut self.white_knight,
            (PieceKind::Bishop, Color::White) => &mut self.white_bishop,
            (PieceKind::Queen, Color::White) => &mut self.white_queen,
            (PieceKind::King, Color::White) => &mut self.white_king,
            (PieceKind::Pawn, Color::Black) => &mut self.black_pawn,
            (PieceKind::Rook, Color::Black) => &mut self.black_rook,
            (PieceKind::Knight, Color::Black) => &mut self.black_knight,
            (PieceKind::Bishop, Color::Black) => &mut self.black_bishop,
            (PieceKind::Queen, Color::Black) => &mut self.black_queen,
            (PieceKind::King, Color::Black) => &mut self.black_king,
        }
    }

    /// Place a piece on the board, removing whatever was there before
    pub fn put(&mut self, square: BoardSquare, piece: Piece) {
        self.clear(square);
        *self.piece_bitboard_mut(piece) |= square;
    }

    /// Remove whatever piece is on the given square
    pub fn clear(&mut self, square: BoardSquare) {
        if let Some(piece) = self.piece_at(square) {
            *self.piece_bitboard_mut(piece) &= !Bitboard::from(square);
        }
    }

    /// Check the invariants move generation relies on
    ///
    /// Each color must have exactly one king, and no square may hold two pieces.
    pub fn validate(&self) -> Result<()> {
        if self.white_king.num_set() != 1 {
            return Err(Error::CorruptState("white must have exactly one king"));
        }
        if self.black_king.num_set() != 1 {
            return Err(Error::CorruptState("black must have exactly one king"));
        }
        let pieces_counted: u32 = Piece::all_pieces()
            .map(|piece| self.piece_bitboard(piece).num_set())
            .sum();
        if pieces_counted != self.bitboard_occupied().num_set() {
            return Err(Error::CorruptState("multiple pieces share a square"));
        }
        Ok(())
    }

    /// Returns `true` if any piece of color `by` attacks the given square
    ///
    /// Attacks are counted regardless of what stands on the square, including a piece of the
    /// attacking color.
    pub fn is_square_attacked(&self, square: BoardSquare, by: Color) -> bool {
        if !square.is_valid() {
            return false;
        }
        // A pawn of `by` attacks `square` from exactly the squares an opposite pawn on `square`
        // would attack
        let pawn_sources = match by {
            Color::White => Bitboard::black_pawn_attacks(square),
            Color::Black => Bitboard::white_pawn_attacks(square),
        };
        if pawn_sources.intersects(self.piece_bitboard(Piece::new(PieceKind::Pawn, by))) {
            return true;
        }
        if Bitboard::knight_moves(square)
            .intersects(self.piece_bitboard(Piece::new(PieceKind::Knight, by)))
        {
            return true;
        }
        if Bitboard::king_moves(square)
            .intersects(self.piece_bitboard(Piece::new(PieceKind::King, by)))
        {
            return true;
        }
        let occupied = self.bitboard_occupied();
        let queens = self.piece_bitboard(Piece::new(PieceKind::Queen, by));
        let straight = self.piece_bitboard(Piece::new(PieceKind::Rook, by)) | queens;
        if !straight.is_empty()
            && BoardSquareOffset::ROOK_DIRECTIONS
                .into_iter()
                .any(|dir| Bitboard::ray(square, dir, occupied).intersects(straight))
        {
            return true;
        }
        let diagonal = self.piece_bitboard(Piece::new(PieceKind::Bishop, by)) | queens;
        !diagonal.is_empty()
            && BoardSquareOffset::BISHOP_DIRECTIONS
                .into_iter()
                .any(|dir| Bitboard::ray(square, dir, occupied).intersects(diagonal))
    }

    /// Returns `true` if the given color's King is in check
    pub fn is_check(&self, color: Color) -> bool {
        self.is_square_attacked(self.king_square(color), color.other())
    }

    /// Do the move without checking if it's legal
    ///
    /// The move must come from this position's move generator; anything else leaves the board in
    /// an unspecified (but memory-safe) state.
    pub fn apply(&mut self, m: &DetailedMove) {
        let piece = m.piece();
        let source = m.source();
        let target = m.target();
        if m.is_en_passant() {
            *self.piece_bitboard_mut(Piece::new(PieceKind::Pawn, piece.color.other())) &=
                !Bitboard::from(m.en_passant_victim());
        } else if let Some(captured) = m.captured() {
            *self.piece_bitboard_mut(Piece::new(captured, piece.color.other())) &=
                !Bitboard::from(target);
        }
        *self.piece_bitboard_mut(piece) &= !Bitboard::from(source);
        *self.piece_bitboard_mut(Piece::new(m.promotion_into().unwrap_or(piece.kind), piece.color)) |=
            target;
        if let Some((rook_source, rook_target)) = m.castle_rook_squares() {
            let rook = Piece::new(PieceKind::Rook, piece.color);
            *self.piece_bitboard_mut(rook) &= !Bitboard::from(rook_source);
            *self.piece_bitboard_mut(rook) |= rook_target;
        }

        self.castles &=
            !(CastleOptions::lost_by_touching(source) | CastleOptions::lost_by_touching(target));
        self.en_passant_target = m.en_passant_response();
        if m.is_capture() || piece.kind == PieceKind::Pawn {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock = self.halfmove_clock.saturating_add(1);
        }
        if self.side_to_move == Color::Black {
            self.turn_counter = self.turn_counter.saturating_add(1);
        }
        self.side_to_move = self.side_to_move.other();
    }

    /// Returns a copy of this board after making the given move
    pub fn after(&self, m: &DetailedMove) -> Self {
        let mut board = self.clone();
        board.apply(m);
        board
    }

    /// Whether a pawn of the side to move stands ready to capture on the en passant target
    ///
    /// This only looks at placement, so a capture which would expose the king still counts.
    pub fn en_passant_capturable(&self) -> bool {
        let capturers = match self.side_to_move {
            Color::White => Bitboard::black_pawn_attacks(self.en_passant_target),
            Color::Black => Bitboard::white_pawn_attacks(self.en_passant_target),
        };
        capturers.intersects(self.piece_bitboard(Piece::new(PieceKind::Pawn, self.side_to_move)))
    }

    /// This position with both clocks zeroed, and the en passant target dropped if no pawn could
    /// take on it
    ///
    /// Two positions are repetitions of each other exactly when these are equal.
    pub fn without_clocks(&self) -> Self {
        Self {
            halfmove_clock: 0,
            turn_counter: 0,
            en_passant_target: if self.en_passant_capturable() {
                self.en_passant_target
            } else {
                BoardSquare::INVALID
            },
            ..self.clone()
        }
    }

    /// Returns `true` if neither side has the material to force checkmate
    ///
    /// This covers a lone king against a lone king, and a king with a single knight or bishop
    /// against a lone king.
    pub fn is_insufficient_material(&self) -> bool {
        let heavy = self.white_pawn
            | self.black_pawn
            | self.white_rook
            | self.black_rook
            | self.white_queen
            | self.black_queen;
        if !heavy.is_empty() {
            return false;
        }
        let minors =
            self.white_knight | self.white_bishop | self.black_knight | self.black_bishop;
        minors.num_set() <= 1
    }

    /// The number of pieces of the given kind and color on the board
    pub fn count(&self, piece: Piece) -> u32 {
        self.piece_bitboard(piece).num_set()
    }
}

impl Default for BoardState {
    fn default() -> Self {
        Self::INITIAL_STATE
    }
}
