//! Vocabulary types shared by every part of the chess workspace
//!
//! Squares, pieces, colors and the two textual move formats (coordinate moves like `e2e4` and
//! standard algebraic notation like `Nxf3+`) live here, without any knowledge of a position.

use core::{fmt, str::FromStr};
use std::error;

/// The types of pieces there are
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PieceKind {
    Pawn,
    Rook,
    Knight,
    Bishop,
    Queen,
    King,
}
impl PieceKind {
    /// All the kinds of pieces there are
    pub const KINDS: [PieceKind; 6] = [
        Self::Pawn,
        Self::Rook,
        Self::Knight,
        Self::Bishop,
        Self::Queen,
        Self::King,
    ];

    /// The kinds a pawn may promote into, in the order moves are generated
    pub const PROMOTIONS: [PieceKind; 4] = [Self::Queen, Self::Rook, Self::Bishop, Self::Knight];

    /// The capitalized version of the letter used for this piece in FEN
    pub const fn fen_letter(self) -> char {
        match self {
            Self::Pawn => 'P',
            Self::Rook => 'R',
            Self::Knight => 'N',
            Self::Bishop => 'B',
            Self::Queen => 'Q',
            Self::King => 'K',
        }
    }

    /// Parse a piece kind from its letter, in either case
    ///
    /// ```
    /// use board::PieceKind;
    /// assert_eq!(PieceKind::from_letter('n'), Some(PieceKind::Knight));
    /// assert_eq!(PieceKind::from_letter('K'), Some(PieceKind::King));
    /// assert_eq!(PieceKind::from_letter('x'), None);
    /// ```
    pub const fn from_letter(letter: char) -> Option<Self> {
        match letter.to_ascii_uppercase() {
            'P' => Some(Self::Pawn),
            'R' => Some(Self::Rook),
            'N' => Some(Self::Knight),
            'B' => Some(Self::Bishop),
            'Q' => Some(Self::Queen),
            'K' => Some(Self::King),
            _ => None,
        }
    }

    /// Whether a pawn can promote into this kind of piece
    pub const fn is_promotable(self) -> bool {
        match self {
            PieceKind::Pawn | PieceKind::King => false,
            PieceKind::Rook | PieceKind::Queen | PieceKind::Knight | PieceKind::Bishop => true,
        }
    }
}

/// The colors a piece can have
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum Color {
    White,
    Black,
}
impl Color {
    pub const fn other(self) -> Self {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// The direction this color's pawns advance in, in ranks
    pub const fn pawn_direction(self) -> i8 {
        match self {
            Color::White => 1,
            Color::Black => -1,
        }
    }

    /// The rank (0-indexed) on which this color's pawns start
    pub const fn pawn_start_rank(self) -> u8 {
        match self {
            Color::White => 1,
            Color::Black => 6,
        }
    }

    /// The rank (0-indexed) on which this color's pawns promote
    pub const fn promotion_rank(self) -> u8 {
        match self {
            Color::White => 7,
            Color::Black => 0,
        }
    }
}
/// Lowercase name, as used on the wire
impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Color::White => "white",
            Color::Black => "black",
        })
    }
}

/// A piece
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Piece {
    pub kind: PieceKind,
    pub color: Color,
}
impl Piece {
    pub const fn new(kind: PieceKind, color: Color) -> Self {
        Self { kind, color }
    }

    pub const fn fen_letter(self) -> char {
        match self.color {
            Color::White => self.kind.fen_letter().to_ascii_uppercase(),
            Color::Black => self.kind.fen_letter().to_ascii_lowercase(),
        }
    }

    /// Parse a piece from its FEN letter, where the case gives the color
    ///
    /// ```
    /// use board::{Color, Piece, PieceKind};
    /// assert_eq!(Piece::from_fen_letter('q'), Some(Piece::new(PieceKind::Queen, Color::Black)));
    /// assert_eq!(Piece::from_fen_letter('N'), Some(Piece::new(PieceKind::Knight, Color::White)));
    /// ```
    pub fn from_fen_letter(letter: char) -> Option<Self> {
        let kind = PieceKind::from_letter(letter)?;
        let color = if letter.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        Some(Self { kind, color })
    }

    /// Returns an iterator of all pieces that exist
    pub fn all_pieces() -> impl Iterator<Item = Self> {
        [Color::White, Color::Black]
            .into_iter()
            .flat_map(|color| PieceKind::KINDS.into_iter().map(move |kind| Self { kind, color }))
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct AlgebraicNotationMoveParseError;
impl fmt::Display for AlgebraicNotationMoveParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("move notation was invalid")
    }
}
impl error::Error for AlgebraicNotationMoveParseError {}

/// The data parsed out from a move in standard algebraic notation
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct AlgebraicNotationMove {
    /// What move happened on the board
    pub move_type: AlgebraicNotationMoveType,
    /// Whether the move leaves the opponent in check(mate)
    pub check: CheckStatus,
}
impl fmt::Display for AlgebraicNotationMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.move_type, self.check)
    }
}
impl FromStr for AlgebraicNotationMove {
    type Err = AlgebraicNotationMoveParseError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Annotations like `!?` carry no information about the move itself
        let s = s.trim().trim_end_matches(['!', '?']);
        let (check, s) = match s.strip_suffix('+') {
            Some(rest) => (CheckStatus::Check, rest),
            None => match s.strip_suffix('#') {
                Some(rest) => (CheckStatus::Checkmate, rest),
                None => (CheckStatus::None, s),
            },
        };
        Ok(Self {
            move_type: s.parse()?,
            check,
        })
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum AlgebraicNotationMoveType {
    /// A move which isn't a castle (because those are notated entirely unrelatedly)
    Normal(AlgebraicNotationNormalMove),
    CastleKingside,
    CastleQueenside,
}
impl fmt::Display for AlgebraicNotationMoveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Normal(mv) => fmt::Display::fmt(mv, f),
            Self::CastleKingside => f.write_str("O-O"),
            Self::CastleQueenside => f.write_str("O-O-O"),
        }
    }
}
impl FromStr for AlgebraicNotationMoveType {
    type Err = AlgebraicNotationMoveParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "O-O" | "0-0" => Self::CastleKingside,
            "O-O-O" | "0-0-0" => Self::CastleQueenside,
            _ => Self::Normal(s.parse()?),
        })
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum CheckStatus {
    None,
    Check,
    Checkmate,
}
/// Returns the status as appended to a move in algebraic notation
impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::None => "",
            Self::Check => "+",
            Self::Checkmate => "#",
        })
    }
}

/// All the data from a move that isn't a castle
///
/// This doesn't include the check status after the move, because that is shared with castling in
/// the [`AlgebraicNotationMove`] struct.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct AlgebraicNotationNormalMove {
    pub kind: PieceKind,
    pub from_file: Option<char>,
    pub from_rank: Option<u8>,
    pub capture: bool,
    pub to_square: BoardSquare,
    pub promotion: Option<PieceKind>,
}
impl fmt::Display for AlgebraicNotationNormalMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.kind != PieceKind::Pawn {
            write!(f, "{}", self.kind.fen_letter())?;
        }
        if let Some(file) = self.from_file {
            write!(f, "{file}")?;
        }
        if let Some(rank) = self.from_rank {
            write!(f, "{rank}")?;
        }
        if self.capture {
            f.write_str("x")?;
        }
        f.write_str(self.to_square.as_str())?;
        if let Some(promotion) = self.promotion {
            write!(f, "={}", promotion.fen_letter())?;
        }
        Ok(())
    }
}
impl FromStr for AlgebraicNotationNormalMove {
    type Err = AlgebraicNotationMoveParseError;

    fn from_str(mut s: &str) -> Result<Self, Self::Err> {
        let kind = match s.chars().next() {
            Some(c @ ('R' | 'N' | 'B' | 'Q' | 'K')) => {
                s = &s[1..];
                PieceKind::from_letter(c).ok_or(AlgebraicNotationMoveParseError)?
            }
            _ => PieceKind::Pawn,
        };
        let promotion = match s.rsplit_once('=') {
            Some((rest, promoted)) => {
                let mut letters = promoted.chars();
                let promoted = match (letters.next(), letters.next()) {
                    (Some(c), None) => PieceKind::from_letter(c)
                        .filter(|kind| kind.is_promotable())
                        .ok_or(AlgebraicNotationMoveParseError)?,
                    _ => return Err(AlgebraicNotationMoveParseError),
                };
                s = rest;
                Some(promoted)
            }
            None => None,
        };
        if promotion.is_some() && kind != PieceKind::Pawn {
            return Err(AlgebraicNotationMoveParseError);
        }
        let split = s
            .len()
            .checked_sub(2)
            .ok_or(AlgebraicNotationMoveParseError)?;
        let to_square = s
            .get(split..)
            .and_then(|square| BoardSquare::from_str(square).ok())
            .ok_or(AlgebraicNotationMoveParseError)?;
        s = &s[..split];
        let capture = match s.strip_suffix('x') {
            Some(rest) => {
                s = rest;
                true
            }
            None => false,
        };
        let mut chars = s.chars().peekable();
        let from_file = chars.next_if(|&c| matches!(c, 'a'..='h'));
        let from_rank = chars
            .next_if(|&c| matches!(c, '1'..='8'))
            .map(|c| c as u8 - b'0');
        if chars.next().is_some() {
            return Err(AlgebraicNotationMoveParseError);
        }
        Ok(Self {
            kind,
            from_file,
            from_rank,
            capture,
            to_square,
            promotion,
        })
    }
}

/// A move given only by where it starts, where it ends, and what it promotes into
///
/// This is what travels between the players and the engine: the rest of a move's details are
/// derived from the position it's played in.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct Move {
    pub source: BoardSquare,
    pub target: BoardSquare,
    pub promotion: Option<PieceKind>,
}
impl Move {
    pub const fn new(source: BoardSquare, target: BoardSquare) -> Self {
        Self {
            source,
            target,
            promotion: None,
        }
    }

    pub const fn with_promotion(self, promotion: PieceKind) -> Self {
        Self {
            promotion: Some(promotion),
            ..self
        }
    }
}
/// Long algebraic notation, as used by UCI
///
/// ```
/// use board::{BoardSquare, Move, PieceKind};
/// assert_eq!(Move::new(BoardSquare::E2, BoardSquare::E4).to_string(), "e2e4");
/// assert_eq!(
///     Move::new(BoardSquare::A7, BoardSquare::A8).with_promotion(PieceKind::Knight).to_string(),
///     "a7a8n",
/// );
/// ```
impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.source, self.target)?;
        if let Some(promotion) = self.promotion {
            write!(f, "{}", promotion.fen_letter().to_ascii_lowercase())?;
        }
        Ok(())
    }
}
impl FromStr for Move {
    type Err = AlgebraicNotationMoveParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let source = s
            .get(0..2)
            .and_then(|square| square.parse().ok())
            .ok_or(AlgebraicNotationMoveParseError)?;
        let target = s
            .get(2..4)
            .and_then(|square| square.parse().ok())
            .ok_or(AlgebraicNotationMoveParseError)?;
        let promotion = match s.get(4..) {
            Some("") => None,
            Some(letter) => {
                let mut chars = letter.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Some(
                        PieceKind::from_letter(c)
                            .filter(|kind| kind.is_promotable())
                            .ok_or(AlgebraicNotationMoveParseError)?,
                    ),
                    _ => return Err(AlgebraicNotationMoveParseError),
                }
            }
            None => return Err(AlgebraicNotationMoveParseError),
        };
        Ok(Self {
            source,
            target,
            promotion,
        })
    }
}

/// An index on the board
///
/// Stored in 0x88 method:
/// ```text
/// 0b12345678
///        +-+ Rank
///    +-+ File
///   +   + Must be zero, invalid position if 1
/// ```
///
/// Each square is represented in one byte, and this format makes it easy to do operations and
/// check if the resulting square is valid and on the board. Comparing squares orders them a1, b1,
/// ..., h1, a2, ..., h8.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BoardSquare(pub u8);

macro_rules! square_consts {
    ($($name:ident = $value:literal),* $(,)?) => {
        $(pub const $name: Self = Self($value);)*
    };
}

impl BoardSquare {
    /// An invalid square
    ///
    /// Please use this instead of making your own so it's obvious if a deliberately-invalid square
    /// appeared.
    pub const INVALID: Self = Self(0xee);

    square_consts! {
        A1 = 0x00, B1 = 0x01, C1 = 0x02, D1 = 0x03, E1 = 0x04, F1 = 0x05, G1 = 0x06, H1 = 0x07,
        A2 = 0x10, B2 = 0x11, C2 = 0x12, D2 = 0x13, E2 = 0x14, F2 = 0x15, G2 = 0x16, H2 = 0x17,
        A3 = 0x20, B3 = 0x21, C3 = 0x22, D3 = 0x23, E3 = 0x24, F3 = 0x25, G3 = 0x26, H3 = 0x27,
        A4 = 0x30, B4 = 0x31, C4 = 0x32, D4 = 0x33, E4 = 0x34, F4 = 0x35, G4 = 0x36, H4 = 0x37,
        A5 = 0x40, B5 = 0x41, C5 = 0x42, D5 = 0x43, E5 = 0x44, F5 = 0x45, G5 = 0x46, H5 = 0x47,
        A6 = 0x50, B6 = 0x51, C6 = 0x52, D6 = 0x53, E6 = 0x54, F6 = 0x55, G6 = 0x56, H6 = 0x57,
        A7 = 0x60, B7 = 0x61, C7 = 0x62, D7 = 0x63, E7 = 0x64, F7 = 0x65, G7 = 0x66, H7 = 0x67,
        A8 = 0x70, B8 = 0x71, C8 = 0x72, D8 = 0x73, E8 = 0x74, F8 = 0x75, G8 = 0x76, H8 = 0x77,
    }

    /// Returns if this square is valid
    ///
    /// ```
    /// # use board::BoardSquare;
    /// assert!(!BoardSquare::INVALID.is_valid());
    /// ```
    pub const fn is_valid(self) -> bool {
        self.0 & 0x88 == 0
    }

    /// Converts self to a valid string, if legal
    pub const fn as_str_legal(self) -> Option<&'static str> {
        const NAMES: [[&str; 8]; 8] = [
            ["a1", "b1", "c1", "d1", "e1", "f1", "g1", "h1"],
            ["a2", "b2", "c2", "d2", "e2", "f2", "g2", "h2"],
            ["a3", "b3", "c3", "d3", "e3", "f3", "g3", "h3"],
            ["a4", "b4", "c4", "d4", "e4", "f4", "g4", "h4"],
            ["a5", "b5", "c5", "d5", "e5", "f5", "g5", "h5"],
            ["a6", "b6", "c6", "d6", "e6", "f6", "g6", "h6"],
            ["a7", "b7", "c7", "d7", "e7", "f7", "g7", "h7"],
            ["a8", "b8", "c8", "d8", "e8", "f8", "g8", "h8"],
        ];
        match self.to_rank_file() {
            Some((rank, file)) => Some(NAMES[rank as usize][file as usize]),
            None => None,
        }
    }

    /// Converts self to the string name for this position, or `"XX"` if illegal
    pub const fn as_str(self) -> &'static str {
        match self.as_str_legal() {
            Some(s) => s,
            None => "XX",
        }
    }

    /// Produce a board square from the rank and file, returning [`Self::INVALID`]` if the rank and
    /// file are not a valid square.
    pub const fn from_rank_file(rank: u8, file: u8) -> Self {
        if rank < 8 && file < 8 {
            Self(rank << 4 | file)
        } else {
            Self::INVALID
        }
    }

    /// Returns the `(rank, file)` tuple if this position is valid
    pub const fn to_rank_file(self) -> Option<(u8, u8)> {
        if self.is_valid() {
            Some((self.0 >> 4, self.0 & 0x07))
        } else {
            None
        }
    }

    /// The 0-indexed rank, meaningless for invalid squares
    pub const fn rank(self) -> u8 {
        (self.0 >> 4) & 0x07
    }

    /// The 0-indexed file, meaningless for invalid squares
    pub const fn file(self) -> u8 {
        self.0 & 0x07
    }

    /// The letter naming this square's file
    pub const fn file_char(self) -> char {
        (b'a' + self.file()) as char
    }

    /// The index of this square in a 64-entry array (or bit in a `u64`), `a1` being 0
    pub const fn index(self) -> usize {
        ((self.0 >> 1) & 0x38 | self.0 & 0x07) as usize
    }

    /// The square of the given index in a 64-entry array, the inverse of [`Self::index`]
    ///
    /// ```
    /// use board::BoardSquare;
    /// assert_eq!(BoardSquare::from_index(BoardSquare::G7.index()), BoardSquare::G7);
    /// assert_eq!(BoardSquare::from_index(64), BoardSquare::INVALID);
    /// ```
    pub const fn from_index(idx: usize) -> Self {
        if idx < 64 {
            Self::from_rank_file((idx >> 3) as u8, (idx & 0x07) as u8)
        } else {
            Self::INVALID
        }
    }

    /// Offset the given number of ranks and files.
    ///
    /// Positive rank moves from a towards h, while positive file moves towards bigger numbers.
    ///
    /// ```rust
    /// use board::BoardSquare;
    /// assert_eq!(BoardSquare::D2, BoardSquare::A1.offset(1, 3));
    /// assert_eq!(BoardSquare::A1, BoardSquare::D2.offset(-1, -3));
    /// assert_eq!(BoardSquare::F7, BoardSquare::F7.offset(0, 0));
    /// assert!(!BoardSquare::D1.offset(-1, 0).is_valid());
    /// assert!(!BoardSquare::D8.offset(1, 0).is_valid());
    /// assert!(!BoardSquare::A4.offset(0, -1).is_valid());
    /// assert!(!BoardSquare::H4.offset(0, 1).is_valid());
    /// ```
    pub const fn offset(self, rank: i8, file: i8) -> Self {
        BoardSquareOffset::from_rank_file(rank, file).offset(self)
    }

    /// An iterator over all valid squares on the board, in ascending order
    ///
    /// ```
    /// use board::BoardSquare;
    /// assert_eq!(BoardSquare::all_squares().count(), 64);
    /// assert!(BoardSquare::all_squares().zip(BoardSquare::all_squares().skip(1)).all(|(a, b)| a < b));
    /// ```
    pub fn all_squares() -> impl Iterator<Item = Self> {
        (0..64).map(Self::from_index)
    }
}
impl fmt::Debug for BoardSquare {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoardSquare")
            .field("repr", &format_args!("{:X}", self.0))
            .field("readable", &self.as_str_legal().unwrap_or("illegal"))
            .finish()
    }
}
impl fmt::Display for BoardSquare {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
#[derive(Debug)]
pub struct BoardSquareFromStrErr;
impl fmt::Display for BoardSquareFromStrErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("board position string was invalid")
    }
}
impl error::Error for BoardSquareFromStrErr {}
impl FromStr for BoardSquare {
    type Err = BoardSquareFromStrErr;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.as_bytes() {
            &[file @ b'a'..=b'h', rank @ b'1'..=b'8'] => {
                Ok(Self::from_rank_file(rank - b'1', file - b'a'))
            }
            _ => Err(BoardSquareFromStrErr),
        }
    }
}

/// An offset on a board
///
/// This struct stores any possible offset in both rank and file between any two squares, using
/// only one byte of space.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct BoardSquareOffset(u8);
impl BoardSquareOffset {
    /// The offsets corresponding to all possible knight moves
    pub const KNIGHT_MOVES: [BoardSquareOffset; 8] = [
        Self::from_rank_file(2, 1),
        Self::from_rank_file(2, -1),
        Self::from_rank_file(-2, 1),
        Self::from_rank_file(-2, -1),
        Self::from_rank_file(1, 2),
        Self::from_rank_file(1, -2),
        Self::from_rank_file(-1, 2),
        Self::from_rank_file(-1, -2),
    ];

    /// The offsets corresponding to all possible king moves
    pub const KING_MOVES: [BoardSquareOffset; 8] = [
        Self::from_rank_file(1, 1),
        Self::from_rank_file(1, 0),
        Self::from_rank_file(1, -1),
        Self::from_rank_file(0, 1),
        Self::from_rank_file(0, -1),
        Self::from_rank_file(-1, 1),
        Self::from_rank_file(-1, 0),
        Self::from_rank_file(-1, -1),
    ];

    /// The single steps a rook slides along
    pub const ROOK_DIRECTIONS: [BoardSquareOffset; 4] = [
        Self::from_rank_file(1, 0),
        Self::from_rank_file(-1, 0),
        Self::from_rank_file(0, 1),
        Self::from_rank_file(0, -1),
    ];

    /// The single steps a bishop slides along
    pub const BISHOP_DIRECTIONS: [BoardSquareOffset; 4] = [
        Self::from_rank_file(1, 1),
        Self::from_rank_file(1, -1),
        Self::from_rank_file(-1, 1),
        Self::from_rank_file(-1, -1),
    ];

    /// The moves a white pawn can make to attack
    pub const WHITE_PAWN_ATTACKS: [BoardSquareOffset; 2] =
        [Self::from_rank_file(1, -1), Self::from_rank_file(1, 1)];

    /// The moves a black pawn can make to attack
    pub const BLACK_PAWN_ATTACKS: [BoardSquareOffset; 2] =
        [Self::from_rank_file(-1, -1), Self::from_rank_file(-1, 1)];

    /// This is an invalid offset that, when applied to any [`BoardSquare`], invalidates it.
    pub const INVALID: Self = Self(0x88);

    /// Produce a new offset from the given rank and file amounts
    ///
    /// In debug mode, we assert that the rank and file are both on the interval [-7,7] (which are
    /// the only possible offsets). In release mode, we wrap modulo 16 and allow for -8, which
    /// invalidates any square.
    pub const fn from_rank_file(rank: i8, file: i8) -> Self {
        debug_assert!(-8 < rank && rank < 8);
        debug_assert!(-8 < file && file < 8);
        Self(((rank as u8) << 4) & 0xF0 | (file as u8) & 0x0F)
    }

    /// The offsets a pawn of the given color attacks along, lower file first
    pub const fn pawn_attacks(color: Color) -> [BoardSquareOffset; 2] {
        match color {
            Color::White => Self::WHITE_PAWN_ATTACKS,
            Color::Black => Self::BLACK_PAWN_ATTACKS,
        }
    }

    /// Offset the given board square
    ///
    /// If the square is already invalid, then the same square is returned unchanged.
    pub const fn offset(self, square: BoardSquare) -> BoardSquare {
        if square.is_valid() {
            BoardSquare(((self.0 & 0x77) + square.0) ^ (self.0 & 0x88))
        } else {
            square
        }
    }

    /// Gets the signed number of files associated with this offset
    pub const fn file(self) -> i8 {
        (self.0 as i8) << 4 >> 4
    }

    /// Gets the signed number of ranks associated with this offset
    pub const fn rank(self) -> i8 {
        (self.0 as i8) >> 4
    }
}
