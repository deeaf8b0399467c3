use core::{
    fmt,
    ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, Not},
};

use board::{BoardSquare, BoardSquareOffset};

/// A bitboard (which is equivalent to a `u64`)
///
/// Bit `n` is set if the square with [`BoardSquare::index`] `n` is selected.
#[repr(transparent)]
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct Bitboard(pub u64);

/// Boilerplate reduction for optimization
///
/// This macro takes a normal function from a board square to a bitboard and precomputes a fixed
/// array of all possible inputs and their answers, to optimize.
///
/// This also only calls the method for legal board squares, and returns an empty bitboard for an
/// invalid input.
macro_rules! method_via_boardsquare_array {
    ( $(
        $( #[$meta:meta] )*
        $vis:vis $(const)? fn $fun_name:ident($square:ident: BoardSquare) -> Self
            $eval:block
    )* ) => { $(
        $(#[$meta])*
        $vis const fn $fun_name(square: BoardSquare) -> Self {
            /// Cache containing the answers
            const VALUES: [Bitboard; 256] = {
                let mut values = [Bitboard::empty(); 256];
                let mut idx: usize = 0;
                while idx < 256 {
                    if idx & 0x88 == 0 {
                        let $square = BoardSquare(idx as u8);
                        let bitboard = $eval;
                        values[idx] = bitboard;
                    }
                    idx += 1;
                }
                values
            };
            VALUES[square.0 as usize]
        }
    )* };
}

/// Union the bitboards of every valid square among the given offsets from a square
const fn union_of_offsets(square: BoardSquare, offsets: &[BoardSquareOffset]) -> Bitboard {
    let mut board = Bitboard::empty();
    let mut idx = 0;
    while idx < offsets.len() {
        let target = offsets[idx].offset(square);
        if target.is_valid() {
            board = board.union(Bitboard(1u64 << target.index()));
        }
        idx += 1;
    }
    board
}

impl Bitboard {
    /// Create an empty bitboard
    pub const fn empty() -> Self {
        Self(0)
    }

    method_via_boardsquare_array! {
        /// Produce a bitboard from the given board square.
        ///
        /// If the board square is invalid, this return the empty bitboard.
        pub const fn from_board_square(square: BoardSquare) -> Self {
            Bitboard(1u64 << ((((square.0 & 0x70) >> 1) | (square.0 & 0x07)) as u64))
        }

        /// Get all the squares that are a king move away
        ///
        /// This only includes normal king moves, not castling, and never the square itself.
        pub const fn king_moves(square: BoardSquare) -> Self {
            union_of_offsets(square, &BoardSquareOffset::KING_MOVES)
        }

        /// Get all the squares that are a knight move away
        pub const fn knight_moves(square: BoardSquare) -> Self {
            union_of_offsets(square, &BoardSquareOffset::KNIGHT_MOVES)
        }

        /// Get the squares that a white pawn can threaten
        pub const fn white_pawn_attacks(square: BoardSquare) -> Self {
            union_of_offsets(square, &BoardSquareOffset::WHITE_PAWN_ATTACKS)
        }

        /// Get the squares that a black pawn can threaten
        pub const fn black_pawn_attacks(square: BoardSquare) -> Self {
            union_of_offsets(square, &BoardSquareOffset::BLACK_PAWN_ATTACKS)
        }
    }

    /// The squares along one ray from `square`, stopping at (and including) the first square in
    /// `blockers`.
    ///
    /// ```
    /// use bitboard::Bitboard;
    /// use board::{BoardSquare, BoardSquareOffset};
    /// let up = BoardSquareOffset::from_rank_file(1, 0);
    /// let ray = Bitboard::ray(BoardSquare::A1, up, Bitboard::from(BoardSquare::A3));
    /// assert_eq!(ray, Bitboard::from(BoardSquare::A2) | BoardSquare::A3);
    /// assert_eq!(Bitboard::ray(BoardSquare::A1, up, Bitboard::empty()).num_set(), 7);
    /// ```
    pub fn ray(square: BoardSquare, direction: BoardSquareOffset, blockers: Self) -> Self {
        let mut ray = Bitboard::empty();
        let mut next = direction.offset(square);
        while next.is_valid() {
            ray |= next;
            if blockers.intersects(Bitboard::from(next)) {
                break;
            }
            next = direction.offset(next);
        }
        ray
    }

    /// Query if the bitboard is empty
    ///
    /// ```
    /// use bitboard::Bitboard;
    /// assert!(Bitboard::empty().is_empty());
    /// assert!(!Bitboard(0x01).is_empty());
    /// ```
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns true if `self & other` is not empty
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    /// Returns true if `self & other == other`
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Produce an iterator of all selected board squares from a bitboard, in ascending order
    ///
    /// ```
    /// use board::BoardSquare;
    /// use bitboard::{Bitboard, BoardState};
    /// assert_eq!(Bitboard::empty().squares_iter().count(), 0);
    /// assert_eq!(
    ///     BoardState::INITIAL_STATE.white_rook.squares_iter().collect::<Vec<_>>(),
    ///     vec![BoardSquare::A1, BoardSquare::H1],
    /// );
    /// assert_eq!(
    ///     BoardState::INITIAL_STATE.black_knight.squares_iter().collect::<Vec<_>>(),
    ///     vec![BoardSquare::B8, BoardSquare::G8],
    /// );
    /// assert_eq!(Bitboard(!0).squares_iter().count(), 64);
    /// ```
    pub fn squares_iter(self) -> impl Iterator<Item = BoardSquare> {
        let mut remaining = self.0;
        core::iter::from_fn(move || {
            if remaining == 0 {
                return None;
            }
            let idx = remaining.trailing_zeros() as usize;
            remaining &= remaining - 1;
            Some(BoardSquare::from_index(idx))
        })
    }

    /// The lowest selected square, or [`BoardSquare::INVALID`] if nothing is selected
    pub fn first_square(self) -> BoardSquare {
        if self.is_empty() {
            BoardSquare::INVALID
        } else {
            BoardSquare::from_index(self.0.trailing_zeros() as usize)
        }
    }

    /// Returns the number of bits which are set
    pub fn num_set(self) -> u32 {
        self.0.count_ones()
    }
}

/// Bit-wise operations for combining things
///
/// These are `const` equivalents to `&`, `|`, `!`
impl Bitboard {
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub const fn intersection(self, other: Self) -> Self {
        Self(self.0 & other.0)
    }

    pub const fn negation(self) -> Self {
        Self(!self.0)
    }
}

impl BitOr<Bitboard> for Bitboard {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.union(rhs)
    }
}
impl BitOr<BoardSquare> for Bitboard {
    type Output = Self;

    fn bitor(self, rhs: BoardSquare) -> Self::Output {
        self.union(Self::from(rhs))
    }
}
impl<T> BitOrAssign<T> for Bitboard
where
    Bitboard: BitOr<T, Output = Bitboard>,
{
    fn bitor_assign(&mut self, rhs: T) {
        *self = *self | rhs
    }
}
impl BitAnd<Bitboard> for Bitboard {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        self.intersection(rhs)
    }
}
impl<T> BitAndAssign<T> for Bitboard
where
    Bitboard: BitAnd<T, Output = Bitboard>,
{
    fn bitand_assign(&mut self, rhs: T) {
        *self = *self & rhs
    }
}
impl Not for Bitboard {
    type Output = Self;
    fn not(self) -> Self::Output {
        self.negation()
    }
}

impl From<BoardSquare> for Bitboard {
    fn from(value: BoardSquare) -> Self {
        Self::from_board_square(value)
    }
}
impl fmt::Debug for Bitboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Bitboard")
            .field(&format_args!("{:X}", self.0))
            .finish()
    }
}
/// Display as a TUI version of a grid
///
/// ```
/// use bitboard::Bitboard;
/// use board::BoardSquare;
///
/// assert_eq!(
///     Bitboard::from(BoardSquare::A1).to_string(),
///     "        \n        \n        \n        \n        \n        \n        \nX       \n",
/// );
/// assert_eq!(
///     Bitboard::from(BoardSquare::H8).to_string(),
///     "       X\n        \n        \n        \n        \n        \n        \n        \n",
/// );
/// ```
impl fmt::Display for Bitboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use fmt::Write;
        for rank in (0..=7).rev() {
            for file in 0..=7 {
                f.write_char(if self.0 & (1 << (rank * 8 + file)) == 0 {
                    ' '
                } else {
                    'X'
                })?;
            }
            f.write_char('\n')?;
        }
        Ok(())
    }
}
