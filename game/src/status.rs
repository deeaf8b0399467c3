use core::fmt;

use board::Color;

/// Where a game stands
///
/// Every status other than [`GameStatus::InProgress`] is final.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GameStatus {
    InProgress,
    CheckmateWhiteWins,
    CheckmateBlackWins,
    Stalemate,
    /// The same position (clocks aside) came up for the third time
    DrawByRepetition,
    /// A hundred half-moves passed without a capture or pawn move
    DrawByFiftyMoveRule,
    /// Neither side has enough material left to ever checkmate
    DrawByInsufficientMaterial,
}
impl GameStatus {
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::InProgress)
    }

    /// The checkmate status where the given color is the one mated
    pub const fn checkmated(loser: Color) -> Self {
        match loser {
            Color::White => Self::CheckmateBlackWins,
            Color::Black => Self::CheckmateWhiteWins,
        }
    }

    /// How the game turned out, or `None` while it's still being played
    ///
    /// ```
    /// use game::{GameStatus, Winner};
    /// assert_eq!(GameStatus::CheckmateBlackWins.winner(), Some(Winner::Black));
    /// assert_eq!(GameStatus::Stalemate.winner(), Some(Winner::Draw));
    /// assert_eq!(GameStatus::InProgress.winner(), None);
    /// ```
    pub const fn winner(self) -> Option<Winner> {
        match self {
            Self::InProgress => None,
            Self::CheckmateWhiteWins => Some(Winner::White),
            Self::CheckmateBlackWins => Some(Winner::Black),
            Self::Stalemate
            | Self::DrawByRepetition
            | Self::DrawByFiftyMoveRule
            | Self::DrawByInsufficientMaterial => Some(Winner::Draw),
        }
    }
}

/// The result of a finished game
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum Winner {
    White,
    Black,
    Draw,
}
impl From<Color> for Winner {
    fn from(color: Color) -> Self {
        match color {
            Color::White => Self::White,
            Color::Black => Self::Black,
        }
    }
}
impl fmt::Display for Winner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::White => "white",
            Self::Black => "black",
            Self::Draw => "draw",
        })
    }
}
