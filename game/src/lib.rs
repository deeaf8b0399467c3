//! The rules of a single game of chess: whose move it is, which moves are allowed, and when it's
//! over

use bitboard::{BoardState, DetailedMove};
use board::Move;

mod record;
mod status;

pub use record::{GameRecord, RecordEntry};
pub use status::{GameStatus, Winner};

pub type Result<T, E = Error> = core::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error("move is not legal in the current position")]
    IllegalMove,
    #[error("position after the move should be `{expected}`, but the peer reported `{received}`")]
    DesyncDetected { expected: String, received: String },
    #[error("invalid position: {0}")]
    InvalidPosition(String),
    #[error("game state violates an invariant: {0}")]
    CorruptState(&'static str),
}
impl From<bitboard::Error> for Error {
    fn from(value: bitboard::Error) -> Self {
        match value {
            bitboard::Error::InvalidPosition(reason) => Self::InvalidPosition(reason),
            bitboard::Error::CorruptState(reason) => Self::CorruptState(reason),
            bitboard::Error::IllegalMove | bitboard::Error::AmbiguousMove => Self::IllegalMove,
            _ => Self::CorruptState("unrecognized board error"),
        }
    }
}

/// A game in progress (or finished), holding every move made so far
///
/// Moves only get in through [`GameEngine::apply_move`] and [`GameEngine::load_external_move`],
/// both of which check them against the legal moves of the current position.
#[derive(Clone, Debug)]
pub struct GameEngine {
    record: GameRecord,
    status: GameStatus,
    /// The legal moves in the current position, empty once the game is over
    legal_moves: Vec<DetailedMove>,
}

impl GameEngine {
    /// A game from the standard starting position
    pub fn new() -> Self {
        let start = BoardState::INITIAL_STATE;
        Self {
            legal_moves: start.legal_moves().unwrap_or_default(),
            record: GameRecord::new(start),
            status: GameStatus::InProgress,
        }
    }

    /// A game starting from the position in the given FEN
    ///
    /// If that position is already checkmate or a draw, the game starts out finished.
    pub fn from_fen(fen: &str) -> Result<Self> {
        let start = BoardState::from_fen(fen)?;
        let legal_moves = start.legal_moves()?;
        let record = GameRecord::new(start);
        let status = evaluate(&record, &legal_moves);
        Ok(Self {
            legal_moves: if status.is_terminal() {
                Vec::new()
            } else {
                legal_moves
            },
            record,
            status,
        })
    }

    /// Make the given move, if it's legal
    ///
    /// ```
    /// use game::{GameEngine, GameStatus};
    /// let mut game = GameEngine::new();
    /// let entry = game.apply_move("e2e4".parse().unwrap()).unwrap();
    /// assert_eq!(entry.san, "e4");
    /// assert_eq!(
    ///     game.to_fen(),
    ///     "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1",
    /// );
    /// assert_eq!(game.status(), GameStatus::InProgress);
    /// ```
    pub fn apply_move(&mut self, mv: Move) -> Result<&RecordEntry> {
        let detailed = self
            .legal_moves
            .iter()
            .find(|legal| Move::from(**legal) == mv)
            .copied()
            .ok_or(Error::IllegalMove)?;
        let after = self.position().after(&detailed);
        self.commit(detailed, after)
    }

    /// Adopt a move played on a peer's board
    ///
    /// The move (in coordinates or SAN) is matched against this game's own legal moves, and the
    /// peer's reported FEN must agree with the position this game computes from it. On any
    /// failure, the game is left untouched.
    pub fn load_external_move(&mut self, fen: &str, notation: &str) -> Result<&RecordEntry> {
        if self.status.is_terminal() {
            return Err(Error::IllegalMove);
        }
        let detailed = self.position().resolve(notation)?;
        let received = BoardState::from_fen(fen)?;
        let after = self.position().after(&detailed);
        if !same_position(&after, &received) {
            log::warn!(
                "Peer reported `{}` after {notation}, expected `{}`",
                received.to_fen(),
                after.to_fen()
            );
            return Err(Error::DesyncDetected {
                expected: after.to_fen(),
                received: received.to_fen(),
            });
        }
        self.commit(detailed, after)
    }

    /// Record a move already known to be legal, and work out where that leaves the game
    fn commit(&mut self, mv: DetailedMove, after: BoardState) -> Result<&RecordEntry> {
        let san = self.position().san(&mv)?.to_string();
        let next_moves = after.legal_moves()?;
        self.record.push(RecordEntry {
            mv,
            position: after,
            san,
        });
        self.status = evaluate(&self.record, &next_moves);
        self.legal_moves = if self.status.is_terminal() {
            log::debug!("Game ended: {:?}", self.status);
            Vec::new()
        } else {
            next_moves
        };
        self.record
            .entries()
            .last()
            .ok_or(Error::CorruptState("record empty after a move"))
    }

    /// The legal moves in the current position (none once the game is over)
    pub fn current_legal_moves(&self) -> &[DetailedMove] {
        &self.legal_moves
    }

    /// Whether the side to move is in check
    pub fn is_in_check(&self) -> bool {
        let position = self.position();
        position.is_check(position.side_to_move)
    }

    pub fn to_fen(&self) -> String {
        self.position().to_fen()
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    /// The current position
    pub fn position(&self) -> &BoardState {
        self.record.current()
    }

    pub fn record(&self) -> &GameRecord {
        &self.record
    }

    /// How the game ended, if it has
    pub fn outcome(&self) -> Option<Winner> {
        self.status.winner()
    }

    /// Every move so far in standard algebraic notation
    pub fn san_history(&self) -> Vec<&str> {
        self.record
            .entries()
            .iter()
            .map(|entry| entry.san.as_str())
            .collect()
    }

    /// The moves so far as PGN movetext, like `1. e4 e5 2. Nf3`
    pub fn movetext(&self) -> String {
        self.record.movetext()
    }
}

impl Default for GameEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Work out the status of the game whose latest position has the given legal moves
///
/// The checks go in a fixed order: checkmate, stalemate, fifty moves, repetition, then
/// insufficient material.
fn evaluate(record: &GameRecord, legal_moves: &[DetailedMove]) -> GameStatus {
    let position = record.current();
    if legal_moves.is_empty() {
        if position.is_check(position.side_to_move) {
            GameStatus::checkmated(position.side_to_move)
        } else {
            GameStatus::Stalemate
        }
    } else if position.halfmove_clock >= 100 {
        GameStatus::DrawByFiftyMoveRule
    } else if record.occurrences(position) >= 3 {
        GameStatus::DrawByRepetition
    } else if position.is_insufficient_material() {
        GameStatus::DrawByInsufficientMaterial
    } else {
        GameStatus::InProgress
    }
}

/// Whether two boards describe the same position with the same clocks
///
/// An en passant target nobody can take on is ignored, since not every peer writes one.
fn same_position(a: &BoardState, b: &BoardState) -> bool {
    a.without_clocks() == b.without_clocks()
        && a.halfmove_clock == b.halfmove_clock
        && a.turn_counter == b.turn_counter
}
