use core::fmt;
use std::time::Instant;

use board::Color;
use game::GameEngine;
use minimax::Difficulty;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The name clients use for a room
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(String);
impl RoomId {
    /// A fresh id which no other room will get
    pub fn random() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
impl From<&str> for RoomId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}
impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One live client connection
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);
impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}
impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}
impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0.simple(), f)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoomStatus {
    WaitingForOpponent,
    Active,
    /// The game is over or a player left; the room goes away once the grace period has passed
    Ended { at: Instant },
}

/// Who the first participant plays against
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Opponent {
    /// A second participant, who plays black
    Human,
    /// The search engine, playing `color`
    Engine { difficulty: Difficulty, color: Color },
}

/// A game and the connections playing it
#[derive(Debug)]
pub struct Room {
    pub(crate) id: RoomId,
    /// In seating order: for a human game the first is white and the second black
    pub(crate) participants: Vec<ConnectionId>,
    pub(crate) engine: GameEngine,
    pub(crate) status: RoomStatus,
    pub(crate) opponent: Opponent,
    /// Bumped on every change, so a search started on an older state can be recognized
    pub(crate) generation: u64,
    /// Whether the engine is thinking about its move
    pub(crate) search_pending: bool,
    /// Set once the room is taken out of the table
    pub(crate) removed: bool,
}

impl Room {
    pub(crate) fn new(id: RoomId, creator: ConnectionId, opponent: Opponent) -> Self {
        Self {
            id,
            participants: vec![creator],
            engine: GameEngine::new(),
            status: match opponent {
                Opponent::Human => RoomStatus::WaitingForOpponent,
                Opponent::Engine { .. } => RoomStatus::Active,
            },
            opponent,
            generation: 0,
            search_pending: false,
            removed: false,
        }
    }

    pub fn id(&self) -> &RoomId {
        &self.id
    }

    pub fn participants(&self) -> &[ConnectionId] {
        &self.participants
    }

    pub fn status(&self) -> RoomStatus {
        self.status
    }

    pub fn opponent(&self) -> Opponent {
        self.opponent
    }

    pub fn engine(&self) -> &GameEngine {
        &self.engine
    }

    /// The color the given connection plays, if it plays in this room
    pub fn color_of(&self, connection: ConnectionId) -> Option<Color> {
        let seat = self.participants.iter().position(|&c| c == connection)?;
        Some(match (self.opponent, seat) {
            (Opponent::Engine { color, .. }, _) => color.other(),
            (Opponent::Human, 0) => Color::White,
            (Opponent::Human, _) => Color::Black,
        })
    }

    /// The other human in the room, if there is one
    pub(crate) fn other_participant(&self, connection: ConnectionId) -> Option<ConnectionId> {
        self.participants.iter().copied().find(|&c| c != connection)
    }

    pub(crate) fn is_engine_turn(&self) -> bool {
        matches!(
            self.opponent,
            Opponent::Engine { color, .. } if color == self.engine.position().side_to_move
        )
    }

    pub(crate) fn end(&mut self, at: Instant) {
        if !matches!(self.status, RoomStatus::Ended { .. }) {
            self.status = RoomStatus::Ended { at };
        }
        self.search_pending = false;
        self.touch();
    }

    pub(crate) fn touch(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }
}
