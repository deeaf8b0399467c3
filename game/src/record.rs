use core::fmt::Write;

use bitboard::{BoardState, DetailedMove};
use board::Color;

/// One move of a game, with the position it produced
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordEntry {
    pub mv: DetailedMove,
    /// The position after the move was made
    pub position: BoardState,
    /// The move in standard algebraic notation, from the position before it
    pub san: String,
}

/// Every move made in a game, in order
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameRecord {
    start: BoardState,
    entries: Vec<RecordEntry>,
}

impl GameRecord {
    pub fn new(start: BoardState) -> Self {
        Self {
            start,
            entries: Vec::new(),
        }
    }

    /// The position the game started from
    pub fn start(&self) -> &BoardState {
        &self.start
    }

    pub fn entries(&self) -> &[RecordEntry] {
        &self.entries
    }

    /// The position after the latest move
    pub fn current(&self) -> &BoardState {
        self.entries
            .last()
            .map_or(&self.start, |entry| &entry.position)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn push(&mut self, entry: RecordEntry) {
        self.entries.push(entry);
    }

    /// Every position of the game, starting position included
    pub fn positions(&self) -> impl Iterator<Item = &BoardState> + '_ {
        core::iter::once(&self.start).chain(self.entries.iter().map(|entry| &entry.position))
    }

    /// How many times the position has come up, ignoring the clocks
    pub fn occurrences(&self, position: &BoardState) -> usize {
        let key = position.without_clocks();
        self.positions()
            .filter(|seen| seen.without_clocks() == key)
            .count()
    }

    /// The moves in the numbered form used by PGN, like `1. e4 e5 2. Nf3`
    pub fn movetext(&self) -> String {
        let mut text = String::new();
        let mut turn = self.start.turn_counter;
        let mut side = self.start.side_to_move;
        for (idx, entry) in self.entries.iter().enumerate() {
            if idx > 0 {
                text.push(' ');
            }
            match side {
                Color::White => {
                    let _ = write!(text, "{turn}. ");
                }
                Color::Black if idx == 0 => {
                    let _ = write!(text, "{turn}... ");
                }
                Color::Black => {}
            }
            text.push_str(&entry.san);
            if side == Color::Black {
                turn = turn.saturating_add(1);
            }
            side = side.other();
        }
        text
    }
}
