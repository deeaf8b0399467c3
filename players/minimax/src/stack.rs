use bitboard::{BoardState, DetailedMove};

/// The positions along the line being searched, indexed by ply from the root
///
/// Slot 0 holds the root. Making a move at ply `n` overwrites slot `n + 1`, so taking a move
/// back needs no work: the next sibling just writes over it.
#[derive(Debug)]
pub(crate) struct PlyStack {
    positions: Vec<BoardState>,
    /// Each position with its clocks stripped, for finding repetitions
    keys: Vec<BoardState>,
}

impl PlyStack {
    pub(crate) fn new(root: &BoardState, depth: usize) -> Self {
        Self {
            positions: vec![root.clone(); depth + 1],
            keys: vec![root.without_clocks(); depth + 1],
        }
    }

    pub(crate) fn position(&self, ply: usize) -> &BoardState {
        &self.positions[ply]
    }

    pub(crate) fn key(&self, ply: usize) -> &BoardState {
        &self.keys[ply]
    }

    /// Play the move from the position at `ply` into the slot above it
    pub(crate) fn play(&mut self, ply: usize, m: &DetailedMove) {
        let next = self.positions[ply].after(m);
        self.keys[ply + 1] = next.without_clocks();
        self.positions[ply + 1] = next;
    }

    /// The keys of the positions strictly between the root and `ply`, nearest first
    pub(crate) fn keys_below(&self, ply: usize) -> impl Iterator<Item = &BoardState> + '_ {
        self.keys[1..ply].iter().rev()
    }
}
