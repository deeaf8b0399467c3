//! A player which searches the game tree with negamax and alpha-beta pruning
//!
//! Positions are scored on material alone. How deep the search looks depends on the
//! [`Difficulty`], and an optional [`SearchBudget`] caps the work done for a single move.

use core::{fmt, str::FromStr};
use std::time::{Duration, Instant};

use bitboard::{BoardState, DetailedMove};
use board::Move;
use game::GameEngine;
use rand::{rngs::SmallRng, seq::SliceRandom, Rng, SeedableRng};

mod eval;
mod stack;

pub use eval::{evaluate, piece_value, MATE_SCORE};

use eval::{evaluate_for_mover, INFINITY};
use stack::PlyStack;

/// How strong the engine plays
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}
impl Difficulty {
    /// How many plies the search looks ahead
    pub const fn depth(self) -> u32 {
        match self {
            Self::Easy => 1,
            Self::Medium => 3,
            Self::Hard => 5,
        }
    }

    /// The chance of skipping the search and playing any legal move at all
    pub const fn random_move_chance(self) -> f64 {
        match self {
            Self::Easy => 0.3,
            Self::Medium | Self::Hard => 0.0,
        }
    }
}
impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown difficulty `{0}`, expected easy, medium or hard")]
pub struct UnknownDifficulty(String);

impl FromStr for Difficulty {
    type Err = UnknownDifficulty;

    /// ```
    /// use minimax::Difficulty;
    /// assert_eq!("medium".parse(), Ok(Difficulty::Medium));
    /// assert!("impossible".parse::<Difficulty>().is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "easy" => Ok(Self::Easy),
            "medium" => Ok(Self::Medium),
            "hard" => Ok(Self::Hard),
            _ => Err(UnknownDifficulty(s.to_string())),
        }
    }
}

/// Limits on the work spent picking one move
///
/// The default has no limits, so only the depth bounds the search.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SearchBudget {
    pub max_nodes: Option<u64>,
    pub time_limit: Option<Duration>,
}

/// What a search found, and what it cost
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchReport {
    pub best: Option<Move>,
    /// The score of `best` for the side to move, or 0 if it wasn't searched
    pub score: i32,
    pub nodes: u64,
    pub elapsed: Duration,
    /// Whether the budget ran out before every root move was searched
    pub aborted: bool,
}

/// Pick a move for the side to move at the given difficulty, without a budget
///
/// Returns `None` only when there is no legal move.
pub fn search(game: &GameEngine, difficulty: Difficulty) -> Option<Move> {
    SearchEngine::new(SearchBudget::default()).search(game, difficulty)
}

/// A reusable searcher
///
/// This holds the random number generator for the easy level's random moves, and the budget each
/// search runs under.
#[derive(Debug)]
pub struct SearchEngine {
    rng: SmallRng,
    budget: SearchBudget,
}

impl SearchEngine {
    pub fn new(budget: SearchBudget) -> Self {
        Self {
            rng: SmallRng::from_entropy(),
            budget,
        }
    }

    /// A searcher whose random choices are reproducible
    pub fn with_seed(budget: SearchBudget, seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
            budget,
        }
    }

    pub fn budget(&self) -> SearchBudget {
        self.budget
    }

    /// Pick a move for the side to move
    pub fn search(&mut self, game: &GameEngine, difficulty: Difficulty) -> Option<Move> {
        self.search_with_report(game, difficulty).best
    }

    /// Pick a move for the side to move, reporting how the search went
    pub fn search_with_report(&mut self, game: &GameEngine, difficulty: Difficulty) -> SearchReport {
        let chance = difficulty.random_move_chance();
        if chance > 0.0 && self.rng.gen_bool(chance) {
            if let Some(&random) = game.current_legal_moves().choose(&mut self.rng) {
                log::debug!("Playing random move {random} at {difficulty} difficulty");
                return SearchReport {
                    best: Some(random.into()),
                    score: 0,
                    nodes: 0,
                    elapsed: Duration::ZERO,
                    aborted: false,
                };
            }
        }
        self.search_depth(game, difficulty.depth())
    }

    /// Search exactly `depth` plies deep, without any random moves
    ///
    /// Among equally good moves, the first in generation order is chosen.
    pub fn search_depth(&mut self, game: &GameEngine, depth: u32) -> SearchReport {
        let started = Instant::now();
        let mut search = Search {
            stack: PlyStack::new(game.position(), depth.max(1) as usize),
            history: game
                .record()
                .positions()
                .map(BoardState::without_clocks)
                .collect(),
            budget: self.budget,
            started,
            nodes: 0,
            aborted: false,
        };
        let (best, score) = search.root(game.current_legal_moves(), depth.max(1));
        let report = SearchReport {
            best: best.map(Move::from),
            score,
            nodes: search.nodes,
            elapsed: started.elapsed(),
            aborted: search.aborted,
        };
        log::debug!(
            "Searched {} nodes in {}ms at depth {depth}: best {:?} scoring {}{}",
            report.nodes,
            report.elapsed.as_millis(),
            report.best.map(|mv| mv.to_string()),
            report.score,
            if report.aborted { " (out of budget)" } else { "" },
        );
        report
    }
}

/// The state of one search in progress
struct Search {
    stack: PlyStack,
    /// The keys of every position of the game so far, the root last
    history: Vec<BoardState>,
    budget: SearchBudget,
    started: Instant,
    nodes: u64,
    aborted: bool,
}

impl Search {
    /// Score every root move and return the best, keeping the first of equals
    fn root(&mut self, moves: &[DetailedMove], depth: u32) -> (Option<DetailedMove>, i32) {
        let mut best: Option<(DetailedMove, i32)> = None;
        let mut alpha = -INFINITY;
        for m in moves {
            self.stack.play(0, m);
            let score = -self.negamax(1, depth - 1, -INFINITY, -alpha);
            if self.aborted {
                break;
            }
            if best.map_or(true, |(_, best_score)| score > best_score) {
                best = Some((*m, score));
            }
            alpha = alpha.max(score);
        }
        match best {
            Some((m, score)) => (Some(m), score),
            // Nothing finished inside the budget
            None => (moves.first().copied(), 0),
        }
    }

    /// The score of the position at `ply` for its side to move
    fn negamax(&mut self, ply: usize, depth: u32, mut alpha: i32, beta: i32) -> i32 {
        self.nodes += 1;
        if self.out_of_budget() {
            self.aborted = true;
            return 0;
        }

        let mut moves = {
            let position = self.stack.position(ply);
            // Leaves only need to know whether the game goes on
            let generated = if depth == 0 {
                position.has_legal_move().map(|any| (any, Vec::new()))
            } else {
                position.legal_moves().map(|moves| (!moves.is_empty(), moves))
            };
            let (any_moves, moves) = match generated {
                Ok(generated) => generated,
                Err(e) => {
                    log::error!("Search reached a broken position {}: {e}", position.to_fen());
                    return 0;
                }
            };
            if !any_moves {
                return if position.is_check(position.side_to_move) {
                    -(MATE_SCORE - ply as i32)
                } else {
                    0
                };
            }
            if position.halfmove_clock >= 100
                || self.repetitions(ply) >= 3
                || position.is_insufficient_material()
            {
                return 0;
            }
            if depth == 0 {
                return evaluate_for_mover(position);
            }
            moves
        };

        // Captures first, which prunes more without changing the result
        moves.sort_by_key(|m| !m.is_capture());
        let mut best = -INFINITY;
        for m in &moves {
            self.stack.play(ply, m);
            let score = -self.negamax(ply + 1, depth - 1, -beta, -alpha);
            if self.aborted {
                return 0;
            }
            best = best.max(score);
            alpha = alpha.max(score);
            if alpha >= beta {
                break;
            }
        }
        best
    }

    /// How many times the position at `ply` has occurred along the game and the searched line
    ///
    /// Only the last `halfmove_clock` plies can repeat it, since anything before a capture or pawn
    /// move is unreachable.
    fn repetitions(&self, ply: usize) -> usize {
        let key = self.stack.key(ply);
        let window = self.stack.position(ply).halfmove_clock as usize;
        1 + self
            .stack
            .keys_below(ply)
            .chain(self.history.iter().rev())
            .take(window)
            .filter(|&seen| seen == key)
            .count()
    }

    fn out_of_budget(&self) -> bool {
        if self.budget.max_nodes.is_some_and(|max| self.nodes > max) {
            return true;
        }
        // Checking the clock is slow, so only do it now and then
        self.nodes % 1024 == 0
            && self
                .budget
                .time_limit
                .is_some_and(|limit| self.started.elapsed() >= limit)
    }
}
