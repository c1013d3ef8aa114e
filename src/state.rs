use std::fmt::{Debug, Display};

use crate::codec::{CodecError, ACTION_SPACE};

/// Result of a finished game, relative to the side to move in the terminal position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameOutcome {
    Win,
    Loss,
    Draw,
}

impl GameOutcome {
    /// Backpropagation value for the side to move: +1, -1 or 0.
    pub fn value(self) -> f64 {
        match self {
            GameOutcome::Win => 1.0,
            GameOutcome::Loss => -1.0,
            GameOutcome::Draw => 0.0,
        }
    }
}

/// A game position the search can explore.
///
/// Implementations must be cheap to clone and `apply` must not mutate `self`.
pub trait PositionState: Clone {
    type Move: Copy + Eq + Debug + Display;

    /// Length of the policy vectors exchanged with the oracle.
    const ACTION_SPACE: usize = ACTION_SPACE;

    /// Legal moves in a stable order.
    fn legal_moves(&self) -> Vec<Self::Move>;

    fn apply(&self, mv: Self::Move) -> Self;

    fn is_terminal(&self) -> bool;

    /// Only meaningful when `is_terminal()` holds.
    fn outcome(&self) -> Option<GameOutcome>;

    /// Index of `mv` in the policy vector.
    fn action_index(&self, mv: &Self::Move) -> Result<usize, CodecError>;
}
