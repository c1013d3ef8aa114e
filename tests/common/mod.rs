#![allow(dead_code)]
use piezero::codec::CodecError;
use piezero::oracle::{Evaluation, OracleError, PolicyValueOracle};
use piezero::{GameOutcome, PositionState, ACTION_SPACE};
use std::fmt;

/// Synthetic game: `width` moves per ply, game over after `depth` plies.
#[derive(Clone, Debug)]
pub struct Toy {
    pub path: Vec<u8>,
    pub width: u8,
    pub depth: usize,
    /// Outcome at the end; `None` models a position that breaks the contract.
    pub end: Option<GameOutcome>,
}

impl Toy {
    pub fn new(width: u8, depth: usize) -> Self {
        Self { path: Vec::new(), width, depth, end: Some(GameOutcome::Draw) }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ToyMove(pub u8);

impl fmt::Display for ToyMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "m{}", self.0) }
}

impl PositionState for Toy {
    type Move = ToyMove;

    fn legal_moves(&self) -> Vec<ToyMove> {
        if self.is_terminal() { Vec::new() } else { (0..self.width).map(ToyMove).collect() }
    }

    fn apply(&self, mv: ToyMove) -> Self {
        let mut next = self.clone();
        next.path.push(mv.0);
        next
    }

    fn is_terminal(&self) -> bool { self.path.len() >= self.depth }

    fn outcome(&self) -> Option<GameOutcome> { if self.is_terminal() { self.end } else { None } }

    fn action_index(&self, mv: &ToyMove) -> Result<usize, CodecError> { Ok(mv.0 as usize) }
}

pub fn dense(entries: &[(usize, f32)]) -> Vec<f32> {
    let mut p = vec![0.0; ACTION_SPACE];
    for &(i, w) in entries { p[i] = w; }
    p
}

/// Same policy and value for every position.
#[derive(Clone, Debug)]
pub struct FixedOracle {
    pub policy: Vec<f32>,
    pub value: f32,
    pub calls: usize,
}

impl FixedOracle {
    pub fn new(entries: &[(usize, f32)], value: f32) -> Self {
        Self { policy: dense(entries), value, calls: 0 }
    }
}

impl<S: PositionState> PolicyValueOracle<S> for FixedOracle {
    fn evaluate(&mut self, _state: &S) -> Result<Evaluation, OracleError> {
        self.calls += 1;
        Ok(Evaluation { policy: self.policy.clone(), value: self.value })
    }
}

/// Succeeds `ok_calls` times, then fails.
#[derive(Clone, Debug)]
pub struct FlakyOracle {
    pub ok_calls: usize,
    pub calls: usize,
}

impl<S: PositionState> PolicyValueOracle<S> for FlakyOracle {
    fn evaluate(&mut self, _state: &S) -> Result<Evaluation, OracleError> {
        self.calls += 1;
        if self.calls > self.ok_calls {
            return Err(OracleError::Unavailable("model offline".into()));
        }
        Ok(Evaluation { policy: vec![1.0; S::ACTION_SPACE], value: 0.0 })
    }
}
