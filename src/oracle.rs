use cozy_chess::{Board, Color, Piece};
use thiserror::Error;

use crate::board::ChessPosition;
use crate::state::PositionState;

/// Errors reported by a policy/value oracle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OracleError {
    #[error("evaluation failed: {0}")]
    EvaluationFailed(String),
    #[error("model unavailable: {0}")]
    Unavailable(String),
}

/// Oracle output for one position.
#[derive(Debug, Clone)]
pub struct Evaluation {
    /// Dense non-negative weights over the action space. Need not sum to 1.
    pub policy: Vec<f32>,
    /// Expected outcome in [-1, 1] for the side to move.
    pub value: f32,
}

/// Source of priors and leaf values for the search (usually a network).
pub trait PolicyValueOracle<S: PositionState> {
    fn evaluate(&mut self, state: &S) -> Result<Evaluation, OracleError>;
}

impl<S, O> PolicyValueOracle<S> for &mut O
where
    S: PositionState,
    O: PolicyValueOracle<S> + ?Sized,
{
    fn evaluate(&mut self, state: &S) -> Result<Evaluation, OracleError> {
        (**self).evaluate(state)
    }
}

/// Flat policy over the whole action space and a neutral value.
#[derive(Debug, Clone, Copy, Default)]
pub struct UniformOracle;

impl<S: PositionState> PolicyValueOracle<S> for UniformOracle {
    fn evaluate(&mut self, _state: &S) -> Result<Evaluation, OracleError> {
        Ok(Evaluation { policy: vec![1.0 / S::ACTION_SPACE as f32; S::ACTION_SPACE], value: 0.0 })
    }
}

const PAWN: i32 = 100;
const KNIGHT: i32 = 320;
const BISHOP: i32 = 330;
const ROOK: i32 = 500;
const QUEEN: i32 = 900;

/// Centipawn scale of the tanh squashing applied to material scores.
const VALUE_SCALE_CP: f32 = 400.0;

fn piece_value(piece: Piece) -> i32 {
    match piece {
        Piece::Pawn => PAWN,
        Piece::Knight => KNIGHT,
        Piece::Bishop => BISHOP,
        Piece::Rook => ROOK,
        Piece::Queen => QUEEN,
        Piece::King => 0,
    }
}

fn count_piece(board: &Board, color: Color, piece: Piece) -> i32 {
    (board.colors(color) & board.pieces(piece)).len() as i32
}

/// Material balance in centipawns from the side to move.
pub fn material_eval_cp(board: &Board) -> i32 {
    let mut score = 0;
    for piece in [Piece::Pawn, Piece::Knight, Piece::Bishop, Piece::Rook, Piece::Queen] {
        score += (count_piece(board, Color::White, piece) - count_piece(board, Color::Black, piece)) * piece_value(piece);
    }
    if board.side_to_move() == Color::White { score } else { -score }
}

/// Hand-written stand-in for a trained network: captures are preferred in
/// proportion to the victim's value and the value is squashed material.
#[derive(Debug, Clone, Copy)]
pub struct MaterialOracle {
    /// Extra prior weight per pawn of captured material.
    pub capture_bias: f32,
}

impl Default for MaterialOracle {
    fn default() -> Self { Self { capture_bias: 1.0 } }
}

impl PolicyValueOracle<ChessPosition> for MaterialOracle {
    fn evaluate(&mut self, state: &ChessPosition) -> Result<Evaluation, OracleError> {
        let board = state.board();
        let mut policy = vec![0.0f32; ChessPosition::ACTION_SPACE];
        let them = if board.side_to_move() == Color::White { Color::Black } else { Color::White };
        for mv in state.legal_moves() {
            let idx = state
                .action_index(&mv)
                .map_err(|e| OracleError::EvaluationFailed(e.to_string()))?;
            let victim = match (board.piece_on(mv.to), board.color_on(mv.to)) {
                (Some(p), Some(c)) if c == them => piece_value(p),
                // en passant: a pawn moving diagonally onto an empty square
                (None, _) if board.piece_on(mv.from) == Some(Piece::Pawn) && mv.from.file() != mv.to.file() => PAWN,
                _ => 0,
            };
            policy[idx] = 1.0 + self.capture_bias * victim as f32 / PAWN as f32;
        }
        let value = (material_eval_cp(board) as f32 / VALUE_SCALE_CP).tanh();
        Ok(Evaluation { policy, value })
    }
}
