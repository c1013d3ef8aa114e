use cozy_chess::{Move, Piece};
use thiserror::Error;

use crate::state::PositionState;

/// Move-type slots per origin square: 56 sliding + 8 knight + 9 under-promotion.
pub const MOVE_TYPES: usize = 73;
/// Size of the flat policy vector: 64 origin squares x 73 move types.
pub const ACTION_SPACE: usize = 64 * MOVE_TYPES;

const SLIDING_SLOTS: usize = 56;
const KNIGHT_SLOTS: usize = 8;
const UNDERPROMOTION_BASE: usize = SLIDING_SLOTS + KNIGHT_SLOTS;

/// Compass order used for the sliding slots.
const DIRECTIONS: [(i32, i32); 8] = [
    (1, 0), (1, 1), (0, 1), (-1, 1),
    (-1, 0), (-1, -1), (0, -1), (1, -1),
];

const KNIGHT_DELTAS: [(i32, i32); 8] = [
    (2, 1), (1, 2), (-1, 2), (-2, 1),
    (-2, -1), (-1, -2), (1, -2), (2, -1),
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("move {mv} matches no encodable geometry (dx={dx}, dy={dy})")]
    IllegalEncoding { mv: String, dx: i32, dy: i32 },
}

fn underpromotion_piece_index(piece: Piece) -> Option<usize> {
    match piece {
        Piece::Knight => Some(0),
        Piece::Bishop => Some(1),
        Piece::Rook => Some(2),
        _ => None,
    }
}

/// Encode a move as an index into the 4672-slot action space.
///
/// Index layout is `from_square * 73 + slot`, where slot is
/// - `0..56`: queen-like moves, `direction * 7 + (distance - 1)`
/// - `56..64`: knight jumps
/// - `64..73`: under-promotions, `64 + piece * 3 + direction`
///
/// Promotions to a queen use the queen-like slot of the pawn step.
pub fn encode(mv: Move) -> Result<usize, CodecError> {
    let from = mv.from as usize;
    let dx = mv.to.file() as i32 - mv.from.file() as i32;
    let dy = mv.to.rank() as i32 - mv.from.rank() as i32;

    let slot = match mv.promotion.and_then(underpromotion_piece_index) {
        Some(piece_idx) => {
            // Direction by file delta, so both colours share the same slots.
            let dir_idx = match (dx, dy.abs()) {
                (0, 1) => Some(0),
                (-1, 1) => Some(1),
                (1, 1) => Some(2),
                _ => None,
            };
            dir_idx.map(|d| UNDERPROMOTION_BASE + piece_idx * 3 + d)
        }
        None => sliding_slot(dx, dy).or_else(|| knight_slot(dx, dy)),
    };

    match slot {
        Some(slot) => Ok(from * MOVE_TYPES + slot),
        None => Err(CodecError::IllegalEncoding { mv: mv.to_string(), dx, dy }),
    }
}

fn sliding_slot(dx: i32, dy: i32) -> Option<usize> {
    if !(dx == 0 || dy == 0 || dx.abs() == dy.abs()) {
        return None;
    }
    let distance = dx.abs().max(dy.abs());
    if !(1..=7).contains(&distance) {
        return None;
    }
    let unit = (dx.signum(), dy.signum());
    DIRECTIONS
        .iter()
        .position(|&d| d == unit)
        .map(|dir_idx| dir_idx * 7 + (distance as usize - 1))
}

fn knight_slot(dx: i32, dy: i32) -> Option<usize> {
    KNIGHT_DELTAS
        .iter()
        .position(|&d| d == (dx, dy))
        .map(|i| SLIDING_SLOTS + i)
}

/// Find the legal move of `state` whose encoding is `index`.
///
/// Only ever returns a legal move; out-of-range or unused indices give `None`.
pub fn decode<S: PositionState>(state: &S, index: usize) -> Option<S::Move> {
    state
        .legal_moves()
        .into_iter()
        .find(|mv| state.action_index(mv).ok() == Some(index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::ChessPosition;
    use cozy_chess::Square;
    use std::str::FromStr;

    fn mv(s: &str) -> Move {
        Move::from_str(s).unwrap()
    }

    #[test]
    fn test_pawn_double_push() {
        // e2 = 12, north = direction 2, distance 2
        assert_eq!(encode(mv("e2e4")).unwrap(), 12 * 73 + 2 * 7 + 1);
    }

    #[test]
    fn test_knight_jump() {
        // g1 = 6, delta (-1, 2) is the third knight slot
        assert_eq!(encode(mv("g1f3")).unwrap(), 6 * 73 + 56 + 2);
    }

    #[test]
    fn test_queen_promotion_uses_sliding_slot() {
        assert_eq!(encode(mv("a7a8q")).unwrap(), 48 * 73 + 2 * 7);
        assert_eq!(encode(mv("a7a8q")).unwrap(), encode(mv("a7a8")).unwrap());
    }

    #[test]
    fn test_underpromotions_have_distinct_slots() {
        assert_eq!(encode(mv("a7a8n")).unwrap(), 48 * 73 + 64);
        assert_eq!(encode(mv("a7a8b")).unwrap(), 48 * 73 + 64 + 3);
        assert_eq!(encode(mv("a7a8r")).unwrap(), 48 * 73 + 64 + 6);
        assert_eq!(encode(mv("b7c8n")).unwrap(), 49 * 73 + 64 + 2);
        assert_eq!(encode(mv("b7a8n")).unwrap(), 49 * 73 + 64 + 1);
        // black capture toward the a-file
        assert_eq!(encode(mv("b2a1r")).unwrap(), 9 * 73 + 64 + 6 + 1);
    }

    #[test]
    fn test_unencodable_geometry() {
        let bad = Move { from: Square::A1, to: Square::C4, promotion: None };
        assert!(matches!(encode(bad), Err(CodecError::IllegalEncoding { dx: 2, dy: 3, .. })));
        let bad_promo = Move { from: Square::A7, to: Square::C8, promotion: Some(Piece::Knight) };
        assert!(encode(bad_promo).is_err());
    }

    #[test]
    fn test_decode_rejects_garbage_index() {
        let pos = ChessPosition::startpos();
        assert_eq!(decode(&pos, ACTION_SPACE + 5), None);
        // a1 rook cannot move at the start
        assert_eq!(decode(&pos, 0), None);
    }

    #[test]
    fn test_decode_finds_legal_move() {
        let pos = ChessPosition::startpos();
        assert_eq!(decode(&pos, 12 * 73 + 15), Some(mv("e2e4")));
    }
}
