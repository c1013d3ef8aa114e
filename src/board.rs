use cozy_chess::{Board as CozyBoard, Color, File, Move, Piece, Square};
use thiserror::Error;

use crate::codec::{self, CodecError};
use crate::state::{GameOutcome, PositionState};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error("FEN error: {0}")]
    InvalidFen(String),
    #[error("Illegal move: {0}")]
    IllegalMove(String),
}

/// Chess position backed by cozy-chess, with the hash history needed to
/// detect repetitions.
#[derive(Clone, Debug)]
pub struct ChessPosition {
    board: CozyBoard,
    // Hashes since the last irreversible move, current position last.
    history: Vec<u64>,
}

impl ChessPosition {
    pub fn startpos() -> Self {
        Self::from_board(CozyBoard::default())
    }

    pub fn from_fen(fen: &str) -> Result<Self, BoardError> {
        CozyBoard::from_fen(fen, false)
            .map(Self::from_board)
            .map_err(|e| BoardError::InvalidFen(format!("{e:?}")))
    }

    pub fn from_board(board: CozyBoard) -> Self {
        let history = vec![board.hash()];
        Self { board, history }
    }

    pub fn board(&self) -> &CozyBoard { &self.board }

    pub fn side_to_move(&self) -> Color { self.board.side_to_move() }

    pub fn fen(&self) -> String { format!("{}", self.board) }

    fn has_legal_move(&self) -> bool {
        let mut any = false;
        self.board.generate_moves(|moves| {
            if !moves.is_empty() { any = true; }
            any
        });
        any
    }

    fn is_repetition(&self) -> bool {
        let current = self.board.hash();
        self.history.iter().filter(|&&h| h == current).count() >= 3
    }

    fn is_insufficient_material(&self) -> bool {
        let occupied = self.board.occupied().len();
        let minors = self.board.pieces(Piece::Knight) | self.board.pieces(Piece::Bishop);
        occupied == 2 || (occupied == 3 && !minors.is_empty())
    }

    /// Rewrite cozy-chess castling (king takes own rook) as the king's
    /// two-square step; other moves are returned unchanged.
    pub fn king_step(&self, mv: Move) -> Move {
        let castles = self.board.piece_on(mv.from) == Some(Piece::King)
            && self.board.color_on(mv.to) == Some(self.board.side_to_move());
        if !castles {
            return mv;
        }
        let file = if (mv.to.file() as u8) > (mv.from.file() as u8) { File::G } else { File::C };
        Move { from: mv.from, to: Square::new(file, mv.from.rank()), promotion: None }
    }

    /// Print a move in UCI notation; castling as the king's two-square step.
    pub fn move_to_uci(&self, mv: Move) -> String {
        format!("{}", self.king_step(mv))
    }

    /// Parse a UCI move, accepting castling in either notation.
    pub fn parse_uci_move(&self, mv_uci: &str) -> Result<Move, BoardError> {
        self.legal_moves()
            .into_iter()
            .find(|&m| self.move_to_uci(m) == mv_uci || format!("{}", m) == mv_uci)
            .ok_or_else(|| BoardError::IllegalMove(mv_uci.to_string()))
    }

    pub fn play_uci(&self, mv_uci: &str) -> Result<Self, BoardError> {
        let mv = self.parse_uci_move(mv_uci)?;
        Ok(self.apply(mv))
    }

    pub fn play_uci_sequence<S: AsRef<str>>(&self, moves: &[S]) -> Result<Self, BoardError> {
        let mut pos = self.clone();
        for m in moves { pos = pos.play_uci(m.as_ref())?; }
        Ok(pos)
    }
}

impl Default for ChessPosition {
    fn default() -> Self { Self::startpos() }
}

impl PositionState for ChessPosition {
    type Move = Move;

    fn legal_moves(&self) -> Vec<Move> {
        let mut moves = Vec::new();
        self.board.generate_moves(|ml| {
            moves.extend(ml);
            false
        });
        moves
    }

    fn apply(&self, mv: Move) -> Self {
        let mut board = self.board.clone();
        board.play(mv);
        let history = if board.halfmove_clock() == 0 {
            vec![board.hash()]
        } else {
            let mut h = Vec::with_capacity(self.history.len() + 1);
            h.extend_from_slice(&self.history);
            h.push(board.hash());
            h
        };
        Self { board, history }
    }

    fn is_terminal(&self) -> bool {
        self.outcome().is_some()
    }

    fn outcome(&self) -> Option<GameOutcome> {
        if !self.has_legal_move() {
            return if self.board.checkers().is_empty() {
                Some(GameOutcome::Draw)
            } else {
                Some(GameOutcome::Loss)
            };
        }
        if self.board.halfmove_clock() >= 100 || self.is_repetition() || self.is_insufficient_material() {
            return Some(GameOutcome::Draw);
        }
        None
    }

    fn action_index(&self, mv: &Move) -> Result<usize, CodecError> {
        codec::encode(self.king_step(*mv))
    }
}
