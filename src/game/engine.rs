use super::{Board, Cell, GameSnapshot, GameState, Move, Outcome, Side};

/// Why a move was rejected. Both variants are invalid moves; `GameOver`
/// is the form taken when the game has already ended.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoveError {
    #[error("game is over ({0})")]
    GameOver(Outcome),
    #[error("{mv} is not a legal move for {side}")]
    Illegal { mv: Move, side: Side },
}

/// Every move `side` could make on `board`, ignoring whose turn it is.
///
/// Row-major over the side's pawns; per pawn the forward slide comes
/// first, then the left and right diagonal captures.
pub(crate) fn generate_moves(board: &Board, side: Side) -> Vec<Move> {
    let mut moves = Vec::new();
    let enemy = side.opponent().to_cell();
    let step = side.forward();

    for from in board.pawns(side) {
        if let Some(to) = from.offset(step, 0) {
            if board.get(to) == Cell::Empty {
                moves.push(Move::new(from, to));
            }
        }
        for d_col in [-1, 1] {
            if let Some(to) = from.offset(step, d_col) {
                if board.get(to) == enemy {
                    moves.push(Move::new(from, to));
                }
            }
        }
    }
    moves
}

/// Rule engine for one game. Deterministic: the state is fully described
/// by board, turn and outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameEngine {
    board: Board,
    turn: Side,
    outcome: Outcome,
}

impl GameEngine {
    /// Opening position, White to move.
    pub fn new() -> Self {
        GameEngine {
            board: Board::new(),
            turn: Side::White,
            outcome: Outcome::InProgress,
        }
    }

    /// Start from an arbitrary in-progress position.
    pub fn from_position(board: Board, turn: Side) -> Self {
        GameEngine {
            board,
            turn,
            outcome: Outcome::InProgress,
        }
    }

    /// Restore an engine exactly as a snapshot describes it.
    pub fn from_snapshot(snapshot: GameSnapshot) -> Self {
        GameEngine {
            board: snapshot.board,
            turn: snapshot.turn,
            outcome: snapshot.outcome,
        }
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            board: self.board,
            turn: self.turn,
            outcome: self.outcome,
        }
    }

    pub fn state(&self) -> GameState {
        GameState::new(self.board, self.turn)
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn turn(&self) -> Side {
        self.turn
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    pub fn is_terminal(&self) -> bool {
        self.outcome.is_terminal()
    }

    /// Legal moves for `side`; empty once the game is over.
    pub fn legal_moves(&self, side: Side) -> Vec<Move> {
        if self.is_terminal() {
            return Vec::new();
        }
        generate_moves(&self.board, side)
    }

    /// Legal moves for the side to move.
    pub fn current_moves(&self) -> Vec<Move> {
        self.legal_moves(self.turn)
    }

    pub fn is_legal(&self, mv: Move) -> bool {
        self.current_moves().contains(&mv)
    }

    /// Play `mv` for the side to move.
    ///
    /// Outcome checks run in order: back rank reached, opponent wiped
    /// out, then the turn passes and an opponent without moves makes the
    /// game a draw. The board is untouched when the move is rejected.
    pub fn apply_move(&mut self, mv: Move) -> Result<(GameState, Outcome), MoveError> {
        if self.is_terminal() {
            return Err(MoveError::GameOver(self.outcome));
        }
        let mover = self.turn;
        if !self.is_legal(mv) {
            return Err(MoveError::Illegal { mv, side: mover });
        }
        assert_eq!(
            self.board.get(mv.from).side(),
            Some(mover),
            "legal move {mv} does not start on a {mover} pawn"
        );

        self.board.set(mv.from, Cell::Empty);
        self.board.set(mv.to, mover.to_cell());

        let opponent = mover.opponent();
        if mv.to.row == mover.goal_row() || self.board.count(opponent) == 0 {
            self.outcome = Outcome::win_for(mover);
        } else {
            self.turn = opponent;
            if generate_moves(&self.board, opponent).is_empty() {
                self.outcome = Outcome::Draw;
            }
        }

        Ok((self.state(), self.outcome))
    }
}

impl Default for GameEngine {
    fn default() -> Self {
        Self::new()
    }
}
