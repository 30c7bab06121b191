mod greedy;
mod random;

use rand::Rng;

use crate::evaluation::EvalError;
use crate::move_gen::MoveGenError;
use crate::moves::Move;
use crate::position::{Position, PositionError, Side};

pub use greedy::GreedySelector;
pub use random::RandomSelector;

#[derive(thiserror::Error, Debug)]
pub enum SelectError {
    /// Checkmate or stalemate. Check [`Position::is_in_check`] to tell them apart.
    #[error("no legal move for {0}")]
    NoLegalMove(Side),

    #[error("generating moves: {0}")]
    MoveGen(#[from] MoveGenError),

    #[error("simulating move: {0}")]
    Position(#[from] PositionError),

    #[error("evaluating position: {0}")]
    Eval(#[from] EvalError),
}

pub trait SelectMove {
    /// Picks a legal move for the side to move. All randomness comes from `rng`.
    fn select_move<R: Rng + ?Sized>(&self, position: &Position, rng: &mut R) -> Result<Move, SelectError>;
}
