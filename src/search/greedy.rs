use log::{trace, warn};
use rand::prelude::IndexedRandom;
use rand::Rng;

use crate::evaluation::{EvaluatePosition, Score};
use crate::move_gen::gen_legal_moves;
use crate::moves::Move;
use crate::position::Position;

use super::{SelectError, SelectMove};

/// Looks one ply ahead: plays every legal move and keeps the one whose
/// resulting position is worst for the opponent. Ties are broken at random.
#[derive(Clone, Copy, Debug, Default)]
pub struct GreedySelector<E> {
    evaluator: E,
}

impl<E: EvaluatePosition> GreedySelector<E> {
    pub fn new(evaluator: E) -> Self {
        Self { evaluator }
    }

    pub fn evaluator(&self) -> &E {
        &self.evaluator
    }
}

impl<E: EvaluatePosition> SelectMove for GreedySelector<E> {
    fn select_move<R: Rng + ?Sized>(&self, position: &Position, rng: &mut R) -> Result<Move, SelectError> {
        let mut best_score = Score::MIN;
        let mut best_moves = Vec::new();

        for mve in gen_legal_moves(position)? {
            // Scores are relative to the side to move, which is now the opponent.
            let score = -self.evaluator.evaluate(&position.apply_move(mve)?)?;
            trace!("{} scores {}", mve, score);

            if score > best_score {
                best_score = score;
                best_moves.clear();
            }
            if score == best_score {
                best_moves.push(mve);
            }
        }

        best_moves.choose(rng).copied().ok_or_else(|| {
            warn!("no legal move for {}:\n{}", position.to_move(), position);
            SelectError::NoLegalMove(position.to_move())
        })
    }
}
