use log::{debug, warn};
use rand::Rng;

use crate::move_gen::gen_pseudo_legal_moves;
use crate::moves::Move;
use crate::position::Position;

use super::{SelectError, SelectMove};

/// Uniformly random legal move. Candidates are drawn from the pseudo-legal
/// moves and played on a copy until one leaves the mover's king safe.
#[derive(Clone, Copy, Debug, Default)]
pub struct RandomSelector;

impl SelectMove for RandomSelector {
    fn select_move<R: Rng + ?Sized>(&self, position: &Position, rng: &mut R) -> Result<Move, SelectError> {
        let side = position.to_move();
        let mut candidates = gen_pseudo_legal_moves(position)?;

        while !candidates.is_empty() {
            let candidate = candidates.swap_remove(rng.random_range(0..candidates.len()));
            if !position.apply_move(candidate)?.is_in_check(side) {
                return Ok(candidate);
            }
            debug!(
                "rejected {:?}: leaves {} king in check, {} candidates left",
                candidate,
                side,
                candidates.len()
            );
        }

        warn!("no legal move for {}:\n{}", side, position);
        Err(SelectError::NoLegalMove(side))
    }
}
