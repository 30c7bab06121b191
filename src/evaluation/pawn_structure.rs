use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

use crate::position::{Piece, Position, Side};
use crate::square::{Square, BOARD_SIZE};

use super::{EvalError, Score};

const DOUBLED_PAWN: i32 = 40;
const BLOCKED_BY_OPPONENT: i32 = 40;
const BLOCKED_BY_OWN: i32 = 25;
const ISOLATED_PAWN: i32 = 50;

/// When a pawn counts as isolated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub enum IsolationRule {
    /// No friendly pawn on at least one neighbouring column. Edge pawns are
    /// always isolated under this rule.
    #[default]
    EitherNeighbourMissing,
    /// No friendly pawn on either neighbouring column.
    BothNeighboursMissing,
}

/// Doubled, blocked and isolated pawn penalties for `side`. Never positive.
pub fn pawn_malus(position: &Position, side: Side, rule: IsolationRule) -> Result<Score, EvalError> {
    let pawns: ArrayVec<Square, 64> = position
        .squares_of(side)
        .iter()
        .copied()
        .filter(|&sq| position.is_piece_at(sq, Piece::Pawn, side))
        .collect();

    let mut column_counts = [0i32; BOARD_SIZE as usize];
    for pawn in &pawns {
        column_counts[pawn.column() as usize] += 1;
    }
    let has_pawn = |column: Option<u8>| column.is_some_and(|c| column_counts.get(c as usize).is_some_and(|&n| n > 0));

    let doubled: i32 = column_counts.iter().map(|&n| (n - 1).max(0)).sum();
    let mut malus = doubled * DOUBLED_PAWN;

    for &pawn in &pawns {
        let forward = pawn
            .forward(side)
            .filter(|_| pawn.row() != side.back_row())
            .ok_or(EvalError::PawnOnBackRank(side, pawn))?;
        malus += match position.piece_at(forward) {
            Some(blocker) if blocker.side != side => BLOCKED_BY_OPPONENT,
            Some(_) => BLOCKED_BY_OWN,
            None => 0,
        };

        let left = has_pawn(pawn.column().checked_sub(1));
        let right = has_pawn(Some(pawn.column() + 1));
        let isolated = match rule {
            IsolationRule::EitherNeighbourMissing => !left || !right,
            IsolationRule::BothNeighboursMissing => !left && !right,
        };
        if isolated {
            malus += ISOLATED_PAWN;
        }
    }

    Ok(Score(-malus))
}
