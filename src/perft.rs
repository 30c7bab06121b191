use std::collections::HashMap;
use std::fmt::Display;
use std::time::{Duration, Instant};

use tabled::{Table, Tabled};

use crate::move_gen::{gen_legal_moves, MoveGenError};
use crate::moves::{Move, MoveFlag};
use crate::position::Position;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Tabled)]
pub struct PerftDepthResult {
    pub tot: u64,
    pub captures: u64,
    pub en_passants: u64,
    pub castles: u64,
    pub promotions: u64,
    pub checks: u64,
    pub checkmates: u64,
}

impl PerftDepthResult {
    pub fn new(
        tot: u64,
        captures: u64,
        en_passants: u64,
        castles: u64,
        promotions: u64,
        checks: u64,
        checkmates: u64,
    ) -> Self {
        PerftDepthResult {
            tot,
            captures,
            en_passants,
            castles,
            promotions,
            checks,
            checkmates,
        }
    }
}

pub struct PerftResult {
    pub depth_results: Vec<PerftDepthResult>,
    pub tot_nodes: u64,
    pub time_elapsed: Duration,
    pub nodes_per_second: f64,
}

impl Display for PerftResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "total nodes: {}", self.tot_nodes)?;
        writeln!(f, "time elapsed: {}", self.time_elapsed.as_secs_f32())?;
        writeln!(f, "nodes/s: {:.0}", self.nodes_per_second)?;
        writeln!(f, "{}", Table::new(&self.depth_results))?;
        Ok(())
    }
}

/// Leaf counts at `depth` per legal root move, plus their sum.
pub fn perft(position: &Position, depth: usize) -> Result<(HashMap<Move, usize>, usize), MoveGenError> {
    let mut move_counts = HashMap::new();
    if depth == 0 {
        return Ok((move_counts, 1));
    }

    let mut total = 0;
    for mve in gen_legal_moves(position)? {
        let count = count_leaves(&position.apply_move(mve)?, depth - 1)?;
        total += count;
        move_counts.insert(mve, count);
    }
    Ok((move_counts, total))
}

fn count_leaves(position: &Position, depth: usize) -> Result<usize, MoveGenError> {
    if depth == 0 {
        return Ok(1);
    }

    let moves = gen_legal_moves(position)?;
    if depth == 1 {
        return Ok(moves.len());
    }

    let mut total = 0;
    for mve in moves {
        total += count_leaves(&position.apply_move(mve)?, depth - 1)?;
    }
    Ok(total)
}

/// Per-ply breakdown of every move path up to `depth`.
pub fn perft_full(position: &Position, depth: usize) -> Result<PerftResult, MoveGenError> {
    let mut depth_results = vec![PerftDepthResult::default(); depth];

    let start = Instant::now();
    perft_helper(&mut depth_results, position, depth, 0)?;
    let time_elapsed = start.elapsed();

    let tot_nodes = depth_results.iter().map(|res| res.tot).sum();
    let nodes_per_second = tot_nodes as f64 / time_elapsed.as_secs_f64();

    Ok(PerftResult {
        depth_results,
        tot_nodes,
        time_elapsed,
        nodes_per_second,
    })
}

fn perft_helper(
    depth_results: &mut [PerftDepthResult],
    position: &Position,
    max_depth: usize,
    curr_depth: usize,
) -> Result<(), MoveGenError> {
    // Generated before the depth check so mates at the last ply are still counted.
    let moves = gen_legal_moves(position)?;

    if moves.is_empty() {
        if curr_depth > 0 && position.is_in_check(position.to_move()) {
            depth_results[curr_depth - 1].checkmates += 1;
        }
        return Ok(());
    }

    if curr_depth == max_depth {
        return Ok(());
    }

    let curr_res = &mut depth_results[curr_depth];
    curr_res.tot += moves.len() as u64;
    for mve in &moves {
        if mve.is_capture() {
            curr_res.captures += 1;
        }
        if mve.flag == MoveFlag::EnPassant {
            curr_res.en_passants += 1;
        }
        if mve.flag.is_castle() {
            curr_res.castles += 1;
        }
        if mve.flag.is_promotion() {
            curr_res.promotions += 1;
        }
    }

    let mut checks = 0;
    for mve in moves {
        let next = position.apply_move(mve)?;
        if next.is_in_check(next.to_move()) {
            checks += 1;
        }
        perft_helper(depth_results, &next, max_depth, curr_depth + 1)?;
    }
    depth_results[curr_depth].checks += checks;

    Ok(())
}
