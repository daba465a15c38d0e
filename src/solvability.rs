//! Permutation-parity test deciding whether a state can reach a goal.
//!
//! Sliding the blank sideways never changes the row-major order of the tiles.
//! Sliding it vertically moves one tile past `width - 1` others. On odd-width
//! boards that preserves inversion parity; on even-width boards it flips the
//! parity and the blank's row parity together. Boards that are a single row
//! or column cannot reorder tiles at all.
use crate::engine::{State, BLANK};

/// Counts tile pairs whose row-major order in `state` disagrees with `goal`.
///
/// The blank is ignored. Both states must have the same number of cells.
pub fn inversions(state: &State, goal: &State) -> usize {
    let mut rank = vec![0usize; goal.len()];
    for (idx, &tile) in goal.cells().iter().enumerate() {
        rank[tile as usize] = idx;
    }
    let order: Vec<usize> = state
        .cells()
        .iter()
        .filter(|&&t| t != BLANK)
        .map(|&t| rank[t as usize])
        .collect();

    order
        .iter()
        .enumerate()
        .map(|(i, &a)| order[i + 1..].iter().filter(|&&b| b < a).count())
        .sum()
}

/// Whether `goal` is reachable from `state` by legal moves.
///
/// Returns `false` if the two states have different shapes.
pub fn is_solvable(state: &State, goal: &State) -> bool {
    if !state.same_shape(goal) {
        return false;
    }
    let inv = inversions(state, goal);

    if state.width() == 1 || state.height() == 1 {
        return inv == 0;
    }
    if state.width() % 2 == 1 {
        inv % 2 == 0
    } else {
        let row_delta = state.blank_position().0.abs_diff(goal.blank_position().0);
        (inv + row_delta) % 2 == 0
    }
}
