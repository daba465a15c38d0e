//! Admissible estimates of the remaining number of moves.
//!
//! Every heuristic maps a state and the goal to a non-negative integer that
//! never exceeds the true optimal cost:
//! - `Manhattan`: summed grid distance of each tile from its goal cell.
//! - `MisplacedTiles`: number of tiles not on their goal cell.
//! - `LinearConflict`: Manhattan plus two moves for every tile that has to
//!   step out of its goal row or column to let a reversed neighbour pass.
//!
//! The search engine takes any `Heuristic`; `HeuristicKind` is the closed set
//! used for command-line selection.
use crate::engine::{Goal, State, BLANK};

/// A lower bound on the moves needed to reach `goal` from `state`.
pub trait Heuristic {
    fn estimate(&self, state: &State, goal: &Goal) -> u32;

    /// Short name used in reports.
    fn name(&self) -> &'static str;
}

/// Sum over all tiles of `|Δrow| + |Δcol|` to the goal cell.
#[derive(Clone, Copy, Debug, Default)]
pub struct Manhattan;

/// Count of tiles (blank excluded) not on their goal cell.
#[derive(Clone, Copy, Debug, Default)]
pub struct MisplacedTiles;

/// Manhattan distance plus twice the linear-conflict count.
#[derive(Clone, Copy, Debug, Default)]
pub struct LinearConflict;

impl Heuristic for Manhattan {
    fn estimate(&self, state: &State, goal: &Goal) -> u32 {
        manhattan_distance(state, goal)
    }

    fn name(&self) -> &'static str {
        "manhattan"
    }
}

impl Heuristic for MisplacedTiles {
    fn estimate(&self, state: &State, goal: &Goal) -> u32 {
        misplaced_tiles(state, goal)
    }

    fn name(&self) -> &'static str {
        "misplaced"
    }
}

impl Heuristic for LinearConflict {
    fn estimate(&self, state: &State, goal: &Goal) -> u32 {
        manhattan_distance(state, goal) + 2 * linear_conflicts(state, goal)
    }

    fn name(&self) -> &'static str {
        "linear-conflict"
    }
}

/// Heuristic selector for configuration and command-line use.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum HeuristicKind {
    Manhattan,
    Misplaced,
    LinearConflict,
}

impl HeuristicKind {
    pub const ALL: [HeuristicKind; 3] = [
        HeuristicKind::Manhattan,
        HeuristicKind::Misplaced,
        HeuristicKind::LinearConflict,
    ];

    /// Every heuristic's value for `state`, in [`HeuristicKind::ALL`] order.
    pub fn compare(state: &State, goal: &Goal) -> Vec<(HeuristicKind, u32)> {
        Self::ALL
            .iter()
            .map(|&kind| (kind, kind.estimate(state, goal)))
            .collect()
    }
}

impl Heuristic for HeuristicKind {
    fn estimate(&self, state: &State, goal: &Goal) -> u32 {
        match self {
            HeuristicKind::Manhattan => Manhattan.estimate(state, goal),
            HeuristicKind::Misplaced => MisplacedTiles.estimate(state, goal),
            HeuristicKind::LinearConflict => LinearConflict.estimate(state, goal),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            HeuristicKind::Manhattan => Manhattan.name(),
            HeuristicKind::Misplaced => MisplacedTiles.name(),
            HeuristicKind::LinearConflict => LinearConflict.name(),
        }
    }
}

impl<H: Heuristic + ?Sized> Heuristic for &H {
    fn estimate(&self, state: &State, goal: &Goal) -> u32 {
        (**self).estimate(state, goal)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

pub fn manhattan_distance(state: &State, goal: &Goal) -> u32 {
    let width = state.width();
    state
        .cells()
        .iter()
        .enumerate()
        .filter(|&(_, &tile)| tile != BLANK)
        .map(|(idx, &tile)| {
            let (goal_row, goal_col) = goal.position_of(tile);
            (idx / width).abs_diff(goal_row) + (idx % width).abs_diff(goal_col)
        })
        .sum::<usize>() as u32
}

pub fn misplaced_tiles(state: &State, goal: &Goal) -> u32 {
    state
        .cells()
        .iter()
        .zip(goal.state().cells())
        .filter(|&(&tile, &want)| tile != BLANK && tile != want)
        .count() as u32
}

/// Number of tiles that must leave their goal line to resolve reversed pairs.
///
/// For each row, take the tiles that already sit in their goal row and list
/// their goal columns left to right. Tiles outside a longest increasing run
/// of that list have to step out of the row and back, two moves each beyond
/// Manhattan. Columns are handled the same way. When every conflict involves
/// a distinct pair this equals the number of reversed pairs.
pub fn linear_conflicts(state: &State, goal: &Goal) -> u32 {
    let width = state.width();
    let height = state.height();
    let mut removals = 0;
    let mut line = Vec::with_capacity(width.max(height));

    for row in 0..height {
        line.clear();
        for col in 0..width {
            let tile = state.tile_at(row, col);
            if tile == BLANK {
                continue;
            }
            let (goal_row, goal_col) = goal.position_of(tile);
            if goal_row == row {
                line.push(goal_col);
            }
        }
        removals += line.len() - longest_increasing_run(&line);
    }

    for col in 0..width {
        line.clear();
        for row in 0..height {
            let tile = state.tile_at(row, col);
            if tile == BLANK {
                continue;
            }
            let (goal_row, goal_col) = goal.position_of(tile);
            if goal_col == col {
                line.push(goal_row);
            }
        }
        removals += line.len() - longest_increasing_run(&line);
    }

    removals as u32
}

/// Length of the longest strictly increasing subsequence (patience sorting).
fn longest_increasing_run(values: &[usize]) -> usize {
    let mut tails: Vec<usize> = Vec::with_capacity(values.len());
    for &v in values {
        match tails.binary_search(&v) {
            Ok(_) => {}
            Err(pos) if pos == tails.len() => tails.push(v),
            Err(pos) => tails[pos] = v,
        }
    }
    tails.len()
}
