//! # Tile Puzzle Solver Library
//!
//! This library provides a best-first search engine for sliding-tile puzzles
//! of any rectangular size with a single blank, together with the puzzle
//! model, admissible heuristics and a solvability check.
//!
//! It is used by two binaries:
//! - `puzzle_solver`: Reads a board from a file, checks solvability, runs A*
//!   or greedy best-first search and prints the solution trace with the
//!   `g`, `h` and `f` values of every step.
//! - `heuristic_evaluator`: Runs every heuristic under both policies over
//!   seeded random boards and reports average cost and expansions.
//!
//! ## Modules
//! - `engine`: Board states (`State`), moves (`Action`), the goal lookup
//!   (`Goal`) and the problem definition (`Puzzle`).
//! - `solvability`: Inversion-parity test run before searching.
//! - `heuristics`: The `Heuristic` trait with Manhattan distance, misplaced
//!   tiles and linear conflict.
//! - `solver`: The search engine (`Solver`, `solve`) and its result types.
//! - `path`: Rebuilds the step list from a goal node.
//! - `error`: `PuzzleError`.
//! - `utils`: Text parsing and rendering of boards, and seeded instance generation.
//!
//! ```
//! use tile_puzzle_solver::engine::{new_problem, Action};
//! use tile_puzzle_solver::heuristics::Manhattan;
//! use tile_puzzle_solver::path::{actions, reconstruct_result};
//! use tile_puzzle_solver::solver::{solve, Policy};
//!
//! let puzzle = new_problem(
//!     &[vec![1, 2, 3], vec![4, 0, 6], vec![7, 5, 8]],
//!     &[vec![1, 2, 3], vec![4, 5, 6], vec![7, 8, 0]],
//! )
//! .unwrap();
//! assert!(puzzle.is_solvable());
//!
//! let result = solve(&puzzle, Manhattan, Policy::AStar, 10_000);
//! let steps = reconstruct_result(&result).unwrap();
//! assert_eq!(actions(&steps), vec![Action::Down, Action::Right]);
//! ```

pub mod engine;
pub mod error;
pub mod heuristics;
pub mod path;
pub mod solvability;
pub mod solver;
pub mod utils;

pub use engine::{new_problem, Action, Puzzle, State};
pub use error::PuzzleError;
pub use solver::{solve, Policy, SearchResult, Solver};

#[cfg(test)]
pub(crate) mod test_support {
    use crate::engine::{State, Tile};
    use std::collections::{HashMap, VecDeque};

    /// Breadth-first distances from `start` to every state reachable from it.
    ///
    /// Moves are reversible, so this is also the optimal cost of reaching
    /// `start` from each of those states.
    pub(crate) fn reachable_distances(start: &State) -> HashMap<State, u32> {
        let mut dist = HashMap::new();
        let mut queue = VecDeque::new();
        dist.insert(start.clone(), 0);
        queue.push_back(start.clone());
        while let Some(state) = queue.pop_front() {
            let d = dist[&state];
            for next in state.legal_actions().filter_map(|a| state.apply(a)) {
                if !dist.contains_key(&next) {
                    dist.insert(next.clone(), d + 1);
                    queue.push_back(next);
                }
            }
        }
        dist
    }

    /// Every ordering of `0..n`, generated with Heap's algorithm.
    pub(crate) fn permutations(n: usize) -> Vec<Vec<Tile>> {
        let mut items: Vec<Tile> = (0..n).map(|v| v as Tile).collect();
        let mut counters = vec![0; n];
        let mut out = vec![items.clone()];
        let mut i = 1;
        while i < n {
            if counters[i] < i {
                if i % 2 == 0 {
                    items.swap(0, i);
                } else {
                    items.swap(counters[i], i);
                }
                out.push(items.clone());
                counters[i] += 1;
                i = 1;
            } else {
                counters[i] = 0;
                i += 1;
            }
        }
        out
    }

    #[test]
    fn test_permutations_count() {
        assert_eq!(permutations(1).len(), 1);
        assert_eq!(permutations(4).len(), 24);
        let mut all = permutations(5);
        all.sort();
        all.dedup();
        assert_eq!(all.len(), 120);
    }
}
