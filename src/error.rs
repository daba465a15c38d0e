//! Typed errors for puzzle construction and state transitions.
//!
//! Search outcomes are not errors: running out of budget or frontier is
//! reported through [`crate::solver::SearchResult::Exhausted`].

use crate::engine::Action;
use std::fmt;

/// Failure raised while building or manipulating puzzle states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PuzzleError {
    /// The input grid is not a permutation of `0..N` laid out as a rectangle,
    /// or the initial and goal grids have different shapes.
    InvalidGrid { detail: String },
    /// A transition was requested for a move that would push the blank off the grid.
    IllegalAction { action: Action, row: usize, col: usize },
}

impl PuzzleError {
    pub(crate) fn invalid_grid(detail: impl Into<String>) -> Self {
        PuzzleError::InvalidGrid {
            detail: detail.into(),
        }
    }
}

impl fmt::Display for PuzzleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PuzzleError::InvalidGrid { detail } => write!(f, "invalid grid: {}", detail),
            PuzzleError::IllegalAction { action, row, col } => write!(
                f,
                "illegal action {} with the blank at row {}, column {}",
                action, row, col
            ),
        }
    }
}

impl std::error::Error for PuzzleError {}
