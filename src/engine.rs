//! State-space model for sliding-tile puzzles.
//!
//! This module defines the puzzle's fundamental components:
//! - `State`: an immutable, value-compared board configuration (the compact
//!   encoding of a 2-D grid), with the blank's position cached.
//! - `Action`: a move of the blank one cell up, down, left or right.
//! - `Goal`: the target state plus a per-tile lookup of goal cells.
//! - `Puzzle`: the problem definition: initial state, goal, legal actions,
//!   transitions, unit step cost and the goal predicate.
use crate::error::PuzzleError;
use std::fmt;

/// A cell value. `BLANK` marks the empty cell, tiles are `1..N`.
pub type Tile = u8;

/// A board laid out as rows of cells, the raw input form of a state.
pub type Grid = Vec<Vec<Tile>>;

/// The value used for the blank cell in grids and states.
pub const BLANK: Tile = 0;

/// Largest number of cells a board may have so every value fits in a `Tile`.
pub const MAX_CELLS: usize = Tile::MAX as usize + 1;

/// A move of the blank relative to the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    Up,
    Down,
    Left,
    Right,
}

impl Action {
    /// Every action, in the order successors are generated.
    pub const ALL: [Action; 4] = [Action::Up, Action::Down, Action::Left, Action::Right];

    /// Row and column delta applied to the blank.
    pub fn offset(self) -> (isize, isize) {
        match self {
            Action::Up => (-1, 0),
            Action::Down => (1, 0),
            Action::Left => (0, -1),
            Action::Right => (0, 1),
        }
    }

    /// The action that undoes this one.
    pub fn opposite(self) -> Action {
        match self {
            Action::Up => Action::Down,
            Action::Down => Action::Up,
            Action::Left => Action::Right,
            Action::Right => Action::Left,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Action::Up => "UP",
            Action::Down => "DOWN",
            Action::Left => "LEFT",
            Action::Right => "RIGHT",
        };
        write!(f, "{}", s)
    }
}

/// An immutable board configuration stored row-major.
///
/// Equality and hashing cover the full cell sequence, so two independently
/// built states with the same layout are the same search node.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct State {
    width: usize,
    cells: Box<[Tile]>,
    blank: usize,
}

impl State {
    /// Encodes a grid into a state.
    ///
    /// # Errors
    /// Returns [`PuzzleError::InvalidGrid`] if the grid is empty, ragged, larger
    /// than [`MAX_CELLS`], or not a permutation of `0..N` (which also rules out
    /// a missing or repeated blank).
    pub fn encode(grid: &[Vec<Tile>]) -> Result<Self, PuzzleError> {
        let width = grid.first().map_or(0, Vec::len);
        if width == 0 {
            return Err(PuzzleError::invalid_grid("grid has no cells"));
        }
        if let Some((r, row)) = grid.iter().enumerate().find(|(_, row)| row.len() != width) {
            return Err(PuzzleError::invalid_grid(format!(
                "row {} has {} cells, expected {}",
                r,
                row.len(),
                width
            )));
        }
        let cells: Vec<Tile> = grid.iter().flatten().copied().collect();
        Self::from_cells(width, cells)
    }

    /// Builds a state from row-major cells and a row width.
    ///
    /// # Errors
    /// Same conditions as [`State::encode`], plus a cell count that is not a
    /// multiple of `width`.
    pub fn from_cells(width: usize, cells: Vec<Tile>) -> Result<Self, PuzzleError> {
        let n = cells.len();
        if width == 0 || n == 0 || n % width != 0 {
            return Err(PuzzleError::invalid_grid(format!(
                "{} cells cannot form rows of width {}",
                n, width
            )));
        }
        if n > MAX_CELLS {
            return Err(PuzzleError::invalid_grid(format!(
                "{} cells exceeds the maximum of {}",
                n, MAX_CELLS
            )));
        }

        let mut seen = vec![false; n];
        for &value in &cells {
            let v = value as usize;
            if v >= n {
                return Err(PuzzleError::invalid_grid(format!(
                    "value {} is out of range for {} cells",
                    value, n
                )));
            }
            if seen[v] {
                return Err(PuzzleError::invalid_grid(if value == BLANK {
                    "more than one blank".to_string()
                } else {
                    format!("value {} appears more than once", value)
                }));
            }
            seen[v] = true;
        }

        // A permutation of 0..n always contains exactly one blank.
        let blank = cells.iter().position(|&t| t == BLANK).unwrap_or_default();
        Ok(State {
            width,
            cells: cells.into_boxed_slice(),
            blank,
        })
    }

    /// Decodes the state back into rows. Exact inverse of [`State::encode`].
    pub fn decode(&self) -> Grid {
        self.cells.chunks(self.width).map(<[Tile]>::to_vec).collect()
    }

    /// Row-major index of the blank. Cached, O(1).
    pub fn blank_index(&self) -> usize {
        self.blank
    }

    /// `(row, col)` of the blank.
    pub fn blank_position(&self) -> (usize, usize) {
        (self.blank / self.width, self.blank % self.width)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.cells.len() / self.width
    }

    /// Number of cells, blank included.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Always false: a valid state has at least the blank.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[Tile] {
        &self.cells
    }

    /// Value at `(row, col)`.
    ///
    /// # Panics
    /// Panics if the coordinates lie outside the board.
    pub fn tile_at(&self, row: usize, col: usize) -> Tile {
        assert!(col < self.width, "column {} out of bounds", col);
        self.cells[row * self.width + col]
    }

    /// Whether `other` has the same width and height.
    pub fn same_shape(&self, other: &State) -> bool {
        self.width == other.width && self.cells.len() == other.cells.len()
    }

    /// Whether `action` keeps the blank on the board.
    pub fn is_legal(&self, action: Action) -> bool {
        let (row, col) = self.blank_position();
        match action {
            Action::Up => row > 0,
            Action::Down => row + 1 < self.height(),
            Action::Left => col > 0,
            Action::Right => col + 1 < self.width,
        }
    }

    /// Legal actions from this state, in [`Action::ALL`] order.
    pub fn legal_actions(&self) -> impl Iterator<Item = Action> + '_ {
        Action::ALL.into_iter().filter(move |&a| self.is_legal(a))
    }

    /// Applies `action`, or returns `None` if it is not legal here.
    pub fn apply(&self, action: Action) -> Option<State> {
        if !self.is_legal(action) {
            return None;
        }
        let target = match action {
            Action::Up => self.blank - self.width,
            Action::Down => self.blank + self.width,
            Action::Left => self.blank - 1,
            Action::Right => self.blank + 1,
        };
        let mut cells = self.cells.clone();
        cells.swap(self.blank, target);
        Some(State {
            width: self.width,
            cells,
            blank: target,
        })
    }
}

/// The goal state with each tile's goal cell precomputed.
#[derive(Clone, Debug)]
pub struct Goal {
    state: State,
    cell_of: Vec<usize>,
}

impl Goal {
    pub fn new(state: State) -> Self {
        let mut cell_of = vec![0; state.len()];
        for (idx, &tile) in state.cells().iter().enumerate() {
            cell_of[tile as usize] = idx;
        }
        Goal { state, cell_of }
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    /// Row-major goal index of `tile`.
    pub fn cell_of(&self, tile: Tile) -> usize {
        self.cell_of[tile as usize]
    }

    /// `(row, col)` where `tile` belongs.
    pub fn position_of(&self, tile: Tile) -> (usize, usize) {
        let idx = self.cell_of(tile);
        (idx / self.state.width(), idx % self.state.width())
    }
}

/// A sliding-tile problem: initial state, goal, and the move rules.
#[derive(Clone, Debug)]
pub struct Puzzle {
    initial: State,
    goal: Goal,
}

/// Builds a problem from raw grids. See [`Puzzle::new`].
pub fn new_problem(initial_grid: &[Vec<Tile>], goal_grid: &[Vec<Tile>]) -> Result<Puzzle, PuzzleError> {
    Puzzle::new(initial_grid, goal_grid)
}

impl Puzzle {
    /// Encodes both grids and checks that they describe the same board shape.
    ///
    /// # Errors
    /// Returns [`PuzzleError::InvalidGrid`] if either grid is malformed or the
    /// shapes differ.
    pub fn new(initial_grid: &[Vec<Tile>], goal_grid: &[Vec<Tile>]) -> Result<Self, PuzzleError> {
        let initial = State::encode(initial_grid)?;
        let goal = State::encode(goal_grid)?;
        Self::from_states(initial, goal)
    }

    /// # Errors
    /// Returns [`PuzzleError::InvalidGrid`] if the shapes differ.
    pub fn from_states(initial: State, goal: State) -> Result<Self, PuzzleError> {
        if !initial.same_shape(&goal) {
            return Err(PuzzleError::invalid_grid(format!(
                "initial grid is {}x{} but goal grid is {}x{}",
                initial.height(),
                initial.width(),
                goal.height(),
                goal.width()
            )));
        }
        Ok(Puzzle {
            initial,
            goal: Goal::new(goal),
        })
    }

    pub fn initial(&self) -> &State {
        &self.initial
    }

    pub fn goal(&self) -> &Goal {
        &self.goal
    }

    pub fn width(&self) -> usize {
        self.initial.width()
    }

    pub fn height(&self) -> usize {
        self.initial.height()
    }

    /// Legal actions from `state`, derived from the blank's row and column only.
    pub fn actions(&self, state: &State) -> Vec<Action> {
        state.legal_actions().collect()
    }

    /// Slides the blank in the direction of `action`.
    ///
    /// # Errors
    /// Returns [`PuzzleError::IllegalAction`] if `action` would move the blank
    /// off the board.
    pub fn transition(&self, state: &State, action: Action) -> Result<State, PuzzleError> {
        state.apply(action).ok_or_else(|| {
            let (row, col) = state.blank_position();
            PuzzleError::IllegalAction { action, row, col }
        })
    }

    /// Every move costs one.
    pub fn step_cost(&self, _state: &State, _action: Action, _next: &State) -> u32 {
        1
    }

    pub fn is_goal(&self, state: &State) -> bool {
        *state == self.goal.state
    }

    /// `(action, next_state)` for every legal action, in [`Action::ALL`] order.
    pub fn successors<'a>(&'a self, state: &'a State) -> impl Iterator<Item = (Action, State)> + 'a {
        Action::ALL
            .into_iter()
            .filter_map(move |a| state.apply(a).map(|next| (a, next)))
    }

    /// Whether the initial state can reach the goal. See [`crate::solvability::is_solvable`].
    pub fn is_solvable(&self) -> bool {
        crate::solvability::is_solvable(&self.initial, &self.goal.state)
    }
}
