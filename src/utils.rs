use crate::engine::{Action, Grid, State, Tile, BLANK};
use crate::error::PuzzleError;
use crate::solvability::is_solvable;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::fmt;

/// Builds the conventional goal for a `width` x `height` board: tiles
/// `1..N` in row-major order with the blank in the bottom-right corner.
///
/// # Errors
/// Returns [`PuzzleError::InvalidGrid`] if the board would be empty or larger
/// than [`crate::engine::MAX_CELLS`].
///
/// # Examples
/// ```
/// use tile_puzzle_solver::utils::canonical_goal;
///
/// let goal = canonical_goal(3, 3).unwrap();
/// assert_eq!(goal.decode(), vec![vec![1, 2, 3], vec![4, 5, 6], vec![7, 8, 0]]);
/// assert_eq!(goal.blank_index(), 8);
/// ```
pub fn canonical_goal(width: usize, height: usize) -> Result<State, PuzzleError> {
    let n = width * height;
    if n > crate::engine::MAX_CELLS {
        return Err(PuzzleError::invalid_grid(format!(
            "{}x{} board exceeds the maximum of {} cells",
            height,
            width,
            crate::engine::MAX_CELLS
        )));
    }
    let cells: Vec<Tile> = (1..n).map(|v| v as Tile).chain(std::iter::once(BLANK)).collect();
    State::from_cells(width, cells)
}

/// Parses a board written as whitespace-separated integers, one row per line.
///
/// `0` or `_` marks the blank. Empty lines and lines starting with `#` are
/// skipped. Only the text format is checked here; permutation validity is
/// checked when the grid is encoded.
///
/// # Returns
/// * `Ok(Grid)` with one inner vector per non-empty line.
/// * `Err(String)` if a token is neither `_` nor an integer in `0..=255`, or
///   if no rows are found.
///
/// # Examples
/// ```
/// use tile_puzzle_solver::utils::grid_from_str;
///
/// let grid = grid_from_str("1 2 3\n4 _ 6\n# comment\n7 5 8\n").unwrap();
/// assert_eq!(grid, vec![vec![1, 2, 3], vec![4, 0, 6], vec![7, 5, 8]]);
///
/// assert!(grid_from_str("1 2 x").is_err());
/// assert!(grid_from_str("\n\n").is_err());
/// ```
pub fn grid_from_str(s: &str) -> Result<Grid, String> {
    let mut grid = Vec::new();
    for (line_no, line) in s.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let row = line
            .split_whitespace()
            .map(|token| match token {
                "_" => Ok(BLANK),
                _ => token.parse::<Tile>().map_err(|_| {
                    format!("Unrecognized token '{}' on line {}", token, line_no + 1)
                }),
            })
            .collect::<Result<Vec<Tile>, String>>()?;
        grid.push(row);
    }
    if grid.is_empty() {
        return Err("Board contains no rows".to_string());
    }
    Ok(grid)
}

/// Renders `state` as right-aligned columns with `_` for the blank.
pub fn render_state(state: &State) -> String {
    let cell_width = (state.len() - 1).to_string().len();
    state
        .cells()
        .chunks(state.width())
        .map(|row| {
            row.iter()
                .map(|&t| {
                    if t == BLANK {
                        format!("{:>w$}", "_", w = cell_width)
                    } else {
                        format!("{:>w$}", t, w = cell_width)
                    }
                })
                .collect::<Vec<String>>()
                .join(" ")
        })
        .collect::<Vec<String>>()
        .join("\n")
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", render_state(self))
    }
}

/// Walks the blank `moves` steps from `start` in random directions, never
/// undoing the previous move. The result is always reachable from `start`.
///
/// The same seed always yields the same state.
pub fn scramble(start: &State, moves: usize, seed: u64) -> State {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut current = start.clone();
    let mut last: Option<Action> = None;
    for _ in 0..moves {
        let options: Vec<Action> = current
            .legal_actions()
            .filter(|&a| last.map_or(true, |prev| a != prev.opposite()))
            .collect();
        // A 1x1 board has no moves at all.
        let Some(&action) = options.choose(&mut rng) else {
            break;
        };
        if let Some(next) = current.apply(action) {
            current = next;
            last = Some(action);
        }
    }
    current
}

/// A uniformly random state that can reach `goal`.
///
/// On a 2-D board the cells are shuffled once; if the draw lands in the other
/// parity class, swapping two tiles moves it across. On a single row or
/// column the tiles can never pass each other, so only the blank moves.
///
/// The same seed always yields the same state.
pub fn random_solvable(goal: &State, seed: u64) -> State {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut cells = goal.cells().to_vec();

    if goal.width() == 1 || goal.height() == 1 {
        cells.retain(|&t| t != BLANK);
        let slot = rng.gen_range(0..=cells.len());
        cells.insert(slot, BLANK);
        return State::from_cells(goal.width(), cells).unwrap_or_else(|_| goal.clone());
    }

    cells.shuffle(&mut rng);
    let Ok(mut state) = State::from_cells(goal.width(), cells.clone()) else {
        return goal.clone();
    };
    if !is_solvable(&state, goal) {
        let tiles: Vec<usize> = (0..cells.len()).filter(|&i| cells[i] != BLANK).take(2).collect();
        if let [a, b] = tiles[..] {
            cells.swap(a, b);
        }
        state = State::from_cells(goal.width(), cells).unwrap_or_else(|_| goal.clone());
    }
    state
}
