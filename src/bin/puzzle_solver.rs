use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tile_puzzle_solver::engine::{Grid, Puzzle};
use tile_puzzle_solver::heuristics::{Heuristic, HeuristicKind};
use tile_puzzle_solver::path::reconstruct;
use tile_puzzle_solver::solver::{Policy, SearchResult, Solver, Termination, DEFAULT_MAX_EXPANSIONS};
use tile_puzzle_solver::utils::{canonical_goal, grid_from_str, render_state};

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Path to the initial board (one row per line, `0` or `_` for the blank)
    board_file: PathBuf,

    /// Path to the goal board; defaults to 1..N in order with the blank last
    #[clap(short, long)]
    goal: Option<PathBuf>,

    /// Heuristic used to order the frontier
    #[clap(long, value_enum, default_value_t = HeuristicKind::Manhattan)]
    heuristic: HeuristicKind,

    /// Evaluation policy: `a-star` (f = g + h) or `greedy` (f = h)
    #[clap(short, long, value_enum, default_value_t = Policy::AStar)]
    policy: Policy,

    /// Maximum number of node expansions before giving up
    #[clap(short, long, default_value_t = DEFAULT_MAX_EXPANSIONS)]
    max_expansions: u64,

    /// Search even if the parity check says the goal is unreachable
    #[clap(long)]
    skip_solvability_check: bool,
}

fn read_grid(path: &Path) -> Result<Grid, String> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    grid_from_str(&content).map_err(|e| format!("Invalid board in {}: {}", path.display(), e))
}

fn load_puzzle(args: &Args) -> Result<Puzzle, String> {
    let initial = read_grid(&args.board_file)?;
    let goal = match &args.goal {
        Some(path) => read_grid(path)?,
        None => {
            let width = initial.first().map_or(0, Vec::len);
            canonical_goal(width, initial.len())
                .map_err(|e| e.to_string())?
                .decode()
        }
    };
    Puzzle::new(&initial, &goal).map_err(|e| e.to_string())
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    let puzzle = match load_puzzle(&args) {
        Ok(puzzle) => puzzle,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    println!("Initial board:\n{}\n", render_state(puzzle.initial()));
    println!("Goal board:\n{}\n", render_state(puzzle.goal().state()));

    let solvable = puzzle.is_solvable();
    println!("Solvable: {}", if solvable { "yes" } else { "no" });
    if !solvable && !args.skip_solvability_check {
        println!("The goal cannot be reached from this board.");
        return ExitCode::from(2);
    }

    println!("Heuristics at the initial board:");
    for (kind, value) in HeuristicKind::compare(puzzle.initial(), puzzle.goal()) {
        println!("  {:<16} {}", kind.name(), value);
    }
    println!();

    println!(
        "Searching with {} / {} (budget {} expansions)...\n",
        args.policy,
        args.heuristic.name(),
        args.max_expansions
    );
    let result = Solver::new(&puzzle)
        .heuristic(args.heuristic)
        .policy(args.policy)
        .max_expansions(args.max_expansions)
        .solve();
    let stats = *result.stats();

    match result {
        SearchResult::Found { goal, .. } => {
            let steps = reconstruct(&goal);
            println!("Solution found:\n");
            println!("Cost: {}", goal.g());
            println!("Nodes expanded: {}", stats.nodes_expanded);
            println!("Nodes generated: {}", stats.nodes_generated);
            println!("Largest frontier: {}\n", stats.frontier_high_water);
            for (i, step) in steps.iter().enumerate() {
                match step.action {
                    Some(action) => println!("Step {}: {}", i, action),
                    None => println!("Step {}: initial", i),
                }
                println!("{}", render_state(&step.state));
                println!("g = {}, h = {}, f = {}\n", step.g, step.h, step.f);
            }
            ExitCode::SUCCESS
        }
        SearchResult::Exhausted { reason, .. } => {
            match reason {
                Termination::FrontierEmpty => {
                    println!("No solution: every reachable board was explored.")
                }
                Termination::BudgetReached => {
                    println!("No solution found within {} expansions.", args.max_expansions)
                }
                Termination::Cancelled => println!("Search cancelled."),
            }
            println!("Nodes expanded: {}", stats.nodes_expanded);
            ExitCode::from(1)
        }
    }
}
