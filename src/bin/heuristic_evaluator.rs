use clap::Parser;
use std::collections::HashMap;
use tile_puzzle_solver::engine::Puzzle;
use tile_puzzle_solver::heuristics::{Heuristic, HeuristicKind};
use tile_puzzle_solver::solver::{Policy, Solver, DEFAULT_MAX_EXPANSIONS};
use tile_puzzle_solver::utils::{canonical_goal, random_solvable, scramble};

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Number of random boards to evaluate
    #[clap(short, long, default_value_t = 20)]
    boards: u64,

    /// Seed of the first board; board `i` uses `seed + i`
    #[clap(short, long, default_value_t = 0)]
    seed: u64,

    /// Scramble by a random walk of this many moves instead of a uniform shuffle
    #[clap(long)]
    scramble_moves: Option<usize>,

    #[clap(long, default_value_t = 3)]
    width: usize,

    #[clap(long, default_value_t = 3)]
    height: usize,

    /// Per-search expansion budget
    #[clap(short, long, default_value_t = DEFAULT_MAX_EXPANSIONS)]
    max_expansions: u64,
}

#[derive(Default)]
struct Tally {
    runs: u64,
    solved: u64,
    total_cost: u64,
    total_expanded: u64,
}

impl Tally {
    /// Mean solution cost over the runs that found one.
    fn avg_cost(&self) -> Option<f64> {
        (self.solved > 0).then(|| self.total_cost as f64 / self.solved as f64)
    }

    /// Mean expansions over every run, failed ones included.
    fn avg_expanded(&self) -> Option<f64> {
        (self.runs > 0).then(|| self.total_expanded as f64 / self.runs as f64)
    }
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let goal = match canonical_goal(args.width, args.height) {
        Ok(goal) => goal,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    let combos: Vec<(Policy, HeuristicKind)> = [Policy::AStar, Policy::Greedy]
        .into_iter()
        .flat_map(|p| HeuristicKind::ALL.into_iter().map(move |h| (p, h)))
        .collect();
    let mut tallies: HashMap<(Policy, HeuristicKind), Tally> = HashMap::new();

    println!(
        "Evaluating {} boards of size {}x{}...",
        args.boards, args.height, args.width
    );

    for board_idx in 0..args.boards {
        let seed = args.seed + board_idx;
        let start = match args.scramble_moves {
            Some(moves) => scramble(&goal, moves, seed),
            None => random_solvable(&goal, seed),
        };
        let puzzle = match Puzzle::from_states(start, goal.clone()) {
            Ok(puzzle) => puzzle,
            Err(e) => {
                eprintln!("Board {} (seed {}): {}", board_idx, seed, e);
                continue;
            }
        };

        println!("\nBoard {} (seed {}):\n{}", board_idx, seed, puzzle.initial());
        for &(policy, kind) in &combos {
            let result = Solver::new(&puzzle)
                .heuristic(kind)
                .policy(policy)
                .max_expansions(args.max_expansions)
                .solve();
            let tally = tallies.entry((policy, kind)).or_default();
            tally.runs += 1;
            tally.total_expanded += result.nodes_expanded();
            match result.cost() {
                Some(cost) => {
                    tally.solved += 1;
                    tally.total_cost += u64::from(cost);
                    println!(
                        "  {:<8} {:<16} cost {:<4} expanded {}",
                        policy,
                        kind.name(),
                        cost,
                        result.nodes_expanded()
                    );
                }
                None => println!(
                    "  {:<8} {:<16} no solution, expanded {}",
                    policy,
                    kind.name(),
                    result.nodes_expanded()
                ),
            }
        }
    }

    println!("\n--- Averages (cost over solved boards, expansions over all runs) ---");
    for combo in &combos {
        let (policy, kind) = *combo;
        let Some(tally) = tallies.get(combo) else {
            continue;
        };
        let (Some(avg_cost), Some(avg_expanded)) = (tally.avg_cost(), tally.avg_expanded()) else {
            println!("{:<8} {:<16} solved none", policy, kind.name());
            continue;
        };
        println!(
            "{:<8} {:<16} solved {:>3}/{:<3} avg cost {:>7.2} avg expanded {:>10.1}",
            policy,
            kind.name(),
            tally.solved,
            tally.runs,
            avg_cost,
            avg_expanded
        );
    }
}
