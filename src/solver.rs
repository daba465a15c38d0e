//! Best-first search over a [`Puzzle`] with a pluggable heuristic.
//!
//! One engine serves both evaluation policies:
//! - [`Policy::AStar`] orders the frontier by `f = g + h` and returns a
//!   cost-optimal path whenever the heuristic is admissible and consistent.
//! - [`Policy::Greedy`] orders by `f = h` only. It usually expands fewer
//!   nodes but gives no optimality guarantee.
//!
//! Duplicate detection is by state value. The frontier is a binary heap
//! without decrease-key: when a cheaper path to an unsettled state is found,
//! the best-cost table is overwritten and a fresh node is pushed, and the
//! stale copy is discarded when it is eventually popped.
use crate::engine::{Action, Puzzle, State};
use crate::heuristics::Heuristic;
use log::{debug, trace};
use std::cmp::{Ordering, Reverse};
use std::collections::hash_map::Entry;
use std::collections::{BinaryHeap, HashMap, HashSet};
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};

/// Expansion budget used when none is given. Large enough to settle every
/// reachable state of a 3x3 board.
pub const DEFAULT_MAX_EXPANSIONS: u64 = 200_000;

/// How the frontier is ordered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum Policy {
    /// `f = g + h`.
    AStar,
    /// `f = h`.
    Greedy,
}

impl Policy {
    pub fn evaluate(self, g: u32, h: u32) -> u32 {
        match self {
            Policy::AStar => g.saturating_add(h),
            Policy::Greedy => h,
        }
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Policy::AStar => "A*",
            Policy::Greedy => "greedy",
        })
    }
}

/// Search configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchConfig {
    pub policy: Policy,
    /// Hard cap on settled nodes before the search gives up.
    pub max_expansions: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            policy: Policy::AStar,
            max_expansions: DEFAULT_MAX_EXPANSIONS,
        }
    }
}

/// A search-tree entry. Immutable once built; `g`, `h` and `f` are fixed at
/// creation.
#[derive(Debug)]
pub struct Node {
    state: State,
    parent: Option<Rc<Node>>,
    action: Option<Action>,
    g: u32,
    h: u32,
    f: u32,
}

impl Node {
    fn root(state: State, h: u32, policy: Policy) -> Self {
        Node {
            state,
            parent: None,
            action: None,
            g: 0,
            h,
            f: policy.evaluate(0, h),
        }
    }

    fn child(parent: &Rc<Node>, action: Action, state: State, g: u32, h: u32, policy: Policy) -> Self {
        Node {
            state,
            parent: Some(Rc::clone(parent)),
            action: Some(action),
            g,
            h,
            f: policy.evaluate(g, h),
        }
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn parent(&self) -> Option<&Node> {
        self.parent.as_deref()
    }

    /// The action that produced this node, `None` at the root.
    pub fn action(&self) -> Option<Action> {
        self.action
    }

    /// Path cost from the root.
    pub fn g(&self) -> u32 {
        self.g
    }

    pub fn h(&self) -> u32 {
        self.h
    }

    pub fn f(&self) -> u32 {
        self.f
    }
}

impl Drop for Node {
    // Unlink the parent chain iteratively so long paths don't recurse on drop.
    fn drop(&mut self) {
        let mut next = self.parent.take();
        while let Some(rc) = next {
            match Rc::try_unwrap(rc) {
                Ok(mut node) => next = node.parent.take(),
                Err(_) => break,
            }
        }
    }
}

/// Counters collected during one search run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Nodes popped, settled and expanded (goal test included).
    pub nodes_expanded: u64,
    /// Nodes pushed onto the frontier, root included.
    pub nodes_generated: u64,
    /// Pushes for states that already had a more expensive recorded cost.
    pub reopened: u64,
    /// Largest frontier size seen.
    pub frontier_high_water: usize,
}

/// Why a search ended without reaching the goal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Termination {
    /// Every state reachable from the initial state was settled.
    FrontierEmpty,
    /// `max_expansions` nodes were expanded.
    BudgetReached,
    /// The cancellation flag was raised.
    Cancelled,
}

/// Outcome of a search run.
#[derive(Debug)]
pub enum SearchResult {
    Found { goal: Rc<Node>, stats: SearchStats },
    Exhausted { reason: Termination, stats: SearchStats },
}

impl SearchResult {
    pub fn stats(&self) -> &SearchStats {
        match self {
            SearchResult::Found { stats, .. } | SearchResult::Exhausted { stats, .. } => stats,
        }
    }

    pub fn nodes_expanded(&self) -> u64 {
        self.stats().nodes_expanded
    }

    pub fn goal_node(&self) -> Option<&Node> {
        match self {
            SearchResult::Found { goal, .. } => Some(&**goal),
            SearchResult::Exhausted { .. } => None,
        }
    }

    /// Path cost of the solution, if one was found.
    pub fn cost(&self) -> Option<u32> {
        self.goal_node().map(Node::g)
    }

    pub fn is_found(&self) -> bool {
        matches!(self, SearchResult::Found { .. })
    }
}

/// Frontier entry ordered by `(f, h, creation order)`, smallest first.
struct FrontierEntry {
    f: u32,
    h: u32,
    order: u64,
    node: Rc<Node>,
}

impl FrontierEntry {
    fn key(&self) -> Reverse<(u32, u32, u64)> {
        Reverse((self.f, self.h, self.order))
    }
}

impl PartialEq for FrontierEntry {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for FrontierEntry {}

impl PartialOrd for FrontierEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FrontierEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

/// An entry whose state is settled, or that a cheaper path has superseded.
fn is_stale(entry: &FrontierEntry, settled: &HashSet<State>, best_cost: &HashMap<State, u32>) -> bool {
    let state = entry.node.state();
    settled.contains(state) || best_cost.get(state).map_or(false, |&best| best < entry.node.g())
}

/// Configures and runs searches over one puzzle.
///
/// Each call to [`Solver::solve`] owns a fresh frontier, best-cost table and
/// settled set, so a `Solver` can be reused and independent solvers can run
/// on separate threads.
pub struct Solver<'p, H> {
    puzzle: &'p Puzzle,
    heuristic: H,
    config: SearchConfig,
}

impl<'p> Solver<'p, crate::heuristics::Manhattan> {
    /// A* with Manhattan distance and the default budget.
    pub fn new(puzzle: &'p Puzzle) -> Self {
        Solver {
            puzzle,
            heuristic: crate::heuristics::Manhattan,
            config: SearchConfig::default(),
        }
    }
}

impl<'p, H: Heuristic> Solver<'p, H> {
    pub fn heuristic<H2: Heuristic>(self, heuristic: H2) -> Solver<'p, H2> {
        Solver {
            puzzle: self.puzzle,
            heuristic,
            config: self.config,
        }
    }

    pub fn policy(mut self, policy: Policy) -> Self {
        self.config.policy = policy;
        self
    }

    pub fn max_expansions(mut self, max_expansions: u64) -> Self {
        self.config.max_expansions = max_expansions;
        self
    }

    pub fn config(mut self, config: SearchConfig) -> Self {
        self.config = config;
        self
    }

    pub fn solve(&self) -> SearchResult {
        self.run(None)
    }

    /// Like [`Solver::solve`], but checks `cancel` once per loop iteration and
    /// stops with [`Termination::Cancelled`] when it is set.
    pub fn solve_with_cancel(&self, cancel: &AtomicBool) -> SearchResult {
        self.run(Some(cancel))
    }

    fn run(&self, cancel: Option<&AtomicBool>) -> SearchResult {
        let puzzle = self.puzzle;
        let goal = puzzle.goal();
        let policy = self.config.policy;
        let mut stats = SearchStats::default();

        let initial = puzzle.initial().clone();
        let root_h = self.heuristic.estimate(&initial, goal);
        debug!(
            "search start: policy={} heuristic={} h0={} budget={}",
            policy,
            self.heuristic.name(),
            root_h,
            self.config.max_expansions
        );

        let root = Rc::new(Node::root(initial, root_h, policy));
        if puzzle.is_goal(root.state()) {
            debug!("initial state is the goal");
            return SearchResult::Found { goal: root, stats };
        }

        let mut frontier = BinaryHeap::new();
        let mut best_cost: HashMap<State, u32> = HashMap::new();
        let mut settled: HashSet<State> = HashSet::new();

        best_cost.insert(root.state().clone(), 0);
        frontier.push(FrontierEntry {
            f: root.f(),
            h: root.h(),
            order: stats.nodes_generated,
            node: root,
        });
        stats.nodes_generated += 1;
        stats.frontier_high_water = 1;

        loop {
            if cancel.map_or(false, |flag| flag.load(AtomicOrdering::Relaxed)) {
                debug!("search cancelled after {} expansions", stats.nodes_expanded);
                return SearchResult::Exhausted {
                    reason: Termination::Cancelled,
                    stats,
                };
            }
            if stats.nodes_expanded >= self.config.max_expansions {
                // Only stale entries left means the component is already exhausted.
                while frontier
                    .peek()
                    .map_or(false, |entry| is_stale(entry, &settled, &best_cost))
                {
                    frontier.pop();
                }
                if frontier.is_empty() {
                    debug!(
                        "frontier empty after settling {} states",
                        stats.nodes_expanded
                    );
                    return SearchResult::Exhausted {
                        reason: Termination::FrontierEmpty,
                        stats,
                    };
                }
                debug!("expansion budget of {} reached", self.config.max_expansions);
                return SearchResult::Exhausted {
                    reason: Termination::BudgetReached,
                    stats,
                };
            }
            let Some(entry) = frontier.pop() else {
                debug!(
                    "frontier empty after settling {} states",
                    stats.nodes_expanded
                );
                return SearchResult::Exhausted {
                    reason: Termination::FrontierEmpty,
                    stats,
                };
            };

            if is_stale(&entry, &settled, &best_cost) {
                continue;
            }
            let node = entry.node;

            let newly_settled = settled.insert(node.state().clone());
            debug_assert!(newly_settled, "state settled twice");
            stats.nodes_expanded += 1;

            if puzzle.is_goal(node.state()) {
                debug!(
                    "goal found: cost={} expanded={} generated={}",
                    node.g(),
                    stats.nodes_expanded,
                    stats.nodes_generated
                );
                return SearchResult::Found { goal: node, stats };
            }

            for (action, next) in puzzle.successors(node.state()) {
                if settled.contains(&next) {
                    continue;
                }
                let g = node.g() + puzzle.step_cost(node.state(), action, &next);
                match best_cost.entry(next.clone()) {
                    Entry::Occupied(mut e) => {
                        if g >= *e.get() {
                            continue;
                        }
                        trace!("cheaper path to known state: {} -> {}", e.get(), g);
                        e.insert(g);
                        stats.reopened += 1;
                    }
                    Entry::Vacant(e) => {
                        e.insert(g);
                    }
                }

                let h = self.heuristic.estimate(&next, goal);
                let child = Node::child(&node, action, next, g, h, policy);
                frontier.push(FrontierEntry {
                    f: child.f(),
                    h: child.h(),
                    order: stats.nodes_generated,
                    node: Rc::new(child),
                });
                stats.nodes_generated += 1;
            }
            stats.frontier_high_water = stats.frontier_high_water.max(frontier.len());
        }
    }
}

/// Runs one search with explicit parameters.
pub fn solve<H: Heuristic>(
    problem: &Puzzle,
    heuristic: H,
    policy: Policy,
    expansion_budget: u64,
) -> SearchResult {
    Solver::new(problem)
        .heuristic(heuristic)
        .policy(policy)
        .max_expansions(expansion_budget)
        .solve()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Grid;
    use crate::heuristics::{HeuristicKind, LinearConflict, Manhattan, MisplacedTiles};
    use crate::path::reconstruct;
    use crate::test_support::reachable_distances;
    use crate::utils::{canonical_goal, scramble};

    fn goal_grid() -> Grid {
        vec![vec![1, 2, 3], vec![4, 5, 6], vec![7, 8, 0]]
    }

    fn puzzle(initial: Grid) -> Puzzle {
        Puzzle::new(&initial, &goal_grid()).unwrap()
    }

    /// Replays the solution's actions from the initial state.
    fn replay(p: &Puzzle, result: &SearchResult) -> State {
        let steps = reconstruct(result.goal_node().unwrap());
        let mut state = p.initial().clone();
        for step in steps.iter().skip(1) {
            state = p.transition(&state, step.action.unwrap()).unwrap();
        }
        state
    }

    #[test]
    fn test_initial_state_is_goal() {
        let p = puzzle(goal_grid());
        let result = Solver::new(&p).solve();
        assert_eq!(result.cost(), Some(0));
        assert_eq!(result.nodes_expanded(), 0);
        let goal = result.goal_node().unwrap();
        assert!(goal.parent().is_none());
        assert_eq!(goal.h(), 0);
    }

    #[test]
    fn test_easy_instance_two_moves() {
        let p = puzzle(vec![vec![1, 2, 3], vec![4, 0, 6], vec![7, 5, 8]]);
        assert!(p.is_solvable());
        let result = solve(&p, Manhattan, Policy::AStar, DEFAULT_MAX_EXPANSIONS);
        assert!(result.is_found());
        assert_eq!(result.cost(), Some(2));
        let goal = result.goal_node().unwrap();
        assert_eq!(goal.h(), 0);
        assert_eq!(goal.f(), 2);
        let steps = reconstruct(goal);
        assert_eq!(steps[0].h, 2);
        let actions: Vec<Action> = steps.iter().filter_map(|s| s.action).collect();
        assert_eq!(actions, vec![Action::Down, Action::Right]);
        assert!(p.is_goal(&replay(&p, &result)));
    }

    #[test]
    fn test_blank_bottom_left_instance() {
        let p = puzzle(vec![vec![1, 2, 3], vec![4, 5, 6], vec![0, 7, 8]]);
        assert!(p.is_solvable());
        let result = solve(&p, Manhattan, Policy::AStar, DEFAULT_MAX_EXPANSIONS);
        let optimal = reachable_distances(p.goal().state())[p.initial()];
        assert_eq!(optimal, 2);
        assert_eq!(result.cost(), Some(optimal));
        assert!(p.is_goal(&replay(&p, &result)));
    }

    #[test]
    fn test_unsolvable_instance_settles_whole_component() {
        let p = puzzle(vec![vec![2, 8, 3], vec![1, 6, 4], vec![7, 0, 5]]);
        assert!(!p.is_solvable());
        let result = solve(&p, Manhattan, Policy::AStar, DEFAULT_MAX_EXPANSIONS);
        match result {
            SearchResult::Exhausted { reason, stats } => {
                assert_eq!(reason, Termination::FrontierEmpty);
                assert_eq!(stats.nodes_expanded, 181_440);
            }
            SearchResult::Found { .. } => panic!("found a path to an unreachable goal"),
        }
    }

    #[test]
    fn test_budget_reached() {
        let p = puzzle(vec![vec![2, 8, 3], vec![1, 6, 4], vec![7, 0, 5]]);
        let result = Solver::new(&p).max_expansions(50).solve();
        assert!(matches!(
            result,
            SearchResult::Exhausted {
                reason: Termination::BudgetReached,
                ..
            }
        ));
        assert_eq!(result.nodes_expanded(), 50);
    }

    #[test]
    fn test_cancelled_before_first_pop() {
        let p = puzzle(vec![vec![1, 2, 3], vec![4, 0, 6], vec![7, 5, 8]]);
        let cancel = AtomicBool::new(true);
        let result = Solver::new(&p).solve_with_cancel(&cancel);
        assert!(matches!(
            result,
            SearchResult::Exhausted {
                reason: Termination::Cancelled,
                ..
            }
        ));
        assert_eq!(result.nodes_expanded(), 0);

        cancel.store(false, AtomicOrdering::Relaxed);
        assert_eq!(Solver::new(&p).solve_with_cancel(&cancel).cost(), Some(2));
    }

    #[test]
    fn test_astar_matches_bfs_on_scrambled_instances() {
        let goal = canonical_goal(3, 3).unwrap();
        let distances = reachable_distances(&goal);
        for seed in 0..40 {
            let start = scramble(&goal, 5 + (seed as usize % 16), seed);
            let p = Puzzle::from_states(start.clone(), goal.clone()).unwrap();
            let optimal = distances[&start];
            assert!(optimal <= 20);
            for kind in HeuristicKind::ALL {
                let result = solve(&p, kind, Policy::AStar, DEFAULT_MAX_EXPANSIONS);
                assert_eq!(result.cost(), Some(optimal), "seed {} with {}", seed, kind.name());
                assert!(p.is_goal(&replay(&p, &result)));
            }
        }
    }

    #[test]
    fn test_astar_optimal_on_hardest_3x3_instance() {
        let goal = canonical_goal(3, 3).unwrap();
        let distances = reachable_distances(&goal);
        let (hardest, &depth) = distances.iter().max_by_key(|&(_, &d)| d).unwrap();
        assert_eq!(depth, 31);
        let p = Puzzle::from_states(hardest.clone(), goal).unwrap();
        let result = Solver::new(&p).heuristic(LinearConflict).solve();
        assert_eq!(result.cost(), Some(31));
    }

    #[test]
    fn test_greedy_terminates_with_valid_path() {
        let goal = canonical_goal(3, 3).unwrap();
        let distances = reachable_distances(&goal);
        for seed in 0..20 {
            let start = scramble(&goal, 25, seed);
            let p = Puzzle::from_states(start.clone(), goal.clone()).unwrap();
            let greedy = solve(&p, Manhattan, Policy::Greedy, DEFAULT_MAX_EXPANSIONS);
            let astar = solve(&p, Manhattan, Policy::AStar, DEFAULT_MAX_EXPANSIONS);
            assert!(greedy.is_found() && astar.is_found());
            // Greedy may be longer but never shorter than optimal.
            assert!(greedy.cost().unwrap() >= distances[&start]);
            assert_eq!(astar.cost(), Some(distances[&start]));
            assert!(p.is_goal(&replay(&p, &greedy)));
            let goal_node = greedy.goal_node().unwrap();
            assert_eq!(goal_node.f(), goal_node.h());
        }
    }

    #[test]
    fn test_tie_break_prefers_smaller_h() {
        let a = FrontierEntry {
            f: 4,
            h: 3,
            order: 0,
            node: Rc::new(Node::root(canonical_goal(2, 2).unwrap(), 3, Policy::AStar)),
        };
        let b = FrontierEntry {
            f: 4,
            h: 1,
            order: 1,
            node: Rc::new(Node::root(canonical_goal(2, 2).unwrap(), 1, Policy::AStar)),
        };
        let c = FrontierEntry {
            f: 3,
            h: 3,
            order: 2,
            node: Rc::new(Node::root(canonical_goal(2, 2).unwrap(), 3, Policy::AStar)),
        };
        let mut heap = BinaryHeap::new();
        heap.push(a);
        heap.push(b);
        heap.push(c);
        let popped: Vec<u64> = std::iter::from_fn(|| heap.pop().map(|e| e.order)).collect();
        assert_eq!(popped, vec![2, 1, 0]);
    }

    #[test]
    fn test_settled_states_counted_once() {
        // Exhausting a 2x3 component: every reachable state is settled exactly once.
        let goal = canonical_goal(3, 2).unwrap();
        let unreachable = State::encode(&[vec![2, 1, 3], vec![4, 5, 0]]).unwrap();
        let p = Puzzle::from_states(unreachable.clone(), goal).unwrap();
        let result = solve(&p, MisplacedTiles, Policy::AStar, DEFAULT_MAX_EXPANSIONS);
        assert_eq!(
            result.nodes_expanded(),
            reachable_distances(&unreachable).len() as u64
        );
        assert_eq!(result.nodes_expanded(), 360);
    }

    #[test]
    fn test_exhausted_component_with_exact_budget() {
        let goal = canonical_goal(3, 2).unwrap();
        let unreachable = State::encode(&[vec![2, 1, 3], vec![4, 5, 0]]).unwrap();
        let p = Puzzle::from_states(unreachable, goal).unwrap();
        for budget in [360, 1_000] {
            match solve(&p, MisplacedTiles, Policy::AStar, budget) {
                SearchResult::Exhausted { reason, stats } => {
                    assert_eq!(reason, Termination::FrontierEmpty, "budget {}", budget);
                    assert_eq!(stats.nodes_expanded, 360);
                }
                SearchResult::Found { .. } => panic!("found a path to an unreachable goal"),
            }
        }
        let short = solve(&p, MisplacedTiles, Policy::AStar, 359);
        assert!(matches!(
            short,
            SearchResult::Exhausted {
                reason: Termination::BudgetReached,
                ..
            }
        ));
    }

    #[test]
    fn test_reopening_with_inconsistent_heuristic() {
        // Triples Manhattan unless tile 1 is home, so h jumps between
        // neighbours and some states are first reached along a costlier path.
        struct Skewed;
        impl Heuristic for Skewed {
            fn estimate(&self, state: &State, goal: &crate::engine::Goal) -> u32 {
                let m = crate::heuristics::manhattan_distance(state, goal);
                if state.cells()[0] == 1 {
                    m
                } else {
                    m * 3
                }
            }
            fn name(&self) -> &'static str {
                "skewed"
            }
        }

        let goal = canonical_goal(3, 3).unwrap();
        let mut any_reopened = false;
        for seed in 0..15 {
            let start = scramble(&goal, 20, seed);
            let p = Puzzle::from_states(start, goal.clone()).unwrap();
            let result = Solver::new(&p).heuristic(Skewed).solve();
            assert!(result.is_found());
            assert!(p.is_goal(&replay(&p, &result)));
            any_reopened |= result.stats().reopened > 0;
        }
        assert!(any_reopened);
    }

    #[test]
    fn test_stats_are_consistent() {
        let p = puzzle(vec![vec![4, 1, 3], vec![7, 2, 6], vec![0, 5, 8]]);
        let result = Solver::new(&p).solve();
        let stats = *result.stats();
        assert!(stats.nodes_expanded >= 1);
        assert!(stats.nodes_generated >= stats.nodes_expanded);
        assert!(stats.frontier_high_water >= 1);
        assert_eq!(result.cost(), Some(6));
    }

    #[test]
    fn test_dyn_heuristic_through_reference() {
        let p = puzzle(vec![vec![1, 2, 3], vec![4, 0, 6], vec![7, 5, 8]]);
        let h: &dyn Heuristic = &LinearConflict;
        assert_eq!(solve(&p, h, Policy::AStar, 1_000).cost(), Some(2));
    }

    #[test]
    fn test_long_greedy_chain_drops_cleanly() {
        let goal = canonical_goal(4, 4).unwrap();
        let start = scramble(&goal, 200, 3);
        let p = Puzzle::from_states(start, goal).unwrap();
        let result = Solver::new(&p)
            .heuristic(MisplacedTiles)
            .policy(Policy::Greedy)
            .max_expansions(50_000)
            .solve();
        if let Some(goal_node) = result.goal_node() {
            assert_eq!(reconstruct(goal_node).len() as u32, goal_node.g() + 1);
        }
        drop(result);
    }
}
