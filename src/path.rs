//! Turns a goal node into the ordered list of steps from the initial state.
use crate::engine::{Action, State};
use crate::solver::{Node, SearchResult};

/// One state on a solution path with the costs recorded when it was generated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PathStep {
    /// `None` for the initial state.
    pub action: Option<Action>,
    pub state: State,
    pub g: u32,
    pub h: u32,
    pub f: u32,
}

/// Walks parent links back to the root and returns the steps in play order.
pub fn reconstruct(goal: &Node) -> Vec<PathStep> {
    let mut steps: Vec<PathStep> = std::iter::successors(Some(goal), |node| node.parent())
        .map(|node| PathStep {
            action: node.action(),
            state: node.state().clone(),
            g: node.g(),
            h: node.h(),
            f: node.f(),
        })
        .collect();
    steps.reverse();
    steps
}

/// Steps for a found solution, `None` if the search was exhausted.
pub fn reconstruct_result(result: &SearchResult) -> Option<Vec<PathStep>> {
    result.goal_node().map(reconstruct)
}

/// Just the actions of a path, initial state skipped.
pub fn actions(steps: &[PathStep]) -> Vec<Action> {
    steps.iter().filter_map(|step| step.action).collect()
}
