//! Search node types stored in the memo table.

use uttt_core::{ActionMask, GameOutcome, Policy};

/// Statistics for one (state, action) edge.
#[derive(Clone, Debug, PartialEq)]
pub struct EdgeStats {
    /// Action index this edge takes.
    pub action: usize,

    /// N(s, a): number of simulations that took this edge.
    pub visit_count: u32,

    /// Q(s, a): running mean of backed-up values, from the perspective of
    /// the player choosing the action.
    pub mean_value: f32,

    /// P(s, a): prior probability from the evaluator.
    pub prior: f32,
}

impl EdgeStats {
    pub fn new(action: usize, prior: f32) -> Self {
        Self {
            action,
            visit_count: 0,
            mean_value: 0.0,
            prior,
        }
    }

    /// Fold one backed-up value into the running mean.
    pub fn update(&mut self, value: f32) {
        self.visit_count += 1;
        self.mean_value += (value - self.mean_value) / self.visit_count as f32;
    }
}

/// A visited state.
///
/// Either a terminal leaf with a fixed outcome, or an expanded node with one
/// edge per valid action.
#[derive(Clone, Debug)]
pub struct SearchNode {
    /// Valid actions, computed once on expansion.
    pub valid: ActionMask,

    /// Edges for the valid actions, in ascending action order.
    pub edges: Vec<EdgeStats>,

    /// Outcome for the player to move, when the state is terminal.
    pub terminal: Option<GameOutcome>,
}

impl SearchNode {
    /// An expanded node with priors taken from `priors` for each valid action.
    pub fn expanded(valid: ActionMask, priors: &Policy) -> Self {
        let edges = valid
            .iter_set()
            .map(|a| EdgeStats::new(a, priors.get_or_zero(a)))
            .collect();
        Self {
            valid,
            edges,
            terminal: None,
        }
    }

    /// A terminal leaf.
    pub fn terminal(outcome: GameOutcome, action_size: usize) -> Self {
        Self {
            valid: ActionMask::empty(action_size),
            edges: Vec::new(),
            terminal: Some(outcome),
        }
    }

    /// sum_b N(s, b)
    pub fn total_visits(&self) -> u32 {
        self.edges.iter().map(|e| e.visit_count).sum()
    }

    pub fn edge(&self, action: usize) -> Option<&EdgeStats> {
        self.edges.iter().find(|e| e.action == action)
    }

    pub fn edge_mut(&mut self, action: usize) -> Option<&mut EdgeStats> {
        self.edges.iter_mut().find(|e| e.action == action)
    }
}
