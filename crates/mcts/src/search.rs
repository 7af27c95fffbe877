//! Monte Carlo Tree Search implementation.
//!
//! Each simulation walks the memo table from the root with PUCT selection
//! until it reaches an unvisited state (expanded with one evaluator call)
//! or a terminal state, then backs the leaf value up the recorded path,
//! negating it at every ply.

use crate::{
    config::MctsConfig,
    error::{Result, SearchError},
    evaluator::Evaluator,
    node::SearchNode,
    tree::{StateKey, Tree},
};
use rand::Rng;
use rand_distr::{Dirichlet, Distribution};
use std::marker::PhantomData;
use tracing::{debug, trace, warn};
use uttt_core::{Game, GameError, Player, Policy, Value};

/// Result of an MCTS search.
#[derive(Clone, Debug)]
pub struct SearchResult {
    /// Visit count for each valid action at the root, ascending by action.
    pub visit_counts: Vec<(usize, u32)>,

    /// Most visited action (lowest index on ties).
    pub best_action: usize,

    /// Normalized visit counts over the whole action space (temperature 1).
    pub policy: Vec<f32>,

    /// Visit-weighted mean Q at the root, for the player to move.
    pub root_value: f32,

    /// Nodes expanded by this search's simulations. An unseen root is
    /// expanded before the simulations start and is not counted here.
    pub expansions: usize,
}

impl SearchResult {
    /// Convert root visit counts into a move distribution.
    ///
    /// - temperature = 0: one-hot on the most visited action, ties broken
    ///   uniformly at random
    /// - otherwise: P(a) ∝ N(a)^(1/τ)
    ///
    /// Actions outside the root's valid set always get zero.
    pub fn probabilities<R: Rng>(&self, temperature: f32, rng: &mut R) -> Vec<f32> {
        let mut probs = vec![0.0; self.policy.len()];
        if self.visit_counts.is_empty() {
            return probs;
        }

        let max = self.visit_counts.iter().map(|(_, c)| *c).max().unwrap_or(0);

        if temperature <= 0.0 {
            let best: Vec<usize> = self
                .visit_counts
                .iter()
                .filter(|(_, c)| *c == max)
                .map(|(a, _)| *a)
                .collect();
            probs[best[rng.gen_range(0..best.len())]] = 1.0;
            return probs;
        }

        if max == 0 {
            // No visits yet: fall back to uniform over the valid actions.
            let p = 1.0 / self.visit_counts.len() as f32;
            for (action, _) in &self.visit_counts {
                probs[*action] = p;
            }
            return probs;
        }

        // Counts are scaled by the maximum first so N^(1/τ) stays in [0, 1]
        // even at tiny temperatures.
        let inv_temp = 1.0 / temperature as f64;
        let adjusted: Vec<f64> = self
            .visit_counts
            .iter()
            .map(|(_, count)| (*count as f64 / max as f64).powf(inv_temp))
            .collect();
        // The most visited action contributes exactly 1.
        let sum: f64 = adjusted.iter().sum();

        for ((action, _), weight) in self.visit_counts.iter().zip(&adjusted) {
            probs[*action] = (weight / sum) as f32;
        }
        probs
    }

    /// Sample an action from [`probabilities`](Self::probabilities).
    pub fn select_action<R: Rng>(&self, temperature: f32, rng: &mut R) -> usize {
        let probs = self.probabilities(temperature, rng);
        let threshold: f32 = rng.gen::<f32>();
        let mut cumulative = 0.0;

        for (action, _) in &self.visit_counts {
            let p = probs[*action];
            if p <= 0.0 {
                continue;
            }
            cumulative += p;
            if cumulative >= threshold {
                return *action;
            }
        }

        // Rounding left the threshold just above the total mass.
        self.best_action
    }

    /// Get the policy as a typed Policy (enforces sum to 1.0 invariant).
    ///
    /// # Errors
    /// Returns error if policy doesn't sum to 1.0 (indicates a bug).
    pub fn typed_policy(&self) -> uttt_core::Result<Policy> {
        Policy::new(self.policy.clone())
    }

    /// Get the root value as a typed Value (clamped to [-1, 1]).
    pub fn typed_value(&self) -> Value {
        Value::clamped(self.root_value)
    }
}

/// Monte Carlo Tree Search over a memo table keyed by canonical state.
///
/// Generic over:
/// - `G`: The game being played
/// - `E`: The evaluation strategy (rollouts or a learned model)
/// - `R`: The random number generator (root noise and tie-breaking)
///
/// The table persists across searches, so one engine can follow a whole
/// game. Call [`clear`](Self::clear) between independent games.
pub struct Mcts<G: Game, E: Evaluator<G>, R: Rng> {
    config: MctsConfig,
    evaluator: E,
    rng: R,
    tree: Tree,
    _game: PhantomData<G>,
}

impl<G, E, R> Mcts<G, E, R>
where
    G: Game,
    E: Evaluator<G>,
    R: Rng,
{
    /// Create a new MCTS instance.
    pub fn new(config: MctsConfig, evaluator: E, rng: R) -> Self {
        Self {
            config,
            evaluator,
            rng,
            tree: Tree::new(),
            _game: PhantomData,
        }
    }

    pub fn config(&self) -> &MctsConfig {
        &self.config
    }

    /// Drop every memoised node.
    pub fn clear(&mut self) {
        self.tree.clear();
    }

    /// Number of memoised states.
    pub fn tree_len(&self) -> usize {
        self.tree.len()
    }

    /// Run `num_simulations` simulations from `state` with `player` to move.
    ///
    /// # Errors
    /// - `SearchError::TerminalRoot` if the position is already decided
    /// - `SearchError::Game` if the evaluator returns a policy of the wrong
    ///   length, or the game rejects a transition
    pub fn search(&mut self, game: &G, state: &G::State, player: Player) -> Result<SearchResult> {
        let outcome = game.game_ended(state, player);
        if outcome.is_terminal() {
            return Err(SearchError::TerminalRoot(outcome));
        }

        let root = game.canonical_form(state, player);
        let root_key = game.string_key(&root);

        // The root is expanded up front so every simulation takes a root edge.
        if !self.tree.contains(&root_key) {
            self.expand(game, &root, root_key.clone())?;
        }

        let noise = self.root_noise(&root_key);

        let mut expansions = 0;
        for _ in 0..self.config.num_simulations {
            if self.simulate(game, &root, &root_key, noise.as_deref())? {
                expansions += 1;
            }
        }

        let result = self.extract_results(game, &root_key, expansions);
        debug!(
            simulations = self.config.num_simulations,
            expansions,
            tree_size = self.tree.len(),
            best_action = result.best_action,
            root_value = result.root_value,
            "MCTS search complete"
        );
        Ok(result)
    }

    /// Search, then read out a move distribution at the given temperature.
    pub fn action_probabilities(
        &mut self,
        game: &G,
        state: &G::State,
        player: Player,
        temperature: f32,
    ) -> Result<Vec<f32>> {
        let result = self.search(game, state, player)?;
        Ok(result.probabilities(temperature, &mut self.rng))
    }

    /// Sample from a search result with the engine's own RNG.
    pub fn choose(&mut self, result: &SearchResult, temperature: f32) -> usize {
        result.select_action(temperature, &mut self.rng)
    }

    /// One simulation: select -> expand or terminal leaf -> backpropagate.
    ///
    /// Returns whether a new node was expanded.
    fn simulate(
        &mut self,
        game: &G,
        root: &G::State,
        root_key: &[u8],
        noise: Option<&[f32]>,
    ) -> Result<bool> {
        let mut path: Vec<(StateKey, usize)> = Vec::new();
        let mut state = root.clone();
        let mut key = root_key.to_vec();
        let mut expanded = false;

        // Value of the leaf for the player to move there.
        let leaf_value = loop {
            match self.tree.get(&key) {
                None => {
                    expanded = true;
                    break self.expand(game, &state, key)?;
                }
                Some(node) => {
                    if let Some(outcome) = node.terminal {
                        break outcome.value();
                    }

                    let root_noise = if path.is_empty() { noise } else { None };
                    let action = self.select_child(node, root_noise);
                    let (next, next_player) = game.next_state(&state, Player::X, action)?;
                    state = game.canonical_form(&next, next_player);
                    path.push((key, action));
                    key = game.string_key(&state);
                }
            }
        };

        self.backpropagate(&path, leaf_value);

        trace!(
            depth = path.len(),
            value = leaf_value,
            expanded,
            "MCTS simulation complete"
        );

        Ok(expanded)
    }

    /// First visit to a canonical state: record a terminal leaf, or ask the
    /// evaluator for priors and a value.
    fn expand(&mut self, game: &G, state: &G::State, key: StateKey) -> Result<f32> {
        let outcome = game.game_ended(state, Player::X);
        if outcome.is_terminal() {
            self.tree
                .insert(key, SearchNode::terminal(outcome, game.action_size()));
            return Ok(outcome.value());
        }

        let valid = game.valid_moves(state, Player::X);
        let evaluation = self.evaluator.evaluate(game, state);
        if evaluation.policy.len() != game.action_size() {
            return Err(GameError::PolicyLengthMismatch {
                expected: game.action_size(),
                actual: evaluation.policy.len(),
            }
            .into());
        }

        let masked: Vec<f32> = evaluation
            .policy
            .iter()
            .zip(valid.as_slice())
            .map(|(&p, &legal)| if legal { p.max(0.0) } else { 0.0 })
            .collect();

        let priors = match Policy::from_unnormalized(masked) {
            Ok(priors) => priors,
            Err(e) => {
                warn!(error = %e, "Evaluator gave no mass to valid actions, using uniform priors");
                Policy::uniform_over(&valid)?
            }
        };

        self.tree.insert(key, SearchNode::expanded(valid, &priors));
        Ok(Value::clamped(evaluation.value).get())
    }

    /// Select the edge maximising the PUCT score.
    ///
    /// UCB(a) = Q(a) + cpuct * P(a) * sqrt(N_parent) / (1 + N(a))
    ///
    /// N_parent is floored at 1 so an unvisited node follows its priors.
    /// Edges are scanned in ascending action order; the first maximum wins.
    fn select_child(&self, node: &SearchNode, noise: Option<&[f32]>) -> usize {
        let parent_visits = (node.total_visits().max(1) as f32).sqrt();
        let eps = self.config.exploration_fraction;

        let mut best_action = None;
        let mut best_ucb = f32::NEG_INFINITY;

        for (i, edge) in node.edges.iter().enumerate() {
            let prior = match noise {
                Some(noise) => (1.0 - eps) * edge.prior + eps * noise[i],
                None => edge.prior,
            };
            let ucb = edge.mean_value
                + self.config.cpuct * prior * parent_visits / (1.0 + edge.visit_count as f32);

            if ucb > best_ucb {
                best_ucb = ucb;
                best_action = Some(edge.action);
            }
        }

        // INVARIANT: non-terminal nodes have at least one valid action (pass).
        best_action.expect("BUG: select_child called on node without edges")
    }

    /// Update N and Q along the path. `leaf_value` is for the player to move
    /// at the leaf, so the edge into it is credited with its negation.
    fn backpropagate(&mut self, path: &[(StateKey, usize)], leaf_value: f32) {
        let mut value = leaf_value;

        for (key, action) in path.iter().rev() {
            value = -value;
            if let Some(edge) = self
                .tree
                .get_mut(key)
                .and_then(|node| node.edge_mut(*action))
            {
                edge.update(value);
            }
        }
    }

    /// Dirichlet noise for the root edges of this search, if enabled.
    ///
    /// The noise is mixed in at selection time only; memoised priors stay
    /// untouched.
    fn root_noise(&mut self, root_key: &[u8]) -> Option<Vec<f32>> {
        if !self.config.uses_root_noise() {
            return None;
        }

        let num_edges = self.tree.get(root_key)?.edges.len();
        // Dirichlet requires at least 2 elements
        if num_edges < 2 {
            return None;
        }

        let alpha = vec![self.config.dirichlet_alpha; num_edges];
        match Dirichlet::new(&alpha) {
            Ok(dirichlet) => Some(dirichlet.sample(&mut self.rng)),
            Err(e) => {
                warn!(error = %e, "Invalid Dirichlet parameters, skipping root noise");
                None
            }
        }
    }

    /// Extract search results from the root node.
    fn extract_results(&self, game: &G, root_key: &[u8], expansions: usize) -> SearchResult {
        // INVARIANT: the root is expanded at the start of every search.
        let root = self
            .tree
            .get(root_key)
            .expect("BUG: extract_results called before root expansion");

        let visit_counts: Vec<(usize, u32)> = root
            .edges
            .iter()
            .map(|e| (e.action, e.visit_count))
            .collect();

        let mut best_action = visit_counts.first().map(|(a, _)| *a).unwrap_or(0);
        let mut best_count = 0;
        for &(action, count) in &visit_counts {
            if count > best_count {
                best_count = count;
                best_action = action;
            }
        }

        let total_visits = root.total_visits();
        let mut policy = vec![0.0; game.action_size()];
        if total_visits > 0 {
            for &(action, count) in &visit_counts {
                policy[action] = count as f32 / total_visits as f32;
            }
        } else if let Ok(uniform) = Policy::uniform_over(&root.valid) {
            policy = uniform.into_inner();
        }

        let root_value = if total_visits > 0 {
            root.edges
                .iter()
                .map(|e| e.mean_value * e.visit_count as f32)
                .sum::<f32>()
                / total_visits as f32
        } else {
            0.0
        };

        SearchResult {
            visit_counts,
            best_action,
            policy,
            root_value,
            expansions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::{Evaluation, RolloutEvaluator, UniformEvaluator};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use uttt_core::GameOutcome;
    use uttt_tictactoe::{Board, NestedTicTacToe, TicTacToe};

    /// Puts all of its mass on illegal actions.
    struct ZeroMassEvaluator;

    impl<G: Game> Evaluator<G> for ZeroMassEvaluator {
        fn evaluate(&self, game: &G, _state: &G::State) -> Evaluation {
            let mut policy = vec![0.0; game.action_size()];
            policy[game.pass_action()] = 1.0;
            Evaluation { policy, value: 0.5 }
        }
    }

    /// Returns a policy one entry too short.
    struct ShortPolicyEvaluator;

    impl<G: Game> Evaluator<G> for ShortPolicyEvaluator {
        fn evaluate(&self, game: &G, _state: &G::State) -> Evaluation {
            Evaluation {
                policy: vec![0.1; game.action_size() - 1],
                value: 0.0,
            }
        }
    }

    fn uniform_mcts<G: Game>(simulations: usize) -> Mcts<G, UniformEvaluator, ChaCha8Rng> {
        Mcts::new(
            MctsConfig::with_simulations(simulations),
            UniformEvaluator,
            ChaCha8Rng::seed_from_u64(42),
        )
    }

    fn ttt(signs: &[i8]) -> Board {
        Board::from_signs(3, signs).unwrap()
    }

    #[test]
    fn test_single_simulation_is_one_hot() {
        let game = NestedTicTacToe;
        let mut mcts = uniform_mcts(1);
        let state = game.initial_state();

        let result = mcts.search(&game, &state, Player::X).unwrap();

        // The simulation expands exactly one node. The root was expanded
        // before it ran and is not counted.
        assert_eq!(result.expansions, 1);
        assert_eq!(mcts.tree_len(), 2);

        let visited: Vec<_> = result.visit_counts.iter().filter(|(_, c)| *c > 0).collect();
        assert_eq!(visited.len(), 1);
        let explored = visited[0].0;

        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for temperature in [0.0, 0.5, 1.0] {
            let probs = result.probabilities(temperature, &mut rng);
            assert_eq!(probs[explored], 1.0);
            assert!((probs.iter().sum::<f32>() - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_root_visits_match_simulations() {
        let game = TicTacToe::default();
        let mut mcts = uniform_mcts(64);
        let result = mcts.search(&game, &game.initial_state(), Player::X).unwrap();

        let total: u32 = result.visit_counts.iter().map(|(_, c)| *c).sum();
        assert_eq!(total, 64);
        assert_eq!(result.visit_counts.len(), 9);
        assert!((result.policy.iter().sum::<f32>() - 1.0).abs() < 1e-5);
        assert_eq!(result.policy[9], 0.0);
        assert!(result.typed_policy().is_ok());
    }

    #[test]
    fn test_memo_table_persists_until_cleared() {
        let game = TicTacToe::default();
        let mut mcts = uniform_mcts(20);
        let state = game.initial_state();

        mcts.search(&game, &state, Player::X).unwrap();
        let after_first = mcts.tree_len();
        let second = mcts.search(&game, &state, Player::X).unwrap();

        // Root edges keep their counts from the first search.
        let total: u32 = second.visit_counts.iter().map(|(_, c)| *c).sum();
        assert_eq!(total, 40);
        assert!(mcts.tree_len() >= after_first);

        mcts.clear();
        assert_eq!(mcts.tree_len(), 0);
    }

    #[test]
    fn test_degenerate_priors_fall_back_to_uniform() {
        let game = TicTacToe::default();
        let mut mcts = Mcts::new(
            MctsConfig::with_simulations(30),
            ZeroMassEvaluator,
            ChaCha8Rng::seed_from_u64(3),
        );

        let result = mcts.search(&game, &game.initial_state(), Player::X).unwrap();
        assert_eq!(result.visit_counts.len(), 9);
        assert_eq!(result.policy[9], 0.0);
        assert!((result.policy.iter().sum::<f32>() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_wrong_policy_length_is_an_error() {
        let game = TicTacToe::default();
        let mut mcts = Mcts::new(
            MctsConfig::with_simulations(5),
            ShortPolicyEvaluator,
            ChaCha8Rng::seed_from_u64(3),
        );

        let err = mcts
            .search(&game, &game.initial_state(), Player::X)
            .unwrap_err();
        assert_eq!(
            err,
            SearchError::Game(GameError::PolicyLengthMismatch {
                expected: 10,
                actual: 9
            })
        );
    }

    #[test]
    fn test_terminal_root_is_rejected() {
        let game = TicTacToe::default();
        let state = ttt(&[1, 1, 1, -1, -1, 0, 0, 0, 0]);
        let mut mcts = uniform_mcts(5);

        assert_eq!(
            mcts.search(&game, &state, Player::O).unwrap_err(),
            SearchError::TerminalRoot(GameOutcome::Loss)
        );
    }

    #[test]
    fn test_finds_immediate_win() {
        // X - X
        // O O -
        // - - -
        let game = TicTacToe::default();
        let state = ttt(&[1, 0, 1, -1, -1, 0, 0, 0, 0]);
        let mut mcts = uniform_mcts(200);

        let result = mcts.search(&game, &state, Player::X).unwrap();
        assert_eq!(result.best_action, 1);
        assert!(result.root_value > 0.5);
    }

    #[test]
    fn test_search_as_second_player() {
        // O to move must block X's top row at 2.
        // X X -
        // O - -
        // - - -
        let game = TicTacToe::default();
        let state = ttt(&[1, 1, 0, -1, 0, 0, 0, 0, 0]);
        let mut mcts = Mcts::new(
            MctsConfig::with_simulations(800),
            RolloutEvaluator::new(ChaCha8Rng::seed_from_u64(5), 20),
            ChaCha8Rng::seed_from_u64(5),
        );

        let result = mcts.search(&game, &state, Player::O).unwrap();
        assert_eq!(result.best_action, 2);
    }

    #[test]
    fn test_temperature_readout() {
        let result = SearchResult {
            visit_counts: vec![(0, 3), (2, 1)],
            best_action: 0,
            policy: vec![0.75, 0.0, 0.25, 0.0],
            root_value: 0.0,
            expansions: 0,
        };
        let mut rng = ChaCha8Rng::seed_from_u64(0);

        let t1 = result.probabilities(1.0, &mut rng);
        assert!((t1[0] - 0.75).abs() < 1e-6);
        assert!((t1[2] - 0.25).abs() < 1e-6);
        assert_eq!(t1[1], 0.0);

        // Lower temperature sharpens: 9 : 1.
        let t_half = result.probabilities(0.5, &mut rng);
        assert!((t_half[0] - 0.9).abs() < 1e-6);

        let greedy = result.probabilities(0.0, &mut rng);
        assert_eq!(greedy, vec![1.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_small_temperature_stays_peaked() {
        let result = SearchResult {
            visit_counts: vec![(0, 3), (1, 1)],
            best_action: 0,
            policy: vec![0.75, 0.25, 0.0],
            root_value: 0.0,
            expansions: 0,
        };
        let mut rng = ChaCha8Rng::seed_from_u64(0);

        let probs = result.probabilities(0.001, &mut rng);
        assert!(probs[0] > 0.99, "expected a peaked readout, got {probs:?}");
        assert!((probs.iter().sum::<f32>() - 1.0).abs() < 1e-6);
        assert_eq!(result.select_action(0.001, &mut rng), 0);

        let large = SearchResult {
            visit_counts: vec![(0, 2000), (1, 10)],
            best_action: 0,
            policy: vec![2000.0 / 2010.0, 10.0 / 2010.0, 0.0],
            root_value: 0.0,
            expansions: 0,
        };
        let probs = large.probabilities(0.01, &mut rng);
        assert!(probs[0] > 0.99, "expected a peaked readout, got {probs:?}");
        assert_eq!(probs[2], 0.0);
    }

    #[test]
    fn test_unvisited_root_reads_out_uniform() {
        let result = SearchResult {
            visit_counts: vec![(1, 0), (3, 0)],
            best_action: 1,
            policy: vec![0.0, 0.5, 0.0, 0.5],
            root_value: 0.0,
            expansions: 0,
        };
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        assert_eq!(
            result.probabilities(1.0, &mut rng),
            vec![0.0, 0.5, 0.0, 0.5]
        );
    }

    #[test]
    fn test_greedy_ties_break_among_maxima() {
        let result = SearchResult {
            visit_counts: vec![(0, 2), (1, 5), (3, 5)],
            best_action: 1,
            policy: vec![2.0 / 12.0, 5.0 / 12.0, 0.0, 5.0 / 12.0],
            root_value: 0.0,
            expansions: 0,
        };
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let mut seen = [false; 4];

        for _ in 0..64 {
            let probs = result.probabilities(0.0, &mut rng);
            let chosen = probs.iter().position(|&p| p == 1.0).unwrap();
            assert!(chosen == 1 || chosen == 3);
            seen[chosen] = true;
        }
        assert!(seen[1] && seen[3]);
    }

    #[test]
    fn test_root_noise_keeps_memoised_priors() {
        let game = TicTacToe::default();
        let config = MctsConfig {
            num_simulations: 50,
            exploration_fraction: 0.25,
            ..Default::default()
        };
        let mut mcts = Mcts::new(config, UniformEvaluator, ChaCha8Rng::seed_from_u64(11));
        let state = game.initial_state();

        mcts.search(&game, &state, Player::X).unwrap();
        let root = mcts.tree.get(&game.string_key(&state)).unwrap();
        for edge in &root.edges {
            assert!((edge.prior - 1.0 / 9.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_deterministic_with_seed() {
        let game = NestedTicTacToe;
        let run = |seed: u64| {
            let mut mcts = Mcts::new(
                MctsConfig::with_simulations(40),
                RolloutEvaluator::new(ChaCha8Rng::seed_from_u64(seed), 81),
                ChaCha8Rng::seed_from_u64(seed),
            );
            mcts.search(&game, &game.initial_state(), Player::X).unwrap()
        };

        let a = run(123);
        let b = run(123);
        assert_eq!(a.visit_counts, b.visit_counts);
        assert_eq!(a.best_action, b.best_action);
    }
}
