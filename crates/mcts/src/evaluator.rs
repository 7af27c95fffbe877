//! Evaluation abstraction for MCTS.
//!
//! The `Evaluator` trait is the engine's only view of the position
//! evaluator: a function from a canonical state to a prior policy and a
//! value. A trained network plugs in here; the evaluators below need no
//! model and are used for testing and baseline play.

use rand::Rng;
use std::cell::RefCell;
use uttt_core::{Game, Player};

/// Evaluation result: prior policy + value estimate.
#[derive(Clone, Debug)]
pub struct Evaluation {
    /// Prior probability for each action index.
    /// Length must equal `game.action_size()`.
    pub policy: Vec<f32>,

    /// Value estimate for the player to move, in [-1, 1].
    pub value: f32,
}

/// Trait for evaluating game positions.
///
/// The state passed in is always canonical: the player to move is
/// `Player::X`. The engine masks and renormalises the returned policy, so it
/// may put mass on illegal actions.
pub trait Evaluator<G: Game> {
    fn evaluate(&self, game: &G, state: &G::State) -> Evaluation;
}

impl<G: Game, E: Evaluator<G> + ?Sized> Evaluator<G> for &E {
    fn evaluate(&self, game: &G, state: &G::State) -> Evaluation {
        (**self).evaluate(game, state)
    }
}

/// Uniform prior over legal actions and a neutral value.
#[derive(Clone, Copy, Debug, Default)]
pub struct UniformEvaluator;

impl<G: Game> Evaluator<G> for UniformEvaluator {
    fn evaluate(&self, game: &G, state: &G::State) -> Evaluation {
        Evaluation {
            policy: uniform_prior(game, state),
            value: 0.0,
        }
    }
}

/// Evaluator using uniform prior and random rollouts.
///
/// - Policy: uniform distribution over legal actions
/// - Value: result of a random playout from the position
pub struct RolloutEvaluator<R: Rng> {
    /// Random number generator (wrapped in RefCell for interior mutability).
    rng: RefCell<R>,

    /// Maximum moves in a random playout.
    max_rollout_depth: usize,
}

impl<R: Rng> RolloutEvaluator<R> {
    pub fn new(rng: R, max_rollout_depth: usize) -> Self {
        Self {
            rng: RefCell::new(rng),
            max_rollout_depth,
        }
    }

    /// Play random moves until the game ends, returning the result for the
    /// player to move at the start (`Player::X`). Unfinished playouts score 0.
    fn rollout<G: Game>(&self, game: &G, initial_state: &G::State) -> f32 {
        let mut state = initial_state.clone();
        let mut player = Player::X;

        for _ in 0..self.max_rollout_depth {
            let outcome = game.game_ended(&state, player);
            if outcome.is_terminal() {
                return match player {
                    Player::X => outcome.value(),
                    Player::O => outcome.flip().value(),
                };
            }

            let legal: Vec<usize> = game.valid_moves(&state, player).iter_set().collect();
            let action = legal[self.rng.borrow_mut().gen_range(0..legal.len())];
            match game.next_state(&state, player, action) {
                Ok((next, next_player)) => {
                    state = next;
                    player = next_player;
                }
                Err(_) => break,
            }
        }

        0.0
    }
}

impl<G: Game, R: Rng> Evaluator<G> for RolloutEvaluator<R> {
    fn evaluate(&self, game: &G, state: &G::State) -> Evaluation {
        Evaluation {
            policy: uniform_prior(game, state),
            value: self.rollout(game, state),
        }
    }
}

fn uniform_prior<G: Game>(game: &G, state: &G::State) -> Vec<f32> {
    let valid = game.valid_moves(state, Player::X);
    let prior = 1.0 / valid.count().max(1) as f32;
    valid
        .as_slice()
        .iter()
        .map(|&legal| if legal { prior } else { 0.0 })
        .collect()
}
