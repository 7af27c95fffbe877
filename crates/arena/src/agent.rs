//! Move-selection agents.
//!
//! An agent always sees the canonical form of the position, so it moves as
//! [`Player::X`] whichever side it is actually playing.

use crate::config::{AgentConfig, AgentKind};
use crate::error::Result;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::trace;
use uttt_core::{Game, Player};
use uttt_mcts::{Evaluator, Mcts, MctsConfig, RolloutEvaluator, UniformEvaluator};

/// Picks one action for the canonical position it is shown.
pub trait Agent<G: Game> {
    fn select_action(&mut self, game: &G, state: &G::State) -> Result<usize>;

    /// Forget anything carried over from a previous game.
    fn reset(&mut self) {}
}

/// Plain functions from canonical state to action.
impl<G, F> Agent<G> for F
where
    G: Game,
    F: FnMut(&G::State) -> usize,
{
    fn select_action(&mut self, _game: &G, state: &G::State) -> Result<usize> {
        Ok(self(state))
    }
}

/// Uniform over the valid moves.
pub struct RandomAgent<R: Rng> {
    rng: R,
}

impl<R: Rng> RandomAgent<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<G: Game, R: Rng> Agent<G> for RandomAgent<R> {
    fn select_action(&mut self, game: &G, state: &G::State) -> Result<usize> {
        let moves: Vec<usize> = game.valid_moves(state, Player::X).iter_set().collect();
        // A mask always has a real move or the pass bit set.
        Ok(moves[self.rng.gen_range(0..moves.len())])
    }
}

/// Searches every decision with its own engine and memo table.
///
/// The sampling temperature follows [`MctsConfig::effective_temperature`]
/// over the agent's own move count; temperature 0 plays the most visited
/// action.
pub struct MctsAgent<G: Game, E: Evaluator<G>, R: Rng> {
    mcts: Mcts<G, E, R>,
    moves_played: usize,
}

impl<G, E, R> MctsAgent<G, E, R>
where
    G: Game,
    E: Evaluator<G>,
    R: Rng,
{
    pub fn new(config: MctsConfig, evaluator: E, rng: R) -> Self {
        Self {
            mcts: Mcts::new(config, evaluator, rng),
            moves_played: 0,
        }
    }

    pub fn tree_len(&self) -> usize {
        self.mcts.tree_len()
    }
}

impl<G, E, R> Agent<G> for MctsAgent<G, E, R>
where
    G: Game,
    E: Evaluator<G>,
    R: Rng,
{
    fn select_action(&mut self, game: &G, state: &G::State) -> Result<usize> {
        let temperature = self.mcts.config().effective_temperature(self.moves_played);
        let result = self.mcts.search(game, state, Player::X)?;
        let action = self.mcts.choose(&result, temperature);

        trace!(
            move_number = self.moves_played,
            temperature,
            action,
            "MCTS agent moved"
        );
        self.moves_played += 1;
        Ok(action)
    }

    fn reset(&mut self) {
        self.mcts.clear();
        self.moves_played = 0;
    }
}

/// Build the agent an [`AgentConfig`] describes.
///
/// The evaluator of `mcts-rollout` draws from a stream seeded next to the
/// search RNG, so one seed reproduces the whole agent.
pub fn build_agent<G: Game + 'static>(config: &AgentConfig, seed: u64) -> Box<dyn Agent<G>> {
    let rng = ChaCha8Rng::seed_from_u64(seed);
    match config.kind {
        AgentKind::Random => Box::new(RandomAgent::new(rng)),
        AgentKind::MctsUniform => {
            Box::new(MctsAgent::new(config.mcts.clone(), UniformEvaluator, rng))
        }
        AgentKind::MctsRollout => {
            let evaluator = RolloutEvaluator::new(
                ChaCha8Rng::seed_from_u64(seed.wrapping_add(1)),
                config.rollout_depth,
            );
            Box::new(MctsAgent::new(config.mcts.clone(), evaluator, rng))
        }
    }
}
