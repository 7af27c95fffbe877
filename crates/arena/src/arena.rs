//! Plays complete games between two agents and tallies the results.

use crate::agent::Agent;
use crate::error::Result;
use std::fmt;
use tracing::{debug, info};
use uttt_core::{Game, GameError, GameOutcome, Player};

/// Win/loss/draw tally, from agent one's side.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ArenaStats {
    pub one_wins: usize,
    pub two_wins: usize,
    pub draws: usize,
}

impl ArenaStats {
    pub fn total(&self) -> usize {
        self.one_wins + self.two_wins + self.draws
    }

    /// Share of decided-or-drawn games agent one won.
    pub fn one_win_rate(&self) -> f32 {
        if self.total() == 0 {
            0.0
        } else {
            self.one_wins as f32 / self.total() as f32
        }
    }

    fn record(&mut self, outcome: GameOutcome) {
        match outcome {
            GameOutcome::Win => self.one_wins += 1,
            GameOutcome::Loss => self.two_wins += 1,
            GameOutcome::Draw => self.draws += 1,
            GameOutcome::Ongoing => {}
        }
    }
}

impl fmt::Display for ArenaStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "one {} - {} two ({} draws)",
            self.one_wins, self.two_wins, self.draws
        )
    }
}

/// Render hook called with the real (non-canonical) position.
pub type DisplayHook<'a, S> = Box<dyn Fn(&S) + 'a>;

pub struct Arena<'a, G: Game> {
    game: G,
    agent_one: Box<dyn Agent<G> + 'a>,
    agent_two: Box<dyn Agent<G> + 'a>,
    display: Option<DisplayHook<'a, G::State>>,
}

impl<'a, G: Game> Arena<'a, G> {
    pub fn new(
        game: G,
        agent_one: Box<dyn Agent<G> + 'a>,
        agent_two: Box<dyn Agent<G> + 'a>,
    ) -> Self {
        Self {
            game,
            agent_one,
            agent_two,
            display: None,
        }
    }

    /// Render the board before every move and once at the end.
    pub fn with_display(mut self, display: impl Fn(&G::State) + 'a) -> Self {
        self.display = Some(Box::new(display));
        self
    }

    /// Play one game. Returns the outcome from agent one's perspective.
    ///
    /// Both agents are reset first. Each agent is shown the canonical
    /// position; an action outside the valid-move mask aborts the game with
    /// `GameError::InvalidAction`.
    pub fn play_game(&mut self, one_starts: bool) -> Result<GameOutcome> {
        self.agent_one.reset();
        self.agent_two.reset();

        let game = &self.game;
        let one_side = if one_starts { Player::X } else { Player::O };
        let mut state = game.initial_state();
        let mut player = Player::X;
        let mut moves = 0usize;

        let outcome = loop {
            let outcome = game.game_ended(&state, player);
            if outcome.is_terminal() {
                break if player == one_side {
                    outcome
                } else {
                    outcome.flip()
                };
            }

            if let Some(display) = &self.display {
                display(&state);
            }

            let canonical = game.canonical_form(&state, player);
            let agent = if player == one_side {
                &mut self.agent_one
            } else {
                &mut self.agent_two
            };
            let action = agent.select_action(game, &canonical)?;

            if !game.valid_moves(&canonical, Player::X).is_set(action) {
                return Err(GameError::InvalidAction {
                    action,
                    action_size: game.action_size(),
                }
                .into());
            }

            (state, player) = game.next_state(&state, player, action)?;
            moves += 1;
        };

        if let Some(display) = &self.display {
            display(&state);
        }

        debug!(one_starts, moves, %outcome, "Arena game finished");
        Ok(outcome)
    }

    /// Play `num_games` games, agent one moving first in the even-numbered
    /// ones.
    pub fn play_games(&mut self, num_games: usize) -> Result<ArenaStats> {
        let mut stats = ArenaStats::default();

        for i in 0..num_games {
            let outcome = self.play_game(i % 2 == 0)?;
            stats.record(outcome);

            if (i + 1) % 10 == 0 && i + 1 < num_games {
                debug!(played = i + 1, %stats, "Arena progress");
            }
        }

        info!(
            games = num_games,
            one_wins = stats.one_wins,
            two_wins = stats.two_wins,
            draws = stats.draws,
            "Arena finished"
        );
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::RandomAgent;
    use crate::error::ArenaError;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::cell::RefCell;
    use std::rc::Rc;
    use uttt_tictactoe::{Board, TicTacToe};

    fn first_free(board: &Board) -> usize {
        board.cells().iter().position(|c| c.is_none()).unwrap_or(9)
    }

    #[test]
    fn test_first_free_cell_race() {
        // Both take the lowest free cell, so the starter ends up on 0, 2, 4, 6
        // and wins on the 2-4-6 diagonal.
        let game = TicTacToe::default();
        let mut arena = Arena::new(game, Box::new(first_free), Box::new(first_free));

        assert_eq!(arena.play_game(true).unwrap(), GameOutcome::Win);
        assert_eq!(arena.play_game(false).unwrap(), GameOutcome::Loss);
    }

    #[test]
    fn test_alternating_starts_split_evenly() {
        let game = TicTacToe::default();
        let mut arena = Arena::new(game, Box::new(first_free), Box::new(first_free));

        let stats = arena.play_games(6).unwrap();
        assert_eq!(
            stats,
            ArenaStats {
                one_wins: 3,
                two_wins: 3,
                draws: 0
            }
        );
        assert_eq!(stats.total(), 6);
        assert_eq!(stats.one_win_rate(), 0.5);
    }

    #[test]
    fn test_invalid_action_is_rejected() {
        let game = TicTacToe::default();
        let always_zero = |_: &Board| 0usize;
        let mut arena = Arena::new(game, Box::new(always_zero), Box::new(first_free));

        let err = arena.play_game(true).unwrap_err();
        assert!(matches!(
            err,
            ArenaError::Game(GameError::InvalidAction {
                action: 0,
                action_size: 10
            })
        ));
    }

    #[test]
    fn test_display_hook_sees_every_position() {
        let game = TicTacToe::default();
        let shown = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&shown);

        let mut arena = Arena::new(
            game,
            Box::new(RandomAgent::new(ChaCha8Rng::seed_from_u64(1))),
            Box::new(RandomAgent::new(ChaCha8Rng::seed_from_u64(2))),
        )
        .with_display(move |board: &Board| sink.borrow_mut().push(board.clone()));

        arena.play_game(true).unwrap();

        let shown = shown.borrow();
        // Initial position, one per move, and the final position once more.
        let stones = shown
            .last()
            .unwrap()
            .cells()
            .iter()
            .filter(|c| c.is_some())
            .count();
        assert_eq!(shown.len(), stones + 1);
        assert!(shown[0].cells().iter().all(|c| c.is_none()));
    }
}
