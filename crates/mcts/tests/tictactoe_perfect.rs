//! Search strength on classic 3x3 tic-tac-toe.
//!
//! With enough rollouts the engine must never lose to a random opponent,
//! take an immediate win, and block an immediate loss.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use uttt_core::{Game, GameOutcome, Player};
use uttt_mcts::{Mcts, MctsConfig, RolloutEvaluator};
use uttt_tictactoe::{Board, TicTacToe};

type Engine = Mcts<TicTacToe, RolloutEvaluator<ChaCha8Rng>, ChaCha8Rng>;

fn create_mcts(seed: u64, simulations: usize) -> Engine {
    let config = MctsConfig::with_simulations(simulations);
    let rng = ChaCha8Rng::seed_from_u64(seed);
    let evaluator = RolloutEvaluator::new(rng.clone(), 50);
    Mcts::new(config, evaluator, rng)
}

fn random_move(game: &TicTacToe, state: &Board, player: Player, rng: &mut ChaCha8Rng) -> usize {
    let moves: Vec<usize> = game.valid_moves(state, player).iter_set().collect();
    moves[rng.gen_range(0..moves.len())]
}

/// Play one game and return the result for the engine's side.
fn play_against_random(seed: u64, engine_side: Player) -> (GameOutcome, Board) {
    let game = TicTacToe::default();
    let mut mcts = create_mcts(seed, 1000);
    let mut rng = ChaCha8Rng::seed_from_u64(seed + 1000);

    let mut state = game.initial_state();
    let mut player = Player::X;

    while !game.game_ended(&state, player).is_terminal() {
        let action = if player == engine_side {
            mcts.search(&game, &state, player).unwrap().best_action
        } else {
            random_move(&game, &state, player, &mut rng)
        };
        (state, player) = game.next_state(&state, player, action).unwrap();
    }

    (game.game_ended(&state, engine_side), state)
}

#[test]
fn test_mcts_never_loses_as_x() {
    for seed in 0..20 {
        let (outcome, state) = play_against_random(seed, Player::X);
        assert_ne!(
            outcome,
            GameOutcome::Loss,
            "MCTS (X) lost game with seed {}. Final state:\n{}",
            seed,
            state
        );
    }
}

#[test]
fn test_mcts_never_loses_as_o() {
    for seed in 0..20 {
        let (outcome, state) = play_against_random(seed, Player::O);
        assert_ne!(
            outcome,
            GameOutcome::Loss,
            "MCTS (O) lost game with seed {}. Final state:\n{}",
            seed,
            state
        );
    }
}

#[test]
fn test_mcts_finds_winning_move() {
    // X - X
    // O O -
    // - - -
    let game = TicTacToe::default();
    let state = Board::from_signs(3, &[1, 0, 1, -1, -1, 0, 0, 0, 0]).unwrap();
    let mut mcts = create_mcts(42, 500);

    let result = mcts.search(&game, &state, Player::X).unwrap();
    assert_eq!(result.best_action, 1, "MCTS should complete the top row");
}

#[test]
fn test_mcts_blocks_winning_move() {
    // X X -
    // O - -
    // - - -
    let game = TicTacToe::default();
    let state = Board::from_signs(3, &[1, 1, 0, -1, 0, 0, 0, 0, 0]).unwrap();
    let mut mcts = create_mcts(42, 500);

    let result = mcts.search(&game, &state, Player::O).unwrap();
    assert_eq!(result.best_action, 2, "MCTS should block X at cell 2");
}

#[test]
fn test_mcts_deterministic() {
    let game = TicTacToe::default();

    let play_game = |seed: u64| -> Vec<usize> {
        let mut mcts = create_mcts(seed, 100);
        let mut state = game.initial_state();
        let mut player = Player::X;
        let mut moves = Vec::new();

        while !game.game_ended(&state, player).is_terminal() {
            let action = mcts.search(&game, &state, player).unwrap().best_action;
            moves.push(action);
            (state, player) = game.next_state(&state, player, action).unwrap();
        }
        moves
    };

    assert_eq!(play_game(12345), play_game(12345));
}

#[test]
fn test_mcts_starting_position_value() {
    let game = TicTacToe::default();
    let mut mcts = create_mcts(42, 1000);

    let result = mcts
        .search(&game, &game.initial_state(), Player::X)
        .unwrap();

    // First player can force at least a draw.
    assert!(
        result.root_value >= -0.3,
        "Starting position value should be >= -0.3, got {}",
        result.root_value
    );
}
