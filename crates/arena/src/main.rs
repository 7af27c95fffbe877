//! Pit two agents against each other at (nested) tic-tac-toe.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fmt::Display;
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;
use uttt_arena::{build_agent, AgentKind, Arena, ArenaConfig, ArenaStats, BoardKind};
use uttt_core::Game;
use uttt_tictactoe::{NestedTicTacToe, TicTacToe};

#[derive(Parser)]
#[command(name = "uttt-arena")]
#[command(about = "Play matches between tic-tac-toe agents")]
struct Cli {
    /// Default log level when RUST_LOG is unset.
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a series of games and report the tally.
    Pit {
        /// TOML run configuration. Flags below override its values.
        #[arg(short, long)]
        config: Option<PathBuf>,

        #[arg(long, value_enum)]
        board: Option<BoardKind>,

        /// Kind of the first agent.
        #[arg(long, value_enum)]
        one: Option<AgentKind>,

        /// Kind of the second agent.
        #[arg(long, value_enum)]
        two: Option<AgentKind>,

        /// Number of games to play.
        #[arg(short, long)]
        games: Option<usize>,

        /// MCTS simulations per move, for both agents.
        #[arg(short, long)]
        simulations: Option<usize>,

        /// PUCT exploration constant, for both agents.
        #[arg(long)]
        cpuct: Option<f32>,

        /// Random seed for reproducibility.
        #[arg(long)]
        seed: Option<u64>,

        /// Print the board before every move.
        #[arg(short, long)]
        verbose: bool,
    },
}

fn init_tracing(level: &str) -> Result<()> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    Ok(())
}

/// Play the configured match on one game type.
fn run_pit<G>(game: G, config: &ArenaConfig, verbose: bool) -> Result<ArenaStats>
where
    G: Game + 'static,
    G::State: Display,
{
    let agent_one = build_agent::<G>(&config.agent_one, config.seed);
    let agent_two = build_agent::<G>(&config.agent_two, config.seed.wrapping_add(1000));

    let mut arena = Arena::new(game, agent_one, agent_two);
    if verbose {
        arena = arena.with_display(|state: &G::State| println!("{state}\n"));
    }

    arena
        .play_games(config.games)
        .context("Arena match aborted")
}

#[allow(clippy::too_many_arguments)]
fn cmd_pit(
    config_path: Option<PathBuf>,
    board: Option<BoardKind>,
    one: Option<AgentKind>,
    two: Option<AgentKind>,
    games: Option<usize>,
    simulations: Option<usize>,
    cpuct: Option<f32>,
    seed: Option<u64>,
    verbose: bool,
) -> Result<()> {
    let mut config = ArenaConfig::load_or_default(config_path.as_deref())
        .context("Failed to load arena config")?;

    if let Some(board) = board {
        config.board = board;
    }
    if let Some(kind) = one {
        config.agent_one.kind = kind;
    }
    if let Some(kind) = two {
        config.agent_two.kind = kind;
    }
    if let Some(games) = games {
        config.games = games;
    }
    if let Some(seed) = seed {
        config.seed = seed;
    }
    for agent in [&mut config.agent_one, &mut config.agent_two] {
        if let Some(simulations) = simulations {
            agent.mcts.num_simulations = simulations;
        }
        if let Some(cpuct) = cpuct {
            agent.mcts.cpuct = cpuct;
        }
    }

    info!(
        board = ?config.board,
        games = config.games,
        seed = config.seed,
        one = ?config.agent_one.kind,
        two = ?config.agent_two.kind,
        "Starting arena"
    );

    let start = Instant::now();
    let stats = match config.board {
        BoardKind::Nested => run_pit(NestedTicTacToe, &config, verbose)?,
        BoardKind::Classic => run_pit(TicTacToe::default(), &config, verbose)?,
    };

    println!("\n================================================");
    println!("RESULTS ({} games, {:.2}s)", stats.total(), start.elapsed().as_secs_f64());
    println!("================================================");
    println!("Agent one wins: {}", stats.one_wins);
    println!("Agent two wins: {}", stats.two_wins);
    println!("Draws:          {}", stats.draws);
    println!("------------------------------------------------");
    println!("Agent one win rate: {:.1}%", stats.one_win_rate() * 100.0);

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level)?;

    match cli.command {
        Commands::Pit {
            config,
            board,
            one,
            two,
            games,
            simulations,
            cpuct,
            seed,
            verbose,
        } => cmd_pit(config, board, one, two, games, simulations, cpuct, seed, verbose),
    }
}
