//! Match orchestration between move-selection agents.
//!
//! An [`Arena`] plays complete games between two [`Agent`]s, alternating
//! which of them moves first, and tallies the results in [`ArenaStats`].
//! Agents may be plain functions, [`RandomAgent`], or an [`MctsAgent`]
//! owning its own search tree.

pub mod agent;
pub mod arena;
pub mod config;
pub mod error;

pub use agent::{build_agent, Agent, MctsAgent, RandomAgent};
pub use arena::{Arena, ArenaStats, DisplayHook};
pub use config::{AgentConfig, AgentKind, ArenaConfig, BoardKind};
pub use error::{ArenaError, Result};
