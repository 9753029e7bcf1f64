//! Mazeclash Environment Abstraction Layer
//!
//! This crate defines the boundary between the match core (the turn
//! scheduler and its noise engine) and everything the core treats as a
//! collaborator: the authoritative maze universe, the per-team decision
//! agents, the observers, and the clock/seed environment.
//!
//! # Core Concept: One Outstanding Call
//!
//! The scheduler mutates the universe strictly sequentially and has at most
//! one agent call in flight at any moment, so none of these interfaces need
//! interior locking. Agents and observers only ever receive owned, deep
//! [`UniverseSnapshot`] copies — never references into authoritative state.
//!
//! # Determinism
//!
//! All entropy is derived from a single 64-bit seed exposed through
//! [`MatchContext::seed`]. Production uses [`RealtimeContext`]; simulation
//! harnesses supply a virtual clock so a match is exactly reproducible from
//! its seed.

mod agent;
mod context;
mod error;
mod observer;
mod realtime;
mod state;
mod types;
mod universe;

pub use agent::AgentProxy;
pub use context::MatchContext;
pub use error::{AgentError, MatchError, MoveError};
pub use observer::Observer;
pub use realtime::RealtimeContext;
pub use state::GameState;
pub use types::{
    BotDestroyed, BotMoved, BotView, CellPos, Direction, FoodEaten, MoveDiff, NoiseParameters,
    TeamView, UniverseSnapshot,
};
pub use universe::{MazeTopology, Universe};
