//! Mazeclash Match Core
//!
//! The turn/round scheduler for a two-team capture-the-flag match, plus its
//! fog-of-war noise engine:
//! 1. **GameMaster**: drives round-robin bot turns over untrusted agents,
//!    enforcing per-call timeouts, bounded failure recovery and
//!    disqualification, and exactly-once ordered observer notification
//! 2. **NoiseEngine**: graph-distance based randomized visibility applied
//!    independently per mover

pub mod config;
pub mod noise;
pub mod scheduler;

// Re-export key types for convenience
pub use config::MatchConfig;
pub use noise::NoiseEngine;
pub use scheduler::{CancelHandle, GameMaster, MatchPhase, TurnStatus};
