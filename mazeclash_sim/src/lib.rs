//! Mazeclash Deterministic Simulation Harness
//!
//! This crate provides everything needed to run the match core in a fully
//! controlled environment:
//! - **GridUniverse**: a concrete maze universe parsed from layout strings,
//!   with BFS adjacency for the fog-of-war engine
//! - **Scripted agents**: well-behaved, stalling, rejecting and
//!   disconnecting implementations of `AgentProxy`
//! - **SimContext**: a virtual clock, so timeouts and measured durations
//!   are deterministic
//! - **MatchRecorder**: an observer capturing every frame for replay dumps
//! - **Scenarios**: a catalogue of failure-mode matches with assertions,
//!   runnable from the `mazeclash-sim` CLI
//!
//! # Determinism
//!
//! All entropy derives from one 64-bit seed: the scheduler's fallback and
//! noise streams through `SimContext::seed`, the scripted agents through
//! seeds the runner hands out. Any failing scenario is reproducible from
//! its seed number.

mod agents;
mod context;
mod recorder;
mod runner;
mod world;
pub mod scenarios;

pub use agents::{
    DisconnectingAgent, IllegalMoveAgent, RandomWalkAgent, RejectingAgent, ScriptedAgent,
    StandStillAgent, StallingAgent,
};
pub use context::SimContext;
pub use recorder::{MatchFrame, MatchRecord, MatchRecorder, RecorderHandle};
pub use runner::{ScenarioResult, ScenarioRunner};
pub use world::{GridUniverse, LayoutError, MazeAdjacency, DEFAULT_LAYOUT};
