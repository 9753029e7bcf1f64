//! Error taxonomy for the mazeclash match core.

use thiserror::Error;

/// Per-call failures reported by (or on behalf of) an agent.
///
/// `Timeout` and `MoveRejected` are recovered locally by the scheduler, up
/// to a bounded count. `Disconnected` is fatal for the failing team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AgentError {
    /// The agent did not respond within the enforced per-call timeout
    #[error("agent did not respond in time")]
    Timeout,

    /// The agent produced a move the universe refuses
    #[error("agent move was rejected")]
    MoveRejected,

    /// The transport to the agent failed
    #[error("agent transport disconnected")]
    Disconnected,
}

/// Rejection of a move by the authoritative universe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MoveError {
    /// The requested direction is not legal from the bot's position
    #[error("illegal move for bot {bot_index}")]
    Illegal { bot_index: usize },
}

/// Match-level failures surfaced to the host driver.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchError {
    /// Registration or start-time misconfiguration; fatal
    #[error("configuration error: {0}")]
    Config(String),

    /// The match was cancelled externally; collaborators are torn down
    #[error("match aborted by external cancellation")]
    Aborted,

    /// The universe rejected a scheduler-chosen fallback move, which
    /// violates the legal-moves contract
    #[error("universe rejected a scheduler-chosen move: {0}")]
    Universe(#[from] MoveError),
}
