//! Decision-agent collaborator interface.

use crate::error::AgentError;
use crate::types::{Direction, UniverseSnapshot};
use async_trait::async_trait;

/// The scheduler's handle to one team's controlling logic.
///
/// # Implementations
///
/// - **In-process**: a move function or scripted policy
/// - **Subprocess**: spawn + IPC framing
/// - **Remote**: a network socket
///
/// Process spawning, message framing and serialization belong entirely to
/// the implementation; the scheduler has zero transport-specific logic.
///
/// # Failure
///
/// Every call may fail with [`AgentError`]. The scheduler additionally
/// enforces its own per-call timeout around [`request_move`], so a slow
/// implementation is observed as [`AgentError::Timeout`] even if it never
/// returns. When that happens the in-flight future is dropped; releasing
/// whatever the call had in flight is the implementation's job.
///
/// [`request_move`]: AgentProxy::request_move
#[async_trait]
pub trait AgentProxy: Send {
    /// Tells the agent which universe bot indices it controls.
    async fn bind(&mut self, bot_indices: Vec<usize>) -> Result<(), AgentError>;

    /// Delivers the initial snapshot before the first round.
    async fn send_initial(&mut self, snapshot: UniverseSnapshot) -> Result<(), AgentError>;

    /// Asks for the move of `bot_index` given a (possibly noised) snapshot.
    async fn request_move(
        &mut self,
        bot_index: usize,
        snapshot: UniverseSnapshot,
    ) -> Result<Direction, AgentError>;

    /// Releases the agent's resources: close the transport, then terminate
    /// any underlying process gracefully, then forcibly after a grace
    /// period. Must be safe to call more than once.
    async fn shutdown(&mut self);
}
