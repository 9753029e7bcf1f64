//! Observer collaborator interface.

use crate::state::GameState;
use crate::types::UniverseSnapshot;
use async_trait::async_trait;

/// A consumer of match progress: a viewer, a dump writer, a remote monitor.
///
/// Observers are notified synchronously on the scheduling task, once per
/// individual bot-turn plus once at match end, always after the mutation
/// they report — an observer never sees state mid-mutation. Both arguments
/// are owned deep copies the observer may keep.
#[async_trait]
pub trait Observer: Send {
    /// Delivers the initial snapshot before the first round.
    async fn send_initial(&mut self, snapshot: UniverseSnapshot);

    /// Delivers the state after one atomic bot-turn.
    async fn observe(&mut self, snapshot: UniverseSnapshot, game_state: GameState);
}
