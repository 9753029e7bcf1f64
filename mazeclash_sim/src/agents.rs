//! Scripted agents for deterministic simulation.
//!
//! Each agent is an in-process [`AgentProxy`], exercising the same
//! interface a subprocess or network transport would. The misbehaving
//! variants reproduce the failure modes the scheduler must survive.

use async_trait::async_trait;
use mazeclash_env::{AgentError, AgentProxy, Direction, UniverseSnapshot};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::{HashMap, VecDeque};

/// Always answers `Stop`.
pub struct StandStillAgent;

#[async_trait]
impl AgentProxy for StandStillAgent {
    async fn bind(&mut self, _bot_indices: Vec<usize>) -> Result<(), AgentError> {
        Ok(())
    }

    async fn send_initial(&mut self, _snapshot: UniverseSnapshot) -> Result<(), AgentError> {
        Ok(())
    }

    async fn request_move(
        &mut self,
        _bot_index: usize,
        _snapshot: UniverseSnapshot,
    ) -> Result<Direction, AgentError> {
        Ok(Direction::Stop)
    }

    async fn shutdown(&mut self) {}
}

/// Picks a uniformly random legal move, avoiding `Stop` when possible.
pub struct RandomWalkAgent {
    rng: ChaCha8Rng,
}

impl RandomWalkAgent {
    /// Creates a walker with its own seeded stream.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

#[async_trait]
impl AgentProxy for RandomWalkAgent {
    async fn bind(&mut self, _bot_indices: Vec<usize>) -> Result<(), AgentError> {
        Ok(())
    }

    async fn send_initial(&mut self, _snapshot: UniverseSnapshot) -> Result<(), AgentError> {
        Ok(())
    }

    async fn request_move(
        &mut self,
        bot_index: usize,
        snapshot: UniverseSnapshot,
    ) -> Result<Direction, AgentError> {
        let position = match snapshot.bots.get(bot_index) {
            Some(bot) => bot.position,
            None => return Err(AgentError::MoveRejected),
        };
        let mut moves = snapshot.legal_moves(position);
        moves.retain(|d| *d != Direction::Stop);
        Ok(moves
            .choose(&mut self.rng)
            .copied()
            .unwrap_or(Direction::Stop))
    }

    async fn shutdown(&mut self) {}
}

/// Plays a fixed per-bot move script, then stands still.
pub struct ScriptedAgent {
    scripts: HashMap<usize, VecDeque<Direction>>,
}

impl ScriptedAgent {
    /// Creates an agent with no scripts; every bot stands still.
    pub fn new() -> Self {
        Self {
            scripts: HashMap::new(),
        }
    }

    /// Sets the move sequence of one bot.
    pub fn with_script(mut self, bot_index: usize, moves: impl Into<Vec<Direction>>) -> Self {
        self.scripts.insert(bot_index, moves.into().into());
        self
    }
}

impl Default for ScriptedAgent {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AgentProxy for ScriptedAgent {
    async fn bind(&mut self, _bot_indices: Vec<usize>) -> Result<(), AgentError> {
        Ok(())
    }

    async fn send_initial(&mut self, _snapshot: UniverseSnapshot) -> Result<(), AgentError> {
        Ok(())
    }

    async fn request_move(
        &mut self,
        bot_index: usize,
        _snapshot: UniverseSnapshot,
    ) -> Result<Direction, AgentError> {
        Ok(self
            .scripts
            .get_mut(&bot_index)
            .and_then(VecDeque::pop_front)
            .unwrap_or(Direction::Stop))
    }

    async fn shutdown(&mut self) {}
}

/// Never answers; every call runs into the scheduler's timeout.
pub struct StallingAgent;

#[async_trait]
impl AgentProxy for StallingAgent {
    async fn bind(&mut self, _bot_indices: Vec<usize>) -> Result<(), AgentError> {
        Ok(())
    }

    async fn send_initial(&mut self, _snapshot: UniverseSnapshot) -> Result<(), AgentError> {
        Ok(())
    }

    async fn request_move(
        &mut self,
        _bot_index: usize,
        _snapshot: UniverseSnapshot,
    ) -> Result<Direction, AgentError> {
        std::future::pending().await
    }

    async fn shutdown(&mut self) {}
}

/// Reports `MoveRejected` on every call.
pub struct RejectingAgent;

#[async_trait]
impl AgentProxy for RejectingAgent {
    async fn bind(&mut self, _bot_indices: Vec<usize>) -> Result<(), AgentError> {
        Ok(())
    }

    async fn send_initial(&mut self, _snapshot: UniverseSnapshot) -> Result<(), AgentError> {
        Ok(())
    }

    async fn request_move(
        &mut self,
        _bot_index: usize,
        _snapshot: UniverseSnapshot,
    ) -> Result<Direction, AgentError> {
        Err(AgentError::MoveRejected)
    }

    async fn shutdown(&mut self) {}
}

/// Answers with a move into a wall whenever one exists.
pub struct IllegalMoveAgent;

#[async_trait]
impl AgentProxy for IllegalMoveAgent {
    async fn bind(&mut self, _bot_indices: Vec<usize>) -> Result<(), AgentError> {
        Ok(())
    }

    async fn send_initial(&mut self, _snapshot: UniverseSnapshot) -> Result<(), AgentError> {
        Ok(())
    }

    async fn request_move(
        &mut self,
        bot_index: usize,
        snapshot: UniverseSnapshot,
    ) -> Result<Direction, AgentError> {
        let position = match snapshot.bots.get(bot_index) {
            Some(bot) => bot.position,
            None => return Err(AgentError::MoveRejected),
        };
        Ok(Direction::ALL
            .into_iter()
            .find(|d| *d != Direction::Stop && snapshot.is_blocked(position.step(*d)))
            .unwrap_or(Direction::Stop))
    }

    async fn shutdown(&mut self) {}
}

/// Answers `Stop` for a number of calls, then reports `Disconnected`.
pub struct DisconnectingAgent {
    calls_before_drop: u32,
    calls_seen: u32,
}

impl DisconnectingAgent {
    /// `calls_before_drop == 0` fails on the very first move request.
    pub fn new(calls_before_drop: u32) -> Self {
        Self {
            calls_before_drop,
            calls_seen: 0,
        }
    }
}

#[async_trait]
impl AgentProxy for DisconnectingAgent {
    async fn bind(&mut self, _bot_indices: Vec<usize>) -> Result<(), AgentError> {
        Ok(())
    }

    async fn send_initial(&mut self, _snapshot: UniverseSnapshot) -> Result<(), AgentError> {
        Ok(())
    }

    async fn request_move(
        &mut self,
        _bot_index: usize,
        _snapshot: UniverseSnapshot,
    ) -> Result<Direction, AgentError> {
        if self.calls_seen >= self.calls_before_drop {
            return Err(AgentError::Disconnected);
        }
        self.calls_seen += 1;
        Ok(Direction::Stop)
    }

    async fn shutdown(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{GridUniverse, DEFAULT_LAYOUT};
    use mazeclash_env::Universe;

    #[tokio::test]
    async fn test_random_walk_agent_plays_legal_non_stop_moves() {
        let universe = GridUniverse::from_layout(DEFAULT_LAYOUT).unwrap();
        let snapshot = universe.snapshot();
        let mut agent = RandomWalkAgent::new(7);

        for _ in 0..20 {
            let direction = agent.request_move(0, snapshot.clone()).await.unwrap();
            assert_ne!(direction, Direction::Stop);
            assert!(universe
                .legal_moves(snapshot.bots[0].position)
                .contains(&direction));
        }
    }

    #[tokio::test]
    async fn test_illegal_move_agent_picks_a_blocked_direction() {
        let universe = GridUniverse::from_layout(DEFAULT_LAYOUT).unwrap();
        let snapshot = universe.snapshot();
        let mut agent = IllegalMoveAgent;

        let direction = agent.request_move(0, snapshot.clone()).await.unwrap();
        assert!(snapshot.is_blocked(snapshot.bots[0].position.step(direction)));
    }

    #[tokio::test]
    async fn test_disconnecting_agent_drops_after_budget() {
        let universe = GridUniverse::from_layout(DEFAULT_LAYOUT).unwrap();
        let snapshot = universe.snapshot();
        let mut agent = DisconnectingAgent::new(2);

        assert!(agent.request_move(0, snapshot.clone()).await.is_ok());
        assert!(agent.request_move(0, snapshot.clone()).await.is_ok());
        assert_eq!(
            agent.request_move(0, snapshot).await.unwrap_err(),
            AgentError::Disconnected
        );
    }

    #[tokio::test]
    async fn test_scripted_agent_falls_back_to_stop() {
        let universe = GridUniverse::from_layout(DEFAULT_LAYOUT).unwrap();
        let snapshot = universe.snapshot();
        let mut agent = ScriptedAgent::new().with_script(0, [Direction::East]);

        assert_eq!(
            agent.request_move(0, snapshot.clone()).await.unwrap(),
            Direction::East
        );
        assert_eq!(
            agent.request_move(0, snapshot).await.unwrap(),
            Direction::Stop
        );
    }
}
