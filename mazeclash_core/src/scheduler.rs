//! The GameMaster: round/turn scheduling over untrusted agents.
//!
//! The scheduler owns the authoritative universe and the match record. It
//! drives bots in deterministic round-robin order, one agent call in flight
//! at a time, and survives slow, buggy or disconnecting agents without ever
//! exposing partially-applied state: observers are notified exactly once
//! after every atomic bot-turn.

use crate::config::MatchConfig;
use crate::noise::NoiseEngine;
use mazeclash_env::{
    AgentError, AgentProxy, Direction, GameState, MatchContext, MatchError, MazeTopology,
    MoveError, Observer, Universe,
};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Outcome of a single `advance_turn` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnStatus {
    /// One bot moved; the round continues
    Advanced,

    /// One bot moved and it completed the round
    RoundComplete,

    /// The match is over (possibly before this call)
    Finished,
}

/// Lifecycle of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchPhase {
    NotStarted,
    Running,
    Finished,
}

/// Handle for cancelling a match from outside the scheduling task.
///
/// Cancellation is observed at the next turn boundary; the scheduler then
/// tears down every agent and observer and reports
/// [`MatchError::Aborted`]. A cancelled match is abandoned, not paused.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    /// Requests cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Returns true once cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Controller of agent moves and universe updates.
///
/// Generic over the authoritative [`Universe`] and the clock/seed
/// [`MatchContext`]; agents and observers are registered as boxed trait
/// objects so transports stay pluggable.
pub struct GameMaster<U: Universe, C: MatchContext> {
    universe: U,
    context: Arc<C>,
    config: MatchConfig,
    agents: Vec<Box<dyn AgentProxy>>,
    observers: Vec<Box<dyn Observer>>,
    noiser: Option<NoiseEngine>,
    game_state: GameState,
    fallback_rng: ChaCha8Rng,
    /// Bot due to move next within the current round; None between rounds
    turn_cursor: Option<usize>,
    started: bool,
    summary: Option<String>,
    cancel: CancelHandle,
}

impl<U: Universe, C: MatchContext> GameMaster<U, C> {
    /// Creates a scheduler over an authoritative universe.
    ///
    /// The fallback-move stream seeds directly from the context; the noise
    /// stream derives a separate seed so toggling fog-of-war never changes
    /// fallback decisions for a fixed master seed.
    pub fn new(
        universe: U,
        topology: Arc<dyn MazeTopology>,
        context: Arc<C>,
        config: MatchConfig,
    ) -> Self {
        let seed = context.seed();
        let noise_seed = seed.wrapping_mul(0x9e3779b97f4a7c15);
        let noiser = config
            .noise
            .then(|| NoiseEngine::new(topology, config.noise_params, noise_seed));

        Self {
            universe,
            context,
            config,
            agents: Vec::new(),
            observers: Vec::new(),
            noiser,
            game_state: GameState::default(),
            fallback_rng: ChaCha8Rng::seed_from_u64(seed),
            turn_cursor: None,
            started: false,
            summary: None,
            cancel: CancelHandle::default(),
        }
    }

    /// Registers the next team's agent; binding order is team order.
    pub fn register_team(
        &mut self,
        agent: Box<dyn AgentProxy>,
        name: &str,
    ) -> Result<(), MatchError> {
        if self.started {
            return Err(MatchError::Config(
                "teams must be registered before the match starts".into(),
            ));
        }
        let team_index = self.agents.len();
        if !name.is_empty() && team_index < self.universe.team_count() {
            self.universe.set_team_name(team_index, name);
        }
        self.agents.push(agent);
        Ok(())
    }

    /// Registers an observer of match progress.
    pub fn register_viewer(&mut self, observer: Box<dyn Observer>) {
        self.observers.push(observer);
    }

    /// Returns a handle for cancelling this match externally.
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// The authoritative match record.
    pub fn game_state(&self) -> &GameState {
        &self.game_state
    }

    /// Read access to the authoritative universe.
    pub fn universe(&self) -> &U {
        &self.universe
    }

    /// The one-line result summary, set when the match concludes.
    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> MatchPhase {
        if self.game_state.finished {
            MatchPhase::Finished
        } else if self.started {
            MatchPhase::Running
        } else {
            MatchPhase::NotStarted
        }
    }

    /// Binds every agent to its team's bots and distributes the initial
    /// snapshot to agents and observers.
    ///
    /// Fails with [`MatchError::Config`] when the registered agent count
    /// does not match the universe's team count. An agent whose transport
    /// fails during setup disqualifies its team on the spot.
    pub async fn start(&mut self) -> Result<(), MatchError> {
        if self.started {
            return Ok(());
        }
        if self.universe.team_count() != 2 {
            return Err(MatchError::Config(format!(
                "a match needs exactly 2 teams, universe has {}",
                self.universe.team_count()
            )));
        }
        if self.agents.len() != self.universe.team_count() {
            return Err(MatchError::Config(format!(
                "universe uses {} teams, but {} are registered",
                self.universe.team_count(),
                self.agents.len()
            )));
        }
        self.started = true;

        for team_index in 0..self.agents.len() {
            let bot_indices: Vec<usize> = (0..self.universe.bot_count())
                .filter(|&b| self.universe.bot(b).team_index == team_index)
                .collect();
            let snapshot = self.universe.snapshot();

            if let Err(err) = self.agents[team_index].bind(bot_indices).await {
                warn!("team {} failed to bind: {}; team disqualified", team_index, err);
                self.disqualify(team_index);
                break;
            }
            if let Err(err) = self.agents[team_index].send_initial(snapshot).await {
                warn!(
                    "team {} failed initial handshake: {}; team disqualified",
                    team_index, err
                );
                self.disqualify(team_index);
                break;
            }
        }

        let snapshot = self.universe.snapshot();
        for observer in &mut self.observers {
            observer.send_initial(snapshot.clone()).await;
        }
        Ok(())
    }

    /// Advances exactly one bot-move, or begins the next round when the
    /// current one is exhausted. No-op once the match is finished.
    ///
    /// This is the cooperative, resumable step a host driver pumps at its
    /// own pace; suspension only ever happens between turns, never
    /// mid-turn.
    pub async fn advance_turn(&mut self) -> Result<TurnStatus, MatchError> {
        if self.game_state.finished {
            return Ok(TurnStatus::Finished);
        }
        if !self.started {
            return Err(MatchError::Config("match has not been started".into()));
        }
        if self.cancel.is_cancelled() {
            self.teardown().await;
            return Err(MatchError::Aborted);
        }

        let cursor = match self.turn_cursor {
            Some(cursor) => cursor,
            None => {
                self.prepare_next_round();
                if self.termination_due() {
                    self.conclude();
                    self.notify_observers().await;
                    return Ok(TurnStatus::Finished);
                }
                self.turn_cursor = Some(0);
                0
            }
        };

        self.play_turn(cursor).await?;
        self.notify_observers().await;

        if self.game_state.finished {
            // Disqualification ended the match mid-round
            self.turn_cursor = None;
            return Ok(TurnStatus::Finished);
        }

        let next = cursor + 1;
        if next < self.universe.bot_count() {
            self.turn_cursor = Some(next);
            return Ok(TurnStatus::Advanced);
        }

        self.turn_cursor = None;
        if self.termination_due() {
            self.conclude();
            self.notify_observers().await;
            return Ok(TurnStatus::Finished);
        }
        Ok(TurnStatus::RoundComplete)
    }

    /// Advances turns until a full round completes or the match finishes.
    pub async fn advance_round(&mut self) -> Result<TurnStatus, MatchError> {
        loop {
            match self.advance_turn().await? {
                TurnStatus::Advanced => continue,
                status => return Ok(status),
            }
        }
    }

    /// Plays the match to completion, then issues one final observer
    /// notification and releases the agents.
    pub async fn play(&mut self) -> Result<(), MatchError> {
        self.start().await?;
        while !self.game_state.finished {
            self.advance_round().await?;
        }
        self.notify_observers().await;
        self.shutdown_agents().await;
        Ok(())
    }

    /// One bot-turn: snapshot, noise, bounded agent call, apply/recover.
    async fn play_turn(&mut self, bot_index: usize) -> Result<(), MatchError> {
        let turn_start = self.context.now();
        self.game_state.begin_turn(bot_index);

        let bot = self.universe.bot(bot_index);
        let team_index = bot.team_index;

        let mut snapshot = self.universe.snapshot();
        if let Some(noiser) = self.noiser.as_mut() {
            noiser.obscure(&mut snapshot, bot_index);
        }

        let timeout_length = self.config.timeout_length;
        let context = Arc::clone(&self.context);
        let call_start = context.now();
        // Biased select: a ready reply always beats the timeout, and on
        // expiry the in-flight call future is dropped, releasing the call.
        let outcome = tokio::select! {
            biased;
            result = self.agents[team_index].request_move(bot_index, snapshot) => result,
            _ = context.sleep(timeout_length) => Err(AgentError::Timeout),
        };
        let elapsed = self.context.now().saturating_sub(call_start);
        self.game_state.team_time[team_index] += elapsed.as_secs_f64();

        match outcome {
            Ok(direction) => match self.universe.apply_move(bot_index, direction) {
                Ok(diff) => {
                    debug!(
                        "round {:?} bot {} moved {:?}",
                        self.game_state.round_index, bot_index, direction
                    );
                    self.game_state.merge_diff(diff);
                }
                Err(MoveError::Illegal { .. }) => {
                    self.recover_failure(bot_index, team_index, AgentError::MoveRejected)?;
                }
            },
            Err(AgentError::Disconnected) => {
                warn!(
                    "team {} (bot {}) disconnected; team disqualified",
                    team_index, bot_index
                );
                self.game_state.team_wins = Some(1 - team_index);
                self.conclude();
            }
            Err(err) => {
                self.recover_failure(bot_index, team_index, err)?;
            }
        }

        let turn_elapsed = self.context.now().saturating_sub(turn_start);
        self.game_state.running_time += turn_elapsed.as_secs_f64();
        Ok(())
    }

    /// Recovery for Timeout / MoveRejected: count the failure, disqualify
    /// at the bound, otherwise apply a random legal fallback move that
    /// avoids standing still whenever possible.
    fn recover_failure(
        &mut self,
        bot_index: usize,
        team_index: usize,
        err: AgentError,
    ) -> Result<(), MatchError> {
        self.game_state.timeout_teams[team_index] += 1;
        let count = self.game_state.timeout_teams[team_index];

        if count >= self.config.max_timeouts {
            warn!(
                "failure #{} for team {} (bot {}): {}; team disqualified",
                count, team_index, bot_index, err
            );
            self.game_state.team_wins = Some(1 - team_index);
            self.conclude();
            return Ok(());
        }
        warn!(
            "failure #{} for team {} (bot {}): {}",
            count, team_index, bot_index, err
        );

        let position = self.universe.bot(bot_index).position;
        let mut moves = self.universe.legal_moves(position);
        moves.retain(|d| *d != Direction::Stop);
        let direction = moves
            .choose(&mut self.fallback_rng)
            .copied()
            .unwrap_or(Direction::Stop);

        let diff = self.universe.apply_move(bot_index, direction)?;
        self.game_state.merge_diff(diff);
        Ok(())
    }

    /// Starts the next round's bookkeeping. `round_index` never exceeds
    /// the round limit.
    fn prepare_next_round(&mut self) {
        self.game_state.bot_id = None;
        self.game_state.round_index = Some(match self.game_state.round_index {
            None => 0,
            Some(round) => round.saturating_add(1).min(self.config.game_time),
        });
    }

    /// True when the match must conclude: a result is already set, the
    /// round limit is reached, or either team has no opposing food left.
    fn termination_due(&self) -> bool {
        if self.game_state.team_wins.is_some() || self.game_state.game_draw.is_some() {
            return true;
        }
        if matches!(self.game_state.round_index, Some(round) if round >= self.config.game_time) {
            return true;
        }
        (0..self.universe.team_count()).any(|team| self.universe.enemy_food_count(team) == 0)
    }

    /// Immediate loss for `team_index`, e.g. on disconnect during start.
    fn disqualify(&mut self, team_index: usize) {
        self.game_state.team_wins = Some(1 - team_index);
        self.conclude();
    }

    /// Finalizes the match exactly once: decides the winner by score
    /// unless a disqualification already did, freezes the record, and
    /// emits the one-line summary.
    fn conclude(&mut self) {
        if self.game_state.finished {
            return;
        }
        if self.game_state.team_wins.is_none() && self.game_state.game_draw.is_none() {
            let score0 = self.universe.team(0).score;
            let score1 = self.universe.team(1).score;
            if score0 > score1 {
                self.game_state.team_wins = Some(0);
            } else if score1 > score0 {
                self.game_state.team_wins = Some(1);
            } else {
                self.game_state.game_draw = Some(true);
            }
        }
        self.game_state.finished = true;
        self.game_state.bot_id = None;

        let line = match self.game_state.team_wins {
            Some(winner) => {
                let won = self.universe.team(winner);
                let lost = self.universe.team(1 - winner);
                format!(
                    "Finished. '{}' won over '{}'. ({}:{})",
                    won.name, lost.name, won.score, lost.score
                )
            }
            None => {
                let team0 = self.universe.team(0);
                let team1 = self.universe.team(1);
                format!(
                    "Finished. '{}' and '{}' had a draw. ({}:{})",
                    team0.name, team1.name, team0.score, team1.score
                )
            }
        };
        info!("{}", line);
        self.summary = Some(line);
    }

    /// Sends the post-turn deep snapshot and record to every observer.
    async fn notify_observers(&mut self) {
        let snapshot = self.universe.snapshot();
        for observer in &mut self.observers {
            observer
                .observe(snapshot.clone(), self.game_state.clone())
                .await;
        }
    }

    /// Releases every agent transport.
    async fn shutdown_agents(&mut self) {
        for agent in &mut self.agents {
            agent.shutdown().await;
        }
    }

    /// Cancellation path: release agents, drop observers.
    async fn teardown(&mut self) {
        self.shutdown_agents().await;
        self.observers.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use async_trait::async_trait;
    use mazeclash_env::{
        BotMoved, BotView, CellPos, MoveDiff, TeamView, UniverseSnapshot,
    };
    use std::sync::Mutex;
    use std::time::Duration;

    /// Virtual clock: `sleep` advances time and returns, so the timeout
    /// branch resolves deterministically whenever the agent future is
    /// pending.
    struct TestContext {
        clock: Mutex<Duration>,
        seed: u64,
    }

    impl TestContext {
        fn shared(seed: u64) -> Arc<Self> {
            Arc::new(Self {
                clock: Mutex::new(Duration::ZERO),
                seed,
            })
        }
    }

    #[async_trait]
    impl MatchContext for TestContext {
        fn now(&self) -> Duration {
            *self.clock.lock().unwrap()
        }

        async fn sleep(&self, duration: Duration) {
            *self.clock.lock().unwrap() += duration;
        }

        fn seed(&self) -> u64 {
            self.seed
        }
    }

    /// 1x8 corridor. Bot 0 (team 0) starts at x=0, bot 1 (team 1) at x=7.
    /// Team 0's homezone is x < 4. Food: one piece per zone.
    struct LineUniverse {
        positions: [CellPos; 2],
        food: [Vec<CellPos>; 2],
        scores: [i32; 2],
        names: [String; 2],
    }

    impl LineUniverse {
        const LEN: i32 = 8;

        fn new() -> Self {
            Self {
                positions: [CellPos::new(0, 0), CellPos::new(7, 0)],
                food: [vec![CellPos::new(2, 0)], vec![CellPos::new(5, 0)]],
                scores: [0, 0],
                names: ["blue".into(), "red".into()],
            }
        }

        fn zone_of(pos: CellPos) -> usize {
            usize::from(pos.x >= Self::LEN / 2)
        }
    }

    impl Universe for LineUniverse {
        fn snapshot(&self) -> UniverseSnapshot {
            UniverseSnapshot {
                width: Self::LEN,
                height: 1,
                walls: vec![],
                food: self.food.iter().cloned().collect(),
                bots: (0..2)
                    .map(|index| BotView {
                        index,
                        team_index: index,
                        position: self.positions[index],
                        noisy: false,
                    })
                    .collect(),
                teams: (0..2).map(|index| self.team(index)).collect(),
            }
        }

        fn apply_move(
            &mut self,
            bot_index: usize,
            direction: Direction,
        ) -> Result<MoveDiff, MoveError> {
            let old_pos = self.positions[bot_index];
            if !self.legal_moves(old_pos).contains(&direction) {
                return Err(MoveError::Illegal { bot_index });
            }
            let new_pos = old_pos.step(direction);
            self.positions[bot_index] = new_pos;

            let mut diff = MoveDiff {
                bot_moved: vec![BotMoved {
                    bot_index,
                    old_pos,
                    new_pos,
                }],
                ..MoveDiff::default()
            };
            let enemy_zone = 1 - bot_index;
            if Self::zone_of(new_pos) == enemy_zone {
                if let Some(i) = self.food[enemy_zone].iter().position(|f| *f == new_pos) {
                    self.food[enemy_zone].remove(i);
                    self.scores[bot_index] += 1;
                    diff.food_eaten.push(mazeclash_env::FoodEaten {
                        bot_index,
                        position: new_pos,
                    });
                }
            }
            Ok(diff)
        }

        fn legal_moves(&self, position: CellPos) -> Vec<Direction> {
            Direction::ALL
                .into_iter()
                .filter(|d| {
                    let next = position.step(*d);
                    (0..Self::LEN).contains(&next.x) && next.y == 0
                })
                .collect()
        }

        fn enemy_food_count(&self, team_index: usize) -> usize {
            self.food[1 - team_index].len()
        }

        fn bot_count(&self) -> usize {
            2
        }

        fn bot(&self, index: usize) -> BotView {
            BotView {
                index,
                team_index: index,
                position: self.positions[index],
                noisy: false,
            }
        }

        fn team_count(&self) -> usize {
            2
        }

        fn team(&self, index: usize) -> TeamView {
            TeamView {
                index,
                name: self.names[index].clone(),
                score: self.scores[index],
            }
        }

        fn set_team_name(&mut self, team_index: usize, name: &str) {
            self.names[team_index] = name.to_string();
        }
    }

    /// Corridor distances for the noise engine.
    struct LineTopology;

    impl MazeTopology for LineTopology {
        fn graph_distance(&self, from: CellPos, to: CellPos) -> Option<usize> {
            Some((from.x - to.x).unsigned_abs() as usize)
        }

        fn cells_within(&self, origin: CellPos, radius: usize) -> Vec<CellPos> {
            let radius = radius as i32;
            ((origin.x - radius).max(0)..=(origin.x + radius).min(LineUniverse::LEN - 1))
                .map(|x| CellPos::new(x, 0))
                .collect()
        }
    }

    struct ConstAgent(Direction);

    #[async_trait]
    impl AgentProxy for ConstAgent {
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
            Ok(self.0)
        }

        async fn shutdown(&mut self) {}
    }

    /// Never answers; the scheduler's timeout fires every call.
    struct NeverAgent;

    #[async_trait]
    impl AgentProxy for NeverAgent {
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

    struct DisconnectAgent;

    #[async_trait]
    impl AgentProxy for DisconnectAgent {
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
            Err(AgentError::Disconnected)
        }

        async fn shutdown(&mut self) {}
    }

    fn master(config: MatchConfig) -> GameMaster<LineUniverse, TestContext> {
        GameMaster::new(
            LineUniverse::new(),
            Arc::new(LineTopology),
            TestContext::shared(42),
            config,
        )
    }

    #[tokio::test]
    async fn test_start_requires_matching_team_count() {
        let mut gm = master(MatchConfig::default());
        gm.register_team(Box::new(ConstAgent(Direction::Stop)), "solo")
            .unwrap();

        let err = gm.start().await.unwrap_err();
        assert!(matches!(err, MatchError::Config(_)));
    }

    #[tokio::test]
    async fn test_register_after_start_is_rejected() {
        let mut gm = master(MatchConfig::default());
        gm.register_team(Box::new(ConstAgent(Direction::Stop)), "a")
            .unwrap();
        gm.register_team(Box::new(ConstAgent(Direction::Stop)), "b")
            .unwrap();
        gm.start().await.unwrap();

        let err = gm
            .register_team(Box::new(ConstAgent(Direction::Stop)), "late")
            .unwrap_err();
        assert!(matches!(err, MatchError::Config(_)));
    }

    #[tokio::test]
    async fn test_stand_still_match_is_a_draw_after_game_time() {
        let mut gm = master(MatchConfig::default().with_game_time(3));
        assert_eq!(gm.phase(), MatchPhase::NotStarted);
        gm.register_team(Box::new(ConstAgent(Direction::Stop)), "a")
            .unwrap();
        gm.register_team(Box::new(ConstAgent(Direction::Stop)), "b")
            .unwrap();

        gm.play().await.unwrap();
        assert_eq!(gm.phase(), MatchPhase::Finished);

        let state = gm.game_state();
        assert!(state.finished);
        assert_eq!(state.game_draw, Some(true));
        assert_eq!(state.team_wins, None);
        assert_eq!(state.round_index, Some(3));
        assert_eq!(state.timeout_teams, [0, 0]);
        assert!(gm.summary().unwrap().contains("draw"));
    }

    #[tokio::test]
    async fn test_five_timeouts_disqualify_before_game_time() {
        let config = MatchConfig::default().with_game_time(50);
        let timeout_secs = config.timeout_length.as_secs_f64();
        let mut gm = master(config);
        gm.register_team(Box::new(NeverAgent), "sleepy").unwrap();
        gm.register_team(Box::new(ConstAgent(Direction::Stop)), "patient")
            .unwrap();

        gm.play().await.unwrap();

        let state = gm.game_state();
        assert!(state.finished);
        assert_eq!(state.team_wins, Some(1));
        assert_eq!(state.game_draw, None);
        assert_eq!(state.timeout_teams[0], 5);
        // One timeout per round; disqualified during round 4
        assert_eq!(state.round_index, Some(4));
        assert_relative_eq!(state.team_time[0], 5.0 * timeout_secs);
        assert!(gm.summary().unwrap().contains("won"));
    }

    #[tokio::test]
    async fn test_fallback_moves_are_legal_and_avoid_standing_still() {
        let mut gm = master(MatchConfig::default().with_game_time(50));
        gm.register_team(Box::new(NeverAgent), "sleepy").unwrap();
        gm.register_team(Box::new(ConstAgent(Direction::Stop)), "patient")
            .unwrap();
        gm.start().await.unwrap();

        // First turn: team 0 times out, fallback must move the bot. From
        // x=0 the only non-stop legal move is East.
        gm.advance_turn().await.unwrap();
        assert_eq!(gm.game_state().timeout_teams[0], 1);
        assert_eq!(gm.universe().bot(0).position, CellPos::new(1, 0));
        assert!(!gm.game_state().bot_moved.is_empty());
    }

    #[tokio::test]
    async fn test_illegal_move_takes_the_recovery_path() {
        // North is never legal in the corridor
        let mut gm = master(MatchConfig::default().with_game_time(50));
        gm.register_team(Box::new(ConstAgent(Direction::North)), "confused")
            .unwrap();
        gm.register_team(Box::new(ConstAgent(Direction::Stop)), "patient")
            .unwrap();
        gm.start().await.unwrap();

        gm.advance_turn().await.unwrap();

        assert_eq!(gm.game_state().timeout_teams[0], 1);
        assert_eq!(gm.universe().bot(0).position, CellPos::new(1, 0));
    }

    #[tokio::test]
    async fn test_disconnect_ends_match_without_fallback() {
        let mut gm = master(MatchConfig::default().with_game_time(50));
        gm.register_team(Box::new(DisconnectAgent), "flaky").unwrap();
        gm.register_team(Box::new(ConstAgent(Direction::Stop)), "patient")
            .unwrap();
        gm.start().await.unwrap();

        let status = gm.advance_turn().await.unwrap();

        let state = gm.game_state();
        assert_eq!(status, TurnStatus::Finished);
        assert!(state.finished);
        assert_eq!(state.team_wins, Some(1));
        assert_eq!(state.timeout_teams, [0, 0]);
        // No fallback move was applied for the disconnecting turn
        assert!(state.bot_moved.is_empty());
        assert_eq!(gm.universe().bot(0).position, CellPos::new(0, 0));
    }

    #[tokio::test]
    async fn test_food_exhaustion_finishes_early_and_scores_decide() {
        // Bot 0 marches east, eats the enemy food at x=5 in round 4
        let mut gm = master(MatchConfig::default().with_game_time(8));
        gm.register_team(Box::new(ConstAgent(Direction::East)), "eater")
            .unwrap();
        gm.register_team(Box::new(ConstAgent(Direction::Stop)), "idle")
            .unwrap();

        gm.play().await.unwrap();

        let state = gm.game_state();
        assert!(state.finished);
        assert_eq!(state.team_wins, Some(0));
        assert_eq!(state.round_index, Some(4));
        assert_eq!(gm.universe().team(0).score, 1);
        assert_eq!(gm.universe().enemy_food_count(0), 0);
    }

    #[tokio::test]
    async fn test_advance_turn_is_a_noop_once_finished() {
        let mut gm = master(MatchConfig::default().with_game_time(1));
        gm.register_team(Box::new(ConstAgent(Direction::Stop)), "a")
            .unwrap();
        gm.register_team(Box::new(ConstAgent(Direction::Stop)), "b")
            .unwrap();
        gm.play().await.unwrap();

        let summary_before = gm.summary().map(str::to_owned);
        let state_before = gm.game_state().clone();

        assert_eq!(gm.advance_turn().await.unwrap(), TurnStatus::Finished);
        assert_eq!(gm.game_state(), &state_before);
        assert_eq!(gm.summary().map(str::to_owned), summary_before);
    }

    #[tokio::test]
    async fn test_cancellation_aborts_and_tears_down() {
        let mut gm = master(MatchConfig::default());
        gm.register_team(Box::new(ConstAgent(Direction::Stop)), "a")
            .unwrap();
        gm.register_team(Box::new(ConstAgent(Direction::Stop)), "b")
            .unwrap();
        gm.start().await.unwrap();

        let handle = gm.cancel_handle();
        gm.advance_turn().await.unwrap();
        handle.cancel();

        let err = gm.advance_turn().await.unwrap_err();
        assert_eq!(err, MatchError::Aborted);
    }

    #[tokio::test]
    async fn test_round_index_is_monotonic_and_bounded() {
        let game_time = 5;
        let mut gm = master(MatchConfig::default().with_game_time(game_time));
        gm.register_team(Box::new(ConstAgent(Direction::Stop)), "a")
            .unwrap();
        gm.register_team(Box::new(ConstAgent(Direction::Stop)), "b")
            .unwrap();
        gm.start().await.unwrap();

        let mut last = None;
        loop {
            let status = gm.advance_turn().await.unwrap();
            let round = gm.game_state().round_index;
            assert!(round >= last);
            assert!(matches!(round, Some(r) if r <= game_time));
            last = round;
            if status == TurnStatus::Finished {
                break;
            }
        }
    }
}
