//! Scenario runner - drives failure-mode matches and checks their outcome.

use crate::agents::{
    DisconnectingAgent, RandomWalkAgent, RejectingAgent, ScriptedAgent, StandStillAgent,
    StallingAgent,
};
use crate::context::SimContext;
use crate::recorder::MatchRecorder;
use crate::scenarios::ScenarioId;
use crate::world::{GridUniverse, DEFAULT_LAYOUT};

use mazeclash_core::{GameMaster, MatchConfig};
use mazeclash_env::{Direction, GameState, Universe};
use std::sync::Arc;
use tracing::info;

/// Results from running a scenario.
#[derive(Debug, Clone)]
pub struct ScenarioResult {
    /// Scenario that was run
    pub scenario: ScenarioId,

    /// Seed used
    pub seed: u64,

    /// Whether the scenario passed all assertions
    pub passed: bool,

    /// Final round index, if the match produced one
    pub rounds_played: Option<u32>,

    /// Failure message if any
    pub failure_reason: Option<String>,

    /// The scheduler's one-line result summary
    pub summary: Option<String>,
}

/// Accumulates assertion failures for one scenario run.
#[derive(Default)]
struct Checks {
    failures: Vec<String>,
}

impl Checks {
    fn expect(&mut self, condition: bool, what: &str) {
        if !condition {
            self.failures.push(what.to_string());
        }
    }

    fn fail(&mut self, what: String) {
        self.failures.push(what);
    }

    fn into_reason(self) -> Option<String> {
        if self.failures.is_empty() {
            None
        } else {
            Some(self.failures.join("; "))
        }
    }
}

/// Runs failure-mode scenarios against the default arena.
pub struct ScenarioRunner {
    /// Master seed
    seed: u64,

    /// Round limit for scenarios that run to the limit
    game_time: u32,
}

impl ScenarioRunner {
    /// Creates a new scenario runner.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            game_time: 30,
        }
    }

    /// Sets the round limit.
    pub fn with_game_time(mut self, game_time: u32) -> Self {
        self.game_time = game_time;
        self
    }

    /// Runs a scenario and returns the result.
    pub async fn run(&self, scenario: ScenarioId) -> ScenarioResult {
        info!("Starting scenario: {} (seed={})", scenario.name(), self.seed);
        match scenario {
            ScenarioId::StandStillDraw => self.run_stand_still_draw().await,
            ScenarioId::TimeoutDisqualification => self.run_timeout_disqualification().await,
            ScenarioId::EarlyDisconnect => self.run_early_disconnect().await,
            ScenarioId::FoodRush => self.run_food_rush().await,
            ScenarioId::FallbackStorm => self.run_fallback_storm().await,
            ScenarioId::SeedReplay => self.run_seed_replay().await,
        }
    }

    fn arena() -> GridUniverse {
        GridUniverse::from_layout(DEFAULT_LAYOUT).expect("default layout is valid")
    }

    fn master(&self, config: MatchConfig) -> GameMaster<GridUniverse, SimContext> {
        let universe = Self::arena();
        let topology = Arc::new(universe.adjacency());
        GameMaster::new(universe, topology, SimContext::shared(self.seed), config)
    }

    fn result(
        &self,
        scenario: ScenarioId,
        state: Option<&GameState>,
        summary: Option<String>,
        checks: Checks,
    ) -> ScenarioResult {
        let rounds_played = state.and_then(|s| s.round_index);
        let failure_reason = checks.into_reason();
        ScenarioResult {
            scenario,
            seed: self.seed,
            passed: failure_reason.is_none(),
            rounds_played,
            failure_reason,
            summary,
        }
    }

    /// Both teams stand still; the match runs the full round limit and
    /// ends in a draw, with one observer frame per bot-turn.
    async fn run_stand_still_draw(&self) -> ScenarioResult {
        let mut checks = Checks::default();
        let mut gm = self.master(MatchConfig::default().with_game_time(self.game_time));
        let recorder = MatchRecorder::new();
        let handle = recorder.handle();
        gm.register_viewer(Box::new(recorder));
        gm.register_team(Box::new(StandStillAgent), "blue")
            .expect("registered before start");
        gm.register_team(Box::new(StandStillAgent), "red")
            .expect("registered before start");

        if let Err(err) = gm.play().await {
            checks.fail(format!("match failed: {}", err));
        }

        let state = gm.game_state().clone();
        let bots = gm.universe().bot_count();
        checks.expect(state.finished, "match finished");
        checks.expect(state.game_draw == Some(true), "game_draw set");
        checks.expect(state.team_wins.is_none(), "no winner");
        checks.expect(
            state.round_index == Some(self.game_time),
            "ran exactly game_time rounds",
        );
        checks.expect(state.timeout_teams == [0, 0], "no recovered failures");
        checks.expect(
            handle.frame_count() == bots * self.game_time as usize + 2,
            "one frame per bot-turn plus conclusion and final notification",
        );

        let summary = gm.summary().map(str::to_owned);
        self.result(ScenarioId::StandStillDraw, Some(&state), summary, checks)
    }

    /// Team 0 stalls every call; the fifth timeout disqualifies it long
    /// before the round limit, irrespective of scores.
    async fn run_timeout_disqualification(&self) -> ScenarioResult {
        let mut checks = Checks::default();
        let mut gm = self.master(MatchConfig::default().with_game_time(50));
        gm.register_team(Box::new(StallingAgent), "sleepy")
            .expect("registered before start");
        gm.register_team(Box::new(StandStillAgent), "patient")
            .expect("registered before start");

        if let Err(err) = gm.play().await {
            checks.fail(format!("match failed: {}", err));
        }

        let state = gm.game_state().clone();
        checks.expect(state.finished, "match finished");
        checks.expect(state.team_wins == Some(1), "opposing team wins");
        checks.expect(state.game_draw.is_none(), "no draw");
        checks.expect(state.timeout_teams[0] == 5, "exactly five timeouts");
        checks.expect(
            matches!(state.round_index, Some(r) if r < 50),
            "ended before the round limit",
        );

        let summary = gm.summary().map(str::to_owned);
        self.result(
            ScenarioId::TimeoutDisqualification,
            Some(&state),
            summary,
            checks,
        )
    }

    /// Team 0 disconnects on its very first move request: instant loss,
    /// no fallback move, exactly one turn observed.
    async fn run_early_disconnect(&self) -> ScenarioResult {
        let mut checks = Checks::default();
        let mut gm = self.master(MatchConfig::default().with_game_time(50));
        let recorder = MatchRecorder::new();
        let handle = recorder.handle();
        gm.register_viewer(Box::new(recorder));
        gm.register_team(Box::new(DisconnectingAgent::new(0)), "flaky")
            .expect("registered before start");
        gm.register_team(Box::new(StandStillAgent), "patient")
            .expect("registered before start");

        if let Err(err) = gm.play().await {
            checks.fail(format!("match failed: {}", err));
        }

        let state = gm.game_state().clone();
        checks.expect(state.finished, "match finished");
        checks.expect(state.team_wins == Some(1), "opposing team wins");
        checks.expect(state.timeout_teams == [0, 0], "disconnect is not a timeout");
        checks.expect(
            state.bot_moved.is_empty(),
            "no fallback move for the disconnecting turn",
        );
        checks.expect(
            handle.frame_count() == 2,
            "one disconnecting turn plus the final notification",
        );

        let summary = gm.summary().map(str::to_owned);
        self.result(ScenarioId::EarlyDisconnect, Some(&state), summary, checks)
    }

    /// A scripted bot raids both opposing pellets; the match ends the
    /// round the homezone empties, decided by score.
    async fn run_food_rush(&self) -> ScenarioResult {
        use Direction::{East as E, South as S, West as W};

        let mut checks = Checks::default();
        let mut gm = self.master(MatchConfig::default().with_game_time(30));
        // (1,1) east to the pellet at (10,1), then around the inner walls
        // down to the pellet at (10,5)
        let raid = vec![E, E, E, E, E, E, E, E, E, S, W, S, S, S, E];
        let raid_rounds = raid.len() as u32;
        gm.register_team(Box::new(ScriptedAgent::new().with_script(0, raid)), "raiders")
            .expect("registered before start");
        gm.register_team(Box::new(StandStillAgent), "defenders")
            .expect("registered before start");

        if let Err(err) = gm.play().await {
            checks.fail(format!("match failed: {}", err));
        }

        let state = gm.game_state().clone();
        checks.expect(state.finished, "match finished");
        checks.expect(
            state.round_index == Some(raid_rounds - 1),
            "finished the round the last pellet was eaten",
        );
        checks.expect(state.team_wins == Some(0), "raiding team wins on score");
        checks.expect(
            gm.universe().enemy_food_count(0) == 0,
            "no opposing food left",
        );
        checks.expect(gm.universe().team(0).score == 2, "two pellets scored");

        let summary = gm.summary().map(str::to_owned);
        self.result(ScenarioId::FoodRush, Some(&state), summary, checks)
    }

    /// Team 0 rejects every call but stays below the (raised)
    /// disqualification bound: every one of its turns is carried by a
    /// legal, non-standing fallback move.
    async fn run_fallback_storm(&self) -> ScenarioResult {
        let mut checks = Checks::default();
        let mut config = MatchConfig::default().with_game_time(10);
        config.max_timeouts = 1000;
        let mut gm = self.master(config);
        let recorder = MatchRecorder::new();
        let handle = recorder.handle();
        gm.register_viewer(Box::new(recorder));
        gm.register_team(Box::new(RejectingAgent), "rejecting")
            .expect("registered before start");
        gm.register_team(Box::new(StandStillAgent), "patient")
            .expect("registered before start");

        if let Err(err) = gm.play().await {
            checks.fail(format!("match failed: {}", err));
        }

        let state = gm.game_state().clone();
        checks.expect(state.finished, "match finished");
        checks.expect(state.timeout_teams[0] >= 2, "rejections were recovered, not fatal");

        let record = handle.record();
        let team0_turns: Vec<_> = record
            .frames
            .iter()
            .filter(|f| matches!(f.game_state.bot_id, Some(b) if b % 2 == 0))
            .collect();
        checks.expect(
            state.timeout_teams[0] as usize == team0_turns.len(),
            "every rejected call was counted",
        );
        for frame in team0_turns {
            let Some(moved) = frame.game_state.bot_moved.first() else {
                checks.fail("fallback turn without a move".to_string());
                break;
            };
            if moved.old_pos == moved.new_pos {
                checks.fail("fallback stood still with alternatives available".to_string());
                break;
            }
        }

        let summary = gm.summary().map(str::to_owned);
        self.result(ScenarioId::FallbackStorm, Some(&state), summary, checks)
    }

    /// Replays with a fixed seed are identical, and toggling fog-of-war
    /// does not change fallback decisions (independent streams).
    async fn run_seed_replay(&self) -> ScenarioResult {
        let mut checks = Checks::default();

        let random_match = |seed: u64| async move {
            let universe = Self::arena();
            let topology = Arc::new(universe.adjacency());
            let config = MatchConfig::default().with_game_time(6);
            let mut gm = GameMaster::new(universe, topology, SimContext::shared(seed), config);
            let recorder = MatchRecorder::new();
            let handle = recorder.handle();
            gm.register_viewer(Box::new(recorder));
            gm.register_team(Box::new(RandomWalkAgent::new(seed ^ 1)), "blue")
                .expect("registered before start");
            gm.register_team(Box::new(RandomWalkAgent::new(seed ^ 2)), "red")
                .expect("registered before start");
            gm.play().await.map(|_| handle.record())
        };

        match (random_match(self.seed).await, random_match(self.seed).await) {
            (Ok(first), Ok(second)) => {
                let first_json = first.to_json().unwrap_or_default();
                let second_json = second.to_json().unwrap_or_default();
                checks.expect(
                    !first_json.is_empty() && first_json == second_json,
                    "same seed replays to an identical recording",
                );
            }
            _ => checks.fail("replay match failed".to_string()),
        }

        // Same seed, fog-of-war on vs off: the rejected team's fallback
        // walk must be identical either way.
        let fallback_match = |seed: u64, noise: bool| async move {
            let universe = Self::arena();
            let topology = Arc::new(universe.adjacency());
            let mut config = MatchConfig::default().with_game_time(4).with_noise(noise);
            config.max_timeouts = 1000;
            let mut gm = GameMaster::new(universe, topology, SimContext::shared(seed), config);
            gm.register_team(Box::new(RejectingAgent), "rejecting")
                .expect("registered before start");
            gm.register_team(Box::new(StandStillAgent), "patient")
                .expect("registered before start");
            gm.play().await?;
            let positions: Vec<_> = (0..gm.universe().bot_count())
                .map(|b| gm.universe().bot(b).position)
                .collect();
            Ok::<_, mazeclash_env::MatchError>(positions)
        };

        match (
            fallback_match(self.seed, true).await,
            fallback_match(self.seed, false).await,
        ) {
            (Ok(with_noise), Ok(without_noise)) => {
                checks.expect(
                    with_noise == without_noise,
                    "fallback stream independent of the noise stream",
                );
            }
            _ => checks.fail("fallback match failed".to_string()),
        }

        self.result(ScenarioId::SeedReplay, None, None, checks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mazeclash_core::TurnStatus;
    use mazeclash_env::MatchError;

    fn master(seed: u64, config: MatchConfig) -> GameMaster<GridUniverse, SimContext> {
        let universe = ScenarioRunner::arena();
        let topology = Arc::new(universe.adjacency());
        GameMaster::new(universe, topology, SimContext::shared(seed), config)
    }

    #[tokio::test]
    async fn test_stand_still_draw_scenario() {
        let runner = ScenarioRunner::new(42);

        let result = runner.run(ScenarioId::StandStillDraw).await;

        assert!(result.passed, "{:?}", result.failure_reason);
        assert_eq!(result.rounds_played, Some(30));
    }

    #[tokio::test]
    async fn test_timeout_disqualification_scenario() {
        let runner = ScenarioRunner::new(42);

        let result = runner.run(ScenarioId::TimeoutDisqualification).await;

        assert!(result.passed, "{:?}", result.failure_reason);
    }

    #[tokio::test]
    async fn test_early_disconnect_scenario() {
        let runner = ScenarioRunner::new(42);

        let result = runner.run(ScenarioId::EarlyDisconnect).await;

        assert!(result.passed, "{:?}", result.failure_reason);
    }

    #[tokio::test]
    async fn test_food_rush_scenario() {
        let runner = ScenarioRunner::new(42);

        let result = runner.run(ScenarioId::FoodRush).await;

        assert!(result.passed, "{:?}", result.failure_reason);
    }

    #[tokio::test]
    async fn test_fallback_storm_scenario() {
        let runner = ScenarioRunner::new(42);

        let result = runner.run(ScenarioId::FallbackStorm).await;

        assert!(result.passed, "{:?}", result.failure_reason);
    }

    #[tokio::test]
    async fn test_seed_replay_scenario() {
        let runner = ScenarioRunner::new(42);

        let result = runner.run(ScenarioId::SeedReplay).await;

        assert!(result.passed, "{:?}", result.failure_reason);
    }

    #[tokio::test]
    async fn test_scenarios_pass_across_seeds() {
        // Same battery the CI mode runs: every scenario over a seed range
        for seed in 0..4u64 {
            let runner = ScenarioRunner::new(seed).with_game_time(10);
            for scenario in ScenarioId::all() {
                let result = runner.run(scenario).await;
                assert!(
                    result.passed,
                    "{} failed for seed {}: {:?}",
                    scenario.name(),
                    seed,
                    result.failure_reason
                );
            }
        }
    }

    #[tokio::test]
    async fn test_round_index_is_monotonic_and_results_are_absorbing() {
        let game_time = 5;
        let mut gm = master(42, MatchConfig::default().with_game_time(game_time));
        let recorder = MatchRecorder::new();
        let handle = recorder.handle();
        gm.register_viewer(Box::new(recorder));
        gm.register_team(Box::new(StandStillAgent), "blue").unwrap();
        gm.register_team(Box::new(StandStillAgent), "red").unwrap();

        gm.play().await.unwrap();

        let record = handle.record();
        let mut last_round = None;
        let mut final_result = None;
        for frame in &record.frames {
            let state = &frame.game_state;
            assert!(state.round_index >= last_round, "round index went backwards");
            assert!(matches!(state.round_index, Some(r) if r <= game_time));
            last_round = state.round_index;

            // Never both a winner and a draw
            assert!(!(state.team_wins.is_some() && state.game_draw.is_some()));

            match final_result {
                None => {
                    if state.finished {
                        final_result = Some((state.team_wins, state.game_draw));
                    }
                }
                Some(result) => {
                    assert!(state.finished, "finished flag was cleared");
                    assert_eq!(
                        (state.team_wins, state.game_draw),
                        result,
                        "result changed after the match concluded"
                    );
                }
            }
        }
        assert!(final_result.is_some());
    }

    #[tokio::test]
    async fn test_advance_turn_reports_round_boundaries() {
        let mut gm = master(42, MatchConfig::default().with_game_time(3));
        gm.register_team(Box::new(StandStillAgent), "blue").unwrap();
        gm.register_team(Box::new(StandStillAgent), "red").unwrap();
        gm.start().await.unwrap();

        // Four bots: three mid-round steps, then the round boundary
        for _ in 0..3 {
            assert_eq!(gm.advance_turn().await.unwrap(), TurnStatus::Advanced);
        }
        assert_eq!(gm.advance_turn().await.unwrap(), TurnStatus::RoundComplete);
        assert_eq!(gm.game_state().round_index, Some(0));
    }

    #[tokio::test]
    async fn test_disqualification_overrides_the_score_rule() {
        // Scores are level when the fifth timeout lands; the score rule
        // would call this a draw, disqualification must not.
        let mut gm = master(42, MatchConfig::default().with_game_time(50));
        gm.register_team(Box::new(StandStillAgent), "blue").unwrap();
        gm.register_team(Box::new(StallingAgent), "sleepy").unwrap();

        gm.play().await.unwrap();

        let state = gm.game_state();
        assert_eq!(gm.universe().team(0).score, gm.universe().team(1).score);
        assert_eq!(state.team_wins, Some(0));
        assert_eq!(state.game_draw, None);
        assert_eq!(state.timeout_teams[1], 5);
    }

    #[tokio::test]
    async fn test_score_decides_when_the_round_limit_is_reached() {
        use Direction::East as E;

        // Bot 0 eats the pellet at (10,1) on round 8, then stands still;
        // one pellet per zone remains, so the match runs to the limit.
        let mut gm = master(42, MatchConfig::default().with_game_time(12));
        let raid = vec![E, E, E, E, E, E, E, E, E];
        gm.register_team(Box::new(ScriptedAgent::new().with_script(0, raid)), "blue")
            .unwrap();
        gm.register_team(Box::new(StandStillAgent), "red").unwrap();

        gm.play().await.unwrap();

        let state = gm.game_state();
        assert_eq!(state.round_index, Some(12));
        assert_eq!(gm.universe().team(0).score, 1);
        assert_eq!(gm.universe().team(1).score, 0);
        assert_eq!(state.team_wins, Some(0));
        assert_eq!(state.game_draw, None);
    }

    #[tokio::test]
    async fn test_start_with_missing_agent_is_a_config_error() {
        let mut gm = master(42, MatchConfig::default());
        gm.register_team(Box::new(StandStillAgent), "blue").unwrap();

        match gm.start().await {
            Err(MatchError::Config(_)) => {}
            other => panic!("expected ConfigError, got {:?}", other),
        }
    }
}
