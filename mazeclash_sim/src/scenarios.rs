//! Failure-mode scenarios for the match scheduler.

/// Scenario identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioId {
    /// Two stand-still teams run the full round limit into a draw
    StandStillDraw,

    /// One team never answers and is disqualified after five timeouts
    TimeoutDisqualification,

    /// One team disconnects on its first move and loses instantly
    EarlyDisconnect,

    /// A scripted raid empties a homezone and ends the match early
    FoodRush,

    /// A team that rejects every call is carried by fallback moves
    FallbackStorm,

    /// The same seed replays to an identical recording, and the noise
    /// stream never leaks into fallback decisions
    SeedReplay,
}

impl ScenarioId {
    /// Returns a list of all scenarios.
    pub fn all() -> Vec<ScenarioId> {
        vec![
            ScenarioId::StandStillDraw,
            ScenarioId::TimeoutDisqualification,
            ScenarioId::EarlyDisconnect,
            ScenarioId::FoodRush,
            ScenarioId::FallbackStorm,
            ScenarioId::SeedReplay,
        ]
    }

    /// Returns the scenario name.
    pub fn name(&self) -> &'static str {
        match self {
            ScenarioId::StandStillDraw => "stand_still_draw",
            ScenarioId::TimeoutDisqualification => "timeout_disqualification",
            ScenarioId::EarlyDisconnect => "early_disconnect",
            ScenarioId::FoodRush => "food_rush",
            ScenarioId::FallbackStorm => "fallback_storm",
            ScenarioId::SeedReplay => "seed_replay",
        }
    }

    /// Returns a description of the scenario.
    pub fn description(&self) -> &'static str {
        match self {
            ScenarioId::StandStillDraw => "both teams stand still for the whole match, draw at the round limit",
            ScenarioId::TimeoutDisqualification => "team 0 stalls every call, loses after the fifth timeout",
            ScenarioId::EarlyDisconnect => "team 0 disconnects on its first move, instant loss without fallback",
            ScenarioId::FoodRush => "a scripted bot eats all opposing food, match ends before the round limit",
            ScenarioId::FallbackStorm => "team 0 rejects every call below the disqualification bound, fallback moves keep the match progressing",
            ScenarioId::SeedReplay => "fixed-seed reproducibility and noise/fallback stream independence",
        }
    }
}

impl std::fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for ScenarioId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "stand_still_draw" | "draw" => Ok(ScenarioId::StandStillDraw),
            "timeout_disqualification" | "timeout" => Ok(ScenarioId::TimeoutDisqualification),
            "early_disconnect" | "disconnect" => Ok(ScenarioId::EarlyDisconnect),
            "food_rush" | "food" => Ok(ScenarioId::FoodRush),
            "fallback_storm" | "fallback" => Ok(ScenarioId::FallbackStorm),
            "seed_replay" | "replay" => Ok(ScenarioId::SeedReplay),
            _ => Err(format!("Unknown scenario: {}", s)),
        }
    }
}
