//! Match configuration.

use mazeclash_env::NoiseParameters;
use std::time::Duration;

/// Configuration for a single match, fixed at scheduler construction.
#[derive(Debug, Clone)]
pub struct MatchConfig {
    /// Total permitted number of rounds
    pub game_time: u32,

    /// Enforced wait per agent call
    pub timeout_length: Duration,

    /// Recovered failures after which a team is disqualified
    pub max_timeouts: u32,

    /// Whether opponent positions are noised per mover
    pub noise: bool,

    /// Fog-of-war tuning
    pub noise_params: NoiseParameters,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            game_time: 300,
            timeout_length: Duration::from_secs(3),
            max_timeouts: 5,
            noise: true,
            noise_params: NoiseParameters::default(),
        }
    }
}

impl MatchConfig {
    /// Sets the round limit.
    pub fn with_game_time(mut self, game_time: u32) -> Self {
        self.game_time = game_time;
        self
    }

    /// Sets the per-call agent timeout.
    pub fn with_timeout_length(mut self, timeout_length: Duration) -> Self {
        self.timeout_length = timeout_length;
        self
    }

    /// Enables or disables the fog-of-war engine.
    pub fn with_noise(mut self, noise: bool) -> Self {
        self.noise = noise;
        self
    }

    /// Sets the fog-of-war parameters.
    pub fn with_noise_params(mut self, noise_params: NoiseParameters) -> Self {
        self.noise_params = noise_params;
        self
    }
}
