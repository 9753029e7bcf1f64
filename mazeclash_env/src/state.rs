//! The authoritative per-match bookkeeping record.

use crate::types::{BotDestroyed, BotMoved, FoodEaten, MoveDiff};
use serde::{Deserialize, Serialize};

/// Match-scoped state owned by the scheduler.
///
/// The serialized field names are the canonical schema that downstream
/// consumers (dump files, remote monitors) parse; renaming a field here is
/// a wire-format break.
///
/// The event lists hold only the current turn's effects and are cleared by
/// [`GameState::begin_turn`]. Everything else accumulates for the whole
/// match. Once `finished` is true the record is never mutated again.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    /// Index of the current round; None before the first round starts
    pub round_index: Option<u32>,

    /// Index of the bot currently (or just) moving; None between rounds
    pub bot_id: Option<usize>,

    /// Movement events of the current turn
    pub bot_moved: Vec<BotMoved>,

    /// Food eaten during the current turn
    pub food_eaten: Vec<FoodEaten>,

    /// Bots destroyed during the current turn
    pub bot_destroyed: Vec<BotDestroyed>,

    /// Recovered failures (timeouts, rejected moves) per team
    pub timeout_teams: [u32; 2],

    /// Cumulative seconds each team's agent spent deciding
    pub team_time: [f64; 2],

    /// Cumulative seconds spent on turns, including bookkeeping
    pub running_time: f64,

    /// True once the match has concluded; absorbing
    pub finished: bool,

    /// Winning team index, if any
    pub team_wins: Option<usize>,

    /// Some(true) when the match ended in a draw
    pub game_draw: Option<bool>,
}

impl GameState {
    /// Starts bookkeeping for a single bot-turn: records the mover and
    /// clears the per-turn event lists.
    pub fn begin_turn(&mut self, bot_index: usize) {
        self.bot_id = Some(bot_index);
        self.bot_moved.clear();
        self.food_eaten.clear();
        self.bot_destroyed.clear();
    }

    /// Merges a universe event diff into the current turn's lists.
    pub fn merge_diff(&mut self, diff: MoveDiff) {
        self.bot_moved.extend(diff.bot_moved);
        self.food_eaten.extend(diff.food_eaten);
        self.bot_destroyed.extend(diff.bot_destroyed);
    }
}
