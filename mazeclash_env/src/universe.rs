//! Authoritative-universe and maze-topology collaborator interfaces.

use crate::error::MoveError;
use crate::types::{BotView, CellPos, Direction, MoveDiff, TeamView, UniverseSnapshot};

/// The authoritative game world: maze, bots, teams, food.
///
/// The scheduler owns exactly one value implementing this trait and is the
/// only mutator. Everything handed outwards goes through [`snapshot`],
/// which must be a deep copy with no aliasing back into the universe.
///
/// [`snapshot`]: Universe::snapshot
pub trait Universe: Send {
    /// Returns a deep, serializable copy of the current state.
    fn snapshot(&self) -> UniverseSnapshot;

    /// Applies one bot move and returns the resulting event diff.
    ///
    /// Fails with [`MoveError::Illegal`] if `direction` is not among the
    /// legal moves from the bot's current position; the universe is left
    /// unchanged in that case.
    fn apply_move(&mut self, bot_index: usize, direction: Direction)
        -> Result<MoveDiff, MoveError>;

    /// Returns the moves legal from `position`. `Stop` is always included.
    fn legal_moves(&self, position: CellPos) -> Vec<Direction>;

    /// Returns how much food team `team_index` can still eat, i.e. the food
    /// remaining in the opposing homezone.
    fn enemy_food_count(&self, team_index: usize) -> usize;

    /// Number of bots in the universe.
    fn bot_count(&self) -> usize;

    /// A working view of one authoritative bot.
    fn bot(&self, index: usize) -> BotView;

    /// Number of teams in the universe.
    fn team_count(&self) -> usize;

    /// A working view of one team, including its current score.
    fn team(&self, index: usize) -> TeamView;

    /// Sets a team's display name at registration time.
    fn set_team_name(&mut self, team_index: usize, name: &str);
}

/// Graph queries over the maze, supplied by the maze collaborator.
///
/// Path computation is entirely the implementor's business; the noise
/// engine only consumes distances and balls of cells.
pub trait MazeTopology: Send + Sync {
    /// Shortest-path length in moves between two cells, or None if no path
    /// exists.
    fn graph_distance(&self, from: CellPos, to: CellPos) -> Option<usize>;

    /// All reachable cells within `radius` moves of `origin`, including
    /// `origin` itself, in a stable order.
    fn cells_within(&self, origin: CellPos, radius: usize) -> Vec<CellPos>;
}
