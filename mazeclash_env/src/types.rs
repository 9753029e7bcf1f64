//! Shared vocabulary types for the mazeclash match core.

use serde::{Deserialize, Serialize};

/// A cell coordinate on the maze grid.
///
/// The origin is the top-left corner; `y` grows downwards, matching the
/// row/column order of the layout text format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellPos {
    pub x: i32,
    pub y: i32,
}

impl CellPos {
    /// Creates a new cell position.
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Returns the cell reached by taking `direction` from here.
    pub fn step(&self, direction: Direction) -> CellPos {
        let (dx, dy) = direction.offset();
        CellPos::new(self.x + dx, self.y + dy)
    }
}

impl std::fmt::Display for CellPos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// One of the four maze moves, or standing still.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    South,
    East,
    West,
    Stop,
}

impl Direction {
    /// All five moves, `Stop` last.
    pub const ALL: [Direction; 5] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
        Direction::Stop,
    ];

    /// Returns the (dx, dy) grid offset of this move.
    pub fn offset(&self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::South => (0, 1),
            Direction::East => (1, 0),
            Direction::West => (-1, 0),
            Direction::Stop => (0, 0),
        }
    }
}

/// A bot as reported in a snapshot.
///
/// `noisy` is a transient per-snapshot annotation set by the fog-of-war
/// engine; it never feeds back into authoritative logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotView {
    /// Universe-wide bot index
    pub index: usize,

    /// Owning team index
    pub team_index: usize,

    /// Reported position (possibly perturbed in an agent's snapshot)
    pub position: CellPos,

    /// True if the reported position was perturbed
    pub noisy: bool,
}

/// A team as reported in a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamView {
    /// Team index (0 or 1)
    pub index: usize,

    /// Display name, settable at registration
    pub name: String,

    /// Current score
    pub score: i32,
}

/// A deep, self-contained copy of the authoritative universe.
///
/// This is the only shape in which agents and observers ever see the game:
/// a serializable record with no references back into authoritative state.
/// Collections are kept in a stable order so that two snapshots of the same
/// universe state are byte-identical when serialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UniverseSnapshot {
    /// Maze width in cells
    pub width: i32,

    /// Maze height in cells
    pub height: i32,

    /// Wall cells, sorted
    pub walls: Vec<CellPos>,

    /// Remaining food per defending team, sorted; `food[i]` lies in team
    /// i's homezone and is eaten by the opposing team
    pub food: Vec<Vec<CellPos>>,

    /// All bots, ordered by index
    pub bots: Vec<BotView>,

    /// Both teams, ordered by index
    pub teams: Vec<TeamView>,
}

impl UniverseSnapshot {
    /// Returns true if `pos` is outside the maze or a wall cell.
    pub fn is_blocked(&self, pos: CellPos) -> bool {
        pos.x < 0
            || pos.y < 0
            || pos.x >= self.width
            || pos.y >= self.height
            || self.walls.binary_search(&pos).is_ok()
    }

    /// Returns the moves legal from `pos`. `Stop` is always legal.
    pub fn legal_moves(&self, pos: CellPos) -> Vec<Direction> {
        Direction::ALL
            .into_iter()
            .filter(|d| !self.is_blocked(pos.step(*d)))
            .collect()
    }
}

/// A bot changed position (possibly to the same cell, for `Stop`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotMoved {
    pub bot_index: usize,
    pub old_pos: CellPos,
    pub new_pos: CellPos,
}

/// A bot ate one piece of opposing food.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoodEaten {
    pub bot_index: usize,
    pub position: CellPos,
}

/// A bot was destroyed and reset to its initial position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotDestroyed {
    pub bot_index: usize,
    pub destroyed_by: usize,
}

/// Event diff produced by applying one move to the universe.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MoveDiff {
    pub bot_moved: Vec<BotMoved>,
    pub food_eaten: Vec<FoodEaten>,
    pub bot_destroyed: Vec<BotDestroyed>,
}

/// Fog-of-war tuning, immutable per match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoiseParameters {
    /// Maximum graph distance between a perturbed position and the truth
    pub noise_radius: usize,

    /// Graph distance up to which an opponent is reported exactly
    pub sight_distance: usize,
}

impl Default for NoiseParameters {
    fn default() -> Self {
        Self {
            noise_radius: 5,
            sight_distance: 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_offsets() {
        let pos = CellPos::new(3, 3);
        assert_eq!(pos.step(Direction::North), CellPos::new(3, 2));
        assert_eq!(pos.step(Direction::South), CellPos::new(3, 4));
        assert_eq!(pos.step(Direction::East), CellPos::new(4, 3));
        assert_eq!(pos.step(Direction::West), CellPos::new(2, 3));
        assert_eq!(pos.step(Direction::Stop), pos);
    }

    fn two_by_two_snapshot() -> UniverseSnapshot {
        // 4x3 maze, fully walled border, open 2x1 interior
        let mut walls = Vec::new();
        for x in 0..4 {
            walls.push(CellPos::new(x, 0));
            walls.push(CellPos::new(x, 2));
        }
        walls.push(CellPos::new(0, 1));
        walls.push(CellPos::new(3, 1));
        walls.sort();
        UniverseSnapshot {
            width: 4,
            height: 3,
            walls,
            food: vec![vec![], vec![]],
            bots: vec![],
            teams: vec![],
        }
    }

    #[test]
    fn test_snapshot_legal_moves() {
        let snapshot = two_by_two_snapshot();
        let moves = snapshot.legal_moves(CellPos::new(1, 1));
        assert!(moves.contains(&Direction::East));
        assert!(moves.contains(&Direction::Stop));
        assert!(!moves.contains(&Direction::North));
        assert!(!moves.contains(&Direction::West));
    }

    #[test]
    fn test_snapshot_blocks_out_of_bounds() {
        let snapshot = two_by_two_snapshot();
        assert!(snapshot.is_blocked(CellPos::new(-1, 1)));
        assert!(snapshot.is_blocked(CellPos::new(4, 1)));
        assert!(!snapshot.is_blocked(CellPos::new(2, 1)));
    }
}
