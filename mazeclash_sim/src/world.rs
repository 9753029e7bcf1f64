//! GridUniverse - concrete maze universe for simulation and testing.
//!
//! The maze is parsed from the plain-text layout format: `#` wall, `.`
//! food, space free, digits bot starting positions. The left half of the
//! maze is team 0's homezone, the right half team 1's; bots belong to
//! team `index % 2`. Food lies in the defending team's homezone and is
//! eaten by the opposing team.

use mazeclash_env::{
    BotDestroyed, BotMoved, BotView, CellPos, Direction, FoodEaten, MazeTopology, MoveDiff,
    MoveError, TeamView, Universe, UniverseSnapshot,
};
use std::collections::{HashMap, HashSet, VecDeque};
use thiserror::Error;

/// Points for eating one piece of opposing food.
const FOOD_POINTS: i32 = 1;

/// Points for destroying an intruder in one's homezone.
const KILL_POINTS: i32 = 5;

/// Default 16x7 arena: two bots per team, two food pellets per homezone.
pub const DEFAULT_LAYOUT: &str = "\
################
#0 .      . # 1#
#  #   ##   #  #
#    #    #    #
#  #   ##   #  #
#2 .      . # 3#
################";

/// Problems with a layout string.
#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("layout is empty")]
    Empty,

    #[error("layout rows have differing lengths")]
    Ragged,

    #[error("unexpected character {0:?} in layout")]
    UnknownChar(char),

    #[error("bot indices must be consecutive from 0, found {found} bots, highest index {highest}")]
    BadBotIndices { found: usize, highest: usize },
}

#[derive(Debug, Clone)]
struct GridBot {
    team_index: usize,
    position: CellPos,
    initial_position: CellPos,
}

/// Authoritative maze universe backing simulated matches.
pub struct GridUniverse {
    width: i32,
    height: i32,
    walls: HashSet<CellPos>,
    /// `food[i]` lies in team i's homezone and is eaten by team 1-i
    food: [HashSet<CellPos>; 2],
    bots: Vec<GridBot>,
    names: [String; 2],
    scores: [i32; 2],
}

impl GridUniverse {
    /// Parses a layout string. Rows are trimmed, blank rows skipped.
    pub fn from_layout(layout: &str) -> Result<Self, LayoutError> {
        let rows: Vec<&str> = layout
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        if rows.is_empty() {
            return Err(LayoutError::Empty);
        }
        let width = rows[0].chars().count();
        if rows.iter().any(|row| row.chars().count() != width) {
            return Err(LayoutError::Ragged);
        }

        let mut walls = HashSet::new();
        let mut food = [HashSet::new(), HashSet::new()];
        let mut bot_starts: HashMap<usize, CellPos> = HashMap::new();

        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                let pos = CellPos::new(x as i32, y as i32);
                match ch {
                    '#' => {
                        walls.insert(pos);
                    }
                    ' ' => {}
                    '.' => {
                        let zone = usize::from(pos.x >= width as i32 / 2);
                        food[zone].insert(pos);
                    }
                    digit @ '0'..='9' => {
                        let index = digit as usize - '0' as usize;
                        bot_starts.insert(index, pos);
                    }
                    other => return Err(LayoutError::UnknownChar(other)),
                }
            }
        }

        let found = bot_starts.len();
        let highest = bot_starts.keys().copied().max().unwrap_or(0);
        if found == 0 || highest != found - 1 {
            return Err(LayoutError::BadBotIndices { found, highest });
        }
        let bots = (0..found)
            .map(|index| {
                let position = bot_starts[&index];
                GridBot {
                    team_index: index % 2,
                    position,
                    initial_position: position,
                }
            })
            .collect();

        Ok(Self {
            width: width as i32,
            height: rows.len() as i32,
            walls,
            food,
            bots,
            names: [String::new(), String::new()],
            scores: [0, 0],
        })
    }

    /// Builds the BFS adjacency for this maze.
    pub fn adjacency(&self) -> MazeAdjacency {
        MazeAdjacency::new(self)
    }

    /// Maze width in cells.
    pub fn width(&self) -> i32 {
        self.width
    }

    /// Maze height in cells.
    pub fn height(&self) -> i32 {
        self.height
    }

    /// True when `pos` is inside the maze and not a wall.
    pub fn is_free(&self, pos: CellPos) -> bool {
        pos.x >= 0
            && pos.y >= 0
            && pos.x < self.width
            && pos.y < self.height
            && !self.walls.contains(&pos)
    }

    /// Homezone owner of a cell: team 0 on the left half, 1 on the right.
    pub fn zone_of(&self, pos: CellPos) -> usize {
        usize::from(pos.x >= self.width / 2)
    }

    fn destroy(&mut self, victim: usize, destroyer: usize, diff: &mut MoveDiff) {
        self.bots[victim].position = self.bots[victim].initial_position;
        let destroyer_team = self.bots[destroyer].team_index;
        self.scores[destroyer_team] += KILL_POINTS;
        diff.bot_destroyed.push(BotDestroyed {
            bot_index: victim,
            destroyed_by: destroyer,
        });
    }

    fn sorted(set: &HashSet<CellPos>) -> Vec<CellPos> {
        let mut cells: Vec<CellPos> = set.iter().copied().collect();
        cells.sort();
        cells
    }
}

impl Universe for GridUniverse {
    fn snapshot(&self) -> UniverseSnapshot {
        UniverseSnapshot {
            width: self.width,
            height: self.height,
            walls: Self::sorted(&self.walls),
            food: self.food.iter().map(Self::sorted).collect(),
            bots: (0..self.bots.len()).map(|index| self.bot(index)).collect(),
            teams: (0..2).map(|index| self.team(index)).collect(),
        }
    }

    fn apply_move(
        &mut self,
        bot_index: usize,
        direction: Direction,
    ) -> Result<MoveDiff, MoveError> {
        if bot_index >= self.bots.len() {
            return Err(MoveError::Illegal { bot_index });
        }
        let old_pos = self.bots[bot_index].position;
        if !self.legal_moves(old_pos).contains(&direction) {
            return Err(MoveError::Illegal { bot_index });
        }
        let new_pos = old_pos.step(direction);
        self.bots[bot_index].position = new_pos;
        let team = self.bots[bot_index].team_index;

        let mut diff = MoveDiff {
            bot_moved: vec![BotMoved {
                bot_index,
                old_pos,
                new_pos,
            }],
            ..MoveDiff::default()
        };

        // Food only ever lies in its defender's homezone, so removing from
        // the opposing set is the whole eating rule.
        if self.food[1 - team].remove(&new_pos) {
            self.scores[team] += FOOD_POINTS;
            diff.food_eaten.push(FoodEaten {
                bot_index,
                position: new_pos,
            });
        }

        let colliders: Vec<usize> = self
            .bots
            .iter()
            .enumerate()
            .filter(|(i, b)| *i != bot_index && b.team_index != team && b.position == new_pos)
            .map(|(i, _)| i)
            .collect();
        for other in colliders {
            if self.zone_of(new_pos) == team {
                // The mover defends its homezone: the intruder dies
                self.destroy(other, bot_index, &mut diff);
            } else {
                // The mover walked onto a defender
                self.destroy(bot_index, other, &mut diff);
                break;
            }
        }
        Ok(diff)
    }

    fn legal_moves(&self, position: CellPos) -> Vec<Direction> {
        Direction::ALL
            .into_iter()
            .filter(|d| self.is_free(position.step(*d)))
            .collect()
    }

    fn enemy_food_count(&self, team_index: usize) -> usize {
        self.food[1 - team_index].len()
    }

    fn bot_count(&self) -> usize {
        self.bots.len()
    }

    fn bot(&self, index: usize) -> BotView {
        let bot = &self.bots[index];
        BotView {
            index,
            team_index: bot.team_index,
            position: bot.position,
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

/// BFS adjacency over the open cells of a [`GridUniverse`].
///
/// Results come back in a stable (sorted) order so that seeded random
/// draws over them are reproducible.
pub struct MazeAdjacency {
    neighbors: HashMap<CellPos, Vec<CellPos>>,
}

impl MazeAdjacency {
    /// Precomputes the neighbor lists of every open cell.
    pub fn new(universe: &GridUniverse) -> Self {
        let mut neighbors = HashMap::new();
        for y in 0..universe.height() {
            for x in 0..universe.width() {
                let pos = CellPos::new(x, y);
                if !universe.is_free(pos) {
                    continue;
                }
                let mut adjacent: Vec<CellPos> = Direction::ALL
                    .into_iter()
                    .filter(|d| *d != Direction::Stop)
                    .map(|d| pos.step(d))
                    .filter(|next| universe.is_free(*next))
                    .collect();
                adjacent.sort();
                neighbors.insert(pos, adjacent);
            }
        }
        Self { neighbors }
    }

    fn bfs_distances(&self, from: CellPos, limit: Option<usize>) -> HashMap<CellPos, usize> {
        let mut distances = HashMap::new();
        if !self.neighbors.contains_key(&from) {
            return distances;
        }
        distances.insert(from, 0);
        let mut queue = VecDeque::from([from]);
        while let Some(pos) = queue.pop_front() {
            let next_distance = distances[&pos] + 1;
            if matches!(limit, Some(limit) if next_distance > limit) {
                continue;
            }
            for neighbor in self.neighbors.get(&pos).into_iter().flatten() {
                if !distances.contains_key(neighbor) {
                    distances.insert(*neighbor, next_distance);
                    queue.push_back(*neighbor);
                }
            }
        }
        distances
    }
}

impl MazeTopology for MazeAdjacency {
    fn graph_distance(&self, from: CellPos, to: CellPos) -> Option<usize> {
        self.bfs_distances(from, None).get(&to).copied()
    }

    fn cells_within(&self, origin: CellPos, radius: usize) -> Vec<CellPos> {
        let mut cells: Vec<CellPos> = self
            .bfs_distances(origin, Some(radius))
            .into_keys()
            .collect();
        cells.sort();
        cells
    }
}
