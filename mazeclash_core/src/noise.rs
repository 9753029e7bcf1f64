//! Fog-of-war: graph-distance based perturbation of opponent positions.

use mazeclash_env::{MazeTopology, NoiseParameters, UniverseSnapshot};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::sync::Arc;

/// Makes distant opponents' reported positions noisy.
///
/// For each opponent of the mover's team, the engine computes the
/// shortest-path length from the mover's position through the maze graph.
/// An opponent with no path, or further away than `sight_distance`, has its
/// reported position replaced by a uniform draw from the cells within
/// `noise_radius` of its true position and is marked `noisy`; everyone else
/// is reported exactly and unmarked.
///
/// The engine only ever touches the mover's private snapshot copy; the
/// authoritative universe is never involved. Apart from its own seeded RNG
/// stream the computation is stateless, so every turn is perturbed
/// independently.
pub struct NoiseEngine {
    /// Graph queries, supplied by the maze collaborator
    topology: Arc<dyn MazeTopology>,

    /// Immutable per-match tuning
    params: NoiseParameters,

    /// Private stream, independent of the fallback-move stream
    rng: ChaCha8Rng,
}

impl NoiseEngine {
    /// Creates a noise engine with its own seeded stream.
    pub fn new(topology: Arc<dyn MazeTopology>, params: NoiseParameters, seed: u64) -> Self {
        Self {
            topology,
            params,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Returns the fog-of-war parameters in effect.
    pub fn params(&self) -> NoiseParameters {
        self.params
    }

    /// Perturbs the opponents of the mover's team inside `snapshot`.
    pub fn obscure(&mut self, snapshot: &mut UniverseSnapshot, mover_index: usize) {
        let mover = match snapshot.bots.get(mover_index) {
            Some(bot) => *bot,
            None => return,
        };

        for bot in snapshot
            .bots
            .iter_mut()
            .filter(|b| b.team_index != mover.team_index)
        {
            let distance = self.topology.graph_distance(mover.position, bot.position);
            if matches!(distance, Some(d) if d <= self.params.sight_distance) {
                continue;
            }

            let candidates = self
                .topology
                .cells_within(bot.position, self.params.noise_radius);
            if let Some(position) = candidates.choose(&mut self.rng) {
                bot.position = *position;
                bot.noisy = true;
            }
        }
    }
}
