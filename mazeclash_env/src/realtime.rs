//! Production implementation of MatchContext using Tokio.

use crate::context::MatchContext;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Production context backed by the system clock.
///
/// Time comes from a monotonic [`Instant`]; the seed is drawn once from OS
/// entropy at construction (or pinned with [`with_seed`] to replay a
/// production match).
///
/// [`with_seed`]: RealtimeContext::with_seed
pub struct RealtimeContext {
    /// Start time for monotonic duration calculations
    start: Instant,

    /// Master seed, fixed at construction
    seed: u64,
}

impl RealtimeContext {
    /// Creates a context with a random seed.
    pub fn new() -> Self {
        Self::with_seed(rand::random())
    }

    /// Creates a context with a fixed seed.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            start: Instant::now(),
            seed,
        }
    }

    /// Creates an Arc-wrapped context for sharing.
    pub fn shared(seed: u64) -> Arc<Self> {
        Arc::new(Self::with_seed(seed))
    }
}

impl Default for RealtimeContext {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MatchContext for RealtimeContext {
    fn now(&self) -> Duration {
        self.start.elapsed()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }

    fn seed(&self) -> u64 {
        self.seed
    }
}
