//! Clock and seed environment for a match.

use async_trait::async_trait;
use std::time::Duration;

/// The scheduler's source of time and entropy.
///
/// # Implementations
///
/// - **Production**: [`RealtimeContext`](crate::RealtimeContext) — monotonic
///   clock, `tokio::time::sleep`, seed drawn from OS entropy
/// - **Simulation**: a virtual clock advanced manually, fixed seed
///
/// # Determinism
///
/// The per-call agent timeout is implemented by racing the agent future
/// against [`sleep`], so a simulated context controls timeout behavior the
/// same way it controls measured durations. All randomized scheduler
/// choices derive their streams from [`seed`], making a match exactly
/// reproducible from a fixed seed.
///
/// [`sleep`]: MatchContext::sleep
/// [`seed`]: MatchContext::seed
#[async_trait]
pub trait MatchContext: Send + Sync + 'static {
    /// Current monotonic time since context creation.
    fn now(&self) -> Duration;

    /// Suspends until `duration` has elapsed on this context's clock.
    async fn sleep(&self, duration: Duration);

    /// The master seed every randomized decision derives from.
    fn seed(&self) -> u64;
}
