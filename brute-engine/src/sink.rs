//! Result sink interface
//!
//! A passive consumer of attack progress. Methods may be invoked from the
//! aggregation task at any time while an attack runs, so implementations must
//! be thread-safe. The sink imposes no back-pressure on the orchestrator.

use crate::error::AttackError;
use crate::stats::AttackStats;
use crate::types::AttemptOutcome;

/// Observer for attack results and lifecycle notifications.
///
/// Every attack eventually delivers exactly one terminal notification:
/// `on_complete`, `on_cancelled`, or `on_error`.
pub trait ResultSink: Send + Sync {
    /// One candidate reached a terminal outcome.
    fn on_result(&self, _outcome: &AttemptOutcome) {}

    /// Counters changed; called after each recorded outcome.
    fn on_stats_changed(&self, _stats: &AttackStats) {}

    /// The full candidate range was processed.
    fn on_complete(&self) {}

    /// The attack was stopped before completion. No further `on_result`
    /// calls follow.
    fn on_cancelled(&self) {}

    /// The attack failed to start or aborted mid-run.
    fn on_error(&self, _error: &AttackError) {}
}

/// Sink that ignores every notification.
pub struct NoopSink;

impl ResultSink for NoopSink {}
