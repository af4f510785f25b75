//! Pass outcome counters.
//!
//! The orchestrator records every finished pass and every alert it raises.
//! [`Metrics::flush`] emits the totals as one `tracing::info!` event.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use crate::action::Action;

/// Global counters for this process.
pub static METRICS: Metrics = Metrics::new();

/// How a pass ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassOutcome {
    Committed,
    Failed,
}

/// Point-in-time copy of the counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct PassCounts {
    pub builds_committed: u64,
    pub builds_failed: u64,
    pub predictions_committed: u64,
    pub predictions_failed: u64,
    pub alerts_raised: u64,
}

pub struct Metrics {
    // Indexed by [build, prediction][committed, failed].
    passes: [[AtomicU64; 2]; 2],
    alerts_raised: AtomicU64,
}

impl Metrics {
    pub const fn new() -> Self {
        Self {
            passes: [
                [AtomicU64::new(0), AtomicU64::new(0)],
                [AtomicU64::new(0), AtomicU64::new(0)],
            ],
            alerts_raised: AtomicU64::new(0),
        }
    }

    /// Count a finished pass. Non-pipeline actions are ignored.
    pub fn record_pass(&self, action: Action, outcome: PassOutcome) {
        let kind = match action {
            Action::BuildPlan => 0,
            Action::UpdatePrediction => 1,
            _ => return,
        };
        let slot = match outcome {
            PassOutcome::Committed => 0,
            PassOutcome::Failed => 1,
        };
        self.passes[kind][slot].fetch_add(1, Ordering::Relaxed);
        tracing::trace!(action = %action, outcome = ?outcome, "pass counted");
    }

    pub fn record_alert(&self) {
        self.alerts_raised.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> PassCounts {
        let load = |counter: &AtomicU64| counter.load(Ordering::Relaxed);
        PassCounts {
            builds_committed: load(&self.passes[0][0]),
            builds_failed: load(&self.passes[0][1]),
            predictions_committed: load(&self.passes[1][0]),
            predictions_failed: load(&self.passes[1][1]),
            alerts_raised: load(&self.alerts_raised),
        }
    }

    /// Emit all current counter values as a single `info!` event.
    pub fn flush(&self) {
        let counts = self.snapshot();
        tracing::info!(
            metric = "flush",
            builds_committed = counts.builds_committed,
            builds_failed = counts.builds_failed,
            predictions_committed = counts.predictions_committed,
            predictions_failed = counts.predictions_failed,
            alerts_raised = counts.alerts_raised,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passes_are_counted_by_kind_and_outcome() {
        let metrics = Metrics::new();
        metrics.record_pass(Action::BuildPlan, PassOutcome::Committed);
        metrics.record_pass(Action::BuildPlan, PassOutcome::Committed);
        metrics.record_pass(Action::UpdatePrediction, PassOutcome::Failed);
        metrics.record_alert();

        assert_eq!(
            metrics.snapshot(),
            PassCounts {
                builds_committed: 2,
                builds_failed: 0,
                predictions_committed: 0,
                predictions_failed: 1,
                alerts_raised: 1,
            }
        );
    }

    #[test]
    fn non_pipeline_actions_are_ignored() {
        let metrics = Metrics::new();
        metrics.record_pass(Action::Connect, PassOutcome::Failed);
        metrics.record_pass(Action::Nothing, PassOutcome::Committed);
        assert_eq!(metrics.snapshot(), PassCounts::default());
    }
}
