//! Structured observability hooks for planning passes.
//!
//! This module provides:
//! - A pass-scoped tracing span via [`pass_span`]
//! - Emission functions for key lifecycle events: dispatch, pass start,
//!   commit, failure and metadata loading
//!
//! Events are emitted at `info!` level, failures at `warn!`.

use tracing::{info, warn};

use crate::action::Action;

/// Span grouping everything a single pass logs.
///
/// Attach it to the pass future with `tracing::Instrument`:
///
/// ```ignore
/// run_pass(inputs).instrument(pass_span(&pass_id, Action::BuildPlan)).await;
/// ```
pub fn pass_span(pass_id: &str, action: Action) -> tracing::Span {
    tracing::info_span!("trackplan.pass", pass_id = %pass_id, action = %action)
}

/// Emit event: an action was dispatched.
pub fn emit_action_dispatched(action: Action) {
    info!(event = "action.dispatched", action = %action);
}

/// Emit event: a pipeline pass started.
pub fn emit_pass_started(pass_id: &str, action: Action, contributors: usize) {
    info!(
        event = "pass.started",
        pass_id = %pass_id,
        action = %action,
        contributors = contributors,
    );
}

/// Emit event: a pass produced a new committed result.
pub fn emit_pass_committed(pass_id: &str, issues: usize, duration_ms: u64) {
    info!(
        event = "pass.committed",
        pass_id = %pass_id,
        issues = issues,
        duration_ms = duration_ms,
    );
}

/// Emit event: a pass failed (warning level).
pub fn emit_pass_failed(pass_id: &str, title: &str, error: &dyn std::fmt::Display) {
    warn!(event = "pass.failed", pass_id = %pass_id, title = %title, error = %error);
}

/// Emit event: tracker metadata was loaded.
pub fn emit_metadata_loaded(base_url: &str, minutes_per_work_week: u32, users: usize) {
    info!(
        event = "metadata.loaded",
        base_url = %base_url,
        minutes_per_work_week = minutes_per_work_week,
        users = users,
    );
}
