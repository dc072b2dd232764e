//! Structured observability hooks for pipeline runs.
//!
//! This module provides:
//! - A run-scoped tracing span via `run_span`
//! - Emission functions for run and stage lifecycle events
//!
//! Events are emitted at `info!` level, failures at `error!`.

use tracing::{error, info};

/// Span tagged with the run_id and issue number.
///
/// Attach it to the run future with `tracing::Instrument` so every event the
/// stages emit carries both fields.
pub fn run_span(run_id: &str, issue: u64) -> tracing::Span {
    tracing::info_span!("issueflow.run", run_id = %run_id, issue = issue)
}

/// Emit event: run started.
pub fn emit_run_started(run_id: &str, issue: u64) {
    info!(event = "run.started", run_id = %run_id, issue = issue);
}

/// Emit event: the orchestrator moved into a stage.
pub fn emit_stage_entered(run_id: &str, stage: &str) {
    info!(event = "stage.entered", run_id = %run_id, stage = %stage);
}

/// Emit event: a stage produced its artifact.
pub fn emit_stage_completed(run_id: &str, stage: &str, duration_ms: u64) {
    info!(
        event = "stage.completed",
        run_id = %run_id,
        stage = %stage,
        duration_ms = duration_ms,
    );
}

/// Emit event: the fallback generator serves this task.
pub fn emit_fallback_selected(issue: u64, reason: &str) {
    info!(event = "generation.fallback", issue = issue, reason = %reason);
}

/// Emit event: run reached `Done`.
pub fn emit_run_finished(run_id: &str, duration_ms: u64, files: usize, submitted: bool) {
    info!(
        event = "run.finished",
        run_id = %run_id,
        duration_ms = duration_ms,
        files = files,
        submitted = submitted,
    );
}

/// Emit event: run reached `Failed`.
pub fn emit_run_failed(run_id: &str, stage: &str, error: &dyn std::fmt::Display) {
    error!(event = "run.failed", run_id = %run_id, stage = %stage, error = %error);
}
