//! Analysis stage: work item in, task description out.

use std::sync::Arc;

use tracing::{info, instrument};

use crate::collaborators::{IssueTracker, Label};
use crate::domain::{RepoRef, TaskDescription};
use crate::error::Result;

/// Priority used when no label mentions "priority".
pub const DEFAULT_PRIORITY: &str = "P2-Medium";

/// Fetches a work item and normalizes it into a [`TaskDescription`].
pub struct AnalysisStage {
    tracker: Arc<dyn IssueTracker>,
    repo: RepoRef,
}

impl AnalysisStage {
    pub fn new(tracker: Arc<dyn IssueTracker>, repo: RepoRef) -> Self {
        Self { tracker, repo }
    }

    /// Fails with `NotFound` for unknown issues and `Transport` for tracker
    /// communication failures.
    #[instrument(skip(self), fields(repo = %self.repo))]
    pub async fn analyze(&self, identifier: u64) -> Result<TaskDescription> {
        info!("Analyzing issue #{}", identifier);

        let item = self.tracker.get_issue(&self.repo, identifier).await?;
        let body = item.body.unwrap_or_default();

        Ok(TaskDescription {
            identifier,
            title: item.title,
            requirements: extract_requirements(&body),
            priority: extract_priority(&item.labels),
            body,
        })
    }
}

/// Every non-blank line, verbatim, in order.
pub fn extract_requirements(body: &str) -> Vec<String> {
    body.split('\n')
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect()
}

/// Name of the first label containing "priority", or [`DEFAULT_PRIORITY`].
pub fn extract_priority(labels: &[Label]) -> String {
    labels
        .iter()
        .map(Label::name)
        .find(|name| name.contains("priority"))
        .unwrap_or(DEFAULT_PRIORITY)
        .to_string()
}
