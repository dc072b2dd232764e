//! Issue reads.

use async_trait::async_trait;
use issueflow_core::{IssueTracker, PipelineError, RepoRef, Result, WorkItem};
use tracing::debug;

use crate::client::GithubClient;

pub(crate) fn issue_path(repo: &RepoRef, number: u64) -> String {
    format!("repos/{}/{}/issues/{}", repo.owner, repo.name, number)
}

#[async_trait]
impl IssueTracker for GithubClient {
    async fn get_issue(&self, repo: &RepoRef, number: u64) -> Result<WorkItem> {
        match self.get_json::<WorkItem>(&issue_path(repo, number)).await {
            Ok(item) => {
                debug!(repo = %repo, issue = number, labels = item.labels.len(), "fetched issue");
                Ok(item)
            }
            Err(err) if err.is_status(404) => Err(PipelineError::NotFound { identifier: number }),
            Err(err) => Err(err.into()),
        }
    }
}
