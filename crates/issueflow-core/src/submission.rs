//! Submission stage: file set in, pull request URL out.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::collaborators::{ChangeRequest, ChangeRequestWriter};
use crate::config::SubmissionConfig;
use crate::domain::{FileEdit, FileSet, RepoRef, SubmissionResult};
use crate::error::Result;

/// Packages a [`FileSet`] into a change request on a fresh branch.
pub struct SubmissionStage {
    writer: Arc<dyn ChangeRequestWriter>,
    repo: RepoRef,
    config: SubmissionConfig,
}

impl SubmissionStage {
    pub fn new(writer: Arc<dyn ChangeRequestWriter>, repo: RepoRef, config: SubmissionConfig) -> Self {
        Self {
            writer,
            repo,
            config,
        }
    }

    /// Fails with `Transport` when the repository or base branch is
    /// unreachable and `Conflict` when the branch already exists.
    #[instrument(skip(self, file_set, title), fields(repo = %self.repo))]
    pub async fn submit(
        &self,
        identifier: u64,
        file_set: FileSet,
        title: &str,
    ) -> Result<SubmissionResult> {
        let files = file_set.collapsed_edits();
        if files.len() != file_set.len() {
            warn!(
                edits = file_set.len(),
                unique_paths = files.len(),
                "Duplicate paths in file set, keeping the last content for each"
            );
        }

        let branch = self.config.branch_for(identifier);
        info!(branch = %branch, files = files.len(), "Submitting change request");

        let request = ChangeRequest {
            repo: self.repo.clone(),
            base_branch: self.config.base_branch.clone(),
            branch,
            body: change_request_body(identifier, &file_set.summary, &files),
            title: title.to_string(),
            files,
        };

        let url = self.writer.create_change_request(request).await?;
        Ok(SubmissionResult(url))
    }
}

/// Pull request body: issue reference, summary, one line per committed file.
pub fn change_request_body(identifier: u64, summary: &str, files: &[FileEdit]) -> String {
    let listing = files
        .iter()
        .map(|edit| format!("- `{}`", edit.path))
        .collect::<Vec<_>>()
        .join("\n");

    format!("Closes #{identifier}\n\n## Summary\n{summary}\n\n## Files\n{listing}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::RecordingChangeRequestWriter;

    #[test]
    fn test_body_references_issue_and_files() {
        let files = vec![FileEdit::new("src/a.ts", "x"), FileEdit::new("README.md", "y")];
        let body = change_request_body(5, "Generated 2 files for implementation", &files);
        assert!(body.starts_with("Closes #5"));
        assert!(body.contains("Generated 2 files for implementation"));
        assert!(body.ends_with("## Files\n- `src/a.ts`\n- `README.md`"));
    }

    #[tokio::test]
    async fn test_body_lists_each_committed_path_once() {
        let writer = Arc::new(RecordingChangeRequestWriter::new());
        let stage = SubmissionStage::new(
            writer.clone(),
            RepoRef::new("octo", "widgets"),
            SubmissionConfig::default(),
        );
        let set = FileSet::new(
            vec![
                FileEdit::new("src/a.ts", "old"),
                FileEdit::new("src/b.ts", "b"),
                FileEdit::new("src/a.ts", "new"),
            ],
            "Generated 3 files for implementation",
        );

        stage.submit(9, set, "Add exporter").await.unwrap();

        let request = &writer.requests()[0];
        assert_eq!(
            request.files,
            vec![FileEdit::new("src/a.ts", "new"), FileEdit::new("src/b.ts", "b")]
        );
        assert_eq!(request.body.matches("- `src/a.ts`").count(), 1);
        assert!(request.body.ends_with("## Files\n- `src/a.ts`\n- `src/b.ts`"));
    }
}
