//! Pull request creation over the git data API.
//!
//! One change request is six calls:
//! 1. resolve the base branch head
//! 2. read its commit to find the base tree
//! 3. create a tree with every file inline
//! 4. create a commit on top of the base head
//! 5. create the new branch ref
//! 6. open the pull request

use async_trait::async_trait;
use issueflow_core::{ChangeRequest, ChangeRequestWriter, FileEdit, PipelineError, RepoRef, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::client::{GithubClient, ShaRef};
use crate::error::ApiError;

/// Regular, non-executable file.
const BLOB_MODE: &str = "100644";

#[derive(Debug, Deserialize)]
struct GitRef {
    object: ShaRef,
}

#[derive(Debug, Deserialize)]
struct GitCommit {
    tree: ShaRef,
}

#[derive(Debug, Serialize)]
struct TreeEntry<'a> {
    path: &'a str,
    mode: &'static str,
    #[serde(rename = "type")]
    kind: &'static str,
    content: &'a str,
}

impl<'a> From<&'a FileEdit> for TreeEntry<'a> {
    fn from(edit: &'a FileEdit) -> Self {
        TreeEntry {
            path: &edit.path,
            mode: BLOB_MODE,
            kind: "blob",
            content: &edit.content,
        }
    }
}

#[derive(Debug, Serialize)]
struct CreateTreeRequest<'a> {
    base_tree: &'a str,
    tree: Vec<TreeEntry<'a>>,
}

#[derive(Debug, Serialize)]
struct CreateCommitRequest<'a> {
    message: &'a str,
    tree: &'a str,
    parents: Vec<&'a str>,
}

#[derive(Debug, Serialize)]
struct CreateRefRequest<'a> {
    #[serde(rename = "ref")]
    git_ref: String,
    sha: &'a str,
}

#[derive(Debug, Serialize)]
struct CreatePullRequest<'a> {
    title: &'a str,
    body: &'a str,
    head: &'a str,
    base: &'a str,
}

#[derive(Debug, Deserialize)]
struct PullRequestResponse {
    number: u64,
    html_url: String,
}

fn repo_path(repo: &RepoRef, tail: &str) -> String {
    format!("repos/{}/{}/{}", repo.owner, repo.name, tail)
}

/// True when a failed ref creation means the branch is already there.
fn is_existing_ref(err: &ApiError) -> bool {
    err.is_status(422) && err.message.contains("Reference already exists")
}

impl GithubClient {
    async fn branch_head(&self, repo: &RepoRef, branch: &str) -> std::result::Result<String, ApiError> {
        let git_ref: GitRef = self
            .get_json(&repo_path(repo, &format!("git/ref/heads/{branch}")))
            .await?;
        Ok(git_ref.object.sha)
    }

    async fn branch_exists(&self, repo: &RepoRef, branch: &str) -> Result<bool> {
        match self.branch_head(repo, branch).await {
            Ok(_) => Ok(true),
            Err(err) if err.is_status(404) => Ok(false),
            Err(err) => Err(err.into()),
        }
    }
}

#[async_trait]
impl ChangeRequestWriter for GithubClient {
    async fn create_change_request(&self, request: ChangeRequest) -> Result<String> {
        let repo = &request.repo;
        let conflict = || PipelineError::Conflict {
            branch: request.branch.clone(),
        };

        if self.branch_exists(repo, &request.branch).await? {
            return Err(conflict());
        }

        let base_sha = self.branch_head(repo, &request.base_branch).await?;
        let base_commit: GitCommit = self
            .get_json(&repo_path(repo, &format!("git/commits/{base_sha}")))
            .await?;
        debug!(base = %request.base_branch, sha = %base_sha, "resolved base branch");

        let tree: ShaRef = self
            .post_json(
                &repo_path(repo, "git/trees"),
                &CreateTreeRequest {
                    base_tree: &base_commit.tree.sha,
                    tree: request.files.iter().map(TreeEntry::from).collect(),
                },
            )
            .await?;

        let commit: ShaRef = self
            .post_json(
                &repo_path(repo, "git/commits"),
                &CreateCommitRequest {
                    message: &request.title,
                    tree: &tree.sha,
                    parents: vec![base_sha.as_str()],
                },
            )
            .await?;
        debug!(commit = %commit.sha, files = request.files.len(), "created commit");

        let created: std::result::Result<serde_json::Value, ApiError> = self
            .post_json(
                &repo_path(repo, "git/refs"),
                &CreateRefRequest {
                    git_ref: format!("refs/heads/{}", request.branch),
                    sha: &commit.sha,
                },
            )
            .await;
        match created {
            Ok(_) => {}
            Err(err) if is_existing_ref(&err) => return Err(conflict()),
            Err(err) => return Err(err.into()),
        }

        let pr: PullRequestResponse = self
            .post_json(
                &repo_path(repo, "pulls"),
                &CreatePullRequest {
                    title: &request.title,
                    body: &request.body,
                    head: &request.branch,
                    base: &request.base_branch,
                },
            )
            .await?;

        info!(repo = %repo, number = pr.number, url = %pr.html_url, "opened pull request");
        Ok(pr.html_url)
    }
}
