//! In-memory fakes for the collaborator traits
//!
//! Provides `MemoryIssueTracker`, `ScriptedBackend`, and
//! `RecordingChangeRequestWriter` that satisfy the trait contracts without
//! any network access. Used by tests and the offline demo.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::collaborators::*;
use crate::domain::RepoRef;
use crate::error::{BackendError, PipelineError, Result};

// ---------------------------------------------------------------------------
// MemoryIssueTracker
// ---------------------------------------------------------------------------

/// Issue tracker backed by a `HashMap<(repo, number), WorkItem>`.
#[derive(Debug, Default)]
pub struct MemoryIssueTracker {
    issues: Mutex<HashMap<(String, u64), WorkItem>>,
    failure: Mutex<Option<PipelineError>>,
}

impl MemoryIssueTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an issue.
    pub fn insert(&self, repo: &RepoRef, number: u64, item: WorkItem) {
        let mut issues = self.issues.lock().unwrap();
        issues.insert((repo.to_string(), number), item);
    }

    /// Make every subsequent fetch fail with `err`.
    pub fn fail_with(&self, err: PipelineError) {
        *self.failure.lock().unwrap() = Some(err);
    }
}

#[async_trait]
impl IssueTracker for MemoryIssueTracker {
    async fn get_issue(&self, repo: &RepoRef, number: u64) -> Result<WorkItem> {
        if let Some(err) = self.failure.lock().unwrap().clone() {
            return Err(err);
        }
        let issues = self.issues.lock().unwrap();
        issues
            .get(&(repo.to_string(), number))
            .cloned()
            .ok_or(PipelineError::NotFound { identifier: number })
    }
}

// ---------------------------------------------------------------------------
// ScriptedBackend
// ---------------------------------------------------------------------------

/// Text backend that replays scripted responses in order and counts calls.
///
/// Once the script is exhausted it answers with an empty completion.
#[derive(Debug, Default)]
pub struct ScriptedBackend {
    script: Mutex<VecDeque<std::result::Result<Completion, BackendError>>>,
    requests: Mutex<Vec<CompletionRequest>>,
    calls: AtomicUsize,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend whose first answer is `text`.
    pub fn replying(text: impl Into<String>) -> Self {
        let backend = Self::new();
        backend.push_ok(Completion::text(text));
        backend
    }

    /// Backend whose first answer is `err`.
    pub fn failing(err: BackendError) -> Self {
        let backend = Self::new();
        backend.push_err(err);
        backend
    }

    pub fn push_ok(&self, completion: Completion) {
        self.script.lock().unwrap().push_back(Ok(completion));
    }

    pub fn push_err(&self, err: BackendError) {
        self.script.lock().unwrap().push_back(Err(err));
    }

    /// Number of `complete` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextBackend for ScriptedBackend {
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> std::result::Result<Completion, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request);
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Completion::default()))
    }
}

// ---------------------------------------------------------------------------
// RecordingChangeRequestWriter
// ---------------------------------------------------------------------------

/// Change-request writer that records requests and tracks created branches.
///
/// Creating a branch that already exists fails with `Conflict`, like the real
/// service.
#[derive(Debug, Default)]
pub struct RecordingChangeRequestWriter {
    requests: Mutex<Vec<ChangeRequest>>,
    branches: Mutex<Vec<String>>,
    failure: Mutex<Option<PipelineError>>,
}

impl RecordingChangeRequestWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pretend `branch` already exists in the target repository.
    pub fn with_existing_branch(self, branch: impl Into<String>) -> Self {
        self.branches.lock().unwrap().push(branch.into());
        self
    }

    /// Make every subsequent call fail with `err`.
    pub fn fail_with(&self, err: PipelineError) {
        *self.failure.lock().unwrap() = Some(err);
    }

    /// Number of `create_change_request` calls so far, failed ones included.
    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<ChangeRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChangeRequestWriter for RecordingChangeRequestWriter {
    async fn create_change_request(&self, request: ChangeRequest) -> Result<String> {
        self.requests.lock().unwrap().push(request.clone());

        if let Some(err) = self.failure.lock().unwrap().clone() {
            return Err(err);
        }

        let mut branches = self.branches.lock().unwrap();
        if branches.contains(&request.branch) {
            return Err(PipelineError::Conflict {
                branch: request.branch,
            });
        }
        branches.push(request.branch);

        let number = self.requests.lock().unwrap().len();
        Ok(format!(
            "https://github.invalid/{}/{}/pull/{}",
            request.repo.owner, request.repo.name, number
        ))
    }
}
