//! Pipeline artifacts handed from stage to stage.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{PipelineError, Result};

/// Normalized, actionable view of a work item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDescription {
    /// Issue number in the tracker.
    pub identifier: u64,
    pub title: String,
    pub body: String,
    /// Non-blank body lines, verbatim and in order.
    pub requirements: Vec<String>,
    pub priority: String,
}

/// A proposed file write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEdit {
    pub path: String,
    pub content: String,
}

impl FileEdit {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }

    /// Whether `candidate` looks like a relative file path.
    ///
    /// Non-empty, no whitespace, and at least one `/` or `.`.
    pub fn is_valid_path(candidate: &str) -> bool {
        !candidate.is_empty()
            && !candidate.chars().any(char::is_whitespace)
            && (candidate.contains('/') || candidate.contains('.'))
    }
}

/// Ordered collection of edits plus a one-line summary.
///
/// Order is the order of appearance in the source text. Duplicate paths are
/// kept as-is; see [`FileSet::collapsed_edits`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSet {
    pub edits: Vec<FileEdit>,
    pub summary: String,
}

impl FileSet {
    pub fn new(edits: Vec<FileEdit>, summary: impl Into<String>) -> Self {
        Self {
            edits,
            summary: summary.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.edits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    /// Paths in File Set order (duplicates included).
    pub fn paths(&self) -> Vec<&str> {
        self.edits.iter().map(|e| e.path.as_str()).collect()
    }

    /// One edit per path: the last content wins, the path keeps the position
    /// of its first occurrence.
    pub fn collapsed_edits(&self) -> Vec<FileEdit> {
        let mut out: Vec<FileEdit> = Vec::with_capacity(self.edits.len());
        for edit in &self.edits {
            match out.iter_mut().find(|e| e.path == edit.path) {
                Some(existing) => existing.content = edit.content.clone(),
                None => out.push(edit.clone()),
            }
        }
        out
    }
}

/// Reference to a created change request (the pull request URL).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionResult(pub String);

impl SubmissionResult {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubmissionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// `owner/name` repository coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl RepoRef {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// Parse `"owner/name"`. Both halves must be non-empty and there must be
    /// exactly one slash.
    pub fn parse(s: &str) -> Result<Self> {
        let mut parts = s.trim().split('/');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(owner), Some(name), None) if !owner.is_empty() && !name.is_empty() => {
                Ok(Self::new(owner, name))
            }
            _ => Err(PipelineError::Config(format!(
                "repository must be in owner/name form, got {s:?}"
            ))),
        }
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

impl std::str::FromStr for RepoRef {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
