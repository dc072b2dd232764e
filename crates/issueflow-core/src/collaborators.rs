//! Collaborator trait definitions for the pipeline
//!
//! These traits define the remote services the stages talk to:
//! - `IssueTracker`: fetch a work item (title, body, labels)
//! - `TextBackend`: single-prompt text generation
//! - `ChangeRequestWriter`: branch + commit + pull request in one call
//!
//! All traits are async and backend-agnostic. In-memory fakes are provided
//! for testing via the `fakes` module.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{FileEdit, RepoRef};
use crate::error::{BackendError, Result};

// ---------------------------------------------------------------------------
// IssueTracker
// ---------------------------------------------------------------------------

/// A label as returned by the tracker: either a bare string or an object
/// with a `name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Label {
    Plain(String),
    Named { name: String },
}

impl Label {
    pub fn name(&self) -> &str {
        match self {
            Label::Plain(name) => name,
            Label::Named { name } => name,
        }
    }
}

/// Raw work item fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItem {
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub labels: Vec<Label>,
}

/// Read access to an issue tracker.
///
/// Guarantees:
/// - Unknown issue numbers yield `PipelineError::NotFound`.
/// - Communication failures yield `PipelineError::Transport`.
#[async_trait]
pub trait IssueTracker: Send + Sync {
    async fn get_issue(&self, repo: &RepoRef, number: u64) -> Result<WorkItem>;
}

// ---------------------------------------------------------------------------
// TextBackend
// ---------------------------------------------------------------------------

/// One-shot completion request. No conversation history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub prompt: String,
    pub model: String,
    pub max_output_tokens: u32,
}

/// A typed segment of backend output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentSegment {
    Text { text: String },
    /// Any non-text segment (tool use, thinking, ...).
    #[serde(other)]
    Other,
}

/// Backend response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Completion {
    #[serde(default)]
    pub content: Vec<ContentSegment>,
}

impl Completion {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ContentSegment::Text { text: text.into() }],
        }
    }

    /// Text of the first segment, or `""` when the first segment is absent or
    /// not a text segment. Later segments are never consulted.
    pub fn first_text(&self) -> &str {
        match self.content.first() {
            Some(ContentSegment::Text { text }) => text,
            _ => "",
        }
    }
}

/// Generative text backend.
#[async_trait]
pub trait TextBackend: Send + Sync {
    async fn complete(&self, request: CompletionRequest)
        -> std::result::Result<Completion, BackendError>;
}

// ---------------------------------------------------------------------------
// ChangeRequestWriter
// ---------------------------------------------------------------------------

/// Everything needed to open a change request in one shot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeRequest {
    pub repo: RepoRef,
    /// Branch the new branch starts from and the request targets.
    pub base_branch: String,
    /// Branch to create.
    pub branch: String,
    /// Committed as a single changeset, in this order.
    pub files: Vec<FileEdit>,
    pub title: String,
    pub body: String,
}

/// Creates a branch, commits files, and opens a change request.
///
/// Guarantees:
/// - Returns the change request URL on success.
/// - An existing `branch` yields `PipelineError::Conflict`.
/// - Unreachable repository or base branch yields `PipelineError::Transport`.
#[async_trait]
pub trait ChangeRequestWriter: Send + Sync {
    async fn create_change_request(&self, request: ChangeRequest) -> Result<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_both_shapes_deserialize() {
        let labels: Vec<Label> =
            serde_json::from_str(r#"["bug", {"name": "priority:high", "color": "ff0000"}]"#)
                .unwrap();
        assert_eq!(labels[0], Label::Plain("bug".to_string()));
        assert_eq!(labels[1].name(), "priority:high");
    }

    #[test]
    fn test_work_item_defaults() {
        let item: WorkItem = serde_json::from_str(r#"{"title": "t", "body": null}"#).unwrap();
        assert_eq!(item.body, None);
        assert!(item.labels.is_empty());
    }

    #[test]
    fn test_content_segment_unknown_type_is_other() {
        let completion: Completion = serde_json::from_str(
            r#"{"content": [{"type": "tool_use", "id": "x", "name": "y", "input": {}},
                            {"type": "text", "text": "hello"}]}"#,
        )
        .unwrap();
        assert_eq!(completion.content[0], ContentSegment::Other);
        assert_eq!(completion.first_text(), "");
    }

    #[test]
    fn test_first_text() {
        assert_eq!(Completion::text("abc").first_text(), "abc");
        assert_eq!(Completion::default().first_text(), "");
    }
}
