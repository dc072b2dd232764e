//! issueflow core - issue-to-pull-request pipeline
//!
//! Sequences three stages for a single work item:
//! - Analysis: fetch an issue and derive a `TaskDescription`
//! - Generation: produce a `FileSet`, live from a text model or from the
//!   deterministic fallback generator
//! - Submission: commit the files on a new branch and open a pull request
//!
//! Remote services sit behind the traits in `collaborators`; concrete
//! implementations live in the `issueflow-github` and `issueflow-anthropic`
//! crates, in-memory ones in `fakes`.

pub mod analysis;
pub mod collaborators;
pub mod config;
pub mod demo;
pub mod domain;
mod error;
pub mod fakes;
pub mod fallback;
pub mod generation;
pub mod obs;
pub mod orchestrator;
pub mod parser;
pub mod prompt;
pub mod submission;
pub mod telemetry;

pub use analysis::{extract_priority, extract_requirements, AnalysisStage, DEFAULT_PRIORITY};
pub use collaborators::{
    ChangeRequest, ChangeRequestWriter, Completion, CompletionRequest, ContentSegment,
    IssueTracker, Label, TextBackend, WorkItem,
};
pub use config::{GenerationConfig, SubmissionConfig};
pub use domain::{FileEdit, FileSet, RepoRef, SubmissionResult, TaskDescription};
pub use error::{BackendError, PipelineError, Result};
pub use fallback::generate_fallback;
pub use generation::{BackendDecision, GenerationStage};
pub use orchestrator::{Orchestrator, PipelineState, RunReport};
pub use parser::{parse_response, FenceScanner, FencedBlock};
pub use submission::SubmissionStage;
pub use telemetry::init_tracing;

/// issueflow version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
