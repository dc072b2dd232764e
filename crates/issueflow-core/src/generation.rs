//! Generation stage: task description in, file set out.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::collaborators::{CompletionRequest, TextBackend};
use crate::config::{GenerationConfig, MOCK_CREDENTIAL};
use crate::domain::{FileSet, TaskDescription};
use crate::error::Result;
use crate::fallback::generate_fallback;
use crate::obs;
use crate::parser::parse_response;
use crate::prompt::build_prompt;

/// Which generator serves a run, and why.
///
/// Evaluated in declaration order; the first matching rule wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendDecision {
    /// Mock mode was requested explicitly.
    Forced,
    /// The credential is the literal `"mock"`.
    SentinelCredential,
    /// No credential, or an empty one.
    MissingCredential,
    /// Call the live backend.
    Live,
}

impl BackendDecision {
    pub fn select(config: &GenerationConfig) -> Self {
        if config.mock_mode {
            return BackendDecision::Forced;
        }
        match config.credential.as_deref() {
            Some(MOCK_CREDENTIAL) => BackendDecision::SentinelCredential,
            None | Some("") => BackendDecision::MissingCredential,
            Some(_) => BackendDecision::Live,
        }
    }

    pub fn uses_fallback(&self) -> bool {
        !matches!(self, BackendDecision::Live)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BackendDecision::Forced => "forced",
            BackendDecision::SentinelCredential => "sentinel_credential",
            BackendDecision::MissingCredential => "missing_credential",
            BackendDecision::Live => "live",
        }
    }
}

impl fmt::Display for BackendDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Produces a [`FileSet`] for a task, live or from the fallback generator.
pub struct GenerationStage {
    config: GenerationConfig,
    backend: Arc<dyn TextBackend>,
    decision: BackendDecision,
}

impl GenerationStage {
    /// The backend decision is made once, here.
    pub fn new(config: GenerationConfig, backend: Arc<dyn TextBackend>) -> Self {
        let decision = BackendDecision::select(&config);
        Self {
            config,
            backend,
            decision,
        }
    }

    pub fn decision(&self) -> BackendDecision {
        self.decision
    }

    /// Generate edits for `task`.
    ///
    /// Backend errors propagate as `PipelineError::Transport`, except the
    /// low-balance rejection which degrades to the fallback generator.
    #[instrument(skip(self, task), fields(issue = task.identifier, decision = %self.decision))]
    pub async fn generate(&self, task: &TaskDescription) -> Result<FileSet> {
        info!(title = %task.title, "Generating code");

        if self.decision.uses_fallback() {
            obs::emit_fallback_selected(task.identifier, self.decision.as_str());
            return Ok(generate_fallback(task));
        }

        let prompt = build_prompt(task);
        debug!(prompt_chars = prompt.len(), model = %self.config.model, "Calling text backend");

        let request = CompletionRequest {
            prompt,
            model: self.config.model.clone(),
            max_output_tokens: self.config.max_output_tokens,
        };

        match self.backend.complete(request).await {
            Ok(completion) => {
                let file_set = parse_response(completion.first_text());
                info!(files = file_set.len(), "Parsed model response");
                Ok(file_set)
            }
            Err(err) if err.is_low_balance() => {
                warn!(error = %err, "Backend credit balance too low, falling back to sample generation");
                obs::emit_fallback_selected(task.identifier, "low_balance");
                Ok(generate_fallback(task))
            }
            Err(err) => Err(err.into()),
        }
    }
}
