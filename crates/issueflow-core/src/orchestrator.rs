//! Pipeline orchestration: Analysis → Generation → Submission.
//!
//! The orchestrator only sequences stages. It recovers nothing: the first
//! stage error moves the run to `Failed` and is returned unchanged. An empty
//! file set ends the run in `Done` without submitting.

use std::fmt;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, Instrument};
use uuid::Uuid;

use crate::analysis::AnalysisStage;
use crate::domain::{FileSet, SubmissionResult, TaskDescription};
use crate::error::Result;
use crate::generation::GenerationStage;
use crate::obs;
use crate::submission::SubmissionStage;

/// Run lifecycle state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    Idle,
    Analyzing,
    Generating,
    Submitting,
    Done,
    Failed,
}

impl PipelineState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineState::Idle => "idle",
            PipelineState::Analyzing => "analyzing",
            PipelineState::Generating => "generating",
            PipelineState::Submitting => "submitting",
            PipelineState::Done => "done",
            PipelineState::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineState::Done | PipelineState::Failed)
    }

    /// Whether `self -> next` is a legal edge.
    pub fn can_transition_to(&self, next: PipelineState) -> bool {
        use PipelineState::*;
        matches!(
            (*self, next),
            (Idle, Analyzing)
                | (Analyzing, Generating)
                | (Generating, Submitting)
                | (Generating, Done)
                | (Submitting, Done)
                | (Analyzing, Failed)
                | (Generating, Failed)
                | (Submitting, Failed)
        )
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a run that reached `Done`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub issue: u64,
    pub task: TaskDescription,
    pub file_set: FileSet,
    /// `None` when generation produced no files.
    pub submission: Option<SubmissionResult>,
    /// Every state visited, starting with `Idle`.
    pub states: Vec<PipelineState>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunReport {
    pub fn submitted(&self) -> bool {
        self.submission.is_some()
    }
}

/// Sequences the three stages for one work item at a time.
pub struct Orchestrator {
    analysis: AnalysisStage,
    generation: GenerationStage,
    submission: SubmissionStage,
    state: PipelineState,
    history: Vec<PipelineState>,
}

impl Orchestrator {
    pub fn new(
        analysis: AnalysisStage,
        generation: GenerationStage,
        submission: SubmissionStage,
    ) -> Self {
        Self {
            analysis,
            generation,
            submission,
            state: PipelineState::Idle,
            history: vec![PipelineState::Idle],
        }
    }

    /// Current state.
    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// States visited by the most recent run, starting with `Idle`.
    pub fn history(&self) -> &[PipelineState] {
        &self.history
    }

    fn transition(&mut self, next: PipelineState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal pipeline transition {} -> {}",
            self.state,
            next
        );
        self.state = next;
        self.history.push(next);
    }

    fn reset(&mut self) {
        self.state = PipelineState::Idle;
        self.history = vec![PipelineState::Idle];
    }

    /// Record the failure of the active stage and hand the error back.
    fn fail<T>(&mut self, run_id: &str, err: crate::error::PipelineError) -> Result<T> {
        obs::emit_run_failed(run_id, self.state.as_str(), &err);
        self.transition(PipelineState::Failed);
        Err(err)
    }

    /// Run the pipeline for one work item.
    ///
    /// Each call starts from `Idle`; the orchestrator can be reused for
    /// further items, one at a time.
    pub async fn run(&mut self, identifier: u64) -> Result<RunReport> {
        self.reset();

        let run_id = Uuid::new_v4();
        let span = obs::run_span(&run_id.to_string(), identifier);
        self.run_stages(run_id, identifier).instrument(span).await
    }

    async fn run_stages(&mut self, run_id: Uuid, identifier: u64) -> Result<RunReport> {
        let run_id_str = run_id.to_string();
        let started_at = Utc::now();
        let start = Instant::now();
        obs::emit_run_started(&run_id_str, identifier);

        // Analyzing
        self.transition(PipelineState::Analyzing);
        obs::emit_stage_entered(&run_id_str, self.state.as_str());
        let stage_start = Instant::now();
        let task = match self.analysis.analyze(identifier).await {
            Ok(task) => task,
            Err(e) => return self.fail(&run_id_str, e),
        };
        obs::emit_stage_completed(&run_id_str, "analyzing", elapsed_ms(stage_start));

        // Generating
        self.transition(PipelineState::Generating);
        obs::emit_stage_entered(&run_id_str, self.state.as_str());
        let stage_start = Instant::now();
        let file_set = match self.generation.generate(&task).await {
            Ok(file_set) => file_set,
            Err(e) => return self.fail(&run_id_str, e),
        };
        obs::emit_stage_completed(&run_id_str, "generating", elapsed_ms(stage_start));

        // Submitting, unless there is nothing to submit
        let submission = if file_set.is_empty() {
            info!("No files generated, skipping submission");
            None
        } else {
            self.transition(PipelineState::Submitting);
            obs::emit_stage_entered(&run_id_str, self.state.as_str());
            let stage_start = Instant::now();
            let result = match self
                .submission
                .submit(identifier, file_set.clone(), &task.title)
                .await
            {
                Ok(result) => result,
                Err(e) => return self.fail(&run_id_str, e),
            };
            obs::emit_stage_completed(&run_id_str, "submitting", elapsed_ms(stage_start));
            info!(url = %result, "Change request created");
            Some(result)
        };

        self.transition(PipelineState::Done);
        obs::emit_run_finished(
            &run_id_str,
            elapsed_ms(start),
            file_set.len(),
            submission.is_some(),
        );

        Ok(RunReport {
            run_id,
            issue: identifier,
            task,
            file_set,
            submission,
            states: self.history.clone(),
            started_at,
            finished_at: Utc::now(),
        })
    }
}

fn elapsed_ms(since: Instant) -> u64 {
    since.elapsed().as_millis() as u64
}
