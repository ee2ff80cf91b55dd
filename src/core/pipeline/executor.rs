//! Pipeline execution: an explicit task graph of two concurrent analysis
//! stages joined by a barrier, feeding the summarizer.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::core::llm::{ChatMessage, LlmManager, MediaBlob};
use crate::core::store::{PromptScope, Store};

use super::stages::Stage;
use super::types::{PipelineError, RunState, SessionState};

pub struct Pipeline {
    store: Store,
    llm: Arc<LlmManager>,
    scope: PromptScope,
    stage_timeout: Duration,
}

#[derive(Debug)]
pub struct AssessmentOutcome {
    pub session_id: String,
    pub summary: String,
}

/// A terminal pipeline failure. `session_id` is absent only when the run
/// failed before a session row could be created.
#[derive(Debug)]
pub struct PipelineFailure {
    pub session_id: Option<String>,
    pub error: PipelineError,
}

impl Pipeline {
    pub fn new(store: Store, llm: Arc<LlmManager>, config: &AppConfig) -> Self {
        Self {
            store,
            llm,
            scope: config.scope.clone(),
            stage_timeout: Duration::from_secs(config.stage_timeout_secs),
        }
    }

    /// Run one assessment. Both analyzers always run, whatever `risk_type`
    /// says; the selector is only recorded in session state.
    pub async fn run(
        &self,
        user_id: &str,
        risk_type: &str,
        payload: MediaBlob,
    ) -> Result<AssessmentOutcome, PipelineFailure> {
        let no_session = |error: PipelineError| PipelineFailure {
            session_id: None,
            error,
        };

        let fire = Stage::fire_risk(&self.store, &self.scope)
            .await
            .map_err(no_session)?;
        let construction = Stage::construction_risk(&self.store, &self.scope)
            .await
            .map_err(no_session)?;
        let summary = Stage::risk_summary(&self.store, &self.scope)
            .await
            .map_err(no_session)?;

        let state = SessionState::new(&payload.mime_type, risk_type);
        let session = self
            .store
            .create_session(user_id, &state)
            .await
            .map_err(|e| no_session(PipelineError::session(e)))?;
        let session_id = session.id;

        info!(
            "Assessment session {} created for user '{}' (risk_type: '{}')",
            session_id, user_id, risk_type
        );

        match self
            .drive(&session_id, &fire, &construction, &summary, &payload, state)
            .await
        {
            Ok(text) => Ok(AssessmentOutcome {
                session_id,
                summary: text,
            }),
            Err(error) => {
                if let Err(db_err) = self
                    .store
                    .record_session_failure(&session_id, &error.to_string())
                    .await
                {
                    warn!(
                        "Failed to record failure for session {}: {:#}",
                        session_id, db_err
                    );
                }
                Err(PipelineFailure {
                    session_id: Some(session_id),
                    error,
                })
            }
        }
    }

    async fn drive(
        &self,
        session_id: &str,
        fire: &Stage,
        construction: &Stage,
        summary: &Stage,
        payload: &MediaBlob,
        state: SessionState,
    ) -> Result<String, PipelineError> {
        self.transition(session_id, RunState::ParallelRunning)
            .await?;

        // Both analyzers see the same payload and the same initial snapshot;
        // each writes only its own output key.
        let shared = Arc::new(Mutex::new(state));
        let (fire_out, construction_out) = tokio::join!(
            self.run_analysis(session_id, fire, payload, shared.clone()),
            self.run_analysis(session_id, construction, payload, shared.clone()),
        );
        fire_out?;
        construction_out?;

        // Join barrier: the summarizer only observes state with both reports
        // in place.
        self.transition(session_id, RunState::ParallelJoined).await?;
        let state = shared.lock().await.clone();
        self.store
            .save_session_state(session_id, &state)
            .await
            .map_err(PipelineError::session)?;

        self.transition(session_id, RunState::Summarizing).await?;
        let text = self.run_summary(session_id, summary, &state).await?;
        self.transition(session_id, RunState::Complete).await?;
        Ok(text)
    }

    async fn run_analysis(
        &self,
        session_id: &str,
        stage: &Stage,
        payload: &MediaBlob,
        shared: Arc<Mutex<SessionState>>,
    ) -> Result<(), PipelineError> {
        self.stage_event(session_id, stage.name, "entered").await;

        let messages = stage.analysis_messages();
        let text = self
            .generate(stage.name, &messages, Some(payload))
            .await?;

        if let Some(key) = stage.output_key {
            shared.lock().await.set(key, text);
        }

        self.stage_event(session_id, stage.name, "finished").await;
        Ok(())
    }

    async fn run_summary(
        &self,
        session_id: &str,
        stage: &Stage,
        state: &SessionState,
    ) -> Result<String, PipelineError> {
        let fire_report = state
            .fire_risk_report()
            .ok_or_else(|| PipelineError::StageFailed {
                stage: stage.name,
                message: "fire risk report missing from session state".to_string(),
            })?;
        let construction_report =
            state
                .construction_risk_report()
                .ok_or_else(|| PipelineError::StageFailed {
                    stage: stage.name,
                    message: "construction risk report missing from session state".to_string(),
                })?;

        self.stage_event(session_id, stage.name, "entered").await;
        let messages = stage.summary_messages(fire_report, construction_report);
        let text = self.generate(stage.name, &messages, None).await?;
        self.stage_event(session_id, stage.name, "finished").await;
        Ok(text)
    }

    async fn generate(
        &self,
        stage: &'static str,
        messages: &[ChatMessage],
        media: Option<&MediaBlob>,
    ) -> Result<String, PipelineError> {
        match tokio::time::timeout(
            self.stage_timeout,
            self.llm.generate_with_selected(messages, media),
        )
        .await
        {
            Err(_) => Err(PipelineError::StageTimeout {
                stage,
                seconds: self.stage_timeout.as_secs(),
            }),
            Ok(Err(e)) => Err(PipelineError::StageFailed {
                stage,
                message: format!("{:#}", e),
            }),
            Ok(Ok(text)) => Ok(text),
        }
    }

    /// Observability event on stage entry and exit: a tracing line plus an
    /// audit row. Event persistence is best-effort and never fails a run.
    async fn stage_event(&self, session_id: &str, stage: &str, phase: &str) {
        info!("{} {} for session {}", stage, phase, session_id);
        if let Err(e) = self
            .store
            .append_session_event(session_id, stage, phase, "")
            .await
        {
            warn!(
                "Failed to record {} event for session {}: {:#}",
                phase, session_id, e
            );
        }
    }

    async fn transition(&self, session_id: &str, to: RunState) -> Result<(), PipelineError> {
        self.store
            .transition_session(session_id, to)
            .await
            .map_err(PipelineError::session)
    }
}
