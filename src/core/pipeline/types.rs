use std::collections::HashMap;

use crate::core::store::StoreError;

/// State key for the uploaded payload's content type.
pub const KEY_MIME_TYPE: &str = "mime_type";
/// State key for the caller's risk-type selector. Informational only: both
/// analyzers always run regardless of its value.
pub const KEY_RISK_TYPE: &str = "risk_type";
/// State key written once by the fire-risk stage.
pub const KEY_FIRE_RISK_REPORT: &str = "fire_risk_report";
/// State key written once by the construction-risk stage.
pub const KEY_CONSTRUCTION_RISK_REPORT: &str = "construction_risk_report";

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Created,
    ParallelRunning,
    ParallelJoined,
    Summarizing,
    Complete,
    Failed,
}

impl RunState {
    pub fn as_str(self) -> &'static str {
        match self {
            RunState::Created => "created",
            RunState::ParallelRunning => "parallel_running",
            RunState::ParallelJoined => "parallel_joined",
            RunState::Summarizing => "summarizing",
            RunState::Complete => "complete",
            RunState::Failed => "failed",
        }
    }

    pub fn from_status(value: &str) -> Option<Self> {
        match value {
            "created" => Some(RunState::Created),
            "parallel_running" => Some(RunState::ParallelRunning),
            "parallel_joined" => Some(RunState::ParallelJoined),
            "summarizing" => Some(RunState::Summarizing),
            "complete" => Some(RunState::Complete),
            "failed" => Some(RunState::Failed),
            _ => None,
        }
    }
}

/// The shared state map stages read from and write to. Each analysis stage
/// writes its report under its own key; the two never overlap.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct SessionState {
    entries: HashMap<String, String>,
}

impl SessionState {
    pub fn new(mime_type: &str, risk_type: &str) -> Self {
        let mut state = Self::default();
        state.set(KEY_MIME_TYPE, mime_type.to_string());
        state.set(KEY_RISK_TYPE, risk_type.to_string());
        state
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: &str, value: String) {
        self.entries.insert(key.to_string(), value);
    }

    pub fn mime_type(&self) -> Option<&str> {
        self.get(KEY_MIME_TYPE)
    }

    pub fn risk_type(&self) -> Option<&str> {
        self.get(KEY_RISK_TYPE)
    }

    pub fn fire_risk_report(&self) -> Option<&str> {
        self.get(KEY_FIRE_RISK_REPORT)
    }

    pub fn construction_risk_report(&self) -> Option<&str> {
        self.get(KEY_CONSTRUCTION_RISK_REPORT)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("stage '{stage}' has no stored instruction: {message}")]
    MissingInstruction {
        stage: &'static str,
        message: String,
    },
    #[error("stage '{stage}' failed: {message}")]
    StageFailed {
        stage: &'static str,
        message: String,
    },
    #[error("stage '{stage}' timed out after {seconds}s")]
    StageTimeout { stage: &'static str, seconds: u64 },
    #[error("prompt storage failure: {0}")]
    Storage(StoreError),
    #[error("session bookkeeping failure: {message}")]
    Session { message: String },
}

impl PipelineError {
    /// The stage this error is attributed to, when one applies.
    pub fn stage(&self) -> Option<&'static str> {
        match self {
            PipelineError::MissingInstruction { stage, .. }
            | PipelineError::StageFailed { stage, .. }
            | PipelineError::StageTimeout { stage, .. } => Some(stage),
            PipelineError::Storage(_) | PipelineError::Session { .. } => None,
        }
    }

    pub(crate) fn session(err: anyhow::Error) -> Self {
        PipelineError::Session {
            message: format!("{:#}", err),
        }
    }
}
