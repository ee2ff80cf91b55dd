//! Stage definitions. Each stage loads its instruction from the prompt store
//! at construction time; a missing instruction aborts the run before any LLM
//! call is made.

use crate::core::llm::ChatMessage;
use crate::core::store::{PromptScope, Store, StoreError};

use super::types::{KEY_CONSTRUCTION_RISK_REPORT, KEY_FIRE_RISK_REPORT, PipelineError};

pub const STAGE_FIRE_RISK: &str = "fire_risk_agent";
pub const STAGE_CONSTRUCTION_RISK: &str = "construction_risk_agent";
pub const STAGE_RISK_SUMMARY: &str = "risk_summary_agent";

pub const PROMPT_FIRE_RISK_INSTRUCTION: &str = "fire_risk_agent_instruction";
pub const PROMPT_CONSTRUCTION_RISK_INSTRUCTION: &str = "construction_risk_agent_instruction";
pub const PROMPT_RISK_SUMMARY_INSTRUCTION: &str = "risk_summary_agent_instruction";

const ANALYSIS_REQUEST: &str = "Analyse content for risks and hazards";

pub struct Stage {
    pub name: &'static str,
    /// State key the stage's output is written under. The summarizer has
    /// none: its output is the pipeline's result.
    pub output_key: Option<&'static str>,
    instruction: String,
}

impl Stage {
    async fn load(
        store: &Store,
        scope: &PromptScope,
        name: &'static str,
        prompt_name: &str,
        output_key: Option<&'static str>,
    ) -> Result<Self, PipelineError> {
        let instruction = store
            .get_latest_prompt(prompt_name, &scope.app_name, &scope.region)
            .await
            .map_err(|e| match e {
                StoreError::NotFound { .. } => PipelineError::MissingInstruction {
                    stage: name,
                    message: e.to_string(),
                },
                other => PipelineError::Storage(other),
            })?;
        Ok(Self {
            name,
            output_key,
            instruction,
        })
    }

    pub async fn fire_risk(store: &Store, scope: &PromptScope) -> Result<Self, PipelineError> {
        Self::load(
            store,
            scope,
            STAGE_FIRE_RISK,
            PROMPT_FIRE_RISK_INSTRUCTION,
            Some(KEY_FIRE_RISK_REPORT),
        )
        .await
    }

    pub async fn construction_risk(
        store: &Store,
        scope: &PromptScope,
    ) -> Result<Self, PipelineError> {
        Self::load(
            store,
            scope,
            STAGE_CONSTRUCTION_RISK,
            PROMPT_CONSTRUCTION_RISK_INSTRUCTION,
            Some(KEY_CONSTRUCTION_RISK_REPORT),
        )
        .await
    }

    pub async fn risk_summary(store: &Store, scope: &PromptScope) -> Result<Self, PipelineError> {
        Self::load(
            store,
            scope,
            STAGE_RISK_SUMMARY,
            PROMPT_RISK_SUMMARY_INSTRUCTION,
            None,
        )
        .await
    }

    /// Conversation for an analysis stage: the stored instruction plus the
    /// fixed user request. The video payload rides alongside as inline media.
    pub fn analysis_messages(&self) -> Vec<ChatMessage> {
        vec![
            ChatMessage {
                role: "system".to_string(),
                content: self.instruction.clone(),
            },
            ChatMessage {
                role: "user".to_string(),
                content: ANALYSIS_REQUEST.to_string(),
            },
        ]
    }

    /// Conversation for the summary stage over the two collected reports.
    pub fn summary_messages(
        &self,
        fire_risk_report: &str,
        construction_risk_report: &str,
    ) -> Vec<ChatMessage> {
        vec![
            ChatMessage {
                role: "system".to_string(),
                content: self.instruction.clone(),
            },
            ChatMessage {
                role: "user".to_string(),
                content: format!(
                    "Fire risk report:\n{}\n\nConstruction risk report:\n{}",
                    fire_risk_report, construction_risk_report
                ),
            },
        ]
    }
}
