use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Result, anyhow};
use async_trait::async_trait;

use crate::config::{AppConfig, LlmProviderKind};
use crate::core::llm::{ChatMessage, LlmManager, LlmProvider, MediaBlob, ProviderType};
use crate::core::pipeline::stages::STAGE_CONSTRUCTION_RISK;
use crate::core::pipeline::{Pipeline, PipelineError, SessionState};
use crate::core::store::{PromptScope, Store, seed_default_prompts};

const FIRE_REPORT: &str = "FIRE_REPORT: no ignition sources visible";
const CONSTRUCTION_REPORT: &str = "CONSTRUCTION_REPORT: unguarded scaffolding edge";

/// Routes on the stored instructions the stages were constructed from, so the
/// test observes exactly what each stage sent.
struct ScriptedProvider {
    summary_inputs: Arc<Mutex<Vec<String>>>,
    fail_construction: bool,
    analysis_delay: Option<Duration>,
}

impl ScriptedProvider {
    fn new() -> Self {
        Self {
            summary_inputs: Arc::new(Mutex::new(Vec::new())),
            fail_construction: false,
            analysis_delay: None,
        }
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn provider_type(&self) -> ProviderType {
        ProviderType::Google
    }

    async fn generate(
        &self,
        _model_id: &str,
        messages: &[ChatMessage],
        _media: Option<&MediaBlob>,
    ) -> Result<String> {
        let instruction = messages
            .iter()
            .find(|m| m.role == "system")
            .map(|m| m.content.as_str())
            .unwrap_or_default();

        if let Some(delay) = self.analysis_delay {
            tokio::time::sleep(delay).await;
        }

        if instruction.contains("Fire Safety Officer") {
            Ok(FIRE_REPORT.to_string())
        } else if instruction.contains("Construction Safety Manager") {
            if self.fail_construction {
                Err(anyhow!("model refused the request"))
            } else {
                Ok(CONSTRUCTION_REPORT.to_string())
            }
        } else if instruction.contains("final report generator") {
            let user_input = messages
                .iter()
                .find(|m| m.role == "user")
                .map(|m| m.content.clone())
                .unwrap_or_default();
            self.summary_inputs.lock().unwrap().push(user_input);
            Ok("Both analyses look reassuring overall.".to_string())
        } else {
            Err(anyhow!("unexpected instruction: {}", instruction))
        }
    }
}

fn test_config(stage_timeout_secs: u64) -> AppConfig {
    AppConfig {
        scope: PromptScope {
            app_name: "Video_Risk_Assessment".to_string(),
            region: "us-central1".to_string(),
        },
        db_path: std::path::PathBuf::from(":memory:"),
        api_host: "127.0.0.1".to_string(),
        api_port: 18000,
        llm_provider: LlmProviderKind::Google,
        llm_model: "gemini-2.5-flash".to_string(),
        google_api_key: None,
        openai_api_key: None,
        stage_timeout_secs,
    }
}

fn payload() -> MediaBlob {
    MediaBlob {
        mime_type: "video/mp4".to_string(),
        data: b"not-really-a-video".to_vec(),
    }
}

async fn pipeline_with(provider: ScriptedProvider, stage_timeout_secs: u64) -> (Pipeline, Store) {
    let config = test_config(stage_timeout_secs);
    let store = Store::open_in_memory().expect("in-memory store");
    seed_default_prompts(&store, &config.scope)
        .await
        .expect("seed prompts");

    let mut llm = LlmManager::new();
    llm.register_provider(Box::new(provider));
    llm.set_active(ProviderType::Google, config.llm_model.clone());

    (Pipeline::new(store.clone(), Arc::new(llm), &config), store)
}

#[tokio::test]
async fn both_reports_are_present_before_the_summarizer_observes_state() {
    let provider = ScriptedProvider::new();
    let summary_inputs = provider.summary_inputs.clone();
    let (pipeline, store) = pipeline_with(provider, 5).await;

    // risk_type nominally selects one analyzer, but both always run.
    let outcome = pipeline.run("u1", "fire", payload()).await.unwrap();
    assert_eq!(outcome.summary, "Both analyses look reassuring overall.");

    let inputs = summary_inputs.lock().unwrap();
    assert_eq!(inputs.len(), 1);
    assert!(inputs[0].contains(FIRE_REPORT));
    assert!(inputs[0].contains(CONSTRUCTION_REPORT));
    drop(inputs);

    let session = store
        .get_session(&outcome.session_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(session.status, "complete");
    let state: SessionState = serde_json::from_str(&session.state_json).unwrap();
    assert_eq!(state.fire_risk_report(), Some(FIRE_REPORT));
    assert_eq!(state.construction_risk_report(), Some(CONSTRUCTION_REPORT));
    assert_eq!(state.risk_type(), Some("fire"));
}

#[tokio::test]
async fn every_stage_emits_entry_and_exit_events() {
    let (pipeline, store) = pipeline_with(ScriptedProvider::new(), 5).await;
    let outcome = pipeline.run("u1", "fire", payload()).await.unwrap();

    let events = store
        .get_session_events(&outcome.session_id)
        .await
        .unwrap();
    assert_eq!(events.len(), 6);
    for stage in [
        "fire_risk_agent",
        "construction_risk_agent",
        "risk_summary_agent",
    ] {
        for phase in ["entered", "finished"] {
            assert!(
                events.iter().any(|e| e.stage == stage && e.phase == phase),
                "missing {} event for {}",
                phase,
                stage
            );
        }
    }
    // The summarizer only enters after both analyzers have finished.
    let summary_entry = events
        .iter()
        .position(|e| e.stage == "risk_summary_agent" && e.phase == "entered")
        .unwrap();
    for stage in ["fire_risk_agent", "construction_risk_agent"] {
        let finished = events
            .iter()
            .position(|e| e.stage == stage && e.phase == "finished")
            .unwrap();
        assert!(finished < summary_entry);
    }
}

#[tokio::test]
async fn failed_analysis_stage_marks_the_session_failed() {
    let mut provider = ScriptedProvider::new();
    provider.fail_construction = true;
    let (pipeline, store) = pipeline_with(provider, 5).await;

    let failure = pipeline.run("u1", "fire", payload()).await.unwrap_err();
    assert!(matches!(
        failure.error,
        PipelineError::StageFailed { stage, .. } if stage == STAGE_CONSTRUCTION_RISK
    ));

    let session_id = failure.session_id.expect("session was created");
    let session = store.get_session(&session_id).await.unwrap().unwrap();
    assert_eq!(session.status, "failed");
    assert!(
        session
            .error
            .as_deref()
            .unwrap()
            .contains("model refused the request")
    );
}

#[tokio::test]
async fn missing_instruction_fails_before_a_session_exists() {
    let config = test_config(5);
    let store = Store::open_in_memory().expect("in-memory store");
    // No seeding: stage construction must fail up front.
    let mut llm = LlmManager::new();
    llm.register_provider(Box::new(ScriptedProvider::new()));
    llm.set_active(ProviderType::Google, config.llm_model.clone());
    let pipeline = Pipeline::new(store, Arc::new(llm), &config);

    let failure = pipeline.run("u1", "fire", payload()).await.unwrap_err();
    assert!(failure.session_id.is_none());
    assert!(matches!(
        failure.error,
        PipelineError::MissingInstruction { .. }
    ));
}

#[tokio::test]
async fn slow_stage_surfaces_as_timeout() {
    let mut provider = ScriptedProvider::new();
    provider.analysis_delay = Some(Duration::from_secs(10));
    let (pipeline, store) = pipeline_with(provider, 1).await;

    let failure = pipeline.run("u1", "fire", payload()).await.unwrap_err();
    assert!(matches!(
        failure.error,
        PipelineError::StageTimeout { seconds: 1, .. }
    ));

    let session_id = failure.session_id.expect("session was created");
    let session = store.get_session(&session_id).await.unwrap().unwrap();
    assert_eq!(session.status, "failed");
}
