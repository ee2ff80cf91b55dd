pub mod providers;

use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

use crate::config::{AppConfig, LlmProviderKind};

#[derive(Debug, Clone, PartialEq)]
pub enum ProviderType {
    OpenAI,
    Google,
}

#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

/// An uploaded payload forwarded to the model as inline media.
#[derive(Debug, Clone)]
pub struct MediaBlob {
    pub mime_type: String,
    pub data: Vec<u8>,
}

#[async_trait]
pub trait LlmProvider: Send + Sync {
    fn provider_type(&self) -> ProviderType;

    // Execute a prompt against a selected model using a structured
    // conversation history, optionally carrying an inline media payload.
    async fn generate(
        &self,
        model_id: &str,
        messages: &[ChatMessage],
        media: Option<&MediaBlob>,
    ) -> Result<String>;
}

pub struct LlmManager {
    providers: Vec<Box<dyn LlmProvider>>,
    selected_provider: Option<ProviderType>,
    selected_model: Option<String>,
}

impl LlmManager {
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
            selected_provider: None,
            selected_model: None,
        }
    }

    /// Build a manager with the provider and model the config selects.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let mut manager = Self::new();
        match config.llm_provider {
            LlmProviderKind::Google => {
                let key = config.google_api_key.clone().ok_or_else(|| {
                    anyhow::anyhow!("GOOGLE_API_KEY is required when LLM_PROVIDER is google")
                })?;
                manager.register_provider(Box::new(providers::GoogleProvider::new(key)));
                manager.set_active(ProviderType::Google, config.llm_model.clone());
            }
            LlmProviderKind::OpenAi => {
                let key = config.openai_api_key.clone().ok_or_else(|| {
                    anyhow::anyhow!("OPENAI_API_KEY is required when LLM_PROVIDER is openai")
                })?;
                manager.register_provider(Box::new(providers::OpenAiProvider::new(key)));
                manager.set_active(ProviderType::OpenAI, config.llm_model.clone());
            }
        }
        Ok(manager)
    }

    pub fn register_provider(&mut self, provider: Box<dyn LlmProvider>) {
        info!("Registered LLM Provider: {:?}", provider.provider_type());
        self.providers.push(provider);
    }

    pub fn set_active(&mut self, provider: ProviderType, model_id: String) {
        info!("Setting active LLM: {:?} ({})", provider, model_id);
        self.selected_provider = Some(provider);
        self.selected_model = Some(model_id);
    }

    pub fn get_provider(&self, pt: ProviderType) -> Option<&dyn LlmProvider> {
        self.providers
            .iter()
            .find(|p| p.provider_type() == pt)
            .map(|p| p.as_ref())
    }

    pub async fn generate_with_selected(
        &self,
        messages: &[ChatMessage],
        media: Option<&MediaBlob>,
    ) -> Result<String> {
        let provider_type = self
            .selected_provider
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("No LLM Provider selected"))?;

        let model_id = self
            .selected_model
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("No LLM Model selected"))?;

        let provider = self
            .get_provider(provider_type.clone())
            .ok_or_else(|| anyhow::anyhow!("Selected provider not found in registry"))?;

        provider.generate(model_id, messages, media).await
    }
}
