//! Process configuration, resolved once at startup.
//!
//! Every environment read happens here; the storage and pipeline layers only
//! ever see the resulting [`AppConfig`] value.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};

use crate::core::store::PromptScope;

pub const DEFAULT_APP_NAME: &str = "Video_Risk_Assessment";
pub const DEFAULT_REGION: &str = "us-central1";

const DEFAULT_API_PORT: u16 = 8000;
const DEFAULT_LLM_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_STAGE_TIMEOUT_SECS: u64 = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmProviderKind {
    Google,
    OpenAi,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Default (app_name, region) scope applied when a request omits one.
    pub scope: PromptScope,
    pub db_path: PathBuf,
    pub api_host: String,
    pub api_port: u16,
    pub llm_provider: LlmProviderKind,
    pub llm_model: String,
    pub google_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    /// Upper bound on a single analysis/summary stage, in seconds.
    pub stage_timeout_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let scope = PromptScope {
            app_name: env_or("APP_NAME", DEFAULT_APP_NAME),
            region: env_or("REGION", DEFAULT_REGION),
        };

        let db_path = match std::env::var_os("DATABASE_PATH") {
            Some(p) => PathBuf::from(p),
            None => default_data_dir().join("vra.db"),
        };

        let api_host = env_or("API_HOST", "127.0.0.1");
        let api_port = match std::env::var("API_PORT") {
            Ok(raw) => raw
                .parse::<u16>()
                .with_context(|| format!("API_PORT is not a valid port: '{}'", raw))?,
            Err(_) => DEFAULT_API_PORT,
        };

        let llm_provider = match env_or("LLM_PROVIDER", "google").to_lowercase().as_str() {
            "google" | "gemini" => LlmProviderKind::Google,
            "openai" => LlmProviderKind::OpenAi,
            other => bail!("unsupported LLM_PROVIDER: '{}'", other),
        };

        let stage_timeout_secs = match std::env::var("STAGE_TIMEOUT_SECS") {
            Ok(raw) => raw
                .parse::<u64>()
                .with_context(|| format!("STAGE_TIMEOUT_SECS is not a number: '{}'", raw))?,
            Err(_) => DEFAULT_STAGE_TIMEOUT_SECS,
        };

        Ok(Self {
            scope,
            db_path,
            api_host,
            api_port,
            llm_provider,
            llm_model: env_or("LLM_MODEL", DEFAULT_LLM_MODEL),
            google_api_key: std::env::var("GOOGLE_API_KEY").ok(),
            openai_api_key: std::env::var("OPENAI_API_KEY").ok(),
            stage_timeout_secs,
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    match std::env::var(key) {
        Ok(v) if !v.trim().is_empty() => v,
        _ => default.to_string(),
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("vra")
}
