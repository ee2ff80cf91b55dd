use anyhow::{Result, anyhow};
use async_trait::async_trait;
use base64::Engine as _;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::core::llm::{ChatMessage, LlmProvider, MediaBlob, ProviderType};

#[derive(Serialize)]
struct GeminiRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    contents: Vec<GeminiContent>,
}

#[derive(Serialize)]
struct GeminiContent {
    role: String,
    parts: Vec<GeminiPart>,
}

#[derive(Serialize)]
struct GeminiPart {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<GeminiInlineData>,
}

impl GeminiPart {
    fn text(content: &str) -> Self {
        Self {
            text: Some(content.to_string()),
            inline_data: None,
        }
    }
}

#[derive(Serialize)]
struct GeminiInlineData {
    mime_type: String,
    data: String,
}

#[derive(Deserialize)]
struct GeminiResponse {
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: GeminiResContent,
}

#[derive(Deserialize)]
struct GeminiResContent {
    parts: Vec<GeminiResPart>,
}

#[derive(Deserialize)]
struct GeminiResPart {
    text: String,
}

pub struct GoogleProvider {
    api_key: String,
    client: Client,
}

impl GoogleProvider {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            client: Client::new(),
        }
    }
}

#[async_trait]
impl LlmProvider for GoogleProvider {
    fn provider_type(&self) -> ProviderType {
        ProviderType::Google
    }

    async fn generate(
        &self,
        model_id: &str,
        messages: &[ChatMessage],
        media: Option<&MediaBlob>,
    ) -> Result<String> {
        let mut contents: Vec<GeminiContent> = Vec::new();
        let mut system_instruction: Option<GeminiContent> = None;

        // Leading system messages become system_instruction; the rest map to
        // alternating user/model turns (consecutive same-role entries merge).
        for m in messages {
            if m.role == "system" && contents.is_empty() {
                if let Some(ref mut si) = system_instruction {
                    if let Some(part) = si.parts.first_mut()
                        && let Some(ref mut text) = part.text
                    {
                        text.push('\n');
                        text.push_str(&m.content);
                    }
                } else {
                    system_instruction = Some(GeminiContent {
                        role: "user".to_string(), // ignored for system_instruction but required
                        parts: vec![GeminiPart::text(&m.content)],
                    });
                }
                continue;
            }

            let gemini_role = if m.role == "assistant" { "model" } else { "user" };
            let should_merge = contents
                .last()
                .map(|c: &GeminiContent| c.role == gemini_role)
                .unwrap_or(false);

            if should_merge {
                if let Some(last) = contents.last_mut()
                    && let Some(part) = last.parts.first_mut()
                    && let Some(ref mut text) = part.text
                {
                    text.push('\n');
                    text.push_str(&m.content);
                }
            } else {
                contents.push(GeminiContent {
                    role: gemini_role.to_string(),
                    parts: vec![GeminiPart::text(&m.content)],
                });
            }
        }

        // Attach the payload to the last user turn as inline data.
        if let Some(blob) = media {
            let inline = GeminiPart {
                text: None,
                inline_data: Some(GeminiInlineData {
                    mime_type: blob.mime_type.clone(),
                    data: base64::engine::general_purpose::STANDARD.encode(&blob.data),
                }),
            };
            match contents.iter_mut().rev().find(|c| c.role == "user") {
                Some(turn) => turn.parts.push(inline),
                None => contents.push(GeminiContent {
                    role: "user".to_string(),
                    parts: vec![inline],
                }),
            }
        }

        let req = GeminiRequest {
            system_instruction,
            contents,
        };
        let url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent?key={}",
            model_id, self.api_key
        );
        let res = self.client.post(&url).json(&req).send().await?;
        if !res.status().is_success() {
            return Err(anyhow!(
                "Google Gemini API Error: {}",
                res.text().await.unwrap_or_default()
            ));
        }
        let parsed: GeminiResponse = res.json().await?;
        Ok(parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .unwrap_or_default())
    }
}
