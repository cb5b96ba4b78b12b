//! Language model adapters.
//!
//! `OpenAiChatModel` speaks the chat-completions protocol, which most hosted and
//! local inference servers also expose, so pointing `base_url` elsewhere is
//! enough to switch vendors.

use crate::config::toml_config::LlmSettings;
use crate::domain::model::{ChatMessage, CompletionRequest};
use crate::domain::ports::LanguageModel;
use crate::utils::error::{Result, TrainerError};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Serialize)]
struct ChatCompletionBody<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    max_tokens: u32,
    temperature: f32,
    n: u32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

pub struct OpenAiChatModel {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

impl OpenAiChatModel {
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            model: model.into(),
        }
    }

    pub fn from_settings(settings: &LlmSettings) -> Self {
        Self::new(
            settings.base_url.clone(),
            settings.api_key.clone(),
            settings.model.clone(),
            Duration::from_secs(settings.request_timeout_seconds),
        )
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url)
    }
}

#[async_trait]
impl LanguageModel for OpenAiChatModel {
    fn name(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let body = ChatCompletionBody {
            model: &self.model,
            messages: &request.messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            n: 1,
        };

        let mut builder = self.client.post(self.endpoint()).json(&body);
        if let Some(key) = self.api_key.as_deref().filter(|k| !k.is_empty()) {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(TrainerError::provider(
                "openai",
                format!("HTTP {}: {}", status, error_text),
            ));
        }

        let parsed: ChatCompletionResponse = response.json().await?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| TrainerError::provider("openai", "No text in response"))
    }
}

/// Never answers, so the agent always uses its heuristic replies.
pub struct OfflineModel;

#[async_trait]
impl LanguageModel for OfflineModel {
    fn name(&self) -> &str {
        "offline"
    }

    async fn complete(&self, _request: &CompletionRequest) -> Result<String> {
        Err(TrainerError::provider("offline", "no language model configured"))
    }
}

const HOSTED_OPENAI: &str = "api.openai.com";

/// The hosted API rejects keyless calls; self-hosted compatible servers may not need a key.
fn requires_api_key(settings: &LlmSettings) -> bool {
    let keyless = settings
        .api_key
        .as_deref()
        .map_or(true, |k| k.trim().is_empty());
    keyless
        && url::Url::parse(&settings.base_url)
            .ok()
            .and_then(|u| u.host_str().map(|h| h == HOSTED_OPENAI))
            .unwrap_or(false)
}

pub fn build_language_model(settings: &LlmSettings) -> Result<Arc<dyn LanguageModel>> {
    match settings.provider.trim().to_ascii_lowercase().as_str() {
        "openai" if requires_api_key(settings) => Err(TrainerError::MissingConfigError {
            field: "llm.api_key".to_string(),
        }),
        "openai" => Ok(Arc::new(OpenAiChatModel::from_settings(settings))),
        "offline" | "heuristic" | "none" => Ok(Arc::new(OfflineModel)),
        other => Err(TrainerError::UnsupportedProvider {
            kind: "LLM".to_string(),
            name: other.to_string(),
        }),
    }
}
