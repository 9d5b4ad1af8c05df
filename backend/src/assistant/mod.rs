pub mod dto;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

use crate::error::AppError;

pub use dto::{ChatMessage, Role};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o-mini";
const MAX_REPLY_TOKENS: u32 = 800;
pub const MAX_CONVERSATION_MESSAGES: usize = 20;

const SYSTEM_PROMPT: &str =
    "You are a patient assistant that explains investing basics in plain, accessible language.";

#[derive(Clone, Debug)]
pub struct AssistantConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
}

impl AssistantConfig {
    /// `None` when `LLM_API_KEY` is unset or blank, which disables the assistant.
    pub fn from_lookup<F>(lookup: &F) -> Option<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("LLM_API_KEY").filter(|key| !key.trim().is_empty())?;
        let base_url = lookup("LLM_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let model = lookup("LLM_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());

        Some(Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
        })
    }
}

#[async_trait]
pub trait AssistantClient: Send + Sync {
    async fn reply(&self, messages: &[ChatMessage]) -> Result<String, AppError>;
}

/// Rejects conversations the upstream model should never see.
pub fn validate_conversation(messages: &[ChatMessage]) -> Result<(), AppError> {
    if messages.is_empty() {
        return Err(AppError::BadRequest("conversation is empty".to_string()));
    }
    if messages.len() > MAX_CONVERSATION_MESSAGES {
        return Err(AppError::BadRequest(format!(
            "conversation exceeds {} messages",
            MAX_CONVERSATION_MESSAGES
        )));
    }
    for message in messages {
        if message.role == Role::System {
            return Err(AppError::BadRequest("system messages are not accepted".to_string()));
        }
        if message.content.trim().is_empty() {
            return Err(AppError::BadRequest("message content is empty".to_string()));
        }
    }
    Ok(())
}

pub struct HttpAssistantClient {
    client: Client,
    config: AssistantConfig,
}

impl HttpAssistantClient {
    pub fn new(config: AssistantConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .build()
            .map_err(|e| AppError::Unavailable(format!("Failed to build http client: {}", e)))?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl AssistantClient for HttpAssistantClient {
    async fn reply(&self, messages: &[ChatMessage]) -> Result<String, AppError> {
        let url = format!("{}/chat/completions", self.config.base_url);

        let mut conversation = Vec::with_capacity(messages.len() + 1);
        conversation.push(ChatMessage {
            role: Role::System,
            content: SYSTEM_PROMPT.to_string(),
        });
        conversation.extend_from_slice(messages);

        let request_body = dto::ChatCompletionRequest {
            model: &self.config.model,
            messages: conversation,
            max_tokens: MAX_REPLY_TOKENS,
        };

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(&request_body)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Upstream(format!("LLM API error {}: {}", status, body)));
        }

        let parsed: dto::ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("Failed to parse LLM response: {}", e)))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| AppError::Upstream("LLM returned an empty reply".to_string()))?;

        debug!("assistant replied with {} chars", content.len());
        Ok(content)
    }
}

/// Stands in when no API key is configured.
pub struct DisabledAssistant;

#[async_trait]
impl AssistantClient for DisabledAssistant {
    async fn reply(&self, _messages: &[ChatMessage]) -> Result<String, AppError> {
        warn!("assistant request rejected: no LLM_API_KEY configured");
        Err(AppError::Unavailable("assistant is not configured".to_string()))
    }
}
