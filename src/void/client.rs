//! HTTPS text completion against OpenAI chat completions or Anthropic messages.
//!
//! Each call is one request wrapped in [`tokio::time::timeout`]; the timeout covers both
//! sending and reading the body. Non-success statuses surface as [`VoidError::Api`] with a
//! one-line preview of the body.

use super::errors::VoidError;
use super::TextCompletion;
use crate::config::GeneratorConfig;
use crate::logutil::preview;
use log::debug;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::timeout;

pub const SYSTEM_PROMPT: &str =
    "You are a creative system that generates unique artifacts with ASCII art and detailed descriptions";

const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    OpenAi,
    Anthropic,
}

impl Provider {
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "openai" => Some(Provider::OpenAi),
            "anthropic" => Some(Provider::Anthropic),
            _ => None,
        }
    }

    pub fn default_model(self) -> &'static str {
        match self {
            Provider::OpenAi => "gpt-4",
            Provider::Anthropic => "claude-3-opus-20240229",
        }
    }

    pub fn default_base_url(self) -> &'static str {
        match self {
            Provider::OpenAi => "https://api.openai.com",
            Provider::Anthropic => "https://api.anthropic.com",
        }
    }

    fn endpoint(self) -> &'static str {
        match self {
            Provider::OpenAi => "/v1/chat/completions",
            Provider::Anthropic => "/v1/messages",
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    fn new(role: &str, content: &str) -> Self {
        Self {
            role: role.to_string(),
            content: content.to_string(),
        }
    }
}

#[derive(Serialize, Debug)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize, Debug)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize, Debug)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize, Debug)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Serialize, Debug)]
struct MessagesRequest<'a> {
    model: &'a str,
    system: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<ChatMessage>,
}

#[derive(Deserialize, Debug)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize, Debug)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

pub struct LlmClient {
    provider: Provider,
    api_key: String,
    model: String,
    base_url: String,
    max_tokens: u32,
    temperature: f32,
    timeout_seconds: u32,
    client: reqwest::Client,
}

impl LlmClient {
    /// Build a client from the `[generator]` section. Fails early on an unknown provider or a
    /// missing key so the game can say so before charging anything.
    pub fn from_config(config: &GeneratorConfig) -> Result<Self, VoidError> {
        let provider = Provider::parse(&config.provider)
            .ok_or_else(|| VoidError::UnsupportedProvider(config.provider.clone()))?;
        let api_key = config
            .resolve_api_key()
            .ok_or(VoidError::MissingApiKey(config.api_key_env_var()))?;
        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| provider.default_base_url().to_string());

        Ok(Self {
            provider,
            api_key,
            model: config
                .model
                .clone()
                .unwrap_or_else(|| provider.default_model().to_string()),
            base_url: base_url.trim_end_matches('/').to_string(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            timeout_seconds: config.timeout_seconds,
            client: reqwest::Client::new(),
        })
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn url(&self) -> String {
        format!("{}{}", self.base_url, self.provider.endpoint())
    }

    fn request_body(&self, prompt: &str) -> Result<String, VoidError> {
        let body = match self.provider {
            Provider::OpenAi => serde_json::to_string(&ChatCompletionRequest {
                model: &self.model,
                messages: vec![
                    ChatMessage::new("system", SYSTEM_PROMPT),
                    ChatMessage::new("user", prompt),
                ],
                max_tokens: self.max_tokens,
                temperature: self.temperature,
            }),
            Provider::Anthropic => serde_json::to_string(&MessagesRequest {
                model: &self.model,
                system: SYSTEM_PROMPT,
                max_tokens: self.max_tokens,
                temperature: self.temperature,
                messages: vec![ChatMessage::new("user", prompt)],
            }),
        };
        body.map_err(|e| VoidError::Parse(e.to_string()))
    }

    async fn exchange(&self, body: String) -> Result<(u16, String), VoidError> {
        let request = self
            .client
            .post(self.url())
            .header(reqwest::header::CONTENT_TYPE, "application/json");
        let request = match self.provider {
            Provider::OpenAi => request.bearer_auth(&self.api_key),
            Provider::Anthropic => request
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", ANTHROPIC_VERSION),
        };

        let response = request
            .body(body)
            .send()
            .await
            .map_err(|e| VoidError::Transport(e.to_string()))?;
        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| VoidError::Transport(e.to_string()))?;
        Ok((status, text))
    }
}

impl TextCompletion for LlmClient {
    async fn complete(&self, prompt: &str) -> Result<String, VoidError> {
        let body = self.request_body(prompt)?;
        debug!(
            "requesting completion from {} ({:?}, {} prompt chars)",
            self.url(),
            self.provider,
            prompt.chars().count()
        );

        let timeout_duration = Duration::from_secs(self.timeout_seconds as u64);
        let (status, text) = timeout(timeout_duration, self.exchange(body))
            .await
            .map_err(|_| VoidError::Timeout(self.timeout_seconds))??;

        if !(200..300).contains(&status) {
            return Err(VoidError::Api {
                status,
                body: preview(&text, 200),
            });
        }
        extract_text(self.provider, &text)
    }
}

/// Pull the generated text out of a provider response body.
pub fn extract_text(provider: Provider, body: &str) -> Result<String, VoidError> {
    let text = match provider {
        Provider::OpenAi => {
            let response: ChatCompletionResponse =
                serde_json::from_str(body).map_err(|e| VoidError::Parse(e.to_string()))?;
            response
                .choices
                .into_iter()
                .next()
                .and_then(|c| c.message.content)
        }
        Provider::Anthropic => {
            let response: MessagesResponse =
                serde_json::from_str(body).map_err(|e| VoidError::Parse(e.to_string()))?;
            let joined: String = response
                .content
                .into_iter()
                .filter_map(|block| block.text)
                .collect();
            Some(joined)
        }
    };
    match text {
        Some(t) if !t.trim().is_empty() => Ok(t),
        _ => Err(VoidError::EmptyResponse),
    }
}
