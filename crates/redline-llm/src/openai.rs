use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::errors::CapabilityError;
use crate::provider::CompletionProvider;
use crate::types::{Completion, CompletionRequest, Usage};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Clone, Debug, PartialEq)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub base_url: String,
    pub organization: Option<String>,
    pub timeout: Duration,
}

impl OpenAiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            organization: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Read configuration from `OPENAI_API_KEY`, `OPENAI_BASE_URL` and
    /// `OPENAI_ORG_ID`. Returns `None` when no API key is set.
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("OPENAI_API_KEY").ok()?;
        let base_url =
            std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let organization = std::env::var("OPENAI_ORG_ID").ok();
        Some(Self {
            api_key,
            base_url,
            organization,
            timeout: DEFAULT_TIMEOUT,
        })
    }
}

/// Chat-completions adapter for OpenAI-compatible endpoints.
pub struct OpenAiProvider {
    config: OpenAiConfig,
    http: reqwest::Client,
}

impl OpenAiProvider {
    pub fn new(config: OpenAiConfig) -> Result<Self, CapabilityError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self { config, http })
    }

    pub fn from_env() -> Result<Option<Self>, CapabilityError> {
        match OpenAiConfig::from_env() {
            Some(config) => Ok(Some(Self::new(config)?)),
            None => Ok(None),
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }
}

fn request_payload(request: &CompletionRequest) -> Value {
    let mut payload = json!({
        "model": request.model,
        "messages": [
            { "role": "system", "content": request.system },
            { "role": "user", "content": request.prompt },
        ],
    });
    if let Some(max_tokens) = request.max_tokens {
        payload["max_tokens"] = json!(max_tokens);
    }
    if let Some(temperature) = request.temperature {
        payload["temperature"] = json!(temperature);
    }
    payload
}

#[derive(Debug, Deserialize)]
struct ChatCompletionBody {
    #[serde(default)]
    model: String,
    #[serde(default)]
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ChatUsage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
    #[serde(default)]
    total_tokens: u64,
}

#[async_trait]
impl CompletionProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<Completion, CapabilityError> {
        let mut builder = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&request_payload(&request));
        if let Some(organization) = self.config.organization.as_deref() {
            builder = builder.header("OpenAI-Organization", organization);
        }

        let timeout = self.config.timeout;
        let response = builder.send().await.map_err(|error| {
            if error.is_timeout() {
                CapabilityError::Timeout(timeout)
            } else {
                CapabilityError::from(error)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(CapabilityError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: ChatCompletionBody = response.json().await.map_err(|error| {
            if error.is_timeout() {
                CapabilityError::Timeout(timeout)
            } else {
                CapabilityError::from(error)
            }
        })?;

        let text = body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.is_empty())
            .ok_or(CapabilityError::EmptyCompletion)?;

        let usage = body.usage.unwrap_or_default();
        let model = if body.model.is_empty() {
            request.model
        } else {
            body.model
        };

        Ok(Completion {
            text,
            model,
            usage: Usage {
                input_tokens: usage.prompt_tokens,
                output_tokens: usage.completion_tokens,
                total_tokens: usage.total_tokens,
            },
        })
    }
}
