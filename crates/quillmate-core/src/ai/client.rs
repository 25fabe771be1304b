use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::error::GatewayError;

/// Which gateway operation produced a request. Used for logging and by test fakes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiOperation {
    Summarize,
    Translate,
    Explain,
    AskQuestion,
    Optimize,
    GenerateTags,
}

/// One chat-completion call: a system message, a user message and sampling limits.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub operation: AiOperation,
    pub system_prompt: String,
    pub user_prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// Transport behind the gateway. The HTTP client implements it; tests substitute fakes.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, GatewayError>;
}

#[derive(Serialize)]
struct ChatCompletionMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatCompletionMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatCompletionChoice {
    message: ChatCompletionResponseMessage,
}

#[derive(Deserialize)]
struct ChatCompletionResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatCompletionChoice>,
}

/// Client for any OpenAI-style `/chat/completions` endpoint (OpenAI, DeepSeek).
#[derive(Clone)]
pub struct OpenAiCompatibleClient {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
    credential_env: &'static str,
}

impl OpenAiCompatibleClient {
    pub fn new(base_url: &str, model: &str, api_key: &str, credential_env: &'static str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: api_key.to_string(),
            credential_env,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn classify(&self, status: StatusCode, body: &str) -> GatewayError {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => GatewayError::Unauthorized {
                env_var: self.credential_env,
            },
            StatusCode::TOO_MANY_REQUESTS => GatewayError::RateLimited,
            s if s.is_server_error() => GatewayError::Server { status: s.as_u16() },
            s => {
                let excerpt: String = body.chars().take(200).collect();
                GatewayError::Unclassified(format!("status {}: {}", s.as_u16(), excerpt))
            }
        }
    }
}

#[async_trait]
impl ChatBackend for OpenAiCompatibleClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, GatewayError> {
        let body = ChatCompletionRequest {
            model: &self.model,
            messages: vec![
                ChatCompletionMessage {
                    role: "system",
                    content: &request.system_prompt,
                },
                ChatCompletionMessage {
                    role: "user",
                    content: &request.user_prompt,
                },
            ],
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        };

        debug!(
            operation = ?request.operation,
            model = %self.model,
            max_tokens = request.max_tokens,
            "sending chat completion"
        );

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            let error = self.classify(status, &text);
            warn!(operation = ?request.operation, %status, "chat completion failed");
            return Err(error);
        }

        let completion: ChatCompletionResponse = response.json().await?;
        Ok(completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default())
    }
}
