//! Stateless AI operations over a chat-completion backend.
//!
//! Every operation issues exactly one request and folds any failure into
//! [`AiResponse::error`]. Only [`AiGateway::try_generate_tags`] hands the
//! [`GatewayError`] back, since a tag list has nowhere to carry it. Nothing is
//! retried.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use super::client::{AiOperation, ChatBackend, CompletionRequest, OpenAiCompatibleClient};
use super::error::GatewayError;
use crate::config::AiSettings;
use crate::provider::Provider;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Zh,
    #[default]
    En,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExplainLevel {
    Beginner,
    #[default]
    Intermediate,
    Advanced,
}

impl ExplainLevel {
    fn label(&self, language: Language) -> &'static str {
        match (self, language) {
            (ExplainLevel::Beginner, Language::En) => "beginner",
            (ExplainLevel::Intermediate, Language::En) => "intermediate",
            (ExplainLevel::Advanced, Language::En) => "advanced",
            (ExplainLevel::Beginner, Language::Zh) => "初学者",
            (ExplainLevel::Intermediate, Language::Zh) => "中级",
            (ExplainLevel::Advanced, Language::Zh) => "高级",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OptimizeStyle {
    #[default]
    Formal,
    Casual,
    Academic,
    Creative,
}

impl OptimizeStyle {
    pub const NAMES: [&'static str; 4] = ["formal", "casual", "academic", "creative"];

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "formal" => Some(OptimizeStyle::Formal),
            "casual" => Some(OptimizeStyle::Casual),
            "academic" => Some(OptimizeStyle::Academic),
            "creative" => Some(OptimizeStyle::Creative),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OptimizeStyle::Formal => "formal",
            OptimizeStyle::Casual => "casual",
            OptimizeStyle::Academic => "academic",
            OptimizeStyle::Creative => "creative",
        }
    }

    fn description(&self) -> &'static str {
        match self {
            OptimizeStyle::Formal => "a formal, professional style",
            OptimizeStyle::Casual => "a relaxed, conversational style",
            OptimizeStyle::Academic => "a rigorous, academic style",
            OptimizeStyle::Creative => "a vivid, creative style",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummarizeOptions {
    pub max_length: u32,
    /// Falls back to the gateway's language when unset.
    pub language: Option<Language>,
}

impl Default for SummarizeOptions {
    fn default() -> Self {
        Self {
            max_length: DEFAULT_SUMMARY_LENGTH,
            language: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslateOptions {
    pub target_language: String,
    pub source_language: Option<String>,
}

impl TranslateOptions {
    pub fn to(target_language: impl Into<String>) -> Self {
        Self {
            target_language: target_language.into(),
            source_language: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExplainOptions {
    pub level: ExplainLevel,
    pub language: Option<Language>,
}

pub const DEFAULT_SUMMARY_LENGTH: u32 = 200;
pub const DEFAULT_TAG_COUNT: usize = 5;
pub const DEFAULT_TARGET_LANGUAGE: &str = "English";

/// Result of one AI call. On failure `content` is empty and `error` is set.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AiResponse {
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AiResponse {
    pub fn ok(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            content: String::new(),
            error: Some(error.into()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// The text to show a user: the error when there is one, otherwise the content.
    pub fn display_text(&self) -> &str {
        self.error.as_deref().unwrap_or(&self.content)
    }
}

#[derive(Clone)]
pub struct AiGateway {
    backend: Option<Arc<dyn ChatBackend>>,
    provider: Provider,
    language: Language,
}

impl AiGateway {
    /// Build the HTTP-backed gateway. Without a credential every call fails fast.
    pub fn new(settings: &AiSettings) -> Self {
        let backend = settings.api_key.as_deref().map(|key| {
            Arc::new(OpenAiCompatibleClient::new(
                &settings.base_url,
                &settings.model,
                key,
                settings.provider.endpoint().credential_env,
            )) as Arc<dyn ChatBackend>
        });
        if backend.is_none() {
            warn!(
                provider = settings.provider.as_str(),
                "no API key configured; AI features are disabled"
            );
        }
        Self {
            backend,
            provider: settings.provider,
            language: settings.language,
        }
    }

    pub fn with_backend(backend: Arc<dyn ChatBackend>, language: Language) -> Self {
        Self {
            backend: Some(backend),
            provider: Provider::default(),
            language,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.backend.is_some()
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub async fn summarize(&self, text: &str, options: SummarizeOptions) -> AiResponse {
        let language = options.language.unwrap_or(self.language);
        let max_length = options.max_length;
        let (system_prompt, user_prompt) = match language {
            Language::Zh => (
                "你是一个专业的文档总结助手，能够提取文本的核心要点并生成简洁的摘要。".to_string(),
                format!("请为以下文本生成一个简洁的摘要，不超过{max_length}字：\n\n{text}"),
            ),
            Language::En => (
                "You are a professional document summarization assistant that extracts the key points of a text and writes concise summaries.".to_string(),
                format!("Please write a concise summary of the following text, no more than {max_length} words:\n\n{text}"),
            ),
        };
        self.run(
            CompletionRequest {
                operation: AiOperation::Summarize,
                system_prompt,
                user_prompt,
                max_tokens: max_length.saturating_mul(2).min(500),
                temperature: 0.3,
            },
            "Unable to generate a summary.",
        )
        .await
    }

    pub async fn translate(&self, text: &str, options: &TranslateOptions) -> AiResponse {
        let target = &options.target_language;
        let user_prompt = match options.source_language.as_deref() {
            Some(source) => format!("Translate the following text from {source} into {target}:\n\n{text}"),
            None => format!("Translate the following text into {target}:\n\n{text}"),
        };
        self.run(
            CompletionRequest {
                operation: AiOperation::Translate,
                system_prompt: "You are a professional translator. Translate accurately and keep the meaning and tone of the original.".to_string(),
                user_prompt,
                max_tokens: 1000,
                temperature: 0.1,
            },
            "Translation failed.",
        )
        .await
    }

    pub async fn explain(&self, concept: &str, context: &str, options: ExplainOptions) -> AiResponse {
        let language = options.language.unwrap_or(self.language);
        let level = options.level.label(language);
        let (system_prompt, user_prompt) = match language {
            Language::Zh => {
                let context = if context.is_empty() {
                    String::new()
                } else {
                    format!("\n\n上下文：{context}")
                };
                (
                    "你是一个知识渊博的教育助手，擅长用简单易懂的方式解释复杂概念。".to_string(),
                    format!("请为{level}解释以下概念：\"{concept}\"{context}\n\n请提供清晰、易懂的解释，包括定义、应用场景和相关示例。"),
                )
            }
            Language::En => {
                let context = if context.is_empty() {
                    String::new()
                } else {
                    format!("\n\nContext: {context}")
                };
                (
                    "You are a knowledgeable educational assistant who explains complex concepts in simple, understandable ways.".to_string(),
                    format!("Please explain the following concept at a {level} level: \"{concept}\"{context}\n\nGive a clear explanation including a definition, use cases and relevant examples."),
                )
            }
        };
        self.run(
            CompletionRequest {
                operation: AiOperation::Explain,
                system_prompt,
                user_prompt,
                max_tokens: 800,
                temperature: 0.4,
            },
            "Unable to explain this concept.",
        )
        .await
    }

    pub async fn ask_question(&self, question: &str, context: &str) -> AiResponse {
        self.run(
            CompletionRequest {
                operation: AiOperation::AskQuestion,
                system_prompt: "You are a helpful assistant that answers questions based on the provided context. If the context does not contain enough information, say so honestly.".to_string(),
                user_prompt: format!("Answer the question based on the following context.\n\nContext:\n{context}\n\nQuestion: {question}"),
                max_tokens: 600,
                temperature: 0.2,
            },
            "Unable to answer this question.",
        )
        .await
    }

    pub async fn optimize_content(&self, text: &str, style: OptimizeStyle) -> AiResponse {
        self.run(
            CompletionRequest {
                operation: AiOperation::Optimize,
                system_prompt: "You are a professional editor who adjusts the style and wording of a text on request.".to_string(),
                user_prompt: format!(
                    "Rewrite the following text in {} while keeping its meaning unchanged:\n\n{text}",
                    style.description()
                ),
                max_tokens: 1000,
                temperature: 0.6,
            },
            "Optimization failed.",
        )
        .await
    }

    /// Tags come back as a comma separated list. Failures yield an empty list;
    /// use [`AiGateway::try_generate_tags`] to tell a failure from an empty answer.
    pub async fn generate_tags(&self, text: &str, max_tags: usize) -> Vec<String> {
        self.try_generate_tags(text, max_tags)
            .await
            .unwrap_or_default()
    }

    pub async fn try_generate_tags(
        &self,
        text: &str,
        max_tags: usize,
    ) -> Result<Vec<String>, GatewayError> {
        let request = CompletionRequest {
            operation: AiOperation::GenerateTags,
            system_prompt: "You generate accurate, relevant tag keywords for a piece of text.".to_string(),
            user_prompt: format!(
                "Generate {max_tags} relevant tag keywords for the following text, separated by commas:\n\n{text}"
            ),
            max_tokens: 100,
            temperature: 0.3,
        };
        match self.call(&request).await {
            Ok(raw) => Ok(parse_tags(&raw)),
            Err(err) => {
                warn!(error = %err, "tag generation failed");
                Err(err)
            }
        }
    }

    /// Short fixed request used to check that the configured provider answers.
    pub async fn test_connection(&self) -> AiResponse {
        self.summarize(
            "This is a short test text used to verify that the AI features work. \
             AI can help summarize documents, translate text and explain concepts.",
            SummarizeOptions {
                max_length: 50,
                language: None,
            },
        )
        .await
    }

    async fn run(&self, request: CompletionRequest, fallback: &str) -> AiResponse {
        match self.call(&request).await {
            Ok(content) if content.trim().is_empty() => AiResponse::ok(fallback),
            Ok(content) => AiResponse::ok(content),
            Err(err) => {
                warn!(operation = ?request.operation, error = %err, "AI request failed");
                AiResponse::failed(err.to_string())
            }
        }
    }

    async fn call(&self, request: &CompletionRequest) -> Result<String, GatewayError> {
        let Some(backend) = &self.backend else {
            return Err(GatewayError::MissingCredential {
                provider: self.provider,
                env_var: self.provider.endpoint().credential_env,
            });
        };
        let content = backend.complete(request).await?;
        info!(operation = ?request.operation, chars = content.len(), "AI request completed");
        Ok(content)
    }
}

pub fn parse_tags(raw: &str) -> Vec<String> {
    raw.split([',', '，'])
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_tags_trims_and_drops_empty_entries() {
        assert_eq!(
            parse_tags(" rust, async ,, notes ,"),
            vec!["rust", "async", "notes"]
        );
        assert_eq!(parse_tags("笔记，学习"), vec!["笔记", "学习"]);
        assert!(parse_tags("  ").is_empty());
    }

    #[test]
    fn display_text_prefers_error() {
        let failed = AiResponse::failed("boom");
        assert_eq!(failed.display_text(), "boom");
        assert!(failed.content.is_empty());
        assert_eq!(AiResponse::ok("fine").display_text(), "fine");
    }

    #[test]
    fn optimize_styles_round_trip_names() {
        for name in OptimizeStyle::NAMES {
            assert_eq!(OptimizeStyle::from_str(name).map(|s| s.as_str()), Some(name));
        }
        assert_eq!(OptimizeStyle::from_str("poetic"), None);
    }

    #[tokio::test]
    async fn unconfigured_gateway_reports_missing_credential() {
        let settings = AiSettings::for_provider(Provider::DeepSeek, None);
        let gateway = AiGateway::new(&settings);
        assert!(!gateway.is_configured());

        let response = gateway.summarize("text", SummarizeOptions::default()).await;
        let error = response.error.unwrap();
        assert!(error.contains("DEEPSEEK_API_KEY"));
        assert!(gateway.generate_tags("text", DEFAULT_TAG_COUNT).await.is_empty());
        assert!(matches!(
            gateway.try_generate_tags("text", DEFAULT_TAG_COUNT).await,
            Err(GatewayError::MissingCredential { env_var: "DEEPSEEK_API_KEY", .. })
        ));
    }
}
