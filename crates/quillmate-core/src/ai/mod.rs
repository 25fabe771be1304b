pub mod client;
pub mod error;
pub mod gateway;

pub use client::{AiOperation, ChatBackend, CompletionRequest, OpenAiCompatibleClient};
pub use error::GatewayError;
pub use gateway::{
    AiGateway, AiResponse, ExplainLevel, ExplainOptions, Language, OptimizeStyle,
    SummarizeOptions, TranslateOptions, DEFAULT_SUMMARY_LENGTH, DEFAULT_TAG_COUNT,
    DEFAULT_TARGET_LANGUAGE,
};
