use serde::{Deserialize, Serialize};

/// Connection details for one chat-completion provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint {
    pub base_url: &'static str,
    pub default_model: &'static str,
    /// Environment variable holding the API key.
    pub credential_env: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    OpenAI,
    DeepSeek,
}

const ENDPOINTS: &[(Provider, Endpoint)] = &[
    (
        Provider::OpenAI,
        Endpoint {
            base_url: "https://api.openai.com/v1",
            default_model: "gpt-3.5-turbo",
            credential_env: "OPENAI_API_KEY",
        },
    ),
    (
        Provider::DeepSeek,
        Endpoint {
            base_url: "https://api.deepseek.com/v1",
            default_model: "deepseek-chat",
            credential_env: "DEEPSEEK_API_KEY",
        },
    ),
];

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::OpenAI => "openai",
            Provider::DeepSeek => "deepseek",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Some(Provider::OpenAI),
            "deepseek" => Some(Provider::DeepSeek),
            _ => None,
        }
    }

    pub fn all() -> Vec<Provider> {
        ENDPOINTS.iter().map(|(provider, _)| *provider).collect()
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Provider::OpenAI => "ChatGPT (OpenAI)",
            Provider::DeepSeek => "DeepSeek",
        }
    }

    pub fn endpoint(&self) -> Endpoint {
        ENDPOINTS
            .iter()
            .find(|(provider, _)| provider == self)
            .map(|(_, endpoint)| *endpoint)
            .unwrap_or(ENDPOINTS[0].1)
    }
}
