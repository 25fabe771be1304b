use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::ai::Language;
use crate::provider::Provider;

pub const PROVIDER_ENV: &str = "QUILLMATE_PROVIDER";
pub const MODEL_ENV: &str = "QUILLMATE_MODEL";

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Config {
    pub provider: Option<String>,
    pub model: Option<String>,
    pub openai_api_key: Option<String>,
    pub deepseek_api_key: Option<String>,
    /// Overrides the provider's default base URL (proxies, self-hosted gateways).
    pub base_url: Option<String>,
    pub language: Option<Language>,
}

/// Everything the AI gateway needs, resolved once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AiSettings {
    pub provider: Provider,
    pub model: String,
    pub base_url: String,
    pub api_key: Option<String>,
    pub language: Language,
}

impl AiSettings {
    pub fn for_provider(provider: Provider, api_key: Option<String>) -> Self {
        let endpoint = provider.endpoint();
        Self {
            provider,
            model: endpoint.default_model.to_string(),
            base_url: endpoint.base_url.to_string(),
            api_key,
            language: Language::default(),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self {
            provider: Some(Provider::default().as_str().to_string()),
            ..Self::default()
        }
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(config_path)?;
        let config: Config = serde_json::from_str(&config_content)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(config_path, config_content)?;
        Ok(())
    }

    pub fn save_provider(provider: Provider) -> Result<()> {
        let mut config = Self::load().unwrap_or_else(|_| Self::new());
        config.provider = Some(provider.as_str().to_string());
        config.save()
    }

    /// Resolve settings from the process environment, which wins over the file.
    pub fn resolve(&self) -> AiSettings {
        self.resolve_with(|name| std::env::var(name).ok())
    }

    /// Resolve settings with an explicit variable lookup, so callers and tests
    /// never have to touch the real environment.
    pub fn resolve_with(&self, env: impl Fn(&str) -> Option<String>) -> AiSettings {
        let provider = env(PROVIDER_ENV)
            .as_deref()
            .and_then(Provider::from_str)
            .or_else(|| self.provider.as_deref().and_then(Provider::from_str))
            .unwrap_or_default();
        let endpoint = provider.endpoint();

        let stored_key = match provider {
            Provider::OpenAI => self.openai_api_key.clone(),
            Provider::DeepSeek => self.deepseek_api_key.clone(),
        };
        let api_key = env(endpoint.credential_env)
            .or(stored_key)
            .filter(|key| !key.trim().is_empty());

        let model = env(MODEL_ENV)
            .or_else(|| self.model.clone())
            .unwrap_or_else(|| endpoint.default_model.to_string());

        AiSettings {
            provider,
            model,
            base_url: self
                .base_url
                .clone()
                .unwrap_or_else(|| endpoint.base_url.to_string()),
            api_key,
            language: self.language.unwrap_or_default(),
        }
    }

    fn get_config_path() -> Result<PathBuf> {
        let config_dir =
            dirs::config_dir().ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("quillmate").join("config.json"))
    }
}
