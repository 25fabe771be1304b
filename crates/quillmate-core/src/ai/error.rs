use thiserror::Error;

use crate::provider::Provider;

/// Why a single AI call failed. None of these are retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("{} API key is not configured. Set {env_var} and restart the app.", provider.display_name())]
    MissingCredential {
        provider: Provider,
        env_var: &'static str,
    },

    #[error("The API key was rejected. Check {env_var}.")]
    Unauthorized { env_var: &'static str },

    #[error("Rate limit or quota exceeded. Wait a moment and try again.")]
    RateLimited,

    #[error("The AI service had a server error (status {status}). Try again later.")]
    Server { status: u16 },

    #[error("AI request failed: {0}")]
    Unclassified(String),
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        GatewayError::Unclassified(err.to_string())
    }
}
