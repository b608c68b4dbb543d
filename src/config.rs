use anyhow::{Result, anyhow};

use crate::generator::llm::{DEFAULT_MODEL, DEFAULT_OPENAI_URL};
use crate::portfolio::DEFAULT_MORALIS_URL;

/// Process configuration read from the environment (and `.env`).
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub agent_url: Option<String>,
    pub wallet: Option<String>,
    pub moralis_api_key: Option<String>,
    pub moralis_base_url: String,
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub openai_model: String,
    pub openai_temperature: Option<f64>,
}

impl Config {
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            agent_url: get("SENDFLOW_AGENT_URL"),
            wallet: get("SENDFLOW_WALLET"),
            moralis_api_key: get("MORALIS_API_KEY"),
            moralis_base_url: get("MORALIS_BASE_URL").unwrap_or_else(|| DEFAULT_MORALIS_URL.to_string()),
            openai_api_key: get("OPENAI_API_KEY"),
            openai_base_url: get("OPENAI_BASE_URL").unwrap_or_else(|| DEFAULT_OPENAI_URL.to_string()),
            openai_model: get("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            openai_temperature: get("OPENAI_TEMPERATURE").and_then(|v| v.trim().parse().ok()),
        }
    }

    pub fn require_openai_key(&self) -> Result<&str> {
        self.openai_api_key
            .as_deref()
            .ok_or_else(|| anyhow!("OPENAI_API_KEY environment variable not set"))
    }
}
