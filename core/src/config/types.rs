use serde::{Deserialize, Serialize};

use crate::engine::ToolCapability;
use crate::error::ConfigError;

pub const DEFAULT_SYSTEM_INSTRUCTION: &str = include_str!("../../prompts/system.txt");
pub const DEFAULT_SUMMARY_INSTRUCTION: &str = include_str!("../../prompts/summary.txt");

pub const MIN_WORKERS: usize = 1;
pub const MAX_WORKERS: usize = 5;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub batch: BatchConfig,

    #[serde(default)]
    pub backend: BackendConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.batch.validate()?;
        if self.search.model.trim().is_empty() {
            return Err(ConfigError::Validation("search.model must not be empty".into()));
        }
        if self.backend.base_url.trim().is_empty() {
            return Err(ConfigError::Validation(
                "backend.base_url must not be empty".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_thinking_budget")]
    pub thinking_budget: u32,

    #[serde(default = "default_tools")]
    pub tools: Vec<ToolCapability>,

    #[serde(default = "default_system_instruction")]
    pub system_instruction: String,

    #[serde(default = "default_summary_instruction")]
    pub summary_instruction: String,

    /// Replaces `system_instruction` with the file contents when set.
    #[serde(default)]
    pub system_instruction_file: Option<String>,

    #[serde(default)]
    pub summary_instruction_file: Option<String>,
}

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_thinking_budget() -> u32 {
    512
}

fn default_tools() -> Vec<ToolCapability> {
    vec![ToolCapability::WebSearch, ToolCapability::UrlContext]
}

fn default_system_instruction() -> String {
    DEFAULT_SYSTEM_INSTRUCTION.to_string()
}

fn default_summary_instruction() -> String {
    DEFAULT_SUMMARY_INSTRUCTION.to_string()
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            thinking_budget: default_thinking_budget(),
            tools: default_tools(),
            system_instruction: default_system_instruction(),
            summary_instruction: default_summary_instruction(),
            system_instruction_file: None,
            summary_instruction_file: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    #[serde(default = "default_workers")]
    pub workers: usize,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_workers() -> usize {
    3
}

fn default_timeout_secs() -> u64 {
    180
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl BatchConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_workers(self.workers)?;
        if self.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "batch.timeout_secs must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}

pub fn validate_workers(workers: usize) -> Result<(), ConfigError> {
    if !(MIN_WORKERS..=MAX_WORKERS).contains(&workers) {
        return Err(ConfigError::Validation(format!(
            "workers must be between {MIN_WORKERS} and {MAX_WORKERS}"
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default = "default_provider")]
    pub provider: String,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

pub const FALLBACK_API_KEY_ENV: &str = "GOOGLE_API_KEY";

fn default_provider() -> String {
    "gemini".to_string()
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}

fn default_request_timeout_secs() -> u64 {
    300
}

fn default_connect_timeout_secs() -> u64 {
    10
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            base_url: default_base_url(),
            api_key_env: default_api_key_env(),
            api_key: None,
            request_timeout_secs: default_request_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

impl BackendConfig {
    /// Inline key first, then `api_key_env`, then `GOOGLE_API_KEY`.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.resolve_api_key_with(|k| std::env::var(k).ok())
    }

    pub fn resolve_api_key_with(&self, lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
        let non_blank = |v: String| (!v.trim().is_empty()).then(|| v.trim().to_string());
        self.api_key
            .clone()
            .and_then(non_blank)
            .or_else(|| lookup(&self.api_key_env).and_then(non_blank))
            .or_else(|| lookup(FALLBACK_API_KEY_ENV).and_then(non_blank))
    }
}

/// Immutable per-run search settings handed to the executors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchSettings {
    pub thinking_budget: u32,
    pub tools: Vec<ToolCapability>,
    pub system_instruction: String,
    pub summary_instruction: String,
}

impl From<&SearchConfig> for SearchSettings {
    fn from(cfg: &SearchConfig) -> Self {
        Self {
            thinking_budget: cfg.thinking_budget,
            tools: cfg.tools.clone(),
            system_instruction: cfg.system_instruction.clone(),
            summary_instruction: cfg.summary_instruction.clone(),
        }
    }
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self::from(&SearchConfig::default())
    }
}
