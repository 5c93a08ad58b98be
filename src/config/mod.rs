//! Configuration management.
//!
//! Application settings come from an optional TOML file layered under
//! `RESEARCH_ASSISTANT_*` environment variables (`__` separates nested keys,
//! e.g. `RESEARCH_ASSISTANT_CHAT__CHAIN_LIMIT=2`):
//!
//! ```toml
//! papers_dir = "papers"
//!
//! [search]
//! default_max_results = 5
//! api_url = "http://export.arxiv.org/api/query"
//!
//! [chat]
//! chain_limit = 3
//! max_tool_rounds = 8
//! max_completion_tokens = 1024
//!
//! [http]
//! timeout_secs = 30
//! ```
//!
//! Credentials for the hosted model are read separately into [`LlmConfig`]
//! from the `AZURE_OPENAI_*` variables, once, at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::models::DEFAULT_MAX_RESULTS;

/// Default config file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "research-assistant.toml";

/// Default arXiv query endpoint
pub const ARXIV_API_URL: &str = "http://export.arxiv.org/api/query";

/// Default Azure OpenAI API version
pub const DEFAULT_API_VERSION: &str = "2024-03-01-preview";

/// Errors raised while assembling configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    MissingVar(&'static str),

    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },

    #[error(transparent)]
    Load(#[from] config::ConfigError),
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Root directory holding one subdirectory per topic
    #[serde(default = "default_papers_dir")]
    pub papers_dir: PathBuf,

    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub chat: ChatConfig,

    #[serde(default)]
    pub http: HttpConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            papers_dir: default_papers_dir(),
            search: SearchConfig::default(),
            chat: ChatConfig::default(),
            http: HttpConfig::default(),
        }
    }
}

fn default_papers_dir() -> PathBuf {
    PathBuf::from("papers")
}

/// Search provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Results fetched when `max_results` is omitted
    #[serde(default = "default_max_results")]
    pub default_max_results: u32,

    /// arXiv query endpoint
    #[serde(default = "default_api_url")]
    pub api_url: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_max_results: default_max_results(),
            api_url: default_api_url(),
        }
    }
}

fn default_max_results() -> u32 {
    DEFAULT_MAX_RESULTS
}

fn default_api_url() -> String {
    ARXIV_API_URL.to_string()
}

/// Chat loop settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Papers summarized automatically after a model-requested search
    #[serde(default = "default_chain_limit")]
    pub chain_limit: usize,

    /// Tool rounds allowed before the model is asked for a final answer
    #[serde(default = "default_max_tool_rounds")]
    pub max_tool_rounds: usize,

    #[serde(default = "default_max_completion_tokens")]
    pub max_completion_tokens: u32,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            chain_limit: default_chain_limit(),
            max_tool_rounds: default_max_tool_rounds(),
            max_completion_tokens: default_max_completion_tokens(),
        }
    }
}

fn default_chain_limit() -> usize {
    3
}

fn default_max_tool_rounds() -> usize {
    8
}

fn default_max_completion_tokens() -> u32 {
    1024
}

/// HTTP client settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_timeout_secs() -> u64 {
    30
}

/// Load configuration from an optional file plus `RESEARCH_ASSISTANT_*` env vars
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let mut builder = config::Config::builder();
    if let Some(path) = path {
        builder = builder.add_source(config::File::from(path).required(true));
    }

    let settings = builder
        .add_source(
            config::Environment::with_prefix("RESEARCH_ASSISTANT")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let config: Config = settings.try_deserialize()?;
    config.validate()?;
    Ok(config)
}

/// Find the default config file in the working directory, if present
pub fn find_config_file() -> Option<PathBuf> {
    let path = PathBuf::from(DEFAULT_CONFIG_FILE);
    path.is_file().then_some(path)
}

impl Config {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.search.default_max_results == 0 {
            return Err(ConfigError::Invalid {
                name: "search.default_max_results",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.http.timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                name: "http.timeout_secs",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Credentials and endpoint for the hosted chat-completions model
#[derive(Clone)]
pub struct LlmConfig {
    /// Resource endpoint, e.g. `https://my-resource.openai.azure.com`
    pub endpoint: String,
    /// Deployment (model) name
    pub deployment: String,
    pub api_key: String,
    pub api_version: String,
}

impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("endpoint", &self.endpoint)
            .field("deployment", &self.deployment)
            .field("api_key", &"<redacted>")
            .field("api_version", &self.api_version)
            .finish()
    }
}

impl LlmConfig {
    pub const ENDPOINT_VAR: &'static str = "AZURE_OPENAI_ENDPOINT";
    pub const DEPLOYMENT_VAR: &'static str = "AZURE_OPENAI_MODEL";
    pub const API_KEY_VAR: &'static str = "AZURE_OPENAI_API_KEY";
    pub const API_VERSION_VAR: &'static str = "AZURE_OPENAI_API_VERSION";

    /// Read credentials from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read credentials through an arbitrary lookup function
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::MissingVar(name))
        };

        let endpoint = required(Self::ENDPOINT_VAR)?;
        url::Url::parse(&endpoint).map_err(|e| ConfigError::Invalid {
            name: Self::ENDPOINT_VAR,
            reason: e.to_string(),
        })?;

        Ok(Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            deployment: required(Self::DEPLOYMENT_VAR)?,
            api_key: required(Self::API_KEY_VAR)?,
            api_version: lookup(Self::API_VERSION_VAR)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
        })
    }

    /// Chat-completions URL for the configured deployment
    pub fn chat_completions_url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            self.endpoint,
            urlencoding::encode(&self.deployment),
            self.api_version
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.papers_dir, PathBuf::from("papers"));
        assert_eq!(config.search.default_max_results, 5);
        assert_eq!(config.chat.chain_limit, 3);
        assert_eq!(config.http.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_load_config_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "papers_dir = \"/tmp/papers\"\n[search]\ndefault_max_results = 7\n[chat]\nchain_limit = 1"
        )
        .unwrap();

        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.papers_dir, PathBuf::from("/tmp/papers"));
        assert_eq!(config.search.default_max_results, 7);
        assert_eq!(config.search.api_url, ARXIV_API_URL);
        assert_eq!(config.chat.chain_limit, 1);
        assert_eq!(config.chat.max_tool_rounds, 8);
    }

    #[test]
    fn test_load_config_rejects_zero_results() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[search]\ndefault_max_results = 0").unwrap();

        let err = load_config(Some(file.path())).unwrap_err();
        assert!(err.to_string().contains("search.default_max_results"));
    }

    #[test]
    fn test_llm_config_requires_all_credentials() {
        let err = LlmConfig::from_lookup(lookup_from(&[
            ("AZURE_OPENAI_ENDPOINT", "https://example.openai.azure.com"),
            ("AZURE_OPENAI_MODEL", "gpt-4o"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar("AZURE_OPENAI_API_KEY")));

        let err = LlmConfig::from_lookup(lookup_from(&[
            ("AZURE_OPENAI_ENDPOINT", "https://example.openai.azure.com"),
            ("AZURE_OPENAI_MODEL", "   "),
            ("AZURE_OPENAI_API_KEY", "secret"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar("AZURE_OPENAI_MODEL")));
    }

    #[test]
    fn test_llm_config_url_and_redaction() {
        let config = LlmConfig::from_lookup(lookup_from(&[
            ("AZURE_OPENAI_ENDPOINT", "https://example.openai.azure.com/"),
            ("AZURE_OPENAI_MODEL", "gpt-4o"),
            ("AZURE_OPENAI_API_KEY", "secret"),
        ]))
        .unwrap();

        assert_eq!(config.api_version, DEFAULT_API_VERSION);
        assert_eq!(
            config.chat_completions_url(),
            "https://example.openai.azure.com/openai/deployments/gpt-4o/chat/completions?api-version=2024-03-01-preview"
        );
        assert!(!format!("{:?}", config).contains("secret"));
    }

    #[test]
    fn test_llm_config_rejects_bad_endpoint() {
        let err = LlmConfig::from_lookup(lookup_from(&[
            ("AZURE_OPENAI_ENDPOINT", "not a url"),
            ("AZURE_OPENAI_MODEL", "gpt-4o"),
            ("AZURE_OPENAI_API_KEY", "secret"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }
}
