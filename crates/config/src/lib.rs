//! Configuration loading, validation, and management for Gaian Archive.
//!
//! Loads configuration from `~/.gaian-archive/config.toml` with environment
//! variable overrides. The original deployment was configured purely by
//! environment, so every secret and identifier can still come from env vars:
//! `OPENAI_API_KEY`, `VECTOR_STORE_ID`, `STRIPE_SECRET_KEY`,
//! `STRIPE_PRICE_ID_PRO`, `ADMIN_PASSWORD`, `DOMAIN_URL`, `PORT`, `KB_JSON`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.gaian-archive/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Admin password guarding the knowledge upsert endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_password: Option<String>,

    /// Language-model provider settings
    #[serde(default)]
    pub openai: OpenAiConfig,

    /// Payments provider settings
    #[serde(default)]
    pub stripe: StripeConfig,

    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Knowledge store settings
    #[serde(default)]
    pub knowledge: KnowledgeConfig,

    /// Answer synthesis settings
    #[serde(default)]
    pub synthesis: SynthesisConfig,
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("admin_password", &redact(&self.admin_password))
            .field("openai", &self.openai)
            .field("stripe", &self.stripe)
            .field("server", &self.server)
            .field("knowledge", &self.knowledge)
            .field("synthesis", &self.synthesis)
            .finish()
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    /// API key (`OPENAI_API_KEY` overrides)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Model used for synthesis
    #[serde(default = "default_model")]
    pub model: String,

    /// API base URL (override for tests and proxies)
    #[serde(default = "default_openai_base_url")]
    pub base_url: String,

    /// Hosted vector store identifier (`VECTOR_STORE_ID` overrides)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vector_store_id: Option<String>,
}

fn default_model() -> String {
    "gpt-4.1".into()
}
fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".into()
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            base_url: default_openai_base_url(),
            vector_store_id: None,
        }
    }
}

impl std::fmt::Debug for OpenAiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiConfig")
            .field("api_key", &redact(&self.api_key))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("vector_store_id", &self.vector_store_id)
            .finish()
    }
}

#[derive(Clone, Serialize, Deserialize, Default)]
pub struct StripeConfig {
    /// Secret key (`STRIPE_SECRET_KEY` overrides)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_key: Option<String>,

    /// Default subscription price (`STRIPE_PRICE_ID_PRO` overrides)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_id: Option<String>,

    /// API base URL (override for tests)
    #[serde(default = "default_stripe_base_url")]
    pub base_url: String,
}

fn default_stripe_base_url() -> String {
    "https://api.stripe.com/v1".into()
}

impl std::fmt::Debug for StripeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeConfig")
            .field("secret_key", &redact(&self.secret_key))
            .field("price_id", &self.price_id)
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,

    /// Public origin used to build checkout/portal return URLs
    /// (`DOMAIN_URL` overrides). Defaults to `http://{host}:{port}`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain_url: Option<String>,
}

fn default_port() -> u16 {
    4242
}
fn default_host() -> String {
    "127.0.0.1".into()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
            domain_url: None,
        }
    }
}

impl ServerConfig {
    /// The public origin for redirect URLs.
    pub fn origin(&self) -> String {
        self.domain_url
            .clone()
            .unwrap_or_else(|| format!("http://{}:{}", self.host, self.port))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeConfig {
    /// Backend: "file" (local JSON map) or "vector" (hosted catalog)
    #[serde(default = "default_knowledge_backend")]
    pub backend: String,

    /// Path of the primary knowledge file (file backend)
    #[serde(default = "default_knowledge_path")]
    pub file_path: PathBuf,

    /// Higher-priority runtime override file. When it exists and is
    /// non-empty it shadows `file_path` for reads and receives writes,
    /// so the checked-in file stays pristine.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ephemeral_path: Option<PathBuf>,

    /// Raw JSON object merged on top of file-sourced values
    /// (`KB_JSON` overrides).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json_override: Option<String>,
}

fn default_knowledge_backend() -> String {
    "file".into()
}
fn default_knowledge_path() -> PathBuf {
    AppConfig::config_dir().join("knowledgeBase.json")
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            backend: default_knowledge_backend(),
            file_path: default_knowledge_path(),
            ephemeral_path: None,
            json_override: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthesisConfig {
    /// Strategy: "context" (inject compacted map into the prompt) or
    /// "retrieval" (force the provider's file_search tool)
    #[serde(default = "default_strategy")]
    pub strategy: String,

    /// Retrieval strategy only: substitute the fallback answer when the
    /// response carries no citation evidence. The source treated missing
    /// citations as "archive not consulted"; that heuristic discards
    /// correct answers sometimes, so it is a knob rather than a rule.
    #[serde(default = "default_true")]
    pub require_citations: bool,

    /// Byte budget for the compacted context block
    #[serde(default = "default_max_context_bytes")]
    pub max_context_bytes: usize,

    #[serde(default)]
    pub temperature: f32,
}

fn default_strategy() -> String {
    "context".into()
}
fn default_max_context_bytes() -> usize {
    6000
}
fn default_true() -> bool {
    true
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            strategy: default_strategy(),
            require_citations: true,
            max_context_bytes: default_max_context_bytes(),
            temperature: 0.0,
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.gaian-archive/config.toml)
    /// and apply environment variable overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load configuration from a specific file path (no env overrides).
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Environment variables take precedence over file values.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            self.openai.api_key = Some(key);
        }
        if let Ok(model) = std::env::var("GAIAN_MODEL") {
            self.openai.model = model;
        }
        if let Ok(id) = std::env::var("VECTOR_STORE_ID") {
            self.openai.vector_store_id = Some(id);
        }
        if let Ok(key) = std::env::var("STRIPE_SECRET_KEY") {
            self.stripe.secret_key = Some(key);
        }
        if let Ok(price) = std::env::var("STRIPE_PRICE_ID_PRO") {
            self.stripe.price_id = Some(price);
        }
        if let Ok(password) = std::env::var("ADMIN_PASSWORD") {
            self.admin_password = Some(password);
        }
        if let Ok(url) = std::env::var("DOMAIN_URL") {
            self.server.domain_url = Some(url);
        }
        if let Ok(port) = std::env::var("PORT")
            && let Ok(port) = port.parse()
        {
            self.server.port = port;
        }
        if let Ok(raw) = std::env::var("KB_JSON") {
            self.knowledge.json_override = Some(raw);
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".gaian-archive")
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        match self.knowledge.backend.as_str() {
            "file" | "vector" => {}
            other => {
                return Err(ConfigError::ValidationError(format!(
                    "knowledge.backend must be \"file\" or \"vector\", got \"{other}\""
                )));
            }
        }

        match self.synthesis.strategy.as_str() {
            "context" | "retrieval" => {}
            other => {
                return Err(ConfigError::ValidationError(format!(
                    "synthesis.strategy must be \"context\" or \"retrieval\", got \"{other}\""
                )));
            }
        }

        if self.synthesis.max_context_bytes == 0 {
            return Err(ConfigError::ValidationError(
                "synthesis.max_context_bytes must be > 0".into(),
            ));
        }

        if self.synthesis.temperature < 0.0 || self.synthesis.temperature > 2.0 {
            return Err(ConfigError::ValidationError(
                "synthesis.temperature must be between 0.0 and 2.0".into(),
            ));
        }

        Ok(())
    }

    /// Generate a default config TOML string (for `doctor` hints).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            admin_password: None,
            openai: OpenAiConfig::default(),
            stripe: StripeConfig::default(),
            server: ServerConfig::default(),
            knowledge: KnowledgeConfig::default(),
            synthesis: SynthesisConfig::default(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
