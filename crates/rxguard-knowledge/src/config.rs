//! TOML configuration for RXGUARD.
//!
//! ```toml
//! [knowledge_base]
//! remote_url = "https://example.supabase.co/rest/v1"
//! api_key_env = "RXGUARD_KB_API_KEY"
//! timeout_secs = 10
//! # or, instead of a remote store, a curated local dataset:
//! # dataset_file = "/etc/rxguard/knowledge.toml"
//! ```
//!
//! Every key is optional. An empty document yields a configuration that
//! serves the embedded dataset only.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use rxguard_contracts::error::{SafetyError, SafetyResult};

fn default_timeout_secs() -> u64 {
    10
}

/// Knowledge-base source settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeBaseConfig {
    /// Base URL of the remote REST store. Absent means fallback only.
    #[serde(default)]
    pub remote_url: Option<String>,

    /// Name of the environment variable holding the store's API key. The key
    /// itself never appears in the configuration file.
    #[serde(default)]
    pub api_key_env: Option<String>,

    /// Per-request timeout for remote fetches.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// A TOML dataset (same layout as the embedded one) used as the primary
    /// source when no `remote_url` is set.
    #[serde(default)]
    pub dataset_file: Option<PathBuf>,
}

impl Default for KnowledgeBaseConfig {
    fn default() -> Self {
        Self {
            remote_url: None,
            api_key_env: None,
            timeout_secs: default_timeout_secs(),
            dataset_file: None,
        }
    }
}

impl KnowledgeBaseConfig {
    /// Read the API key from the configured environment variable, if any.
    pub fn api_key(&self) -> Option<String> {
        self.api_key_env
            .as_deref()
            .and_then(|var| std::env::var(var).ok())
            .filter(|key| !key.trim().is_empty())
    }
}

/// Top-level configuration document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RxguardConfig {
    #[serde(default)]
    pub knowledge_base: KnowledgeBaseConfig,
}

impl RxguardConfig {
    /// Parse and validate `s` as TOML.
    pub fn from_toml_str(s: &str) -> SafetyResult<Self> {
        let config: RxguardConfig = toml::from_str(s).map_err(|e| SafetyError::ConfigError {
            reason: format!("failed to parse config TOML: {}", e),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> SafetyResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| SafetyError::ConfigError {
            reason: format!("failed to read config file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }

    fn validate(&self) -> SafetyResult<()> {
        let kb = &self.knowledge_base;
        if kb.timeout_secs == 0 {
            return Err(SafetyError::ConfigError {
                reason: "knowledge_base.timeout_secs must be greater than zero".to_string(),
            });
        }
        if let Some(url) = &kb.remote_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(SafetyError::ConfigError {
                    reason: format!("knowledge_base.remote_url '{url}' must be an http(s) URL"),
                });
            }
        }
        Ok(())
    }
}
