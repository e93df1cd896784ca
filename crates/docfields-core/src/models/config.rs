//! Configuration structures for the extraction pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable holding the AI API key.
pub const ENV_API_KEY: &str = "AZURE_OPENAI_API_KEY";
/// Environment variable holding the AI endpoint base URL.
pub const ENV_API_URL: &str = "AZURE_OPENAI_ENDPOINT";
/// Environment variable pinning a single deployment name.
pub const ENV_DEPLOYMENT: &str = "AZURE_OPENAI_DEPLOYMENT";
/// Environment variable pinning a single API version.
pub const ENV_API_VERSION: &str = "AZURE_OPENAI_API_VERSION";
/// Environment variable overriding the output directory.
pub const ENV_OUTPUT_DIR: &str = "DOCFIELDS_OUTPUT_DIR";

/// Main configuration for the docfields pipeline.
///
/// Built once at startup and handed to the orchestrator; read-only after that.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DocfieldsConfig {
    /// AI endpoint configuration.
    pub ai: AiConfig,

    /// Local extraction configuration.
    pub extraction: ExtractionConfig,

    /// Output artifact configuration.
    pub output: OutputConfig,
}

/// AI chat-completion endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// API key sent in the `api-key` header.
    pub api_key: Option<String>,

    /// Base URL of the endpoint, e.g. `https://my-resource.openai.azure.com`.
    pub api_url: Option<String>,

    /// Fixed deployment name. Probing is skipped when both this and
    /// `api_version` are set.
    pub deployment: Option<String>,

    /// Fixed API version.
    pub api_version: Option<String>,

    /// Per-call timeout in seconds.
    pub timeout_secs: u64,

    /// Number of leading document characters sent to the model.
    pub max_input_chars: usize,

    /// Sampling temperature.
    pub temperature: f32,

    /// Completion token limit.
    pub max_tokens: u32,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: None,
            deployment: None,
            api_version: None,
            timeout_secs: 30,
            max_input_chars: 8000,
            temperature: 0.1,
            max_tokens: 2000,
        }
    }
}

/// Credentials required to reach the AI endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AiCredentials {
    pub api_key: String,
    pub api_url: String,
}

impl AiConfig {
    /// Returns the credentials when both key and URL are non-blank.
    pub fn credentials(&self) -> Option<AiCredentials> {
        let api_key = non_blank(self.api_key.as_deref())?;
        let api_url = non_blank(self.api_url.as_deref())?;
        Some(AiCredentials {
            api_key: api_key.to_string(),
            api_url: api_url.trim_end_matches('/').to_string(),
        })
    }

    /// Returns the pinned deployment/version pair, if both are configured.
    pub fn fixed_target(&self) -> Option<(String, String)> {
        let deployment = non_blank(self.deployment.as_deref())?;
        let version = non_blank(self.api_version.as_deref())?;
        Some((deployment.to_string(), version.to_string()))
    }
}

/// Local pattern extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Maximum characters kept for address fields before truncation.
    pub address_max_chars: usize,

    /// Reconstruct line-item tables.
    pub line_items: bool,

    /// Detect generic whitespace-aligned tables.
    pub generic_tables: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            address_max_chars: 300,
            line_items: true,
            generic_tables: true,
        }
    }
}

/// Output artifact configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory receiving `extracted_*.json` files.
    pub output_dir: PathBuf,

    /// Pretty-print the persisted JSON.
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("outputs"),
            pretty: true,
        }
    }
}

impl DocfieldsConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }

    /// Apply overrides from the process environment.
    pub fn with_env_overrides(mut self) -> Self {
        self.apply_overrides(|name| std::env::var(name).ok());
        self
    }

    /// Apply overrides from an arbitrary variable lookup.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(key) = get(ENV_API_KEY) {
            self.ai.api_key = Some(key);
        }
        if let Some(url) = get(ENV_API_URL) {
            self.ai.api_url = Some(url);
        }
        if let Some(deployment) = get(ENV_DEPLOYMENT) {
            self.ai.deployment = Some(deployment);
        }
        if let Some(version) = get(ENV_API_VERSION) {
            self.ai.api_version = Some(version);
        }
        if let Some(dir) = get(ENV_OUTPUT_DIR) {
            self.output.output_dir = PathBuf::from(dir);
        }
    }

    /// Drop AI credentials so only local extraction runs.
    pub fn without_ai(mut self) -> Self {
        self.ai.api_key = None;
        self.ai.api_url = None;
        self
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
