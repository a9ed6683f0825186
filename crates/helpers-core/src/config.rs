//! Configuration types for the agent helpers.
//!
//! Every adapter has its own config struct with hardcoded defaults. Values can
//! be overridden, in increasing priority, by the TOML configuration file at
//! [`default_config_path`], by environment variables, and by explicit values
//! passed by the caller (the CLI maps its flags onto those).
//!
//! ```toml
//! [search]
//! api_key = "BSA..."
//! country = "DE"
//!
//! [model]
//! endpoint = "http://localhost:11434"
//! model = "llama3.2"
//!
//! [open_data]
//! cache_dir = ".eu_data_cache"
//! cache_ttl_secs = 86400
//! ```

use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Environment variable holding the Brave Search subscription token.
pub const BRAVE_API_KEY_ENV: &str = "BRAVE_SEARCH_API_KEY";
/// Environment variable overriding the Ollama endpoint.
pub const OLLAMA_HOST_ENV: &str = "OLLAMA_HOST";
/// Environment variable overriding the Ollama model name.
pub const OLLAMA_MODEL_ENV: &str = "OLLAMA_MODEL";
/// Environment variable overriding the open-data cache directory.
pub const CACHE_DIR_ENV: &str = "EU_DATA_CACHE_DIR";
/// Environment variable overriding the open-data cache TTL (seconds).
pub const CACHE_TTL_ENV: &str = "EU_DATA_CACHE_TTL";

const DEFAULT_USER_AGENT: &str = "agent-helpers/0.1";

/// HTTP client settings shared by all adapters.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpConfig {
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl HttpConfig {
    /// Same defaults with a different timeout.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout,
            ..Self::default()
        }
    }
}

/// Brave Search adapter configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub country: String,
    pub search_lang: String,
    pub http: HttpConfig,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.search.brave.com/res/v1/web/search".to_string(),
            api_key: None,
            country: "US".to_string(),
            search_lang: "en".to_string(),
            http: HttpConfig::default(),
        }
    }
}

impl SearchConfig {
    /// Builds the config from the file section, then resolves the API key.
    ///
    /// Key priority: `explicit` → `BRAVE_SEARCH_API_KEY` → config file.
    pub fn resolve(file: &HelpersConfig, explicit_key: Option<&str>) -> Self {
        Self::resolve_with(file, explicit_key, |name| std::env::var(name).ok())
    }

    /// [`SearchConfig::resolve`] with an injectable environment lookup.
    pub fn resolve_with(
        file: &HelpersConfig,
        explicit_key: Option<&str>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let mut config = Self::default();
        let section = &file.search;
        if let Some(endpoint) = &section.endpoint {
            config.endpoint = endpoint.clone();
        }
        if let Some(country) = &section.country {
            config.country = country.clone();
        }
        if let Some(lang) = &section.search_lang {
            config.search_lang = lang.clone();
        }

        config.api_key = explicit_key
            .map(str::to_string)
            .or_else(|| env(BRAVE_API_KEY_ENV))
            .or_else(|| section.api_key.clone())
            .filter(|key| !key.trim().is_empty());
        config
    }
}

/// Ollama adapter configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelConfig {
    pub endpoint: String,
    pub model: String,
    pub temperature: f32,
    pub http: HttpConfig,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:11434".to_string(),
            model: "llama3.2".to_string(),
            temperature: 0.7,
            http: HttpConfig::with_timeout(Duration::from_secs(120)),
        }
    }
}

impl ModelConfig {
    /// Builds the config from the file section and `OLLAMA_*` variables.
    pub fn resolve(file: &HelpersConfig) -> Self {
        Self::resolve_with(file, |name| std::env::var(name).ok())
    }

    pub fn resolve_with(file: &HelpersConfig, env: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        let section = &file.model;
        if let Some(endpoint) = env(OLLAMA_HOST_ENV).or_else(|| section.endpoint.clone()) {
            config.endpoint = normalize_ollama_host(&endpoint);
        }
        if let Some(model) = env(OLLAMA_MODEL_ENV).or_else(|| section.model.clone()) {
            config.model = model;
        }
        if let Some(temperature) = section.temperature {
            config.temperature = temperature;
        }
        if let Some(secs) = section.timeout_secs {
            config.http.timeout = Duration::from_secs(secs);
        }
        config
    }
}

/// `OLLAMA_HOST` is commonly set without a scheme (`127.0.0.1:11434`).
fn normalize_ollama_host(host: &str) -> String {
    let host = host.trim().trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("http://{}", host)
    }
}

/// data.europa.eu adapter configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct OpenDataConfig {
    pub sparql_endpoint: String,
    pub rest_api_base: String,
    pub preferred_formats: Vec<String>,
    pub locale: String,
    pub http: HttpConfig,
}

impl Default for OpenDataConfig {
    fn default() -> Self {
        Self {
            sparql_endpoint: "https://data.europa.eu/sparql".to_string(),
            rest_api_base: "https://data.europa.eu/api/hub/repo/datasets/".to_string(),
            preferred_formats: ["CSV", "JSON", "XML", "RDF"]
                .iter()
                .map(|f| f.to_string())
                .collect(),
            locale: "en".to_string(),
            http: HttpConfig::with_timeout(Duration::from_secs(120)),
        }
    }
}

impl OpenDataConfig {
    pub fn resolve(file: &HelpersConfig) -> Self {
        let mut config = Self::default();
        let section = &file.open_data;
        if let Some(endpoint) = &section.sparql_endpoint {
            config.sparql_endpoint = endpoint.clone();
        }
        if let Some(base) = &section.rest_api_base {
            config.rest_api_base = base.clone();
        }
        if let Some(formats) = &section.preferred_formats {
            config.preferred_formats = formats.clone();
        }
        if let Some(locale) = &section.locale {
            config.locale = locale.clone();
        }
        config
    }

    /// Checks that both endpoints parse as absolute URLs.
    pub fn validate(&self) -> Result<(), AppError> {
        for endpoint in [&self.sparql_endpoint, &self.rest_api_base] {
            Url::parse(endpoint).map_err(|e| AppError::InvalidUrl(format!("{}: {}", endpoint, e)))?;
        }
        Ok(())
    }
}

/// On-disk response cache configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheConfig {
    pub enabled: bool,
    pub dir: PathBuf,
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: PathBuf::from(".eu_data_cache"),
            ttl: Duration::from_secs(86_400),
        }
    }
}

impl CacheConfig {
    pub fn resolve(file: &HelpersConfig) -> Result<Self, AppError> {
        Self::resolve_with(file, |name| std::env::var(name).ok())
    }

    pub fn resolve_with(
        file: &HelpersConfig,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, AppError> {
        let mut config = Self::default();
        let section = &file.open_data;
        if let Some(enabled) = section.cache_enabled {
            config.enabled = enabled;
        }
        if let Some(dir) = env(CACHE_DIR_ENV)
            .map(PathBuf::from)
            .or_else(|| section.cache_dir.clone())
        {
            config.dir = dir;
        }
        if let Some(raw) = env(CACHE_TTL_ENV) {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                AppError::ConfigError(format!(
                    "{} must be a number of seconds, got '{}'",
                    CACHE_TTL_ENV, raw
                ))
            })?;
            config.ttl = Duration::from_secs(secs);
        } else if let Some(secs) = section.cache_ttl_secs {
            config.ttl = Duration::from_secs(secs);
        }
        Ok(config)
    }
}

// =============================================================================
// Configuration file
// =============================================================================

/// `[search]` section of the configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_lang: Option<String>,
}

/// `[model]` section of the configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

/// `[open_data]` section of the configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenDataSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sparql_endpoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rest_api_base: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_formats: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_ttl_secs: Option<u64>,
}

/// Contents of the TOML configuration file. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HelpersConfig {
    pub search: SearchSection,
    pub model: ModelSection,
    pub open_data: OpenDataSection,
}

/// Returns `<config dir>/agent-helpers/config.toml`, if a config dir exists.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("agent-helpers").join("config.toml"))
}

/// Loads the configuration file. A missing file yields the defaults.
pub fn load_config(path: &Path) -> Result<HelpersConfig, AppError> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config file at {}, using defaults", path.display());
            return Ok(HelpersConfig::default());
        }
        Err(e) => {
            return Err(AppError::ConfigError(format!(
                "Failed to read {}: {}",
                path.display(),
                e
            )))
        }
    };

    toml::from_str(&contents)
        .map_err(|e| AppError::ConfigError(format!("Failed to parse {}: {}", path.display(), e)))
}

/// Writes the configuration file, creating parent directories as needed.
pub fn save_config(path: &Path, config: &HelpersConfig) -> Result<(), AppError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            AppError::ConfigError(format!("Failed to create {}: {}", parent.display(), e))
        })?;
    }
    let contents = toml::to_string_pretty(config)
        .map_err(|e| AppError::ConfigError(format!("Failed to serialize config: {}", e)))?;
    fs::write(path, contents)
        .map_err(|e| AppError::ConfigError(format!("Failed to write {}: {}", path.display(), e)))?;
    tracing::info!("Saved configuration to {}", path.display());
    Ok(())
}
