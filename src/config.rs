//! Agent configuration
//!
//! Every field has a default, so the agent runs with no file at all. A TOML
//! file may override any subset of fields; `PORT` in the environment then
//! overrides the listen port.

use crate::llm::providers::gemini::{GeminiConfig, DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MODEL};
use serde::{Deserialize, Serialize};
use std::net::{SocketAddr, ToSocketAddrs};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Files tried in order when no explicit path is given
pub const DEFAULT_CONFIG_PATHS: &[&str] = &["agent.toml", "config/agent.toml"];

pub const PORT_ENV: &str = "PORT";

const SUPPORTED_PROVIDERS: &[&str] = &["gemini"];

/// Main agent configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AgentConfig {
    pub agent: AgentSection,
    pub server: ServerSection,
    pub llm: LlmSection,
}

/// Identity advertised in the agent card
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AgentSection {
    pub name: String,
    pub description: String,
    /// Public URL clients use to reach this agent
    pub url: String,
    pub version: String,
}

impl Default for AgentSection {
    fn default() -> Self {
        Self {
            name: "Migration Pathways Agent".to_string(),
            description: "An AI-powered agent that provides real-time, personalized migration \
                          pathway recommendations using Gemini LLM. Get current visa options, \
                          costs, requirements, and success probabilities based on your profile \
                          and destination country."
                .to_string(),
            url: "http://localhost:8080".to_string(),
            version: "2.0.0".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerSection {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LlmSection {
    /// Provider name; only "gemini" is wired up
    pub provider: String,
    pub model: String,
    pub base_url: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
    /// Consulted when `api_key_env` is unset or empty
    pub fallback_api_key_env: Option<String>,
    pub timeout_secs: u64,
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            provider: "gemini".to_string(),
            model: DEFAULT_GEMINI_MODEL.to_string(),
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
            fallback_api_key_env: Some("GOOGLE_API_KEY".to_string()),
            timeout_secs: 60,
        }
    }
}

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("Failed to render TOML: {0}")]
    TomlRender(#[from] toml::ser::Error),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl AgentConfig {
    /// Load configuration from a TOML file and validate it
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: AgentConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve the effective configuration for a run
    ///
    /// An explicit path must exist. Without one, the first existing default
    /// path is used, else built-in defaults. Environment overrides apply
    /// last.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match explicit.map(Path::to_path_buf).or_else(find_default_file) {
            Some(path) => {
                debug!(path = %path.display(), "Loading configuration file");
                Self::load_from_file(&path)?
            }
            None => {
                debug!("No configuration file found, using defaults");
                Self::default()
            }
        };

        config.override_port(std::env::var(PORT_ENV).ok().as_deref())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply a `PORT`-style override; blank values are ignored
    pub fn override_port(&mut self, port: Option<&str>) -> Result<(), ConfigError> {
        let Some(port) = port.map(str::trim).filter(|p| !p.is_empty()) else {
            return Ok(());
        };

        self.server.port = port
            .parse()
            .map_err(|_| ConfigError::InvalidConfig(format!("invalid port '{port}'")))?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.agent.name.trim().is_empty() {
            return Err(ConfigError::InvalidConfig(
                "agent.name must not be empty".to_string(),
            ));
        }

        url::Url::parse(&self.agent.url).map_err(|e| {
            ConfigError::InvalidConfig(format!("agent.url '{}' is invalid: {e}", self.agent.url))
        })?;
        url::Url::parse(&self.llm.base_url).map_err(|e| {
            ConfigError::InvalidConfig(format!(
                "llm.base_url '{}' is invalid: {e}",
                self.llm.base_url
            ))
        })?;

        if !SUPPORTED_PROVIDERS.contains(&self.llm.provider.as_str()) {
            return Err(ConfigError::InvalidConfig(format!(
                "unsupported LLM provider '{}'",
                self.llm.provider
            )));
        }

        if self.llm.model.trim().is_empty() {
            return Err(ConfigError::InvalidConfig(
                "llm.model must not be empty".to_string(),
            ));
        }

        if self.llm.timeout_secs == 0 {
            return Err(ConfigError::InvalidConfig(
                "llm.timeout_secs must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    /// API key from the process environment
    pub fn api_key(&self) -> Option<String> {
        self.api_key_from(|name| std::env::var(name).ok())
    }

    /// API key resolved through `lookup`: the primary variable, then the
    /// fallback; empty values count as unset
    pub fn api_key_from<F>(&self, lookup: F) -> Option<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        std::iter::once(self.llm.api_key_env.as_str())
            .chain(self.llm.fallback_api_key_env.as_deref())
            .filter_map(|name| lookup(name))
            .find(|value| !value.trim().is_empty())
    }

    pub fn bind_address(&self) -> Result<SocketAddr, ConfigError> {
        (self.server.host.as_str(), self.server.port)
            .to_socket_addrs()
            .map_err(|e| {
                ConfigError::InvalidConfig(format!(
                    "cannot resolve {}:{}: {e}",
                    self.server.host, self.server.port
                ))
            })?
            .next()
            .ok_or_else(|| {
                ConfigError::InvalidConfig(format!(
                    "no address for {}:{}",
                    self.server.host, self.server.port
                ))
            })
    }

    pub fn gemini_config(&self, api_key: Option<String>) -> GeminiConfig {
        GeminiConfig {
            api_key: api_key.unwrap_or_default(),
            base_url: self.llm.base_url.clone(),
            timeout: Duration::from_secs(self.llm.timeout_secs),
        }
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

fn find_default_file() -> Option<PathBuf> {
    DEFAULT_CONFIG_PATHS
        .iter()
        .map(PathBuf::from)
        .find(|path| path.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = AgentConfig::default();

        assert_eq!(config.agent.name, "Migration Pathways Agent");
        assert_eq!(config.agent.version, "2.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.llm.provider, "gemini");
        assert_eq!(config.llm.api_key_env, "GEMINI_API_KEY");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let toml_content = r#"
[agent]
url = "https://agent.example.com"

[server]
port = 9090
"#;

        let config: AgentConfig = toml::from_str(toml_content).unwrap();
        assert_eq!(config.agent.url, "https://agent.example.com");
        assert_eq!(config.agent.name, "Migration Pathways Agent");
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.llm.timeout_secs, 60);
    }

    #[test]
    fn test_port_override() {
        let mut config = AgentConfig::default();

        config.override_port(Some("3000")).unwrap();
        assert_eq!(config.server.port, 3000);

        config.override_port(Some("  ")).unwrap();
        config.override_port(None).unwrap();
        assert_eq!(config.server.port, 3000);

        assert!(config.override_port(Some("http")).is_err());
        assert!(config.override_port(Some("70000")).is_err());
    }

    #[test]
    fn test_api_key_fallback() {
        let config = AgentConfig::default();
        let env: HashMap<&str, &str> =
            [("GEMINI_API_KEY", ""), ("GOOGLE_API_KEY", "google-key")].into();

        let key = config.api_key_from(|name| env.get(name).map(|v| v.to_string()));
        assert_eq!(key.as_deref(), Some("google-key"));

        let env: HashMap<&str, &str> =
            [("GEMINI_API_KEY", "gemini-key"), ("GOOGLE_API_KEY", "google-key")].into();
        let key = config.api_key_from(|name| env.get(name).map(|v| v.to_string()));
        assert_eq!(key.as_deref(), Some("gemini-key"));

        assert_eq!(config.api_key_from(|_| None), None);
    }

    #[test]
    fn test_validation_failures() {
        let mut config = AgentConfig::default();
        config.llm.provider = "openai".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidConfig(_))
        ));

        let mut config = AgentConfig::default();
        config.agent.url = "not a url".to_string();
        assert!(config.validate().is_err());

        let mut config = AgentConfig::default();
        config.llm.timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = AgentConfig::default();
        config.agent.name = " ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bind_address() {
        let mut config = AgentConfig::default();
        config.server.host = "127.0.0.1".to_string();
        config.server.port = 4321;

        let addr = config.bind_address().unwrap();
        assert_eq!(addr.port(), 4321);
        assert!(addr.ip().is_loopback());
    }

    #[test]
    fn test_gemini_config_mapping() {
        let mut config = AgentConfig::default();
        config.llm.timeout_secs = 5;

        let gemini = config.gemini_config(Some("k".to_string()));
        assert_eq!(gemini.api_key, "k");
        assert_eq!(gemini.timeout, Duration::from_secs(5));
        assert_eq!(gemini.base_url, DEFAULT_GEMINI_BASE_URL);

        assert!(config.gemini_config(None).api_key.is_empty());
    }

    #[test]
    fn test_toml_render_round_trips() {
        let config = AgentConfig::default();
        let rendered = config.to_toml().unwrap();

        assert!(rendered.contains("[agent]"));
        let parsed: AgentConfig = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed, config);
    }
}
