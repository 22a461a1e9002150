//! Configuration management for Checky using the prefer crate.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::api::{ApiClient, ApiError, DEFAULT_REQUEST_TIMEOUT};
use crate::chat::DEFAULT_ATTEMPT_TIMEOUT;
use crate::pipeline::{PollPolicy, TimeoutPolicy, DEFAULT_MAX_ATTEMPTS, DEFAULT_POLL_INTERVAL};

/// Default backend the client talks to.
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Application settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Base URL of the analysis backend.
    pub api_url: String,
    /// Per-request HTTP timeout in seconds.
    pub request_timeout: u64,
    /// Delay between status polls in milliseconds.
    pub poll_interval_ms: u64,
    /// Number of polls before the timeout policy applies.
    pub poll_max_attempts: u32,
    /// What to do when the poll budget runs out.
    pub on_timeout: TimeoutPolicy,
    /// Per-attempt timeout for chat shape negotiation, in seconds.
    pub chat_attempt_timeout: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT.as_secs(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL.as_millis() as u64,
            poll_max_attempts: DEFAULT_MAX_ATTEMPTS,
            on_timeout: TimeoutPolicy::default(),
            chat_attempt_timeout: DEFAULT_ATTEMPT_TIMEOUT.as_secs(),
        }
    }
}

impl Settings {
    /// Poll pacing derived from these settings.
    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy {
            interval: Duration::from_millis(self.poll_interval_ms),
            max_attempts: self.poll_max_attempts,
            on_timeout: self.on_timeout,
        }
    }

    pub fn chat_timeout(&self) -> Duration {
        Duration::from_secs(self.chat_attempt_timeout)
    }

    /// Build an HTTP client pointed at the configured backend.
    pub fn make_client(&self) -> Result<ApiClient, ApiError> {
        ApiClient::with_timeout(&self.api_url, Duration::from_secs(self.request_timeout))
    }
}

impl prefer::FromValue for TimeoutPolicy {
    fn from_value(value: &prefer::ConfigValue) -> prefer::Result<Self> {
        if let Some(s) = value.as_str() {
            if let Some(policy) = TimeoutPolicy::from_str(s) {
                return Ok(policy);
            }
        }
        Err(prefer::Error::ConversionError {
            key: String::new(),
            type_name: "TimeoutPolicy".to_string(),
            source: "expected \"force_complete\" or \"report_error\"".into(),
        })
    }
}

/// Configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize, prefer::FromValue)]
pub struct Config {
    /// Backend base URL.
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "base_url")]
    pub api_url: Option<String>,
    /// Request timeout in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout: Option<u64>,
    /// Delay between status polls in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poll_interval_ms: Option<u64>,
    /// Poll budget before the timeout policy applies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poll_max_attempts: Option<u32>,
    /// Poll timeout policy: "force_complete" or "report_error".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_timeout: Option<TimeoutPolicy>,
    /// Per-attempt chat negotiation timeout in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat_attempt_timeout: Option<u64>,
    /// Path to the config file this was loaded from (not serialized).
    #[serde(skip)]
    #[prefer(skip)]
    pub source_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration using prefer crate for discovery.
    /// Automatically discovers checky config files in standard locations.
    pub async fn load() -> Self {
        // Use prefer for file discovery, then parse with serde
        match prefer::load("checky").await {
            Ok(pref_config) => {
                if let Some(path) = pref_config.source_path() {
                    match Self::load_from_path(path).await {
                        Ok(config) => config,
                        Err(_) => Self::default(),
                    }
                } else {
                    Self::default()
                }
            }
            Err(_) => Self::default(),
        }
    }

    /// Load configuration from a specific file path.
    /// Supports JSON, TOML, and YAML based on file extension.
    pub async fn load_from_path(path: &Path) -> Result<Self, String> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

        let mut config: Config = match ext {
            "toml" => toml::from_str(&contents)
                .map_err(|e| format!("Failed to parse TOML config: {}", e))?,
            "yaml" | "yml" => serde_yaml::from_str(&contents)
                .map_err(|e| format!("Failed to parse YAML config: {}", e))?,
            _ => serde_json::from_str(&contents)
                .map_err(|e| format!("Failed to parse JSON config: {}", e))?,
        };

        config.source_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Apply configuration to settings. Unset fields keep their defaults.
    pub fn apply_to_settings(&self, settings: &mut Settings) {
        if let Some(ref api_url) = self.api_url {
            settings.api_url = api_url.clone();
        }
        if let Some(timeout) = self.request_timeout {
            settings.request_timeout = timeout;
        }
        if let Some(interval) = self.poll_interval_ms {
            settings.poll_interval_ms = interval;
        }
        if let Some(attempts) = self.poll_max_attempts {
            settings.poll_max_attempts = attempts;
        }
        if let Some(policy) = self.on_timeout {
            settings.on_timeout = policy;
        }
        if let Some(timeout) = self.chat_attempt_timeout {
            settings.chat_attempt_timeout = timeout;
        }
    }
}

/// Options for loading settings.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Explicit config file path (overrides auto-discovery).
    pub config_path: Option<PathBuf>,
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}

/// Load settings with explicit options.
/// Returns (Settings, Config) tuple.
pub async fn load_settings_with_options(options: LoadOptions) -> (Settings, Config) {
    let config = if let Some(ref config_path) = options.config_path {
        Config::load_from_path(config_path)
            .await
            .unwrap_or_else(|error| {
                tracing::warn!("{}: {}", config_path.display(), error);
                Config::default()
            })
    } else {
        Config::load().await
    };

    let mut settings = Settings::default();
    config.apply_to_settings(&mut settings);

    // CHECKY_API_URL environment variable takes precedence over config
    if let Some(api_url) = env_var("CHECKY_API_URL") {
        tracing::debug!("Using CHECKY_API_URL from environment: {}", api_url);
        settings.api_url = api_url;
    }

    // CHECKY_REQUEST_TIMEOUT environment variable takes precedence over config
    if let Some(raw) = env_var("CHECKY_REQUEST_TIMEOUT") {
        match raw.parse::<u64>() {
            Ok(secs) => {
                tracing::debug!("Using CHECKY_REQUEST_TIMEOUT from environment: {}", secs);
                settings.request_timeout = secs;
            }
            Err(_) => tracing::warn!("Ignoring unparsable CHECKY_REQUEST_TIMEOUT: {}", raw),
        }
    }

    // CHECKY_ON_TIMEOUT environment variable takes precedence over config
    if let Some(raw) = env_var("CHECKY_ON_TIMEOUT") {
        match TimeoutPolicy::from_str(&raw) {
            Some(policy) => {
                tracing::debug!("Using CHECKY_ON_TIMEOUT from environment: {}", policy.as_str());
                settings.on_timeout = policy;
            }
            None => tracing::warn!("Ignoring unrecognized CHECKY_ON_TIMEOUT: {}", raw),
        }
    }

    (settings, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.api_url, DEFAULT_API_URL);
        assert_eq!(settings.request_timeout, 20);
        assert_eq!(settings.poll_interval_ms, 2_000);
        assert_eq!(settings.poll_max_attempts, 30);
        assert_eq!(settings.on_timeout, TimeoutPolicy::ForceComplete);
        assert_eq!(settings.chat_attempt_timeout, 10);
    }

    #[test]
    fn apply_overrides_only_set_fields() {
        let config = Config {
            api_url: Some("http://contracts.internal:9000".to_string()),
            poll_max_attempts: Some(5),
            ..Default::default()
        };
        let mut settings = Settings::default();
        config.apply_to_settings(&mut settings);
        assert_eq!(settings.api_url, "http://contracts.internal:9000");
        assert_eq!(settings.poll_max_attempts, 5);
        assert_eq!(settings.poll_interval_ms, 2_000);
    }

    #[test]
    fn poll_policy_reflects_settings() {
        let settings = Settings {
            poll_interval_ms: 50,
            poll_max_attempts: 3,
            on_timeout: TimeoutPolicy::ReportError,
            ..Default::default()
        };
        let policy = settings.poll_policy();
        assert_eq!(policy.interval, Duration::from_millis(50));
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.on_timeout, TimeoutPolicy::ReportError);
    }

    #[tokio::test]
    async fn loads_toml_config() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        writeln!(
            file,
            "api_url = \"http://example.test:9000\"\non_timeout = \"report_error\""
        )
        .unwrap();

        let config = Config::load_from_path(file.path()).await.unwrap();
        assert_eq!(config.api_url.as_deref(), Some("http://example.test:9000"));
        assert_eq!(config.on_timeout, Some(TimeoutPolicy::ReportError));
        assert_eq!(config.source_path.as_deref(), Some(file.path()));
    }

    #[tokio::test]
    async fn loads_json_config_with_alias() {
        let mut file = tempfile::Builder::new()
            .suffix(".json")
            .tempfile()
            .unwrap();
        writeln!(file, "{{\"base_url\": \"http://alias.test\"}}").unwrap();

        let config = Config::load_from_path(file.path()).await.unwrap();
        assert_eq!(config.api_url.as_deref(), Some("http://alias.test"));
    }

    #[tokio::test]
    async fn rejects_malformed_config() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        writeln!(file, "api_url = [not toml").unwrap();
        assert!(Config::load_from_path(file.path()).await.is_err());
    }
}
