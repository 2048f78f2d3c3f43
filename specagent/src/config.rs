//! Application configuration from an optional JSON file and the environment.
//!
//! Environment variables take precedence over the file named by
//! `CONFIG_PATH`; empty values count as unset.
//!
//! ```rust
//! use std::collections::HashMap;
//!
//! use specagent::{AppConfig, LogLevel, StoreKind};
//!
//! let env = HashMap::from([
//!     ("LOG_LEVEL", "debug"),
//!     ("SPEC_STORE", "memory"),
//!     ("MAX_TOOL_ROUND_TRIPS", "2"),
//! ]);
//!
//! let config = AppConfig::from_lookup(|key| env.get(key).map(|value| value.to_string()))
//!     .expect("config should load");
//! assert_eq!(config.log_level, LogLevel::Debug);
//! assert_eq!(config.store_kind, StoreKind::Memory);
//! assert_eq!(config.max_tool_round_trips, 2);
//! assert_eq!(config.agent.model, "gpt-5-nano");
//! ```

use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Duration;

use fagent::{AgentConfig, DEFAULT_MAX_TOOL_ROUND_TRIPS};
use fprovider::ProviderId;
use fstore::{StoreConfig, default_filesystem_root, default_sqlite_path};
use serde::Deserialize;

pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigErrorKind {
    InvalidValue,
    File,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    pub kind: ConfigErrorKind,
    pub message: String,
}

impl ConfigError {
    pub fn new(kind: ConfigErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn invalid_value(key: &str, value: &str, expected: &str) -> Self {
        Self::new(
            ConfigErrorKind::InvalidValue,
            format!("{key} must be {expected}; got '{value}'"),
        )
    }

    pub fn file(message: impl Into<String>) -> Self {
        Self::new(ConfigErrorKind::File, message)
    }
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl Error for ConfigError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warning,
    Error,
    Silent,
}

impl LogLevel {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "trace" => Some(Self::Trace),
            "debug" => Some(Self::Debug),
            "info" => Some(Self::Info),
            "warning" | "warn" => Some(Self::Warning),
            "error" => Some(Self::Error),
            "silent" | "off" => Some(Self::Silent),
            _ => None,
        }
    }

    /// Filter directive for the subscriber; `None` when logging is off.
    pub fn directive(&self) -> Option<&'static str> {
        match self {
            Self::Trace => Some("trace"),
            Self::Debug => Some("debug"),
            Self::Info => Some("info"),
            Self::Warning => Some("warn"),
            Self::Error => Some("error"),
            Self::Silent => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreKind {
    #[default]
    Sqlite,
    Filesystem,
    Memory,
}

impl StoreKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Some(Self::Sqlite),
            "filesystem" | "fs" => Some(Self::Filesystem),
            "memory" | "in-memory" | "inmemory" => Some(Self::Memory),
            _ => None,
        }
    }
}

/// Provider API keys; `Debug` never prints the values.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct ProviderKeys {
    pub openai: Option<String>,
    pub anthropic: Option<String>,
    pub google: Option<String>,
}

impl ProviderKeys {
    pub fn get(&self, provider: ProviderId) -> Option<&str> {
        match provider {
            ProviderId::OpenAi => self.openai.as_deref(),
            ProviderId::Anthropic => self.anthropic.as_deref(),
            ProviderId::Google => self.google.as_deref(),
        }
    }

    pub fn configured(&self) -> Vec<ProviderId> {
        ProviderId::ALL
            .into_iter()
            .filter(|provider| self.get(*provider).is_some())
            .collect()
    }
}

impl Debug for ProviderKeys {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let redact = |key: &Option<String>| key.as_ref().map(|_| "<redacted>");
        f.debug_struct("ProviderKeys")
            .field("openai", &redact(&self.openai))
            .field("anthropic", &redact(&self.anthropic))
            .field("google", &redact(&self.google))
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub log_level: LogLevel,
    pub store_kind: StoreKind,
    pub store_path: Option<PathBuf>,
    pub provider_keys: ProviderKeys,
    pub agent: AgentConfig,
    pub openapi_base_url: Option<String>,
    pub http_timeout: Duration,
    pub max_tool_round_trips: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
            store_kind: StoreKind::default(),
            store_path: None,
            provider_keys: ProviderKeys::default(),
            agent: AgentConfig::default(),
            openapi_base_url: None,
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            max_tool_round_trips: DEFAULT_MAX_TOOL_ROUND_TRIPS,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileConfig {
    log_level: Option<String>,
    spec_store: Option<String>,
    spec_store_path: Option<PathBuf>,
    openai_api_key: Option<String>,
    anthropic_api_key: Option<String>,
    google_api_key: Option<String>,
    agent_id: Option<String>,
    agent_model: Option<String>,
    agent_system_prompt: Option<String>,
    openapi_base_url: Option<String>,
    http_timeout_secs: Option<u64>,
    max_tool_round_trips: Option<usize>,
}

impl AppConfig {
    /// Loads from the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let file = match lookup("CONFIG_PATH") {
            Some(path) => read_file_config(Path::new(&path))?,
            None => FileConfig::default(),
        };

        Self::from_sources(lookup, file)
    }

    fn from_sources<F>(lookup: F, file: FileConfig) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let log_level = match lookup("LOG_LEVEL").or(file.log_level) {
            Some(value) => LogLevel::parse(&value).ok_or_else(|| {
                ConfigError::invalid_value(
                    "LOG_LEVEL",
                    &value,
                    "one of trace, debug, info, warning, error, silent",
                )
            })?,
            None => defaults.log_level,
        };

        let store_kind = match lookup("SPEC_STORE").or(file.spec_store) {
            Some(value) => StoreKind::parse(&value).ok_or_else(|| {
                ConfigError::invalid_value("SPEC_STORE", &value, "one of sqlite, filesystem, memory")
            })?,
            None => defaults.store_kind,
        };

        let store_path = lookup("SPEC_STORE_PATH")
            .map(PathBuf::from)
            .or(file.spec_store_path);

        let provider_keys = ProviderKeys {
            openai: lookup("OPENAI_API_KEY").or(file.openai_api_key),
            anthropic: lookup("ANTHROPIC_API_KEY").or(file.anthropic_api_key),
            google: lookup("GOOGLE_API_KEY").or(file.google_api_key),
        };

        let mut agent = defaults.agent;
        if let Some(id) = lookup("AGENT_ID").or(file.agent_id) {
            agent.id = id;
        }
        if let Some(model) = lookup("AGENT_MODEL").or(file.agent_model) {
            agent.model = model.trim().to_string();
        }
        if let Some(prompt) = lookup("AGENT_SYSTEM_PROMPT").or(file.agent_system_prompt) {
            agent.system_prompt = prompt;
        }

        let openapi_base_url = match lookup("OPENAPI_BASE_URL").or(file.openapi_base_url) {
            Some(value) => Some(parse_base_url(&value)?),
            None => None,
        };

        let http_timeout_secs = match lookup("HTTP_TIMEOUT_SECS") {
            Some(value) => Some(parse_number::<u64>("HTTP_TIMEOUT_SECS", &value)?),
            None => file.http_timeout_secs,
        };
        let http_timeout = match http_timeout_secs {
            Some(0) => {
                return Err(ConfigError::invalid_value(
                    "HTTP_TIMEOUT_SECS",
                    "0",
                    "a positive number of seconds",
                ));
            }
            Some(secs) => Duration::from_secs(secs),
            None => defaults.http_timeout,
        };

        let max_tool_round_trips = match lookup("MAX_TOOL_ROUND_TRIPS") {
            Some(value) => parse_number::<usize>("MAX_TOOL_ROUND_TRIPS", &value)?,
            None => file
                .max_tool_round_trips
                .unwrap_or(defaults.max_tool_round_trips),
        };

        Ok(Self {
            log_level,
            store_kind,
            store_path,
            provider_keys,
            agent,
            openapi_base_url,
            http_timeout,
            max_tool_round_trips,
        })
    }

    /// Store selection with the backend default path filled in.
    pub fn store_config(&self) -> StoreConfig {
        match self.store_kind {
            StoreKind::Sqlite => StoreConfig::Sqlite {
                path: self.store_path.clone().unwrap_or_else(default_sqlite_path),
            },
            StoreKind::Filesystem => StoreConfig::Filesystem {
                root: self
                    .store_path
                    .clone()
                    .unwrap_or_else(default_filesystem_root),
            },
            StoreKind::Memory => StoreConfig::InMemory,
        }
    }
}

fn read_file_config(path: &Path) -> Result<FileConfig, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|error| {
        ConfigError::file(format!(
            "failed to read config file '{}': {error}",
            path.display()
        ))
    })?;

    serde_json::from_str(&raw).map_err(|error| {
        ConfigError::file(format!(
            "failed to parse config file '{}': {error}",
            path.display()
        ))
    })
}

fn parse_number<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
{
    value
        .trim()
        .parse::<T>()
        .map_err(|_| ConfigError::invalid_value(key, value, "a non-negative integer"))
}

fn parse_base_url(value: &str) -> Result<String, ConfigError> {
    let trimmed = value.trim();
    match reqwest::Url::parse(trimmed) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(trimmed.to_string()),
        _ => Err(ConfigError::invalid_value(
            "OPENAPI_BASE_URL",
            value,
            "an absolute http(s) URL",
        )),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::time::{SystemTime, UNIX_EPOCH};

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key| env.get(key).cloned()
    }

    fn temp_file(prefix: &str, contents: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be after epoch")
            .as_nanos();
        let path = std::env::temp_dir().join(format!("{prefix}-{nanos}.json"));
        std::fs::write(&path, contents).expect("config file should write");
        path
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = AppConfig::from_lookup(lookup_from(&[])).expect("config should load");

        assert_eq!(config, AppConfig::default());
        assert_eq!(config.agent.system_prompt, "You are a helpful agent.");
        assert_eq!(config.http_timeout, Duration::from_secs(30));
        assert_eq!(config.max_tool_round_trips, 4);
        assert!(matches!(config.store_config(), StoreConfig::Sqlite { .. }));
    }

    #[test]
    fn environment_values_are_parsed() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("LOG_LEVEL", "WARNING"),
            ("SPEC_STORE", "filesystem"),
            ("SPEC_STORE_PATH", "/var/lib/specagent"),
            ("OPENAI_API_KEY", "sk-test"),
            ("AGENT_MODEL", " claude-opus-4.1 "),
            ("AGENT_SYSTEM_PROMPT", "Answer with tools."),
            ("OPENAPI_BASE_URL", "https://api.example.com/v1"),
            ("HTTP_TIMEOUT_SECS", "5"),
            ("MAX_TOOL_ROUND_TRIPS", "0"),
        ]))
        .expect("config should load");

        assert_eq!(config.log_level, LogLevel::Warning);
        assert_eq!(
            config.store_config(),
            StoreConfig::Filesystem {
                root: PathBuf::from("/var/lib/specagent")
            }
        );
        assert_eq!(config.provider_keys.get(ProviderId::OpenAi), Some("sk-test"));
        assert_eq!(config.provider_keys.configured(), vec![ProviderId::OpenAi]);
        assert_eq!(config.agent.model, "claude-opus-4.1");
        assert_eq!(config.agent.system_prompt, "Answer with tools.");
        assert_eq!(
            config.openapi_base_url.as_deref(),
            Some("https://api.example.com/v1")
        );
        assert_eq!(config.http_timeout, Duration::from_secs(5));
        assert_eq!(config.max_tool_round_trips, 0);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let cases = [
            ("LOG_LEVEL", "verbose"),
            ("SPEC_STORE", "postgres"),
            ("HTTP_TIMEOUT_SECS", "soon"),
            ("HTTP_TIMEOUT_SECS", "0"),
            ("MAX_TOOL_ROUND_TRIPS", "-1"),
            ("OPENAPI_BASE_URL", "ftp://files.example.com"),
            ("OPENAPI_BASE_URL", "/relative"),
        ];

        for (key, value) in cases {
            let error = AppConfig::from_lookup(lookup_from(&[(key, value)]))
                .expect_err("value should be rejected");
            assert_eq!(error.kind, ConfigErrorKind::InvalidValue, "{key}={value}");
            assert!(error.message.starts_with(key), "{}", error.message);
        }
    }

    #[test]
    fn empty_environment_values_count_as_unset() {
        let config = AppConfig::from_lookup(lookup_from(&[("LOG_LEVEL", ""), ("AGENT_MODEL", " ")]))
            .expect("config should load");

        assert_eq!(config.log_level, LogLevel::Info);
        assert_eq!(config.agent.model, "gpt-5-nano");
    }

    #[test]
    fn file_values_apply_and_environment_wins() {
        let path = temp_file(
            "specagent-config",
            r#"{
                "log_level": "error",
                "spec_store": "memory",
                "agent_model": "gemini-2.5-flash",
                "http_timeout_secs": 12,
                "max_tool_round_trips": 6
            }"#,
        );
        let path_value = path.display().to_string();

        let config = AppConfig::from_lookup(lookup_from(&[
            ("CONFIG_PATH", path_value.as_str()),
            ("LOG_LEVEL", "debug"),
        ]))
        .expect("config should load");

        assert_eq!(config.log_level, LogLevel::Debug);
        assert_eq!(config.store_config(), StoreConfig::InMemory);
        assert_eq!(config.agent.model, "gemini-2.5-flash");
        assert_eq!(config.http_timeout, Duration::from_secs(12));
        assert_eq!(config.max_tool_round_trips, 6);

        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn unreadable_or_unknown_file_content_is_a_file_error() {
        let missing = AppConfig::from_lookup(lookup_from(&[(
            "CONFIG_PATH",
            "/definitely/not/here/specagent.json",
        )]))
        .expect_err("missing file should fail");
        assert_eq!(missing.kind, ConfigErrorKind::File);

        let path = temp_file("specagent-config-unknown", r#"{"log_leve": "info"}"#);
        let path_value = path.display().to_string();
        let unknown = AppConfig::from_lookup(lookup_from(&[("CONFIG_PATH", path_value.as_str())]))
            .expect_err("unknown keys should fail");
        assert_eq!(unknown.kind, ConfigErrorKind::File);
        assert!(unknown.message.contains("log_leve"));

        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn provider_keys_are_redacted_in_debug_output() {
        let keys = ProviderKeys {
            anthropic: Some("secret-value".to_string()),
            ..ProviderKeys::default()
        };

        let rendered = format!("{keys:?}");
        assert!(!rendered.contains("secret-value"));
        assert!(rendered.contains("<redacted>"));
    }
}
