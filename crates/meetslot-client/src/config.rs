//! Configuration management
//!
//! Settings are resolved in this order (later wins):
//! 1. Built-in defaults
//! 2. `meetslot.toml` (or an explicit path)
//! 3. `MEETSLOT_*` environment variables
//!
//! `${VAR_NAME}` references inside the TOML file are expanded from the
//! environment before parsing, so secrets can stay out of the file.

use crate::error::{ClientError, Result};
use chrono_tz::Tz;
use meetslot_engine::window::parse_timezone;
use meetslot_engine::WorkingHours;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;
use std::time::Duration;

/// Default config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "meetslot.toml";

static ENV_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("valid env regex"));

/// Language-model endpoint used by the suggestion service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LlmConfig {
    /// OpenAI-compatible base URL (`.../v1`).
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,

    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_llm_model")]
    pub model: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_llm_base_url(),
            api_key: String::new(),
            model: default_llm_model(),
        }
    }
}

/// Host working hours as `HH:MM` strings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HoursConfig {
    #[serde(default = "default_open")]
    pub open: String,
    #[serde(default = "default_close")]
    pub close: String,
}

impl Default for HoursConfig {
    fn default() -> Self {
        Self {
            open: default_open(),
            close: default_close(),
        }
    }
}

/// Main configuration for the meetslot clients.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClientConfig {
    /// Availability webhook (GET, returns busy intervals).
    #[serde(default)]
    pub availability_url: String,

    /// Booking webhook (POST, accepts the booking payload).
    #[serde(default)]
    pub booking_url: String,

    /// Host timezone; the single local timezone of every slot computation.
    #[serde(default = "default_timezone")]
    pub timezone: String,

    /// Per-request HTTP timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_step_minutes")]
    pub step_minutes: u32,

    #[serde(default)]
    pub hours: HoursConfig,

    #[serde(default)]
    pub llm: LlmConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            availability_url: String::new(),
            booking_url: String::new(),
            timezone: default_timezone(),
            timeout_secs: default_timeout_secs(),
            step_minutes: default_step_minutes(),
            hours: HoursConfig::default(),
            llm: LlmConfig::default(),
        }
    }
}

fn default_llm_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_llm_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_open() -> String {
    "09:00".to_string()
}

fn default_close() -> String {
    "18:00".to_string()
}

fn default_timezone() -> String {
    "UTC".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_step_minutes() -> u32 {
    meetslot_engine::DEFAULT_STEP_MINUTES
}

impl ClientConfig {
    /// Replace `${VAR}` references with environment values.
    ///
    /// Unknown variables are left as-is so the error surfaces where the value is used.
    fn expand_env_vars(content: &str) -> String {
        ENV_REF
            .replace_all(content, |caps: &Captures| {
                std::env::var(&caps[1]).unwrap_or_else(|_| caps[0].to_string())
            })
            .into_owned()
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let expanded = Self::expand_env_vars(content);
        toml::from_str(&expanded).map_err(|e| ClientError::Config(e.to_string()))
    }

    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            ClientError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Load from `path`, or from `./meetslot.toml` when present, then apply
    /// environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_toml_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_toml_file(DEFAULT_CONFIG_FILE)?
            }
            None => Self::default(),
        };
        config.apply_env_overrides();
        Ok(config)
    }

    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply `MEETSLOT_*` overrides from an arbitrary lookup.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("MEETSLOT_AVAILABILITY_URL") {
            self.availability_url = url;
        }
        if let Some(url) = lookup("MEETSLOT_BOOKING_URL") {
            self.booking_url = url;
        }
        if let Some(tz) = lookup("MEETSLOT_TIMEZONE") {
            self.timezone = tz;
        }
        if let Some(secs) = lookup("MEETSLOT_TIMEOUT_SECS").and_then(|s| s.parse().ok()) {
            self.timeout_secs = secs;
        }
        if let Some(url) = lookup("MEETSLOT_LLM_BASE_URL") {
            self.llm.base_url = url;
        }
        if let Some(key) = lookup("MEETSLOT_LLM_API_KEY") {
            self.llm.api_key = key;
        }
        if let Some(model) = lookup("MEETSLOT_LLM_MODEL") {
            self.llm.model = model;
        }
    }

    pub fn timezone(&self) -> Result<Tz> {
        Ok(parse_timezone(&self.timezone)?)
    }

    pub fn working_hours(&self) -> Result<WorkingHours> {
        Ok(WorkingHours::parse(&self.hours.open, &self.hours.close)?)
    }

    /// Return `value` or a configuration error naming the missing setting.
    pub fn require<'a>(value: &'a str, name: &str) -> Result<&'a str> {
        if value.trim().is_empty() {
            return Err(ClientError::Config(format!("{} is not configured", name)));
        }
        Ok(value)
    }

    /// Shared HTTP client honoring the configured timeout.
    pub fn http_client(&self) -> Result<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(Duration::from_secs(self.timeout_secs))
            .build()
            .map_err(ClientError::Http)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.timezone, "UTC");
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.step_minutes, 30);
        assert_eq!(config.working_hours().unwrap(), WorkingHours::default());
    }

    #[test]
    fn parses_partial_toml() {
        let config = ClientConfig::from_toml_str(
            r#"
            availability_url = "https://hooks.example.com/availability"
            timezone = "Europe/Madrid"

            [hours]
            open = "08:30"

            [llm]
            model = "local-model"
            "#,
        )
        .unwrap();

        assert_eq!(config.availability_url, "https://hooks.example.com/availability");
        assert_eq!(config.timezone().unwrap(), chrono_tz::Europe::Madrid);
        assert_eq!(config.hours.open, "08:30");
        assert_eq!(config.hours.close, "18:00");
        assert_eq!(config.llm.model, "local-model");
        assert_eq!(config.llm.base_url, "https://api.openai.com/v1");
    }

    #[test]
    fn unknown_env_reference_is_left_intact() {
        let config =
            ClientConfig::from_toml_str(r#"booking_url = "${MEETSLOT_TEST_SURELY_UNSET_VAR}""#)
                .unwrap();
        assert_eq!(config.booking_url, "${MEETSLOT_TEST_SURELY_UNSET_VAR}");
    }

    #[test]
    fn invalid_toml_is_a_config_error() {
        assert!(matches!(
            ClientConfig::from_toml_str("timeout_secs = \"soon\""),
            Err(ClientError::Config(_))
        ));
    }

    #[test]
    fn overrides_replace_file_values() {
        let vars: HashMap<&str, &str> = [
            ("MEETSLOT_BOOKING_URL", "https://hooks.example.com/book"),
            ("MEETSLOT_TIMEOUT_SECS", "5"),
            ("MEETSLOT_LLM_API_KEY", "sk-test"),
        ]
        .into_iter()
        .collect();

        let mut config = ClientConfig::default();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.booking_url, "https://hooks.example.com/book");
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.llm.api_key, "sk-test");
        assert!(config.availability_url.is_empty());
    }

    #[test]
    fn require_rejects_empty_values() {
        assert!(ClientConfig::require("", "booking_url").is_err());
        assert_eq!(ClientConfig::require("x", "booking_url").unwrap(), "x");
    }

    #[test]
    fn invalid_timezone_and_hours_are_reported() {
        let mut config = ClientConfig::default();
        config.timezone = "Atlantis/Capital".to_string();
        assert!(config.timezone().is_err());

        config.hours.open = "19:00".to_string();
        assert!(config.working_hours().is_err());
    }
}
