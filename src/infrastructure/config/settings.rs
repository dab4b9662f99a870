//! Application configuration loading and validation.
//!
//! Provides the main [`Config`] struct that aggregates all agent settings.
//! Configuration is loaded from a TOML file; the New Relic license key may
//! instead come from the `NEW_RELIC_LICENSE_KEY` environment variable.
//!
//! # Example
//!
//! ```no_run
//! use twemrelic::infrastructure::config::settings::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("config.toml")?;
//!     config.init_logging();
//!     Ok(())
//! }
//! ```

use std::path::Path;

use serde::Deserialize;

use super::logging::LoggingConfig;
use crate::adapter::outbound::newrelic::{DEFAULT_ENDPOINT, DEFAULT_GUID};
use crate::adapter::outbound::twemproxy::DEFAULT_PORT;
use crate::application::collector::CollectOptions;
use crate::application::report::ServerNaming;
use crate::error::{ConfigError, Result};

/// Environment variable holding the New Relic license key.
pub const LICENSE_KEY_ENV: &str = "NEW_RELIC_LICENSE_KEY";

/// Twemproxy stats endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TwemproxyConfig {
    /// Stats host.
    #[serde(default = "default_host")]
    pub host: String,
    /// Stats port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Connect and read timeout in seconds (default: 5).
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Component name reported upstream. Defaults to `host`.
    #[serde(default)]
    pub name: Option<String>,
}

fn default_host() -> String {
    "localhost".to_string()
}

const fn default_port() -> u16 {
    DEFAULT_PORT
}

const fn default_timeout_secs() -> u64 {
    5
}

impl Default for TwemproxyConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            timeout_secs: default_timeout_secs(),
            name: None,
        }
    }
}

/// New Relic delivery settings.
#[derive(Debug, Clone, Deserialize)]
pub struct NewRelicConfig {
    /// Deliver to New Relic. When false, batches are only logged.
    #[serde(default)]
    pub enabled: bool,
    /// Platform API endpoint.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Plugin GUID.
    #[serde(default = "default_guid")]
    pub guid: String,
    /// License key; `NEW_RELIC_LICENSE_KEY` takes precedence.
    #[serde(default)]
    pub license_key: Option<String>,
    /// Reporting host name. Defaults to `$HOSTNAME`, then `localhost`.
    #[serde(default)]
    pub host: Option<String>,
    /// HTTP request timeout in seconds (default: 10).
    #[serde(default = "default_newrelic_timeout_secs")]
    pub timeout_secs: u64,
}

const fn default_newrelic_timeout_secs() -> u64 {
    10
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_guid() -> String {
    DEFAULT_GUID.to_string()
}

impl Default for NewRelicConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: default_endpoint(),
            guid: default_guid(),
            license_key: None,
            host: None,
            timeout_secs: default_newrelic_timeout_secs(),
        }
    }
}

/// Metric naming settings.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct MetricsConfig {
    /// Server metric naming (`qualified` or `unqualified`).
    #[serde(default)]
    pub server_names: ServerNaming,
}

/// Main application configuration.
///
/// Every section is optional; an empty file yields a valid config that polls
/// `localhost:22222` every 60 seconds and logs the batches.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Seconds between collection cycles (default: 60).
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    #[serde(default)]
    pub twemproxy: TwemproxyConfig,

    #[serde(default)]
    pub newrelic: NewRelicConfig,

    #[serde(default)]
    pub metrics: MetricsConfig,

    /// Logging and tracing configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

const fn default_interval_secs() -> u64 {
    60
}

impl Default for Config {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            twemproxy: TwemproxyConfig::default(),
            newrelic: NewRelicConfig::default(),
            metrics: MetricsConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Parse configuration from TOML content.
    ///
    /// Reads the license key from `NEW_RELIC_LICENSE_KEY` when set.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed or validation fails.
    pub fn parse_toml(content: &str) -> Result<Self> {
        Self::parse_toml_with_license(content, std::env::var(LICENSE_KEY_ENV).ok())
    }

    /// Parse configuration with an explicit license key override.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed or validation fails.
    pub fn parse_toml_with_license(content: &str, license_key: Option<String>) -> Result<Self> {
        let mut config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;

        if let Some(key) = license_key.filter(|key| !key.trim().is_empty()) {
            config.newrelic.license_key = Some(key);
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read
    /// - The TOML content is malformed
    /// - Validation fails
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns the first invalid field found.
    pub fn validate(&self) -> Result<()> {
        if self.interval_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "interval_secs",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if self.twemproxy.host.trim().is_empty() {
            return Err(ConfigError::MissingField { field: "host" }.into());
        }
        if self.twemproxy.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "port",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if self.twemproxy.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "timeout_secs",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if self.twemproxy.timeout_secs >= self.interval_secs {
            return Err(ConfigError::InvalidValue {
                field: "timeout_secs",
                reason: "must be shorter than interval_secs".to_string(),
            }
            .into());
        }

        if self.newrelic.enabled {
            let endpoint = url::Url::parse(&self.newrelic.endpoint).map_err(|e| {
                ConfigError::InvalidValue {
                    field: "endpoint",
                    reason: e.to_string(),
                }
            })?;
            if !matches!(endpoint.scheme(), "http" | "https") {
                return Err(ConfigError::InvalidValue {
                    field: "endpoint",
                    reason: format!("unsupported scheme '{}'", endpoint.scheme()),
                }
                .into());
            }
            if self.newrelic.timeout_secs == 0 {
                return Err(ConfigError::InvalidValue {
                    field: "newrelic.timeout_secs",
                    reason: "must be greater than 0".to_string(),
                }
                .into());
            }
            if self.newrelic.timeout_secs >= self.interval_secs {
                return Err(ConfigError::InvalidValue {
                    field: "newrelic.timeout_secs",
                    reason: "must be shorter than interval_secs".to_string(),
                }
                .into());
            }
            if self.newrelic.guid.trim().is_empty() {
                return Err(ConfigError::MissingField { field: "guid" }.into());
            }
            if self.license_key().is_none() {
                return Err(ConfigError::MissingField {
                    field: LICENSE_KEY_ENV,
                }
                .into());
            }
        }

        Ok(())
    }

    /// Apply `--host` / `--port` overrides and re-validate.
    ///
    /// # Errors
    ///
    /// Returns an error if an override is invalid.
    pub fn override_source(&mut self, host: Option<&str>, port: Option<u16>) -> Result<()> {
        if let Some(host) = host {
            self.twemproxy.host = host.to_string();
        }
        if let Some(port) = port {
            self.twemproxy.port = port;
        }
        self.validate()
    }

    /// Initialize logging based on configuration.
    pub fn init_logging(&self) {
        self.logging.init();
    }

    /// Component name reported upstream.
    #[must_use]
    pub fn component_name(&self) -> &str {
        self.twemproxy
            .name
            .as_deref()
            .unwrap_or(&self.twemproxy.host)
    }

    /// Non-empty license key, if any.
    #[must_use]
    pub fn license_key(&self) -> Option<&str> {
        self.newrelic
            .license_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
    }

    /// Host name reported in the agent block.
    #[must_use]
    pub fn agent_host(&self) -> String {
        self.newrelic
            .host
            .clone()
            .or_else(|| std::env::var("HOSTNAME").ok())
            .unwrap_or_else(|| "localhost".to_string())
    }

    /// Engine options derived from the `[metrics]` section.
    #[must_use]
    pub fn collect_options(&self) -> CollectOptions {
        CollectOptions::with_naming(self.metrics.server_names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn empty_file_uses_defaults() {
        let config = Config::parse_toml_with_license("", None).unwrap();

        assert_eq!(config.interval_secs, 60);
        assert_eq!(config.twemproxy.host, "localhost");
        assert_eq!(config.twemproxy.port, 22222);
        assert_eq!(config.twemproxy.timeout_secs, 5);
        assert!(!config.newrelic.enabled);
        assert_eq!(config.newrelic.guid, DEFAULT_GUID);
        assert_eq!(config.metrics.server_names, ServerNaming::Qualified);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.component_name(), "localhost");
    }

    #[test]
    fn parses_all_sections() {
        let toml = r#"
interval_secs = 30

[twemproxy]
host = "10.1.2.3"
port = 22223
timeout_secs = 2
name = "cache-east"

[newrelic]
enabled = true
license_key = "abc"
host = "agent-1"

[metrics]
server_names = "unqualified"

[logging]
level = "debug"
format = "json"
"#;
        let config = Config::parse_toml_with_license(toml, None).unwrap();

        assert_eq!(config.interval_secs, 30);
        assert_eq!(config.twemproxy.port, 22223);
        assert_eq!(config.component_name(), "cache-east");
        assert_eq!(config.license_key(), Some("abc"));
        assert_eq!(config.agent_host(), "agent-1");
        assert_eq!(
            config.collect_options().server_naming,
            ServerNaming::Unqualified
        );
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn environment_license_key_wins() {
        let toml = r#"
[newrelic]
enabled = true
license_key = "from-file"
"#;
        let config = Config::parse_toml_with_license(toml, Some("from-env".to_string())).unwrap();
        assert_eq!(config.license_key(), Some("from-env"));
    }

    #[test]
    fn enabled_newrelic_requires_license_key() {
        let toml = "[newrelic]\nenabled = true\n";
        let result = Config::parse_toml_with_license(toml, None);

        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::MissingField {
                field: LICENSE_KEY_ENV
            }))
        ));
    }

    #[test]
    fn rejects_bad_endpoint() {
        let toml = r#"
[newrelic]
enabled = true
license_key = "k"
endpoint = "ftp://example.com/metrics"
"#;
        let result = Config::parse_toml_with_license(toml, None);

        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::InvalidValue {
                field: "endpoint",
                ..
            }))
        ));
    }

    #[test]
    fn rejects_zero_interval_and_port() {
        let interval = Config::parse_toml_with_license("interval_secs = 0", None);
        assert!(matches!(
            interval,
            Err(Error::Config(ConfigError::InvalidValue {
                field: "interval_secs",
                ..
            }))
        ));

        let port = Config::parse_toml_with_license("[twemproxy]\nport = 0\n", None);
        assert!(matches!(
            port,
            Err(Error::Config(ConfigError::InvalidValue { field: "port", .. }))
        ));
    }

    #[test]
    fn rejects_timeout_not_shorter_than_interval() {
        let toml = "interval_secs = 5\n[twemproxy]\ntimeout_secs = 5\n";
        let result = Config::parse_toml_with_license(toml, None);
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::InvalidValue {
                field: "timeout_secs",
                ..
            }))
        ));
    }

    #[test]
    fn source_overrides_are_validated() {
        let mut config = Config::default();
        config
            .override_source(Some("10.0.0.9"), Some(22223))
            .unwrap();
        assert_eq!(config.twemproxy.host, "10.0.0.9");
        assert_eq!(config.twemproxy.port, 22223);

        let result = config.override_source(Some(" "), None);
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::MissingField { field: "host" }))
        ));
    }

    #[test]
    fn newrelic_timeout_must_fit_interval() {
        let toml = r#"
interval_secs = 10

[twemproxy]
timeout_secs = 2

[newrelic]
enabled = true
license_key = "k"
"#;
        let result = Config::parse_toml_with_license(toml, None);
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::InvalidValue {
                field: "newrelic.timeout_secs",
                ..
            }))
        ));

        let config =
            Config::parse_toml_with_license(&format!("{toml}timeout_secs = 3\n"), None).unwrap();
        assert_eq!(config.newrelic.timeout_secs, 3);
    }

    #[test]
    fn rejects_unknown_naming() {
        let result = Config::parse_toml_with_license("[metrics]\nserver_names = \"short\"\n", None);
        assert!(matches!(result, Err(Error::Config(ConfigError::Parse(_)))));
    }
}
