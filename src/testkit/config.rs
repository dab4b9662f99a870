//! Canonical test configurations.

use crate::infrastructure::config::settings::Config;

/// TOML for an agent polling `127.0.0.1:<port>` with New Relic disabled.
pub fn local_toml(port: u16) -> String {
    format!(
        r#"interval_secs = 60

[twemproxy]
host = "127.0.0.1"
port = {port}
timeout_secs = 2
name = "cache-test"

[logging]
level = "warn"
"#
    )
}

/// Parsed [`local_toml`] with no license key.
pub fn local_config(port: u16) -> Config {
    match Config::parse_toml_with_license(&local_toml(port), None) {
        Ok(config) => config,
        Err(e) => panic!("local test config must parse: {e}"),
    }
}
