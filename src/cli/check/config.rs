use std::path::Path;

use crate::cli::output;
use crate::error::Result;
use crate::infrastructure::config::settings::Config;

/// Validate configuration file without starting the agent.
pub fn execute_config<P: AsRef<Path>>(config_path: P) -> Result<()> {
    let path = config_path.as_ref();
    output::section(&format!("Checking configuration: {}", path.display()));

    let config = Config::load(path)?;
    output::success("Configuration file is valid");

    output::section("Summary");
    output::field(
        "Stats",
        format!("{}:{}", config.twemproxy.host, config.twemproxy.port),
    );
    output::field("Component", config.component_name());
    output::field("Interval", format!("{}s", config.interval_secs));
    output::field("Timeout", format!("{}s", config.twemproxy.timeout_secs));
    output::field("Server names", format!("{:?}", config.metrics.server_names).to_lowercase());
    output::field("Logging", format!("{} ({})", config.logging.level, config.logging.format));

    if config.newrelic.enabled {
        output::success(&format!("New Relic enabled ({})", config.newrelic.endpoint));
        output::field("GUID", &config.newrelic.guid);
    } else {
        output::warning("New Relic disabled; batches are only logged");
    }

    Ok(())
}
