//! Handler for the `run` command.

use tracing::info;

use crate::cli::RunArgs;
use crate::error::Result;
use crate::infrastructure::config::settings::Config;
use crate::infrastructure::runtime::Runtime;

/// Execute the run command.
pub async fn execute(args: &RunArgs) -> Result<()> {
    let mut config = Config::load(&args.config)?;

    // Apply CLI overrides
    config.override_source(args.host.as_deref(), args.port)?;
    config.logging = config
        .logging
        .with_overrides(args.log_level.as_deref(), args.json_logs);

    config.init_logging();

    info!(
        component = config.component_name(),
        interval_secs = config.interval_secs,
        newrelic = config.newrelic.enabled,
        server_names = ?config.metrics.server_names,
        "twemrelic starting"
    );

    Runtime::from_config(&config)?.run().await?;

    info!("twemrelic stopped");
    Ok(())
}
