//! Infrastructure bootstrap helpers for runtime wiring.

use std::sync::Arc;

use tracing::{info, warn};

use crate::adapter::outbound::log::LogSink;
use crate::adapter::outbound::newrelic::{NewRelicSettings, NewRelicSink};
use crate::adapter::outbound::twemproxy::TwemproxySource;
use crate::error::Result;
use crate::infrastructure::config::settings::Config;
use crate::port::outbound::sink::SinkRegistry;
use crate::port::outbound::source::StatsSource;

/// Build the stats source from the `[twemproxy]` section.
pub(crate) fn build_source(config: &Config) -> Arc<dyn StatsSource> {
    let source = TwemproxySource::new(
        &config.twemproxy.host,
        config.twemproxy.port,
        config.twemproxy.timeout_secs,
    );
    info!(address = source.address(), "Stats source configured");
    Arc::new(source)
}

/// Build sink registry from configuration.
///
/// The log sink is always registered. The New Relic sink is added when
/// enabled and a license key is available.
///
/// # Errors
///
/// Returns an error if the New Relic HTTP client cannot be built.
pub(crate) fn build_sink_registry(config: &Config) -> Result<SinkRegistry> {
    let mut registry = SinkRegistry::new();
    registry.register(Box::new(LogSink));

    if config.newrelic.enabled {
        if let Some(license_key) = config.license_key() {
            registry.register(Box::new(NewRelicSink::new(NewRelicSettings {
                endpoint: config.newrelic.endpoint.clone(),
                license_key: license_key.to_string(),
                guid: config.newrelic.guid.clone(),
                component: config.component_name().to_string(),
                host: config.agent_host(),
                duration_secs: config.interval_secs,
                timeout_secs: config.newrelic.timeout_secs,
            })?));
            info!(endpoint = %config.newrelic.endpoint, "New Relic sink enabled");
        } else {
            warn!("New Relic enabled but NEW_RELIC_LICENSE_KEY not set");
        }
    }

    Ok(registry)
}
