//! Handler for the `collect` command.

use tabled::{Table, Tabled};

use crate::cli::{output, CollectArgs};
use crate::domain::metric::{MetricBatch, Observation};
use crate::error::Result;
use crate::infrastructure::config::settings::Config;
use crate::infrastructure::runtime::Runtime;

#[derive(Tabled)]
struct ObservationRow {
    #[tabled(rename = "Metric")]
    name: String,
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Unit")]
    unit: &'static str,
    #[tabled(rename = "Value")]
    value: String,
}

impl From<&Observation> for ObservationRow {
    fn from(observation: &Observation) -> Self {
        Self {
            name: observation.name.clone(),
            kind: observation.kind.to_string(),
            unit: observation.unit,
            value: format_value(observation.value),
        }
    }
}

/// Whole numbers print without a fractional part.
fn format_value(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.0}")
    } else {
        format!("{value}")
    }
}

/// Render a batch as a table in emission order.
pub(crate) fn render_table(batch: &MetricBatch) -> String {
    let rows: Vec<ObservationRow> = batch.iter().map(ObservationRow::from).collect();
    Table::new(rows).to_string()
}

/// Execute the collect command.
pub async fn execute(args: &CollectArgs) -> Result<()> {
    output::configure(args.json);

    let mut config = if args.config.exists() {
        Config::load(&args.config)?
    } else {
        Config::default()
    };
    config.override_source(args.host.as_deref(), args.port)?;
    config.logging = config.logging.with_overrides(Some(&args.log_level), false);
    config.init_logging();

    let runtime = Runtime::from_config(&config)?;
    let batch = runtime.collect_once().await?;

    if output::is_json() {
        for observation in &batch {
            output::json_output(serde_json::to_value(observation)?);
        }
        return Ok(());
    }

    output::header(env!("CARGO_PKG_VERSION"));
    output::section("Snapshot");
    output::field(
        "Source",
        format!("{}:{}", config.twemproxy.host, config.twemproxy.port),
    );
    output::field("Observations", batch.len());
    output::section("Metrics");
    output::block(&render_table(&batch));
    Ok(())
}
