//! Command-line interface definitions.

pub mod check;
pub mod collect;
pub mod output;
pub mod run;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Twemrelic - twemproxy statistics agent for New Relic.
#[derive(Parser, Debug)]
#[command(name = "twemrelic")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Poll twemproxy and report metrics until interrupted
    Run(RunArgs),

    /// Run one collection cycle and print the batch without delivering it
    Collect(CollectArgs),

    /// Run diagnostic checks
    #[command(subcommand)]
    Check(CheckCommand),
}

/// Subcommands for `twemrelic check`
#[derive(Subcommand, Debug)]
pub enum CheckCommand {
    /// Validate configuration file
    Config(ConfigPathArg),
}

/// Shared argument for commands that only need a config path.
#[derive(Parser, Debug)]
pub struct ConfigPathArg {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,
}

/// Arguments for the `run` subcommand.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Override log level (trace, debug, info, warn, error)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Use JSON log format instead of pretty
    #[arg(long)]
    pub json_logs: bool,

    /// Override twemproxy stats host
    #[arg(long)]
    pub host: Option<String>,

    /// Override twemproxy stats port
    #[arg(long)]
    pub port: Option<u16>,
}

/// Arguments for the `collect` subcommand.
#[derive(Parser, Debug)]
pub struct CollectArgs {
    /// Path to configuration file; defaults apply when it does not exist
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Override twemproxy stats host
    #[arg(long)]
    pub host: Option<String>,

    /// Override twemproxy stats port
    #[arg(long)]
    pub port: Option<u16>,

    /// Print one JSON object per observation
    #[arg(long)]
    pub json: bool,

    /// Override log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_run_overrides() {
        let cli = Cli::parse_from([
            "twemrelic",
            "run",
            "-c",
            "agent.toml",
            "--log-level",
            "debug",
            "--json-logs",
            "--port",
            "22223",
        ]);

        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.config, PathBuf::from("agent.toml"));
        assert_eq!(args.log_level.as_deref(), Some("debug"));
        assert!(args.json_logs);
        assert_eq!(args.port, Some(22223));
        assert!(args.host.is_none());
    }

    #[test]
    fn parses_check_config() {
        let cli = Cli::parse_from(["twemrelic", "check", "config"]);
        let Commands::Check(CheckCommand::Config(arg)) = cli.command else {
            panic!("expected check config");
        };
        assert_eq!(arg.config, PathBuf::from("config.toml"));
    }
}
