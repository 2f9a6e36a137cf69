use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

mod buckets;
mod debts;
mod format;
mod report;

pub use buckets::BucketsArgs;
pub use debts::DebtsArgs;
pub use format::{format_amount, format_number};
pub use report::ReportArgs;

use crate::config::Config;
use crate::logging;
use crate::services::{DirectorySource, HttpSource, SnapshotSource};
use crate::types::{parse_timestamp, DashError, Result};

/// Sales and debt dashboards for dealer/manufacturer vehicle portals
#[derive(Parser)]
#[command(name = "dealerdash")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Print debug logs to stderr (added on top of RUST_LOG when set)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (default: ~/.dealerdash/config.json)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a role dashboard
    Report(ReportArgs),

    /// Show the reporting buckets for a window
    Buckets(BucketsArgs),

    /// Show outstanding and overdue debt
    Debts(DebtsArgs),
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        logging::init(self.verbose);

        let config = match &self.config {
            Some(path) => Config::load_from(path)?,
            None => Config::load()?,
        };

        match self.command {
            Commands::Report(args) => args.run(&config)?,
            Commands::Buckets(args) => args.run(&config)?,
            Commands::Debts(args) => args.run(&config)?,
        }
        Ok(())
    }
}

/// Where snapshots come from. Flags win over the config file.
#[derive(Args, Debug, Clone, Default)]
pub struct SourceArgs {
    /// Directory of saved API responses (<collection>.json)
    #[arg(long, value_name = "DIR", conflicts_with = "api")]
    pub data: Option<PathBuf>,

    /// Backend API base URL
    #[arg(long, value_name = "URL")]
    pub api: Option<String>,

    /// Bearer token for the backend API
    #[arg(long)]
    pub token: Option<String>,
}

impl SourceArgs {
    pub fn resolve(&self, config: &Config) -> Result<Box<dyn SnapshotSource>> {
        let token = self.token.clone().or_else(|| config.api_token.clone());
        let timeout = Duration::from_secs(config.request_timeout_secs);

        if let Some(dir) = &self.data {
            return Ok(Box::new(DirectorySource::new(dir.clone())));
        }
        if let Some(url) = &self.api {
            return Ok(Box::new(HttpSource::new(url, token, timeout)?));
        }
        if let Some(dir) = &config.data_dir {
            return Ok(Box::new(DirectorySource::new(dir.clone())));
        }
        if let Some(url) = &config.api_base_url {
            return Ok(Box::new(HttpSource::new(url, token, timeout)?));
        }

        Err(DashError::Config(
            "no data source: pass --data DIR or --api URL, or set data_dir / api_base_url in the config file".into(),
        ))
    }
}

/// `--as-of` or the current instant
fn resolve_as_of(raw: Option<&str>) -> Result<DateTime<Utc>> {
    match raw {
        None => Ok(Utc::now()),
        Some(raw) => parse_timestamp(raw)
            .ok_or_else(|| DashError::Parse(format!("invalid --as-of '{}'", raw))),
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(|e| DashError::Parse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Granularity, Role};
    use chrono::TimeZone;

    #[test]
    fn test_cli_requires_subcommand() {
        assert!(Cli::try_parse_from(["dealerdash"]).is_err());
    }

    #[test]
    fn test_cli_parse_report() {
        let cli = Cli::try_parse_from([
            "dealerdash",
            "report",
            "--role",
            "dealer-manager",
            "--granularity",
            "week",
            "--data",
            "snapshots",
            "--json",
        ])
        .unwrap();

        match cli.command {
            Commands::Report(args) => {
                assert_eq!(args.role, Role::DealerManager);
                assert_eq!(args.granularity, Granularity::Week);
                assert_eq!(args.source.data, Some(PathBuf::from("snapshots")));
                assert!(args.json);
            }
            _ => panic!("expected report"),
        }
    }

    #[test]
    fn test_cli_report_defaults_to_month() {
        let cli = Cli::try_parse_from(["dealerdash", "report", "--role", "admin"]).unwrap();
        match cli.command {
            Commands::Report(args) => {
                assert_eq!(args.granularity, Granularity::Month);
                assert!(!args.json);
            }
            _ => panic!("expected report"),
        }
    }

    #[test]
    fn test_cli_rejects_unknown_role() {
        assert!(Cli::try_parse_from(["dealerdash", "report", "--role", "guest"]).is_err());
    }

    #[test]
    fn test_cli_data_conflicts_with_api() {
        let result = Cli::try_parse_from([
            "dealerdash",
            "debts",
            "--data",
            "snapshots",
            "--api",
            "http://localhost",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_global_flags_after_subcommand() {
        let cli =
            Cli::try_parse_from(["dealerdash", "buckets", "--count", "3", "-v", "--config", "c.json"])
                .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("c.json")));
    }

    #[test]
    fn test_cli_count_is_bounded() {
        assert!(Cli::try_parse_from(["dealerdash", "buckets", "--count", "1000"]).is_ok());
        assert!(Cli::try_parse_from(["dealerdash", "buckets", "--count", "1001"]).is_err());
        assert!(Cli::try_parse_from([
            "dealerdash",
            "report",
            "--role",
            "admin",
            "--count",
            "18446744073709551615",
        ])
        .is_err());
    }

    #[test]
    fn test_resolve_as_of() {
        assert_eq!(
            resolve_as_of(Some("2025-02-01T00:00:00Z")).unwrap(),
            Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap()
        );
        assert!(matches!(
            resolve_as_of(Some("next tuesday")),
            Err(DashError::Parse(_))
        ));
        assert!(resolve_as_of(None).is_ok());
    }

    #[test]
    fn test_source_resolution_order() {
        let config = Config {
            data_dir: Some(PathBuf::from("/from/config")),
            ..Config::default()
        };

        let flags = SourceArgs {
            api: Some("http://localhost:8080/api".into()),
            ..SourceArgs::default()
        };
        assert_eq!(flags.resolve(&config).unwrap().name(), "http");

        let source = SourceArgs::default().resolve(&config).unwrap();
        assert_eq!(source.name(), "directory");
    }

    #[test]
    fn test_source_missing_is_config_error() {
        let err = SourceArgs::default()
            .resolve(&Config::default())
            .err()
            .unwrap();
        assert!(matches!(err, DashError::Config(_)));
    }
}
