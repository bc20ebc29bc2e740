use clap::{Args, Parser, Subcommand};

use std::path::PathBuf;

use super::constants::{
    ENV_BROKER_URL, ENV_CONFIG, ENV_GRANULARITY, ENV_TIME_ZONE, ENV_TIMEOUT_SECS,
};

#[derive(Parser)]
#[command(name = "druidq")]
#[command(version, about = "Query Apache Druid brokers", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Broker query endpoint, e.g. http://localhost:8082/druid/v2/
    #[arg(long, short = 'b', global = true, env = ENV_BROKER_URL)]
    pub broker_url: Option<String>,

    /// HTTP read timeout in seconds
    #[arg(long, global = true, env = ENV_TIMEOUT_SECS)]
    pub timeout_secs: Option<u64>,

    /// Path to config file
    #[arg(long, short = 'c', global = true, env = ENV_CONFIG)]
    pub config: Option<PathBuf>,

    /// Time zone of period granularities
    #[arg(long, global = true, env = ENV_TIME_ZONE)]
    pub time_zone: Option<String>,
}

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// List data sources
    Datasources,
    /// Show dimensions and metrics of a data source
    Describe {
        /// Data source, optionally prefixed by its service ("service/name")
        source: String,
    },
    /// Build a query and send it (or print it with --dry-run)
    Query(QueryArgs),
}

#[derive(Args, Clone, Debug, Default)]
pub struct QueryArgs {
    /// Data source, optionally prefixed by its service ("service/name")
    pub source: String,

    /// Group by dimension (repeatable)
    #[arg(long = "group-by", value_name = "DIMENSION")]
    pub group_by: Vec<String>,

    /// longSum aggregation over a metric (repeatable)
    #[arg(long = "long-sum", value_name = "METRIC")]
    pub long_sum: Vec<String>,

    /// doubleSum aggregation over a metric (repeatable)
    #[arg(long = "double-sum", value_name = "METRIC")]
    pub double_sum: Vec<String>,

    /// count aggregation (repeatable)
    #[arg(long, value_name = "METRIC")]
    pub count: Vec<String>,

    /// Keep rows whose dimension is one of the values: dim=v1,v2
    #[arg(long, value_name = "DIM=VALUES", value_parser = parse_filter_arg)]
    pub filter: Vec<FilterArg>,

    /// Drop rows whose dimension is one of the values: dim=v1,v2
    #[arg(long, value_name = "DIM=VALUES", value_parser = parse_filter_arg)]
    pub exclude: Vec<FilterArg>,

    /// Time range as from/to, e.g. 2024-01-01/2024-01-08
    #[arg(long, value_parser = parse_interval_arg)]
    pub interval: Option<IntervalArg>,

    /// Granularity (all, hour, day, or an ISO-8601 period such as PT6H)
    #[arg(long, env = ENV_GRANULARITY)]
    pub granularity: Option<String>,

    /// Bypass the broker result cache
    #[arg(long)]
    pub no_cache: bool,

    /// Print the query JSON instead of sending it
    #[arg(long)]
    pub dry_run: bool,
}

/// `dim=v1,v2`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterArg {
    pub dimension: String,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntervalArg {
    pub from: String,
    pub to: String,
}

/// Parse a filter argument from CLI string
fn parse_filter_arg(s: &str) -> Result<FilterArg, String> {
    let (dimension, values) = s
        .split_once('=')
        .ok_or_else(|| format!("Invalid filter '{}'. Expected dim=value[,value...]", s))?;

    let dimension = dimension.trim();
    if dimension.is_empty() {
        return Err(format!("Invalid filter '{}'. Dimension must not be empty", s));
    }

    let values: Vec<String> = values
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
        .collect();
    if values.is_empty() {
        return Err(format!("Invalid filter '{}'. At least one value is required", s));
    }

    Ok(FilterArg {
        dimension: dimension.to_string(),
        values,
    })
}

/// Parse an interval argument from CLI string
fn parse_interval_arg(s: &str) -> Result<IntervalArg, String> {
    match s.split_once('/') {
        Some((from, to)) if !from.trim().is_empty() && !to.trim().is_empty() => Ok(IntervalArg {
            from: from.trim().to_string(),
            to: to.trim().to_string(),
        }),
        _ => Err(format!("Invalid interval '{}'. Expected from/to", s)),
    }
}

/// Configuration derived from CLI arguments
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub broker_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub config: Option<PathBuf>,
    pub time_zone: Option<String>,
}

/// Parse CLI arguments and return config with command
pub fn parse() -> (CliConfig, Commands) {
    let cli = Cli::parse();
    let config = CliConfig {
        broker_url: cli.broker_url,
        timeout_secs: cli.timeout_secs,
        config: cli.config,
        time_zone: cli.time_zone,
    };
    (config, cli.command)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_filter_arg_multiple_values() {
        let arg = parse_filter_arg("city=Berlin, Munich").unwrap();
        assert_eq!(arg.dimension, "city");
        assert_eq!(arg.values, vec!["Berlin", "Munich"]);
    }

    #[test]
    fn test_parse_filter_arg_single_value() {
        let arg = parse_filter_arg("device=mobile").unwrap();
        assert_eq!(arg.values, vec!["mobile"]);
    }

    #[test]
    fn test_parse_filter_arg_keeps_equals_in_value() {
        let arg = parse_filter_arg("expr=a=b").unwrap();
        assert_eq!(arg.dimension, "expr");
        assert_eq!(arg.values, vec!["a=b"]);
    }

    #[test]
    fn test_parse_filter_arg_invalid() {
        assert!(parse_filter_arg("city").is_err());
        assert!(parse_filter_arg("=Berlin").is_err());
        assert!(parse_filter_arg("city=").is_err());
        assert!(parse_filter_arg("city=,,").is_err());
    }

    #[test]
    fn test_parse_interval_arg() {
        let arg = parse_interval_arg("2024-01-01/2024-01-08").unwrap();
        assert_eq!(arg.from, "2024-01-01");
        assert_eq!(arg.to, "2024-01-08");
        assert!(parse_interval_arg("2024-01-01").is_err());
        assert!(parse_interval_arg("/2024-01-08").is_err());
    }

    #[test]
    fn test_cli_query_command() {
        let cli = Cli::try_parse_from([
            "druidq",
            "--broker-url",
            "http://broker:8082/druid/v2/",
            "query",
            "events",
            "--group-by",
            "city",
            "--long-sum",
            "clicks",
            "--filter",
            "device=mobile,tablet",
            "--filter",
            "country=DE",
            "--dry-run",
        ])
        .unwrap();

        assert_eq!(cli.broker_url.as_deref(), Some("http://broker:8082/druid/v2/"));
        let Commands::Query(args) = cli.command else {
            panic!("expected query command");
        };
        assert_eq!(args.source, "events");
        assert_eq!(args.group_by, vec!["city"]);
        assert_eq!(args.long_sum, vec!["clicks"]);
        assert_eq!(args.filter.len(), 2);
        assert_eq!(args.filter[0].values, vec!["mobile", "tablet"]);
        assert!(args.dry_run);
        assert!(!args.no_cache);
    }

    #[test]
    fn test_cli_rejects_bad_filter() {
        assert!(Cli::try_parse_from(["druidq", "query", "events", "--filter", "nope"]).is_err());
    }
}
