use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "beltcheck",
    about = "BeltCheck — post-hoc verifier for conveyor-belt event logs",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Path to a TOML run configuration
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Aggregate per-actor tallies and check mass conservation
    Stats(StatsArgs),
    /// Check the signed insert/remove sum of a single log
    Sum(SumArgs),
    /// Check that every worker that started also finished
    Lifecycle(LifecycleArgs),
    /// Run every invariant family and print the full report
    Verify(VerifyArgs),
}

#[derive(Args)]
pub struct StatsArgs {
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

#[derive(Args)]
pub struct SumArgs {
    pub file: PathBuf,
}

#[derive(Args)]
pub struct LifecycleArgs {
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
    /// Worker id attributed to each file, in order
    #[arg(long = "worker")]
    pub workers: Vec<u64>,
}

#[derive(Args)]
pub struct VerifyArgs {
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
    /// Worker id attributed to each file, in order
    #[arg(long = "worker")]
    pub workers: Vec<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_stats() {
        let cli = Cli::try_parse_from(["beltcheck", "stats", "belt.log"]).unwrap();
        if let Command::Stats(args) = cli.command {
            assert_eq!(args.files, vec![PathBuf::from("belt.log")]);
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn stats_requires_a_file() {
        assert!(Cli::try_parse_from(["beltcheck", "stats"]).is_err());
    }

    #[test]
    fn parse_sum() {
        let cli = Cli::try_parse_from(["beltcheck", "sum", "belt.log"]).unwrap();
        assert!(matches!(cli.command, Command::Sum(_)));
    }

    #[test]
    fn sum_takes_exactly_one_file() {
        assert!(Cli::try_parse_from(["beltcheck", "sum"]).is_err());
        assert!(Cli::try_parse_from(["beltcheck", "sum", "a.log", "b.log"]).is_err());
    }

    #[test]
    fn parse_lifecycle_with_workers() {
        let cli = Cli::try_parse_from([
            "beltcheck",
            "lifecycle",
            "worker1.log",
            "worker2.log",
            "--worker",
            "1",
            "--worker",
            "2",
        ])
        .unwrap();
        if let Command::Lifecycle(args) = cli.command {
            assert_eq!(args.files.len(), 2);
            assert_eq!(args.workers, vec![1, 2]);
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_verify() {
        let cli = Cli::try_parse_from(["beltcheck", "verify", "belt.log"]).unwrap();
        assert!(matches!(cli.command, Command::Verify(_)));
    }

    #[test]
    fn parse_json_format() {
        let cli =
            Cli::try_parse_from(["beltcheck", "--format", "json", "stats", "belt.log"]).unwrap();
        assert!(matches!(cli.format, OutputFormat::Json));
    }

    #[test]
    fn parse_config_path() {
        let cli = Cli::try_parse_from([
            "beltcheck",
            "--config",
            "beltcheck.toml",
            "verify",
            "belt.log",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("beltcheck.toml")));
    }

    #[test]
    fn parse_verbose() {
        let cli = Cli::try_parse_from(["beltcheck", "--verbose", "sum", "belt.log"]).unwrap();
        assert!(cli.verbose);
    }

    #[test]
    fn no_subcommand_is_a_usage_error() {
        assert!(Cli::try_parse_from(["beltcheck"]).is_err());
    }
}
