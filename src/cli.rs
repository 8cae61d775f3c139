//! CLI argument parsing for iterbench

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::strategy::Strategy;

#[derive(Parser, Debug)]
#[command(name = "iterbench")]
#[command(version)]
#[command(about = "Cold-cache benchmarks of file iteration strategies", long_about = None)]
pub struct Cli {
    /// Enable verbose tracing on stderr
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run performance tests and store one artifact per run
    Run(RunArgs),
    /// Summarize performance results found in a folder
    Summary(SummaryArgs),
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// The folders that will be processed
    #[arg(required = true, value_name = "FOLDERS")]
    pub folders: Vec<PathBuf>,

    /// How many times each folder is processed with each strategy
    #[arg(
        short = 'n',
        long = "count",
        value_name = "N",
        default_value = "1",
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub count: u32,

    /// The folder where the performance results will be written
    #[arg(short = 'o', long = "out", value_name = "DIR", default_value = "out")]
    pub out: PathBuf,

    /// Iteration strategy to run (repeatable): a, a64, r, r64, f, f64, c, c64
    #[arg(
        short = 's',
        long = "strategy",
        value_name = "ID",
        value_enum,
        value_delimiter = ','
    )]
    pub strategies: Vec<Strategy>,

    /// File iterator executable (default: search the configured candidates)
    #[arg(long = "exe", value_name = "PATH")]
    pub exe: Option<PathBuf>,

    /// TOML configuration file
    #[arg(long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct SummaryArgs {
    /// The output folder containing performance results
    #[arg(value_name = "FOLDER", default_value = "out")]
    pub folder: PathBuf,

    /// The base file name for the summaries written to the folder
    #[arg(short = 'o', long = "out", value_name = "NAME", default_value = "summary")]
    pub out: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_args(args: &[&str]) -> RunArgs {
        match Cli::parse_from(args).command {
            Command::Run(run) => run,
            other => panic!("expected run, got {other:?}"),
        }
    }

    fn summary_args(args: &[&str]) -> SummaryArgs {
        match Cli::parse_from(args).command {
            Command::Summary(summary) => summary,
            other => panic!("expected summary, got {other:?}"),
        }
    }

    #[test]
    fn test_cli_run_defaults() {
        let run = run_args(&["iterbench", "run", "data"]);
        assert_eq!(run.folders, vec![PathBuf::from("data")]);
        assert_eq!(run.count, 1);
        assert_eq!(run.out, PathBuf::from("out"));
        assert!(run.strategies.is_empty());
        assert!(run.exe.is_none());
    }

    #[test]
    fn test_cli_repeated_strategies_keep_order() {
        let run = run_args(&["iterbench", "run", "-s", "r64", "--strategy", "a", "data"]);
        assert_eq!(run.strategies, vec![Strategy::Random64, Strategy::Alphabetic]);
    }

    #[test]
    fn test_cli_comma_separated_strategies() {
        let run = run_args(&["iterbench", "run", "-s", "f,f64,c", "d1", "d2"]);
        assert_eq!(
            run.strategies,
            vec![Strategy::Filesystem, Strategy::Filesystem64, Strategy::Cluster]
        );
        assert_eq!(run.folders.len(), 2);
    }

    #[test]
    fn test_cli_unknown_strategy_rejected() {
        assert!(Cli::try_parse_from(["iterbench", "run", "-s", "x", "data"]).is_err());
    }

    #[test]
    fn test_cli_count_must_be_positive() {
        assert!(Cli::try_parse_from(["iterbench", "run", "-n", "0", "-s", "a", "data"]).is_err());
        let run = run_args(&["iterbench", "run", "-n", "5", "-s", "a", "data"]);
        assert_eq!(run.count, 5);
    }

    #[test]
    fn test_cli_run_requires_folder() {
        assert!(Cli::try_parse_from(["iterbench", "run", "-s", "a"]).is_err());
    }

    #[test]
    fn test_cli_summary_defaults() {
        let summary = summary_args(&["iterbench", "summary"]);
        assert_eq!(summary.folder, PathBuf::from("out"));
        assert_eq!(summary.out, "summary");
    }

    #[test]
    fn test_cli_summary_custom() {
        let summary = summary_args(&["iterbench", "summary", "results", "-o", "cold"]);
        assert_eq!(summary.folder, PathBuf::from("results"));
        assert_eq!(summary.out, "cold");
    }

    #[test]
    fn test_cli_debug_is_global() {
        let cli = Cli::parse_from(["iterbench", "summary", "--debug"]);
        assert!(cli.debug);
    }
}
