//! Command-line parsing for the sample-count projector.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the estimation code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::{HungPolicy, TiePolicy};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "sample-count",
    version,
    about = "Election projection from polling-station sample counts"
)]
pub struct Cli {
    /// Sets a custom logging filter. Syntax is `<target>=<level>`, e.g.
    /// `--log sample_count=debug`.
    ///
    /// Log levels (least to most verbose) are error, warn, info, debug, and trace.
    /// Logs go to stderr.
    #[arg(long, default_value = "info", global = true)]
    pub log: String,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Project every constituency, print the summary and bars, and optionally export.
    Project(ProjectArgs),
    /// Print the seat distribution and government verdict only (useful for scripting).
    Seats(SeatsArgs),
    /// Variance and confidence interval for a single party sample.
    Interval(IntervalArgs),
    /// Re-render a report JSON saved with `project --export-json`.
    Show(ShowArgs),
}

/// Run-configuration flags shared by every estimating command.
///
/// Each flag also reads a `SAMPLE_COUNT_*` environment variable (a `.env`
/// file in the working directory is loaded first).
#[derive(Debug, Parser, Clone)]
pub struct RunArgs {
    /// Confidence level for the intervals, in (0, 1).
    #[arg(short = 'c', long, env = "SAMPLE_COUNT_CONFIDENCE", default_value_t = 0.95)]
    pub confidence: f64,

    /// Expected turnout rate used for national vote totals, in (0, 1].
    #[arg(long, env = "SAMPLE_COUNT_TURNOUT", default_value_t = 1.0)]
    pub turnout: f64,

    /// Voters sampled per polling station.
    #[arg(short = 'n', long, env = "SAMPLE_COUNT_SAMPLE_SIZE", default_value_t = 100)]
    pub sample_size: u64,

    /// Allowed deviation of a constituency's proportions from summing to 1.
    #[arg(long, env = "SAMPLE_COUNT_TOLERANCE", default_value_t = 0.01)]
    pub tolerance: f64,

    /// What to do when the top sample proportion is shared.
    #[arg(long, value_enum, env = "SAMPLE_COUNT_TIE_POLICY", default_value_t = TiePolicy::Inconclusive)]
    pub tie_policy: TiePolicy,

    /// What to report when no party holds a majority of seats.
    #[arg(long, value_enum, env = "SAMPLE_COUNT_HUNG_POLICY", default_value_t = HungPolicy::Undecided)]
    pub hung_policy: HungPolicy,
}

/// Options for a full projection.
#[derive(Debug, Parser, Clone)]
pub struct ProjectArgs {
    /// Sample-count CSV (one row per constituency and party).
    #[arg(short = 'i', long, value_name = "CSV")]
    pub input: PathBuf,

    #[command(flatten)]
    pub run: RunArgs,

    /// Disable the terminal bars.
    #[arg(long)]
    pub no_plot: bool,

    /// Bar width (columns).
    #[arg(long, default_value_t = 60)]
    pub width: usize,

    /// Export the full report to JSON.
    #[arg(long = "export-json", value_name = "JSON")]
    pub export_json: Option<PathBuf>,

    /// Export per-party intervals to CSV.
    #[arg(long = "export-csv", value_name = "CSV")]
    pub export_csv: Option<PathBuf>,

    /// Write a Markdown results summary.
    #[arg(long, value_name = "MD")]
    pub markdown: Option<PathBuf>,
}

/// Options for the seats-only view.
#[derive(Debug, Parser, Clone)]
pub struct SeatsArgs {
    /// Sample-count CSV (one row per constituency and party).
    #[arg(short = 'i', long, value_name = "CSV")]
    pub input: PathBuf,

    #[command(flatten)]
    pub run: RunArgs,
}

/// Options for a single interval computation.
#[derive(Debug, Parser, Clone)]
pub struct IntervalArgs {
    /// Party sample proportion, in [0, 1].
    #[arg(short = 'p', long)]
    pub proportion: f64,

    /// Number of polling stations (strata) in the constituency.
    #[arg(long)]
    pub stations: u64,

    /// Registered voters in the constituency.
    #[arg(long)]
    pub voters: u64,

    #[command(flatten)]
    pub run: RunArgs,
}

/// Options for re-rendering a saved report.
#[derive(Debug, Parser)]
pub struct ShowArgs {
    /// Report JSON file produced by `sample-count project --export-json`.
    #[arg(long, value_name = "JSON")]
    pub report: PathBuf,

    /// Disable the terminal bars.
    #[arg(long)]
    pub no_plot: bool,

    /// Bar width (columns).
    #[arg(long, default_value_t = 60)]
    pub width: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_flags_parse() {
        let cli = Cli::try_parse_from([
            "sample-count",
            "project",
            "--input",
            "ge.csv",
            "--confidence",
            "0.99",
            "--tie-policy",
            "reject",
            "--hung-policy",
            "largest-party",
            "--no-plot",
            "--log",
            "debug",
        ])
        .unwrap();

        assert_eq!(cli.log, "debug");
        let Command::Project(args) = cli.command else {
            panic!("expected project");
        };
        assert_eq!(args.input, PathBuf::from("ge.csv"));
        assert_eq!(args.run.confidence, 0.99);
        assert_eq!(args.run.tie_policy, TiePolicy::Reject);
        assert_eq!(args.run.hung_policy, HungPolicy::LargestParty);
        assert!(args.no_plot);
        assert!(args.export_json.is_none());
    }

    #[test]
    fn interval_requires_design() {
        assert!(Cli::try_parse_from(["sample-count", "interval", "--proportion", "0.4"]).is_err());
        let cli = Cli::try_parse_from([
            "sample-count",
            "interval",
            "-p",
            "0.41",
            "--stations",
            "67",
            "--voters",
            "144276",
        ])
        .unwrap();
        let Command::Interval(args) = cli.command else {
            panic!("expected interval");
        };
        assert_eq!(args.stations, 67);
        assert_eq!(args.run.sample_size, 100);
    }
}
