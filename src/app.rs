//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and parses CLI arguments
//! - installs logging (stderr)
//! - ingests sample-count CSVs
//! - runs the projection pipeline
//! - prints summaries/bars and writes optional exports

use clap::Parser;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::Directive;

use crate::cli::{Command, IntervalArgs, ProjectArgs, RunArgs, SeatsArgs, ShowArgs};
use crate::domain::RunConfig;
use crate::error::AppError;
use crate::io::{IngestedData, RowError};
use crate::report::Report;

pub mod pipeline;

/// Entry point for the `sample-count` binary.
pub fn run() -> Result<(), AppError> {
    // `.env` values become defaults for the `SAMPLE_COUNT_*` flags.
    dotenvy::dotenv().ok();
    let cli = crate::cli::Cli::parse();
    init_logging(&cli.log)?;

    match cli.command {
        Command::Project(args) => handle_project(args),
        Command::Seats(args) => handle_seats(args),
        Command::Interval(args) => handle_interval(args),
        Command::Show(args) => handle_show(args),
    }
}

fn init_logging(directive: &str) -> Result<(), AppError> {
    let directive = directive
        .parse::<Directive>()
        .map_err(|e| AppError::new(2, format!("Invalid --log directive '{directive}': {e}")))?;
    let filter = EnvFilter::from_default_env().add_directive(directive);
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn handle_project(args: ProjectArgs) -> Result<(), AppError> {
    let config = run_config_from_args(&args.run);
    let data = crate::io::load_constituencies(&args.input)?;
    let report = pipeline::run_projection(&config, &data.input)?;

    println!("{}", crate::report::format_run_summary(&report));
    if let Some(summary) = format_row_errors(&data) {
        println!("{summary}");
    }
    if !args.no_plot {
        print_bars(&report, args.width);
    }

    // Optional exports.
    if let Some(path) = &args.export_json {
        crate::io::write_report_json(path, &report)?;
        log::info!("Wrote report JSON to {}", path.display());
    }
    if let Some(path) = &args.export_csv {
        crate::io::write_results_csv(path, &report)?;
        log::info!("Wrote results CSV to {}", path.display());
    }
    if let Some(path) = &args.markdown {
        crate::io::write_markdown(path, &report)?;
        log::info!("Wrote Markdown summary to {}", path.display());
    }

    Ok(())
}

fn handle_seats(args: SeatsArgs) -> Result<(), AppError> {
    let config = run_config_from_args(&args.run);
    let data = crate::io::load_constituencies(&args.input)?;
    let report = pipeline::run_projection(&config, &data.input)?;

    print!("{}", crate::report::format_seat_summary(&report));
    Ok(())
}

fn handle_interval(args: IntervalArgs) -> Result<(), AppError> {
    let config = run_config_from_args(&args.run);
    config.validate()?;

    let design = crate::estimate::StratumDesign::new(args.stations, args.voters, config.sample_size)?;
    let variance = design.variance(args.proportion)?;
    let builder = crate::estimate::IntervalBuilder::new(config.confidence_level)?;
    let interval = builder.build(args.proportion, variance)?;

    println!(
        "Stations: {} | voters: {} | sample per station: {} | voters per station: {:.1}",
        args.stations,
        args.voters,
        config.sample_size,
        design.stratum_size()
    );
    println!("Sample proportion: {:.4}", args.proportion);
    println!("Variance: {variance:.6e}");
    println!("Standard error: {:.6}", variance.sqrt());
    println!(
        "{:.0}% interval (z = {:.4}): [{:.6}, {:.6}]",
        config.confidence_level * 100.0,
        builder.critical_value(),
        interval.lower,
        interval.upper
    );
    Ok(())
}

fn handle_show(args: ShowArgs) -> Result<(), AppError> {
    let file = crate::io::read_report_json(&args.report)?;
    println!(
        "Report generated by {} {} at {}",
        file.tool,
        file.version,
        file.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!("{}", crate::report::format_run_summary(&file.report));
    if !args.no_plot {
        print_bars(&file.report, args.width);
    }
    Ok(())
}

fn print_bars(report: &Report, width: usize) {
    println!("{}", crate::plot::render_seat_bar(report, width));
    if !report.national_vote.shares.is_empty() {
        println!("{}", crate::plot::render_vote_bar(report, width));
    }
    println!("{}", crate::plot::render_constituency_shares(report, width));
}

pub fn run_config_from_args(args: &RunArgs) -> RunConfig {
    RunConfig {
        confidence_level: args.confidence,
        turnout_rate: args.turnout,
        sample_size: args.sample_size,
        proportion_tolerance: args.tolerance,
        tie_policy: args.tie_policy,
        hung_policy: args.hung_policy,
    }
}

/// Skipped-row summary, or `None` when every row was used.
fn format_row_errors(data: &IngestedData) -> Option<String> {
    if data.row_errors.is_empty() {
        return None;
    }
    let mut out = format!(
        "Skipped rows: {} of {} (used {})\n",
        data.row_errors.len(),
        data.rows_read,
        data.rows_used
    );
    for RowError {
        line,
        constituency,
        message,
    } in &data.row_errors
    {
        match constituency {
            Some(name) => out.push_str(&format!("  line {line} ({name}): {message}\n")),
            None => out.push_str(&format!("  line {line}: {message}\n")),
        }
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{HungPolicy, TiePolicy};

    #[test]
    fn config_mirrors_flags() {
        let args = RunArgs {
            confidence: 0.9,
            turnout: 0.93,
            sample_size: 50,
            tolerance: 0.02,
            tie_policy: TiePolicy::Reject,
            hung_policy: HungPolicy::LargestParty,
        };
        let config = run_config_from_args(&args);
        assert_eq!(config.confidence_level, 0.9);
        assert_eq!(config.turnout_rate, 0.93);
        assert_eq!(config.sample_size, 50);
        assert_eq!(config.tie_policy, TiePolicy::Reject);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn row_error_summary() {
        let csv = "\
constituency,seats,polling_stations,registered_voters,party,sample_pct
Aljunied GRC,5,67,144276,PAP,41
Aljunied GRC,5,67,144276,WP,abc
Aljunied GRC,5,67,144276,WP,59
";
        let data = crate::io::read_constituencies(csv.as_bytes()).unwrap();
        let text = format_row_errors(&data).unwrap();
        assert!(text.starts_with("Skipped rows: 1 of 3 (used 2)"));
        assert!(text.contains("line 3 (Aljunied GRC):"));
    }
}
