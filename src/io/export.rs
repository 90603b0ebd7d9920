//! Export per-party results to CSV and the summary to Markdown.
//!
//! The CSV is meant to be easy to consume in spreadsheets or downstream scripts:
//! one row per (constituency, party) with the interval that drove the call.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::error::AppError;
use crate::report::{format_markdown, ConstituencyStatus, Report};

/// Write per-party results to a CSV file.
pub fn write_results_csv(path: &Path, report: &Report) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    write_results(file, report)
}

/// Write per-party results as CSV to any writer.
pub fn write_results<W: Write>(writer: W, report: &Report) -> Result<(), AppError> {
    let mut out = csv::Writer::from_writer(writer);
    let map_err = |e: csv::Error| AppError::new(2, format!("Failed to write export CSV row: {e}"));

    out.write_record([
        "constituency",
        "seats",
        "status",
        "result",
        "party",
        "sample_proportion",
        "variance",
        "ci_lower",
        "ci_upper",
        "spread",
    ])
    .map_err(map_err)?;

    for row in &report.constituencies {
        let seats = row.seats.to_string();
        let result = row.result_label();
        match &row.status {
            ConstituencyStatus::Resolved { outcome } if !outcome.intervals.is_empty() => {
                let spread = format!("{:.6}", outcome.spread);
                for pi in &outcome.intervals {
                    out.write_record([
                        row.name.as_str(),
                        &seats,
                        "resolved",
                        &result,
                        pi.party.as_str(),
                        &format!("{:.6}", pi.proportion),
                        &format!("{:.10}", pi.variance),
                        &format!("{:.6}", pi.interval.lower),
                        &format!("{:.6}", pi.interval.upper),
                        &spread,
                    ])
                    .map_err(map_err)?;
                }
            }
            ConstituencyStatus::Resolved { outcome } => {
                let party = outcome.decision.winner().map(|p| p.as_str()).unwrap_or("");
                out.write_record([
                    row.name.as_str(),
                    &seats,
                    "walkover",
                    &result,
                    party,
                    "",
                    "",
                    "",
                    "",
                    "0.000000",
                ])
                .map_err(map_err)?;
            }
            ConstituencyStatus::Flagged { .. } | ConstituencyStatus::Pending => {
                let status = if matches!(row.status, ConstituencyStatus::Pending) {
                    "pending"
                } else {
                    "flagged"
                };
                out.write_record([row.name.as_str(), &seats, status, &result, "", "", "", "", "", ""])
                    .map_err(map_err)?;
            }
        }
    }

    out.flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush export CSV: {e}")))?;
    Ok(())
}

/// Write the Markdown summary (results table + seat distribution).
pub fn write_markdown(path: &Path, report: &Report) -> Result<(), AppError> {
    let mut file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create Markdown '{}': {e}", path.display())))?;
    file.write_all(format_markdown(report).as_bytes())
        .map_err(|e| AppError::new(2, format!("Failed to write Markdown '{}': {e}", path.display())))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::pipeline::run_projection;
    use crate::domain::{Constituency, PartySample, PendingConstituency, ProjectionInput, RunConfig};

    #[test]
    fn one_row_per_party_plus_placeholders() {
        let input = ProjectionInput {
            constituencies: vec![
                Constituency {
                    name: "Aljunied GRC".to_string(),
                    seats: 5,
                    polling_stations: 67,
                    registered_voters: 144_276,
                    samples: vec![PartySample::new("PAP", 0.41), PartySample::new("WP", 0.59)],
                },
                Constituency {
                    name: "Marine Parade-Braddell Heights GRC".to_string(),
                    seats: 5,
                    polling_stations: 60,
                    registered_voters: 140_000,
                    samples: vec![PartySample::new("PAP", 1.0)],
                },
            ],
            pending: vec![PendingConstituency {
                name: "Sembawang GRC".to_string(),
                seats: 5,
            }],
            ..ProjectionInput::default()
        };
        let report = run_projection(&RunConfig::default(), &input).unwrap();

        let mut buf = Vec::new();
        write_results(&mut buf, &report).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 5);
        assert!(lines[0].starts_with("constituency,seats,status"));
        assert!(lines[1].starts_with("Aljunied GRC,5,resolved,WP,PAP,0.410000,"));
        assert!(lines[3].starts_with("Marine Parade-Braddell Heights GRC,5,walkover,PAP (walkover),PAP,"));
        assert_eq!(lines[4], "Sembawang GRC,5,pending,Pending,,,,,,");
    }
}
