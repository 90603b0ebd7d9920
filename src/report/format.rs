//! Formatted terminal and Markdown output.
//!
//! We keep formatting code in one place so:
//! - the estimation code stays clean and testable
//! - output changes are localized (important for snapshot-style tests)

use crate::domain::{ConstituencyOutcome, GovernmentVerdict};
use crate::report::{ConstituencyReport, ConstituencyStatus, Report};

/// Format the full run summary: settings, per-constituency calls, seats, vote share.
pub fn format_run_summary(report: &Report) -> String {
    let mut out = String::new();

    out.push_str("=== sample-count - Election Sample Count Projection ===\n");
    out.push_str(&format!(
        "Confidence: {} | turnout: {} | sample per station: {}\n",
        pct(report.config.confidence_level * 100.0, 0),
        pct(report.config.turnout_rate * 100.0, 0),
        report.config.sample_size
    ));
    out.push_str(&format!(
        "Constituencies: {} resolved of {}\n\n",
        report.resolved_count(),
        report.constituencies.len()
    ));

    out.push_str(&format_constituency_table(&report.constituencies));
    out.push('\n');
    out.push_str(&format_seat_summary(report));
    out.push('\n');
    out.push_str(&format_vote_share(report));

    let flagged: Vec<(&str, &str)> = report.flagged().collect();
    if !flagged.is_empty() {
        out.push_str("\nFlagged constituencies:\n");
        for (name, reason) in flagged {
            out.push_str(&format!("- {name}: {reason}\n"));
        }
    }

    out
}

/// Per-constituency table: call, intervals, spread.
pub fn format_constituency_table(rows: &[ConstituencyReport]) -> String {
    let mut out = String::new();
    out.push_str(
        format!(
            "{:<36} {:>5} {:<18} {:>9}  {}\n",
            "constituency", "seats", "result", "spread", "sample [interval]"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(format!("{:-<36} {:-<5} {:-<18} {:-<9}  {:-<17}\n", "", "", "", "", "").trim_end());
    out.push('\n');

    for row in rows {
        let (spread, detail) = match &row.status {
            ConstituencyStatus::Resolved { outcome } => (spread_label(outcome), interval_details(outcome, ", ")),
            ConstituencyStatus::Flagged { .. } | ConstituencyStatus::Pending => ("-".to_string(), String::new()),
        };
        out.push_str(
            format!(
                "{:<36} {:>5} {:<18} {:>9}  {}\n",
                truncate(&row.name, 36),
                row.seats,
                truncate(&row.result_label(), 18),
                spread,
                detail
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out
}

/// Seat distribution plus the government verdict.
pub fn format_seat_summary(report: &Report) -> String {
    let mut out = String::new();
    let seats = &report.seats;

    out.push_str(&format!("Seat distribution ({} seats):\n", seats.total()));
    for (party, count) in seats.ranked() {
        out.push_str(&format!("- {:<14} {count:>3}\n", party.as_str()));
    }
    if seats.inconclusive > 0 {
        out.push_str(&format!("- {:<14} {:>3}\n", "Inconclusive", seats.inconclusive));
    }
    if seats.pending > 0 {
        out.push_str(&format!("- {:<14} {:>3}\n", "Pending", seats.pending));
    }
    out.push_str(&format!("Predicted next government: {}\n", verdict_label(&report.government)));

    out
}

/// National vote share, highest first.
pub fn format_vote_share(report: &Report) -> String {
    let mut out = String::new();
    out.push_str("National vote share (estimated):\n");
    if report.national_vote.shares.is_empty() {
        out.push_str("- no resolved constituencies\n");
        return out;
    }
    for (party, share) in report.national_vote.ranked() {
        let votes = report.national_vote.votes.get(party).copied().unwrap_or(0.0);
        out.push_str(&format!(
            "- {:<14} {:>7}  ({:.0} votes)\n",
            party.as_str(),
            pct(share, 2),
            votes
        ));
    }
    out
}

pub fn verdict_label(verdict: &GovernmentVerdict) -> String {
    match verdict {
        GovernmentVerdict::Majority { party, seats, total } => format!("{party} ({seats} of {total} seats)"),
        GovernmentVerdict::LargestParty { party, seats, total } => {
            format!("{party} as largest party, no majority ({seats} of {total} seats)")
        }
        GovernmentVerdict::Undecided => "Inconclusive".to_string(),
    }
}

/// Markdown rendering of the report (results table + seat distribution).
pub fn format_markdown(report: &Report) -> String {
    let mut out = String::new();

    out.push_str("# Election Results Summary\n\n");
    out.push_str(&format!(
        "Confidence Level: {}\n\n",
        pct(report.config.confidence_level * 100.0, 0)
    ));
    out.push_str(&format!(
        "Predicted Next Government: {}\n\n",
        verdict_label(&report.government)
    ));

    out.push_str("## Detailed Results\n\n");
    out.push_str("| Constituency | Seats | Predicted Result | Sample Count and Confidence Interval | Spread |\n");
    out.push_str("|---|---:|---|---|---:|\n");
    for row in &report.constituencies {
        let (detail, spread) = match &row.status {
            ConstituencyStatus::Resolved { outcome } => (interval_details(outcome, "<br>"), spread_label(outcome)),
            ConstituencyStatus::Flagged { reason } => (format!("Flagged: {reason}"), "-".to_string()),
            ConstituencyStatus::Pending => ("Pending Data".to_string(), "-".to_string()),
        };
        out.push_str(&format!(
            "| {} | {} | {} | {} | {} |\n",
            row.name,
            row.seats,
            row.result_label(),
            detail,
            spread
        ));
    }

    out.push_str("\n## Seat Distribution\n\n");
    for (party, count) in report.seats.ranked() {
        out.push_str(&format!("- {party}: {count} seats\n"));
    }
    out.push_str(&format!("- Inconclusive: {} seats\n", report.seats.inconclusive));
    if report.seats.pending > 0 {
        out.push_str(&format!("- Pending Data: {} seats\n", report.seats.pending));
    }

    if !report.national_vote.shares.is_empty() {
        out.push_str("\n## Popular Vote\n\n");
        for (party, share) in report.national_vote.ranked() {
            out.push_str(&format!("- {party}: {}\n", pct(share, 1)));
        }
    }

    out
}

fn interval_details(outcome: &ConstituencyOutcome, sep: &str) -> String {
    if outcome.intervals.is_empty() {
        return "uncontested".to_string();
    }
    let parts: Vec<String> = outcome
        .intervals
        .iter()
        .map(|pi| {
            format!(
                "{} {} [{}, {}]",
                pi.party,
                pct(pi.proportion * 100.0, 0),
                pct(pi.interval.lower * 100.0, 1),
                pct(pi.interval.upper * 100.0, 1)
            )
        })
        .collect();
    parts.join(sep)
}

fn spread_label(outcome: &ConstituencyOutcome) -> String {
    format!("{:+.2}%", outcome.spread * 100.0)
}

fn pct(v: f64, decimals: usize) -> String {
    format!("{v:.decimals$}%")
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::pipeline::run_projection;
    use crate::domain::{Constituency, PartyId, PartySample, PendingConstituency, ProjectionInput, RunConfig};

    fn report() -> Report {
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
        run_projection(&RunConfig::default(), &input).unwrap()
    }

    #[test]
    fn summary_lists_calls_and_intervals() {
        let text = format_run_summary(&report());
        assert!(text.contains("Confidence: 95%"));
        assert!(text.contains("WP 59% [57.8%, 60.2%]"));
        assert!(text.contains("PAP (walkover)"));
        assert!(text.contains("uncontested"));
        assert!(text.contains("Pending"));
        assert!(text.contains("Predicted next government: Inconclusive"));
        for line in text.lines() {
            assert_eq!(line, line.trim_end());
        }
    }

    #[test]
    fn markdown_has_result_rows_and_seats() {
        let md = format_markdown(&report());
        assert!(md.starts_with("# Election Results Summary"));
        assert!(md.contains("| Aljunied GRC | 5 | WP |"));
        assert!(md.contains("| Sembawang GRC | 5 | Pending | Pending Data | - |"));
        assert!(md.contains("- PAP: 5 seats"));
        assert!(md.contains("- Pending Data: 5 seats"));
    }

    #[test]
    fn verdict_labels() {
        let verdict = GovernmentVerdict::Majority {
            party: PartyId::new("PAP"),
            seats: 87,
            total: 97,
        };
        assert_eq!(verdict_label(&verdict), "PAP (87 of 97 seats)");
        assert_eq!(verdict_label(&GovernmentVerdict::Undecided), "Inconclusive");
    }

    #[test]
    fn truncate_marks_cut_names() {
        assert_eq!(truncate("Jalan Kayu SMC", 36), "Jalan Kayu SMC");
        assert_eq!(truncate("abcdef", 4), "abc.");
    }
}
