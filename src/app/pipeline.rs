//! Shared projection pipeline used by every CLI front-end.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! validate config -> per-constituency variance/interval/resolve (parallel)
//! -> seat tally + government verdict -> national vote -> report
//!
//! The pipeline is a pure function of `(RunConfig, ProjectionInput)`. Nothing is
//! carried between runs.

use rayon::prelude::*;

use crate::domain::{Constituency, ConstituencyOutcome, ProjectionInput, RunConfig};
use crate::error::EstimateError;
use crate::estimate::IntervalBuilder;
use crate::projection::{estimate_national_vote, government_verdict, resolve_constituency, tally_seats};
use crate::report::{ConstituencyReport, ConstituencyStatus, Report};

/// Execute the full projection and return the report.
///
/// Configuration errors abort the run. Per-constituency errors are recorded
/// as `Flagged` entries and the rest of the run proceeds.
pub fn run_projection(config: &RunConfig, input: &ProjectionInput) -> Result<Report, EstimateError> {
    // 1) Validate the run configuration.
    config.validate()?;
    let builder = IntervalBuilder::new(config.confidence_level)?;

    log::info!(
        "Projecting {} constituencies ({} pending) at {:.0}% confidence",
        input.constituencies.len(),
        input.pending.len(),
        config.confidence_level * 100.0
    );

    // 2) Resolve every constituency independently (parallel, order-preserving).
    let results: Vec<Result<ConstituencyOutcome, EstimateError>> = input
        .constituencies
        .par_iter()
        .map(|c| resolve_constituency(c, config, &builder))
        .collect();

    let mut resolved: Vec<(&Constituency, &ConstituencyOutcome)> = Vec::new();
    let mut unresolved_seats = input.unresolvable_seats();
    for rejected in &input.rejected {
        log::warn!("Skipping {}: {}", rejected.name, rejected.reason);
    }
    for (constituency, result) in input.constituencies.iter().zip(&results) {
        match result {
            Ok(outcome) => resolved.push((constituency, outcome)),
            Err(err) => {
                log::warn!("Skipping {}: {err}", constituency.name);
                unresolved_seats += u64::from(constituency.seats);
            }
        }
    }

    // 3) Seats and government.
    let seats = tally_seats(&resolved, unresolved_seats, input.declared_seats())?;
    let government = government_verdict(&seats, config.hung_policy);

    // 4) National vote from the constituencies that resolved.
    let counted: Vec<&Constituency> = resolved.iter().map(|(c, _)| *c).collect();
    let national_vote = estimate_national_vote(&counted, config.turnout_rate)?;

    let resolved_count = resolved.len();

    // 5) Assemble the report in input order, then rejected, then pending.
    let mut constituencies: Vec<ConstituencyReport> = input
        .constituencies
        .iter()
        .zip(results)
        .map(|(c, result)| ConstituencyReport {
            name: c.name.clone(),
            seats: c.seats,
            status: match result {
                Ok(outcome) => ConstituencyStatus::Resolved { outcome },
                Err(err) => ConstituencyStatus::Flagged {
                    reason: err.to_string(),
                },
            },
        })
        .collect();
    constituencies.extend(input.rejected.iter().map(|r| ConstituencyReport {
        name: r.name.clone(),
        seats: r.seats,
        status: ConstituencyStatus::Flagged {
            reason: r.reason.clone(),
        },
    }));
    constituencies.extend(input.pending.iter().map(|p| ConstituencyReport {
        name: p.name.clone(),
        seats: p.seats,
        status: ConstituencyStatus::Pending,
    }));

    log::info!(
        "Resolved {} of {} constituencies; {} seats inconclusive, {} pending",
        resolved_count,
        constituencies.len(),
        seats.inconclusive,
        seats.pending
    );

    Ok(Report {
        config: config.clone(),
        constituencies,
        seats,
        government,
        national_vote,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Decision, GovernmentVerdict, PartyId, PartySample, PendingConstituency, RejectedConstituency};

    fn constituency(name: &str, seats: u32, stations: u64, voters: u64, samples: &[(&str, f64)]) -> Constituency {
        Constituency {
            name: name.to_string(),
            seats,
            polling_stations: stations,
            registered_voters: voters,
            samples: samples.iter().map(|(p, v)| PartySample::new(*p, *v)).collect(),
        }
    }

    fn sample_input() -> ProjectionInput {
        ProjectionInput {
            constituencies: vec![
                constituency("Aljunied GRC", 5, 67, 144_276, &[("PAP", 0.41), ("WP", 0.59)]),
                constituency("Marine Parade-Braddell Heights GRC", 5, 60, 140_000, &[("PAP", 1.0)]),
                constituency("Jalan Kayu SMC", 1, 13, 30_000, &[("PAP", 0.52), ("WP", 0.48)]),
                constituency("Tampines GRC", 5, 70, 148_000, &[("PAP", 0.57), ("WP", 0.43)]),
                constituency("Broken SMC", 1, 10, 20_000, &[("PAP", 0.70), ("WP", 0.10)]),
            ],
            pending: vec![PendingConstituency {
                name: "Sembawang GRC".to_string(),
                seats: 5,
            }],
            ..ProjectionInput::default()
        }
    }

    #[test]
    fn end_to_end_report() {
        let report = run_projection(&RunConfig::default(), &sample_input()).unwrap();

        let calls: Vec<String> = report.constituencies.iter().map(|c| c.result_label()).collect();
        assert_eq!(
            calls,
            ["WP", "PAP (walkover)", "Inconclusive", "PAP", "Flagged", "Pending"]
        );

        let walkover = report.constituencies[1].outcome().unwrap();
        assert_eq!(walkover.decision, Decision::Walkover(PartyId::new("PAP")));
        assert_eq!(walkover.spread, 0.0);

        assert_eq!(report.seats.seats_for(&PartyId::new("PAP")), 10);
        assert_eq!(report.seats.seats_for(&PartyId::new("WP")), 5);
        assert_eq!(report.seats.inconclusive, 1);
        assert_eq!(report.seats.pending, 6);
        assert_eq!(report.seats.total(), 22);
        assert_eq!(report.flagged().count(), 1);
        assert_eq!(report.government, GovernmentVerdict::Undecided);

        let share_total: f64 = report.national_vote.shares.values().sum();
        assert!((share_total - 100.0).abs() < 1e-6);
    }

    #[test]
    fn majority_is_projected() {
        let input: ProjectionInput = vec![
            constituency("A GRC", 5, 60, 140_000, &[("PAP", 0.65), ("WP", 0.35)]),
            constituency("B SMC", 1, 20, 30_000, &[("PAP", 0.51), ("PSP", 0.49)]),
            constituency("C GRC", 3, 50, 120_000, &[("WP", 0.62), ("PAP", 0.38)]),
        ]
        .into();
        let report = run_projection(&RunConfig::default(), &input).unwrap();
        assert_eq!(
            report.government,
            GovernmentVerdict::Majority {
                party: PartyId::new("PAP"),
                seats: 5,
                total: 9
            }
        );
    }

    #[test]
    fn rejected_constituencies_are_flagged_not_resolved() {
        let mut input = sample_input();
        input.rejected.push(RejectedConstituency {
            name: "Bukit SMC".to_string(),
            seats: 1,
            reason: "input row rejected (line 3)".to_string(),
        });
        let report = run_projection(&RunConfig::default(), &input).unwrap();

        let bukit = &report.constituencies[5];
        assert_eq!(bukit.name, "Bukit SMC");
        assert_eq!(
            bukit.status,
            ConstituencyStatus::Flagged {
                reason: "input row rejected (line 3)".to_string()
            }
        );
        assert_eq!(report.constituencies[6].name, "Sembawang GRC");
        assert_eq!(report.seats.pending, 7);
        assert_eq!(report.seats.total(), 23);
        assert_eq!(report.flagged().count(), 2);
    }

    #[test]
    fn run_level_errors_abort() {
        let bad = RunConfig {
            confidence_level: 0.0,
            ..RunConfig::default()
        };
        assert_eq!(
            run_projection(&bad, &sample_input()).unwrap_err(),
            EstimateError::InvalidConfidenceLevel(0.0)
        );

        let bad = RunConfig {
            turnout_rate: 1.2,
            ..RunConfig::default()
        };
        assert_eq!(
            run_projection(&bad, &sample_input()).unwrap_err(),
            EstimateError::InvalidTurnout(1.2)
        );
    }

    #[test]
    fn repeated_runs_are_identical() {
        let input = sample_input();
        let first = run_projection(&RunConfig::default(), &input).unwrap();
        let second = run_projection(&RunConfig::default(), &input).unwrap();
        assert_eq!(first.constituencies, second.constituencies);
        assert_eq!(first.seats, second.seats);
    }
}
