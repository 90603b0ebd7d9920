//! Constituency resolution.
//!
//! Decision rule:
//! 1. A single contesting party wins by walkover; no interval is evaluated.
//! 2. Otherwise the leader is the party with the highest sample proportion.
//! 3. The leader wins only if its interval overlaps no other party's interval.
//! 4. Any overlap (or an unbroken tie for the lead) makes the call Inconclusive.

use crate::domain::{
    Constituency, ConstituencyOutcome, Decision, PartyInterval, PartySample, RunConfig, TiePolicy,
};
use crate::error::EstimateError;
use crate::estimate::{IntervalBuilder, StratumDesign};

/// Estimate every party's interval and resolve the constituency.
pub fn resolve_constituency(
    constituency: &Constituency,
    config: &RunConfig,
    builder: &IntervalBuilder,
) -> Result<ConstituencyOutcome, EstimateError> {
    constituency.validate(config.proportion_tolerance)?;

    if let [only] = constituency.samples.as_slice() {
        return Ok(walkover(only));
    }

    let design = StratumDesign::new(
        constituency.polling_stations,
        constituency.registered_voters,
        config.sample_size,
    )?;

    let intervals = constituency
        .samples
        .iter()
        .map(|s| {
            let variance = design.variance(s.proportion)?;
            let interval = builder.build(s.proportion, variance)?;
            Ok(PartyInterval {
                party: s.party.clone(),
                proportion: s.proportion,
                variance,
                interval,
            })
        })
        .collect::<Result<Vec<_>, EstimateError>>()?;

    let outcome = resolve(intervals, config.tie_policy)?;
    log::debug!(
        "{}: {} (spread {:+.4})",
        constituency.name,
        outcome.decision.label(),
        outcome.spread
    );
    Ok(outcome)
}

/// Resolve a set of annotated party intervals.
///
/// A one-element set is a walkover regardless of its interval.
pub fn resolve(intervals: Vec<PartyInterval>, tie_policy: TiePolicy) -> Result<ConstituencyOutcome, EstimateError> {
    match intervals.len() {
        0 => return Err(EstimateError::EmptyConstituency),
        1 => {
            let only = &intervals[0];
            return Ok(walkover(&PartySample::new(only.party.clone(), only.proportion)));
        }
        _ => {}
    }

    // Highest proportion first; input order breaks ties so the result is stable.
    let mut order: Vec<usize> = (0..intervals.len()).collect();
    order.sort_by(|&a, &b| {
        intervals[b]
            .proportion
            .partial_cmp(&intervals[a].proportion)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.cmp(&b))
    });

    let leader = &intervals[order[0]];
    let runner_up = &intervals[order[1]];
    let spread = leader.interval.lower - runner_up.interval.upper;
    let max_width = intervals
        .iter()
        .map(|pi| pi.interval.width())
        .fold(0.0_f64, f64::max);

    let tied: Vec<&PartyInterval> = order
        .iter()
        .map(|&i| &intervals[i])
        .take_while(|pi| pi.proportion == leader.proportion)
        .collect();

    let decision = if tied.len() > 1 {
        match tie_policy {
            TiePolicy::Inconclusive => Decision::Inconclusive,
            TiePolicy::Reject => {
                let parties: Vec<String> = tied.iter().map(|pi| pi.party.to_string()).collect();
                return Err(EstimateError::TiedLead {
                    proportion: leader.proportion,
                    parties: parties.join(", "),
                });
            }
        }
    } else if order[1..]
        .iter()
        .any(|&i| leader.interval.overlaps(&intervals[i].interval))
    {
        Decision::Inconclusive
    } else {
        Decision::Winner(leader.party.clone())
    };

    Ok(ConstituencyOutcome {
        decision,
        intervals,
        spread,
        max_width,
    })
}

fn walkover(sample: &PartySample) -> ConstituencyOutcome {
    ConstituencyOutcome {
        decision: Decision::Walkover(sample.party.clone()),
        intervals: Vec::new(),
        spread: 0.0,
        max_width: 0.0,
    }
}
