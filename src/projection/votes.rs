//! National vote-share estimation.
//!
//! Each constituency contributes `p̂ × N × turnout` votes per party. Totals are
//! combined with a parallel fold/reduce; merging maps by addition is
//! associative and commutative, so only the last floating-point digit can
//! depend on scheduling.

use std::collections::BTreeMap;

use rayon::prelude::*;

use crate::domain::{Constituency, NationalVoteEstimate, PartyId};
use crate::error::EstimateError;

/// Estimated votes per party in one constituency.
pub fn constituency_votes(constituency: &Constituency, turnout_rate: f64) -> BTreeMap<PartyId, f64> {
    let voters = constituency.registered_voters as f64 * turnout_rate;
    constituency
        .samples
        .iter()
        .map(|s| (s.party.clone(), s.proportion * voters))
        .collect()
}

/// Aggregate estimated votes and vote share across constituencies.
pub fn estimate_national_vote(
    constituencies: &[&Constituency],
    turnout_rate: f64,
) -> Result<NationalVoteEstimate, EstimateError> {
    if !(turnout_rate.is_finite() && turnout_rate > 0.0 && turnout_rate <= 1.0) {
        return Err(EstimateError::InvalidTurnout(turnout_rate));
    }

    let votes: BTreeMap<PartyId, f64> = constituencies
        .par_iter()
        .map(|c| constituency_votes(c, turnout_rate))
        .reduce(BTreeMap::new, merge_votes);

    let total_votes: f64 = votes.values().sum();
    let shares = if total_votes > 0.0 {
        votes
            .iter()
            .map(|(party, v)| (party.clone(), v / total_votes * 100.0))
            .collect()
    } else {
        BTreeMap::new()
    };

    Ok(NationalVoteEstimate {
        votes,
        shares,
        total_votes,
    })
}

fn merge_votes(mut acc: BTreeMap<PartyId, f64>, other: BTreeMap<PartyId, f64>) -> BTreeMap<PartyId, f64> {
    for (party, v) in other {
        *acc.entry(party).or_insert(0.0) += v;
    }
    acc
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PartySample;
    use rand::prelude::*;
    use rand::rngs::StdRng;

    fn constituency(voters: u64, samples: &[(&str, f64)]) -> Constituency {
        Constituency {
            name: "Test".to_string(),
            seats: 1,
            polling_stations: 10,
            registered_voters: voters,
            samples: samples.iter().map(|(p, v)| PartySample::new(*p, *v)).collect(),
        }
    }

    #[test]
    fn weights_by_electorate_and_turnout() {
        let a = constituency(100_000, &[("PAP", 0.6), ("WP", 0.4)]);
        let b = constituency(50_000, &[("PAP", 0.3), ("PSP", 0.7)]);
        let est = estimate_national_vote(&[&a, &b], 0.9).unwrap();

        assert!((est.votes[&PartyId::new("PAP")] - (54_000.0 + 13_500.0)).abs() < 1e-6);
        assert!((est.votes[&PartyId::new("WP")] - 36_000.0).abs() < 1e-6);
        assert!((est.votes[&PartyId::new("PSP")] - 31_500.0).abs() < 1e-6);
        assert!((est.total_votes - 135_000.0).abs() < 1e-6);
        assert!((est.shares[&PartyId::new("PAP")] - 50.0).abs() < 1e-9);
    }

    #[test]
    fn turnout_does_not_change_shares() {
        let a = constituency(100_000, &[("PAP", 0.6), ("WP", 0.4)]);
        let full = estimate_national_vote(&[&a], 1.0).unwrap();
        let partial = estimate_national_vote(&[&a], 0.5).unwrap();
        for (party, share) in &full.shares {
            assert!((share - partial.shares[party]).abs() < 1e-9);
        }
    }

    #[test]
    fn shares_sum_to_one_hundred() {
        let mut rng = StdRng::seed_from_u64(11);
        let parties = ["PAP", "WP", "PSP", "SDP", "RDU", "IND"];
        let mut input = Vec::new();
        for _ in 0..33 {
            let k = rng.gen_range(1..=parties.len());
            let raw: Vec<f64> = (0..k).map(|_| rng.gen_range(0.01..1.0)).collect();
            let sum: f64 = raw.iter().sum();
            let samples: Vec<(&str, f64)> = parties[..k].iter().copied().zip(raw.iter().map(|r| r / sum)).collect();
            input.push(constituency(rng.gen_range(20_000..160_000), &samples));
        }
        let refs: Vec<&Constituency> = input.iter().collect();
        let est = estimate_national_vote(&refs, 0.92).unwrap();
        let total: f64 = est.shares.values().sum();
        assert!((total - 100.0).abs() < 1e-6);
    }

    #[test]
    fn empty_input_has_no_shares() {
        let est = estimate_national_vote(&[], 0.9).unwrap();
        assert!(est.shares.is_empty());
        assert_eq!(est.total_votes, 0.0);
    }

    #[test]
    fn rejects_invalid_turnout() {
        assert!(matches!(
            estimate_national_vote(&[], 1.5),
            Err(EstimateError::InvalidTurnout(_))
        ));
    }
}
