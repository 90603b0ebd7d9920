//! Seat aggregation and government formation.

use std::collections::BTreeMap;

use crate::domain::{Constituency, ConstituencyOutcome, GovernmentVerdict, HungPolicy, PartyId, SeatTally};
use crate::error::EstimateError;

/// Sum resolved outcomes into a seat tally.
///
/// `unresolved_seats` are seats with no usable outcome (pending, rejected or
/// flagged constituencies); they land in the Pending bucket. The tally must
/// account for exactly `declared_seats`.
pub fn tally_seats(
    resolved: &[(&Constituency, &ConstituencyOutcome)],
    unresolved_seats: u64,
    declared_seats: u64,
) -> Result<SeatTally, EstimateError> {
    let mut parties: BTreeMap<PartyId, u64> = BTreeMap::new();
    let mut inconclusive = 0_u64;

    for (constituency, outcome) in resolved {
        let seats = u64::from(constituency.seats);
        match outcome.decision.winner() {
            Some(party) => *parties.entry(party.clone()).or_insert(0) += seats,
            None => inconclusive += seats,
        }
    }

    let tally = SeatTally {
        parties,
        inconclusive,
        pending: unresolved_seats,
    };

    let tallied = tally.total();
    if tallied != declared_seats {
        return Err(EstimateError::SeatCountMismatch {
            tallied,
            declared: declared_seats,
        });
    }
    Ok(tally)
}

/// Decide which party, if any, is projected to form the government.
///
/// A strict majority of all seats (including undecided ones) always wins.
/// Short of that, `policy` decides between no projection and naming the
/// unique largest party.
pub fn government_verdict(tally: &SeatTally, policy: HungPolicy) -> GovernmentVerdict {
    let total = tally.total();

    if let Some((party, seats)) = tally.parties.iter().find(|(_, seats)| 2 * **seats > total) {
        return GovernmentVerdict::Majority {
            party: party.clone(),
            seats: *seats,
            total,
        };
    }

    match policy {
        HungPolicy::Undecided => GovernmentVerdict::Undecided,
        HungPolicy::LargestParty => {
            let ranked = tally.ranked();
            match ranked.as_slice() {
                [(party, seats), rest @ ..] if *seats > 0 && rest.first().is_none_or(|(_, s)| s < seats) => {
                    GovernmentVerdict::LargestParty {
                        party: (*party).clone(),
                        seats: *seats,
                        total,
                    }
                }
                _ => GovernmentVerdict::Undecided,
            }
        }
    }
}
