//! Shared domain types.
//!
//! Everything here is a value object: built once per run, never mutated after
//! construction, and serializable so a finished report can be exported and
//! re-rendered later without recomputation.

use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::EstimateError;

/// Party codes seen in Singapore general elections.
///
/// This is a lookup table only; any other code is still a valid [`PartyId`].
pub const KNOWN_PARTIES: &[(&str, &str)] = &[
    ("PAP", "People's Action Party"),
    ("WP", "Workers' Party"),
    ("PSP", "Progress Singapore Party"),
    ("SDP", "Singapore Democratic Party"),
    ("RP", "Reform Party"),
    ("NSP", "National Solidarity Party"),
    ("PPP", "People's Power Party"),
    ("SDA", "Singapore Democratic Alliance"),
    ("SPP", "Singapore People's Party"),
    ("RDU", "Red Dot United"),
    ("PAR", "People's Alliance for Reform"),
    ("SUP", "Singapore United Party"),
    ("IND", "Independent"),
];

const SUM_EPSILON: f64 = 1e-9;

/// Opaque party identifier.
///
/// Codes are trimmed on construction and compared exactly. The set is open:
/// new parties contest new elections.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PartyId(String);

impl PartyId {
    pub fn new(code: impl AsRef<str>) -> Self {
        Self(code.as_ref().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Full party name when the code is in [`KNOWN_PARTIES`].
    pub fn full_name(&self) -> Option<&'static str> {
        KNOWN_PARTIES
            .iter()
            .find(|(code, _)| code.eq_ignore_ascii_case(&self.0))
            .map(|(_, name)| *name)
    }

    pub fn is_known(&self) -> bool {
        self.full_name().is_some()
    }
}

impl fmt::Display for PartyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PartyId {
    fn from(value: &str) -> Self {
        PartyId::new(value)
    }
}

/// One party's share of a constituency sample count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartySample {
    pub party: PartyId,
    /// Sample proportion `p̂ ∈ [0, 1]`.
    pub proportion: f64,
}

impl PartySample {
    pub fn new(party: impl Into<PartyId>, proportion: f64) -> Self {
        Self {
            party: party.into(),
            proportion,
        }
    }
}

/// A constituency with its released sample count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constituency {
    pub name: String,
    pub seats: u32,
    /// Number of polling stations `L` (one stratum each).
    pub polling_stations: u64,
    /// Registered voters `N`.
    pub registered_voters: u64,
    pub samples: Vec<PartySample>,
}

impl Constituency {
    /// Check the structural invariants of a constituency record.
    ///
    /// `tolerance` bounds how far the sample proportions may sum away from 1.
    pub fn validate(&self, tolerance: f64) -> Result<(), EstimateError> {
        if self.name.trim().is_empty() {
            return Err(EstimateError::InvalidInput("constituency name is blank".to_string()));
        }
        if self.seats == 0 {
            return Err(EstimateError::InvalidInput("seat count must be >= 1".to_string()));
        }
        if self.polling_stations == 0 {
            return Err(EstimateError::InvalidInput(
                "polling-station count must be >= 1".to_string(),
            ));
        }
        if self.registered_voters == 0 {
            return Err(EstimateError::InvalidInput(
                "registered-voter count must be >= 1".to_string(),
            ));
        }
        if self.samples.is_empty() {
            return Err(EstimateError::EmptyConstituency);
        }

        for (i, s) in self.samples.iter().enumerate() {
            if s.party.as_str().is_empty() {
                return Err(EstimateError::InvalidInput("blank party identifier".to_string()));
            }
            if !(s.proportion.is_finite() && (0.0..=1.0).contains(&s.proportion)) {
                return Err(EstimateError::InvalidInput(format!(
                    "proportion {} for {} is outside [0, 1]",
                    s.proportion, s.party
                )));
            }
            if self.samples[..i].iter().any(|prev| prev.party == s.party) {
                return Err(EstimateError::InvalidInput(format!(
                    "party {} listed more than once",
                    s.party
                )));
            }
        }

        let sum: f64 = self.samples.iter().map(|s| s.proportion).sum();
        // Percent inputs divided by 100 land a few ulps off the boundary.
        if (sum - 1.0).abs() > tolerance + SUM_EPSILON {
            return Err(EstimateError::ProportionSum { sum, tolerance });
        }
        Ok(())
    }
}

/// A constituency whose sample count has not been released yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingConstituency {
    pub name: String,
    pub seats: u32,
}

/// A constituency whose input records were partly unreadable.
///
/// It is never resolved: a dropped party row would otherwise reshape the
/// contest (a two-way race read as a walkover).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectedConstituency {
    pub name: String,
    pub seats: u32,
    pub reason: String,
}

/// Everything the pipeline needs besides the configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectionInput {
    pub constituencies: Vec<Constituency>,
    pub pending: Vec<PendingConstituency>,
    #[serde(default)]
    pub rejected: Vec<RejectedConstituency>,
}

impl From<Vec<Constituency>> for ProjectionInput {
    fn from(constituencies: Vec<Constituency>) -> Self {
        Self {
            constituencies,
            ..Self::default()
        }
    }
}

impl ProjectionInput {
    /// Total declared seats across sampled, pending and rejected constituencies.
    pub fn declared_seats(&self) -> u64 {
        let sampled: u64 = self.constituencies.iter().map(|c| u64::from(c.seats)).sum();
        let pending: u64 = self.pending.iter().map(|c| u64::from(c.seats)).sum();
        let rejected: u64 = self.rejected.iter().map(|c| u64::from(c.seats)).sum();
        sampled + pending + rejected
    }

    /// Seats that cannot be called: pending plus rejected constituencies.
    pub fn unresolvable_seats(&self) -> u64 {
        let pending: u64 = self.pending.iter().map(|c| u64::from(c.seats)).sum();
        let rejected: u64 = self.rejected.iter().map(|c| u64::from(c.seats)).sum();
        pending + rejected
    }
}

/// Two-sided interval on a proportion, clamped to `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    pub lower: f64,
    pub upper: f64,
}

impl ConfidenceInterval {
    /// Degenerate interval at a single point.
    pub fn point(value: f64) -> Self {
        Self {
            lower: value,
            upper: value,
        }
    }

    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }

    /// Closed-interval overlap. Symmetric in its arguments.
    pub fn overlaps(&self, other: &ConfidenceInterval) -> bool {
        self.lower <= other.upper && other.lower <= self.upper
    }
}

/// A party sample together with its variance and interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartyInterval {
    pub party: PartyId,
    pub proportion: f64,
    pub variance: f64,
    pub interval: ConfidenceInterval,
}

/// The call made for one constituency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "party", rename_all = "lowercase")]
pub enum Decision {
    Winner(PartyId),
    Walkover(PartyId),
    Inconclusive,
}

impl Decision {
    /// The party that takes the seats, if any.
    pub fn winner(&self) -> Option<&PartyId> {
        match self {
            Decision::Winner(p) | Decision::Walkover(p) => Some(p),
            Decision::Inconclusive => None,
        }
    }

    pub fn label(&self) -> String {
        match self {
            Decision::Winner(p) => p.to_string(),
            Decision::Walkover(p) => format!("{p} (walkover)"),
            Decision::Inconclusive => "Inconclusive".to_string(),
        }
    }
}

/// Resolved outcome for a constituency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstituencyOutcome {
    pub decision: Decision,
    /// Per-party intervals in input order. Empty for a walkover.
    pub intervals: Vec<PartyInterval>,
    /// Leader's lower bound minus the runner-up's upper bound.
    ///
    /// Positive for a decisive call, negative when the intervals overlap,
    /// zero for a walkover.
    pub spread: f64,
    /// Widest party interval in the constituency.
    pub max_width: f64,
}

/// How to treat two or more parties sharing the top sample proportion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum TiePolicy {
    /// The tie counts as an overlap: the constituency is Inconclusive.
    #[default]
    Inconclusive,
    /// The tie is an input error: the constituency is flagged.
    Reject,
}

/// What to report when no party holds a strict majority of seats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum HungPolicy {
    /// No government is projected.
    #[default]
    Undecided,
    /// Name the party holding the most seats, if unique, as a minority projection.
    LargestParty,
}

/// A full run's configuration.
///
/// Built from CLI flags and environment (plus defaults) and validated once
/// before any constituency is processed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    pub confidence_level: f64,
    pub turnout_rate: f64,
    /// Voters sampled per polling station (`n`).
    pub sample_size: u64,
    pub proportion_tolerance: f64,
    pub tie_policy: TiePolicy,
    pub hung_policy: HungPolicy,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            confidence_level: 0.95,
            turnout_rate: 1.0,
            sample_size: 100,
            proportion_tolerance: 0.01,
            tie_policy: TiePolicy::Inconclusive,
            hung_policy: HungPolicy::Undecided,
        }
    }
}

impl RunConfig {
    pub fn validate(&self) -> Result<(), EstimateError> {
        let c = self.confidence_level;
        if !(c.is_finite() && c > 0.0 && c < 1.0) {
            return Err(EstimateError::InvalidConfidenceLevel(c));
        }
        let t = self.turnout_rate;
        if !(t.is_finite() && t > 0.0 && t <= 1.0) {
            return Err(EstimateError::InvalidTurnout(t));
        }
        if self.sample_size == 0 {
            return Err(EstimateError::InvalidConfig(
                "per-station sample size must be >= 1".to_string(),
            ));
        }
        let tol = self.proportion_tolerance;
        if !(tol.is_finite() && (0.0..1.0).contains(&tol)) {
            return Err(EstimateError::InvalidConfig(format!(
                "proportion tolerance {tol} must lie in [0, 1)"
            )));
        }
        Ok(())
    }
}

/// Seats won per party, plus the undecided buckets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeatTally {
    pub parties: std::collections::BTreeMap<PartyId, u64>,
    pub inconclusive: u64,
    /// Seats in constituencies with no usable sample (not yet released or flagged).
    pub pending: u64,
}

impl SeatTally {
    pub fn total(&self) -> u64 {
        self.parties.values().sum::<u64>() + self.inconclusive + self.pending
    }

    pub fn seats_for(&self, party: &PartyId) -> u64 {
        self.parties.get(party).copied().unwrap_or(0)
    }

    /// Parties ordered by seats (descending), then code.
    pub fn ranked(&self) -> Vec<(&PartyId, u64)> {
        let mut out: Vec<(&PartyId, u64)> = self.parties.iter().map(|(p, s)| (p, *s)).collect();
        out.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        out
    }
}

/// Projected government.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum GovernmentVerdict {
    Majority { party: PartyId, seats: u64, total: u64 },
    LargestParty { party: PartyId, seats: u64, total: u64 },
    Undecided,
}

impl GovernmentVerdict {
    pub fn party(&self) -> Option<&PartyId> {
        match self {
            GovernmentVerdict::Majority { party, .. } | GovernmentVerdict::LargestParty { party, .. } => {
                Some(party)
            }
            GovernmentVerdict::Undecided => None,
        }
    }
}

/// National vote estimate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NationalVoteEstimate {
    /// Estimated absolute votes per party.
    pub votes: std::collections::BTreeMap<PartyId, f64>,
    /// Vote share in percent. Sums to 100 when non-empty.
    pub shares: std::collections::BTreeMap<PartyId, f64>,
    pub total_votes: f64,
}

impl NationalVoteEstimate {
    /// Parties ordered by share (descending), then code.
    pub fn ranked(&self) -> Vec<(&PartyId, f64)> {
        let mut out: Vec<(&PartyId, f64)> = self.shares.iter().map(|(p, s)| (p, *s)).collect();
        out.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(b.0))
        });
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aljunied() -> Constituency {
        Constituency {
            name: "Aljunied GRC".to_string(),
            seats: 5,
            polling_stations: 67,
            registered_voters: 144_276,
            samples: vec![PartySample::new("PAP", 0.41), PartySample::new("WP", 0.59)],
        }
    }

    #[test]
    fn party_ids_tolerate_unknown_codes() {
        let pap = PartyId::new(" PAP ");
        assert_eq!(pap.as_str(), "PAP");
        assert_eq!(pap.full_name(), Some("People's Action Party"));

        let new_party = PartyId::new("XYZ");
        assert!(!new_party.is_known());
        assert_eq!(new_party.to_string(), "XYZ");
    }

    #[test]
    fn valid_constituency_passes() {
        assert!(aljunied().validate(0.01).is_ok());
    }

    #[test]
    fn proportion_sum_is_checked_against_tolerance() {
        let mut c = aljunied();
        c.samples[1].proportion = 0.55;
        match c.validate(0.01) {
            Err(EstimateError::ProportionSum { sum, .. }) => assert!((sum - 0.96).abs() < 1e-12),
            other => panic!("unexpected: {other:?}"),
        }
        // Rounded whole percentages (e.g. 41 + 60) fit within a 1% tolerance.
        c.samples[1].proportion = 0.60;
        assert!(c.validate(0.01).is_ok());
    }

    #[test]
    fn structural_problems_are_invalid_input() {
        let mut c = aljunied();
        c.samples.clear();
        assert_eq!(c.validate(0.01), Err(EstimateError::EmptyConstituency));

        let mut c = aljunied();
        c.polling_stations = 0;
        assert!(matches!(c.validate(0.01), Err(EstimateError::InvalidInput(_))));

        let mut c = aljunied();
        c.samples[0].proportion = -0.1;
        assert!(matches!(c.validate(0.01), Err(EstimateError::InvalidInput(_))));

        let mut c = aljunied();
        c.samples[1].party = PartyId::new("PAP");
        assert!(matches!(c.validate(0.01), Err(EstimateError::InvalidInput(_))));
    }

    #[test]
    fn overlap_is_symmetric() {
        let a = ConfidenceInterval { lower: 0.40, upper: 0.45 };
        let b = ConfidenceInterval { lower: 0.45, upper: 0.50 };
        let c = ConfidenceInterval { lower: 0.46, upper: 0.50 };
        assert!(a.overlaps(&b) && b.overlaps(&a));
        assert!(!a.overlaps(&c) && !c.overlaps(&a));
    }

    #[test]
    fn run_config_validation() {
        assert!(RunConfig::default().validate().is_ok());

        let cfg = RunConfig { confidence_level: 1.0, ..RunConfig::default() };
        assert_eq!(cfg.validate(), Err(EstimateError::InvalidConfidenceLevel(1.0)));

        let cfg = RunConfig { turnout_rate: 0.0, ..RunConfig::default() };
        assert_eq!(cfg.validate(), Err(EstimateError::InvalidTurnout(0.0)));

        let cfg = RunConfig { sample_size: 0, ..RunConfig::default() };
        assert!(matches!(cfg.validate(), Err(EstimateError::InvalidConfig(_))));
    }

    #[test]
    fn seat_tally_ranks_by_seats() {
        let mut tally = SeatTally::default();
        tally.parties.insert(PartyId::new("WP"), 10);
        tally.parties.insert(PartyId::new("PAP"), 87);
        tally.inconclusive = 0;
        tally.pending = 0;
        let ranked = tally.ranked();
        assert_eq!(ranked[0].0.as_str(), "PAP");
        assert_eq!(tally.total(), 97);
    }
}
