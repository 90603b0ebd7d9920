//! The consolidated projection report and its renderers.
//!
//! A [`Report`] is fully materialized: renderers and exporters read it and
//! never re-run any estimation.

use serde::{Deserialize, Serialize};

use crate::domain::{ConstituencyOutcome, GovernmentVerdict, NationalVoteEstimate, RunConfig, SeatTally};

pub mod format;

pub use format::*;

/// Per-constituency status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ConstituencyStatus {
    Resolved { outcome: ConstituencyOutcome },
    /// Input or sampling design was rejected; seats are counted as pending.
    Flagged { reason: String },
    /// No sample count released yet.
    Pending,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstituencyReport {
    pub name: String,
    pub seats: u32,
    #[serde(flatten)]
    pub status: ConstituencyStatus,
}

impl ConstituencyReport {
    pub fn outcome(&self) -> Option<&ConstituencyOutcome> {
        match &self.status {
            ConstituencyStatus::Resolved { outcome } => Some(outcome),
            _ => None,
        }
    }

    /// Short label for the call: party, `Inconclusive`, `Flagged` or `Pending`.
    pub fn result_label(&self) -> String {
        match &self.status {
            ConstituencyStatus::Resolved { outcome } => outcome.decision.label(),
            ConstituencyStatus::Flagged { .. } => "Flagged".to_string(),
            ConstituencyStatus::Pending => "Pending".to_string(),
        }
    }
}

/// All outputs of a single projection run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub config: RunConfig,
    pub constituencies: Vec<ConstituencyReport>,
    pub seats: SeatTally,
    pub government: GovernmentVerdict,
    pub national_vote: NationalVoteEstimate,
}

impl Report {
    pub fn flagged(&self) -> impl Iterator<Item = (&str, &str)> {
        self.constituencies.iter().filter_map(|c| match &c.status {
            ConstituencyStatus::Flagged { reason } => Some((c.name.as_str(), reason.as_str())),
            _ => None,
        })
    }

    pub fn resolved_count(&self) -> usize {
        self.constituencies.iter().filter(|c| c.outcome().is_some()).count()
    }
}
