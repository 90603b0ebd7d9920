//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - input records (`Constituency`, `PartySample`, `PendingConstituency`)
//! - run configuration and its policies (`RunConfig`, `TiePolicy`, `HungPolicy`)
//! - per-constituency outputs (`ConfidenceInterval`, `Decision`, `ConstituencyOutcome`)
//! - aggregates (`SeatTally`, `GovernmentVerdict`, `NationalVoteEstimate`)

pub mod types;

pub use types::*;
