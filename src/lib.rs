//! `sample-count` library crate.
//!
//! The binary (`sample-count`) is a thin wrapper around this library so that:
//!
//! - the estimation core is testable without spawning processes
//! - the projection pipeline can be driven from other front-ends
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod domain;
pub mod error;
pub mod estimate;
pub mod io;
pub mod math;
pub mod plot;
pub mod projection;
pub mod report;
