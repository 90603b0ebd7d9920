//! Stratified-sample estimation.
//!
//! Responsibilities:
//!
//! - sampling variance of a proportion under equal-size strata (`variance`)
//! - clamped normal-approximation intervals (`interval`)

pub mod interval;
pub mod variance;

pub use interval::*;
pub use variance::*;
