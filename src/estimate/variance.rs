//! Sampling variance of a stratified proportion estimate.
//!
//! Each polling station is a stratum. With `L` stations, `N` registered voters,
//! and `n` ballots sampled per station, every stratum is assumed to hold
//! `N_h = N / L` voters with within-stratum variance `p̂(1 - p̂)`. The stratified
//! estimator's variance then collapses to:
//!
//! ```text
//! s²(p̂) = (N - L·n) / (L · (N - L) · n) · p̂ · (1 - p̂)
//! ```
//!
//! where `(N - L·n)` carries the finite population correction.

use serde::{Deserialize, Serialize};

use crate::error::EstimateError;

/// Per-stratum design derived from a constituency. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StratumDesign {
    pub stations: u64,
    pub voters: u64,
    pub sample_size: u64,
}

impl StratumDesign {
    /// Validate the design and return it.
    ///
    /// `N = L` is checked first: it makes the denominator vanish, and it would
    /// otherwise also trip the `L·n ≥ N` check with a less precise message.
    pub fn new(stations: u64, voters: u64, sample_size: u64) -> Result<Self, EstimateError> {
        if stations == 0 || voters == 0 || sample_size == 0 {
            return Err(EstimateError::InvalidInput(format!(
                "stations ({stations}), voters ({voters}) and sample size ({sample_size}) must all be >= 1"
            )));
        }
        if voters == stations {
            return Err(EstimateError::DivisionByZero { stations, voters });
        }
        let sampled = stations.saturating_mul(sample_size);
        if sampled >= voters {
            return Err(EstimateError::SampleExceedsPopulation {
                stations,
                voters,
                sample_size,
                sampled,
            });
        }
        Ok(Self {
            stations,
            voters,
            sample_size,
        })
    }

    /// Voters per stratum, `N / L`.
    pub fn stratum_size(&self) -> f64 {
        self.voters as f64 / self.stations as f64
    }

    /// The proportion-independent factor `(N - L·n) / (L · (N - L) · n)`.
    pub fn design_factor(&self) -> f64 {
        let l = self.stations as f64;
        let big_n = self.voters as f64;
        let n = self.sample_size as f64;
        (big_n - l * n) / (l * (big_n - l) * n)
    }

    /// Variance of `p̂` under this design.
    pub fn variance(&self, proportion: f64) -> Result<f64, EstimateError> {
        check_proportion(proportion)?;
        // Exact zero at certainty rather than a rounding residue.
        if proportion == 0.0 || proportion == 1.0 {
            return Ok(0.0);
        }
        Ok(self.design_factor() * proportion * (1.0 - proportion))
    }
}

/// Variance of a stratified sample proportion.
pub fn stratified_variance(
    proportion: f64,
    stations: u64,
    voters: u64,
    sample_size: u64,
) -> Result<f64, EstimateError> {
    StratumDesign::new(stations, voters, sample_size)?.variance(proportion)
}

fn check_proportion(p: f64) -> Result<(), EstimateError> {
    if p.is_finite() && (0.0..=1.0).contains(&p) {
        Ok(())
    } else {
        Err(EstimateError::InvalidInput(format!("proportion {p} is outside [0, 1]")))
    }
}
