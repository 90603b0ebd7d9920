//! Normal-approximation confidence intervals for a proportion.

use crate::domain::ConfidenceInterval;
use crate::error::EstimateError;
use crate::math::two_sided_critical_value;

/// Interval builder bound to one confidence level.
///
/// Computing `z(c)` once per run keeps per-party work to a square root.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntervalBuilder {
    confidence_level: f64,
    z: f64,
}

impl IntervalBuilder {
    pub fn new(confidence_level: f64) -> Result<Self, EstimateError> {
        let z = two_sided_critical_value(confidence_level)?;
        Ok(Self { confidence_level, z })
    }

    pub fn confidence_level(&self) -> f64 {
        self.confidence_level
    }

    pub fn critical_value(&self) -> f64 {
        self.z
    }

    /// `[max(0, p̂ - z·s), min(1, p̂ + z·s)]`.
    pub fn build(&self, proportion: f64, variance: f64) -> Result<ConfidenceInterval, EstimateError> {
        if !(proportion.is_finite() && (0.0..=1.0).contains(&proportion)) {
            return Err(EstimateError::InvalidInput(format!(
                "proportion {proportion} is outside [0, 1]"
            )));
        }
        if !(variance.is_finite() && variance >= 0.0) {
            return Err(EstimateError::InvalidInput(format!(
                "variance {variance} must be finite and non-negative"
            )));
        }
        let half_width = self.z * variance.sqrt();
        Ok(ConfidenceInterval {
            lower: (proportion - half_width).max(0.0),
            upper: (proportion + half_width).min(1.0),
        })
    }
}

/// One-shot interval at `confidence_level`.
pub fn confidence_interval(
    proportion: f64,
    variance: f64,
    confidence_level: f64,
) -> Result<ConfidenceInterval, EstimateError> {
    IntervalBuilder::new(confidence_level)?.build(proportion, variance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::prelude::*;
    use rand::rngs::StdRng;

    #[test]
    fn aljunied_intervals() {
        let v = 3.444_382_536e-5;
        let pap = confidence_interval(0.41, v, 0.95).unwrap();
        let wp = confidence_interval(0.59, v, 0.95).unwrap();
        assert!((pap.lower - 0.398_497).abs() < 1e-5);
        assert!((pap.upper - 0.421_503).abs() < 1e-5);
        assert!((wp.lower - 0.578_497).abs() < 1e-5);
        assert!((wp.upper - 0.601_503).abs() < 1e-5);
        assert!(!pap.overlaps(&wp));
    }

    #[test]
    fn zero_variance_collapses_to_point() {
        let ci = confidence_interval(1.0, 0.0, 0.95).unwrap();
        assert_eq!(ci, ConfidenceInterval::point(1.0));
        assert_eq!(ci.width(), 0.0);
    }

    #[test]
    fn clamps_at_both_ends() {
        let lo = confidence_interval(0.01, 0.01, 0.95).unwrap();
        assert_eq!(lo.lower, 0.0);
        let hi = confidence_interval(0.99, 0.01, 0.95).unwrap();
        assert_eq!(hi.upper, 1.0);
    }

    #[test]
    fn bounds_bracket_estimate_for_random_inputs() {
        let mut rng = StdRng::seed_from_u64(7);
        let builder = IntervalBuilder::new(0.95).unwrap();
        for _ in 0..10_000 {
            let p: f64 = rng.gen_range(0.0..=1.0);
            let v: f64 = rng.gen_range(0.0..0.5);
            let ci = builder.build(p, v).unwrap();
            assert!(0.0 <= ci.lower && ci.lower <= p && p <= ci.upper && ci.upper <= 1.0);
        }
    }

    #[test]
    fn wider_at_higher_confidence() {
        let narrow = confidence_interval(0.5, 1e-4, 0.90).unwrap();
        let wide = confidence_interval(0.5, 1e-4, 0.99).unwrap();
        assert!(wide.width() > narrow.width());
    }

    #[test]
    fn rejects_bad_inputs() {
        assert!(matches!(
            confidence_interval(0.5, 1e-4, 1.0),
            Err(EstimateError::InvalidConfidenceLevel(_))
        ));
        assert!(matches!(
            confidence_interval(0.5, -1e-4, 0.95),
            Err(EstimateError::InvalidInput(_))
        ));
    }
}
