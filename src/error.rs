/// Errors raised by the estimation core.
///
/// Per-constituency variants are reported against the offending constituency
/// and the run continues; run-level variants (see [`EstimateError::is_run_level`])
/// abort the whole projection.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum EstimateError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Constituency has no party samples")]
    EmptyConstituency,
    #[error("Sample proportions sum to {sum:.4}, expected 1 (tolerance {tolerance})")]
    ProportionSum { sum: f64, tolerance: f64 },
    #[error("Sample of {sampled} voters ({stations} stations x {sample_size}) covers the whole electorate of {voters}")]
    SampleExceedsPopulation {
        stations: u64,
        voters: u64,
        sample_size: u64,
        sampled: u64,
    },
    #[error("Degenerate strata: {voters} voters across {stations} stations leaves one voter per stratum (division by zero)")]
    DivisionByZero { stations: u64, voters: u64 },
    #[error("Leading parties are tied at {proportion:.4}: {parties}")]
    TiedLead { proportion: f64, parties: String },
    #[error("Invalid confidence level {0}: must lie strictly between 0 and 1")]
    InvalidConfidenceLevel(f64),
    #[error("Invalid turnout rate {0}: must satisfy 0 < rate <= 1")]
    InvalidTurnout(f64),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Seat tally of {tallied} does not match the {declared} declared seats")]
    SeatCountMismatch { tallied: u64, declared: u64 },
}

impl EstimateError {
    /// Configuration-level failures invalidate the entire run.
    pub fn is_run_level(&self) -> bool {
        matches!(
            self,
            EstimateError::InvalidConfidenceLevel(_)
                | EstimateError::InvalidTurnout(_)
                | EstimateError::InvalidConfig(_)
                | EstimateError::SeatCountMismatch { .. }
        )
    }

    /// Whether the error comes from the sampling design rather than the data.
    pub fn is_degenerate(&self) -> bool {
        matches!(
            self,
            EstimateError::SampleExceedsPopulation { .. } | EstimateError::DivisionByZero { .. }
        )
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<EstimateError> for AppError {
    fn from(err: EstimateError) -> Self {
        let exit_code = match err {
            EstimateError::InvalidConfidenceLevel(_)
            | EstimateError::InvalidTurnout(_)
            | EstimateError::InvalidConfig(_)
            | EstimateError::InvalidInput(_) => 2,
            _ => 4,
        };
        AppError::new(exit_code, err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
