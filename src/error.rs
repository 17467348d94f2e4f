//! Error types for the sarima-forecast library.

use thiserror::Error;

/// Result type alias for SARIMA operations.
pub type Result<T> = std::result::Result<T, SarimaError>;

/// Errors that can occur while identifying, fitting or forecasting a model.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SarimaError {
    /// Input data is empty.
    #[error("empty input data")]
    EmptyData,

    /// Insufficient data points for the requested lag structure.
    #[error("insufficient data: need at least {needed}, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// A non-finite observation was supplied.
    #[error("non-finite value at index {index}")]
    NonFiniteValue { index: usize },

    /// Dated observations are not consecutive months.
    #[error("observations must be consecutive months: gap or disorder at index {index}")]
    DateGap { index: usize },

    /// Negative or inconsistent model orders.
    #[error("invalid order: {0}")]
    InvalidOrder(String),

    /// Forecast horizon must be positive.
    #[error("invalid horizon {0}: must be at least 1")]
    InvalidHorizon(usize),

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Dimension mismatch between paired inputs.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// Every candidate failed the selection criteria.
    #[error("no candidate model passed the selection criteria")]
    NoQualifyingModel,

    /// Maximum likelihood estimation failed.
    #[error("estimation failed: {0}")]
    Estimation(#[from] EstimationError),
}

/// Numerical failures of the maximum likelihood estimator.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EstimationError {
    /// The optimizer exhausted its iteration budget on every start.
    #[error("optimizer did not converge after {iterations} iterations and {restarts} restarts")]
    NotConverged { iterations: usize, restarts: usize },

    /// The observed information matrix is singular or indefinite.
    #[error("information matrix is singular; standard errors are unavailable")]
    SingularInformation,

    /// The likelihood could not be evaluated at the starting values.
    #[error("log-likelihood is not finite at the starting values")]
    NonFiniteLikelihood,

    /// Fitted coefficients left the stationary or invertible region.
    #[error("fitted {polynomial} polynomial has roots on or inside the unit circle")]
    Inadmissible { polynomial: String },
}
