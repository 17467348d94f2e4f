//! Seasonal ARIMA models, (p, d, q)×(P, D, Q)\[s\].
//!
//! This module provides:
//! - Differencing, integration and the variance-per-stage table
//! - Order identification from the correlograms
//! - Exact Gaussian maximum likelihood via a Kalman filter
//! - Diagnostic-first model selection
//! - Recursive forecasting with psi-weight standard errors
//! - Simulation of SARIMA paths

mod diff;
mod estimator;
mod fitted;
mod forecast;
mod identify;
mod polynomial;
mod selection;
mod simulate;
mod spec;
mod state_space;

pub use diff::{
    difference, integrate, integrate_forecast, variance_stages, DifferencedSeries, VarianceStage,
};
pub use estimator::{EstimatorConfig, SarimaEstimator};
pub use fitted::{Coefficient, FitWarning, FittedModel, OptimizerSummary};
pub use forecast::{psi_weights, Forecaster};
pub use identify::{Candidate, Identification, IdentifierConfig, OrderIdentifier};
pub use polynomial::SarimaCoefficients;
pub use selection::{compare, select_best, ComparisonRow, ModelComparison, SelectionCriteria};
pub use simulate::simulate;
pub use spec::SarimaSpec;
