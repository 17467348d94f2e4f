//! A fitted SARIMA model.

use crate::core::TimeSeries;
use crate::models::sarima::{SarimaCoefficients, SarimaSpec};
use crate::validation::PolynomialKind;
use serde::Serialize;
use std::fmt;

/// One row of the coefficient table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Coefficient {
    /// `phi_i`, `theta_i`, `Phi_i`, `Theta_i` or `mean`.
    pub name: String,
    /// Maximum likelihood estimate.
    pub estimate: f64,
    /// Standard error from the observed information matrix.
    pub std_error: f64,
}

impl Coefficient {
    /// `estimate / std_error`.
    pub fn z_value(&self) -> f64 {
        self.estimate / self.std_error
    }
}

/// Something worth knowing about a fit that did not stop it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum FitWarning {
    /// An AR polynomial has a root on or inside the unit circle.
    NonStationary { polynomial: PolynomialKind },
    /// An MA polynomial has a root on or inside the unit circle.
    NonInvertible { polynomial: PolynomialKind },
    /// The optimizer needed restarts before it converged.
    Restarted { restarts: usize },
}

impl fmt::Display for FitWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FitWarning::NonStationary { polynomial } => {
                write!(f, "{polynomial} polynomial is not stationary")
            }
            FitWarning::NonInvertible { polynomial } => {
                write!(f, "{polynomial} polynomial is not invertible")
            }
            FitWarning::Restarted { restarts } => {
                write!(f, "optimizer converged after {restarts} restart(s)")
            }
        }
    }
}

/// Optimizer bookkeeping for one fit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OptimizerSummary {
    /// Nelder–Mead iterations summed over all starts.
    pub iterations: usize,
    /// Restarts needed after the first start.
    pub restarts: usize,
    /// Whether the final start met the tolerance.
    pub converged: bool,
}

/// Result of [`SarimaEstimator::fit`](crate::models::sarima::SarimaEstimator::fit).
///
/// Immutable: every field is fixed at estimation time.
#[derive(Debug, Clone, Serialize)]
pub struct FittedModel {
    pub(crate) spec: SarimaSpec,
    pub(crate) coefficients: SarimaCoefficients,
    pub(crate) mean: Option<f64>,
    pub(crate) table: Vec<Coefficient>,
    pub(crate) sigma2: f64,
    pub(crate) log_likelihood: f64,
    pub(crate) residuals: Vec<f64>,
    pub(crate) standardized_residuals: Vec<f64>,
    pub(crate) training: TimeSeries,
    pub(crate) optimizer: OptimizerSummary,
    pub(crate) warnings: Vec<FitWarning>,
}

impl FittedModel {
    /// Model structure.
    pub fn spec(&self) -> &SarimaSpec {
        &self.spec
    }

    /// Estimated lag polynomial coefficients.
    pub fn coefficients(&self) -> &SarimaCoefficients {
        &self.coefficients
    }

    /// Estimated mean of the series, present only for undifferenced models.
    pub fn mean(&self) -> Option<f64> {
        self.mean
    }

    /// Coefficient table in `φ, θ, Φ, Θ, mean` order.
    pub fn coefficient_table(&self) -> &[Coefficient] {
        &self.table
    }

    /// Look up a coefficient by name.
    pub fn coefficient(&self, name: &str) -> Option<&Coefficient> {
        self.table.iter().find(|c| c.name == name)
    }

    /// Maximum likelihood innovation variance σ².
    pub fn sigma2(&self) -> f64 {
        self.sigma2
    }

    /// Maximised log-likelihood.
    pub fn log_likelihood(&self) -> f64 {
        self.log_likelihood
    }

    /// Observations entering the likelihood (after differencing).
    pub fn n_obs(&self) -> usize {
        self.residuals.len()
    }

    /// Estimated parameters counted by the information criteria: the ARMA
    /// coefficients, the mean if estimated, and σ².
    pub fn num_params(&self) -> usize {
        self.table.len() + 1
    }

    /// Akaike information criterion, `2k - 2·logLik`.
    pub fn aic(&self) -> f64 {
        2.0 * self.num_params() as f64 - 2.0 * self.log_likelihood
    }

    /// Bayesian information criterion, `k·ln n - 2·logLik`.
    pub fn bic(&self) -> f64 {
        self.num_params() as f64 * (self.n_obs() as f64).ln() - 2.0 * self.log_likelihood
    }

    /// Hannan–Quinn criterion, `2k·ln ln n - 2·logLik`.
    pub fn hqic(&self) -> f64 {
        2.0 * self.num_params() as f64 * (self.n_obs() as f64).ln().ln()
            - 2.0 * self.log_likelihood
    }

    /// One-step prediction errors of the differenced series.
    pub fn residuals(&self) -> &[f64] {
        &self.residuals
    }

    /// Residuals divided by their prediction standard deviation.
    ///
    /// The first few one-step errors of an exact likelihood have inflated
    /// variance; standardizing puts every residual on a unit scale.
    pub fn standardized_residuals(&self) -> &[f64] {
        &self.standardized_residuals
    }

    /// Series the model was fitted to.
    pub fn training_series(&self) -> &TimeSeries {
        &self.training
    }

    /// Optimizer bookkeeping.
    pub fn optimizer(&self) -> OptimizerSummary {
        self.optimizer
    }

    /// Warnings raised during the fit.
    pub fn warnings(&self) -> &[FitWarning] {
        &self.warnings
    }
}

/// Names in table order: `phi_1.., theta_1.., Phi_1.., Theta_1..`.
pub(crate) fn coefficient_names(spec: &SarimaSpec) -> Vec<String> {
    fn block(prefix: &'static str, order: usize) -> impl Iterator<Item = String> {
        (1..=order).map(move |i| format!("{prefix}_{i}"))
    }
    block("phi", spec.p)
        .chain(block("theta", spec.q))
        .chain(block("Phi", spec.cap_p))
        .chain(block("Theta", spec.cap_q))
        .collect()
}
