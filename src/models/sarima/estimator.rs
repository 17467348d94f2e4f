//! Exact maximum likelihood estimation of SARIMA models.

use crate::core::TimeSeries;
use crate::error::{EstimationError, Result, SarimaError};
use crate::models::sarima::fitted::{coefficient_names, Coefficient, OptimizerSummary};
use crate::models::sarima::polynomial::{
    constrain_invertible, constrain_stationary, unconstrain_invertible, unconstrain_stationary,
};
use crate::models::sarima::state_space::{ArmaStateSpace, KalmanOutput};
use crate::models::sarima::{DifferencedSeries, FitWarning, FittedModel, SarimaCoefficients, SarimaSpec};
use crate::utils::optimization::{nelder_mead, numerical_hessian, NelderMeadConfig, NelderMeadResult};
use crate::utils::stats::mean;
use crate::validation::check_stationarity_invertibility;
use nalgebra::DMatrix;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Configuration for [`SarimaEstimator`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimatorConfig {
    /// Nelder–Mead iteration cap per start.
    pub max_iter: usize,
    /// Convergence tolerance on the mean negative log-likelihood.
    pub tolerance: f64,
    /// Extra starts tried when the first one does not converge.
    pub max_restarts: usize,
    /// Start from a conditional sum of squares fit instead of zeros.
    pub css_start: bool,
    /// Estimate a mean when the model has no differencing.
    pub include_mean: bool,
    /// Fail with [`EstimationError::Inadmissible`] instead of warning.
    pub reject_inadmissible: bool,
    /// Relative step of the numerical Hessian.
    pub hessian_step: f64,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            max_iter: 2000,
            tolerance: 1e-9,
            max_restarts: 2,
            css_start: true,
            include_mean: true,
            reject_inadmissible: false,
            hessian_step: 1e-4,
        }
    }
}

impl EstimatorConfig {
    /// Set the iteration cap per start.
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Set the convergence tolerance.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Set the number of restarts.
    pub fn with_max_restarts(mut self, max_restarts: usize) -> Self {
        self.max_restarts = max_restarts;
        self
    }

    /// Enable or disable the conditional sum of squares start.
    pub fn with_css_start(mut self, css_start: bool) -> Self {
        self.css_start = css_start;
        self
    }

    /// Enable or disable mean estimation for undifferenced models.
    pub fn with_mean(mut self, include_mean: bool) -> Self {
        self.include_mean = include_mean;
        self
    }

    /// Turn inadmissible coefficients into an error.
    pub fn strict(mut self) -> Self {
        self.reject_inadmissible = true;
        self
    }
}

/// Fits [`SarimaSpec`]s to a [`TimeSeries`] by exact Gaussian maximum
/// likelihood.
///
/// The likelihood of the differenced series is evaluated by a Kalman filter
/// started from the stationary state covariance. Coefficients are optimized
/// in an unconstrained space that maps onto stationary AR and invertible MA
/// polynomials, so the search never leaves the admissible region.
#[derive(Debug, Clone, Default)]
pub struct SarimaEstimator {
    config: EstimatorConfig,
}

impl SarimaEstimator {
    /// Create an estimator with the given configuration.
    pub fn new(config: EstimatorConfig) -> Self {
        Self { config }
    }

    /// Estimator configuration.
    pub fn config(&self) -> &EstimatorConfig {
        &self.config
    }

    /// Fit one model.
    ///
    /// # Errors
    /// - `InvalidOrder` when the seasonal period of `spec` differs from the
    ///   series period.
    /// - `InsufficientData` when the series is too short for the lag
    ///   structure.
    /// - `Estimation(..)` when the optimizer fails or the information matrix
    ///   cannot be inverted.
    pub fn fit(&self, series: &TimeSeries, spec: &SarimaSpec) -> Result<FittedModel> {
        spec.validate()?;
        if spec.has_seasonal_terms() && spec.s != series.period() {
            return Err(SarimaError::InvalidOrder(format!(
                "{spec} has seasonal period {} but the series has period {}",
                spec.s,
                series.period()
            )));
        }
        let needed = spec.min_observations();
        if series.len() < needed {
            return Err(SarimaError::InsufficientData {
                needed,
                got: series.len(),
            });
        }

        let differenced = DifferencedSeries::new(series.values(), spec.d, spec.cap_d, spec.s)?;
        let problem = Likelihood {
            spec: *spec,
            w: differenced.values(),
            with_mean: self.config.include_mean && spec.d + spec.cap_d == 0,
        };

        let initial = self.starting_point(&problem)?;
        let (result, summary) = self.optimize(
            spec,
            |x: &[f64]| problem.objective(x),
            initial,
            problem.zero_start(),
        )?;
        debug!(
            spec = %spec,
            iterations = summary.iterations,
            restarts = summary.restarts,
            objective = result.optimal_value,
            "likelihood optimized"
        );

        let (coefficients, mean_estimate) = problem.natural(&result.optimal_point);
        let output = problem
            .filter(&coefficients, mean_estimate)
            .ok_or(EstimationError::NonFiniteLikelihood)?;
        let std_errors = self.standard_errors(&problem, &coefficients, mean_estimate)?;

        let mut names = coefficient_names(spec);
        let mut estimates = coefficients.to_flat();
        if let Some(mu) = mean_estimate {
            names.push("mean".to_string());
            estimates.push(mu);
        }
        let table = names
            .into_iter()
            .zip(estimates)
            .zip(std_errors)
            .map(|((name, estimate), std_error)| Coefficient {
                name,
                estimate,
                std_error,
            })
            .collect();

        let warnings = self.admissibility_warnings(spec, &coefficients, &summary)?;

        let sigma2 = output.sigma2();
        let standardized_residuals = output
            .innovations
            .iter()
            .zip(&output.variances)
            .map(|(v, f)| v / (sigma2 * f).sqrt())
            .collect();

        Ok(FittedModel {
            spec: *spec,
            coefficients,
            mean: mean_estimate,
            table,
            sigma2,
            log_likelihood: output.log_likelihood(),
            residuals: output.innovations,
            standardized_residuals,
            training: series.clone(),
            optimizer: summary,
            warnings,
        })
    }

    /// Fit several candidate models in parallel.
    ///
    /// Results come back in the order of `specs`; one failing fit does not
    /// affect the others.
    pub fn fit_all(&self, series: &TimeSeries, specs: &[SarimaSpec]) -> Vec<Result<FittedModel>> {
        specs
            .par_iter()
            .map(|spec| self.fit(series, spec))
            .collect()
    }

    fn nelder_mead_config(&self) -> NelderMeadConfig {
        NelderMeadConfig::default()
            .with_max_iter(self.config.max_iter)
            .with_tolerance(self.config.tolerance)
    }

    fn starting_point(&self, problem: &Likelihood<'_>) -> Result<Vec<f64>> {
        let zeros = problem.zero_start();
        let start = if self.config.css_start {
            let css = nelder_mead(
                |x| problem.conditional_sum_of_squares(x),
                &zeros,
                &NelderMeadConfig::default().with_max_iter(500).with_tolerance(1e-8),
            );
            // Re-enter the unconstrained space with clipped partial
            // autocorrelations so the start is strictly admissible.
            let (coefficients, mu) = problem.natural(&css.optimal_point);
            problem.unconstrained(&coefficients, mu)
        } else {
            zeros.clone()
        };

        if problem.objective(&start).is_finite() {
            Ok(start)
        } else if problem.objective(&zeros).is_finite() {
            Ok(zeros)
        } else {
            Err(EstimationError::NonFiniteLikelihood.into())
        }
    }

    /// Minimise `objective` from `initial`, restarting from `zero_start`
    /// and then from the best point so far.
    fn optimize<F>(
        &self,
        spec: &SarimaSpec,
        objective: F,
        initial: Vec<f64>,
        zero_start: Vec<f64>,
    ) -> Result<(NelderMeadResult, OptimizerSummary)>
    where
        F: Fn(&[f64]) -> f64,
    {
        let config = self.nelder_mead_config();

        let mut best = nelder_mead(&objective, &initial, &config);
        let mut iterations = best.iterations;
        let mut restarts = 0;

        while !best.converged && restarts < self.config.max_restarts {
            restarts += 1;
            let start = if restarts == 1 {
                zero_start.clone()
            } else {
                best.optimal_point.clone()
            };
            warn!(
                spec = %spec,
                restart = restarts,
                iterations = best.iterations,
                "optimizer did not converge, restarting"
            );
            let attempt = nelder_mead(&objective, &start, &config);
            iterations += attempt.iterations;
            if attempt.converged || attempt.optimal_value < best.optimal_value {
                best = attempt;
            }
        }

        if !best.converged {
            return Err(EstimationError::NotConverged {
                iterations,
                restarts,
            }
            .into());
        }
        Ok((
            best,
            OptimizerSummary {
                iterations,
                restarts,
                converged: true,
            },
        ))
    }

    /// Square roots of the diagonal of the inverse observed information.
    fn standard_errors(
        &self,
        problem: &Likelihood<'_>,
        coefficients: &SarimaCoefficients,
        mean_estimate: Option<f64>,
    ) -> Result<Vec<f64>> {
        let mut theta = coefficients.to_flat();
        theta.extend(mean_estimate);
        if theta.is_empty() {
            return Ok(vec![]);
        }

        let negative_log_likelihood = |x: &[f64]| {
            let k = x.len() - usize::from(problem.with_mean);
            let coefficients = SarimaCoefficients::from_flat(&problem.spec, &x[..k]);
            let mu = problem.with_mean.then(|| x[k]);
            problem
                .filter(&coefficients, mu)
                .map(|out| -out.log_likelihood())
                .unwrap_or(f64::NAN)
        };
        let hessian = numerical_hessian(negative_log_likelihood, &theta, self.config.hessian_step)
            .ok_or(EstimationError::SingularInformation)?;

        let k = theta.len();
        let information = DMatrix::from_fn(k, k, |i, j| hessian[i][j]);
        let covariance = information
            .cholesky()
            .ok_or(EstimationError::SingularInformation)?
            .inverse();
        (0..k)
            .map(|i| {
                let variance = covariance[(i, i)];
                if variance.is_finite() && variance > 0.0 {
                    Ok(variance.sqrt())
                } else {
                    Err(EstimationError::SingularInformation.into())
                }
            })
            .collect()
    }

    fn admissibility_warnings(
        &self,
        spec: &SarimaSpec,
        coefficients: &SarimaCoefficients,
        summary: &OptimizerSummary,
    ) -> Result<Vec<FitWarning>> {
        let mut warnings = Vec::new();
        if summary.restarts > 0 {
            warnings.push(FitWarning::Restarted {
                restarts: summary.restarts,
            });
        }
        for (polynomial, admissible) in check_stationarity_invertibility(spec, coefficients) {
            if admissible {
                continue;
            }
            if self.config.reject_inadmissible {
                return Err(EstimationError::Inadmissible {
                    polynomial: polynomial.to_string(),
                }
                .into());
            }
            let warning = if polynomial.is_autoregressive() {
                FitWarning::NonStationary { polynomial }
            } else {
                FitWarning::NonInvertible { polynomial }
            };
            warn!(spec = %spec, "{warning}");
            warnings.push(warning);
        }
        Ok(warnings)
    }
}

/// The likelihood surface of one spec on one differenced series.
struct Likelihood<'a> {
    spec: SarimaSpec,
    w: &'a [f64],
    with_mean: bool,
}

impl Likelihood<'_> {
    fn num_coefficients(&self) -> usize {
        self.spec.num_coefficients()
    }

    fn zero_start(&self) -> Vec<f64> {
        let mut start = vec![0.0; self.num_coefficients()];
        if self.with_mean {
            start.push(mean(self.w));
        }
        start
    }

    /// Map an unconstrained vector to admissible coefficients and the mean.
    fn natural(&self, x: &[f64]) -> (SarimaCoefficients, Option<f64>) {
        let spec = &self.spec;
        let (ar, rest) = x.split_at(spec.p);
        let (ma, rest) = rest.split_at(spec.q);
        let (sar, rest) = rest.split_at(spec.cap_p);
        let (sma, rest) = rest.split_at(spec.cap_q);
        let coefficients = SarimaCoefficients {
            ar: constrain_stationary(ar),
            ma: constrain_invertible(ma),
            seasonal_ar: constrain_stationary(sar),
            seasonal_ma: constrain_invertible(sma),
        };
        let mu = if self.with_mean { rest.first().copied() } else { None };
        (coefficients, mu)
    }

    fn unconstrained(&self, coefficients: &SarimaCoefficients, mu: Option<f64>) -> Vec<f64> {
        let mut x = unconstrain_stationary(&coefficients.ar);
        x.extend(unconstrain_invertible(&coefficients.ma));
        x.extend(unconstrain_stationary(&coefficients.seasonal_ar));
        x.extend(unconstrain_invertible(&coefficients.seasonal_ma));
        x.extend(mu);
        x
    }

    fn filter(&self, coefficients: &SarimaCoefficients, mu: Option<f64>) -> Option<KalmanOutput> {
        let s = self.spec.s;
        let state_space =
            ArmaStateSpace::new(&coefficients.expanded_ar(s), &coefficients.expanded_ma(s));
        match mu {
            Some(mu) => {
                let centred: Vec<f64> = self.w.iter().map(|v| v - mu).collect();
                state_space.filter(&centred)
            }
            None => state_space.filter(self.w),
        }
    }

    /// Mean negative log-likelihood at an unconstrained point.
    fn objective(&self, x: &[f64]) -> f64 {
        let (coefficients, mu) = self.natural(x);
        match self.filter(&coefficients, mu) {
            Some(out) => -out.log_likelihood() / self.w.len() as f64,
            None => f64::INFINITY,
        }
    }

    /// Mean squared one-step error with pre-sample values set to zero.
    fn conditional_sum_of_squares(&self, x: &[f64]) -> f64 {
        let (coefficients, mu) = self.natural(x);
        let s = self.spec.s;
        let ar = coefficients.expanded_ar(s);
        let ma = coefficients.expanded_ma(s);
        let mu = mu.unwrap_or(0.0);
        let n = self.w.len();
        let start = ar.len();
        if n <= start {
            return f64::MAX;
        }

        let mut residuals = vec![0.0; n];
        let mut css = 0.0;
        for t in start..n {
            let mut pred = mu;
            for (i, c) in ar.iter().enumerate() {
                pred += c * (self.w[t - 1 - i] - mu);
            }
            for (i, m) in ma.iter().enumerate() {
                if t > i {
                    pred += m * residuals[t - 1 - i];
                }
            }
            let error = self.w[t] - pred;
            residuals[t] = error;
            css += error * error;
        }
        css / (n - start) as f64
    }
}
