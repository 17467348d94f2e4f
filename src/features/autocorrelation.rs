//! Sample autocorrelation and partial autocorrelation with significance
//! bounds.

use crate::error::{Result, SarimaError};
use crate::utils::stats::autocovariances;
use serde::Serialize;

/// Two-sided 95% normal critical value used for the significance bound.
const CRITICAL_VALUE: f64 = 1.96;

/// One lag of a correlogram.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CorrelogramEntry {
    /// Lag, starting at 0.
    pub lag: usize,
    /// Sample (partial) autocorrelation.
    pub value: f64,
    /// Half-width of the approximate 95% band, `1.96/√n`.
    pub bound: f64,
}

impl CorrelogramEntry {
    /// `|value| > bound`. Lag 0 is never significant.
    pub fn is_significant(&self) -> bool {
        self.lag > 0 && self.value.abs() > self.bound
    }
}

fn check_length(series: &[f64], max_lag: usize) -> Result<()> {
    if series.is_empty() {
        return Err(SarimaError::EmptyData);
    }
    if series.len() <= max_lag {
        return Err(SarimaError::InsufficientData {
            needed: max_lag + 1,
            got: series.len(),
        });
    }
    Ok(())
}

fn autocorrelations(series: &[f64], max_lag: usize) -> Vec<f64> {
    let gamma = autocovariances(series, max_lag);
    if gamma[0] < 1e-12 {
        // Constant series: no serial correlation to speak of.
        let mut acf = vec![0.0; max_lag + 1];
        acf[0] = 1.0;
        return acf;
    }
    gamma.iter().map(|g| g / gamma[0]).collect()
}

/// Sample ACF for lags `0..=max_lag`.
///
/// `ACF(k) = γ(k)/γ(0)` with the 1/n autocovariance estimator, which keeps
/// every value inside [-1, 1].
///
/// # Errors
/// `EmptyData` for an empty series, `InsufficientData` when the series has
/// `max_lag` or fewer observations.
pub fn compute_acf(series: &[f64], max_lag: usize) -> Result<Vec<CorrelogramEntry>> {
    check_length(series, max_lag)?;
    let bound = CRITICAL_VALUE / (series.len() as f64).sqrt();
    Ok(autocorrelations(series, max_lag)
        .into_iter()
        .enumerate()
        .map(|(lag, value)| CorrelogramEntry { lag, value, bound })
        .collect())
}

/// Sample PACF for lags `0..=max_lag`, by the Durbin–Levinson recursion on
/// the sample ACF. Lag 0 is 1 by convention.
///
/// # Errors
/// As [`compute_acf`].
pub fn compute_pacf(series: &[f64], max_lag: usize) -> Result<Vec<CorrelogramEntry>> {
    check_length(series, max_lag)?;
    let bound = CRITICAL_VALUE / (series.len() as f64).sqrt();
    let recursion = durbin_levinson(&autocorrelations(series, max_lag));
    Ok(std::iter::once(1.0)
        .chain(recursion.pacf)
        .enumerate()
        .map(|(lag, value)| CorrelogramEntry { lag, value, bound })
        .collect())
}

/// Output of the Durbin–Levinson recursion.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct DurbinLevinson {
    /// Partial autocorrelations at lags `1..=m`.
    pub pacf: Vec<f64>,
    /// One-step prediction error variance of the best AR(k) predictor for
    /// `k = 0..=m`, relative to the variance of the series.
    pub prediction_variance: Vec<f64>,
}

/// Yule–Walker AR fits of every order up to `acf.len() - 1`.
///
/// Once the prediction variance collapses to zero the remaining partial
/// autocorrelations are reported as zero.
pub(crate) fn durbin_levinson(acf: &[f64]) -> DurbinLevinson {
    let max_order = acf.len().saturating_sub(1);
    let mut pacf = Vec::with_capacity(max_order);
    let mut prediction_variance = Vec::with_capacity(max_order + 1);
    let mut phi: Vec<f64> = Vec::with_capacity(max_order);
    let mut v = 1.0;
    prediction_variance.push(v);

    for k in 1..=max_order {
        if v < 1e-12 {
            pacf.push(0.0);
            prediction_variance.push(v);
            continue;
        }
        let num = acf[k] - (1..k).map(|j| phi[j - 1] * acf[k - j]).sum::<f64>();
        let kappa = (num / v).clamp(-1.0, 1.0);
        let previous = phi.clone();
        for j in 1..k {
            phi[j - 1] = previous[j - 1] - kappa * previous[k - j - 1];
        }
        phi.push(kappa);
        v *= 1.0 - kappa * kappa;
        pacf.push(kappa);
        prediction_variance.push(v);
    }

    DurbinLevinson {
        pacf,
        prediction_variance,
    }
}
