//! Forecast result: point forecasts with standard errors.

use crate::models::sarima::SarimaSpec;
use crate::utils::stats::quantile_normal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// How prediction intervals are derived from standard errors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub enum IntervalMethod {
    /// `point ± 2·SE`: the normal approximation to a 95% interval.
    #[default]
    TwoSigma,
    /// `point ± z·SE` with `z` the exact normal quantile for the given
    /// two-sided coverage level (e.g. 0.95 gives z = 1.959964).
    NormalQuantile(f64),
}

impl IntervalMethod {
    /// Half-width multiplier applied to the standard error.
    pub fn multiplier(&self) -> f64 {
        match self {
            IntervalMethod::TwoSigma => 2.0,
            IntervalMethod::NormalQuantile(level) => quantile_normal((1.0 + level) / 2.0),
        }
    }
}

/// One future period.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ForecastPoint {
    /// Steps ahead of the last observation (1-based).
    pub step: usize,
    /// Calendar month of the forecast.
    pub date: NaiveDate,
    /// Minimum mean-square-error point forecast.
    pub mean: f64,
    /// Forecast standard error.
    pub std_error: f64,
}

/// Forecasts for `h` future periods from exactly one fitted model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastResult {
    spec: SarimaSpec,
    points: Vec<ForecastPoint>,
    method: IntervalMethod,
}

impl ForecastResult {
    pub(crate) fn new(spec: SarimaSpec, points: Vec<ForecastPoint>, method: IntervalMethod) -> Self {
        Self {
            spec,
            points,
            method,
        }
    }

    /// Specification of the model that produced the forecast.
    pub fn spec(&self) -> SarimaSpec {
        self.spec
    }

    /// Interval method used by [`lower`](Self::lower) and [`upper`](Self::upper).
    pub fn method(&self) -> IntervalMethod {
        self.method
    }

    /// Same forecasts with a different interval method.
    pub fn with_method(mut self, method: IntervalMethod) -> Self {
        self.method = method;
        self
    }

    /// Forecast horizon.
    pub fn horizon(&self) -> usize {
        self.points.len()
    }

    /// All forecast points in step order.
    pub fn points(&self) -> &[ForecastPoint] {
        &self.points
    }

    /// Point forecasts.
    pub fn means(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.mean).collect()
    }

    /// Forecast standard errors.
    pub fn std_errors(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.std_error).collect()
    }

    /// Lower interval bounds.
    pub fn lower(&self) -> Vec<f64> {
        let m = self.method.multiplier();
        self.points.iter().map(|p| p.mean - m * p.std_error).collect()
    }

    /// Upper interval bounds.
    pub fn upper(&self) -> Vec<f64> {
        let m = self.method.multiplier();
        self.points.iter().map(|p| p.mean + m * p.std_error).collect()
    }

    /// Number of `actual` values inside the interval, pairing by step.
    pub fn contained(&self, actual: &[f64]) -> usize {
        self.lower()
            .iter()
            .zip(self.upper())
            .zip(actual)
            .filter(|((lo, hi), a)| **a >= **lo && **a <= *hi)
            .count()
    }

    /// Share of `actual` values inside the interval.
    pub fn coverage(&self, actual: &[f64]) -> f64 {
        let n = actual.len().min(self.horizon());
        if n == 0 {
            return f64::NAN;
        }
        self.contained(actual) as f64 / n as f64
    }
}
