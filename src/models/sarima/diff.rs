//! Differencing, integration and the variance-per-stage table.

use crate::core::TimeSeries;
use crate::error::{Result, SarimaError};
use crate::utils::stats::variance;
use serde::Serialize;

/// Lag-`lag` difference `x[t] - x[t-lag]`; the result is `lag` shorter.
///
/// Returns an empty vector when the series has `lag` or fewer observations.
pub fn difference(series: &[f64], lag: usize) -> Vec<f64> {
    if lag == 0 {
        return series.to_vec();
    }
    series
        .iter()
        .skip(lag)
        .zip(series.iter())
        .map(|(curr, prev)| curr - prev)
        .collect()
}

/// Invert one lag-`lag` difference given the first `lag` values of the
/// undifferenced series.
pub fn integrate(differenced: &[f64], seeds: &[f64], lag: usize) -> Vec<f64> {
    let mut out = seeds.to_vec();
    out.reserve(differenced.len());
    for (t, d) in differenced.iter().enumerate() {
        let prev = out[t + seeds.len() - lag];
        out.push(prev + d);
    }
    out
}

/// One differencing step.
#[derive(Debug, Clone, PartialEq, Serialize)]
struct Stage {
    lag: usize,
    seeds: Vec<f64>,
}

/// A series after `d` lag-1 and `D` lag-`s` differences.
///
/// Keeps the seed values consumed by each step so that
/// [`DifferencedSeries::integrate`] recovers the parent exactly.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DifferencedSeries {
    values: Vec<f64>,
    d: usize,
    cap_d: usize,
    period: usize,
    stages: Vec<Stage>,
}

impl DifferencedSeries {
    /// Apply `d` lag-1 differences then `cap_d` seasonal differences.
    ///
    /// # Errors
    /// `InsufficientData` when fewer than `d + cap_d·period + 1` values remain.
    pub fn new(series: &[f64], d: usize, cap_d: usize, period: usize) -> Result<Self> {
        let needed = d + cap_d * period + 1;
        if series.len() < needed {
            return Err(SarimaError::InsufficientData {
                needed,
                got: series.len(),
            });
        }
        if cap_d > 0 && period == 0 {
            return Err(SarimaError::InvalidOrder(
                "seasonal differencing needs a positive period".to_string(),
            ));
        }

        let lags = std::iter::repeat(1)
            .take(d)
            .chain(std::iter::repeat(period).take(cap_d));
        let mut values = series.to_vec();
        let mut stages = Vec::with_capacity(d + cap_d);
        for lag in lags {
            stages.push(Stage {
                lag,
                seeds: values[..lag].to_vec(),
            });
            values = difference(&values, lag);
        }

        Ok(Self {
            values,
            d,
            cap_d,
            period,
            stages,
        })
    }

    /// Difference a [`TimeSeries`] at its own seasonal period.
    pub fn from_series(series: &TimeSeries, d: usize, cap_d: usize) -> Result<Self> {
        Self::new(series.values(), d, cap_d, series.period())
    }

    /// Differenced values.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Number of differenced values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when nothing is left after differencing.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Non-seasonal and seasonal orders `(d, D)`.
    pub fn orders(&self) -> (usize, usize) {
        (self.d, self.cap_d)
    }

    /// Seasonal lag used for the seasonal differences.
    pub fn period(&self) -> usize {
        self.period
    }

    /// Undo every stage and return the parent series.
    pub fn integrate(&self) -> Vec<f64> {
        self.stages
            .iter()
            .rev()
            .fold(self.values.clone(), |acc, stage| {
                integrate(&acc, &stage.seeds, stage.lag)
            })
    }
}

/// Sample variance after one differencing stage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VarianceStage {
    /// Human-readable stage, e.g. `"d=1, D=1"`.
    pub label: String,
    /// Lag-1 differences applied so far.
    pub d: usize,
    /// Seasonal differences applied so far.
    pub cap_d: usize,
    /// Length of the series at this stage.
    pub len: usize,
    /// Sample variance at this stage.
    pub variance: f64,
}

/// Variance of the series before and after each differencing stage.
///
/// A substantial, monotonic reduction across stages is the usual informal
/// signal that differencing has removed trend and seasonality. It is a
/// heuristic and not a unit-root test: a series can lose variance under
/// differencing and still be non-stationary, and over-differencing can also
/// lower variance at first.
pub fn variance_stages(
    series: &[f64],
    d: usize,
    cap_d: usize,
    period: usize,
) -> Result<Vec<VarianceStage>> {
    let needed = d + cap_d * period + 2;
    if series.len() < needed {
        return Err(SarimaError::InsufficientData {
            needed,
            got: series.len(),
        });
    }

    let mut stages = vec![VarianceStage {
        label: "d=0, D=0".to_string(),
        d: 0,
        cap_d: 0,
        len: series.len(),
        variance: variance(series),
    }];
    let mut current = series.to_vec();
    let steps = (1..=d).map(|i| (i, 0, 1)).chain((1..=cap_d).map(|j| (d, j, period)));
    for (di, dj, lag) in steps {
        current = difference(&current, lag);
        stages.push(VarianceStage {
            label: format!("d={di}, D={dj}"),
            d: di,
            cap_d: dj,
            len: current.len(),
            variance: variance(&current),
        });
    }
    Ok(stages)
}

/// Continue a forecast of the differenced series back onto the original scale.
///
/// `history` is the undifferenced series the forecast extends; the forecast
/// values are appended one stage at a time in reverse order of differencing.
pub fn integrate_forecast(
    forecast: &[f64],
    history: &[f64],
    d: usize,
    cap_d: usize,
    period: usize,
) -> Vec<f64> {
    // Intermediate series: history differenced by the first k stages.
    let lags: Vec<usize> = std::iter::repeat(1)
        .take(d)
        .chain(std::iter::repeat(period).take(cap_d))
        .collect();
    let mut levels = vec![history.to_vec()];
    for &lag in &lags {
        let next = difference(&levels[levels.len() - 1], lag);
        levels.push(next);
    }

    let mut current = forecast.to_vec();
    for (stage, &lag) in lags.iter().enumerate().rev() {
        let base = &levels[stage];
        let mut extended = base.clone();
        for value in &current {
            let prev = extended[extended.len() - lag];
            extended.push(prev + value);
        }
        current = extended[base.len()..].to_vec();
    }
    current
}
