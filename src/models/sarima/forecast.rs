//! Multi-step forecasts from a fitted SARIMA model.

use crate::core::{ForecastPoint, ForecastResult, IntervalMethod};
use crate::error::{Result, SarimaError};
use crate::models::sarima::FittedModel;
use tracing::debug;

/// Produces point forecasts and standard errors.
#[derive(Debug, Clone, Copy, Default)]
pub struct Forecaster {
    method: IntervalMethod,
}

impl Forecaster {
    /// Forecaster whose results use `method` for their intervals.
    pub fn new(method: IntervalMethod) -> Self {
        Self { method }
    }

    /// Interval method attached to every result.
    pub fn method(&self) -> IntervalMethod {
        self.method
    }

    /// Forecast `horizon` periods past the end of the training series.
    ///
    /// Point forecasts run the full difference equation
    /// `φ(B)Φ(Bˢ)(1-B)ᵈ(1-Bˢ)ᴰ yₜ = θ(B)Θ(Bˢ) εₜ` forward with future
    /// innovations set to zero and past innovations taken from the model's
    /// residuals. Standard errors are `σ·√(Σ_{j<h} ψⱼ²)` over the ψ-weights
    /// of the same integrated model, so they never shrink with the horizon.
    ///
    /// # Errors
    /// `InvalidHorizon` when `horizon` is zero.
    pub fn forecast(&self, model: &FittedModel, horizon: usize) -> Result<ForecastResult> {
        if horizon == 0 {
            return Err(SarimaError::InvalidHorizon(horizon));
        }

        let spec = model.spec();
        let series = model.training_series();
        let (ar, ma) = full_polynomials(model);
        let mu = model.mean().unwrap_or(0.0);

        let mut y: Vec<f64> = series.values().iter().map(|v| v - mu).collect();
        let n = y.len();
        let loss = spec.differencing_loss();
        let innovation = |i: usize| {
            if i >= loss && i < n {
                model.residuals().get(i - loss).copied().unwrap_or(0.0)
            } else {
                0.0
            }
        };

        for t in n..n + horizon {
            let mut value = 0.0;
            for (k, g) in ar.iter().enumerate() {
                if let Some(past) = t.checked_sub(k + 1) {
                    value += g * y[past];
                }
            }
            for (k, m) in ma.iter().enumerate() {
                if let Some(past) = t.checked_sub(k + 1) {
                    value += m * innovation(past);
                }
            }
            y.push(value);
        }

        let psi = psi_weights(&ar, &ma, horizon);
        let sigma = model.sigma2().sqrt();
        let mut cumulative = 0.0;
        let points = (1..=horizon)
            .map(|step| {
                cumulative += psi[step - 1] * psi[step - 1];
                ForecastPoint {
                    step,
                    date: series.date_at(n + step - 1),
                    mean: y[n + step - 1] + mu,
                    std_error: sigma * cumulative.sqrt(),
                }
            })
            .collect();

        debug!(spec = %spec, horizon, "forecast computed");
        Ok(ForecastResult::new(*spec, points, self.method))
    }
}

fn full_polynomials(model: &FittedModel) -> (Vec<f64>, Vec<f64>) {
    let spec = model.spec();
    let coefficients = model.coefficients();
    (
        coefficients.integrated_ar(spec),
        coefficients.expanded_ma(spec.s),
    )
}

/// First `count` ψ-weights of the MA(∞) form, `ψ₀ = 1`.
///
/// `ψⱼ = mⱼ + Σ_{k=1}^{j} gₖ ψⱼ₋ₖ` for AR weights `g` and MA weights `m`.
pub fn psi_weights(ar: &[f64], ma: &[f64], count: usize) -> Vec<f64> {
    let mut psi = Vec::with_capacity(count);
    for j in 0..count {
        if j == 0 {
            psi.push(1.0);
            continue;
        }
        let mut value = ma.get(j - 1).copied().unwrap_or(0.0);
        for k in 1..=j.min(ar.len()) {
            value += ar[k - 1] * psi[j - k];
        }
        psi.push(value);
    }
    psi
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::TimeSeries;
    use crate::models::sarima::{SarimaEstimator, SarimaSpec};
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn series(values: Vec<f64>, period: usize) -> TimeSeries {
        TimeSeries::monthly(NaiveDate::from_ymd_opt(2010, 1, 1).unwrap(), values, period).unwrap()
    }

    #[test]
    fn psi_weights_of_random_walk_are_ones() {
        assert_eq!(psi_weights(&[1.0], &[], 4), vec![1.0; 4]);
    }

    #[test]
    fn psi_weights_of_ar1_decay() {
        let psi = psi_weights(&[0.5], &[], 4);
        assert_eq!(psi, vec![1.0, 0.5, 0.25, 0.125]);
    }

    #[test]
    fn psi_weights_of_ma1_stop() {
        let psi = psi_weights(&[], &[0.4], 4);
        assert_eq!(psi, vec![1.0, 0.4, 0.0, 0.0]);
    }

    #[test]
    fn zero_horizon_is_rejected() {
        let ts = series((0..40).map(|i| (i as f64 * 0.3).sin()).collect(), 12);
        let model = SarimaEstimator::default()
            .fit(&ts, &SarimaSpec::arima(1, 0, 0).unwrap())
            .unwrap();
        assert_eq!(
            Forecaster::default().forecast(&model, 0).unwrap_err(),
            SarimaError::InvalidHorizon(0)
        );
    }

    #[test]
    fn random_walk_forecast_is_flat_with_growing_error() {
        let values: Vec<f64> = (0..60).map(|i| 10.0 + (i as f64 * 0.9).sin()).collect();
        let last = values[59];
        let ts = series(values, 12);
        let model = SarimaEstimator::default()
            .fit(&ts, &SarimaSpec::arima(0, 1, 0).unwrap())
            .unwrap();
        let result = Forecaster::default().forecast(&model, 5).unwrap();

        assert_eq!(result.horizon(), 5);
        for point in result.points() {
            assert_relative_eq!(point.mean, last, epsilon = 1e-12);
            assert_relative_eq!(
                point.std_error,
                (model.sigma2() * point.step as f64).sqrt(),
                epsilon = 1e-12
            );
        }
        assert_eq!(result.points()[0].date, NaiveDate::from_ymd_opt(2015, 1, 1).unwrap());
    }

    #[test]
    fn seasonal_random_walk_repeats_last_year() {
        let values: Vec<f64> = (0..48)
            .map(|i| 100.0 + ((i % 12) as f64) * 2.0 + 0.01 * (i as f64).cos())
            .collect();
        let ts = series(values.clone(), 12);
        let spec = SarimaSpec::new(0, 0, 0, 0, 1, 0, 12).unwrap();
        let model = SarimaEstimator::default().fit(&ts, &spec).unwrap();
        let result = Forecaster::default().forecast(&model, 24).unwrap();
        for (h, point) in result.points().iter().enumerate() {
            assert_relative_eq!(point.mean, values[36 + h % 12], epsilon = 1e-12);
        }
        // Uncertainty steps up once per season.
        let se = result.std_errors();
        assert_relative_eq!(se[0], se[11], epsilon = 1e-12);
        assert!(se[12] > se[11]);
    }

    #[test]
    fn ar1_forecast_reverts_to_mean() {
        let values: Vec<f64> = (0..200)
            .map(|i| 50.0 + 3.0 * (i as f64 * 0.7).sin() + 2.0 * (i as f64 * 1.9).cos())
            .collect();
        let ts = series(values, 12);
        let model = SarimaEstimator::default()
            .fit(&ts, &SarimaSpec::arima(1, 0, 0).unwrap())
            .unwrap();
        let result = Forecaster::default().forecast(&model, 200).unwrap();
        let mu = model.mean().unwrap();
        assert_relative_eq!(result.means()[199], mu, epsilon = 1e-6);
        let se = result.std_errors();
        assert!(se.windows(2).all(|w| w[1] >= w[0]));
    }
}
