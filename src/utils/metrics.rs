//! Accuracy metrics for scoring a forecast against held-out values.

use crate::error::{Result, SarimaError};
use serde::Serialize;

/// Point-forecast accuracy over a test horizon.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccuracyMetrics {
    /// Mean Absolute Error
    pub mae: f64,
    /// Root Mean Squared Error
    pub rmse: f64,
    /// Mean Absolute Percentage Error (None if zeros in actual)
    pub mape: Option<f64>,
    /// Mean error `actual - predicted`; positive when the forecast runs low.
    pub bias: f64,
    /// Mean Absolute Scaled Error against the in-sample seasonal naive
    /// forecast (None without a usable training series)
    pub mase: Option<f64>,
}

/// Calculate accuracy metrics between actual and predicted values.
///
/// # Arguments
/// * `actual` - Held-out observations
/// * `predicted` - Point forecasts for the same periods
/// * `training` - In-sample observations used to scale MASE
/// * `seasonal_period` - Lag of the naive forecast used for MASE
///
/// # Errors
/// `EmptyData` for empty inputs and `DimensionMismatch` when `actual` and
/// `predicted` differ in length.
pub fn calculate_metrics(
    actual: &[f64],
    predicted: &[f64],
    training: &[f64],
    seasonal_period: usize,
) -> Result<AccuracyMetrics> {
    if actual.is_empty() || predicted.is_empty() {
        return Err(SarimaError::EmptyData);
    }
    if actual.len() != predicted.len() {
        return Err(SarimaError::DimensionMismatch {
            expected: actual.len(),
            got: predicted.len(),
        });
    }

    let n = actual.len() as f64;
    let errors: Vec<f64> = actual.iter().zip(predicted).map(|(a, p)| a - p).collect();

    let mae = errors.iter().map(|e| e.abs()).sum::<f64>() / n;
    let rmse = (errors.iter().map(|e| e * e).sum::<f64>() / n).sqrt();
    let bias = errors.iter().sum::<f64>() / n;

    // MAPE (only if no zeros in actual)
    let mape = if actual.contains(&0.0) {
        None
    } else {
        let sum: f64 = errors
            .iter()
            .zip(actual)
            .map(|(e, a)| (e / a).abs())
            .sum();
        Some(100.0 * sum / n)
    };

    Ok(AccuracyMetrics {
        mae,
        rmse,
        mape,
        bias,
        mase: naive_scale(training, seasonal_period).map(|scale| mae / scale),
    })
}

/// In-sample MAE of the lag-`period` naive forecast.
fn naive_scale(training: &[f64], period: usize) -> Option<f64> {
    let period = period.max(1);
    if training.len() <= period {
        return None;
    }
    let scale = training
        .iter()
        .skip(period)
        .zip(training)
        .map(|(curr, prev)| (curr - prev).abs())
        .sum::<f64>()
        / (training.len() - period) as f64;
    (scale > 0.0).then_some(scale)
}
