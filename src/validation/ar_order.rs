//! Autoregressive order left in a residual series.

use crate::features::autocorrelation::durbin_levinson;
use crate::utils::stats::autocovariances;
use serde::Serialize;

/// AR order chosen by AIC among Yule–Walker fits of the residuals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArOrderResult {
    /// Selected order; zero means no autoregressive structure was found.
    pub order: usize,
    /// Largest order considered.
    pub max_order: usize,
    /// AIC of each order `0..=max_order`.
    pub aic: Vec<f64>,
}

impl ArOrderResult {
    /// Whether an order above zero was selected.
    pub fn detected(&self) -> bool {
        self.order > 0
    }
}

/// Default largest order, `min(⌊10·log₁₀ n⌋, n - 1)`.
pub fn default_max_order(n: usize) -> usize {
    if n < 2 {
        return 0;
    }
    ((10.0 * (n as f64).log10()).floor() as usize).min(n - 1)
}

/// Fit AR(k) for `k = 0..=max_order` by Durbin–Levinson and select the
/// order minimizing `n·ln σ²ₖ + 2k`.
pub fn residual_ar_order(residuals: &[f64], max_order: Option<usize>) -> ArOrderResult {
    let n = residuals.len();
    let max_order = max_order
        .unwrap_or_else(|| default_max_order(n))
        .min(n.saturating_sub(1));
    if n < 2 {
        return ArOrderResult {
            order: 0,
            max_order,
            aic: vec![],
        };
    }

    let gamma = autocovariances(residuals, max_order);
    if gamma[0] < 1e-300 {
        return ArOrderResult {
            order: 0,
            max_order,
            aic: vec![0.0; max_order + 1],
        };
    }
    let acf: Vec<f64> = gamma.iter().map(|g| g / gamma[0]).collect();
    let recursion = durbin_levinson(&acf);

    let aic: Vec<f64> = recursion
        .prediction_variance
        .iter()
        .enumerate()
        .map(|(k, v)| n as f64 * (gamma[0] * v).max(f64::MIN_POSITIVE).ln() + 2.0 * k as f64)
        .collect();
    let order = aic
        .iter()
        .enumerate()
        .min_by(|a, b| a.1.total_cmp(b.1))
        .map(|(k, _)| k)
        .unwrap_or(0);

    ArOrderResult {
        order,
        max_order,
        aic,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ar2(n: usize) -> Vec<f64> {
        let mut x = vec![0.0; n];
        for t in 2..n {
            let noise = ((t as f64 * 78.233).sin() * 43758.5453).fract();
            x[t] = 0.6 * x[t - 1] - 0.3 * x[t - 2] + noise;
        }
        x
    }

    #[test]
    fn default_max_order_grows_logarithmically() {
        assert_eq!(default_max_order(100), 20);
        assert_eq!(default_max_order(600), 27);
        assert_eq!(default_max_order(5), 4);
        assert_eq!(default_max_order(1), 0);
    }

    #[test]
    fn autoregressive_residuals_are_detected() {
        let result = residual_ar_order(&ar2(1000), None);
        assert!(result.detected());
        assert!(result.order >= 2);
        assert_eq!(result.aic.len(), result.max_order + 1);
    }

    #[test]
    fn constant_residuals_have_no_order() {
        let result = residual_ar_order(&[0.5; 30], Some(5));
        assert_eq!(result.order, 0);
        assert!(!result.detected());
    }

    #[test]
    fn requested_order_is_capped_by_length() {
        let result = residual_ar_order(&[1.0, -1.0, 0.5], Some(10));
        assert_eq!(result.max_order, 2);
    }
}
