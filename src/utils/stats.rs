//! Statistical utility functions.

use statrs::distribution::{ChiSquared, ContinuousCDF, Normal};

/// Quantile function of the standard normal distribution.
///
/// # Example
/// ```
/// use sarima_forecast::utils::quantile_normal;
///
/// // 95% two-sided level -> z ≈ 1.96
/// let z = quantile_normal(0.975);
/// assert!((z - 1.959964).abs() < 1e-5);
/// ```
pub fn quantile_normal(p: f64) -> f64 {
    if p <= 0.0 {
        return f64::NEG_INFINITY;
    }
    if p >= 1.0 {
        return f64::INFINITY;
    }
    standard_normal().inverse_cdf(p)
}

/// Cumulative distribution function of the standard normal distribution.
pub fn cdf_normal(x: f64) -> f64 {
    standard_normal().cdf(x)
}

/// Upper tail probability `P(X > x)` of a χ² variable with `df` degrees of freedom.
///
/// Returns NaN when `df` is zero, since the test has no degrees of freedom left.
pub fn chi_squared_sf(x: f64, df: usize) -> f64 {
    if df == 0 || x.is_nan() {
        return f64::NAN;
    }
    if x <= 0.0 {
        return 1.0;
    }
    match ChiSquared::new(df as f64) {
        Ok(dist) => dist.sf(x),
        Err(_) => f64::NAN,
    }
}

fn standard_normal() -> Normal {
    Normal::new(0.0, 1.0).expect("unit normal parameters are valid")
}

/// Calculate the mean of a slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Calculate the variance of a slice (sample variance with n-1 denominator).
pub fn variance(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    let m = mean(values);
    let sum_sq: f64 = values.iter().map(|x| (x - m).powi(2)).sum();
    sum_sq / (values.len() - 1) as f64
}

/// Sample autocovariances `γ(0..=max_lag)` with the biased 1/n estimator.
///
/// The 1/n denominator keeps the implied autocorrelation sequence positive
/// semi-definite, which the Durbin–Levinson recursion relies on.
pub fn autocovariances(values: &[f64], max_lag: usize) -> Vec<f64> {
    let n = values.len();
    if n == 0 {
        return vec![];
    }
    let m = mean(values);
    let centered: Vec<f64> = values.iter().map(|x| x - m).collect();
    (0..=max_lag.min(n - 1))
        .map(|k| {
            centered
                .iter()
                .skip(k)
                .zip(centered.iter())
                .map(|(a, b)| a * b)
                .sum::<f64>()
                / n as f64
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn quantile_normal_known_values() {
        assert_relative_eq!(quantile_normal(0.5), 0.0, epsilon = 1e-9);
        assert_relative_eq!(quantile_normal(0.975), 1.959964, epsilon = 1e-5);
        assert_relative_eq!(quantile_normal(0.025), -1.959964, epsilon = 1e-5);
        assert_relative_eq!(quantile_normal(0.995), 2.575829, epsilon = 1e-5);
    }

    #[test]
    fn quantile_normal_boundary_values() {
        assert_eq!(quantile_normal(0.0), f64::NEG_INFINITY);
        assert_eq!(quantile_normal(1.0), f64::INFINITY);
    }

    #[test]
    fn cdf_normal_is_symmetric() {
        assert_relative_eq!(cdf_normal(0.0), 0.5, epsilon = 1e-12);
        assert_relative_eq!(cdf_normal(1.5) + cdf_normal(-1.5), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn chi_squared_sf_known_values() {
        // df=2 is exponential with mean 2: P(X > 2) = e^-1
        assert_relative_eq!(chi_squared_sf(2.0, 2), (-1.0f64).exp(), epsilon = 1e-9);
        // 95th percentile of chi2(10) is 18.307
        assert_relative_eq!(chi_squared_sf(18.307, 10), 0.05, epsilon = 1e-3);
        assert_eq!(chi_squared_sf(0.0, 5), 1.0);
        assert!(chi_squared_sf(3.0, 0).is_nan());
    }

    #[test]
    fn mean_and_variance() {
        assert_relative_eq!(mean(&[1.0, 2.0, 3.0, 4.0, 5.0]), 3.0, epsilon = 1e-12);
        assert_relative_eq!(variance(&[1.0, 2.0, 3.0, 4.0, 5.0]), 2.5, epsilon = 1e-12);
        assert!(mean(&[]).is_nan());
        assert!(variance(&[1.0]).is_nan());
    }

    #[test]
    fn autocovariances_use_biased_estimator() {
        let values = [1.0, 2.0, 3.0, 4.0];
        let gamma = autocovariances(&values, 2);
        // centered: -1.5, -0.5, 0.5, 1.5
        assert_relative_eq!(gamma[0], 5.0 / 4.0, epsilon = 1e-12);
        assert_relative_eq!(gamma[1], (0.75 - 0.25 + 0.75) / 4.0, epsilon = 1e-12);
        assert_relative_eq!(gamma[2], (-0.75 - 0.75) / 4.0, epsilon = 1e-12);
    }
}
