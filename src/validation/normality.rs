//! Shapiro–Wilk normality test.

use crate::utils::stats::{cdf_normal, quantile_normal};
use serde::Serialize;

/// Result of a normality test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NormalityResult {
    /// Shapiro–Wilk W, in (0, 1].
    pub statistic: f64,
    /// Probability of a W at least this small under normality.
    pub p_value: f64,
    /// Sample size.
    pub n: usize,
}

impl NormalityResult {
    /// True when normality is not rejected at level `alpha`.
    pub fn is_normal(&self, alpha: f64) -> bool {
        self.p_value > alpha
    }
}

/// Shapiro–Wilk W with Royston's (1995) approximation for the coefficients
/// and the p-value.
///
/// Defined for 3 ≤ n ≤ 5000. Outside that range, and for constant samples,
/// the statistic and p-value are NaN.
pub fn shapiro_wilk(sample: &[f64]) -> NormalityResult {
    let n = sample.len();
    let undefined = NormalityResult {
        statistic: f64::NAN,
        p_value: f64::NAN,
        n,
    };
    if !(3..=5000).contains(&n) {
        return undefined;
    }

    let mut x = sample.to_vec();
    x.sort_by(|a, b| a.total_cmp(b));
    if x[n - 1] - x[0] < 1e-12 * x[n - 1].abs().max(1.0) {
        return undefined;
    }

    let a = coefficients(n);
    let mean = x.iter().sum::<f64>() / n as f64;
    let ss: f64 = x.iter().map(|v| (v - mean).powi(2)).sum();
    let numerator: f64 = a.iter().zip(&x).map(|(ai, xi)| ai * xi).sum();
    let w = (numerator * numerator / ss).min(1.0);

    NormalityResult {
        statistic: w,
        p_value: p_value(w, n),
        n,
    }
}

fn poly(c: &[f64], x: f64) -> f64 {
    c.iter().rev().fold(0.0, |acc, ci| acc * x + ci)
}

/// Antisymmetric weights `a₁ = -aₙ, …` of the ordered sample.
fn coefficients(n: usize) -> Vec<f64> {
    if n == 3 {
        let r = std::f64::consts::FRAC_1_SQRT_2;
        return vec![-r, 0.0, r];
    }

    let nf = n as f64;
    let m: Vec<f64> = (1..=n)
        .map(|i| quantile_normal((i as f64 - 0.375) / (nf + 0.25)))
        .collect();
    let mm: f64 = m.iter().map(|v| v * v).sum();
    let u = 1.0 / nf.sqrt();

    let an = m[n - 1] / mm.sqrt()
        + poly(&[0.0, 0.221157, -0.147981, -2.071190, 4.434685, -2.706056], u);
    let mut a = vec![0.0; n];
    a[n - 1] = an;
    a[0] = -an;

    if n > 5 {
        let an1 = m[n - 2] / mm.sqrt()
            + poly(&[0.0, 0.042981, -0.293762, -1.752461, 5.682633, -3.582633], u);
        let phi = (mm - 2.0 * m[n - 1].powi(2) - 2.0 * m[n - 2].powi(2))
            / (1.0 - 2.0 * an.powi(2) - 2.0 * an1.powi(2));
        a[n - 2] = an1;
        a[1] = -an1;
        for i in 2..n - 2 {
            a[i] = m[i] / phi.sqrt();
        }
    } else {
        let phi = (mm - 2.0 * m[n - 1].powi(2)) / (1.0 - 2.0 * an.powi(2));
        for i in 1..n - 1 {
            a[i] = m[i] / phi.sqrt();
        }
    }
    a
}

fn p_value(w: f64, n: usize) -> f64 {
    let nf = n as f64;
    if n == 3 {
        let p = 6.0 / std::f64::consts::PI * (w.sqrt().asin() - 0.75f64.sqrt().asin());
        return p.clamp(0.0, 1.0);
    }

    let y = (1.0 - w).ln();
    let (z, mu, sigma) = if n <= 11 {
        let gamma = poly(&[-2.273, 0.459], nf);
        if y >= gamma {
            return 0.0;
        }
        (
            -(gamma - y).ln(),
            poly(&[0.544, -0.39978, 0.025054, -6.714e-4], nf),
            poly(&[1.3822, -0.77857, 0.062767, -0.0020322], nf).exp(),
        )
    } else {
        let ln_n = nf.ln();
        (
            y,
            poly(&[-1.5861, -0.31082, -0.083751, 0.0038915], ln_n),
            poly(&[-0.4803, -0.082676, 0.0030302], ln_n).exp(),
        )
    };
    1.0 - cdf_normal((z - mu) / sigma)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn three_points_use_exact_distribution() {
        let result = shapiro_wilk(&[1.0, 2.0, 4.0]);
        assert_relative_eq!(result.statistic, 0.964_285_7, epsilon = 1e-6);
        assert_relative_eq!(result.p_value, 0.6369, epsilon = 1e-3);
    }

    #[test]
    fn normal_scores_look_normal() {
        let n = 60;
        let sample: Vec<f64> = (1..=n)
            .map(|i| quantile_normal((i as f64 - 0.5) / n as f64))
            .collect();
        let result = shapiro_wilk(&sample);
        assert!(result.statistic > 0.98);
        assert!(result.is_normal(0.05));
    }

    #[test]
    fn exponential_scores_are_rejected() {
        let n = 100;
        let sample: Vec<f64> = (1..=n)
            .map(|i| -(1.0 - (i as f64 - 0.5) / n as f64).ln())
            .collect();
        let result = shapiro_wilk(&sample);
        assert!(result.statistic < 0.95);
        assert!(result.p_value < 0.01);
    }

    #[test]
    fn small_samples_are_supported() {
        for n in 4..=11 {
            let sample: Vec<f64> = (0..n).map(|i| (i as f64 * 1.7).sin() + i as f64 * 0.1).collect();
            let result = shapiro_wilk(&sample);
            assert!(result.statistic > 0.0 && result.statistic <= 1.0);
            assert!((0.0..=1.0).contains(&result.p_value));
        }
    }

    #[test]
    fn order_of_the_sample_does_not_matter() {
        let a = shapiro_wilk(&[3.0, 1.0, 4.0, 1.5, 5.0, 9.0, 2.0, 6.0]);
        let b = shapiro_wilk(&[9.0, 6.0, 5.0, 4.0, 3.0, 2.0, 1.5, 1.0]);
        assert_relative_eq!(a.statistic, b.statistic, epsilon = 1e-12);
    }

    #[test]
    fn degenerate_samples_are_nan() {
        assert!(shapiro_wilk(&[1.0, 2.0]).statistic.is_nan());
        assert!(shapiro_wilk(&[5.0; 20]).p_value.is_nan());
    }
}
