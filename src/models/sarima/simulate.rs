//! Simulation of SARIMA sample paths.

use crate::error::{Result, SarimaError};
use crate::models::sarima::{SarimaCoefficients, SarimaSpec};
use rand::Rng;
use rand_distr::{Distribution, Normal};

/// Draw `n` observations of a SARIMA process with Gaussian innovations.
///
/// The process starts from zero and the first `burn_in` draws are
/// discarded. For integrated models the level of the returned path is
/// therefore arbitrary; only its dynamics are meaningful.
///
/// # Errors
/// `InvalidOrder` when `coefficients` do not match `spec`, and
/// `InvalidParameter` for a non-positive or non-finite `sigma2`.
pub fn simulate<R: Rng + ?Sized>(
    spec: &SarimaSpec,
    coefficients: &SarimaCoefficients,
    sigma2: f64,
    n: usize,
    burn_in: usize,
    rng: &mut R,
) -> Result<Vec<f64>> {
    spec.validate()?;
    coefficients.check_orders(spec)?;
    if !sigma2.is_finite() || sigma2 <= 0.0 {
        return Err(SarimaError::InvalidParameter(format!(
            "innovation variance must be positive, got {sigma2}"
        )));
    }
    let normal = Normal::new(0.0, sigma2.sqrt())
        .map_err(|e| SarimaError::InvalidParameter(e.to_string()))?;

    let ar = coefficients.integrated_ar(spec);
    let ma = coefficients.expanded_ma(spec.s);
    let total = burn_in + n;
    let eps: Vec<f64> = (0..total).map(|_| normal.sample(rng)).collect();
    let mut y = vec![0.0; total];

    for t in 0..total {
        let mut value = eps[t];
        for (i, g) in ar.iter().enumerate() {
            if t > i {
                value += g * y[t - 1 - i];
            }
        }
        for (j, m) in ma.iter().enumerate() {
            if t > j {
                value += m * eps[t - 1 - j];
            }
        }
        y[t] = value;
    }

    Ok(y.split_off(burn_in))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::stats::{mean, variance};
    use crate::models::sarima::difference;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn white_noise_has_requested_variance() {
        let spec = SarimaSpec::arima(0, 0, 0).unwrap();
        let mut rng = StdRng::seed_from_u64(123);
        let y = simulate(&spec, &SarimaCoefficients::zeros(&spec), 2.0, 10_000, 0, &mut rng).unwrap();
        assert_eq!(y.len(), 10_000);
        assert!(mean(&y).abs() < 0.1);
        assert!((variance(&y) - 2.0).abs() < 0.15);
    }

    #[test]
    fn burn_in_is_discarded() {
        let spec = SarimaSpec::arima(1, 0, 0).unwrap();
        let c = SarimaCoefficients::new(&spec, vec![0.5], vec![], vec![], vec![]).unwrap();
        let mut a = StdRng::seed_from_u64(1);
        let mut b = StdRng::seed_from_u64(1);
        let long = simulate(&spec, &c, 1.0, 60, 0, &mut a).unwrap();
        let short = simulate(&spec, &c, 1.0, 50, 10, &mut b).unwrap();
        assert_eq!(short.len(), 50);
        for (x, y) in short.iter().zip(&long[10..]) {
            assert_relative_eq!(x, y, epsilon = 1e-12);
        }
    }

    #[test]
    fn seasonal_difference_removes_integration() {
        let spec = SarimaSpec::new(0, 0, 0, 0, 1, 0, 4).unwrap();
        let mut rng = StdRng::seed_from_u64(9);
        let y = simulate(&spec, &SarimaCoefficients::zeros(&spec), 1.0, 4000, 0, &mut rng).unwrap();
        let w = difference(&y, 4);
        assert!((variance(&w) - 1.0).abs() < 0.1);
        assert!(variance(&y) > 10.0);
    }

    #[test]
    fn invalid_inputs_are_rejected() {
        let spec = SarimaSpec::arima(1, 0, 0).unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        let c = SarimaCoefficients::zeros(&spec);
        assert!(matches!(
            simulate(&spec, &c, 0.0, 10, 0, &mut rng),
            Err(SarimaError::InvalidParameter(_))
        ));
        let wrong = SarimaCoefficients::zeros(&SarimaSpec::arima(2, 0, 0).unwrap());
        assert!(matches!(
            simulate(&spec, &wrong, 1.0, 10, 0, &mut rng),
            Err(SarimaError::InvalidOrder(_))
        ));
    }
}
