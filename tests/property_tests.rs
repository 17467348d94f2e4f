//! Property-based tests for the differencing, correlogram, root and
//! forecast-error building blocks.

use chrono::NaiveDate;
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use sarima_forecast::core::TimeSeries;
use sarima_forecast::features::{compute_acf, compute_pacf};
use sarima_forecast::models::sarima::{
    simulate, DifferencedSeries, Forecaster, SarimaCoefficients, SarimaEstimator, SarimaSpec,
};
use sarima_forecast::validation::{is_invertible, is_stationary};

/// Strategy for generating series values with some spread.
fn values_strategy(min_len: usize, max_len: usize) -> impl Strategy<Value = Vec<f64>> {
    (min_len..max_len).prop_flat_map(|len| {
        prop::collection::vec(-500.0..500.0_f64, len).prop_map(|mut v| {
            for (i, val) in v.iter_mut().enumerate() {
                *val += (i as f64) * 0.01;
            }
            v
        })
    })
}

// =============================================================================
// Property: integrating a differenced series recovers the original
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn differencing_round_trips(
        values in values_strategy(30, 120),
        d in 0usize..=2,
        cap_d in 0usize..=1,
        period in 2usize..=12,
    ) {
        let differenced = DifferencedSeries::new(&values, d, cap_d, period).unwrap();
        prop_assert_eq!(differenced.len(), values.len() - d - cap_d * period);

        let restored = differenced.integrate();
        prop_assert_eq!(restored.len(), values.len());
        for (a, b) in values.iter().zip(&restored) {
            prop_assert!((a - b).abs() <= 1e-8 * a.abs().max(1.0));
        }
    }
}

// =============================================================================
// Property: correlograms start at 1 and stay inside [-1, 1]
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn acf_and_pacf_are_bounded(
        values in values_strategy(20, 150),
        max_lag in 1usize..20,
    ) {
        let acf = compute_acf(&values, max_lag).unwrap();
        let pacf = compute_pacf(&values, max_lag).unwrap();
        prop_assert_eq!(acf.len(), max_lag + 1);
        prop_assert_eq!(pacf.len(), max_lag + 1);
        prop_assert!((acf[0].value - 1.0).abs() < 1e-12);
        for entry in acf.iter().chain(&pacf) {
            prop_assert!(entry.value.abs() <= 1.0 + 1e-9, "lag {} = {}", entry.lag, entry.value);
            prop_assert!(entry.bound > 0.0);
        }
    }
}

// =============================================================================
// Property: fitted-model forecast standard errors never shrink with the horizon
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn forecast_std_errors_are_non_decreasing(
        phi in -0.8..0.8_f64,
        theta in -0.8..0.8_f64,
        seasonal_theta in -0.8..0.8_f64,
        seed in 0u64..1000,
        horizon in 1usize..48,
    ) {
        let spec = SarimaSpec::new(1, 1, 1, 0, 1, 1, 12).unwrap();
        let coefficients =
            SarimaCoefficients::new(&spec, vec![phi], vec![theta], vec![], vec![seasonal_theta])
                .unwrap();
        let mut rng = StdRng::seed_from_u64(seed);
        let values = simulate(&spec, &coefficients, 1.0, 180, 60, &mut rng).unwrap();
        let series =
            TimeSeries::monthly(NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(), values, 12).unwrap();

        // Near-cancelling AR and MA factors can leave a singular information matrix.
        let fit = SarimaEstimator::default().fit(&series, &spec);
        prop_assume!(fit.is_ok());
        let model = fit.unwrap();

        let forecast = Forecaster::default().forecast(&model, horizon).unwrap();
        prop_assert_eq!(forecast.horizon(), horizon);
        let std_errors = forecast.std_errors();
        prop_assert!((std_errors[0] - model.sigma2().sqrt()).abs() <= 1e-9 * std_errors[0]);
        for pair in std_errors.windows(2) {
            prop_assert!(pair[1] >= pair[0], "{} then {}", pair[0], pair[1]);
        }
        let (lower, upper) = (forecast.lower(), forecast.upper());
        for (i, point) in forecast.points().iter().enumerate() {
            prop_assert!(lower[i] <= point.mean && point.mean <= upper[i]);
        }
    }
}

// =============================================================================
// Property: an AR(1) polynomial is stationary exactly when |φ| < 1
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn first_order_root_check_matches_modulus(c in -2.0..2.0_f64) {
        prop_assert_eq!(is_stationary(&[c]), c.abs() < 1.0);
        prop_assert_eq!(is_invertible(&[c]), c.abs() < 1.0);
    }
}

#[test]
fn unit_root_boundary() {
    assert!(is_stationary(&[0.99]));
    assert!(!is_stationary(&[1.0]));
    assert!(!is_stationary(&[1.01]));
    assert!(!is_invertible(&[-1.0]));
}
