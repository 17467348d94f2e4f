//! End-to-end tests on synthetic Mauna Loa-like series.
//!
//! Each series is a linear trend plus a fixed annual cycle plus a simulated
//! SARIMA(1,1,1)(0,1,1)[12] component. Both deterministic parts vanish under
//! one regular and one seasonal difference, so the airline-with-AR model is
//! correctly specified for these data.

use approx::assert_relative_eq;
use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use sarima_forecast::core::{SeriesStore, SplitConfig, TimeSeries};
use sarima_forecast::models::sarima::{
    compare, select_best, simulate, variance_stages, EstimatorConfig, Forecaster, OrderIdentifier,
    SarimaCoefficients, SarimaEstimator, SarimaSpec, SelectionCriteria,
};
use sarima_forecast::pipeline::{Analysis, AnalysisConfig};
use sarima_forecast::validation::DiagnosticEngine;

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(1958, 3, 1).unwrap()
}

fn true_spec() -> SarimaSpec {
    SarimaSpec::new(1, 1, 1, 0, 1, 1, 12).unwrap()
}

/// Trend of 0.13 ppm per month, a 3 ppm annual cycle and SARIMA noise.
fn mauna_loa_like(n: usize, seed: u64) -> TimeSeries {
    let spec = true_spec();
    let coefficients = SarimaCoefficients::new(&spec, vec![0.2], vec![-0.55], vec![], vec![-0.86])
        .unwrap();
    let mut rng = StdRng::seed_from_u64(seed);
    let noise = simulate(&spec, &coefficients, 0.09, n, 120, &mut rng).unwrap();
    let offset = noise[0];
    let values = noise
        .iter()
        .enumerate()
        .map(|(t, e)| {
            let month = t as f64;
            315.0
                + 0.13 * month
                + 3.0 * (2.0 * std::f64::consts::PI * month / 12.0).sin()
                + (e - offset)
        })
        .collect();
    TimeSeries::monthly(start(), values, 12).unwrap()
}

#[test]
fn variance_falls_at_every_differencing_stage() {
    let mut rng = StdRng::seed_from_u64(11);
    let noise = Normal::new(0.0, 0.3).unwrap();
    let values: Vec<f64> = (0..400)
        .map(|t| {
            let month = t as f64;
            100.0
                + 0.1 * month
                + 3.0 * (2.0 * std::f64::consts::PI * month / 12.0).sin()
                + noise.sample(&mut rng)
        })
        .collect();

    let stages = variance_stages(&values, 1, 1, 12).unwrap();
    assert_eq!(stages.len(), 3);
    assert_eq!(stages[0].label, "d=0, D=0");
    assert_eq!(stages[2].len, 400 - 13);
    for pair in stages.windows(2) {
        assert!(
            pair[1].variance < pair[0].variance,
            "{} -> {}: {} !< {}",
            pair[0].label,
            pair[1].label,
            pair[1].variance,
            pair[0].variance
        );
    }
}

#[test]
fn identification_sees_the_seasonal_moving_average() {
    let series = mauna_loa_like(480, 3);
    let identification = OrderIdentifier::default().identify(&series).unwrap();

    assert_eq!(identification.acf.len(), 37);
    assert_eq!(identification.acf[0].value, 1.0);
    // Θ = -0.86 leaves a large negative autocorrelation at lag 12.
    assert!(identification.acf[12].value < -0.3);
    assert!(identification.significant_acf_lags.contains(&12));
    assert!(!identification.candidates.is_empty());
    assert!(identification
        .candidates
        .iter()
        .all(|c| c.spec.d == 1 && c.spec.cap_d == 1 && !c.rationale.is_empty()));
}

#[test]
fn true_model_recovers_its_coefficients() {
    let series = mauna_loa_like(600, 5);
    let model = SarimaEstimator::default().fit(&series, &true_spec()).unwrap();

    let names: Vec<&str> = model
        .coefficient_table()
        .iter()
        .map(|c| c.name.as_str())
        .collect();
    assert_eq!(names, ["phi_1", "theta_1", "Theta_1"]);
    assert!(model.mean().is_none());
    assert_eq!(model.n_obs(), 600 - 13);

    let seasonal_ma = model.coefficient("Theta_1").unwrap();
    assert!((seasonal_ma.estimate + 0.86).abs() < 0.15);
    assert!(seasonal_ma.std_error > 0.0 && seasonal_ma.std_error < 0.2);
    assert!((model.sigma2() - 0.09).abs() < 0.03);

    assert_eq!(model.num_params(), 4);
    assert_relative_eq!(
        model.aic(),
        2.0 * 4.0 - 2.0 * model.log_likelihood(),
        epsilon = 1e-9
    );
    assert!(model.bic() > model.aic());
}

/// Holding at least 34 of 36 values inside ±2 SE is a statement about
/// typical behaviour, not every path: roughly one simulated path in four
/// misses it, occasionally by a lot when a shock lands early in the
/// holdout. The check is therefore a majority over fixed seeds.
#[test]
fn two_sigma_intervals_cover_the_holdout() {
    let seeds = [1_u64, 2, 3, 4, 5, 6, 7];
    let mut successes = 0;
    for seed in seeds {
        let store = SeriesStore::new(mauna_loa_like(480, seed), SplitConfig::default()).unwrap();
        let model = SarimaEstimator::default()
            .fit(store.train(), &true_spec())
            .unwrap();
        let forecast = Forecaster::default().forecast(&model, 36).unwrap();

        let std_errors = forecast.std_errors();
        assert!(std_errors.windows(2).all(|w| w[1] >= w[0]));
        if forecast.contained(store.test().values()) >= 34 {
            successes += 1;
        }
    }
    assert!(
        successes * 2 > seeds.len(),
        "only {successes} of {} seeds reached 34/36",
        seeds.len()
    );
}

#[test]
fn underfitted_model_is_never_selected() {
    let series = mauna_loa_like(480, 9);
    let specs = [
        SarimaSpec::new(0, 1, 0, 0, 1, 0, 12).unwrap(),
        SarimaSpec::new(0, 1, 1, 0, 1, 1, 12).unwrap(),
        true_spec(),
    ];
    let models = SarimaEstimator::default()
        .fit_all(&series, &specs)
        .into_iter()
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    let engine = DiagnosticEngine::default();
    let reports: Vec<_> = models.iter().map(|m| engine.diagnose(m)).collect();

    // Differencing alone leaves both moving-average terms in the residuals.
    assert!(!reports[0].passes_independence(0.05));
    assert!(reports[0].ljung_box().unwrap().p_value < 1e-6);

    let table = compare(&models, &reports).unwrap();
    assert!(!table.rows[0].qualified);
    assert!(table.rows[0].rank.is_none());
    assert!(!table.rows[0].reasons.is_empty());

    if let Ok(best) = select_best(&models, &reports) {
        assert_ne!(best.spec(), &specs[0]);
        let index = table.best.unwrap();
        assert!(reports[index].passes_independence(0.05));
    }
}

#[test]
fn analysis_scores_the_selected_model() {
    let config = AnalysisConfig::default()
        .with_estimator(EstimatorConfig::default().with_max_restarts(1))
        .with_selection(SelectionCriteria::default().with_alpha(0.0));
    let analysis = Analysis::new(mauna_loa_like(480, 4), config).unwrap();
    let evaluation = analysis.evaluate(&[true_spec()]).unwrap();

    assert_eq!(analysis.store().train().len(), 444);
    assert_eq!(evaluation.variance.len(), 3);
    assert_eq!(evaluation.selected_model().spec(), &true_spec());
    assert_eq!(evaluation.comparison.rows.len(), 1);

    let holdout = &evaluation.holdout;
    assert_eq!(holdout.forecast.horizon(), 36);
    assert_eq!(
        holdout.forecast.points().last().unwrap().date,
        analysis.store().test().end()
    );
    // A three-year forecast of a ~0.3 ppm noise process stays within a few ppm.
    assert!(holdout.accuracy.rmse < 3.0);
    assert!(holdout.accuracy.mase.is_some());

    let json = serde_json::to_value(&evaluation).unwrap();
    assert!(json["holdout"]["forecast"]["points"].is_array());
    assert!(json["comparison"]["rows"][0]["aic"].is_number());
}
