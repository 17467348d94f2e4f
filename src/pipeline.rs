//! One end-to-end analysis run: split, difference, identify, fit, diagnose,
//! select, forecast and score.

use crate::core::{ForecastResult, IntervalMethod, SeriesStore, SplitConfig, TimeSeries};
use crate::error::{Result, SarimaError};
use crate::models::sarima::{
    variance_stages, EstimatorConfig, FittedModel, Forecaster, Identification, IdentifierConfig,
    ModelComparison, OrderIdentifier, SarimaEstimator, SarimaSpec, SelectionCriteria,
    VarianceStage,
};
use crate::utils::metrics::{calculate_metrics, AccuracyMetrics};
use crate::validation::{DiagnosticConfig, DiagnosticEngine, DiagnosticReport};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Every knob of an analysis run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Train/test partition.
    pub split: SplitConfig,
    /// Differencing and correlogram settings for identification. Its
    /// differencing orders also drive the variance table.
    pub identifier: IdentifierConfig,
    /// Maximum-likelihood settings.
    pub estimator: EstimatorConfig,
    /// Residual test settings.
    pub diagnostics: DiagnosticConfig,
    /// Which diagnostics disqualify a model.
    pub selection: SelectionCriteria,
    /// Prediction interval construction.
    pub interval: IntervalMethod,
}

impl AnalysisConfig {
    /// Set the train/test partition.
    pub fn with_split(mut self, split: SplitConfig) -> Self {
        self.split = split;
        self
    }

    /// Set the identification settings.
    pub fn with_identifier(mut self, identifier: IdentifierConfig) -> Self {
        self.identifier = identifier;
        self
    }

    /// Set the estimator settings.
    pub fn with_estimator(mut self, estimator: EstimatorConfig) -> Self {
        self.estimator = estimator;
        self
    }

    /// Set the diagnostic settings.
    pub fn with_diagnostics(mut self, diagnostics: DiagnosticConfig) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Set the selection criteria.
    pub fn with_selection(mut self, selection: SelectionCriteria) -> Self {
        self.selection = selection;
        self
    }

    /// Set the interval method.
    pub fn with_interval(mut self, interval: IntervalMethod) -> Self {
        self.interval = interval;
        self
    }
}

/// A candidate whose fit failed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FitFailure {
    /// Candidate structure.
    pub spec: SarimaSpec,
    /// Error message.
    pub reason: String,
}

/// The selected model's forecast scored against the held-out values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HoldoutScore {
    /// Forecast over the test horizon.
    pub forecast: ForecastResult,
    /// Held-out observations.
    pub actual: Vec<f64>,
    /// Point accuracy.
    pub accuracy: AccuracyMetrics,
    /// Held-out values inside their interval.
    pub contained: usize,
    /// `contained / horizon`.
    pub coverage: f64,
}

/// Everything one run produces.
#[derive(Debug, Clone, Serialize)]
pub struct Evaluation {
    /// Variance of the training series per differencing stage.
    pub variance: Vec<VarianceStage>,
    /// Correlograms and proposed candidates.
    pub identification: Identification,
    /// Successful fits, in candidate order.
    pub models: Vec<FittedModel>,
    /// Diagnostic report of each model in `models`.
    pub reports: Vec<DiagnosticReport>,
    /// Candidates that could not be fitted.
    pub failures: Vec<FitFailure>,
    /// AIC table with disqualification reasons.
    pub comparison: ModelComparison,
    /// Index into `models` of the selected model.
    pub selected: usize,
    /// Out-of-sample evaluation of the selected model.
    pub holdout: HoldoutScore,
}

impl Evaluation {
    /// The selected model.
    pub fn selected_model(&self) -> &FittedModel {
        &self.models[self.selected]
    }

    /// Diagnostics of the selected model.
    pub fn selected_report(&self) -> &DiagnosticReport {
        &self.reports[self.selected]
    }
}

/// An analysis of one monthly series.
#[derive(Debug, Clone)]
pub struct Analysis {
    config: AnalysisConfig,
    store: SeriesStore,
}

impl Analysis {
    /// Split `series` according to `config`.
    pub fn new(series: TimeSeries, config: AnalysisConfig) -> Result<Self> {
        let store = SeriesStore::new(series, config.split)?;
        info!(
            train = store.train().len(),
            test = store.test().len(),
            "series split"
        );
        Ok(Self { config, store })
    }

    /// Run configuration.
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Full series and its partitions.
    pub fn store(&self) -> &SeriesStore {
        &self.store
    }

    /// Variance of the training series before and after each differencing
    /// stage.
    pub fn variance_table(&self) -> Result<Vec<VarianceStage>> {
        let train = self.store.train();
        let identifier = &self.config.identifier;
        variance_stages(train.values(), identifier.d, identifier.cap_d, train.period())
    }

    /// Correlograms of the differenced training series and proposed orders.
    ///
    /// The correlogram depth is cut to one less than the differenced
    /// training length when the configured `max_lag` does not fit.
    pub fn identify(&self) -> Result<Identification> {
        let train = self.store.train();
        let mut identifier = self.config.identifier.clone();
        let differenced_len = train
            .len()
            .saturating_sub(identifier.d + identifier.cap_d * train.period());
        if differenced_len > 1 && identifier.max_lag >= differenced_len {
            debug!(
                configured = identifier.max_lag,
                used = differenced_len - 1,
                "correlogram depth reduced to fit the training series"
            );
            identifier.max_lag = differenced_len - 1;
        }
        OrderIdentifier::new(identifier).identify(train)
    }

    /// Fit `candidates` on the training split and evaluate the best one on
    /// the test split.
    ///
    /// Candidates that fail to fit are recorded in
    /// [`Evaluation::failures`]; the run continues with the rest.
    ///
    /// # Errors
    /// `InvalidParameter` for an empty candidate list, the first fit error
    /// when no candidate could be fitted, and `NoQualifyingModel` when no
    /// fitted model passes the selection criteria.
    pub fn evaluate(&self, candidates: &[SarimaSpec]) -> Result<Evaluation> {
        if candidates.is_empty() {
            return Err(SarimaError::InvalidParameter(
                "at least one candidate model is required".to_string(),
            ));
        }
        let train = self.store.train();
        let test = self.store.test();

        let variance = self.variance_table()?;
        info!(stages = variance.len(), "variance table computed");
        let identification = self.identify()?;
        info!(
            proposed = identification.candidates.len(),
            "orders identified"
        );

        let estimator = SarimaEstimator::new(self.config.estimator.clone());
        let mut models = Vec::new();
        let mut failures = Vec::new();
        let mut first_error = None;
        for (spec, fit) in candidates.iter().zip(estimator.fit_all(train, candidates)) {
            match fit {
                Ok(model) => models.push(model),
                Err(e) => {
                    warn!(%spec, error = %e, "candidate fit failed");
                    failures.push(FitFailure {
                        spec: *spec,
                        reason: e.to_string(),
                    });
                    first_error.get_or_insert(e);
                }
            }
        }
        if models.is_empty() {
            return Err(first_error.unwrap_or(SarimaError::NoQualifyingModel));
        }
        info!(fitted = models.len(), failed = failures.len(), "candidates fitted");

        let engine = DiagnosticEngine::new(self.config.diagnostics.clone());
        let reports: Vec<DiagnosticReport> = models.iter().map(|m| engine.diagnose(m)).collect();

        let comparison = self.config.selection.compare(&models, &reports)?;
        let selected = comparison.best.ok_or(SarimaError::NoQualifyingModel)?;
        info!(spec = %models[selected].spec(), aic = models[selected].aic(), "model selected");

        let forecast =
            Forecaster::new(self.config.interval).forecast(&models[selected], test.len())?;
        let actual = test.values().to_vec();
        let accuracy = calculate_metrics(&actual, &forecast.means(), train.values(), train.period())?;
        let contained = forecast.contained(&actual);
        let coverage = forecast.coverage(&actual);
        info!(
            rmse = accuracy.rmse,
            contained,
            horizon = actual.len(),
            "holdout scored"
        );

        Ok(Evaluation {
            variance,
            identification,
            models,
            reports,
            failures,
            comparison,
            selected,
            holdout: HoldoutScore {
                forecast,
                actual,
                accuracy,
                contained,
                coverage,
            },
        })
    }
}
