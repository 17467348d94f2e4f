//! Choosing among fitted candidates: diagnostics first, AIC second.

use crate::error::{Result, SarimaError};
use crate::models::sarima::{FittedModel, SarimaSpec};
use crate::validation::{DiagnosticReport, BOX_PIERCE, LJUNG_BOX};
use serde::{Deserialize, Serialize};

/// Which diagnostic outcomes disqualify a model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionCriteria {
    /// Ljung–Box and Box–Pierce p-values must exceed this level.
    pub alpha: f64,
    /// Also require that no AR structure is left in the residuals.
    pub require_white_residual_order: bool,
    /// Also require stationary AR and invertible MA polynomials.
    pub require_admissible_roots: bool,
}

impl Default for SelectionCriteria {
    fn default() -> Self {
        Self {
            alpha: 0.05,
            require_white_residual_order: false,
            require_admissible_roots: false,
        }
    }
}

impl SelectionCriteria {
    /// Set the significance level of the independence tests.
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    /// Require a residual AR order of zero.
    pub fn with_white_residual_order(mut self, required: bool) -> Self {
        self.require_white_residual_order = required;
        self
    }

    /// Require admissible roots.
    pub fn with_admissible_roots(mut self, required: bool) -> Self {
        self.require_admissible_roots = required;
        self
    }

    /// Reasons `report` fails these criteria; empty when it qualifies.
    pub fn disqualifications(&self, report: &DiagnosticReport) -> Vec<String> {
        let mut reasons = Vec::new();
        for (name, result) in [
            (LJUNG_BOX, report.ljung_box()),
            (BOX_PIERCE, report.box_pierce()),
        ] {
            match result {
                Some(r) if r.is_white_noise(self.alpha) => {}
                Some(r) => reasons.push(format!(
                    "{name} p-value {:.4} is not above {}",
                    r.p_value, self.alpha
                )),
                None => reasons.push(format!("{name} result missing")),
            }
        }
        if self.require_white_residual_order && report.residual_ar_detected {
            reasons.push(format!(
                "residuals retain AR order {}",
                report.ar_order.order
            ));
        }
        if self.require_admissible_roots {
            for (polynomial, ok) in &report.roots {
                if !ok {
                    reasons.push(format!("{polynomial} polynomial is not admissible"));
                }
            }
        }
        reasons
    }

    /// Compare every model; see [`compare`].
    pub fn compare(
        &self,
        models: &[FittedModel],
        reports: &[DiagnosticReport],
    ) -> Result<ModelComparison> {
        if models.len() != reports.len() {
            return Err(SarimaError::DimensionMismatch {
                expected: models.len(),
                got: reports.len(),
            });
        }

        let mut rows: Vec<ComparisonRow> = models
            .iter()
            .zip(reports)
            .enumerate()
            .map(|(index, (model, report))| {
                let reasons = self.disqualifications(report);
                ComparisonRow {
                    index,
                    spec: *model.spec(),
                    aic: model.aic(),
                    bic: model.bic(),
                    log_likelihood: model.log_likelihood(),
                    ljung_box_p: report.ljung_box().map_or(f64::NAN, |r| r.p_value),
                    box_pierce_p: report.box_pierce().map_or(f64::NAN, |r| r.p_value),
                    qualified: reasons.is_empty(),
                    reasons,
                    rank: None,
                }
            })
            .collect();

        let mut qualified: Vec<usize> = (0..rows.len()).filter(|&i| rows[i].qualified).collect();
        qualified.sort_by(|&a, &b| rows[a].aic.total_cmp(&rows[b].aic));
        for (rank, &i) in qualified.iter().enumerate() {
            rows[i].rank = Some(rank + 1);
        }

        Ok(ModelComparison {
            rows,
            best: qualified.first().copied(),
        })
    }

    /// The qualifying model with the lowest AIC.
    pub fn select_best<'a>(
        &self,
        models: &'a [FittedModel],
        reports: &[DiagnosticReport],
    ) -> Result<&'a FittedModel> {
        let comparison = self.compare(models, reports)?;
        comparison
            .best
            .map(|i| &models[i])
            .ok_or(SarimaError::NoQualifyingModel)
    }
}

/// One line of the comparison table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonRow {
    /// Position of the model in the input slice.
    pub index: usize,
    /// Model structure.
    pub spec: SarimaSpec,
    /// Akaike information criterion.
    pub aic: f64,
    /// Bayesian information criterion.
    pub bic: f64,
    /// Maximised log-likelihood.
    pub log_likelihood: f64,
    /// Ljung–Box p-value.
    pub ljung_box_p: f64,
    /// Box–Pierce p-value.
    pub box_pierce_p: f64,
    /// Whether the model passed the criteria.
    pub qualified: bool,
    /// Why the model was disqualified.
    pub reasons: Vec<String>,
    /// AIC rank among qualified models, 1 is best.
    pub rank: Option<usize>,
}

/// AIC comparison of all candidates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelComparison {
    /// Rows in input order.
    pub rows: Vec<ComparisonRow>,
    /// Index of the selected model, if any qualified.
    pub best: Option<usize>,
}

impl ModelComparison {
    /// Row of the selected model.
    pub fn best_row(&self) -> Option<&ComparisonRow> {
        self.best.map(|i| &self.rows[i])
    }
}

/// Comparison table under the default criteria.
///
/// # Errors
/// `DimensionMismatch` when `models` and `reports` differ in length.
pub fn compare(models: &[FittedModel], reports: &[DiagnosticReport]) -> Result<ModelComparison> {
    SelectionCriteria::default().compare(models, reports)
}

/// Lowest-AIC model among those whose Ljung–Box and Box–Pierce p-values
/// exceed 0.05. A diagnostically valid model always beats an invalid one,
/// whatever their AICs.
///
/// # Errors
/// `DimensionMismatch` for unequal lengths and `NoQualifyingModel` when no
/// candidate passes.
pub fn select_best<'a>(
    models: &'a [FittedModel],
    reports: &[DiagnosticReport],
) -> Result<&'a FittedModel> {
    SelectionCriteria::default().select_best(models, reports)
}
