//! Residual diagnostics of a fitted model, collected into one report.

use crate::models::sarima::{FittedModel, SarimaSpec};
use crate::validation::ar_order::{residual_ar_order, ArOrderResult};
use crate::validation::normality::{shapiro_wilk, NormalityResult};
use crate::validation::residual_tests::{
    box_pierce, durbin_watson, ljung_box, mcleod_li, DurbinWatsonResult, PortmanteauResult,
};
use crate::validation::roots::{check_stationarity_invertibility, PolynomialKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Key of the Ljung–Box entry in [`DiagnosticReport::portmanteau`].
pub const LJUNG_BOX: &str = "Ljung-Box";
/// Key of the Box–Pierce entry in [`DiagnosticReport::portmanteau`].
pub const BOX_PIERCE: &str = "Box-Pierce";
/// Key of the McLeod–Li entry in [`DiagnosticReport::portmanteau`].
pub const MCLEOD_LI: &str = "McLeod-Li";

/// Statistics describing one model's residuals.
///
/// Holds numbers only; deciding what counts as a pass is left to the
/// caller (see [`SelectionCriteria`](crate::models::sarima::SelectionCriteria)).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiagnosticReport {
    /// Model the residuals came from, when known.
    pub spec: Option<SarimaSpec>,
    /// Stationarity (AR) or invertibility (MA) of each polynomial present.
    pub roots: BTreeMap<PolynomialKind, bool>,
    /// Shapiro–Wilk test.
    pub normality: NormalityResult,
    /// Portmanteau tests keyed by name.
    pub portmanteau: BTreeMap<String, PortmanteauResult>,
    /// Autoregressive order left in the residuals.
    pub ar_order: ArOrderResult,
    /// `ar_order.order > 0`.
    pub residual_ar_detected: bool,
    /// First-order serial correlation.
    pub durbin_watson: DurbinWatsonResult,
}

impl DiagnosticReport {
    /// Ljung–Box result.
    pub fn ljung_box(&self) -> Option<&PortmanteauResult> {
        self.portmanteau.get(LJUNG_BOX)
    }

    /// Box–Pierce result.
    pub fn box_pierce(&self) -> Option<&PortmanteauResult> {
        self.portmanteau.get(BOX_PIERCE)
    }

    /// McLeod–Li result.
    pub fn mcleod_li(&self) -> Option<&PortmanteauResult> {
        self.portmanteau.get(MCLEOD_LI)
    }

    /// Both Ljung–Box and Box–Pierce p-values exceed `alpha`.
    pub fn passes_independence(&self, alpha: f64) -> bool {
        [self.ljung_box(), self.box_pierce()]
            .into_iter()
            .all(|r| r.is_some_and(|r| r.is_white_noise(alpha)))
    }

    /// Every checked polynomial is stationary or invertible.
    pub fn roots_admissible(&self) -> bool {
        self.roots.values().all(|ok| *ok)
    }
}

/// Configuration for [`DiagnosticEngine`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticConfig {
    /// Portmanteau lags; `round(√n)` when unset.
    pub lags: Option<usize>,
    /// Largest residual AR order; `min(⌊10·log₁₀ n⌋, n - 1)` when unset.
    pub max_ar_order: Option<usize>,
}

impl DiagnosticConfig {
    /// Fix the portmanteau lag count.
    pub fn with_lags(mut self, lags: usize) -> Self {
        self.lags = Some(lags);
        self
    }

    /// Fix the largest residual AR order.
    pub fn with_max_ar_order(mut self, max_order: usize) -> Self {
        self.max_ar_order = Some(max_order);
        self
    }
}

/// Runs every residual check on a model or a bare residual series.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticEngine {
    config: DiagnosticConfig,
}

impl DiagnosticEngine {
    /// Create an engine with the given configuration.
    pub fn new(config: DiagnosticConfig) -> Self {
        Self { config }
    }

    /// Normality, portmanteau and residual AR order checks.
    ///
    /// `fitted_params_count` is subtracted from the lag count for the
    /// Ljung–Box and Box–Pierce degrees of freedom.
    pub fn test_residuals(&self, residuals: &[f64], fitted_params_count: usize) -> DiagnosticReport {
        let lags = self.config.lags;
        let portmanteau = BTreeMap::from([
            (
                LJUNG_BOX.to_string(),
                ljung_box(residuals, lags, fitted_params_count),
            ),
            (
                BOX_PIERCE.to_string(),
                box_pierce(residuals, lags, fitted_params_count),
            ),
            (MCLEOD_LI.to_string(), mcleod_li(residuals, lags)),
        ]);
        let ar_order = residual_ar_order(residuals, self.config.max_ar_order);

        DiagnosticReport {
            spec: None,
            roots: BTreeMap::new(),
            normality: shapiro_wilk(residuals),
            portmanteau,
            residual_ar_detected: ar_order.detected(),
            ar_order,
            durbin_watson: durbin_watson(residuals),
        }
    }

    /// Full report for a fitted model: root checks plus residual tests on
    /// the standardized residuals, with the ARMA coefficient count as the
    /// degrees-of-freedom correction.
    pub fn diagnose(&self, model: &FittedModel) -> DiagnosticReport {
        let spec = model.spec();
        let mut report =
            self.test_residuals(model.standardized_residuals(), spec.num_coefficients());
        report.spec = Some(*spec);
        report.roots = check_stationarity_invertibility(spec, model.coefficients());
        report
    }
}
