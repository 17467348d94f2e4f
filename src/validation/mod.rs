//! Diagnostic validation of fitted models.
//!
//! Root checks for stationarity and invertibility, residual normality and
//! whiteness tests, and the residual AR order check. Everything here reports
//! statistics and p-values; pass/fail policy lives with model selection.
//!
//! # Example
//!
//! ```
//! use sarima_forecast::validation::{ljung_box, durbin_watson, is_stationary};
//!
//! let residuals = vec![0.1, -0.2, 0.15, -0.1, 0.05, -0.08, 0.12, -0.15, 0.1, -0.05];
//! let lb = ljung_box(&residuals, Some(3), 0);
//! assert!(lb.statistic >= 0.0);
//!
//! let dw = durbin_watson(&residuals);
//! assert!(dw.statistic > 2.0);
//!
//! assert!(is_stationary(&[0.99]));
//! assert!(!is_stationary(&[1.0]));
//! ```

pub mod ar_order;
pub mod diagnostics;
pub mod normality;
pub mod roots;

pub use ar_order::{residual_ar_order, ArOrderResult};
pub use diagnostics::{
    DiagnosticConfig, DiagnosticEngine, DiagnosticReport, BOX_PIERCE, LJUNG_BOX, MCLEOD_LI,
};
pub use normality::{shapiro_wilk, NormalityResult};
pub use residual_tests::{
    box_pierce, default_lags, durbin_watson, ljung_box, mcleod_li, AutocorrelationType,
    DurbinWatsonResult, PortmanteauResult,
};
pub use roots::{
    check_stationarity_invertibility, inverse_root_moduli, is_invertible, is_stationary,
    PolynomialKind,
};
