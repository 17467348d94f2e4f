//! # sarima-forecast
//!
//! Seasonal ARIMA modelling of monthly series such as atmospheric CO₂.
//!
//! Provides differencing with a variance-per-stage table, order
//! identification from the ACF and PACF, exact Gaussian maximum likelihood
//! through a Kalman filter, residual diagnostics, diagnostic-first model
//! selection and recursive forecasting with prediction intervals.
//!
//! # Example
//!
//! ```no_run
//! use sarima_forecast::prelude::*;
//! use chrono::NaiveDate;
//!
//! # fn readings() -> Vec<f64> { vec![] }
//! let start = NaiveDate::from_ymd_opt(1958, 3, 1).unwrap();
//! let series = TimeSeries::monthly(start, readings(), 12)?;
//! let analysis = Analysis::new(series, AnalysisConfig::default())?;
//!
//! let airline = SarimaSpec::new(0, 1, 1, 0, 1, 1, 12)?;
//! let seasonal_ar = SarimaSpec::new(1, 1, 1, 0, 1, 1, 12)?;
//! let evaluation = analysis.evaluate(&[airline, seasonal_ar])?;
//!
//! println!("selected {}", evaluation.selected_model().spec());
//! println!("coverage {:.2}", evaluation.holdout.coverage);
//! # Ok::<(), SarimaError>(())
//! ```

#![allow(clippy::needless_range_loop)]

pub mod core;
pub mod error;
pub mod features;
pub mod models;
pub mod pipeline;
pub mod utils;
pub mod validation;

pub use error::{EstimationError, Result, SarimaError};

pub mod prelude {
    pub use crate::core::{ForecastResult, IntervalMethod, SeriesStore, SplitConfig, TimeSeries};
    pub use crate::error::{Result, SarimaError};
    pub use crate::models::sarima::{
        select_best, EstimatorConfig, FittedModel, Forecaster, OrderIdentifier, SarimaEstimator,
        SarimaSpec,
    };
    pub use crate::pipeline::{Analysis, AnalysisConfig, Evaluation};
    pub use crate::utils::{calculate_metrics, AccuracyMetrics};
    pub use crate::validation::{DiagnosticEngine, DiagnosticReport};
}
