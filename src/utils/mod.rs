//! Numerical helpers shared by the models and diagnostics.

pub mod metrics;
pub mod optimization;
pub mod stats;

pub use metrics::{calculate_metrics, AccuracyMetrics};
pub use optimization::{nelder_mead, numerical_hessian, NelderMeadConfig, NelderMeadResult};
pub use stats::{chi_squared_sf, quantile_normal};
