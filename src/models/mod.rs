//! Forecasting models.

pub mod sarima;

pub use sarima::{FittedModel, Forecaster, SarimaEstimator, SarimaSpec};
