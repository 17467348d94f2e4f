//! Core data structures: the monthly series, its train/test store and
//! forecast results.

mod forecast;
mod store;
mod time_series;

pub use forecast::{ForecastPoint, ForecastResult, IntervalMethod};
pub use store::{SeriesStore, SplitConfig};
pub use time_series::TimeSeries;
