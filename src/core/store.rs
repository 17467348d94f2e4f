//! Holds the raw series and its train/test partition.

use crate::core::TimeSeries;
use crate::error::{Result, SarimaError};
use serde::{Deserialize, Serialize};

/// How a series is partitioned for out-of-sample evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitConfig {
    /// Number of trailing observations held out for testing.
    pub test_len: usize,
    /// Seasonal period of the series.
    pub seasonal_period: usize,
}

impl Default for SplitConfig {
    /// The monthly CO₂ setup: twelve-month seasonality, last three years held out.
    fn default() -> Self {
        Self {
            test_len: 36,
            seasonal_period: 12,
        }
    }
}

impl SplitConfig {
    /// Set the number of held-out observations.
    pub fn with_test_len(mut self, test_len: usize) -> Self {
        self.test_len = test_len;
        self
    }

    /// Set the seasonal period.
    pub fn with_seasonal_period(mut self, period: usize) -> Self {
        self.seasonal_period = period;
        self
    }
}

/// The full series plus its training and test partitions.
#[derive(Debug, Clone)]
pub struct SeriesStore {
    full: TimeSeries,
    train: TimeSeries,
    test: TimeSeries,
}

impl SeriesStore {
    /// Partition `series` according to `config`.
    ///
    /// The store's seasonal period must agree with the series.
    pub fn new(series: TimeSeries, config: SplitConfig) -> Result<Self> {
        if series.period() != config.seasonal_period {
            return Err(SarimaError::InvalidParameter(format!(
                "series has seasonal period {} but the split expects {}",
                series.period(),
                config.seasonal_period
            )));
        }
        let (train, test) = series.split_tail(config.test_len)?;
        Ok(Self {
            full: series,
            train,
            test,
        })
    }

    /// Whole series.
    pub fn full(&self) -> &TimeSeries {
        &self.full
    }

    /// Training partition.
    pub fn train(&self) -> &TimeSeries {
        &self.train
    }

    /// Held-out partition.
    pub fn test(&self) -> &TimeSeries {
        &self.test
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn series(n: usize) -> TimeSeries {
        let start = NaiveDate::from_ymd_opt(1958, 3, 1).unwrap();
        TimeSeries::monthly(start, (0..n).map(|i| 315.0 + i as f64 * 0.1).collect(), 12).unwrap()
    }

    #[test]
    fn default_split_holds_out_three_years() {
        let store = SeriesStore::new(series(120), SplitConfig::default()).unwrap();
        assert_eq!(store.train().len(), 84);
        assert_eq!(store.test().len(), 36);
        assert_eq!(store.full().len(), 120);
        assert_eq!(store.test().start(), store.train().date_at(84));
    }

    #[test]
    fn rejects_period_mismatch() {
        let config = SplitConfig::default().with_seasonal_period(4);
        assert!(matches!(
            SeriesStore::new(series(120), config),
            Err(SarimaError::InvalidParameter(_))
        ));
    }

    #[test]
    fn rejects_test_longer_than_series() {
        let config = SplitConfig::default().with_test_len(50);
        assert!(matches!(
            SeriesStore::new(series(40), config),
            Err(SarimaError::InsufficientData { .. })
        ));
    }
}
