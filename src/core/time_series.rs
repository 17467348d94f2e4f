//! Monthly time series with a known seasonal period.

use crate::error::{Result, SarimaError};
use chrono::{Datelike, Months, NaiveDate};
use serde::Serialize;

/// An evenly spaced monthly series.
///
/// The time index is implicit: observation `i` belongs to the month `i`
/// months after [`TimeSeries::start`]. This makes the index strictly
/// increasing and gap-free by construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeries {
    start: NaiveDate,
    values: Vec<f64>,
    period: usize,
}

impl TimeSeries {
    /// Create a series starting at the month containing `start`.
    ///
    /// # Errors
    /// `EmptyData` for no observations, `NonFiniteValue` for NaN or infinite
    /// readings, `InvalidParameter` for a seasonal period of zero.
    pub fn monthly(start: NaiveDate, values: Vec<f64>, period: usize) -> Result<Self> {
        if values.is_empty() {
            return Err(SarimaError::EmptyData);
        }
        if period == 0 {
            return Err(SarimaError::InvalidParameter(
                "seasonal period must be positive".to_string(),
            ));
        }
        if let Some(index) = values.iter().position(|v| !v.is_finite()) {
            return Err(SarimaError::NonFiniteValue { index });
        }
        Ok(Self {
            start: first_of_month(start),
            values,
            period,
        })
    }

    /// Create a series from dated observations.
    ///
    /// Dates must fall in consecutive months; the day of month is ignored.
    pub fn from_dated(observations: &[(NaiveDate, f64)], period: usize) -> Result<Self> {
        let (first, _) = observations.first().ok_or(SarimaError::EmptyData)?;
        for (index, window) in observations.windows(2).enumerate() {
            if month_index(window[1].0) != month_index(window[0].0) + 1 {
                return Err(SarimaError::DateGap { index: index + 1 });
            }
        }
        Self::monthly(
            *first,
            observations.iter().map(|(_, v)| *v).collect(),
            period,
        )
    }

    /// Number of observations.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always false for a constructed series; provided for symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Observation values in time order.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Seasonal period `s`.
    pub fn period(&self) -> usize {
        self.period
    }

    /// First month of the series (day set to 1).
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Month of observation `index`; may lie past the end of the series.
    pub fn date_at(&self, index: usize) -> NaiveDate {
        let months = u32::try_from(index).unwrap_or(u32::MAX);
        self.start
            .checked_add_months(Months::new(months))
            .unwrap_or(NaiveDate::MAX)
    }

    /// Month of the last observation.
    pub fn end(&self) -> NaiveDate {
        self.date_at(self.len() - 1)
    }

    /// All months of the series.
    pub fn dates(&self) -> Vec<NaiveDate> {
        (0..self.len()).map(|i| self.date_at(i)).collect()
    }

    /// Sub-series `[start, end)`.
    pub fn slice(&self, start: usize, end: usize) -> Result<TimeSeries> {
        if start >= end || end > self.len() {
            return Err(SarimaError::InvalidParameter(format!(
                "invalid slice {start}..{end} of a series with {} observations",
                self.len()
            )));
        }
        Ok(TimeSeries {
            start: self.date_at(start),
            values: self.values[start..end].to_vec(),
            period: self.period,
        })
    }

    /// Split into the first `len - test_len` and the last `test_len` observations.
    pub fn split_tail(&self, test_len: usize) -> Result<(TimeSeries, TimeSeries)> {
        if test_len == 0 || test_len >= self.len() {
            return Err(SarimaError::InsufficientData {
                needed: test_len + 1,
                got: self.len(),
            });
        }
        let cut = self.len() - test_len;
        Ok((self.slice(0, cut)?, self.slice(cut, self.len())?))
    }
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

fn month_index(date: NaiveDate) -> i64 {
    i64::from(date.year()) * 12 + i64::from(date.month0())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn monthly_normalises_start_day() {
        let ts = TimeSeries::monthly(ymd(1958, 3, 15), vec![315.7, 317.4], 12).unwrap();
        assert_eq!(ts.start(), ymd(1958, 3, 1));
        assert_eq!(ts.end(), ymd(1958, 4, 1));
        assert_eq!(ts.period(), 12);
    }

    #[test]
    fn date_at_rolls_over_years() {
        let ts = TimeSeries::monthly(ymd(2000, 11, 1), vec![1.0; 4], 12).unwrap();
        assert_eq!(
            ts.dates(),
            vec![ymd(2000, 11, 1), ymd(2000, 12, 1), ymd(2001, 1, 1), ymd(2001, 2, 1)]
        );
        assert_eq!(ts.date_at(6), ymd(2001, 5, 1));
    }

    #[test]
    fn rejects_empty_and_non_finite() {
        assert_eq!(
            TimeSeries::monthly(ymd(2000, 1, 1), vec![], 12),
            Err(SarimaError::EmptyData)
        );
        assert_eq!(
            TimeSeries::monthly(ymd(2000, 1, 1), vec![1.0, f64::NAN], 12),
            Err(SarimaError::NonFiniteValue { index: 1 })
        );
        assert!(matches!(
            TimeSeries::monthly(ymd(2000, 1, 1), vec![1.0], 0),
            Err(SarimaError::InvalidParameter(_))
        ));
    }

    #[test]
    fn from_dated_requires_consecutive_months() {
        let ok = TimeSeries::from_dated(
            &[(ymd(1999, 12, 3), 1.0), (ymd(2000, 1, 9), 2.0), (ymd(2000, 2, 1), 3.0)],
            12,
        )
        .unwrap();
        assert_eq!(ok.values(), &[1.0, 2.0, 3.0]);
        assert_eq!(ok.start(), ymd(1999, 12, 1));

        let gap = TimeSeries::from_dated(&[(ymd(2000, 1, 1), 1.0), (ymd(2000, 3, 1), 2.0)], 12);
        assert_eq!(gap, Err(SarimaError::DateGap { index: 1 }));

        let backwards =
            TimeSeries::from_dated(&[(ymd(2000, 2, 1), 1.0), (ymd(2000, 1, 1), 2.0)], 12);
        assert_eq!(backwards, Err(SarimaError::DateGap { index: 1 }));
    }

    #[test]
    fn split_tail_partitions_in_order() {
        let values: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let ts = TimeSeries::monthly(ymd(2020, 1, 1), values, 4).unwrap();
        let (train, test) = ts.split_tail(3).unwrap();
        assert_eq!(train.len(), 7);
        assert_eq!(test.values(), &[7.0, 8.0, 9.0]);
        assert_eq!(test.start(), ymd(2020, 8, 1));
        assert_eq!(test.period(), 4);

        assert!(ts.split_tail(10).is_err());
        assert!(ts.split_tail(0).is_err());
    }
}
