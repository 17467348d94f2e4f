//! Order identification from the correlograms of the differenced series.

use crate::core::TimeSeries;
use crate::error::Result;
use crate::features::{compute_acf, compute_pacf, CorrelogramEntry};
use crate::models::sarima::{DifferencedSeries, SarimaSpec};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Configuration for [`OrderIdentifier`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentifierConfig {
    /// Non-seasonal differencing applied before computing correlograms.
    pub d: usize,
    /// Seasonal differencing applied before computing correlograms.
    pub cap_d: usize,
    /// Largest lag of the correlograms.
    pub max_lag: usize,
    /// Cap on the proposed p and q.
    pub max_order: usize,
    /// Cap on the proposed P and Q.
    pub max_seasonal_order: usize,
}

impl Default for IdentifierConfig {
    fn default() -> Self {
        Self {
            d: 1,
            cap_d: 1,
            max_lag: 36,
            max_order: 2,
            max_seasonal_order: 1,
        }
    }
}

impl IdentifierConfig {
    /// Set the differencing orders.
    pub fn with_differencing(mut self, d: usize, cap_d: usize) -> Self {
        self.d = d;
        self.cap_d = cap_d;
        self
    }

    /// Set the largest correlogram lag.
    pub fn with_max_lag(mut self, max_lag: usize) -> Self {
        self.max_lag = max_lag;
        self
    }

    /// Set the caps on proposed orders.
    pub fn with_max_orders(mut self, max_order: usize, max_seasonal_order: usize) -> Self {
        self.max_order = max_order;
        self.max_seasonal_order = max_seasonal_order;
        self
    }
}

/// A proposed model and why it was proposed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    /// Proposed structure.
    pub spec: SarimaSpec,
    /// Human-readable reason.
    pub rationale: String,
}

/// Correlograms of the differenced series and the candidates read off them.
///
/// Advisory only: the caller decides which candidates to fit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Identification {
    /// ACF of the differenced series, lags `0..=max_lag`.
    pub acf: Vec<CorrelogramEntry>,
    /// PACF of the differenced series, lags `0..=max_lag`.
    pub pacf: Vec<CorrelogramEntry>,
    /// Lags whose ACF exceeds the significance bound.
    pub significant_acf_lags: Vec<usize>,
    /// Lags whose PACF exceeds the significance bound.
    pub significant_pacf_lags: Vec<usize>,
    /// Ranked candidates, most complete first.
    pub candidates: Vec<Candidate>,
}

/// Proposes SARIMA orders from significant correlogram lags.
///
/// Non-seasonal orders come from the run of significant lags starting at
/// lag 1 (ACF → q, PACF → p). Seasonal orders come from significance at
/// lags `s` and `2s` (ACF → Q, PACF → P).
#[derive(Debug, Clone, Default)]
pub struct OrderIdentifier {
    config: IdentifierConfig,
}

impl OrderIdentifier {
    /// Create an identifier with the given configuration.
    pub fn new(config: IdentifierConfig) -> Self {
        Self { config }
    }

    /// Identifier configuration.
    pub fn config(&self) -> &IdentifierConfig {
        &self.config
    }

    /// Difference `series`, compute its correlograms and propose candidates.
    pub fn identify(&self, series: &TimeSeries) -> Result<Identification> {
        let config = &self.config;
        let s = series.period();
        let differenced = DifferencedSeries::from_series(series, config.d, config.cap_d)?;
        let acf = compute_acf(differenced.values(), config.max_lag)?;
        let pacf = compute_pacf(differenced.values(), config.max_lag)?;

        let q = leading_run(&acf, config.max_order);
        let p = leading_run(&pacf, config.max_order);
        let cap_q = seasonal_run(&acf, s, config.max_seasonal_order);
        let cap_p = seasonal_run(&pacf, s, config.max_seasonal_order);
        debug!(p, q, cap_p, cap_q, "correlogram orders");

        let candidates = self.candidates(s, (p, q), (cap_p, cap_q))?;
        Ok(Identification {
            significant_acf_lags: significant_lags(&acf),
            significant_pacf_lags: significant_lags(&pacf),
            acf,
            pacf,
            candidates,
        })
    }

    fn candidates(
        &self,
        s: usize,
        (p, q): (usize, usize),
        (cap_p, cap_q): (usize, usize),
    ) -> Result<Vec<Candidate>> {
        let (d, cap_d) = (self.config.d, self.config.cap_d);
        let period = if cap_p + cap_d + cap_q > 0 { s } else { 0 };
        let seasonal_period = |sp: usize, sq: usize| if sp + cap_d + sq > 0 { s } else { 0 };

        let mut proposals = vec![(
            SarimaSpec::new(p, d, q, cap_p, cap_d, cap_q, period)?,
            format!(
                "ACF significant through lag {q} and PACF through lag {p}; \
                 seasonal ACF gives Q = {cap_q}, seasonal PACF gives P = {cap_p}"
            ),
        )];
        if q + cap_q > 0 {
            proposals.push((
                SarimaSpec::new(0, d, q, 0, cap_d, cap_q, seasonal_period(0, cap_q))?,
                format!("pure moving average: ACF cuts off after lag {q} and seasonal lag {cap_q}"),
            ));
        }
        if p + cap_p > 0 {
            proposals.push((
                SarimaSpec::new(p, d, 0, cap_p, cap_d, 0, seasonal_period(cap_p, 0))?,
                format!("pure autoregression: PACF cuts off after lag {p} and seasonal lag {cap_p}"),
            ));
        }
        if p + q + cap_p + cap_q == 0 {
            proposals[0].1 = "no significant autocorrelation after differencing".to_string();
        }

        let mut candidates: Vec<Candidate> = Vec::with_capacity(proposals.len());
        for (spec, rationale) in proposals {
            if candidates.iter().all(|c| c.spec != spec) {
                candidates.push(Candidate { spec, rationale });
            }
        }
        Ok(candidates)
    }
}

/// Number of consecutive significant lags starting at lag 1, capped.
fn leading_run(correlogram: &[CorrelogramEntry], cap: usize) -> usize {
    correlogram
        .iter()
        .skip(1)
        .take(cap)
        .take_while(|e| e.is_significant())
        .count()
}

/// Number of consecutive significant seasonal lags `s, 2s, …`, capped.
fn seasonal_run(correlogram: &[CorrelogramEntry], s: usize, cap: usize) -> usize {
    if s < 2 {
        return 0;
    }
    (1..=cap)
        .map_while(|k| correlogram.get(k * s))
        .take_while(|e| e.is_significant())
        .count()
}

fn significant_lags(correlogram: &[CorrelogramEntry]) -> Vec<usize> {
    correlogram
        .iter()
        .filter(|e| e.is_significant())
        .map(|e| e.lag)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::sarima::{simulate, SarimaCoefficients};
    use chrono::NaiveDate;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn entry(lag: usize, value: f64) -> CorrelogramEntry {
        CorrelogramEntry {
            lag,
            value,
            bound: 0.1,
        }
    }

    #[test]
    fn leading_run_stops_at_first_gap() {
        let c = vec![entry(0, 1.0), entry(1, 0.5), entry(2, 0.05), entry(3, 0.4)];
        assert_eq!(leading_run(&c, 2), 1);
        let c = vec![entry(0, 1.0), entry(1, -0.5), entry(2, 0.3), entry(3, 0.4)];
        assert_eq!(leading_run(&c, 2), 2);
    }

    #[test]
    fn seasonal_run_reads_multiples_of_period() {
        let mut c: Vec<CorrelogramEntry> = (0..=8).map(|lag| entry(lag, 0.0)).collect();
        c[4] = entry(4, -0.4);
        assert_eq!(seasonal_run(&c, 4, 2), 1);
        c[8] = entry(8, 0.3);
        assert_eq!(seasonal_run(&c, 4, 2), 2);
        assert_eq!(seasonal_run(&c, 4, 1), 1);
        assert_eq!(seasonal_run(&c, 1, 2), 0);
    }

    #[test]
    fn airline_process_proposes_seasonal_ma() {
        let spec = SarimaSpec::new(0, 1, 1, 0, 1, 1, 12).unwrap();
        let coefficients =
            SarimaCoefficients::new(&spec, vec![], vec![-0.6], vec![], vec![-0.7]).unwrap();
        let mut rng = StdRng::seed_from_u64(21);
        let values = simulate(&spec, &coefficients, 1.0, 600, 100, &mut rng).unwrap();
        let start = NaiveDate::from_ymd_opt(1960, 1, 1).unwrap();
        let ts = TimeSeries::monthly(start, values, 12).unwrap();

        let identification = OrderIdentifier::default().identify(&ts).unwrap();
        assert_eq!(identification.acf.len(), 37);
        assert!(identification.significant_acf_lags.contains(&1));
        assert!(identification.significant_acf_lags.contains(&12));

        let first = &identification.candidates[0].spec;
        assert_eq!((first.d, first.cap_d, first.s), (1, 1, 12));
        assert!(first.q >= 1);
        assert_eq!(first.cap_q, 1);
        let ma_only = identification
            .candidates
            .iter()
            .find(|c| c.spec.p == 0 && c.spec.cap_p == 0)
            .unwrap();
        assert!(ma_only.spec.q >= 1 && ma_only.spec.cap_q == 1);
    }

    #[test]
    fn candidates_are_unique() {
        let identifier = OrderIdentifier::default();
        let candidates = identifier.candidates(12, (0, 1), (0, 1)).unwrap();
        // The full proposal and the MA-only proposal coincide.
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].spec, SarimaSpec::new(0, 1, 1, 0, 1, 1, 12).unwrap());
    }

    #[test]
    fn white_noise_proposes_differencing_only() {
        let identifier = OrderIdentifier::new(IdentifierConfig::default().with_differencing(1, 0));
        let candidates = identifier.candidates(12, (0, 0), (0, 0)).unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].spec, SarimaSpec::arima(0, 1, 0).unwrap());
        assert!(candidates[0].rationale.contains("no significant"));
    }

    #[test]
    fn identification_needs_enough_data() {
        let start = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap();
        let ts = TimeSeries::monthly(start, (0..30).map(f64::from).collect(), 12).unwrap();
        assert!(OrderIdentifier::default().identify(&ts).is_err());
    }
}
