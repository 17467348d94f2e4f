//! SARIMA model specification.

use crate::error::{Result, SarimaError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Structure of a seasonal ARIMA model, (p, d, q)×(P, D, Q)ₛ.
///
/// Immutable once constructed; [`SarimaSpec::new`] rejects inconsistent
/// orders before any computation happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SarimaSpec {
    /// Non-seasonal AR order.
    pub p: usize,
    /// Non-seasonal differencing order.
    pub d: usize,
    /// Non-seasonal MA order.
    pub q: usize,
    /// Seasonal AR order.
    pub cap_p: usize,
    /// Seasonal differencing order.
    pub cap_d: usize,
    /// Seasonal MA order.
    pub cap_q: usize,
    /// Seasonal period.
    pub s: usize,
}

impl SarimaSpec {
    /// Create a validated specification.
    ///
    /// Orders are unsigned, so negativity is ruled out by the type. The
    /// remaining consistency rules are: any seasonal term requires `s >= 2`,
    /// and differencing orders above 2 are rejected as a likely input error.
    pub fn new(
        p: usize,
        d: usize,
        q: usize,
        cap_p: usize,
        cap_d: usize,
        cap_q: usize,
        s: usize,
    ) -> Result<Self> {
        let spec = Self {
            p,
            d,
            q,
            cap_p,
            cap_d,
            cap_q,
            s,
        };
        spec.validate()?;
        Ok(spec)
    }

    /// Non-seasonal ARIMA(p, d, q).
    pub fn arima(p: usize, d: usize, q: usize) -> Result<Self> {
        Self::new(p, d, q, 0, 0, 0, 0)
    }

    /// Re-check the consistency rules; used for specs deserialized from
    /// configuration.
    pub fn validate(&self) -> Result<()> {
        if self.has_seasonal_terms() && self.s < 2 {
            return Err(SarimaError::InvalidOrder(format!(
                "seasonal orders ({}, {}, {}) need a seasonal period of at least 2, got {}",
                self.cap_p, self.cap_d, self.cap_q, self.s
            )));
        }
        if self.d > 2 || self.cap_d > 2 {
            return Err(SarimaError::InvalidOrder(format!(
                "differencing orders above 2 are not supported (d = {}, D = {})",
                self.d, self.cap_d
            )));
        }
        Ok(())
    }

    /// Whether any of P, D, Q is non-zero.
    pub fn has_seasonal_terms(&self) -> bool {
        self.cap_p > 0 || self.cap_d > 0 || self.cap_q > 0
    }

    /// Observations lost to differencing, `d + D·s`.
    pub fn differencing_loss(&self) -> usize {
        self.d + self.cap_d * self.s
    }

    /// Degree of the expanded AR polynomial φ(B)Φ(Bˢ).
    pub fn ar_degree(&self) -> usize {
        self.p + self.cap_p * self.s
    }

    /// Degree of the expanded MA polynomial θ(B)Θ(Bˢ).
    pub fn ma_degree(&self) -> usize {
        self.q + self.cap_q * self.s
    }

    /// Number of ARMA coefficients, `p + q + P + Q`.
    pub fn num_coefficients(&self) -> usize {
        self.p + self.q + self.cap_p + self.cap_q
    }

    /// Shortest series the estimator accepts.
    pub fn min_observations(&self) -> usize {
        self.differencing_loss() + self.ar_degree().max(self.ma_degree()).max(1) + 1
    }
}

impl fmt::Display for SarimaSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SARIMA({},{},{})", self.p, self.d, self.q)?;
        if self.has_seasonal_terms() {
            write!(f, "({},{},{})[{}]", self.cap_p, self.cap_d, self.cap_q, self.s)?;
        }
        Ok(())
    }
}
