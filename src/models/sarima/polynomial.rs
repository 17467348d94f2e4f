//! Lag polynomials of a seasonal ARMA process.
//!
//! Conventions used throughout the crate:
//!
//! ```text
//! AR:  φ(z) = 1 - φ₁z - … - φₚzᵖ        Φ(z) = 1 - Φ₁z - … - Φ_P z^P
//! MA:  θ(z) = 1 + θ₁z + … + θ_q z^q      Θ(z) = 1 + Θ₁z + … + Θ_Q z^Q
//! ```
//!
//! Seasonal polynomials are evaluated at `zˢ`.

use crate::error::{Result, SarimaError};
use crate::models::sarima::SarimaSpec;
use serde::{Deserialize, Serialize};

/// Coefficients of the four lag polynomials of a SARIMA model.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SarimaCoefficients {
    /// φ₁…φₚ
    pub ar: Vec<f64>,
    /// θ₁…θ_q
    pub ma: Vec<f64>,
    /// Φ₁…Φ_P
    pub seasonal_ar: Vec<f64>,
    /// Θ₁…Θ_Q
    pub seasonal_ma: Vec<f64>,
}

impl SarimaCoefficients {
    /// Coefficients checked against the orders of `spec`.
    pub fn new(
        spec: &SarimaSpec,
        ar: Vec<f64>,
        ma: Vec<f64>,
        seasonal_ar: Vec<f64>,
        seasonal_ma: Vec<f64>,
    ) -> Result<Self> {
        let coefficients = Self {
            ar,
            ma,
            seasonal_ar,
            seasonal_ma,
        };
        coefficients.check_orders(spec)?;
        Ok(coefficients)
    }

    /// All-zero coefficients for `spec`.
    pub fn zeros(spec: &SarimaSpec) -> Self {
        Self {
            ar: vec![0.0; spec.p],
            ma: vec![0.0; spec.q],
            seasonal_ar: vec![0.0; spec.cap_p],
            seasonal_ma: vec![0.0; spec.cap_q],
        }
    }

    /// Error unless each polynomial has exactly the order `spec` asks for.
    pub fn check_orders(&self, spec: &SarimaSpec) -> Result<()> {
        let pairs = [
            ("AR", self.ar.len(), spec.p),
            ("MA", self.ma.len(), spec.q),
            ("seasonal AR", self.seasonal_ar.len(), spec.cap_p),
            ("seasonal MA", self.seasonal_ma.len(), spec.cap_q),
        ];
        for (name, got, expected) in pairs {
            if got != expected {
                return Err(SarimaError::InvalidOrder(format!(
                    "{name} polynomial has {got} coefficients but the specification needs {expected}"
                )));
            }
        }
        Ok(())
    }

    /// Split a flat `[φ, θ, Φ, Θ]` vector; the caller guarantees its length.
    pub(crate) fn from_flat(spec: &SarimaSpec, flat: &[f64]) -> Self {
        let (ar, rest) = flat.split_at(spec.p);
        let (ma, rest) = rest.split_at(spec.q);
        let (seasonal_ar, rest) = rest.split_at(spec.cap_p);
        Self {
            ar: ar.to_vec(),
            ma: ma.to_vec(),
            seasonal_ar: seasonal_ar.to_vec(),
            seasonal_ma: rest[..spec.cap_q].to_vec(),
        }
    }

    /// Flatten as `[φ, θ, Φ, Θ]`.
    pub(crate) fn to_flat(&self) -> Vec<f64> {
        self.ar
            .iter()
            .chain(&self.ma)
            .chain(&self.seasonal_ar)
            .chain(&self.seasonal_ma)
            .copied()
            .collect()
    }

    /// `c₁…` of the product `φ(z)Φ(zˢ) = 1 - Σ cₖzᵏ`.
    pub fn expanded_ar(&self, s: usize) -> Vec<f64> {
        let poly = multiply(&ar_poly(&self.ar, 1), &ar_poly(&self.seasonal_ar, s));
        poly[1..].iter().map(|c| -c).collect()
    }

    /// `m₁…` of the product `θ(z)Θ(zˢ) = 1 + Σ mₖzᵏ`.
    pub fn expanded_ma(&self, s: usize) -> Vec<f64> {
        let poly = multiply(&ma_poly(&self.ma, 1), &ma_poly(&self.seasonal_ma, s));
        poly[1..].to_vec()
    }

    /// AR weights `gₖ` of `yₜ = Σ gₖyₜ₋ₖ + εₜ + Σ mₖεₜ₋ₖ` once the
    /// differencing operators of `spec` are folded into the AR side.
    pub fn integrated_ar(&self, spec: &SarimaSpec) -> Vec<f64> {
        let arma = multiply(&ar_poly(&self.ar, 1), &ar_poly(&self.seasonal_ar, spec.s));
        let full = multiply(&arma, &differencing_poly(spec.d, spec.cap_d, spec.s));
        full[1..].iter().map(|a| -a).collect()
    }
}

/// Full coefficient vector `[1, -c₁ at lag, -c₂ at 2·lag, …]`.
fn ar_poly(coefficients: &[f64], lag: usize) -> Vec<f64> {
    let mut poly = vec![0.0; coefficients.len() * lag + 1];
    poly[0] = 1.0;
    for (i, c) in coefficients.iter().enumerate() {
        poly[(i + 1) * lag] = -c;
    }
    poly
}

/// Full coefficient vector `[1, m₁ at lag, m₂ at 2·lag, …]`.
fn ma_poly(coefficients: &[f64], lag: usize) -> Vec<f64> {
    let mut poly = vec![0.0; coefficients.len() * lag + 1];
    poly[0] = 1.0;
    for (i, c) in coefficients.iter().enumerate() {
        poly[(i + 1) * lag] = *c;
    }
    poly
}

/// Product of two polynomials given by ascending coefficients.
pub fn multiply(a: &[f64], b: &[f64]) -> Vec<f64> {
    if a.is_empty() || b.is_empty() {
        return vec![];
    }
    let mut out = vec![0.0; a.len() + b.len() - 1];
    for (i, x) in a.iter().enumerate() {
        if *x == 0.0 {
            continue;
        }
        for (j, y) in b.iter().enumerate() {
            out[i + j] += x * y;
        }
    }
    out
}

/// `(1 - z)^d (1 - zˢ)^D` as ascending coefficients.
pub fn differencing_poly(d: usize, cap_d: usize, s: usize) -> Vec<f64> {
    let mut poly = vec![1.0];
    for _ in 0..d {
        poly = multiply(&poly, &[1.0, -1.0]);
    }
    for _ in 0..cap_d {
        let mut seasonal = vec![0.0; s + 1];
        seasonal[0] = 1.0;
        seasonal[s] = -1.0;
        poly = multiply(&poly, &seasonal);
    }
    poly
}

/// Map unconstrained reals onto AR coefficients whose polynomial
/// `1 - Σ cₖzᵏ` has every root outside the unit circle.
///
/// Each input is squashed to a partial autocorrelation in (-1, 1) with
/// `tanh`, and the Durbin–Levinson recursion turns partial autocorrelations
/// into coefficients (Jones, 1980).
pub fn constrain_stationary(unconstrained: &[f64]) -> Vec<f64> {
    let mut coefficients: Vec<f64> = Vec::with_capacity(unconstrained.len());
    for &x in unconstrained {
        let pacf = x.tanh();
        let previous = coefficients.clone();
        let k = previous.len();
        for j in 0..k {
            coefficients[j] = previous[j] - pacf * previous[k - 1 - j];
        }
        coefficients.push(pacf);
    }
    coefficients
}

/// Inverse of [`constrain_stationary`].
///
/// Partial autocorrelations are clipped to ±0.99 so that coefficients on
/// or outside the admissible boundary still give a finite starting point.
pub fn unconstrain_stationary(coefficients: &[f64]) -> Vec<f64> {
    const LIMIT: f64 = 0.99;
    let mut current = coefficients.to_vec();
    let mut pacf = vec![0.0; coefficients.len()];
    for k in (0..coefficients.len()).rev() {
        let r = current[k].clamp(-LIMIT, LIMIT);
        pacf[k] = r;
        let denom = 1.0 - r * r;
        current = (0..k)
            .map(|j| (current[j] + r * current[k - 1 - j]) / denom)
            .collect();
    }
    pacf.iter().map(|r| r.atanh()).collect()
}

/// MA counterpart of [`constrain_stationary`]: `1 + Σ θₖzᵏ` is invertible
/// exactly when `1 - Σ (-θₖ)zᵏ` is stationary.
pub fn constrain_invertible(unconstrained: &[f64]) -> Vec<f64> {
    constrain_stationary(unconstrained)
        .into_iter()
        .map(|c| -c)
        .collect()
}

/// Inverse of [`constrain_invertible`].
pub fn unconstrain_invertible(coefficients: &[f64]) -> Vec<f64> {
    let negated: Vec<f64> = coefficients.iter().map(|c| -c).collect();
    unconstrain_stationary(&negated)
}
