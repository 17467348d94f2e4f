//! Stationarity and invertibility of fitted lag polynomials.

use crate::models::sarima::{SarimaCoefficients, SarimaSpec};
use nalgebra::DMatrix;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// One of the four lag polynomials of a SARIMA model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum PolynomialKind {
    /// Non-seasonal AR, φ(B).
    Ar,
    /// Seasonal AR, Φ(Bˢ).
    SeasonalAr,
    /// Non-seasonal MA, θ(B).
    Ma,
    /// Seasonal MA, Θ(Bˢ).
    SeasonalMa,
}

impl PolynomialKind {
    /// AR polynomials must be stationary, MA polynomials invertible.
    pub fn is_autoregressive(&self) -> bool {
        matches!(self, PolynomialKind::Ar | PolynomialKind::SeasonalAr)
    }
}

impl fmt::Display for PolynomialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PolynomialKind::Ar => "AR",
            PolynomialKind::SeasonalAr => "seasonal AR",
            PolynomialKind::Ma => "MA",
            PolynomialKind::SeasonalMa => "seasonal MA",
        };
        f.write_str(name)
    }
}

/// Moduli of the inverse roots of `1 - Σ cₖzᵏ`.
///
/// These are the eigenvalue moduli of the companion matrix with first row
/// `c`; every root of the polynomial lies outside the unit circle exactly
/// when every inverse root lies inside it.
pub fn inverse_root_moduli(ar: &[f64]) -> Vec<f64> {
    match ar.len() {
        0 => vec![],
        1 => vec![ar[0].abs()],
        n => {
            let companion = DMatrix::<f64>::from_fn(n, n, |i, j| {
                if i == 0 {
                    ar[j]
                } else if i == j + 1 {
                    1.0
                } else {
                    0.0
                }
            });
            companion
                .complex_eigenvalues()
                .iter()
                .map(|lambda| lambda.norm())
                .collect()
        }
    }
}

/// True when `1 - Σ cₖzᵏ` has every root strictly outside the unit circle.
///
/// A coefficient of exactly ±1 in a first-order polynomial puts the root on
/// the circle and fails the check.
pub fn is_stationary(ar: &[f64]) -> bool {
    inverse_root_moduli(ar).iter().all(|m| *m < 1.0)
}

/// True when `1 + Σ θₖzᵏ` has every root strictly outside the unit circle.
pub fn is_invertible(ma: &[f64]) -> bool {
    let negated: Vec<f64> = ma.iter().map(|c| -c).collect();
    is_stationary(&negated)
}

/// Check each polynomial present in `spec` separately.
///
/// AR entries report stationarity and MA entries invertibility. Polynomials
/// of order zero are left out of the map.
pub fn check_stationarity_invertibility(
    spec: &SarimaSpec,
    coefficients: &SarimaCoefficients,
) -> BTreeMap<PolynomialKind, bool> {
    let mut checks = BTreeMap::new();
    if spec.p > 0 {
        checks.insert(PolynomialKind::Ar, is_stationary(&coefficients.ar));
    }
    if spec.cap_p > 0 {
        checks.insert(
            PolynomialKind::SeasonalAr,
            is_stationary(&coefficients.seasonal_ar),
        );
    }
    if spec.q > 0 {
        checks.insert(PolynomialKind::Ma, is_invertible(&coefficients.ma));
    }
    if spec.cap_q > 0 {
        checks.insert(
            PolynomialKind::SeasonalMa,
            is_invertible(&coefficients.seasonal_ma),
        );
    }
    checks
}
