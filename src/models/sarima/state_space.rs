//! Exact Gaussian likelihood of a stationary ARMA process via the Kalman filter.
//!
//! The differenced series is written in Harvey's state space form
//!
//! ```text
//! αₜ₊₁ = T αₜ + R εₜ₊₁      wₜ = Z αₜ
//! ```
//!
//! where `T` holds the expanded AR coefficients in its first column and an
//! identity on the superdiagonal, `R = [1, m₁, …, m_{r-1}]` and `Z = e₁`.
//! The filter starts from the unconditional state covariance, so the first
//! observations are not dropped as they are under conditional least squares.

use nalgebra::DMatrix;

/// Largest number of doubling steps for the stationary covariance.
const MAX_DOUBLING_STEPS: usize = 60;

/// Harvey representation of an ARMA process with unit innovation variance.
#[derive(Debug, Clone)]
pub(crate) struct ArmaStateSpace {
    /// First column of `T`, padded to the state dimension.
    phi: Vec<f64>,
    /// Selection vector `R`, padded to the state dimension.
    selection: Vec<f64>,
}

/// Output of one pass of the filter over the data.
#[derive(Debug, Clone)]
pub(crate) struct KalmanOutput {
    /// One-step prediction errors `vₜ`.
    pub innovations: Vec<f64>,
    /// Innovation variances `Fₜ` in units of σ².
    pub variances: Vec<f64>,
    sum_sq: f64,
    sum_log_f: f64,
}

impl KalmanOutput {
    /// Maximum likelihood innovation variance, `Σ vₜ²/Fₜ / n`.
    pub fn sigma2(&self) -> f64 {
        self.sum_sq / self.innovations.len() as f64
    }

    /// Gaussian log-likelihood with σ² concentrated out.
    pub fn log_likelihood(&self) -> f64 {
        self.log_likelihood_at(self.sigma2().max(f64::MIN_POSITIVE))
    }

    /// Log-likelihood at a given σ².
    pub fn log_likelihood_at(&self, sigma2: f64) -> f64 {
        let n = self.innovations.len() as f64;
        -0.5 * n * (2.0 * std::f64::consts::PI * sigma2).ln()
            - 0.5 * self.sum_log_f
            - 0.5 * self.sum_sq / sigma2
    }
}

impl ArmaStateSpace {
    /// Build from expanded AR coefficients `c` (`1 - Σ cₖzᵏ`) and MA
    /// coefficients `m` (`1 + Σ mₖzᵏ`).
    pub fn new(ar: &[f64], ma: &[f64]) -> Self {
        let dim = ar.len().max(ma.len() + 1);
        let mut phi = vec![0.0; dim];
        phi[..ar.len()].copy_from_slice(ar);
        let mut selection = vec![0.0; dim];
        selection[0] = 1.0;
        selection[1..=ma.len()].copy_from_slice(ma);
        Self { phi, selection }
    }

    /// State dimension `r = max(p', q' + 1)`.
    pub fn dim(&self) -> usize {
        self.phi.len()
    }

    /// Solve `P = T P Tᵀ + R Rᵀ` by the doubling algorithm.
    ///
    /// Returns `None` when the iteration does not settle, which happens
    /// exactly when the AR part is not stationary.
    pub fn stationary_covariance(&self) -> Option<DMatrix<f64>> {
        let r = self.dim();
        let mut transition = DMatrix::<f64>::zeros(r, r);
        for i in 0..r {
            transition[(i, 0)] = self.phi[i];
            if i + 1 < r {
                transition[(i, i + 1)] = 1.0;
            }
        }
        let mut cov = DMatrix::<f64>::from_fn(r, r, |i, j| self.selection[i] * self.selection[j]);

        for _ in 0..MAX_DOUBLING_STEPS {
            let increment = &transition * &cov * transition.transpose();
            let change = increment.amax();
            cov += increment;
            if !change.is_finite() {
                return None;
            }
            if change <= 1e-12 * cov.amax().max(1.0) {
                return Some(cov);
            }
            transition = &transition * &transition;
        }
        None
    }

    /// Run the filter over `w`, which must already be differenced and
    /// centred.
    pub fn filter(&self, w: &[f64]) -> Option<KalmanOutput> {
        let r = self.dim();
        let mut p = self.stationary_covariance()?;
        let mut a = vec![0.0; r];
        let mut gain = vec![0.0; r];
        let mut m = DMatrix::<f64>::zeros(r, r);

        let mut innovations = Vec::with_capacity(w.len());
        let mut variances = Vec::with_capacity(w.len());
        let mut sum_sq = 0.0;
        let mut sum_log_f = 0.0;

        for &y in w {
            let v = y - a[0];
            let f = p[(0, 0)];
            if !f.is_finite() || f <= 0.0 {
                return None;
            }
            innovations.push(v);
            variances.push(f);
            sum_sq += v * v / f;
            sum_log_f += f.ln();

            // Measurement update.
            for i in 0..r {
                gain[i] = p[(i, 0)] / f;
                a[i] += gain[i] * v;
            }
            for j in 0..r {
                let pj0 = gain[j] * f;
                for i in 0..r {
                    p[(i, j)] -= gain[i] * pj0;
                }
            }

            // Time update, exploiting the companion structure of T.
            let a0 = a[0];
            for i in 0..r {
                a[i] = self.phi[i] * a0 + if i + 1 < r { a[i + 1] } else { 0.0 };
            }
            for j in 0..r {
                for i in 0..r {
                    let below = if i + 1 < r { p[(i + 1, j)] } else { 0.0 };
                    m[(i, j)] = self.phi[i] * p[(0, j)] + below;
                }
            }
            for j in 0..r {
                for i in 0..=j {
                    let right = if j + 1 < r { m[(i, j + 1)] } else { 0.0 };
                    let value =
                        self.phi[j] * m[(i, 0)] + right + self.selection[i] * self.selection[j];
                    p[(i, j)] = value;
                    p[(j, i)] = value;
                }
            }
        }

        Some(KalmanOutput {
            innovations,
            variances,
            sum_sq,
            sum_log_f,
        })
    }
}
