//! Derivative-free minimisation and numerical curvature.
//!
//! The likelihood surfaces in this crate are smooth but only available
//! through a recursive filter, so the estimator relies on a Nelder–Mead
//! simplex search for the optimum and on central finite differences for the
//! observed information matrix.

/// Result of a Nelder–Mead run.
#[derive(Debug, Clone)]
pub struct NelderMeadResult {
    /// Best point found.
    pub optimal_point: Vec<f64>,
    /// Objective value at `optimal_point`.
    pub optimal_value: f64,
    /// Number of iterations performed.
    pub iterations: usize,
    /// Whether the tolerance was met before the iteration cap.
    pub converged: bool,
}

/// Configuration for Nelder–Mead optimisation.
#[derive(Debug, Clone)]
pub struct NelderMeadConfig {
    /// Maximum number of iterations.
    pub max_iter: usize,
    /// Convergence tolerance on the spread of objective values. A simplex
    /// whose diameter falls below it is also converged.
    pub tolerance: f64,
    /// Largest simplex diameter accepted together with a small value
    /// spread.
    pub x_tolerance: f64,
    /// Reflection coefficient.
    pub alpha: f64,
    /// Expansion coefficient.
    pub gamma: f64,
    /// Contraction coefficient.
    pub rho: f64,
    /// Shrinkage coefficient.
    pub sigma: f64,
    /// Initial simplex step, relative to the magnitude of each coordinate
    /// (absolute for coordinates near zero).
    pub initial_step: f64,
}

impl Default for NelderMeadConfig {
    fn default() -> Self {
        Self {
            max_iter: 2000,
            tolerance: 1e-9,
            x_tolerance: 1e-6,
            alpha: 1.0,
            gamma: 2.0,
            rho: 0.5,
            sigma: 0.5,
            initial_step: 0.1,
        }
    }
}

impl NelderMeadConfig {
    /// Set the iteration cap.
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Set the convergence tolerance.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Set the simplex diameter that must accompany a small value spread.
    pub fn with_x_tolerance(mut self, x_tolerance: f64) -> Self {
        self.x_tolerance = x_tolerance;
        self
    }

    /// Set the initial simplex step.
    pub fn with_initial_step(mut self, initial_step: f64) -> Self {
        self.initial_step = initial_step;
        self
    }
}

/// Minimise `objective` starting from `initial`.
///
/// Non-finite objective values are treated as `+∞`, so the objective can
/// signal an inadmissible point by returning NaN or infinity.
///
/// # Example
/// ```
/// use sarima_forecast::utils::optimization::{nelder_mead, NelderMeadConfig};
///
/// let result = nelder_mead(
///     |x| (x[0] - 2.0).powi(2) + (x[1] + 1.0).powi(2),
///     &[0.0, 0.0],
///     &NelderMeadConfig::default(),
/// );
/// assert!(result.converged);
/// assert!((result.optimal_point[0] - 2.0).abs() < 1e-3);
/// assert!((result.optimal_point[1] + 1.0).abs() < 1e-3);
/// ```
pub fn nelder_mead<F>(objective: F, initial: &[f64], config: &NelderMeadConfig) -> NelderMeadResult
where
    F: Fn(&[f64]) -> f64,
{
    let n = initial.len();
    let eval = |x: &[f64]| {
        let v = objective(x);
        if v.is_finite() {
            v
        } else {
            f64::INFINITY
        }
    };

    if n == 0 {
        return NelderMeadResult {
            optimal_point: vec![],
            optimal_value: eval(initial),
            iterations: 0,
            converged: true,
        };
    }

    let mut simplex: Vec<(Vec<f64>, f64)> = Vec::with_capacity(n + 1);
    simplex.push((initial.to_vec(), eval(initial)));
    for i in 0..n {
        let mut vertex = initial.to_vec();
        vertex[i] += if initial[i].abs() > 1e-8 {
            config.initial_step * initial[i].abs()
        } else {
            config.initial_step
        };
        let value = eval(&vertex);
        simplex.push((vertex, value));
    }

    let mut iterations = 0;
    let mut converged = false;

    while iterations < config.max_iter {
        iterations += 1;
        simplex.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

        let best = simplex[0].1;
        let worst = simplex[n].1;
        let second_worst = simplex[n - 1].1;

        let centroid = centroid_without_last(&simplex);
        let diameter = simplex
            .iter()
            .map(|(v, _)| distance(v, &centroid))
            .fold(0.0, f64::max);
        let flat = best.is_finite() && worst - best < config.tolerance;
        if (flat && diameter < config.x_tolerance) || diameter < config.tolerance {
            converged = true;
            break;
        }

        let reflected = towards(&centroid, &simplex[n].0, -config.alpha);
        let reflected_value = eval(&reflected);

        if reflected_value < best {
            let expanded = towards(&centroid, &reflected, config.gamma);
            let expanded_value = eval(&expanded);
            simplex[n] = if expanded_value < reflected_value {
                (expanded, expanded_value)
            } else {
                (reflected, reflected_value)
            };
            continue;
        }

        if reflected_value < second_worst {
            simplex[n] = (reflected, reflected_value);
            continue;
        }

        let (contracted, contracted_value) = if reflected_value < worst {
            let c = towards(&centroid, &reflected, config.rho);
            let v = eval(&c);
            (c, v)
        } else {
            let c = towards(&centroid, &simplex[n].0, config.rho);
            let v = eval(&c);
            (c, v)
        };
        if contracted_value < worst.min(reflected_value) {
            simplex[n] = (contracted, contracted_value);
            continue;
        }

        let anchor = simplex[0].0.clone();
        for vertex in simplex.iter_mut().skip(1) {
            let shrunk = towards(&anchor, &vertex.0, config.sigma);
            let value = eval(&shrunk);
            *vertex = (shrunk, value);
        }
    }

    let (optimal_point, optimal_value) = simplex
        .into_iter()
        .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
        .unwrap_or_else(|| (initial.to_vec(), f64::INFINITY));

    NelderMeadResult {
        optimal_point,
        optimal_value,
        iterations,
        converged,
    }
}

/// Central finite-difference Hessian of `f` at `x`.
///
/// Step sizes are `step * max(|x_i|, 0.1)`. Returns `None` when any
/// evaluation is non-finite.
pub fn numerical_hessian<F>(f: F, x: &[f64], step: f64) -> Option<Vec<Vec<f64>>>
where
    F: Fn(&[f64]) -> f64,
{
    let n = x.len();
    let h: Vec<f64> = x.iter().map(|xi| step * xi.abs().max(0.1)).collect();
    let f0 = f(x);
    if !f0.is_finite() {
        return None;
    }

    let at = |offsets: &[(usize, f64)]| {
        let mut point = x.to_vec();
        for &(i, delta) in offsets {
            point[i] += delta;
        }
        f(&point)
    };

    let mut hessian = vec![vec![0.0; n]; n];
    for i in 0..n {
        let plus = at(&[(i, h[i])]);
        let minus = at(&[(i, -h[i])]);
        let value = (plus - 2.0 * f0 + minus) / (h[i] * h[i]);
        if !value.is_finite() {
            return None;
        }
        hessian[i][i] = value;

        for j in 0..i {
            let pp = at(&[(i, h[i]), (j, h[j])]);
            let pm = at(&[(i, h[i]), (j, -h[j])]);
            let mp = at(&[(i, -h[i]), (j, h[j])]);
            let mm = at(&[(i, -h[i]), (j, -h[j])]);
            let value = (pp - pm - mp + mm) / (4.0 * h[i] * h[j]);
            if !value.is_finite() {
                return None;
            }
            hessian[i][j] = value;
            hessian[j][i] = value;
        }
    }
    Some(hessian)
}

fn centroid_without_last(simplex: &[(Vec<f64>, f64)]) -> Vec<f64> {
    let count = simplex.len() - 1;
    let dim = simplex[0].0.len();
    let mut centroid = vec![0.0; dim];
    for (vertex, _) in &simplex[..count] {
        for (c, v) in centroid.iter_mut().zip(vertex) {
            *c += v;
        }
    }
    centroid.iter_mut().for_each(|c| *c /= count as f64);
    centroid
}

/// `from + t * (to - from)`.
fn towards(from: &[f64], to: &[f64], t: f64) -> Vec<f64> {
    from.iter().zip(to).map(|(a, b)| a + t * (b - a)).collect()
}

fn distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt()
}
