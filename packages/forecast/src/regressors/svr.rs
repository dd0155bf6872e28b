//! Epsilon support-vector regression with an RBF kernel.
//!
//! The dual problem is solved in terms of `beta = alpha - alpha*`:
//!
//! ```text
//! minimize   1/2 beta' K beta - y' beta + epsilon * |beta|_1
//! subject to sum(beta) = 0,  -C <= beta_i <= C
//! ```
//!
//! by sequential minimal optimization over pairs `(i, j)`, moving
//! `beta_i += t` and `beta_j -= t` so the equality constraint holds. Each
//! pair step minimizes the piecewise-quadratic objective in `t` exactly.
//! The bias is recovered from the KKT conditions afterwards.

use super::{Regressor, check_training_set, mean};
use crate::ForecastError;

/// Default box constraint.
pub const DEFAULT_C: f64 = 1.0;
/// Default width of the insensitive tube.
pub const DEFAULT_EPSILON: f64 = 0.1;

const MAX_SWEEPS: usize = 10_000;
const BOUND_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone)]
struct FittedSvr {
    support: Vec<f64>,
    beta: Vec<f64>,
    bias: f64,
    gamma: f64,
}

/// RBF-kernel epsilon-SVR with `gamma = 1 / Var(X)`.
#[derive(Debug, Clone)]
pub struct SupportVectorRegression {
    c: f64,
    epsilon: f64,
    fitted: Option<FittedSvr>,
}

impl SupportVectorRegression {
    #[must_use]
    pub const fn new(c: f64, epsilon: f64) -> Self {
        Self {
            c,
            epsilon,
            fitted: None,
        }
    }

    /// Dual coefficients `alpha - alpha*` of the fitted model.
    #[must_use]
    pub fn dual_coefficients(&self) -> Option<&[f64]> {
        self.fitted.as_ref().map(|f| f.beta.as_slice())
    }

    /// Intercept of the fitted model.
    #[must_use]
    pub fn bias(&self) -> Option<f64> {
        self.fitted.as_ref().map(|f| f.bias)
    }
}

impl Default for SupportVectorRegression {
    fn default() -> Self {
        Self::new(DEFAULT_C, DEFAULT_EPSILON)
    }
}

fn rbf(gamma: f64, a: f64, b: f64) -> f64 {
    (-gamma * (a - b).powi(2)).exp()
}

/// The "scale" heuristic: `1 / (n_features * Var(X))`, or 1 for constant
/// input.
fn scale_gamma(features: &[f64]) -> f64 {
    let m = mean(features);
    #[allow(clippy::cast_precision_loss)]
    let variance =
        features.iter().map(|x| (x - m).powi(2)).sum::<f64>() / features.len() as f64;
    if variance > 0.0 { 1.0 / variance } else { 1.0 }
}

/// Change of the dual objective when moving `beta_i += t`, `beta_j -= t`.
fn step_delta(
    t: f64,
    curvature: f64,
    slope: f64,
    epsilon: f64,
    beta_i: f64,
    beta_j: f64,
) -> f64 {
    let quadratic = (0.5 * curvature * t).mul_add(t, slope * t);
    let l1 = (beta_i + t).abs() - beta_i.abs() + (beta_j - t).abs() - beta_j.abs();
    epsilon.mul_add(l1, quadratic)
}

/// Finds the step `t` minimizing the pair objective and the resulting
/// change. Returns `None` when no step improves the objective.
fn best_pair_step(
    curvature: f64,
    slope: f64,
    epsilon: f64,
    c: f64,
    beta_i: f64,
    beta_j: f64,
) -> Option<(f64, f64)> {
    let lo = (-c - beta_i).max(beta_j - c);
    let hi = (c - beta_i).min(beta_j + c);
    if hi - lo <= 0.0 {
        return None;
    }

    let mut points = vec![lo, hi];
    for kink in [-beta_i, beta_j] {
        if kink > lo && kink < hi {
            points.push(kink);
        }
    }
    points.sort_by(f64::total_cmp);

    let mut best: Option<(f64, f64)> = None;
    let mut consider = |t: f64| {
        let delta = step_delta(t, curvature, slope, epsilon, beta_i, beta_j);
        if best.is_none_or(|(_, d)| delta < d) {
            best = Some((t, delta));
        }
    };

    for window in points.windows(2) {
        let (left, right) = (window[0], window[1]);
        consider(left);
        consider(right);

        if curvature > 0.0 {
            // Signs of both l1 terms are fixed inside the segment.
            let mid = 0.5 * (left + right);
            let sign_i = (beta_i + mid).signum();
            let sign_j = (beta_j - mid).signum();
            let linear = epsilon.mul_add(sign_i - sign_j, slope);
            consider((-linear / curvature).clamp(left, right));
        }
    }

    best.filter(|&(t, delta)| delta < -1e-15 && t != 0.0)
}

/// Solves the dual problem. Returns `(beta, gradient)` where
/// `gradient = K beta - y`.
fn solve_dual(
    kernel: &[Vec<f64>],
    targets: &[f64],
    c: f64,
    epsilon: f64,
) -> (Vec<f64>, Vec<f64>) {
    let n = targets.len();
    let mut beta = vec![0.0; n];
    let mut gradient: Vec<f64> = targets.iter().map(|y| -y).collect();
    let mut objective = 0.0_f64;

    for sweep in 0..MAX_SWEEPS {
        let mut improvement = 0.0;

        for i in 0..n {
            for j in (i + 1)..n {
                let curvature = (kernel[i][i] + kernel[j][j] - 2.0 * kernel[i][j]).max(0.0);
                let slope = gradient[i] - gradient[j];

                let Some((t, delta)) =
                    best_pair_step(curvature, slope, epsilon, c, beta[i], beta[j])
                else {
                    continue;
                };

                beta[i] += t;
                beta[j] -= t;
                for (k, g) in gradient.iter_mut().enumerate() {
                    *g += t * (kernel[k][i] - kernel[k][j]);
                }
                objective += delta;
                improvement -= delta;
            }
        }

        if improvement <= 1e-12 * (1.0 + objective.abs()) {
            log::debug!("SVR converged after {} sweeps", sweep + 1);
            break;
        }
    }

    (beta, gradient)
}

/// Recovers the intercept from the KKT conditions.
///
/// Free support vectors pin it exactly; otherwise it is the midpoint of the
/// interval allowed by the bounded and inactive samples.
fn solve_bias(beta: &[f64], gradient: &[f64], c: f64, epsilon: f64) -> f64 {
    let mut free = Vec::new();
    let mut lower = f64::NEG_INFINITY;
    let mut upper = f64::INFINITY;

    for (&b, &g) in beta.iter().zip(gradient) {
        // y_i - (K beta)_i
        let residual = -g;
        if b.abs() <= BOUND_TOLERANCE {
            lower = lower.max(residual - epsilon);
            upper = upper.min(residual + epsilon);
        } else if b >= c - BOUND_TOLERANCE {
            upper = upper.min(residual - epsilon);
        } else if b <= -c + BOUND_TOLERANCE {
            lower = lower.max(residual + epsilon);
        } else {
            free.push(epsilon.mul_add(-b.signum(), residual));
        }
    }

    if !free.is_empty() {
        return mean(&free);
    }

    match (lower.is_finite(), upper.is_finite()) {
        (true, true) => 0.5 * (lower + upper),
        (true, false) => lower,
        (false, true) => upper,
        (false, false) => 0.0,
    }
}

impl Regressor for SupportVectorRegression {
    fn fit(&mut self, features: &[f64], targets: &[f64]) -> Result<(), ForecastError> {
        check_training_set(features, targets)?;

        let gamma = scale_gamma(features);
        let kernel: Vec<Vec<f64>> = features
            .iter()
            .map(|&a| features.iter().map(|&b| rbf(gamma, a, b)).collect())
            .collect();

        let (beta, gradient) = solve_dual(&kernel, targets, self.c, self.epsilon);
        let bias = solve_bias(&beta, &gradient, self.c, self.epsilon);

        log::debug!(
            "SVR fit: gamma={gamma} bias={bias} support_vectors={}",
            beta.iter().filter(|b| b.abs() > BOUND_TOLERANCE).count()
        );

        self.fitted = Some(FittedSvr {
            support: features.to_vec(),
            beta,
            bias,
            gamma,
        });
        Ok(())
    }

    fn predict(&self, features: &[f64]) -> Result<Vec<f64>, ForecastError> {
        let fitted = self.fitted.as_ref().ok_or(ForecastError::NotFitted)?;
        Ok(features
            .iter()
            .map(|&x| {
                fitted
                    .support
                    .iter()
                    .zip(&fitted.beta)
                    .map(|(&s, &b)| b * rbf(fitted.gamma, s, x))
                    .sum::<f64>()
                    + fitted.bias
            })
            .collect())
    }
}
