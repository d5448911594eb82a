//! Whittaker-Eilers smoother.
//!
//! Minimises |y - z|^2 + lambda * |D z|^2 where D is the order-d difference
//! operator, i.e. solves (I + lambda * D'D) z = y. The system matrix is
//! symmetric positive definite with half-bandwidth d, so it is factored with
//! a banded Cholesky decomposition.
//!
//! The optimal variant scans lambda over 10^-2 ..= 10^8 (half-decade steps)
//! and keeps the value with the lowest leave-one-out cross-validation error:
//!
//!   cv = sqrt(mean(((y - z) / (1 - h))^2)),  h = diag((I + lambda * D'D)^-1)
//!
//! The hat diagonal comes from a selected inversion of the banded factor,
//! which only touches entries inside the band.
//!
//! This is a global smoother: every output value depends on every input
//! value, so appending rows may revise earlier output.

use tracing::debug;

const LOG_LAMBDA_MIN: f64 = -2.0;
const LOG_LAMBDA_STEP: f64 = 0.5;
const LOG_LAMBDA_STEPS: usize = 21;

pub fn smooth(values: &[f64], lambda: f64, order: usize) -> Option<Vec<f64>> {
    if values.len() <= order {
        return None;
    }
    let chol = BandedCholesky::factor(penalty_band(values.len(), lambda, order), order)?;
    Some(chol.solve(values))
}

/// Smooth with the cross-validated lambda. Returns the series and the lambda used.
pub fn smooth_optimal(values: &[f64], order: usize) -> Option<(Vec<f64>, f64)> {
    if values.len() <= order {
        return None;
    }

    let mut best: Option<(f64, Vec<f64>, f64)> = None;
    for step in 0..LOG_LAMBDA_STEPS {
        let lambda = 10f64.powf(LOG_LAMBDA_MIN + LOG_LAMBDA_STEP * step as f64);
        let Some(chol) = BandedCholesky::factor(penalty_band(values.len(), lambda, order), order)
        else {
            continue;
        };
        let z = chol.solve(values);
        let cv = loo_error(values, &z, &chol.inverse_diagonal());
        if !cv.is_finite() {
            continue;
        }
        if best.as_ref().is_none_or(|(best_cv, _, _)| cv < *best_cv) {
            best = Some((cv, z, lambda));
        }
    }

    best.map(|(cv, z, lambda)| {
        debug!(lambda, cv, rows = values.len(), "selected Whittaker lambda");
        (z, lambda)
    })
}

fn loo_error(y: &[f64], z: &[f64], hat: &[f64]) -> f64 {
    let mut sum = 0.0;
    for ((yi, zi), hi) in y.iter().zip(z).zip(hat) {
        let leverage = 1.0 - hi;
        if leverage <= f64::EPSILON {
            return f64::INFINITY;
        }
        let r = (yi - zi) / leverage;
        sum += r * r;
    }
    (sum / y.len() as f64).sqrt()
}

/// Signed binomial coefficients of the order-d forward difference.
fn difference_coefficients(order: usize) -> Vec<f64> {
    let mut binom = 1.0;
    let mut coeffs = Vec::with_capacity(order + 1);
    for j in 0..=order {
        if j > 0 {
            binom = binom * (order + 1 - j) as f64 / j as f64;
        }
        // c_j = (-1)^(d-j) * C(d, j)
        let sign = if (order - j) % 2 == 0 { 1.0 } else { -1.0 };
        coeffs.push(sign * binom);
    }
    coeffs
}

/// Lower band of I + lambda * D'D: `band[i][k]` holds entry (i, i-k).
fn penalty_band(n: usize, lambda: f64, order: usize) -> Vec<Vec<f64>> {
    let c = difference_coefficients(order);
    let mut band = vec![vec![0.0; order + 1]; n];
    for k in 0..n.saturating_sub(order) {
        for p in 0..=order {
            for q in 0..=p {
                band[k + p][p - q] += lambda * c[p] * c[q];
            }
        }
    }
    for row in band.iter_mut() {
        row[0] += 1.0;
    }
    band
}

/// Cholesky factor L of a symmetric banded matrix; `l[i][k]` holds L(i, i-k).
struct BandedCholesky {
    bandwidth: usize,
    l: Vec<Vec<f64>>,
}

impl BandedCholesky {
    /// `None` when the matrix is not positive definite.
    fn factor(band: Vec<Vec<f64>>, bandwidth: usize) -> Option<Self> {
        let n = band.len();
        let mut l = vec![vec![0.0; bandwidth + 1]; n];
        for i in 0..n {
            let lo = i.saturating_sub(bandwidth);
            for j in lo..=i {
                let mut sum = band[i][i - j];
                for m in lo..j {
                    sum -= l[i][i - m] * l[j][j - m];
                }
                if i == j {
                    if !(sum > 0.0) {
                        return None;
                    }
                    l[i][0] = sum.sqrt();
                } else {
                    l[i][i - j] = sum / l[j][0];
                }
            }
        }
        Some(Self { bandwidth, l })
    }

    fn len(&self) -> usize {
        self.l.len()
    }

    fn solve(&self, rhs: &[f64]) -> Vec<f64> {
        let n = self.len();
        let d = self.bandwidth;

        let mut w = vec![0.0; n];
        for i in 0..n {
            let lo = i.saturating_sub(d);
            let acc: f64 = (lo..i).map(|m| self.l[i][i - m] * w[m]).sum();
            w[i] = (rhs[i] - acc) / self.l[i][0];
        }

        let mut z = vec![0.0; n];
        for i in (0..n).rev() {
            let hi = (i + d).min(n - 1);
            let acc: f64 = ((i + 1)..=hi).map(|k| self.l[k][k - i] * z[k]).sum();
            z[i] = (w[i] - acc) / self.l[i][0];
        }
        z
    }

    /// Diagonal of the inverse via the Takahashi recurrence
    /// S(i,j) = (delta(i,j) / L(i,i) - sum_k L(k,i) S(k,j)) / L(i,i)
    /// restricted to the band, walking rows from the bottom.
    fn inverse_diagonal(&self) -> Vec<f64> {
        let n = self.len();
        let d = self.bandwidth;
        // sigma[i][k] holds S(i, i+k)
        let mut sigma = vec![vec![0.0; d + 1]; n];
        let entry = |sigma: &[Vec<f64>], a: usize, b: usize| {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            sigma[lo][hi - lo]
        };

        for i in (0..n).rev() {
            let hi = (i + d).min(n - 1);
            for j in (i..=hi).rev() {
                let acc: f64 = ((i + 1)..=hi)
                    .map(|k| self.l[k][k - i] * entry(&sigma, k, j))
                    .sum();
                let delta = if i == j { 1.0 / self.l[i][0] } else { 0.0 };
                sigma[i][j - i] = (delta - acc) / self.l[i][0];
            }
        }
        sigma.iter().map(|row| row[0]).collect()
    }
}
