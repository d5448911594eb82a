//! Savitzky-Golay smoother, end-point variant.
//!
//! For each row i >= L-1 a least-squares polynomial of degree d is fitted to
//! the trailing window V[i-L+1..=i] and evaluated at the window's last point.
//! The fit only ever sees rows up to i, so earlier output never changes when
//! rows are appended.
//!
//! The smoothing weights are the same for every row. They are found once by
//! solving the normal equations with x scaled onto [-1, 0] (last point at 0).

pub fn calculate_savgol(values: &[f64], window: usize, degree: usize) -> Option<Vec<f64>> {
    let mut out = vec![f64::NAN; values.len()];
    if window == 0 || values.len() < window {
        return Some(out);
    }

    let weights = endpoint_weights(window, degree)?;
    for i in (window - 1)..values.len() {
        let start = i + 1 - window;
        out[i] = values[start..=i]
            .iter()
            .zip(&weights)
            .map(|(v, w)| v * w)
            .sum();
    }
    Some(out)
}

/// Weights c such that sum(c[j] * V[j]) is the fitted value at the last point.
fn endpoint_weights(window: usize, degree: usize) -> Option<Vec<f64>> {
    if degree >= window {
        return None;
    }
    let scale = (window - 1).max(1) as f64;
    let xs: Vec<f64> = (0..window)
        .map(|j| (j as f64 - (window - 1) as f64) / scale)
        .collect();

    let terms = degree + 1;
    let mut normal = vec![vec![0.0; terms]; terms];
    for (p, row) in normal.iter_mut().enumerate() {
        for (q, cell) in row.iter_mut().enumerate() {
            *cell = xs.iter().map(|x| x.powi((p + q) as i32)).sum();
        }
    }

    // First row of the inverse: solve A u = e0 (A is symmetric).
    let mut unit = vec![0.0; terms];
    unit[0] = 1.0;
    let u = solve_linear(normal, unit)?;

    Some(
        xs.iter()
            .map(|x| u.iter().enumerate().map(|(q, uq)| uq * x.powi(q as i32)).sum())
            .collect(),
    )
}

/// Gaussian elimination with partial pivoting. `None` when singular.
fn solve_linear(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Option<Vec<f64>> {
    let n = b.len();
    for col in 0..n {
        let pivot = (col..n).max_by(|&r1, &r2| a[r1][col].abs().total_cmp(&a[r2][col].abs()))?;
        if a[pivot][col].abs() < 1e-12 {
            return None;
        }
        a.swap(col, pivot);
        b.swap(col, pivot);

        for row in (col + 1)..n {
            let f = a[row][col] / a[col][col];
            if f == 0.0 {
                continue;
            }
            for k in col..n {
                a[row][k] -= f * a[col][k];
            }
            b[row] -= f * b[col];
        }
    }

    let mut x = vec![0.0; n];
    for row in (0..n).rev() {
        let tail: f64 = ((row + 1)..n).map(|k| a[row][k] * x[k]).sum();
        x[row] = (b[row] - tail) / a[row][row];
    }
    Some(x)
}
