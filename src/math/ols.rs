//! Weighted least squares solver.
//!
//! Derived-parameter checks (the strain spectral index, the CMB imprint depth) reduce to
//! small regression problems of the form:
//!
//! ```text
//! minimize Σ w_i (y_i - x_i^T β)^2
//! ```
//!
//! Rows are scaled by `sqrt(w_i)` and the resulting ordinary least squares problem is solved
//! with SVD, which copes with tall design matrices and near-collinear columns.

use nalgebra::{DMatrix, DVector};

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    // Progressively looser singular-value cutoffs.
    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// Straight-line fit `y = a + b·x` with per-point weights.
///
/// Returns `(a, b)`, or `None` when fewer than two usable points remain (non-finite values
/// and non-positive weights are dropped) or the points share a single `x`.
pub fn fit_line(xs: &[f64], ys: &[f64], weights: &[f64]) -> Option<(f64, f64)> {
    let points: Vec<(f64, f64, f64)> = xs
        .iter()
        .zip(ys)
        .zip(weights)
        .map(|((&x, &y), &w)| (x, y, w))
        .filter(|&(x, y, w)| x.is_finite() && y.is_finite() && w.is_finite() && w > 0.0)
        .collect();
    if points.len() < 2 {
        return None;
    }
    let first_x = points[0].0;
    if points.iter().all(|&(x, _, _)| x == first_x) {
        return None;
    }

    let n = points.len();
    let mut design = DMatrix::<f64>::zeros(n, 2);
    let mut target = DVector::<f64>::zeros(n);
    for (i, &(x, y, w)) in points.iter().enumerate() {
        let sw = w.sqrt();
        design[(i, 0)] = sw;
        design[(i, 1)] = sw * x;
        target[i] = sw * y;
    }

    let beta = solve_least_squares(&design, &target)?;
    Some((beta[0], beta[1]))
}

/// Least-squares scale `c` in `y = c·t` for a fixed template `t`.
///
/// Non-finite points are dropped. Returns `None` when nothing usable remains or the template
/// is zero everywhere.
pub fn fit_scale(template: &[f64], ys: &[f64]) -> Option<f64> {
    let points: Vec<(f64, f64)> = template
        .iter()
        .zip(ys)
        .map(|(&t, &y)| (t, y))
        .filter(|&(t, y)| t.is_finite() && y.is_finite())
        .collect();
    if points.iter().all(|&(t, _)| t == 0.0) {
        return None;
    }

    let design = DMatrix::from_iterator(points.len(), 1, points.iter().map(|&(t, _)| t));
    let target = DVector::from_iterator(points.len(), points.iter().map(|&(_, y)| y));
    let beta = solve_least_squares(&design, &target)?;
    Some(beta[0])
}
