//! Evaluation metrics for noised and filtered trajectories
//!
//! Residual moments, lag-1 autocorrelation and a least-squares VAR(1) fit
//! for checking what a noise model actually produced, plus a deviation
//! measure for comparing filtered output against ground truth.

use nalgebra::{DMatrix, Matrix2, Vector2};

use crate::filter::errors::TrajectoryError;
use crate::types::Observation;

/// Coefficients of a VAR(1) fitted by ordinary least squares
#[derive(Debug, Clone, PartialEq)]
pub struct Var1Fit {
    /// Constant term
    pub intercept: Vector2<f64>,
    /// Lag-1 coefficient matrix
    pub transition: Matrix2<f64>,
    /// Covariance of the regression residuals
    pub residual_covariance: Matrix2<f64>,
}

/// Per-row residual `observed - truth` in position
pub fn residuals(observed: &[Observation], truth: &[Observation]) -> Vec<Vector2<f64>> {
    observed
        .iter()
        .zip(truth)
        .map(|(o, t)| Vector2::new(o.x - t.x, o.y - t.y))
        .collect()
}

/// Mean absolute coordinate deviation between two aligned trajectories.
///
/// Averages `|Δx|` and `|Δy|` over every row.
pub fn mean_absolute_deviation(estimate: &[Observation], truth: &[Observation]) -> f64 {
    let n = estimate.len().min(truth.len());
    if n == 0 {
        return 0.0;
    }
    let total: f64 = estimate
        .iter()
        .zip(truth)
        .map(|(e, t)| (e.x - t.x).abs() + (e.y - t.y).abs())
        .sum();
    total / (2 * n) as f64
}

/// Sample mean of 2-D points
pub fn sample_mean(points: &[Vector2<f64>]) -> Vector2<f64> {
    if points.is_empty() {
        return Vector2::zeros();
    }
    points.iter().sum::<Vector2<f64>>() / points.len() as f64
}

/// Unbiased sample covariance of 2-D points
pub fn sample_covariance(points: &[Vector2<f64>]) -> Matrix2<f64> {
    if points.len() < 2 {
        return Matrix2::zeros();
    }
    let mean = sample_mean(points);
    let scatter: Matrix2<f64> = points
        .iter()
        .map(|p| (p - mean) * (p - mean).transpose())
        .sum();
    scatter / (points.len() - 1) as f64
}

/// Lag-1 autocorrelation of a scalar series
pub fn lag1_autocorrelation(series: &[f64]) -> f64 {
    let n = series.len();
    if n < 3 {
        return f64::NAN;
    }
    let mean = series.iter().sum::<f64>() / n as f64;
    let denom: f64 = series.iter().map(|v| (v - mean).powi(2)).sum();
    let numer: f64 = series
        .windows(2)
        .map(|w| (w[0] - mean) * (w[1] - mean))
        .sum();
    numer / denom
}

/// Fit `ε_i = c + Θ·ε_{i-1} + ω_i` by least squares.
pub fn fit_var1(series: &[Vector2<f64>]) -> Result<Var1Fit, TrajectoryError> {
    let n = series.len().saturating_sub(1);
    if n < 4 {
        return Err(TrajectoryError::numerical(format!(
            "VAR(1) fit needs at least 5 points, got {}",
            series.len()
        )));
    }

    // Design rows [1, ε_{i-1}]; targets ε_i
    let x = DMatrix::from_fn(n, 3, |i, j| match j {
        0 => 1.0,
        k => series[i][k - 1],
    });
    let y = DMatrix::from_fn(n, 2, |i, j| series[i + 1][j]);

    let xtx = x.transpose() * &x;
    let chol = xtx
        .cholesky()
        .ok_or_else(|| TrajectoryError::numerical("VAR(1) design matrix is singular"))?;
    let beta = chol.solve(&(x.transpose() * &y));

    let intercept = Vector2::new(beta[(0, 0)], beta[(0, 1)]);
    // Row j of Θ is the equation for component j
    let transition = Matrix2::new(
        beta[(1, 0)],
        beta[(2, 0)],
        beta[(1, 1)],
        beta[(2, 1)],
    );

    let fitted = &x * &beta;
    let resid = y - fitted;
    let dof = (n as f64 - 3.0).max(1.0);
    let cov = resid.transpose() * &resid / dof;
    let residual_covariance = Matrix2::new(cov[(0, 0)], cov[(0, 1)], cov[(1, 0)], cov[(1, 1)]);

    Ok(Var1Fit {
        intercept,
        transition,
        residual_covariance,
    })
}
