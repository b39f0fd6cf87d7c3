//! Linear algebra utilities
//!
//! Shape validation, strict Cholesky factorization, real matrix powers and
//! Gaussian densities used by the noise models and the Kalman engine.

use nalgebra::{Complex, ComplexField, DMatrix, DVector, Vector2};
use std::f64::consts::PI;

use crate::filter::errors::TrajectoryError;

/// Smallest diagonal entry accepted in a Cholesky factor.
///
/// Rank-deficient matrices produce (near) zero pivots; they are rejected here
/// instead of failing later inside sampling.
pub const MIN_CHOLESKY_PIVOT: f64 = 1e-12;

/// Relative tolerance used when checking symmetry.
const SYMMETRY_TOLERANCE: f64 = 1e-9;

/// Human readable `RxC` shape string
#[inline]
pub fn shape_of(matrix: &DMatrix<f64>) -> String {
    format!("{}x{}", matrix.nrows(), matrix.ncols())
}

/// Build a matrix from nested rows.
///
/// Empty input and ragged rows are not matrices and yield a dimension error.
pub fn matrix_from_rows(rows: &[Vec<f64>], context: &str) -> Result<DMatrix<f64>, TrajectoryError> {
    let nrows = rows.len();
    let ncols = rows.first().map_or(0, |r| r.len());
    if nrows == 0 || ncols == 0 {
        return Err(TrajectoryError::dimension(context, "2x2", "empty"));
    }
    if let Some(bad) = rows.iter().find(|r| r.len() != ncols) {
        return Err(TrajectoryError::dimension(
            context,
            "2x2",
            format!("ragged rows of length {} and {}", ncols, bad.len()),
        ));
    }
    let flat: Vec<f64> = rows.iter().flatten().copied().collect();
    Ok(DMatrix::from_row_slice(nrows, ncols, &flat))
}

/// Require `matrix` to be exactly 2x2.
pub fn require_2x2(matrix: &DMatrix<f64>, context: &str) -> Result<(), TrajectoryError> {
    if matrix.nrows() != 2 || matrix.ncols() != 2 {
        return Err(TrajectoryError::dimension(context, "2x2", shape_of(matrix)));
    }
    Ok(())
}

/// Broadcast a scalar, or truncate a longer slice, to a 2-vector.
pub fn broadcast_pair(values: &[f64], context: &str) -> Result<Vector2<f64>, TrajectoryError> {
    match values {
        [] => Err(TrajectoryError::dimension(context, "1 or 2 element", "empty")),
        [v] => Ok(Vector2::new(*v, *v)),
        [a, b, ..] => Ok(Vector2::new(*a, *b)),
    }
}

/// Lower-triangular Cholesky factor `L` with `L·Lᵀ = matrix`.
///
/// The matrix must be square, symmetric and strictly positive definite.
/// Rank-deficient inputs are rejected.
pub fn cholesky_factor(matrix: &DMatrix<f64>, context: &str) -> Result<DMatrix<f64>, TrajectoryError> {
    if !matrix.is_square() {
        return Err(TrajectoryError::dimension(context, "square", shape_of(matrix)));
    }
    if matrix.iter().any(|v| !v.is_finite()) {
        return Err(TrajectoryError::numerical(format!(
            "{} contains non-finite entries",
            context
        )));
    }

    let scale = matrix.amax().max(1.0);
    if (matrix - matrix.transpose()).amax() > SYMMETRY_TOLERANCE * scale {
        return Err(TrajectoryError::numerical(format!(
            "{} is not symmetric",
            context
        )));
    }

    let chol = matrix.clone().cholesky().ok_or_else(|| {
        TrajectoryError::numerical(format!("{} is not positive definite", context))
    })?;
    let l = chol.l();

    if l.diagonal().iter().any(|d| !d.is_finite() || *d <= MIN_CHOLESKY_PIVOT * scale.sqrt()) {
        return Err(TrajectoryError::numerical(format!(
            "{} is singular (rank deficient)",
            context
        )));
    }
    Ok(l)
}

/// Reconstruct a covariance `L·Lᵀ` from its Cholesky factor
#[inline]
pub fn covariance_from_factor(factor: &DMatrix<f64>) -> DMatrix<f64> {
    factor * factor.transpose()
}

/// Real power `matrix^exponent` of a 2x2 matrix.
///
/// Uses the Cayley-Hamilton form `f(M) = a·I + b·M` with coefficients from
/// the (possibly complex) eigenvalues. Fails when no real power exists,
/// e.g. a negative real eigenvalue raised to a fractional exponent.
pub fn real_matrix_power_2x2(
    matrix: &DMatrix<f64>,
    exponent: f64,
) -> Result<DMatrix<f64>, TrajectoryError> {
    require_2x2(matrix, "matrix power")?;
    if !exponent.is_finite() || exponent < 0.0 {
        return Err(TrajectoryError::configuration(format!(
            "matrix power exponent must be finite and non-negative, got {}",
            exponent
        )));
    }
    if exponent == 1.0 {
        return Ok(matrix.clone());
    }
    if exponent == 0.0 {
        return Ok(DMatrix::identity(2, 2));
    }

    let trace = matrix[(0, 0)] + matrix[(1, 1)];
    let det = matrix.determinant();
    let half = Complex::new(trace / 2.0, 0.0);
    let root = ComplexField::sqrt(Complex::new(trace * trace / 4.0 - det, 0.0));
    let (l1, l2) = (half + root, half - root);

    let pow = |z: Complex<f64>| -> Complex<f64> {
        if z.modulus() == 0.0 {
            Complex::new(0.0, 0.0)
        } else {
            ComplexField::powf(z, exponent)
        }
    };

    let spread = (l1 - l2).modulus();
    let (a, b) = if spread > 1e-10 * l1.modulus().max(1.0) {
        let (f1, f2) = (pow(l1), pow(l2));
        let b = (f1 - f2) / (l1 - l2);
        let a = (l1 * f2 - l2 * f1) / (l1 - l2);
        (a, b)
    } else if half.modulus() == 0.0 {
        // Repeated zero eigenvalue: only the zero matrix has a defined power.
        if matrix.amax() == 0.0 {
            return Ok(DMatrix::zeros(2, 2));
        }
        return Err(TrajectoryError::numerical(
            "matrix power of a nilpotent matrix is undefined",
        ));
    } else {
        let f = pow(half);
        let df = f * exponent / half;
        (f - half * df, df)
    };

    let scale = a.modulus().max(b.modulus()).max(1.0);
    if a.im.abs() > 1e-9 * scale || b.im.abs() > 1e-9 * scale {
        return Err(TrajectoryError::numerical(format!(
            "matrix has no real power {} (negative real eigenvalue)",
            exponent
        )));
    }

    let result = DMatrix::identity(2, 2) * a.re + matrix * b.re;
    if result.iter().any(|v| !v.is_finite()) {
        return Err(TrajectoryError::numerical("matrix power is not finite"));
    }
    Ok(result)
}

/// Compute log Gaussian PDF for numerical stability
///
/// # Arguments
/// * `x` - Point to evaluate
/// * `mu` - Mean vector
/// * `sigma` - Covariance matrix
///
/// # Returns
/// Log probability density
pub fn log_gaussian_pdf(x: &DVector<f64>, mu: &DVector<f64>, sigma: &DMatrix<f64>) -> f64 {
    let n = x.len() as f64;
    let diff = x - mu;

    match sigma.clone().cholesky() {
        Some(chol) => {
            let log_det = 2.0 * chol.l().diagonal().iter().map(|d| d.ln()).sum::<f64>();
            let mahalanobis = diff.dot(&chol.solve(&diff));
            -0.5 * (n * (2.0 * PI).ln() + log_det + mahalanobis)
        }
        None => f64::NEG_INFINITY,
    }
}

/// Make matrix symmetric
///
/// Ensures a matrix is symmetric by averaging with its transpose
pub fn symmetrize(matrix: &DMatrix<f64>) -> DMatrix<f64> {
    0.5 * (matrix + matrix.transpose())
}
