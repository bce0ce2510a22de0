//! dense symetric positive definite solver for the small systems of Newton iterations.

use ndarray::{Array1, Array2};
use ndarray_linalg::cholesky::SolveC;

/// solve a x = b for a symetric positive definite matrix a using lapack Cholesky factorization a = l l^t.
/// Returns None if a is not (numerically) positive definite.
pub fn cholesky_solve(a: &Array2<f64>, b: &Array1<f64>) -> Option<Array1<f64>> {
    if a.nrows() != a.ncols() || b.len() != a.nrows() {
        log::error!(
            "cholesky_solve : bad dimensions, matrix ({}, {}), rhs {}",
            a.nrows(),
            a.ncols(),
            b.len()
        );
        return None;
    }
    match a.solvec(b) {
        Ok(x) if x.iter().all(|v| v.is_finite()) => Some(x),
        Ok(_) => {
            log::debug!("cholesky_solve : non finite solution");
            None
        }
        Err(e) => {
            log::debug!("cholesky_solve : factorization failed : {}", e);
            None
        }
    }
} // end of cholesky_solve

// end of mod tests
