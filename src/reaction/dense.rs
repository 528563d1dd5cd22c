//! Per-layer dense linear solver
//!
//! The Modified Patankar family solves one small dense system per
//! layer (size = species count, typically below ten). Plain Gaussian
//! elimination without pivoting is used: the Modified Patankar
//! assembly puts `1 + dt·Σ dd/c` on the diagonal and only
//! `-dt·pp/c ≤ 0` off it, so the matrix is strictly diagonally
//! dominant whenever concentrations and fluxes honour their sign
//! invariants, and pivoting would buy nothing. A pivot collapsing to
//! zero means those invariants were violated and is reported as
//! [`SolverError::DenseZeroPivot`].

use crate::error::SolverError;
use nalgebra::{DMatrix, DVector};

/// Smallest pivot magnitude accepted during elimination.
const PIVOT_FLOOR: f64 = 1e-14;

/// Solve `a · x = r` in place; on success `r` holds the solution.
///
/// Both `a` and `r` are destroyed by the elimination — the Modified
/// Patankar schemes rebuild them for every layer anyway.
pub fn solve_in_place(a: &mut DMatrix<f64>, r: &mut DVector<f64>) -> Result<(), SolverError> {
    let n = r.len();
    debug_assert_eq!(a.nrows(), n);
    debug_assert_eq!(a.ncols(), n);

    // Forward elimination.
    for k in 0..n {
        let pivot = a[(k, k)];
        if pivot.abs() < PIVOT_FLOOR {
            return Err(SolverError::DenseZeroPivot { row: k });
        }
        for i in k + 1..n {
            let factor = a[(i, k)] / pivot;
            if factor == 0.0 {
                continue;
            }
            for j in k + 1..n {
                a[(i, j)] -= factor * a[(k, j)];
            }
            r[i] -= factor * r[k];
        }
    }

    // Back substitution.
    for k in (0..n).rev() {
        let mut sum = r[k];
        for j in k + 1..n {
            sum -= a[(k, j)] * r[j];
        }
        r[k] = sum / a[(k, k)];
    }

    Ok(())
}
