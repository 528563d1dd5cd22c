//! Tridiagonal solver
//!
//! Gaussian elimination for the tridiagonal systems produced by the
//! diffusion assemblers: forward sweep normalising each pivot row,
//! then back substitution.
//!
//! # No pivoting
//!
//! The solver does not pivot. Every row the assemblers in this crate
//! produce has diagonal `1 + cnpar·(a + c) - dt·L` with `a, c ≥ 0` and
//! `L ≤ 0` in the physically meaningful regime, so the system is
//! strictly diagonally dominant and elimination is stable as-is. A
//! pivot whose magnitude drops below [`PIVOT_FLOOR`] means that
//! assumption was violated by the caller (e.g. a large positive linear
//! source); the solve aborts with
//! [`SolverError::TridiagonalZeroPivot`] instead of dividing through.

use crate::error::SolverError;
use nalgebra::DVector;

/// Smallest pivot magnitude accepted during elimination.
pub const PIVOT_FLOOR: f64 = 1e-14;

/// Coefficient buffers for one tridiagonal system.
///
/// Row `i` of the system reads
/// `sub[i]·x[i-1] + diag[i]·x[i] + sup[i]·x[i+1] = rhs[i]`.
///
/// The buffers cover the full slot range 0..=N of the grid; which rows
/// actually participate is decided per solve by the closed interval
/// `[lo, hi]`. The buffers are scratch: the assemblers overwrite them
/// on every call, and [`solve`](Self::solve) destroys them while
/// eliminating. Nothing is persisted between calls.
#[derive(Debug, Clone)]
pub struct TridiagonalSystem {
    /// Sub-diagonal (coupling to the row below).
    pub sub: DVector<f64>,
    /// Main diagonal.
    pub diag: DVector<f64>,
    /// Super-diagonal (coupling to the row above).
    pub sup: DVector<f64>,
    /// Right-hand side.
    pub rhs: DVector<f64>,
}

impl TridiagonalSystem {
    /// Allocate zeroed buffers with `slots` entries (N + 1 for a grid
    /// of N layers).
    pub fn new(slots: usize) -> Self {
        Self {
            sub: DVector::zeros(slots),
            diag: DVector::zeros(slots),
            sup: DVector::zeros(slots),
            rhs: DVector::zeros(slots),
        }
    }

    /// Solve the rows in the closed interval `[lo, hi]`, writing the
    /// solution into the matching slots of `y`.
    ///
    /// Rows outside the interval are never read; row `lo` must not
    /// couple below `lo` and row `hi` must not couple above `hi`
    /// (the assemblers guarantee this).
    pub fn solve(&mut self, lo: usize, hi: usize, y: &mut DVector<f64>) -> Result<(), SolverError> {
        debug_assert!(lo <= hi && hi < self.diag.len());

        // Forward sweep: normalise row lo, then eliminate each row's
        // sub-diagonal entry against the row below it.
        let pivot = self.diag[lo];
        if pivot.abs() < PIVOT_FLOOR {
            return Err(SolverError::TridiagonalZeroPivot { row: lo });
        }
        self.sup[lo] /= pivot;
        self.rhs[lo] /= pivot;

        for i in lo + 1..=hi {
            let pivot = self.diag[i] - self.sub[i] * self.sup[i - 1];
            if pivot.abs() < PIVOT_FLOOR {
                return Err(SolverError::TridiagonalZeroPivot { row: i });
            }
            self.sup[i] /= pivot;
            self.rhs[i] = (self.rhs[i] - self.sub[i] * self.rhs[i - 1]) / pivot;
        }

        // Back substitution.
        y[hi] = self.rhs[hi];
        for i in (lo..hi).rev() {
            y[i] = self.rhs[i] - self.sup[i] * y[i + 1];
        }

        Ok(())
    }
}
