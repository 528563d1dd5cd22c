//! Bisection root-finder for the EMP multiplier
//!
//! The Extended Modified Patankar schemes scale the whole per-layer
//! Euler increment by a single multiplier `p` chosen so that no
//! species crosses zero and total mass stays balanced. `p` is the root
//! of the fixed-point polynomial
//!
//! ```text
//! Π_{j ∈ J} (1 + dt·r_j/c_j · p)  =  p ,
//! ```
//!
//! where `J` is the set of species with strictly negative net
//! derivative `r_j`. The product is strictly decreasing in `p` on the
//! admissible interval and equals 1 at `p = 0`, so exactly one root
//! lies in `(0, p_max)` with
//! `p_max = min(1, min_{j∈J} c_j / (-dt·r_j))` — the largest scaling
//! that keeps every limiting species non-negative.
//!
//! # Search state
//!
//! The solve moves through three states: *searching* (bracket
//! shrinking), *converged* (exact crossing or relative bracket width
//! below [`CONVERGENCE_TOL`]) and *exhausted* ([`MAX_ITERATIONS`]
//! spent — the best estimate is accepted, the step does not fail).
//! When no species has a negative derivative the solve short-circuits
//! to `p = 1`, a plain Euler step.
//!
//! A multiplier that converges below [`STIFFNESS_THRESHOLD`] signals a
//! stiff or near-non-positive system that the scheme handles poorly;
//! the calling scheme surfaces that through `log::warn!`.

use crate::error::SolverError;

/// Relative bracket width below which the search is converged.
pub const CONVERGENCE_TOL: f64 = 1e-9;

/// Hard cap on bisection iterations.
pub const MAX_ITERATIONS: usize = 20;

/// Multipliers below this value indicate a stiff system; the calling
/// scheme emits a diagnostic warning.
pub const STIFFNESS_THRESHOLD: f64 = 1e-4;

/// How the search for the multiplier ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BisectionStatus {
    /// No species had a negative derivative; `p = 1` without any
    /// iteration.
    ShortCircuit,
    /// Exact crossing or bracket narrower than [`CONVERGENCE_TOL`].
    Converged,
    /// Iteration cap reached; best midpoint accepted.
    Exhausted,
}

/// Result of one per-layer multiplier solve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MultiplierSolve {
    /// The accepted multiplier `p ∈ (0, 1]`.
    pub p: f64,
    /// How the search ended.
    pub status: BisectionStatus,
    /// Number of bisection iterations spent.
    pub iterations: usize,
}

/// Find the EMP multiplier for one layer.
///
/// `concentrations` and `derivatives` are per-species slices for a
/// single layer; `layer` is only used for error reporting.
///
/// # Errors
///
/// A species with a negative derivative but a non-positive
/// concentration makes the relative rate `r_j/c_j` meaningless and is
/// reported as [`SolverError::NonPositiveConcentration`].
pub fn find_multiplier(
    dt: f64,
    concentrations: &[f64],
    derivatives: &[f64],
    layer: usize,
) -> Result<MultiplierSolve, SolverError> {
    debug_assert_eq!(concentrations.len(), derivatives.len());

    // Relative rates of the limiting species, and the positivity bound
    // on p they impose.
    let mut relative = Vec::with_capacity(concentrations.len());
    let mut p_max = 1.0f64;
    for (j, (&c, &r)) in concentrations.iter().zip(derivatives).enumerate() {
        if r < 0.0 {
            if !(c > 0.0) {
                return Err(SolverError::NonPositiveConcentration {
                    species: j,
                    layer,
                    value: c,
                });
            }
            relative.push(dt * r / c);
            p_max = p_max.min(c / (-dt * r));
        }
    }

    if relative.is_empty() {
        return Ok(MultiplierSolve {
            p: 1.0,
            status: BisectionStatus::ShortCircuit,
            iterations: 0,
        });
    }

    let polynomial = |p: f64| -> f64 { relative.iter().map(|&rel| 1.0 + rel * p).product() };

    let mut lo = 0.0f64;
    let mut hi = p_max;

    for iteration in 1..=MAX_ITERATIONS {
        let mid = 0.5 * (lo + hi);
        let value = polynomial(mid);

        if value > mid {
            lo = mid;
        } else if value < mid {
            hi = mid;
        } else {
            // Exact crossing.
            return Ok(MultiplierSolve {
                p: mid,
                status: BisectionStatus::Converged,
                iterations: iteration,
            });
        }

        if (hi - lo) < CONVERGENCE_TOL * hi {
            return Ok(MultiplierSolve {
                p: 0.5 * (lo + hi),
                status: BisectionStatus::Converged,
                iterations: iteration,
            });
        }
    }

    Ok(MultiplierSolve {
        p: 0.5 * (lo + hi),
        status: BisectionStatus::Exhausted,
        iterations: MAX_ITERATIONS,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_circuit_without_negative_derivatives() {
        let solve = find_multiplier(0.5, &[1.0, 2.0], &[0.3, 0.0], 1).unwrap();
        assert_eq!(solve.p, 1.0);
        assert_eq!(solve.status, BisectionStatus::ShortCircuit);
        assert_eq!(solve.iterations, 0);
    }

    #[test]
    fn test_single_species_closed_form() {
        // (1 + dt·r/c·p) = p with dt = 1, r = -2, c = 1:
        // 1 - 2p = p  =>  p = 1/3.
        //
        // Twenty halvings of the initial [0, 0.5] bracket pin the root
        // to ~5e-7 absolute; the relative-width tolerance is tighter
        // than that, so the search runs to the iteration cap.
        let solve = find_multiplier(1.0, &[1.0], &[-2.0], 1).unwrap();
        assert!(solve.iterations <= MAX_ITERATIONS);
        assert!(
            (solve.p - 1.0 / 3.0).abs() < 1e-6,
            "p = {} should be 1/3",
            solve.p
        );
    }

    #[test]
    fn test_multiplier_keeps_limiting_species_positive() {
        let dt = 2.0;
        let c = [0.1, 5.0, 1.0];
        let r = [-0.4, 0.2, -3.0];
        let solve = find_multiplier(dt, &c, &r, 1).unwrap();

        assert!(solve.p > 0.0 && solve.p <= 1.0);
        for j in 0..3 {
            let updated = c[j] + dt * r[j] * solve.p;
            assert!(updated > 0.0, "species {} went to {}", j, updated);
        }
    }

    #[test]
    fn test_mild_system_multiplier_close_to_one() {
        // Nearly non-stiff: the positivity bound barely binds and p
        // stays close to (but below) 1.
        let solve = find_multiplier(0.01, &[1.0], &[-0.1], 1).unwrap();
        assert!(solve.p > 0.99 && solve.p <= 1.0);
    }

    #[test]
    fn test_zero_concentration_with_negative_derivative_errors() {
        let err = find_multiplier(1.0, &[0.0], &[-1.0], 3).unwrap_err();
        assert!(matches!(
            err,
            SolverError::NonPositiveConcentration {
                species: 0,
                layer: 3,
                ..
            }
        ));
    }

    #[test]
    fn test_iterations_capped() {
        let solve = find_multiplier(1e6, &[1.0, 1.0], &[-1e3, -2e3], 1).unwrap();
        assert!(solve.iterations <= MAX_ITERATIONS);
        assert!(solve.p > 0.0);
        // Such a system is exactly the stiff case the threshold flags.
        assert!(solve.p < STIFFNESS_THRESHOLD);
    }
}
