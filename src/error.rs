//! Crate-wide error type
//!
//! # Design
//!
//! Errors fall into three families with very different consequences for
//! the caller:
//!
//! 1. **Configuration errors** — an unknown scheme identifier, a
//!    disabled scheme, a malformed grid or parameter set. These are
//!    programming/configuration mistakes: the requested step must not
//!    run, and no default is silently substituted.
//!
//! 2. **Numerical precondition violations** — a zero pivot in an
//!    elimination, or a non-positive concentration feeding a Patankar
//!    denominator. The solvers assume diagonal dominance and strict
//!    positivity; when the assumption breaks, the step is aborted with
//!    a variant the caller can match on (e.g. to halve the time step
//!    and retry — retrying is the caller's policy, never ours).
//!
//! 3. **Numerical instability** — NaN or Inf appearing mid-run. Only
//!    the simulation facade checks for this, once per completed step.

use thiserror::Error;

/// Error type for every fallible operation in the crate.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolverError {
    /// The ODE scheme selector did not name any known scheme.
    ///
    /// Valid identifiers are 1..=11; see [`OdeScheme`](crate::reaction::OdeScheme).
    #[error("unknown ODE scheme identifier {id}: valid identifiers are 1..=11")]
    UnknownScheme { id: i32 },

    /// The selected scheme exists but is deliberately not runnable.
    #[error("scheme '{name}' is disabled: {reason}")]
    DisabledScheme {
        name: &'static str,
        reason: &'static str,
    },

    /// The vertical grid failed validation.
    #[error("invalid vertical grid: {reason}")]
    InvalidGrid { reason: String },

    /// A parameter set failed validation (dt, cnpar, step counts, ...).
    #[error("invalid configuration: {reason}")]
    InvalidConfiguration { reason: String },

    /// Array shapes passed to a solver do not agree with each other or
    /// with the model.
    #[error("dimension mismatch: {reason}")]
    DimensionMismatch { reason: String },

    /// Forward elimination in the tridiagonal solve hit a (near-)zero
    /// pivot. The assembled system was not diagonally dominant.
    #[error("zero pivot in tridiagonal elimination at row {row}")]
    TridiagonalZeroPivot { row: usize },

    /// Gaussian elimination in the per-layer dense solve hit a
    /// (near-)zero pivot.
    #[error("zero pivot in dense elimination at row {row}")]
    DenseZeroPivot { row: usize },

    /// A Patankar-family denominator or an EMP relative rate would
    /// divide by a concentration that is not strictly positive.
    #[error(
        "non-positive concentration {value:e} for species {species} in layer {layer}: \
         Patankar-family schemes require strictly positive state"
    )]
    NonPositiveConcentration {
        species: usize,
        layer: usize,
        value: f64,
    },

    /// NaN or Inf detected after a completed step of a simulation run.
    #[error(
        "non-finite state detected at step {step}. This indicates numerical \
         instability; try reducing the time step (increase time_steps)."
    )]
    NonFiniteState { step: usize },
}
