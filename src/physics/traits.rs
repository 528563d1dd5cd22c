//! Evaluator capability traits
//!
//! # Design
//!
//! The time-stepping schemes consume the reaction physics through one
//! of two calling conventions:
//!
//! 1. **rhs form** ([`ReactionRhs`]) — the evaluator returns one net
//!    flux per species per layer. Required by the explicit schemes
//!    (Euler, Runge–Kutta) and by the Extended Modified Patankar
//!    family.
//!
//! 2. **ppdd form** ([`ReactionPpdd`]) — the evaluator decomposes the
//!    right-hand side into pairwise non-negative production and
//!    destruction fluxes. Required by the (Modified) Patankar family,
//!    whose positivity and conservation guarantees hinge on the sign
//!    structure of the decomposition.
//!
//! A scheme declares the convention it needs through its trait bound;
//! a model implements the conventions it can honestly provide. Only
//! the runtime dispatcher ([`crate::reaction::integrate`]) asks for
//! both, because the scheme selector is not known at compile time.

use super::tensors::ReactionTensors;
use nalgebra::DMatrix;

/// Base capability shared by both evaluator conventions.
///
/// Concentration fields are `DMatrix<f64>` with one row per species
/// (0-based) and one column per layer slot (column 0 is the boundary
/// bookkeeping slot, layers are columns 1..=N — see
/// [`crate::grid::VerticalGrid`]).
pub trait ReactionSystem: Send + Sync {
    /// Number of species the model tracks (rows of the concentration
    /// field).
    fn species(&self) -> usize;

    /// Display name, used in diagnostics and result metadata.
    fn name(&self) -> &str;
}

/// Right-hand-side calling convention: net flux per species per layer.
pub trait ReactionRhs: ReactionSystem {
    /// Evaluate d(cc)/dt into `rhs` (same shape as `cc`, layers
    /// 1..=N; slot 0 is ignored).
    ///
    /// `first_call` is true for the first evaluation within one outer
    /// time step. An evaluator may use it to skip redundant internal
    /// work (e.g. re-deriving light fields), but the numbers it
    /// produces must be identical either way.
    fn rhs(&self, first_call: bool, cc: &DMatrix<f64>, rhs: &mut DMatrix<f64>);
}

/// Production/destruction calling convention.
pub trait ReactionPpdd: ReactionSystem {
    /// Decompose d(cc)/dt into the pairwise production and destruction
    /// tensors. `tensors` arrives zeroed; the evaluator only records
    /// fluxes (all non-negative — see [`ReactionTensors`]).
    ///
    /// The `first_call` contract is the same as for
    /// [`ReactionRhs::rhs`].
    fn ppdd(&self, first_call: bool, cc: &DMatrix<f64>, tensors: &mut ReactionTensors);
}
