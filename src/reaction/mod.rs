//! Reaction ODE integration engine
//!
//! Advances a multi-species reaction system one time step per call,
//! through one of eleven schemes with different accuracy, positivity
//! and conservation guarantees — see [`OdeScheme`] for the catalogue
//! and [`integrate`] for the dispatching entry point.
//!
//! # Module Organization
//!
//! - **`scheme`**: the sealed scheme enumeration and the dispatcher
//! - **`methods`**: one module per scheme family (Euler, Runge–Kutta,
//!   Patankar, Modified Patankar, Extended Modified Patankar)
//! - **`dense`**: per-layer Gaussian elimination for the Modified
//!   Patankar family
//! - **`bisection`**: the constrained root solve for the Extended
//!   Modified Patankar family
//!
//! Every layer's update is independent of every other layer (the only
//! cross-layer coupling in this crate is the tridiagonal diffusion,
//! which lives in [`crate::transport`]). The per-layer solves of the
//! Modified Patankar and EMP families can therefore fan out over
//! Rayon; see below.

// =================================================================================================
// Parallel Execution Threshold
// =================================================================================================
//
// Deciding *when* to hand the per-layer solves to Rayon is a numerical-
// execution concern, not a physics concern, so it lives here.
//
// The threshold is stored in an AtomicUsize so that it can be changed
// at runtime (useful in benchmarks and tests) without a mutex on every
// step. Relaxed ordering is sufficient: the value is a performance
// hint, not a synchronisation point.
// =================================================================================================

use std::sync::atomic::{AtomicUsize, Ordering};

/// Default number of layers above which the Modified Patankar and EMP
/// solvers switch to parallel per-layer iteration.
///
/// The crossover is set at 128 layers. Below that point the overhead
/// of Rayon's thread-pool dispatch outweighs the per-layer dense solve
/// or bisection for typical species counts.
const DEFAULT_PARALLEL_THRESHOLD: usize = 128;

/// Runtime-configurable parallel-execution threshold.
///
/// Read via [`parallel_threshold()`], written via
/// [`set_parallel_threshold()`].
static PARALLEL_THRESHOLD: AtomicUsize = AtomicUsize::new(DEFAULT_PARALLEL_THRESHOLD);

/// Return the current parallel-execution threshold.
///
/// The per-layer solvers iterate sequentially when the column has
/// fewer layers than this value, and switch to Rayon when it has more
/// — but only when the crate is compiled with the `parallel` feature.
pub fn parallel_threshold() -> usize {
    PARALLEL_THRESHOLD.load(Ordering::Relaxed)
}

/// Set the parallel-execution threshold to a new value.
///
/// # Panics
///
/// Panics when `threshold == 0`. A zero-layer threshold would force
/// parallel dispatch on every single-layer solve, which is never the
/// intended behaviour.
pub fn set_parallel_threshold(threshold: usize) {
    assert!(threshold > 0, "parallel threshold must be at least 1");
    PARALLEL_THRESHOLD.store(threshold, Ordering::Relaxed);
}

/// RAII guard that saves the current threshold on construction and
/// restores it on drop.
///
/// Only compiled in test builds. Prevents one test from leaking a
/// modified threshold value into the next.
#[cfg(test)]
pub(crate) struct ThresholdGuard {
    previous: usize,
}

#[cfg(test)]
impl ThresholdGuard {
    /// Set the threshold to `new_value` and return a guard that will
    /// restore the previous value on drop.
    pub(crate) fn save(new_value: usize) -> Self {
        let previous = parallel_threshold();
        set_parallel_threshold(new_value);
        Self { previous }
    }
}

#[cfg(test)]
impl Drop for ThresholdGuard {
    fn drop(&mut self) {
        // Bypass the public setter so that restoring any value never
        // panics.
        PARALLEL_THRESHOLD.store(self.previous, Ordering::Relaxed);
    }
}

// =================================================================================================
// Module Declarations
// =================================================================================================

pub mod bisection;
pub mod dense;
pub mod methods;
mod scheme;

pub use scheme::{OdeScheme, integrate};

// =================================================================================================
// Tests
// =================================================================================================
