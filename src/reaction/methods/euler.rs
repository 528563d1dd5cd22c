//! Euler-forward scheme
//!
//! The simplest explicit step: one evaluator call,
//! `c ← c + dt·f(c)`. First-order accurate, conditionally stable, and
//! with no positivity guarantee whatsoever — a large enough `dt` on a
//! decaying species drives it straight through zero. Its place in the
//! catalogue is as the baseline the Patankar-family schemes improve
//! on.

use crate::error::SolverError;
use crate::physics::ReactionRhs;
use crate::reaction::methods::check_step;
use nalgebra::DMatrix;

/// Advance one Euler-forward step in place.
pub fn euler_forward<M: ReactionRhs + ?Sized>(
    dt: f64,
    cc: &mut DMatrix<f64>,
    model: &M,
) -> Result<(), SolverError> {
    let (species, layers) = check_step(dt, cc, model)?;

    let mut rhs = DMatrix::zeros(species, layers + 1);
    model.rhs(true, cc, &mut rhs);

    for layer in 1..=layers {
        for i in 0..species {
            cc[(i, layer)] += dt * rhs[(i, layer)];
        }
    }
    Ok(())
}
