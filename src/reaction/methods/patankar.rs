//! Patankar schemes
//!
//! # Mathematical Background
//!
//! The Patankar trick treats the destruction half of the right-hand
//! side implicitly, but divides it by the *old* concentration instead
//! of the new one, which linearises the otherwise nonlinear implicit
//! step:
//!
//! ```text
//! cᵢ⁺ = (cᵢ + dt·Σⱼ ppᵢⱼ) / (1 + dt·Σⱼ ddᵢⱼ / cᵢ)
//! ```
//!
//! Numerator and denominator are both positive whenever `cᵢ > 0` and
//! the pp/dd tensors honour their non-negativity invariant, so the
//! update can never produce a non-positive value — for any `dt`. The
//! price is exact conservation: production is still explicit while
//! destruction is damped, so paired fluxes no longer cancel in the
//! discrete update. The Modified Patankar family repairs that.
//!
//! The second-order variant runs the same update as predictor, then
//! re-evaluates the decomposition at the intermediate state, averages
//! both stages' tensors and repeats the update with the *intermediate*
//! concentrations as the implicit denominator reference.
//!
//! # The fourth-order variants
//!
//! The 4th-order Patankar stage combinations do not conserve mass and
//! produce unusable results. They are kept in the scheme catalogue for
//! interface completeness but dispatch to
//! [`SolverError::DisabledScheme`] instead of silently shipping a
//! broken update.

use crate::error::SolverError;
use crate::physics::{ReactionPpdd, ReactionTensors};
use crate::reaction::methods::{check_step, require_positive};
use nalgebra::DMatrix;

/// Advance one first-order Patankar step in place.
pub fn patankar<M: ReactionPpdd + ?Sized>(
    dt: f64,
    cc: &mut DMatrix<f64>,
    model: &M,
) -> Result<(), SolverError> {
    let (species, layers) = check_step(dt, cc, model)?;

    let mut tensors = ReactionTensors::new(species, layers);
    model.ppdd(true, cc, &mut tensors);

    for layer in 1..=layers {
        for i in 0..species {
            let old = require_positive(cc[(i, layer)], i, layer)?;
            cc[(i, layer)] = (old + dt * tensors.production_sum(i, layer))
                / (1.0 + dt * tensors.destruction_sum(i, layer) / old);
        }
    }
    Ok(())
}

/// Advance one second-order Patankar–Runge–Kutta step in place.
pub fn patankar_runge_kutta_2<M: ReactionPpdd + ?Sized>(
    dt: f64,
    cc: &mut DMatrix<f64>,
    model: &M,
) -> Result<(), SolverError> {
    let (species, layers) = check_step(dt, cc, model)?;

    // Predictor: plain Patankar step into an intermediate state.
    let mut tensors = ReactionTensors::new(species, layers);
    model.ppdd(true, cc, &mut tensors);

    let mut intermediate = cc.clone();
    for layer in 1..=layers {
        for i in 0..species {
            let old = require_positive(cc[(i, layer)], i, layer)?;
            intermediate[(i, layer)] = (old + dt * tensors.production_sum(i, layer))
                / (1.0 + dt * tensors.destruction_sum(i, layer) / old);
        }
    }

    // Corrector: average both decompositions, divide by the
    // intermediate state.
    let mut stage2 = ReactionTensors::new(species, layers);
    model.ppdd(false, &intermediate, &mut stage2);
    tensors.average_with(&stage2);

    for layer in 1..=layers {
        for i in 0..species {
            let old = cc[(i, layer)];
            let reference = require_positive(intermediate[(i, layer)], i, layer)?;
            cc[(i, layer)] = (old + dt * tensors.production_sum(i, layer))
                / (1.0 + dt * tensors.destruction_sum(i, layer) / reference);
        }
    }
    Ok(())
}
