//! Modified Patankar schemes
//!
//! # Mathematical Background
//!
//! The plain Patankar trick damps destruction but leaves production
//! explicit, so paired fluxes stop cancelling and mass leaks. The
//! Modified Patankar schemes apply the same old-concentration
//! weighting to *both* halves of every pairwise flux, which couples
//! the species of one layer into a small dense linear system:
//!
//! ```text
//! aᵢᵢ = 1 + dt·(Σⱼ ddᵢⱼ) / cᵢ          (destruction, diagonal)
//! aᵢⱼ = -dt·ppᵢⱼ / cⱼ        (i ≠ j)    (production, off-diagonal)
//! rᵢ  = cᵢ + dt·ppᵢᵢ                    (self-production explicit)
//! ```
//!
//! Solving `a·c⁺ = r` per layer yields an update that is positive
//! *and* exactly conservative: summing the equations over `i` makes
//! every paired `ppᵢⱼ/ddⱼᵢ` term cancel, so `Σ cᵢ⁺` differs from
//! `Σ cᵢ` only by the external (diagonal) terms.
//!
//! The second-order variant repeats the solve with tensors averaged
//! over both stages and the predictor state as the weighting
//! reference. The 4th-order variant does not conserve mass and
//! dispatches to [`SolverError::DisabledScheme`].
//!
//! # Cost
//!
//! One `species × species` Gaussian elimination per layer per stage
//! — the most expensive scheme family in the catalogue, and the
//! reason the per-layer loop is a candidate for the `parallel`
//! feature (see [`crate::reaction::parallel_threshold`]).

use crate::error::SolverError;
use crate::physics::{ReactionPpdd, ReactionTensors};
use crate::reaction::dense;
use crate::reaction::methods::{check_step, require_positive, update_layers};
use nalgebra::{DMatrix, DVector};

/// Advance one first-order Modified Patankar step in place.
pub fn modified_patankar<M: ReactionPpdd + ?Sized>(
    dt: f64,
    cc: &mut DMatrix<f64>,
    model: &M,
) -> Result<(), SolverError> {
    let (species, layers) = check_step(dt, cc, model)?;

    let mut tensors = ReactionTensors::new(species, layers);
    model.ppdd(true, cc, &mut tensors);

    let base = cc.clone();
    update_layers(layers, cc, |layer| {
        solve_layer(dt, species, layer, &tensors, &base, &base)
    })
}

/// Advance one second-order Modified Patankar–Runge–Kutta step in
/// place.
pub fn modified_patankar_2<M: ReactionPpdd + ?Sized>(
    dt: f64,
    cc: &mut DMatrix<f64>,
    model: &M,
) -> Result<(), SolverError> {
    let (species, layers) = check_step(dt, cc, model)?;

    // Predictor: first-order step into an intermediate field.
    let mut tensors = ReactionTensors::new(species, layers);
    model.ppdd(true, cc, &mut tensors);

    let base = cc.clone();
    let mut intermediate = cc.clone();
    update_layers(layers, &mut intermediate, |layer| {
        solve_layer(dt, species, layer, &tensors, &base, &base)
    })?;

    // Corrector: tensors averaged over both stages, weighted by the
    // intermediate state.
    let mut stage2 = ReactionTensors::new(species, layers);
    model.ppdd(false, &intermediate, &mut stage2);
    tensors.average_with(&stage2);

    update_layers(layers, cc, |layer| {
        solve_layer(dt, species, layer, &tensors, &base, &intermediate)
    })
}

/// Assemble and solve the dense system of one layer.
///
/// `base` supplies the explicit right-hand side (always the old
/// state); `reference` supplies the Patankar weighting denominators
/// (old state for order 1, predictor state for order 2).
fn solve_layer(
    dt: f64,
    species: usize,
    layer: usize,
    tensors: &ReactionTensors,
    base: &DMatrix<f64>,
    reference: &DMatrix<f64>,
) -> Result<DVector<f64>, SolverError> {
    let mut a = DMatrix::zeros(species, species);
    let mut r = DVector::zeros(species);

    for i in 0..species {
        let ref_i = require_positive(reference[(i, layer)], i, layer)?;
        a[(i, i)] = 1.0 + dt * tensors.destruction_sum(i, layer) / ref_i;
        for j in 0..species {
            if j != i {
                let ref_j = require_positive(reference[(j, layer)], j, layer)?;
                a[(i, j)] = -dt * tensors.production(i, j, layer) / ref_j;
            }
        }
        r[i] = base[(i, layer)] + dt * tensors.production(i, i, layer);
    }

    dense::solve_in_place(&mut a, &mut r)?;
    Ok(r)
}
