//! Time-stepping scheme implementations
//!
//! One module per scheme family. Every function advances the
//! concentration field by exactly one time step, in place, and is
//! generic over the evaluator convention it actually needs:
//!
//! | Family | Convention | Positivity | Conservation |
//! |---|---|---|---|
//! | [`euler`], [`runge_kutta`] | rhs | no | yes (exact flux balance) |
//! | [`patankar`] | ppdd | yes | no |
//! | [`modified_patankar`] | ppdd | yes | yes |
//! | [`extended_patankar`] | rhs | yes | yes |
//!
//! Callers who know their scheme at compile time call these functions
//! directly; runtime selection goes through
//! [`crate::reaction::integrate`].

pub mod euler;
pub mod extended_patankar;
pub mod modified_patankar;
pub mod patankar;
pub mod runge_kutta;

use crate::error::SolverError;
use crate::physics::ReactionSystem;
use nalgebra::DMatrix;

/// Shared entry validation: positive dt, matching species count, at
/// least one layer. Returns (species, layers).
pub(crate) fn check_step<M: ReactionSystem + ?Sized>(
    dt: f64,
    cc: &DMatrix<f64>,
    model: &M,
) -> Result<(usize, usize), SolverError> {
    if !(dt > 0.0) || !dt.is_finite() {
        return Err(SolverError::InvalidConfiguration {
            reason: format!("dt must be positive, got {}", dt),
        });
    }
    if cc.nrows() != model.species() {
        return Err(SolverError::DimensionMismatch {
            reason: format!(
                "concentration field has {} rows, model '{}' tracks {} species",
                cc.nrows(),
                model.name(),
                model.species()
            ),
        });
    }
    if cc.ncols() < 2 {
        return Err(SolverError::DimensionMismatch {
            reason: "concentration field needs at least one layer column".to_string(),
        });
    }
    Ok((cc.nrows(), cc.ncols() - 1))
}

/// Run a per-layer column update over layers 1..=layers.
///
/// Layers are independent (no cross-layer coupling in any reaction
/// scheme), so when the `parallel` feature is enabled and the column
/// is at least [`crate::reaction::parallel_threshold()`] layers tall,
/// the computation fans out over Rayon. Each closure call reads only
/// shared state and returns the new column; writes happen afterwards,
/// so the parallel path shares no mutable state.
pub(crate) fn update_layers<F>(
    layers: usize,
    cc: &mut DMatrix<f64>,
    compute: F,
) -> Result<(), SolverError>
where
    F: Fn(usize) -> Result<nalgebra::DVector<f64>, SolverError> + Sync,
{
    #[cfg(feature = "parallel")]
    if layers >= crate::reaction::parallel_threshold() {
        use rayon::prelude::*;
        let columns: Vec<(usize, nalgebra::DVector<f64>)> = (1..=layers)
            .into_par_iter()
            .map(|layer| compute(layer).map(|column| (layer, column)))
            .collect::<Result<_, _>>()?;
        for (layer, column) in columns {
            cc.column_mut(layer).copy_from(&column);
        }
        return Ok(());
    }

    for layer in 1..=layers {
        let column = compute(layer)?;
        cc.column_mut(layer).copy_from(&column);
    }
    Ok(())
}

/// Require strict positivity of an old concentration before it is used
/// as a Patankar denominator or EMP reference.
pub(crate) fn require_positive(
    value: f64,
    species: usize,
    layer: usize,
) -> Result<f64, SolverError> {
    if value > 0.0 {
        Ok(value)
    } else {
        Err(SolverError::NonPositiveConcentration {
            species,
            layer,
            value,
        })
    }
}
