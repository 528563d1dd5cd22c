//! Extended Modified Patankar schemes
//!
//! # Mathematical Background
//!
//! The Modified Patankar family conserves mass but needs the full
//! production/destruction decomposition. The Extended Modified
//! Patankar (EMP) schemes get positivity *and* stoichiometric
//! conservation from the plain right-hand side alone, even when
//! several species limit a reaction simultaneously: the whole Euler
//! increment of one layer is scaled by a single multiplier,
//!
//! ```text
//! c ← c + dt·f(c)·p ,
//! ```
//!
//! with `p` the root of the fixed-point polynomial over the limiting
//! set `J = { j : f_j < 0 }`
//!
//! ```text
//! Π_{j∈J} (1 + dt·f_j/c_j · p) = p ,
//! ```
//!
//! solved per layer by [`crate::reaction::bisection`]. Because one
//! scalar scales every species alike, any flux balance present in
//! `f` (`Σ_j f_j = 0` for a closed network) carries over to the
//! discrete update unchanged.
//!
//! The second-order variant runs predictor and corrector. On the
//! corrector, a species whose stage-2 derivative is positive has that
//! derivative re-weighted by the ratio of the predictor to the old
//! concentration before the two stages are averaged — the production
//! analogue of the Patankar weighting, damping production of species
//! the predictor collapsed. The constraint set is then re-derived
//! from the averaged derivative for the second bisection. The
//! re-weighting trades a small O(dt²)-per-step conservation deviation
//! for stability of the production terms; the first-order scheme
//! remains exactly conservative.
//!
//! # Stiffness diagnostic
//!
//! A multiplier that lands below
//! [`STIFFNESS_THRESHOLD`](crate::reaction::bisection::STIFFNESS_THRESHOLD)
//! means the positivity bound, not accuracy, dictated the step — the
//! system is stiff or nearly non-positive and the scheme handles it
//! poorly. The step still completes, with a `log::warn!` diagnostic.

use crate::error::SolverError;
use crate::physics::ReactionRhs;
use crate::reaction::bisection::{self, STIFFNESS_THRESHOLD};
use crate::reaction::methods::{check_step, require_positive, update_layers};
use log::warn;
use nalgebra::{DMatrix, DVector};

/// Advance one first-order Extended Modified Patankar step in place.
pub fn extended_modified_patankar<M: ReactionRhs + ?Sized>(
    dt: f64,
    cc: &mut DMatrix<f64>,
    model: &M,
) -> Result<(), SolverError> {
    let (species, layers) = check_step(dt, cc, model)?;

    let mut derivative = DMatrix::zeros(species, layers + 1);
    model.rhs(true, cc, &mut derivative);

    let base = cc.clone();
    update_layers(layers, cc, |layer| {
        scaled_euler_column(dt, species, layer, &base, &derivative)
    })
}

/// Advance one second-order Extended Modified Patankar step in place.
pub fn extended_modified_patankar_2<M: ReactionRhs + ?Sized>(
    dt: f64,
    cc: &mut DMatrix<f64>,
    model: &M,
) -> Result<(), SolverError> {
    let (species, layers) = check_step(dt, cc, model)?;

    // Predictor: first-order EMP step.
    let mut stage1 = DMatrix::zeros(species, layers + 1);
    model.rhs(true, cc, &mut stage1);

    let base = cc.clone();
    let mut predictor = cc.clone();
    update_layers(layers, &mut predictor, |layer| {
        scaled_euler_column(dt, species, layer, &base, &stage1)
    })?;

    // Corrector: re-weight positive stage-2 derivatives by
    // predictor/old, average with stage 1, re-derive the constraint
    // set inside the bisection.
    let mut stage2 = DMatrix::zeros(species, layers + 1);
    model.rhs(false, &predictor, &mut stage2);

    update_layers(layers, cc, |layer| {
        let mut concentrations = Vec::with_capacity(species);
        let mut averaged = Vec::with_capacity(species);
        for i in 0..species {
            let old = base[(i, layer)];
            let mut d2 = stage2[(i, layer)];
            if d2 > 0.0 {
                d2 *= predictor[(i, layer)] / require_positive(old, i, layer)?;
            }
            concentrations.push(old);
            averaged.push(0.5 * (stage1[(i, layer)] + d2));
        }

        let solve = bisection::find_multiplier(dt, &concentrations, &averaged, layer)?;
        diagnose_stiffness(solve.p, layer);

        Ok(DVector::from_fn(species, |i, _| {
            concentrations[i] + dt * averaged[i] * solve.p
        }))
    })
}

/// One layer of `c + dt·f·p` with the bisection multiplier.
fn scaled_euler_column(
    dt: f64,
    species: usize,
    layer: usize,
    base: &DMatrix<f64>,
    derivative: &DMatrix<f64>,
) -> Result<DVector<f64>, SolverError> {
    let concentrations: Vec<f64> = (0..species).map(|i| base[(i, layer)]).collect();
    let derivatives: Vec<f64> = (0..species).map(|i| derivative[(i, layer)]).collect();

    let solve = bisection::find_multiplier(dt, &concentrations, &derivatives, layer)?;
    diagnose_stiffness(solve.p, layer);

    Ok(DVector::from_fn(species, |i, _| {
        concentrations[i] + dt * derivatives[i] * solve.p
    }))
}

/// Warn when the multiplier collapsed: the step was dictated by the
/// positivity bound rather than accuracy.
fn diagnose_stiffness(p: f64, layer: usize) {
    if p < STIFFNESS_THRESHOLD {
        warn!(
            "EMP multiplier {:.3e} in layer {} fell below {:.0e}: stiff or \
             near-non-positive system, result is low quality",
            p, layer, STIFFNESS_THRESHOLD
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LinearDecay;
    use crate::physics::ReactionSystem;

    /// Closed two-species exchange (Σ rhs = 0 in every layer).
    struct Exchange {
        k01: f64,
        k10: f64,
    }

    impl ReactionSystem for Exchange {
        fn species(&self) -> usize {
            2
        }
        fn name(&self) -> &str {
            "two-species exchange"
        }
    }

    impl ReactionRhs for Exchange {
        fn rhs(&self, _first: bool, cc: &DMatrix<f64>, rhs: &mut DMatrix<f64>) {
            for layer in 1..cc.ncols() {
                let flux = self.k01 * cc[(0, layer)] - self.k10 * cc[(1, layer)];
                rhs[(0, layer)] = -flux;
                rhs[(1, layer)] = flux;
            }
        }
    }

    fn field(values: &[f64]) -> DMatrix<f64> {
        DMatrix::from_fn(values.len(), 2, |r, c| if c == 0 { 0.0 } else { values[r] })
    }

    #[test]
    fn test_emp1_single_species_closed_form() {
        // f = -2, c = 1, dt = 1: p = 1/3, c⁺ = 1 - 2/3 = 1/3.
        let model = LinearDecay::new(vec![2.0]).unwrap();
        let mut cc = field(&[1.0]);
        extended_modified_patankar(1.0, &mut cc, &model).unwrap();
        assert!(
            (cc[(0, 1)] - 1.0 / 3.0).abs() < 1e-6,
            "c = {} should be 1/3",
            cc[(0, 1)]
        );
    }

    #[test]
    fn test_emp1_conserves_closed_network_exactly() {
        let model = Exchange { k01: 1.0, k10: 0.25 };
        let mut cc = field(&[2.0, 1.0]);
        // A step so large that p < 1 definitely binds.
        extended_modified_patankar(50.0, &mut cc, &model).unwrap();
        let total = cc[(0, 1)] + cc[(1, 1)];
        assert!((total - 3.0).abs() < 1e-12, "mass drifted to {}", total);
        assert!(cc[(0, 1)] > 0.0 && cc[(1, 1)] > 0.0);
    }

    #[test]
    fn test_emp1_pure_growth_is_plain_euler() {
        // No negative derivative anywhere: p short-circuits to 1.
        struct Growth;
        impl ReactionSystem for Growth {
            fn species(&self) -> usize {
                1
            }
            fn name(&self) -> &str {
                "growth"
            }
        }
        impl ReactionRhs for Growth {
            fn rhs(&self, _first: bool, cc: &DMatrix<f64>, rhs: &mut DMatrix<f64>) {
                for layer in 1..cc.ncols() {
                    rhs[(0, layer)] = 0.4 * cc[(0, layer)];
                }
            }
        }

        let mut cc = field(&[1.0]);
        extended_modified_patankar(0.5, &mut cc, &Growth).unwrap();
        assert!((cc[(0, 1)] - 1.2).abs() < 1e-14);
    }

    #[test]
    fn test_emp2_positivity_under_brutal_step() {
        let model = Exchange { k01: 3.0, k10: 0.5 };
        let mut cc = field(&[1.0, 1.0]);
        extended_modified_patankar_2(10.0, &mut cc, &model).unwrap();

        assert!(cc[(0, 1)] > 0.0 && cc[(1, 1)] > 0.0);
        // Even for a step this far outside the resolved regime, the
        // corrector re-weighting must keep the mass deviation bounded
        // rather than exploding.
        let total = cc[(0, 1)] + cc[(1, 1)];
        assert!((total - 2.0).abs() < 0.5, "mass drifted to {}", total);
    }

    #[test]
    fn test_emp2_conservation_deviation_shrinks_with_dt() {
        let model = Exchange { k01: 2.0, k10: 0.4 };
        let deviation = |dt: f64| -> f64 {
            let mut cc = field(&[1.5, 0.5]);
            extended_modified_patankar_2(dt, &mut cc, &model).unwrap();
            (cc[(0, 1)] + cc[(1, 1)] - 2.0).abs()
        };
        // The per-step deviation is O(dt²): halving dt must roughly
        // quarter it (margin for the bisection's own tolerance).
        let coarse = deviation(0.02);
        let fine = deviation(0.01);
        assert!(
            coarse > fine * 2.5,
            "deviation {} vs {} does not shrink like dt²",
            coarse,
            fine
        );
    }

    #[test]
    fn test_emp2_tracks_decay_reasonably() {
        let rate = 1.0;
        let model = LinearDecay::new(vec![rate]).unwrap();
        let exact = (-rate * 0.5f64).exp();

        let mut cc = field(&[1.0]);
        for _ in 0..10 {
            extended_modified_patankar_2(0.05, &mut cc, &model).unwrap();
        }
        assert!(cc[(0, 1)] > 0.0 && cc[(0, 1)] < 1.0);
        assert!((cc[(0, 1)] - exact).abs() < 2e-2);
    }

    #[test]
    fn test_emp1_zero_concentration_negative_derivative_errors() {
        // A linear decay rhs vanishes at c = 0 and would short-circuit;
        // a constant sink keeps the derivative negative at zero.
        struct ConstantSink;
        impl ReactionSystem for ConstantSink {
            fn species(&self) -> usize {
                1
            }
            fn name(&self) -> &str {
                "constant sink"
            }
        }
        impl ReactionRhs for ConstantSink {
            fn rhs(&self, _first: bool, cc: &DMatrix<f64>, rhs: &mut DMatrix<f64>) {
                for layer in 1..cc.ncols() {
                    rhs[(0, layer)] = -1.0;
                }
            }
        }
        let mut cc = field(&[0.0]);
        let err = extended_modified_patankar(1.0, &mut cc, &ConstantSink).unwrap_err();
        assert!(matches!(
            err,
            SolverError::NonPositiveConcentration { species: 0, .. }
        ));
    }
}
