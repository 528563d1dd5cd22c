//! Runge–Kutta schemes
//!
//! # Mathematical Background
//!
//! Both schemes are explicit one-step methods for `dc/dt = f(c)`:
//!
//! - **Order 2 (midpoint)** — two evaluator calls:
//!
//!   ```text
//!   k₁ = f(cₙ)
//!   cₙ₊₁ = cₙ + dt·f(cₙ + dt/2·k₁)
//!   ```
//!
//! - **Order 4 (classical)** — four evaluator calls combined with the
//!   Simpson weights 1/6, 1/3, 1/3, 1/6, implemented as a running sum
//!   so that only one stage buffer and one accumulator are alive at a
//!   time:
//!
//!   ```text
//!   cₙ₊₁ = cₙ + dt/6·(k₁ + 2k₂ + 2k₃ + k₄)
//!   ```
//!
//! Like Euler-forward these make no positivity claim; they are the
//! accuracy workhorses for non-stiff reaction networks.

use crate::error::SolverError;
use crate::physics::ReactionRhs;
use crate::reaction::methods::check_step;
use nalgebra::DMatrix;

/// Advance one midpoint (second-order Runge–Kutta) step in place.
pub fn runge_kutta_2<M: ReactionRhs + ?Sized>(
    dt: f64,
    cc: &mut DMatrix<f64>,
    model: &M,
) -> Result<(), SolverError> {
    let (species, layers) = check_step(dt, cc, model)?;

    let mut k = DMatrix::zeros(species, layers + 1);
    model.rhs(true, cc, &mut k);

    // Half step to the midpoint state.
    let mut midpoint = cc.clone();
    for layer in 1..=layers {
        for i in 0..species {
            midpoint[(i, layer)] += 0.5 * dt * k[(i, layer)];
        }
    }

    k.fill(0.0);
    model.rhs(false, &midpoint, &mut k);

    for layer in 1..=layers {
        for i in 0..species {
            cc[(i, layer)] += dt * k[(i, layer)];
        }
    }
    Ok(())
}

/// Advance one classical fourth-order Runge–Kutta step in place.
pub fn runge_kutta_4<M: ReactionRhs + ?Sized>(
    dt: f64,
    cc: &mut DMatrix<f64>,
    model: &M,
) -> Result<(), SolverError> {
    let (species, layers) = check_step(dt, cc, model)?;

    let mut k = DMatrix::zeros(species, layers + 1);
    let mut stage = cc.clone();
    let mut sum = DMatrix::zeros(species, layers + 1);

    // Stage 1: slope at the start of the interval.
    model.rhs(true, cc, &mut k);
    sum.copy_from(&k);
    stage.copy_from(cc);
    axpy_layers(&mut stage, 0.5 * dt, &k, layers, species);

    // Stage 2: midpoint slope using k1.
    k.fill(0.0);
    model.rhs(false, &stage, &mut k);
    accumulate(&mut sum, 2.0, &k, layers, species);
    stage.copy_from(cc);
    axpy_layers(&mut stage, 0.5 * dt, &k, layers, species);

    // Stage 3: midpoint slope using k2.
    k.fill(0.0);
    model.rhs(false, &stage, &mut k);
    accumulate(&mut sum, 2.0, &k, layers, species);
    stage.copy_from(cc);
    axpy_layers(&mut stage, dt, &k, layers, species);

    // Stage 4: slope at the end of the interval.
    k.fill(0.0);
    model.rhs(false, &stage, &mut k);
    accumulate(&mut sum, 1.0, &k, layers, species);

    axpy_layers(cc, dt / 6.0, &sum, layers, species);
    Ok(())
}

/// `target[layer slots] += factor * source` over the active layers.
fn axpy_layers(
    target: &mut DMatrix<f64>,
    factor: f64,
    source: &DMatrix<f64>,
    layers: usize,
    species: usize,
) {
    for layer in 1..=layers {
        for i in 0..species {
            target[(i, layer)] += factor * source[(i, layer)];
        }
    }
}

/// `sum += weight * k` over the active layers.
fn accumulate(
    sum: &mut DMatrix<f64>,
    weight: f64,
    k: &DMatrix<f64>,
    layers: usize,
    species: usize,
) {
    for layer in 1..=layers {
        for i in 0..species {
            sum[(i, layer)] += weight * k[(i, layer)];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LinearDecay;

    fn decay_field(layers: usize) -> DMatrix<f64> {
        DMatrix::from_fn(1, layers + 1, |_, c| if c == 0 { 0.0 } else { 1.0 })
    }

    #[test]
    fn test_rk2_matches_midpoint_formula() {
        // dc/dt = -k c: midpoint gives c·(1 - dt·k + dt²k²/2).
        let rate = 0.5;
        let dt = 0.1;
        let model = LinearDecay::new(vec![rate]).unwrap();
        let mut cc = decay_field(2);
        runge_kutta_2(dt, &mut cc, &model).unwrap();

        let expected = 1.0 - dt * rate + 0.5 * (dt * rate).powi(2);
        for layer in 1..=2 {
            assert!((cc[(0, layer)] - expected).abs() < 1e-14);
        }
    }

    #[test]
    fn test_rk4_close_to_exponential() {
        // One RK4 step on dc/dt = -0.5c with dt = 0.1 agrees with
        // exp(-0.05) to O(dt^5) ≈ 1e-8.
        let model = LinearDecay::new(vec![0.5]).unwrap();
        let mut cc = decay_field(1);
        runge_kutta_4(0.1, &mut cc, &model).unwrap();

        let exact = (-0.05f64).exp();
        assert!(
            (cc[(0, 1)] - exact).abs() < 1e-8,
            "rk4 {} vs exact {}",
            cc[(0, 1)],
            exact
        );
    }

    #[test]
    fn test_rk4_polynomial_exactness() {
        // RK4 integrates dc/dt = const exactly.
        struct ConstantGrowth;
        impl crate::physics::ReactionSystem for ConstantGrowth {
            fn species(&self) -> usize {
                1
            }
            fn name(&self) -> &str {
                "constant growth"
            }
        }
        impl ReactionRhs for ConstantGrowth {
            fn rhs(&self, _first: bool, cc: &DMatrix<f64>, rhs: &mut DMatrix<f64>) {
                for layer in 1..cc.ncols() {
                    rhs[(0, layer)] = 3.0;
                }
            }
        }

        let mut cc = decay_field(2);
        runge_kutta_4(0.5, &mut cc, &ConstantGrowth).unwrap();
        for layer in 1..=2 {
            assert!((cc[(0, layer)] - 2.5).abs() < 1e-13);
        }
    }

    #[test]
    fn test_rk2_more_accurate_than_euler_step() {
        let model = LinearDecay::new(vec![0.5]).unwrap();
        let dt = 0.1;
        let exact = (-0.05f64).exp();

        let mut euler_cc = decay_field(1);
        crate::reaction::methods::euler::euler_forward(dt, &mut euler_cc, &model).unwrap();
        let mut rk2_cc = decay_field(1);
        runge_kutta_2(dt, &mut rk2_cc, &model).unwrap();

        let euler_err = (euler_cc[(0, 1)] - exact).abs();
        let rk2_err = (rk2_cc[(0, 1)] - exact).abs();
        assert!(rk2_err < euler_err);
    }
}
