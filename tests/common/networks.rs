//! Reaction networks with known behaviour for integration tests

use hydrocol_rs::physics::{ReactionPpdd, ReactionRhs, ReactionSystem, ReactionTensors};
use nalgebra::DMatrix;

/// Closed two-species exchange with asymmetric linear rates:
/// `0 -> 1` at `k01·c0`, `1 -> 0` at `k10·c1`.
///
/// Total mass per layer is invariant; the equilibrium split is
/// `c0 : c1 = k10 : k01`. Implements both evaluator conventions from
/// the same two fluxes.
pub struct ClosedExchange {
    pub k01: f64,
    pub k10: f64,
}

impl ClosedExchange {
    pub fn new(k01: f64, k10: f64) -> Self {
        Self { k01, k10 }
    }
}

impl ReactionSystem for ClosedExchange {
    fn species(&self) -> usize {
        2
    }
    fn name(&self) -> &str {
        "closed exchange"
    }
}

impl ReactionPpdd for ClosedExchange {
    fn ppdd(&self, _first: bool, cc: &DMatrix<f64>, tensors: &mut ReactionTensors) {
        for layer in 1..cc.ncols() {
            tensors.add_transfer(0, 1, layer, self.k01 * cc[(0, layer)]);
            tensors.add_transfer(1, 0, layer, self.k10 * cc[(1, layer)]);
        }
    }
}

impl ReactionRhs for ClosedExchange {
    fn rhs(&self, _first: bool, cc: &DMatrix<f64>, rhs: &mut DMatrix<f64>) {
        for layer in 1..cc.ncols() {
            let net = self.k01 * cc[(0, layer)] - self.k10 * cc[(1, layer)];
            rhs[(0, layer)] = -net;
            rhs[(1, layer)] = net;
        }
    }
}

/// One fast-decaying species next to one slow species: the classic
/// stiffness trap for explicit schemes.
pub struct StiffSink {
    pub fast_rate: f64,
    pub slow_rate: f64,
}

impl ReactionSystem for StiffSink {
    fn species(&self) -> usize {
        2
    }
    fn name(&self) -> &str {
        "stiff sink"
    }
}

impl ReactionPpdd for StiffSink {
    fn ppdd(&self, _first: bool, cc: &DMatrix<f64>, tensors: &mut ReactionTensors) {
        for layer in 1..cc.ncols() {
            tensors.add_external_destruction(0, layer, self.fast_rate * cc[(0, layer)]);
            tensors.add_external_destruction(1, layer, self.slow_rate * cc[(1, layer)]);
        }
    }
}

impl ReactionRhs for StiffSink {
    fn rhs(&self, _first: bool, cc: &DMatrix<f64>, rhs: &mut DMatrix<f64>) {
        for layer in 1..cc.ncols() {
            rhs[(0, layer)] = -self.fast_rate * cc[(0, layer)];
            rhs[(1, layer)] = -self.slow_rate * cc[(1, layer)];
        }
    }
}
