//! Independent first-order decay
//!
//! `dcᵢ/dt = -kᵢ·cᵢ` per species, per layer. The analytical solution
//! `cᵢ(t) = cᵢ(0)·exp(-kᵢ·t)` makes this the reference problem for
//! accuracy and positivity tests.

use crate::error::SolverError;
use crate::physics::{ReactionPpdd, ReactionRhs, ReactionSystem, ReactionTensors};
use nalgebra::DMatrix;

/// Per-species linear decay network.
///
/// In the ppdd convention the decay is pure external destruction
/// (diagonal `dd` entries), so the Patankar schemes treat it
/// implicitly and stay positive for any time step.
///
/// # Example
///
/// ```rust
/// use hydrocol_rs::models::LinearDecay;
/// use hydrocol_rs::physics::ReactionSystem;
///
/// let model = LinearDecay::new(vec![0.5, 0.1]).unwrap();
/// assert_eq!(model.species(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct LinearDecay {
    rates: Vec<f64>,
}

impl LinearDecay {
    /// Build from one non-negative decay constant per species.
    pub fn new(rates: Vec<f64>) -> Result<Self, SolverError> {
        if rates.is_empty() {
            return Err(SolverError::InvalidConfiguration {
                reason: "decay model needs at least one species".to_string(),
            });
        }
        if let Some(&bad) = rates.iter().find(|r| !(**r >= 0.0) || !r.is_finite()) {
            return Err(SolverError::InvalidConfiguration {
                reason: format!("decay rates must be non-negative, got {}", bad),
            });
        }
        Ok(Self { rates })
    }

    /// Analytical solution factor after time `t`.
    pub fn decay_factor(&self, species: usize, t: f64) -> f64 {
        (-self.rates[species] * t).exp()
    }
}

impl ReactionSystem for LinearDecay {
    fn species(&self) -> usize {
        self.rates.len()
    }

    fn name(&self) -> &str {
        "linear decay"
    }
}

impl ReactionRhs for LinearDecay {
    fn rhs(&self, _first_call: bool, cc: &DMatrix<f64>, rhs: &mut DMatrix<f64>) {
        for layer in 1..cc.ncols() {
            for (i, &k) in self.rates.iter().enumerate() {
                rhs[(i, layer)] = -k * cc[(i, layer)];
            }
        }
    }
}

impl ReactionPpdd for LinearDecay {
    fn ppdd(&self, _first_call: bool, cc: &DMatrix<f64>, tensors: &mut ReactionTensors) {
        for layer in 1..cc.ncols() {
            for (i, &k) in self.rates.iter().enumerate() {
                tensors.add_external_destruction(i, layer, k * cc[(i, layer)]);
            }
        }
    }
}
