//! Reaction simulation facade
//!
//! The schemes in [`crate::reaction`] advance exactly one step; the
//! surrounding model usually wants a whole run. [`ReactionSimulation`]
//! is that loop: validated configuration in, trajectory out, with the
//! bookkeeping a production run needs — exact time points, metadata
//! stamps, and a NaN/Inf check after every completed step.
//!
//! # Example
//!
//! ```rust
//! use hydrocol_rs::models::LinearDecay;
//! use hydrocol_rs::reaction::OdeScheme;
//! use hydrocol_rs::simulation::ReactionSimulation;
//! use nalgebra::DMatrix;
//!
//! let model = LinearDecay::new(vec![0.5]).unwrap();
//! let initial = DMatrix::from_fn(1, 4, |_, c| if c == 0 { 0.0 } else { 1.0 });
//!
//! let simulation = ReactionSimulation::new(OdeScheme::ModifiedPatankar, 10.0, 100);
//! let result = simulation.run(&initial, &model).unwrap();
//!
//! assert_eq!(result.len(), 101);
//! assert!((result.time_points.last().unwrap() - 10.0).abs() < 1e-12);
//! ```

use crate::error::SolverError;
use crate::physics::{ReactionPpdd, ReactionRhs};
use crate::reaction::{OdeScheme, integrate};
use nalgebra::DMatrix;
use std::collections::HashMap;

/// Configuration of one reaction run: which scheme, how long, how
/// many steps.
#[derive(Debug, Clone, Copy)]
pub struct ReactionSimulation {
    /// Time-stepping scheme.
    pub scheme: OdeScheme,
    /// Total simulated time.
    pub total_time: f64,
    /// Number of equal steps.
    pub time_steps: usize,
}

impl ReactionSimulation {
    /// Create a new run configuration.
    pub fn new(scheme: OdeScheme, total_time: f64, time_steps: usize) -> Self {
        Self {
            scheme,
            total_time,
            time_steps,
        }
    }

    /// Validate that the parameters are meaningful.
    pub fn validate(&self) -> Result<(), SolverError> {
        if !(self.total_time > 0.0) || !self.total_time.is_finite() {
            return Err(SolverError::InvalidConfiguration {
                reason: format!("total time must be positive, got {}", self.total_time),
            });
        }
        if self.time_steps == 0 {
            return Err(SolverError::InvalidConfiguration {
                reason: "time_steps must be greater than 0".to_string(),
            });
        }
        if !self.scheme.is_functional() {
            return Err(SolverError::DisabledScheme {
                name: self.scheme.name(),
                reason: "the 4th-order stage combination is not conservative",
            });
        }
        Ok(())
    }

    /// Run the configured number of steps from `initial`, recording
    /// the full trajectory.
    pub fn run<M>(&self, initial: &DMatrix<f64>, model: &M) -> Result<SimulationResult, SolverError>
    where
        M: ReactionRhs + ReactionPpdd,
    {
        self.validate()?;

        let dt = self.total_time / self.time_steps as f64;
        let mut cc = initial.clone();

        let mut time_points = Vec::with_capacity(self.time_steps + 1);
        let mut trajectory = Vec::with_capacity(self.time_steps + 1);
        time_points.push(0.0);
        trajectory.push(cc.clone());

        for step in 0..self.time_steps {
            integrate(self.scheme, dt, &mut cc, model)?;

            // Time points come from multiplication, not accumulation:
            // summing dt would drift by O(steps·eps) and the final
            // point would miss total_time.
            time_points.push((step + 1) as f64 * dt);
            trajectory.push(cc.clone());

            validate_state(&cc, step + 1)?;
        }

        let mut result = SimulationResult::new(time_points, trajectory, cc);
        result.add_metadata("scheme", self.scheme.name());
        result.add_metadata("model", model.name());
        result.add_metadata("time steps", &self.time_steps.to_string());
        result.add_metadata("dt", &dt.to_string());
        result.add_metadata("total time", &self.total_time.to_string());
        Ok(result)
    }
}

/// Everything one run produced.
#[derive(Debug, Clone)]
pub struct SimulationResult {
    /// Time at each recorded state (length steps + 1, starts at 0).
    pub time_points: Vec<f64>,
    /// Concentration field after every step, initial state first.
    pub trajectory: Vec<DMatrix<f64>>,
    /// The field after the final step.
    pub final_state: DMatrix<f64>,
    /// Free-form diagnostics (scheme, dt, model name, ...).
    pub metadata: HashMap<String, String>,
}

impl SimulationResult {
    /// Assemble a result; metadata starts empty.
    pub fn new(
        time_points: Vec<f64>,
        trajectory: Vec<DMatrix<f64>>,
        final_state: DMatrix<f64>,
    ) -> Self {
        Self {
            time_points,
            trajectory,
            final_state,
            metadata: HashMap::new(),
        }
    }

    /// Number of recorded states (steps + 1).
    pub fn len(&self) -> usize {
        self.time_points.len()
    }

    /// True when nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.time_points.is_empty()
    }

    /// Attach a metadata entry.
    pub fn add_metadata(&mut self, key: &str, value: &str) {
        self.metadata.insert(key.to_string(), value.to_string());
    }
}

/// Reject NaN/Inf after a completed step, before the bad state can
/// poison the rest of the run.
fn validate_state(cc: &DMatrix<f64>, step: usize) -> Result<(), SolverError> {
    if cc.iter().any(|v| !v.is_finite()) {
        return Err(SolverError::NonFiniteState { step });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LinearDecay, Npzd, NpzdParams};
    use crate::physics::{ReactionSystem, ReactionTensors};

    fn initial(values: &[f64], layers: usize) -> DMatrix<f64> {
        DMatrix::from_fn(values.len(), layers + 1, |r, c| {
            if c == 0 { 0.0 } else { values[r] }
        })
    }

    #[test]
    fn test_trajectory_length_and_time_points() {
        let model = LinearDecay::new(vec![0.3]).unwrap();
        let simulation = ReactionSimulation::new(OdeScheme::EulerForward, 20.0, 100);
        let result = simulation.run(&initial(&[1.0], 2), &model).unwrap();

        assert_eq!(result.len(), 101);
        assert_eq!(result.trajectory.len(), 101);
        assert!(result.time_points[0].abs() < 1e-15);
        assert!((result.time_points.last().unwrap() - 20.0).abs() < 1e-12);

        let dt = 0.2;
        for window in result.time_points.windows(2) {
            assert!((window[1] - window[0] - dt).abs() < 1e-12);
        }
    }

    #[test]
    fn test_decay_run_tracks_exponential() {
        let model = LinearDecay::new(vec![0.1]).unwrap();
        let simulation = ReactionSimulation::new(OdeScheme::RungeKutta4, 10.0, 100);
        let result = simulation.run(&initial(&[1.0], 1), &model).unwrap();

        let exact = (-1.0f64).exp();
        assert!((result.final_state[(0, 1)] - exact).abs() < 1e-8);
    }

    #[test]
    fn test_npzd_run_conserves_mass() {
        let model = Npzd::new(NpzdParams::default()).unwrap();
        let start = initial(&[1.0, 0.5, 0.2, 0.1], 3);
        let simulation =
            ReactionSimulation::new(OdeScheme::ModifiedPatankarRungeKutta2, 30.0, 300);
        let result = simulation.run(&start, &model).unwrap();

        for layer in 1..=3 {
            let total: f64 = (0..4).map(|i| result.final_state[(i, layer)]).sum();
            assert!((total - 1.8).abs() < 1e-10, "layer {} total {}", layer, total);
            for i in 0..4 {
                assert!(result.final_state[(i, layer)] > 0.0);
            }
        }
    }

    #[test]
    fn test_metadata_stamps() {
        let model = LinearDecay::new(vec![0.5]).unwrap();
        let simulation = ReactionSimulation::new(OdeScheme::Patankar, 100.0, 500);
        let result = simulation.run(&initial(&[1.0], 1), &model).unwrap();

        assert_eq!(result.metadata.get("scheme").unwrap(), "Patankar");
        assert_eq!(result.metadata.get("model").unwrap(), "linear decay");
        assert_eq!(result.metadata.get("time steps").unwrap(), "500");
        let dt: f64 = result.metadata.get("dt").unwrap().parse().unwrap();
        assert!((dt - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_nan_state_rejected_with_step_number() {
        struct NanModel;
        impl ReactionSystem for NanModel {
            fn species(&self) -> usize {
                1
            }
            fn name(&self) -> &str {
                "NaN model"
            }
        }
        impl ReactionRhs for NanModel {
            fn rhs(&self, _first: bool, cc: &DMatrix<f64>, rhs: &mut DMatrix<f64>) {
                for layer in 1..cc.ncols() {
                    rhs[(0, layer)] = f64::NAN;
                }
            }
        }
        impl ReactionPpdd for NanModel {
            fn ppdd(&self, _first: bool, _cc: &DMatrix<f64>, _tensors: &mut ReactionTensors) {}
        }

        let simulation = ReactionSimulation::new(OdeScheme::EulerForward, 1.0, 10);
        let err = simulation.run(&initial(&[1.0], 1), &NanModel).unwrap_err();
        assert_eq!(err, SolverError::NonFiniteState { step: 1 });
    }

    #[test]
    fn test_invalid_configuration_rejected() {
        let model = LinearDecay::new(vec![0.5]).unwrap();
        let start = initial(&[1.0], 1);

        let zero_steps = ReactionSimulation::new(OdeScheme::EulerForward, 1.0, 0);
        assert!(zero_steps.run(&start, &model).is_err());

        let negative_time = ReactionSimulation::new(OdeScheme::EulerForward, -1.0, 10);
        assert!(negative_time.run(&start, &model).is_err());

        let disabled = ReactionSimulation::new(OdeScheme::PatankarRungeKutta4, 1.0, 10);
        assert!(matches!(
            disabled.run(&start, &model),
            Err(SolverError::DisabledScheme { .. })
        ));
    }
}
