//! Nutrient–phytoplankton–zooplankton–detritus network
//!
//! # Physical background
//!
//! The standard four-compartment idealisation of a pelagic ecosystem.
//! Matter cycles through
//!
//! ```text
//!   N --uptake--> P --grazing--> Z
//!   P --mortality--> D    Z --mortality--> D
//!   D --remineralisation--> N
//! ```
//!
//! with Michaelis–Menten limitation of uptake and grazing. Every
//! process is a pairwise transfer between two compartments, so the
//! network is closed: total mass `N + P + Z + D` is invariant, and
//! the conservative schemes must reproduce that exactly.
//!
//! Uptake can be scaled per layer by a light factor (1 at the
//! surface, decaying with depth) to give the column some vertical
//! structure; the reaction itself stays column-local.

use crate::error::SolverError;
use crate::physics::{ReactionPpdd, ReactionRhs, ReactionSystem, ReactionTensors};
use nalgebra::{DMatrix, DVector};

/// Nutrient row of the [`Npzd`] concentration field.
pub const NUTRIENT: usize = 0;
/// Phytoplankton row.
pub const PHYTOPLANKTON: usize = 1;
/// Zooplankton row.
pub const ZOOPLANKTON: usize = 2;
/// Detritus row.
pub const DETRITUS: usize = 3;

/// Rate parameters of the NPZD network (all per day, concentrations
/// in mmol N m⁻³).
#[derive(Debug, Clone, Copy)]
pub struct NpzdParams {
    /// Maximum phytoplankton uptake rate μ.
    pub uptake_rate: f64,
    /// Half-saturation nutrient concentration for uptake.
    pub uptake_half_saturation: f64,
    /// Maximum zooplankton grazing rate g.
    pub grazing_rate: f64,
    /// Half-saturation phytoplankton concentration for grazing.
    pub grazing_half_saturation: f64,
    /// Phytoplankton mortality rate.
    pub phytoplankton_mortality: f64,
    /// Zooplankton mortality rate.
    pub zooplankton_mortality: f64,
    /// Detritus remineralisation rate.
    pub remineralisation_rate: f64,
}

impl Default for NpzdParams {
    fn default() -> Self {
        Self {
            uptake_rate: 1.0,
            uptake_half_saturation: 0.5,
            grazing_rate: 0.5,
            grazing_half_saturation: 0.25,
            phytoplankton_mortality: 0.05,
            zooplankton_mortality: 0.1,
            remineralisation_rate: 0.08,
        }
    }
}

impl NpzdParams {
    /// All rates must be non-negative, half-saturations strictly
    /// positive.
    pub fn validate(&self) -> Result<(), SolverError> {
        let rates = [
            ("uptake_rate", self.uptake_rate),
            ("grazing_rate", self.grazing_rate),
            ("phytoplankton_mortality", self.phytoplankton_mortality),
            ("zooplankton_mortality", self.zooplankton_mortality),
            ("remineralisation_rate", self.remineralisation_rate),
        ];
        for (name, value) in rates {
            if !(value >= 0.0) || !value.is_finite() {
                return Err(SolverError::InvalidConfiguration {
                    reason: format!("{} must be non-negative, got {}", name, value),
                });
            }
        }
        for (name, value) in [
            ("uptake_half_saturation", self.uptake_half_saturation),
            ("grazing_half_saturation", self.grazing_half_saturation),
        ] {
            if !(value > 0.0) || !value.is_finite() {
                return Err(SolverError::InvalidConfiguration {
                    reason: format!("{} must be strictly positive, got {}", name, value),
                });
            }
        }
        Ok(())
    }
}

/// The four-compartment NPZD reaction network.
///
/// # Example
///
/// ```rust
/// use hydrocol_rs::models::{Npzd, NpzdParams};
/// use hydrocol_rs::physics::ReactionSystem;
///
/// let model = Npzd::new(NpzdParams::default()).unwrap();
/// assert_eq!(model.species(), 4);
/// ```
#[derive(Debug, Clone)]
pub struct Npzd {
    params: NpzdParams,
    /// Optional per-layer uptake scaling (slots 0..=N); `None` means
    /// full light everywhere.
    light: Option<DVector<f64>>,
}

impl Npzd {
    /// Build the network after validating the parameters.
    pub fn new(params: NpzdParams) -> Result<Self, SolverError> {
        params.validate()?;
        Ok(Self {
            params,
            light: None,
        })
    }

    /// Scale uptake per layer with the given factors in [0, 1]
    /// (slots 0..=N, slot 0 unused).
    pub fn with_light_profile(mut self, light: DVector<f64>) -> Result<Self, SolverError> {
        if let Some(&bad) = light
            .iter()
            .skip(1)
            .find(|f| !(0.0..=1.0).contains(*f))
        {
            return Err(SolverError::InvalidConfiguration {
                reason: format!("light factors must lie in [0, 1], got {}", bad),
            });
        }
        self.light = Some(light);
        Ok(self)
    }

    fn light_factor(&self, layer: usize) -> f64 {
        self.light.as_ref().map_or(1.0, |l| l[layer])
    }

    /// The five process rates of one layer, all non-negative.
    fn fluxes(&self, cc: &DMatrix<f64>, layer: usize) -> [f64; 5] {
        let p = &self.params;
        let n = cc[(NUTRIENT, layer)].max(0.0);
        let phy = cc[(PHYTOPLANKTON, layer)].max(0.0);
        let zoo = cc[(ZOOPLANKTON, layer)].max(0.0);
        let det = cc[(DETRITUS, layer)].max(0.0);

        let uptake =
            self.light_factor(layer) * p.uptake_rate * n / (p.uptake_half_saturation + n) * phy;
        let grazing = p.grazing_rate * phy / (p.grazing_half_saturation + phy) * zoo;
        let p_mortality = p.phytoplankton_mortality * phy;
        let z_mortality = p.zooplankton_mortality * zoo;
        let remineralisation = p.remineralisation_rate * det;

        [uptake, grazing, p_mortality, z_mortality, remineralisation]
    }
}

impl ReactionSystem for Npzd {
    fn species(&self) -> usize {
        4
    }

    fn name(&self) -> &str {
        "NPZD"
    }
}

impl ReactionPpdd for Npzd {
    fn ppdd(&self, _first_call: bool, cc: &DMatrix<f64>, tensors: &mut ReactionTensors) {
        for layer in 1..cc.ncols() {
            let [uptake, grazing, p_mort, z_mort, remin] = self.fluxes(cc, layer);
            tensors.add_transfer(NUTRIENT, PHYTOPLANKTON, layer, uptake);
            tensors.add_transfer(PHYTOPLANKTON, ZOOPLANKTON, layer, grazing);
            tensors.add_transfer(PHYTOPLANKTON, DETRITUS, layer, p_mort);
            tensors.add_transfer(ZOOPLANKTON, DETRITUS, layer, z_mort);
            tensors.add_transfer(DETRITUS, NUTRIENT, layer, remin);
        }
    }
}

impl ReactionRhs for Npzd {
    fn rhs(&self, _first_call: bool, cc: &DMatrix<f64>, rhs: &mut DMatrix<f64>) {
        for layer in 1..cc.ncols() {
            let [uptake, grazing, p_mort, z_mort, remin] = self.fluxes(cc, layer);
            rhs[(NUTRIENT, layer)] = remin - uptake;
            rhs[(PHYTOPLANKTON, layer)] = uptake - grazing - p_mort;
            rhs[(ZOOPLANKTON, layer)] = grazing - z_mort;
            rhs[(DETRITUS, layer)] = p_mort + z_mort - remin;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(values: [f64; 4], layers: usize) -> DMatrix<f64> {
        DMatrix::from_fn(4, layers + 1, |r, c| if c == 0 { 0.0 } else { values[r] })
    }

    #[test]
    fn test_rhs_is_closed() {
        let model = Npzd::new(NpzdParams::default()).unwrap();
        let cc = column([1.0, 0.5, 0.2, 0.1], 3);
        let mut rhs = DMatrix::zeros(4, 4);
        model.rhs(true, &cc, &mut rhs);

        for layer in 1..=3 {
            let net: f64 = (0..4).map(|i| rhs[(i, layer)]).sum();
            assert!(net.abs() < 1e-15, "layer {} leaks {}", layer, net);
        }
    }

    #[test]
    fn test_rhs_matches_ppdd_net_rate() {
        let model = Npzd::new(NpzdParams::default()).unwrap();
        let cc = column([2.0, 0.8, 0.3, 0.5], 2);

        let mut rhs = DMatrix::zeros(4, 3);
        model.rhs(true, &cc, &mut rhs);
        let mut tensors = ReactionTensors::new(4, 2);
        model.ppdd(true, &cc, &mut tensors);

        for layer in 1..=2 {
            for i in 0..4 {
                assert!(
                    (rhs[(i, layer)] - tensors.net_rate(i, layer)).abs() < 1e-14,
                    "species {} layer {}",
                    i,
                    layer
                );
            }
        }
    }

    #[test]
    fn test_light_profile_damps_uptake_at_depth() {
        let params = NpzdParams::default();
        let surface_model = Npzd::new(params).unwrap();

        let light = DVector::from_vec(vec![0.0, 0.1, 1.0]);
        let shaded_model = Npzd::new(params).unwrap().with_light_profile(light).unwrap();

        let cc = column([1.0, 0.5, 0.0, 0.0], 2);
        let mut full = DMatrix::zeros(4, 3);
        let mut shaded = DMatrix::zeros(4, 3);
        surface_model.rhs(true, &cc, &mut full);
        shaded_model.rhs(true, &cc, &mut shaded);

        // Layer 2 has full light in both models; layer 1 is dim.
        assert!((shaded[(PHYTOPLANKTON, 2)] - full[(PHYTOPLANKTON, 2)]).abs() < 1e-15);
        assert!(shaded[(PHYTOPLANKTON, 1)] < full[(PHYTOPLANKTON, 1)]);
    }

    #[test]
    fn test_invalid_light_profile_rejected() {
        let light = DVector::from_vec(vec![0.0, 1.5]);
        let result = Npzd::new(NpzdParams::default())
            .unwrap()
            .with_light_profile(light);
        assert!(result.is_err());
    }

    #[test]
    fn test_negative_rate_rejected() {
        let params = NpzdParams {
            grazing_rate: -1.0,
            ..NpzdParams::default()
        };
        assert!(Npzd::new(params).is_err());
    }
}
