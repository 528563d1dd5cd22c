//! Diffusion of interface-located quantities
//!
//! Turbulence quantities (TKE, dissipation, length scale) live on the
//! layer interfaces, so their diffusion equation is discretised on the
//! dual grid: the unknowns sit on interior interfaces 1..=N-1, and the
//! control volume around interface `i` spans the adjacent half-layers,
//! `(h[i] + h[i+1])/2`. The diffusivity between two interface unknowns
//! is the mean of the interface values on either side of the cell the
//! flux crosses.
//!
//! Interior rows are 2..=N-2; rows 1 and N-1 carry the boundary
//! conditions. A `Neumann` flux enters the boundary row's right-hand
//! side scaled by `2·dt/(h[i] + h[i+1])` (the inverse control volume).
//!
//! # Narrow columns (N = 2)
//!
//! With two layers there is exactly one interior interface and the
//! interior loop is empty. The single-interior-interface diffusivity
//! and state value are mirrored into both boundary slots before
//! assembly, so both boundary layers see identical properties. A
//! Dirichlet side pins the single row (upper side takes precedence if
//! both are Dirichlet); with two Neumann conditions the row receives
//! both flux contributions.

use crate::error::SolverError;
use crate::grid::VerticalGrid;
use crate::transport::{BoundaryCondition, TridiagonalSystem};
use nalgebra::DVector;

/// One theta-scheme diffusion step for an interface-located profile.
///
/// Slot convention as everywhere in the crate: all profiles have
/// length N + 1. The unknowns are slots 1..=N-1; slots 0 and N are
/// boundary bookkeeping (and are used by the N = 2 mirroring).
#[derive(Debug, Clone, Copy)]
pub struct FaceDiffusion<'a> {
    /// Time step (strictly positive).
    pub dt: f64,
    /// Implicitness parameter in [0, 1].
    pub cnpar: f64,
    /// Surface-side boundary condition (interface N-1 row).
    pub upper: BoundaryCondition,
    /// Bottom-side boundary condition (interface 1 row).
    pub lower: BoundaryCondition,
    /// Interface diffusivities, slots 0..=N.
    pub nu: &'a DVector<f64>,
    /// Per-interface linear source coefficient (implicit diagonal).
    pub linear_source: &'a DVector<f64>,
    /// Per-interface constant source (explicit right-hand side).
    pub constant_source: &'a DVector<f64>,
}

impl<'a> FaceDiffusion<'a> {
    /// Check parameters against the grid.
    pub fn validate(&self, grid: &VerticalGrid) -> Result<(), SolverError> {
        let slots = grid.layers() + 1;
        if !(self.dt > 0.0) || !self.dt.is_finite() {
            return Err(SolverError::InvalidConfiguration {
                reason: format!("dt must be positive, got {}", self.dt),
            });
        }
        if !(0.0..=1.0).contains(&self.cnpar) {
            return Err(SolverError::InvalidConfiguration {
                reason: format!("cnpar must lie in [0, 1], got {}", self.cnpar),
            });
        }
        for (name, profile) in [
            ("nu", self.nu),
            ("linear_source", self.linear_source),
            ("constant_source", self.constant_source),
        ] {
            if profile.len() != slots {
                return Err(SolverError::DimensionMismatch {
                    reason: format!(
                        "{} has {} slots, grid needs {}",
                        name,
                        profile.len(),
                        slots
                    ),
                });
            }
        }
        Ok(())
    }

    /// Advance `y` by one time step in place.
    pub fn step(&self, grid: &VerticalGrid, y: &mut DVector<f64>) -> Result<(), SolverError> {
        self.validate(grid)?;
        let n = grid.layers();
        if y.len() != n + 1 {
            return Err(SolverError::DimensionMismatch {
                reason: format!("state has {} slots, grid needs {}", y.len(), n + 1),
            });
        }

        if n == 2 {
            return self.step_narrow(grid, y);
        }

        let h = grid.thicknesses();
        let (dt, cnpar) = (self.dt, self.cnpar);
        let mut sys = TridiagonalSystem::new(n + 1);

        // Interior rows.
        for i in 2..=n - 2 {
            let vol = h[i] + h[i + 1]; // twice the control volume
            let c = dt * (self.nu[i] + self.nu[i + 1]) / (h[i + 1] * vol);
            let a = dt * (self.nu[i - 1] + self.nu[i]) / (h[i] * vol);

            sys.sup[i] = -cnpar * c;
            sys.sub[i] = -cnpar * a;
            sys.diag[i] = 1.0 + cnpar * (a + c) - dt * self.linear_source[i];
            sys.rhs[i] = y[i]
                + (1.0 - cnpar) * (a * y[i - 1] - (a + c) * y[i] + c * y[i + 1])
                + dt * self.constant_source[i];
        }

        // Surface-side row (i = N-1).
        match self.upper {
            BoundaryCondition::Neumann(flux) => {
                let vol = h[n - 1] + h[n];
                let a = dt * (self.nu[n - 2] + self.nu[n - 1]) / (h[n - 1] * vol);
                sys.sub[n - 1] = -cnpar * a;
                sys.diag[n - 1] = 1.0 + cnpar * a - dt * self.linear_source[n - 1];
                sys.rhs[n - 1] = y[n - 1]
                    + (1.0 - cnpar) * a * (y[n - 2] - y[n - 1])
                    + dt * self.constant_source[n - 1]
                    + 2.0 * dt * flux / vol;
            }
            BoundaryCondition::Dirichlet(value) => {
                sys.sub[n - 1] = 0.0;
                sys.diag[n - 1] = 1.0;
                sys.rhs[n - 1] = value;
            }
        }

        // Bottom-side row (i = 1).
        match self.lower {
            BoundaryCondition::Neumann(flux) => {
                let vol = h[1] + h[2];
                let c = dt * (self.nu[1] + self.nu[2]) / (h[2] * vol);
                sys.sup[1] = -cnpar * c;
                sys.diag[1] = 1.0 + cnpar * c - dt * self.linear_source[1];
                sys.rhs[1] = y[1]
                    + (1.0 - cnpar) * c * (y[2] - y[1])
                    + dt * self.constant_source[1]
                    + 2.0 * dt * flux / vol;
            }
            BoundaryCondition::Dirichlet(value) => {
                sys.sup[1] = 0.0;
                sys.diag[1] = 1.0;
                sys.rhs[1] = value;
            }
        }

        sys.solve(1, n - 1, y)
    }

    /// N = 2: one unknown on the single interior interface, with the
    /// interior diffusivity and state mirrored into both boundary
    /// slots.
    fn step_narrow(&self, grid: &VerticalGrid, y: &mut DVector<f64>) -> Result<(), SolverError> {
        let h = grid.thicknesses();
        let dt = self.dt;
        let vol = h[1] + h[2];

        if let BoundaryCondition::Dirichlet(value) = self.upper {
            y[1] = value;
            return Ok(());
        }
        if let BoundaryCondition::Dirichlet(value) = self.lower {
            y[1] = value;
            return Ok(());
        }

        let (BoundaryCondition::Neumann(up), BoundaryCondition::Neumann(down)) =
            (self.upper, self.lower)
        else {
            unreachable!("Dirichlet sides returned above");
        };

        // Both mirrored neighbours equal the unknown itself, so the
        // diffusive exchange cancels in the explicit and the implicit
        // part alike; only sources and the boundary fluxes remain.
        let diag = 1.0 - dt * self.linear_source[1];
        let rhs =
            y[1] + dt * self.constant_source[1] + 2.0 * dt * (up + down) / vol;

        if diag.abs() < crate::transport::tridiagonal::PIVOT_FLOOR {
            return Err(SolverError::TridiagonalZeroPivot { row: 1 });
        }
        y[1] = rhs / diag;
        Ok(())
    }
}
