//! Diffusion of cell-centred quantities
//!
//! # Discretisation
//!
//! For layer `i` with thickness `h[i]`, the diffusive exchange with the
//! neighbour above goes through interface `i` (diffusivity `nu[i]`)
//! across the distance `(h[i] + h[i+1])/2` between the two cell
//! centres. One step of the theta-scheme produces, per interior row,
//!
//! ```text
//! a = 2·dt·nu[i-1] / ((h[i] + h[i-1])·h[i])     (coupling below)
//! c = 2·dt·nu[i]   / ((h[i] + h[i+1])·h[i])     (coupling above)
//!
//! -cnpar·a·Y⁺[i-1] + (1 + cnpar·(a+c) - dt·L[i])·Y⁺[i] - cnpar·c·Y⁺[i+1]
//!     = Y[i] + (1-cnpar)·(a·Y[i-1] - (a+c)·Y[i] + c·Y[i+1]) + dt·Q[i]
//! ```
//!
//! The linear source `L` is folded entirely into the implicit
//! diagonal; the constant source `Q` is added explicitly. Because
//! `h[i]·c(i) == h[i+1]·a(i+1)`, interior exchange is conservative in
//! `Σ h·Y` for any `cnpar`.
//!
//! # Boundary rows
//!
//! - `Neumann(F)`: the prescribed flux enters the boundary row's
//!   right-hand side as `dt·F/h`; positive `F` adds mass at either end.
//! - `Dirichlet(v)`: the row is pinned (`diag = 1`, `rhs = v`) and
//!   decoupled from its neighbour; sources and relaxation do not apply
//!   to a pinned row.

use crate::error::SolverError;
use crate::grid::VerticalGrid;
use crate::transport::{BoundaryCondition, TridiagonalSystem};
use nalgebra::DVector;

/// Optional relaxation of the profile toward an observed profile.
///
/// Adds an implicit `dt/τ[i]` to the diagonal and `dt·target[i]/τ[i]`
/// to the right-hand side, nudging layer `i` toward `target[i]` on the
/// timescale `τ[i]`. Use `f64::INFINITY` in `timescale` to switch the
/// nudging off for individual layers.
#[derive(Debug, Clone, Copy)]
pub struct Relaxation<'a> {
    /// Per-layer relaxation timescale τ (slots 0..=N, strictly
    /// positive).
    pub timescale: &'a DVector<f64>,
    /// Per-layer observed profile (slots 0..=N).
    pub target: &'a DVector<f64>,
}

/// One theta-scheme diffusion step for a cell-centred profile.
///
/// All slices follow the crate-wide slot convention (length N + 1,
/// slot 0 bookkeeping). `nu` lives on interfaces: `nu[i]` is the
/// diffusivity at the interface *above* layer `i`, so `nu[0]` (bed)
/// and `nu[N]` (surface) are never read — boundary exchange is
/// governed entirely by the boundary conditions.
///
/// # Example
///
/// ```rust
/// use hydrocol_rs::grid::VerticalGrid;
/// use hydrocol_rs::transport::{BoundaryCondition, CenterDiffusion};
///
/// let grid = VerticalGrid::uniform(4, 4.0).unwrap();
/// let nu = grid.uniform_profile(0.5);
/// let zero = grid.zero_profile();
/// let mut y = grid.uniform_profile(1.0);
///
/// CenterDiffusion {
///     dt: 0.1,
///     cnpar: 1.0,
///     upper: BoundaryCondition::Dirichlet(2.0),
///     lower: BoundaryCondition::Neumann(0.0),
///     nu: &nu,
///     linear_source: &zero,
///     constant_source: &zero,
///     relaxation: None,
///     positive: false,
/// }
/// .step(&grid, &mut y)
/// .unwrap();
///
/// assert_eq!(y[4], 2.0); // pinned by the Dirichlet row
/// assert!(y[3] > 1.0);   // warming from above
/// ```
#[derive(Debug, Clone, Copy)]
pub struct CenterDiffusion<'a> {
    /// Time step (strictly positive).
    pub dt: f64,
    /// Implicitness parameter in [0, 1].
    pub cnpar: f64,
    /// Surface boundary condition (layer N side).
    pub upper: BoundaryCondition,
    /// Bottom boundary condition (layer 1 side).
    pub lower: BoundaryCondition,
    /// Interface diffusivities, slots 0..=N.
    pub nu: &'a DVector<f64>,
    /// Per-layer linear source coefficient L (folded into the implicit
    /// diagonal; non-positive in the physically meaningful regime).
    pub linear_source: &'a DVector<f64>,
    /// Per-layer constant source Q (added explicitly).
    pub constant_source: &'a DVector<f64>,
    /// Optional relaxation toward an observed profile.
    pub relaxation: Option<Relaxation<'a>>,
    /// Positive-definite source handling: a negative constant source on
    /// a strictly positive quantity is divided by the old value and
    /// folded into the implicit diagonal (the Patankar trick), so the
    /// step cannot undershoot zero.
    pub positive: bool,
}

impl<'a> CenterDiffusion<'a> {
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
        if let Some(relax) = &self.relaxation {
            if relax.timescale.len() != slots || relax.target.len() != slots {
                return Err(SolverError::DimensionMismatch {
                    reason: "relaxation profiles must match the grid".to_string(),
                });
            }
            for i in 1..slots {
                if !(relax.timescale[i] > 0.0) {
                    return Err(SolverError::InvalidConfiguration {
                        reason: format!(
                            "relaxation timescale must be positive, got {} in layer {}",
                            relax.timescale[i], i
                        ),
                    });
                }
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

        let h = grid.thicknesses();
        let (dt, cnpar) = (self.dt, self.cnpar);
        let mut sys = TridiagonalSystem::new(n + 1);

        // Interior rows.
        for i in 2..=n - 1 {
            let c = 2.0 * dt * self.nu[i] / ((h[i] + h[i + 1]) * h[i]);
            let a = 2.0 * dt * self.nu[i - 1] / ((h[i] + h[i - 1]) * h[i]);

            sys.sup[i] = -cnpar * c;
            sys.sub[i] = -cnpar * a;
            sys.diag[i] = 1.0 + cnpar * (a + c) - dt * self.linear_source[i];
            sys.rhs[i] = y[i]
                + (1.0 - cnpar) * (a * y[i - 1] - (a + c) * y[i] + c * y[i + 1]);
            self.apply_sources(i, y[i], &mut sys)?;
        }

        // Surface row (i = N).
        match self.upper {
            BoundaryCondition::Neumann(flux) => {
                let a = 2.0 * dt * self.nu[n - 1] / ((h[n] + h[n - 1]) * h[n]);
                sys.sub[n] = -cnpar * a;
                sys.diag[n] = 1.0 + cnpar * a - dt * self.linear_source[n];
                sys.rhs[n] = y[n] + (1.0 - cnpar) * a * (y[n - 1] - y[n]) + dt * flux / h[n];
                self.apply_sources(n, y[n], &mut sys)?;
            }
            BoundaryCondition::Dirichlet(value) => {
                sys.sub[n] = 0.0;
                sys.diag[n] = 1.0;
                sys.rhs[n] = value;
            }
        }

        // Bottom row (i = 1).
        match self.lower {
            BoundaryCondition::Neumann(flux) => {
                let c = 2.0 * dt * self.nu[1] / ((h[1] + h[2]) * h[1]);
                sys.sup[1] = -cnpar * c;
                sys.diag[1] = 1.0 + cnpar * c - dt * self.linear_source[1];
                sys.rhs[1] = y[1] + (1.0 - cnpar) * c * (y[2] - y[1]) + dt * flux / h[1];
                self.apply_sources(1, y[1], &mut sys)?;
            }
            BoundaryCondition::Dirichlet(value) => {
                sys.sup[1] = 0.0;
                sys.diag[1] = 1.0;
                sys.rhs[1] = value;
            }
        }

        sys.solve(1, n, y)
    }

    /// Fold sources and relaxation into an assembled (non-pinned) row.
    fn apply_sources(
        &self,
        i: usize,
        y_old: f64,
        sys: &mut TridiagonalSystem,
    ) -> Result<(), SolverError> {
        let q = self.constant_source[i];
        if self.positive && q < 0.0 {
            if !(y_old > 0.0) {
                return Err(SolverError::InvalidConfiguration {
                    reason: format!(
                        "positive-definite source handling needs strictly positive state, \
                         got {} in layer {}",
                        y_old, i
                    ),
                });
            }
            // Patankar trick: treat the sink implicitly, scaled by the
            // old value, so the update cannot cross zero.
            sys.diag[i] -= self.dt * q / y_old;
        } else {
            sys.rhs[i] += self.dt * q;
        }

        if let Some(relax) = &self.relaxation {
            let tau = relax.timescale[i];
            if tau.is_finite() {
                sys.diag[i] += self.dt / tau;
                sys.rhs[i] += self.dt * relax.target[i] / tau;
            }
        }
        Ok(())
    }
}
