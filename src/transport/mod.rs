//! Vertical transport solvers
//!
//! One time step of the one-dimensional diffusion equation
//!
//! ```text
//! ∂Y/∂t - ∂/∂z ( ν ∂Y/∂z ) = L·Y + Q
//! ```
//!
//! discretised with a theta-scheme (`cnpar` blends the explicit and
//! implicit flux evaluation: 0 = fully explicit, 1 = fully implicit,
//! 0.5 = Crank–Nicolson) on the staggered grid of
//! [`crate::grid::VerticalGrid`].
//!
//! # The two assemblers
//!
//! Quantities live in one of two places on a staggered grid, and each
//! place gets its own assembler:
//!
//! - [`CenterDiffusion`] — cell-centred quantities (temperature,
//!   salinity, dissolved tracers). Unknowns in layers 1..=N.
//! - [`FaceDiffusion`] — interface-located quantities (turbulent
//!   kinetic energy, dissipation, length scale). Unknowns on interior
//!   interfaces 1..=N-1.
//!
//! Both fold the linear source `L` into the implicit diagonal, add the
//! constant source `Q` explicitly, accept [`BoundaryCondition`]s on
//! both ends, and delegate the solve to [`TridiagonalSystem`].
//!
//! # Example
//!
//! ```rust
//! use hydrocol_rs::grid::VerticalGrid;
//! use hydrocol_rs::transport::{BoundaryCondition, CenterDiffusion};
//!
//! let grid = VerticalGrid::uniform(10, 10.0).unwrap();
//! let nu = grid.uniform_profile(1e-2);
//! let zero = grid.zero_profile();
//! let mut temperature = grid.uniform_profile(12.0);
//!
//! let step = CenterDiffusion {
//!     dt: 30.0,
//!     cnpar: 0.6,
//!     upper: BoundaryCondition::Neumann(0.0),
//!     lower: BoundaryCondition::Neumann(0.0),
//!     nu: &nu,
//!     linear_source: &zero,
//!     constant_source: &zero,
//!     relaxation: None,
//!     positive: false,
//! };
//! step.step(&grid, &mut temperature).unwrap();
//! // no fluxes, uniform profile: nothing changes
//! assert!((temperature[5] - 12.0).abs() < 1e-12);
//! ```

mod boundary;
mod center;
mod face;
mod tridiagonal;

pub use boundary::BoundaryCondition;
pub use center::{CenterDiffusion, Relaxation};
pub use face::FaceDiffusion;
pub use tridiagonal::TridiagonalSystem;
