//! hydrocol-rs: Water-Column Simulation Framework
//!
//! The numerical core of a one-dimensional water-column simulator:
//! the reaction ODE engine that advances biogeochemical tracers with
//! positivity- and conservation-preserving schemes, and the implicit
//! vertical diffusion solver that transports every mean-flow and
//! turbulence quantity. Physical parameterisations, grid generation
//! and I/O live outside; they feed coefficient arrays in and receive
//! updated state arrays back.
//!
//! # Architecture
//!
//! hydrocol-rs is built on two core principles:
//!
//! 1. **Separation of Physics and Numerics**
//!    - Reaction models define the fluxes (what reacts)
//!    - Schemes and solvers provide the methods (how to advance)
//!
//! 2. **Guarantees as Types**
//!    - The scheme catalogue is a sealed enum — an unknown selector
//!      cannot dispatch, a disabled scheme cannot run silently
//!    - The evaluator conventions are separate traits — a scheme
//!      states the convention it needs in its bounds
//!    - Boundary conditions carry their values — a malformed tag is
//!      unrepresentable
//!
//! # Quick Start
//!
//! ```rust
//! use hydrocol_rs::models::{Npzd, NpzdParams};
//! use hydrocol_rs::reaction::{OdeScheme, integrate};
//! use nalgebra::DMatrix;
//!
//! # fn main() -> Result<(), hydrocol_rs::error::SolverError> {
//! // A four-species reaction network on a ten-layer column.
//! let model = Npzd::new(NpzdParams::default())?;
//! let mut cc = DMatrix::from_fn(4, 11, |species, layer| {
//!     if layer == 0 { 0.0 } else { [1.0, 0.5, 0.2, 0.1][species] }
//! });
//!
//! // One conservative, positivity-preserving step.
//! integrate(OdeScheme::ModifiedPatankar, 0.5, &mut cc, &model)?;
//!
//! let total: f64 = (0..4).map(|i| cc[(i, 3)]).sum();
//! assert!((total - 1.8).abs() < 1e-12);
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - [`grid`]: the vertical grid and its index conventions
//! - [`physics`]: evaluator traits and production/destruction tensors
//! - [`reaction`]: the eleven-scheme ODE engine
//! - [`transport`]: theta-scheme vertical diffusion (cell-centred and
//!   interface-located) over a tridiagonal solve
//! - [`simulation`]: run-loop facade with trajectory and metadata
//! - [`models`]: demonstration reaction networks for tests and docs
//! - [`error`]: the crate-wide error taxonomy

pub mod error;
pub mod grid;
pub mod models;
pub mod physics;
pub mod reaction;
pub mod simulation;
pub mod transport;

pub mod prelude {
    //! Convenient imports for common usage
    //!
    //! ```rust
    //! use hydrocol_rs::prelude::*;
    //! ```
    pub use crate::error::SolverError;
    pub use crate::grid::VerticalGrid;
    pub use crate::physics::{ReactionPpdd, ReactionRhs, ReactionSystem, ReactionTensors};
    pub use crate::reaction::{OdeScheme, integrate};
    pub use crate::simulation::{ReactionSimulation, SimulationResult};
    pub use crate::transport::{BoundaryCondition, CenterDiffusion, FaceDiffusion};
}
