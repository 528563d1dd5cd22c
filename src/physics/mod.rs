//! Reaction physics interfaces
//!
//! This module defines the boundary between the *biogeochemistry* (what
//! reacts with what, at which rate) and the *numerics* (how the
//! resulting stiff ODE system is advanced in time):
//!
//! - [`ReactionSystem`]: base capability — species count and name;
//! - [`ReactionRhs`]: the plain right-hand-side calling convention,
//!   one net flux per species per layer;
//! - [`ReactionPpdd`]: the production/destruction calling convention,
//!   pairwise non-negative fluxes between species;
//! - [`ReactionTensors`]: the rank-3 production/destruction containers
//!   handed to [`ReactionPpdd`] evaluators.
//!
//! A reaction model lives *outside* this crate (it is an external
//! collaborator); the demonstration networks in [`crate::models`] exist
//! for tests, benchmarks and documentation.

mod tensors;
mod traits;

pub use tensors::ReactionTensors;
pub use traits::{ReactionPpdd, ReactionRhs, ReactionSystem};
