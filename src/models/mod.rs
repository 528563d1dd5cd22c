//! Demonstration reaction networks
//!
//! Real biogeochemistry is an external collaborator: a production
//! model implements the evaluator traits of [`crate::physics`] and is
//! handed to the schemes by the surrounding time loop. The networks
//! here exist so that tests, benchmarks and documentation have honest
//! material to run against.
//!
//! # Available Models
//!
//! ## [`LinearDecay`] — independent first-order decay
//!
//! One decay constant per species, no coupling. Every scheme property
//! (positivity, truncation-error sign, convergence order) has a
//! closed-form answer against `exp(-k·t)`, which makes this the
//! workhorse of the accuracy tests.
//!
//! ## [`Npzd`] — nutrient/phytoplankton/zooplankton/detritus
//!
//! The classic four-compartment water-column network, built purely
//! from pairwise transfers: uptake N→P, grazing P→Z, mortality
//! P→D and Z→D, remineralisation D→N. Total mass is invariant by
//! construction, which makes it the workhorse of the conservation
//! tests. An optional per-layer light factor scales uptake with
//! depth.
//!
//! Both models implement *both* evaluator conventions, with the ppdd
//! decomposition and the rhs form derived from the same fluxes, so
//! any scheme can run them.

mod decay;
mod npzd;

pub use decay::LinearDecay;
pub use npzd::{Npzd, NpzdParams};
