//! Vertical grid
//!
//! The column is discretised into `N` layers of (generally non-uniform)
//! thickness, counted from the bottom: layer 1 sits on the bed, layer
//! `N` touches the surface. Interfaces are numbered 0 (bed) to `N`
//! (surface), so interface `i` is the one *above* layer `i`.
//!
//! # Index convention
//!
//! Every per-layer array in this crate has length `N + 1` with slot 0
//! reserved for boundary bookkeeping (narrow-column mirroring, see
//! [`crate::transport::FaceDiffusion`]). Layers live in slots 1..=N.
//! Keeping the bookkeeping slot everywhere means a tracer column
//! extracted from a concentration field lines up with the thickness
//! and diffusivity arrays without any re-indexing.

use crate::error::SolverError;
use nalgebra::DVector;

/// Layer thicknesses of one water column.
///
/// Owned by the surrounding model; the solvers receive it as a
/// read-only input on every call.
///
/// # Invariants
///
/// - at least two layers (a single-layer column has no interior
///   interface and nothing to diffuse);
/// - every thickness strictly positive;
/// - the thicknesses sum to the local water-column depth.
///
/// # Example
///
/// ```rust
/// use hydrocol_rs::grid::VerticalGrid;
///
/// let grid = VerticalGrid::uniform(10, 20.0).unwrap();
/// assert_eq!(grid.layers(), 10);
/// assert!((grid.depth() - 20.0).abs() < 1e-12);
/// assert!((grid.thickness(3) - 2.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct VerticalGrid {
    /// Thicknesses, slot 0 unused (bookkeeping), layers 1..=N.
    h: DVector<f64>,
}

impl VerticalGrid {
    /// Build a grid from per-layer thicknesses (bottom to top).
    pub fn from_thicknesses(thicknesses: &[f64]) -> Result<Self, SolverError> {
        if thicknesses.len() < 2 {
            return Err(SolverError::InvalidGrid {
                reason: format!(
                    "a column needs at least 2 layers, got {}",
                    thicknesses.len()
                ),
            });
        }
        for (k, &hk) in thicknesses.iter().enumerate() {
            if !(hk > 0.0) || !hk.is_finite() {
                return Err(SolverError::InvalidGrid {
                    reason: format!("layer {} has non-positive thickness {}", k + 1, hk),
                });
            }
        }

        let mut h = DVector::zeros(thicknesses.len() + 1);
        h.rows_mut(1, thicknesses.len())
            .copy_from_slice(thicknesses);
        Ok(Self { h })
    }

    /// Build a grid of `n` equally thick layers spanning `depth`.
    pub fn uniform(n: usize, depth: f64) -> Result<Self, SolverError> {
        if !(depth > 0.0) || !depth.is_finite() {
            return Err(SolverError::InvalidGrid {
                reason: format!("depth must be positive, got {}", depth),
            });
        }
        if n < 2 {
            return Err(SolverError::InvalidGrid {
                reason: format!("a column needs at least 2 layers, got {}", n),
            });
        }
        Ok(Self {
            h: DVector::from_fn(n + 1, |i, _| if i == 0 { 0.0 } else { depth / n as f64 }),
        })
    }

    /// Number of layers N.
    pub fn layers(&self) -> usize {
        self.h.len() - 1
    }

    /// Thickness of layer `i` (1..=N).
    pub fn thickness(&self, i: usize) -> f64 {
        self.h[i]
    }

    /// Full thickness array including the bookkeeping slot 0.
    pub fn thicknesses(&self) -> &DVector<f64> {
        &self.h
    }

    /// Water-column depth (sum of all layer thicknesses).
    pub fn depth(&self) -> f64 {
        self.h.rows(1, self.layers()).sum()
    }

    /// Allocate a per-layer profile of the matching length (N + 1
    /// slots, all zero).
    pub fn zero_profile(&self) -> DVector<f64> {
        DVector::zeros(self.h.len())
    }

    /// Allocate a per-layer profile with every layer slot set to
    /// `value` (slot 0 stays zero).
    pub fn uniform_profile(&self, value: f64) -> DVector<f64> {
        DVector::from_fn(self.h.len(), |i, _| if i == 0 { 0.0 } else { value })
    }
}
