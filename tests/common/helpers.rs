//! Helper functions for integration tests

use nalgebra::DMatrix;

/// Build a concentration field with the given per-species values in
/// every layer (column 0 stays zero, as everywhere in the crate).
pub fn uniform_field(values: &[f64], layers: usize) -> DMatrix<f64> {
    DMatrix::from_fn(values.len(), layers + 1, |r, c| {
        if c == 0 { 0.0 } else { values[r] }
    })
}

/// Sum of all species in one layer.
pub fn layer_total(cc: &DMatrix<f64>, layer: usize) -> f64 {
    (0..cc.nrows()).map(|i| cc[(i, layer)]).sum()
}

/// |actual - expected| / |expected|.
pub fn relative_error(actual: f64, expected: f64) -> f64 {
    (actual - expected).abs() / expected.abs()
}
