//! Production/destruction tensors
//!
//! The Patankar-family schemes do not consume a net right-hand side;
//! they need to know *who produces whom*. [`ReactionTensors`] stores
//! that decomposition: `pp[(i, j, l)]` is the flux from species `j`
//! into species `i` in layer `l`, `dd[(i, j, l)]` the flux from `i`
//! into `j`. Diagonal entries carry production/destruction that is not
//! attributable to another tracked species (external sources and
//! sinks).
//!
//! The tensors are transient scratch: an evaluator fills them, the
//! scheme reduces them to per-species sums, and they are reset before
//! the next evaluation. Nothing here survives a time step.

use ndarray::Array3;

/// Pairwise production and destruction fluxes for one evaluation.
///
/// # Invariants
///
/// Every recorded rate is non-negative; the sign structure lives in
/// *which* tensor a rate lands in, never in its value. Recording a
/// transfer with [`add_transfer`](Self::add_transfer) writes both
/// tensors at once, so a network built exclusively from transfers has
/// `pp[(i, j, l)] == dd[(j, i, l)]` everywhere and conserves total
/// mass under the conservative schemes by construction.
///
/// # Example
///
/// ```rust
/// use hydrocol_rs::physics::ReactionTensors;
///
/// let mut t = ReactionTensors::new(2, 4);
/// t.add_transfer(0, 1, 2, 0.25); // species 0 -> species 1 in layer 2
/// assert_eq!(t.production(1, 0, 2), 0.25);
/// assert_eq!(t.destruction(0, 1, 2), 0.25);
/// assert_eq!(t.net_rate(0, 2), -0.25);
/// assert_eq!(t.net_rate(1, 2), 0.25);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ReactionTensors {
    /// pp[(i, j, l)]: production of species i fed by species j.
    pp: Array3<f64>,
    /// dd[(i, j, l)]: destruction of species i feeding species j.
    dd: Array3<f64>,
}

impl ReactionTensors {
    /// Allocate zeroed tensors for `species` species and `layers`
    /// layers (layer slots 0..=layers, slot 0 bookkeeping).
    pub fn new(species: usize, layers: usize) -> Self {
        Self {
            pp: Array3::zeros((species, species, layers + 1)),
            dd: Array3::zeros((species, species, layers + 1)),
        }
    }

    /// Number of species.
    pub fn species(&self) -> usize {
        self.pp.dim().0
    }

    /// Number of layers N (slots run 0..=N).
    pub fn layers(&self) -> usize {
        self.pp.dim().2 - 1
    }

    /// Zero both tensors so the buffer can be reused for the next
    /// evaluation.
    pub fn reset(&mut self) {
        self.pp.fill(0.0);
        self.dd.fill(0.0);
    }

    /// Record a conservative transfer `from -> to` in layer `layer` at
    /// the given non-negative rate. Writes the production and the
    /// matching destruction entry.
    pub fn add_transfer(&mut self, from: usize, to: usize, layer: usize, rate: f64) {
        debug_assert!(rate >= 0.0, "transfer rate must be non-negative, got {rate}");
        self.pp[(to, from, layer)] += rate;
        self.dd[(from, to, layer)] += rate;
    }

    /// Record production of species `i` from outside the tracked
    /// network (diagonal entry).
    pub fn add_external_production(&mut self, i: usize, layer: usize, rate: f64) {
        debug_assert!(rate >= 0.0, "production rate must be non-negative, got {rate}");
        self.pp[(i, i, layer)] += rate;
    }

    /// Record destruction of species `i` leaving the tracked network
    /// (diagonal entry).
    pub fn add_external_destruction(&mut self, i: usize, layer: usize, rate: f64) {
        debug_assert!(rate >= 0.0, "destruction rate must be non-negative, got {rate}");
        self.dd[(i, i, layer)] += rate;
    }

    /// Production flux into species `i` fed by species `j`.
    pub fn production(&self, i: usize, j: usize, layer: usize) -> f64 {
        self.pp[(i, j, layer)]
    }

    /// Destruction flux out of species `i` feeding species `j`.
    pub fn destruction(&self, i: usize, j: usize, layer: usize) -> f64 {
        self.dd[(i, j, layer)]
    }

    /// Total production of species `i` in `layer` (row sum of pp).
    pub fn production_sum(&self, i: usize, layer: usize) -> f64 {
        (0..self.species()).map(|j| self.pp[(i, j, layer)]).sum()
    }

    /// Total destruction of species `i` in `layer` (row sum of dd).
    pub fn destruction_sum(&self, i: usize, layer: usize) -> f64 {
        (0..self.species()).map(|j| self.dd[(i, j, layer)]).sum()
    }

    /// Net rate d(c_i)/dt implied by the decomposition.
    pub fn net_rate(&self, i: usize, layer: usize) -> f64 {
        self.production_sum(i, layer) - self.destruction_sum(i, layer)
    }

    /// Replace `self` by the elementwise average of `self` and
    /// `other`. Used by the second-order predictor/corrector schemes.
    ///
    /// # Panics
    ///
    /// Panics if the shapes differ.
    pub fn average_with(&mut self, other: &ReactionTensors) {
        assert_eq!(self.pp.dim(), other.pp.dim(), "tensor shapes must agree");
        self.pp.zip_mut_with(&other.pp, |a, &b| *a = 0.5 * (*a + b));
        self.dd.zip_mut_with(&other.dd, |a, &b| *a = 0.5 * (*a + b));
    }
}
