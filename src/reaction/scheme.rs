//! Scheme catalogue and dispatcher
//!
//! # Design Pattern
//!
//! The scheme selection is a closed, fixed enumeration: eleven named
//! schemes, historically addressed by the integer identifiers 1..=11
//! of the numeric configuration surface. [`OdeScheme`] is that sealed
//! set as a Rust enum; [`integrate`] dispatches exactly one scheme
//! implementation per call. An identifier outside the catalogue is a
//! configuration error — there is no silent fallback, ever.
//!
//! Two catalogue entries (the 4th-order Patankar variants) are
//! deliberately disabled: their stage combination is known not to
//! conserve mass. They stay addressable so that configurations
//! naming them fail loudly with
//! [`SolverError::DisabledScheme`] instead of producing a silently
//! broken result.

use crate::error::SolverError;
use crate::physics::{ReactionPpdd, ReactionRhs};
use crate::reaction::methods;
use log::debug;
use nalgebra::DMatrix;
use std::fmt;

/// The closed catalogue of time-stepping schemes.
///
/// | id | scheme | convention | positive | conservative |
/// |---:|---|---|---|---|
/// | 1 | Euler-forward | rhs | no | yes |
/// | 2 | Runge–Kutta 2 (midpoint) | rhs | no | yes |
/// | 3 | Runge–Kutta 4 | rhs | no | yes |
/// | 4 | Patankar | ppdd | yes | no |
/// | 5 | Patankar–Runge–Kutta 2 | ppdd | yes | no |
/// | 6 | Patankar–Runge–Kutta 4 | — | disabled | disabled |
/// | 7 | Modified Patankar | ppdd | yes | yes |
/// | 8 | Modified Patankar–RK 2 | ppdd | yes | yes |
/// | 9 | Modified Patankar–RK 4 | — | disabled | disabled |
/// | 10 | Extended Modified Patankar | rhs | yes | yes |
/// | 11 | Extended Modified Patankar–RK 2 | rhs | yes | yes* |
///
/// (*exact up to the corrector re-weighting, see
/// [`methods::extended_patankar`].)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OdeScheme {
    /// 1: first-order explicit Euler.
    EulerForward,
    /// 2: second-order midpoint Runge–Kutta.
    RungeKutta2,
    /// 3: classical fourth-order Runge–Kutta.
    RungeKutta4,
    /// 4: first-order Patankar (positive, not conservative).
    Patankar,
    /// 5: second-order Patankar–Runge–Kutta.
    PatankarRungeKutta2,
    /// 6: fourth-order Patankar–Runge–Kutta — disabled, its stage
    /// combination is not conservative.
    PatankarRungeKutta4,
    /// 7: first-order Modified Patankar (positive and conservative).
    ModifiedPatankar,
    /// 8: second-order Modified Patankar–Runge–Kutta.
    ModifiedPatankarRungeKutta2,
    /// 9: fourth-order Modified Patankar–Runge–Kutta — disabled, its
    /// stage combination is not conservative.
    ModifiedPatankarRungeKutta4,
    /// 10: first-order Extended Modified Patankar.
    ExtendedModifiedPatankar,
    /// 11: second-order Extended Modified Patankar–Runge–Kutta.
    ExtendedModifiedPatankarRungeKutta2,
}

impl OdeScheme {
    /// All schemes in identifier order.
    pub const ALL: [OdeScheme; 11] = [
        OdeScheme::EulerForward,
        OdeScheme::RungeKutta2,
        OdeScheme::RungeKutta4,
        OdeScheme::Patankar,
        OdeScheme::PatankarRungeKutta2,
        OdeScheme::PatankarRungeKutta4,
        OdeScheme::ModifiedPatankar,
        OdeScheme::ModifiedPatankarRungeKutta2,
        OdeScheme::ModifiedPatankarRungeKutta4,
        OdeScheme::ExtendedModifiedPatankar,
        OdeScheme::ExtendedModifiedPatankarRungeKutta2,
    ];

    /// Resolve a numeric selector from the configuration surface.
    ///
    /// # Errors
    ///
    /// [`SolverError::UnknownScheme`] for anything outside 1..=11 —
    /// never a silent default.
    pub fn from_id(id: i32) -> Result<Self, SolverError> {
        match id {
            1..=11 => Ok(Self::ALL[(id - 1) as usize]),
            _ => Err(SolverError::UnknownScheme { id }),
        }
    }

    /// The numeric identifier (1..=11).
    pub fn id(self) -> i32 {
        Self::ALL.iter().position(|&s| s == self).unwrap() as i32 + 1
    }

    /// Human-readable name.
    pub fn name(self) -> &'static str {
        match self {
            OdeScheme::EulerForward => "Euler-forward",
            OdeScheme::RungeKutta2 => "Runge-Kutta 2 (midpoint)",
            OdeScheme::RungeKutta4 => "Runge-Kutta 4",
            OdeScheme::Patankar => "Patankar",
            OdeScheme::PatankarRungeKutta2 => "Patankar-Runge-Kutta 2",
            OdeScheme::PatankarRungeKutta4 => "Patankar-Runge-Kutta 4",
            OdeScheme::ModifiedPatankar => "Modified Patankar",
            OdeScheme::ModifiedPatankarRungeKutta2 => "Modified Patankar-Runge-Kutta 2",
            OdeScheme::ModifiedPatankarRungeKutta4 => "Modified Patankar-Runge-Kutta 4",
            OdeScheme::ExtendedModifiedPatankar => "Extended Modified Patankar",
            OdeScheme::ExtendedModifiedPatankarRungeKutta2 => {
                "Extended Modified Patankar-Runge-Kutta 2"
            }
        }
    }

    /// Formal order of accuracy.
    pub fn order(self) -> usize {
        match self {
            OdeScheme::EulerForward
            | OdeScheme::Patankar
            | OdeScheme::ModifiedPatankar
            | OdeScheme::ExtendedModifiedPatankar => 1,
            OdeScheme::RungeKutta2
            | OdeScheme::PatankarRungeKutta2
            | OdeScheme::ModifiedPatankarRungeKutta2
            | OdeScheme::ExtendedModifiedPatankarRungeKutta2 => 2,
            OdeScheme::RungeKutta4
            | OdeScheme::PatankarRungeKutta4
            | OdeScheme::ModifiedPatankarRungeKutta4 => 4,
        }
    }

    /// Whether the scheme can actually be run.
    pub fn is_functional(self) -> bool {
        !matches!(
            self,
            OdeScheme::PatankarRungeKutta4 | OdeScheme::ModifiedPatankarRungeKutta4
        )
    }

    /// Whether the scheme guarantees strictly positive output for
    /// strictly positive input, regardless of dt.
    pub fn positivity_preserving(self) -> bool {
        matches!(
            self,
            OdeScheme::Patankar
                | OdeScheme::PatankarRungeKutta2
                | OdeScheme::ModifiedPatankar
                | OdeScheme::ModifiedPatankarRungeKutta2
                | OdeScheme::ExtendedModifiedPatankar
                | OdeScheme::ExtendedModifiedPatankarRungeKutta2
        )
    }

    /// Whether the scheme consumes the production/destruction
    /// decomposition (ppdd form) rather than the net right-hand side.
    pub fn requires_ppdd(self) -> bool {
        matches!(
            self,
            OdeScheme::Patankar
                | OdeScheme::PatankarRungeKutta2
                | OdeScheme::PatankarRungeKutta4
                | OdeScheme::ModifiedPatankar
                | OdeScheme::ModifiedPatankarRungeKutta2
                | OdeScheme::ModifiedPatankarRungeKutta4
        )
    }
}

impl fmt::Display for OdeScheme {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Advance the concentration field by one time step with the selected
/// scheme.
///
/// The scheme selector is runtime data, so the model must provide both
/// evaluator conventions; each scheme implementation only calls the
/// one it declares (see [`crate::physics`]). Callers with a statically
/// known scheme can call the functions in
/// [`methods`](crate::reaction::methods) directly with the single
/// matching bound.
///
/// # Errors
///
/// - [`SolverError::DisabledScheme`] for the non-functional 4th-order
///   Patankar variants;
/// - everything the individual scheme functions can report
///   (dimension mismatches, non-positive concentrations, zero pivots).
pub fn integrate<M>(
    scheme: OdeScheme,
    dt: f64,
    cc: &mut DMatrix<f64>,
    model: &M,
) -> Result<(), SolverError>
where
    M: ReactionRhs + ReactionPpdd + ?Sized,
{
    debug!(
        "integrate: scheme '{}' dt {} species {} layers {}",
        scheme,
        dt,
        cc.nrows(),
        cc.ncols().saturating_sub(1)
    );

    match scheme {
        OdeScheme::EulerForward => methods::euler::euler_forward(dt, cc, model),
        OdeScheme::RungeKutta2 => methods::runge_kutta::runge_kutta_2(dt, cc, model),
        OdeScheme::RungeKutta4 => methods::runge_kutta::runge_kutta_4(dt, cc, model),
        OdeScheme::Patankar => methods::patankar::patankar(dt, cc, model),
        OdeScheme::PatankarRungeKutta2 => methods::patankar::patankar_runge_kutta_2(dt, cc, model),
        OdeScheme::PatankarRungeKutta4 => Err(SolverError::DisabledScheme {
            name: "Patankar-Runge-Kutta 4",
            reason: "the 4th-order stage combination is not conservative",
        }),
        OdeScheme::ModifiedPatankar => {
            methods::modified_patankar::modified_patankar(dt, cc, model)
        }
        OdeScheme::ModifiedPatankarRungeKutta2 => {
            methods::modified_patankar::modified_patankar_2(dt, cc, model)
        }
        OdeScheme::ModifiedPatankarRungeKutta4 => Err(SolverError::DisabledScheme {
            name: "Modified Patankar-Runge-Kutta 4",
            reason: "the 4th-order stage combination is not conservative",
        }),
        OdeScheme::ExtendedModifiedPatankar => {
            methods::extended_patankar::extended_modified_patankar(dt, cc, model)
        }
        OdeScheme::ExtendedModifiedPatankarRungeKutta2 => {
            methods::extended_patankar::extended_modified_patankar_2(dt, cc, model)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LinearDecay;

    #[test]
    fn test_id_round_trip() {
        for id in 1..=11 {
            let scheme = OdeScheme::from_id(id).unwrap();
            assert_eq!(scheme.id(), id);
        }
    }

    #[test]
    fn test_unknown_ids_rejected() {
        for id in [0, -3, 12, 99] {
            let err = OdeScheme::from_id(id).unwrap_err();
            assert_eq!(err, SolverError::UnknownScheme { id });
        }
    }

    #[test]
    fn test_catalogue_metadata_is_consistent() {
        for scheme in OdeScheme::ALL {
            // Disabled schemes are exactly the 4th-order Patankar
            // variants.
            assert_eq!(
                !scheme.is_functional(),
                scheme.order() == 4 && scheme.name().contains("Patankar"),
                "{}",
                scheme
            );
            // Positivity-preserving schemes are the Patankar family.
            assert_eq!(
                scheme.positivity_preserving(),
                scheme.name().contains("Patankar") && scheme.is_functional(),
                "{}",
                scheme
            );
        }
    }

    #[test]
    fn test_disabled_schemes_error_loudly() {
        let model = LinearDecay::new(vec![0.5]).unwrap();
        for scheme in [
            OdeScheme::PatankarRungeKutta4,
            OdeScheme::ModifiedPatankarRungeKutta4,
        ] {
            let mut cc = DMatrix::from_element(1, 3, 1.0);
            let err = integrate(scheme, 0.1, &mut cc, &model).unwrap_err();
            assert!(matches!(err, SolverError::DisabledScheme { .. }));
        }
    }

    #[test]
    fn test_every_functional_scheme_steps_decay() {
        let model = LinearDecay::new(vec![0.5]).unwrap();
        for scheme in OdeScheme::ALL.into_iter().filter(|s| s.is_functional()) {
            let mut cc = DMatrix::from_fn(1, 3, |_, c| if c == 0 { 0.0 } else { 1.0 });
            integrate(scheme, 0.1, &mut cc, &model).unwrap();
            for layer in 1..=2 {
                let value = cc[(0, layer)];
                assert!(
                    value > 0.0 && value < 1.0,
                    "{} produced {}",
                    scheme,
                    value
                );
            }
        }
    }

    #[test]
    fn test_decay_scenario_ordering() {
        // One species, c = 1, rhs = -0.5·c, dt = 0.1:
        //   Euler     0.95
        //   RK4       ≈ exp(-0.05)
        //   Patankar  1/1.05
        // All bounded in (0, 1) and ordered by the sign of their
        // truncation errors: Euler below the exact value, Patankar
        // above it.
        let model = LinearDecay::new(vec![0.5]).unwrap();
        let step = |scheme: OdeScheme| -> f64 {
            let mut cc = DMatrix::from_fn(1, 2, |_, c| if c == 0 { 0.0 } else { 1.0 });
            integrate(scheme, 0.1, &mut cc, &model).unwrap();
            cc[(0, 1)]
        };

        let euler = step(OdeScheme::EulerForward);
        let rk4 = step(OdeScheme::RungeKutta4);
        let patankar = step(OdeScheme::Patankar);
        let exact = (-0.05f64).exp();

        assert!((euler - 0.95).abs() < 1e-14);
        assert!((rk4 - exact).abs() < 1e-8);
        assert!((patankar - 1.0 / 1.05).abs() < 1e-14);

        assert!(euler < rk4 && rk4 < patankar);
        assert!(euler < exact && patankar > exact);
    }
}
