//! Performance benchmarks for the time-stepping schemes
//!
//! Compares the scheme families on the same NPZD column so their
//! relative cost is visible:
//!
//! - explicit schemes: one to four evaluator calls, no linear algebra
//! - Patankar: one/two evaluator calls plus per-species sums
//! - Modified Patankar: a dense solve per layer per stage
//! - EMP: a bisection solve per layer per stage
//!
//! ```bash
//! cargo bench --bench scheme_performance
//! ```

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use hydrocol_rs::models::{Npzd, NpzdParams};
use hydrocol_rs::reaction::{OdeScheme, integrate};
use nalgebra::DMatrix;

fn npzd_column(layers: usize) -> DMatrix<f64> {
    DMatrix::from_fn(4, layers + 1, |species, layer| {
        if layer == 0 {
            0.0
        } else {
            [1.0, 0.5, 0.2, 0.1][species] * (1.0 + 0.01 * layer as f64)
        }
    })
}

fn bench_schemes(c: &mut Criterion) {
    let model = Npzd::new(NpzdParams::default()).unwrap();
    let layers = 100;

    let mut group = c.benchmark_group("scheme_step");
    for scheme in [
        OdeScheme::EulerForward,
        OdeScheme::RungeKutta4,
        OdeScheme::Patankar,
        OdeScheme::PatankarRungeKutta2,
        OdeScheme::ModifiedPatankar,
        OdeScheme::ModifiedPatankarRungeKutta2,
        OdeScheme::ExtendedModifiedPatankar,
        OdeScheme::ExtendedModifiedPatankarRungeKutta2,
    ] {
        group.bench_function(scheme.name(), |b| {
            b.iter(|| {
                let mut cc = npzd_column(layers);
                integrate(scheme, black_box(0.1), &mut cc, &model).unwrap();
                black_box(cc)
            })
        });
    }
    group.finish();
}

fn bench_column_height(c: &mut Criterion) {
    let model = Npzd::new(NpzdParams::default()).unwrap();

    let mut group = c.benchmark_group("modified_patankar_column_height");
    for layers in [25usize, 100, 400] {
        group.bench_function(format!("{} layers", layers), |b| {
            b.iter(|| {
                let mut cc = npzd_column(layers);
                integrate(OdeScheme::ModifiedPatankar, black_box(0.1), &mut cc, &model).unwrap();
                black_box(cc)
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_schemes, bench_column_height);
criterion_main!(benches);
