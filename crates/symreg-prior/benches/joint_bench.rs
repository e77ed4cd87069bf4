//! Benchmarks for joint prior evaluation over large sampled batches.

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ndarray::Array2;
use symreg_core::{Library, StructuralSignals};
use symreg_prior::{make_prior, JointPrior, PriorConfig, PriorResources};

const CONFIG: &str = "\
length: {min_: 4, max_: 30}
repeat: {tokens: const, max_: 3}
relational:
  - {targets: [x1], effectors: [log], relationship: child}
  - {targets: [const], effectors: [add, mul], relationship: uchild}
inverse: {}
trig: {}
const: {}
no_inputs: {}
uniform_arity: {}
soft_length: {loc: 12, scale: 5}
";

fn library() -> Arc<Library> {
    Arc::new(
        Library::with_functions(
            3,
            &["add", "sub", "mul", "div", "sin", "cos", "exp", "log", "sqrt", "n2", "const"],
        )
        .unwrap(),
    )
}

fn joint(library: &Arc<Library>) -> JointPrior {
    let config = PriorConfig::from_yaml_str(CONFIG).unwrap();
    make_prior(library.clone(), &config, &mut PriorResources::new())
        .unwrap()
        .prior
}

/// A batch of prefixes cycling through binary, unary and terminal tokens.
fn batch(library: &Library, rows: usize, len: usize) -> Array2<usize> {
    let l = library.len();
    Array2::from_shape_fn((rows, len), |(r, c)| (r * 7 + c * 3) % l)
}

fn bench_joint_call(c: &mut Criterion) {
    let lib = library();
    let mut prior = joint(&lib);

    for &(rows, len) in &[(1000, 4), (1000, 16), (10_000, 16)] {
        let actions = batch(&lib, rows, len);
        let signals = StructuralSignals::from_actions(actions.view(), &lib);
        c.bench_function(&format!("joint_call_{rows}x{len}"), |b| {
            b.iter(|| {
                prior.call(
                    black_box(actions.view()),
                    signals.parent.view(),
                    signals.sibling.view(),
                    signals.dangling.view(),
                )
            })
        });
    }
}

fn bench_signals(c: &mut Criterion) {
    let lib = library();
    let actions = batch(&lib, 1000, 16);

    c.bench_function("structural_signals_1000x16", |b| {
        b.iter(|| StructuralSignals::from_actions(black_box(actions.view()), &lib))
    });
}

fn bench_violation(c: &mut Criterion) {
    let lib = library();
    let mut prior = joint(&lib);
    let tokens = lib
        .actionize(&["add", "mul", "x1", "sin", "x2", "exp", "sub", "x3", "const"])
        .unwrap();

    c.bench_function("violation_replay_9_tokens", |b| {
        b.iter(|| prior.violates(black_box(&tokens)))
    });
}

criterion_group!(benches, bench_joint_call, bench_signals, bench_violation);

criterion_main!(benches);
