use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use qae_core::{
    partial_trace, Ansatz, EntanglementPattern, LossEvaluator, QuantumState, TrashQubits,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn params_for(ansatz: &Ansatz, rng: &mut StdRng) -> Vec<f64> {
    (0..ansatz.parameter_count())
        .map(|_| rng.gen_range(0.0..std::f64::consts::TAU))
        .collect()
}

fn bench_build_unitary(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_unitary");
    let mut rng = StdRng::seed_from_u64(1);
    for n in [2usize, 4, 6] {
        let ansatz = Ansatz::new(n, 3, EntanglementPattern::Full).unwrap();
        let params = params_for(&ansatz, &mut rng);
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter(|| ansatz.build_unitary(black_box(&params)).unwrap())
        });
    }
    group.finish();
}

fn bench_partial_trace(c: &mut Criterion) {
    let mut group = c.benchmark_group("partial_trace");
    let mut rng = StdRng::seed_from_u64(2);
    for n in [4usize, 8, 10] {
        let state = QuantumState::random(n, &mut rng);
        let keep: Vec<usize> = (n / 2..n).collect();
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter(|| partial_trace(black_box(&state), &keep).unwrap())
        });
    }
    group.finish();
}

fn bench_loss(c: &mut Criterion) {
    let mut group = c.benchmark_group("trash_loss");
    let mut rng = StdRng::seed_from_u64(3);
    for n in [2usize, 4, 6] {
        let ansatz = Ansatz::new(n, 3, EntanglementPattern::Full).unwrap();
        let evaluator =
            LossEvaluator::new(ansatz.clone(), TrashQubits::highest(n, n / 2).unwrap()).unwrap();
        let state = QuantumState::random(n, &mut rng);
        let params = params_for(&ansatz, &mut rng);
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter(|| evaluator.evaluate(black_box(&state), black_box(&params)).unwrap())
        });
    }
    group.finish();
}

criterion_group!(benches, bench_build_unitary, bench_partial_trace, bench_loss);
criterion_main!(benches);
