use std::f64::consts::PI;

use proptest::prelude::*;
use qae_core::{
    evolve, partial_trace, state_fidelity, trash_population_loss, Ansatz, EntanglementPattern,
    QuantumState,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

const TOL: f64 = 1e-9;

fn pattern() -> impl Strategy<Value = EntanglementPattern> {
    prop::sample::select(EntanglementPattern::ALL.to_vec())
}

/// (num_qubits, non-empty keep set)
fn qubits_and_keep() -> impl Strategy<Value = (usize, Vec<usize>)> {
    (1usize..=5).prop_flat_map(|n| {
        let keep = prop::sample::subsequence((0..n).collect::<Vec<_>>(), 1..=n);
        (Just(n), keep)
    })
}

/// (num_qubits, repetitions, pattern, params)
fn ansatz_and_params() -> impl Strategy<Value = (usize, usize, EntanglementPattern, Vec<f64>)> {
    (2usize..=4, 1usize..=3, pattern()).prop_flat_map(|(n, reps, pattern)| {
        let params = prop::collection::vec(0.0..2.0 * PI, n * (reps + 1));
        (Just(n), Just(reps), Just(pattern), params)
    })
}

proptest! {
    #[test]
    fn reduced_state_is_density_matrix((n, keep) in qubits_and_keep(), seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let state = QuantumState::random(n, &mut rng);
        let rho = partial_trace(&state, &keep).unwrap();

        prop_assert_eq!(rho.num_qubits(), keep.len());
        prop_assert!((rho.trace().re - 1.0).abs() < TOL);
        prop_assert!(rho.trace().im.abs() < TOL);
        prop_assert!(rho.is_hermitian(TOL));
        prop_assert!(rho.is_psd(TOL).unwrap());
    }

    #[test]
    fn loss_is_in_unit_interval(
        (n, reps, pattern, params) in ansatz_and_params(),
        seed in any::<u64>(),
        trash in 1usize..4,
    ) {
        let num_trash = 1 + (trash - 1) % (n - 1);
        let mut rng = StdRng::seed_from_u64(seed);
        let state = QuantumState::random(n, &mut rng);
        let ansatz = Ansatz::new(n, reps, pattern).unwrap();

        let loss = trash_population_loss(&state, &ansatz, &params, num_trash).unwrap();
        prop_assert!((0.0..=1.0).contains(&loss));
    }

    #[test]
    fn encode_then_adjoint_is_identity(
        (n, reps, pattern, params) in ansatz_and_params(),
        seed in any::<u64>(),
    ) {
        let mut rng = StdRng::seed_from_u64(seed);
        let state = QuantumState::random(n, &mut rng);
        let unitary = Ansatz::new(n, reps, pattern).unwrap().build_unitary(&params).unwrap();

        let decoded = evolve(&evolve(&state, &unitary).unwrap(), &unitary.adjoint()).unwrap();
        prop_assert!((state_fidelity(&state, &decoded).unwrap() - 1.0).abs() < TOL);
    }
}
