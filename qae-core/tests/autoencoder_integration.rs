//! Autoencoder Integration Tests
//!
//! Validates:
//! - Loss regressions on Bell, GHZ and product inputs
//! - Agreement of the two partial trace routes
//! - Encode/decode round trips
//! - Training convergence and batch execution

use std::f64::consts::PI;

use num_complex::Complex64;
use qae_core::{
    evolve, fidelity, partial_trace, state_fidelity, train, train_batch,
    trash_population_loss, uhlmann_fidelity, Ansatz, AutoencoderConfig, DensityMatrix,
    EntanglementPattern, LossEvaluator, OptimizerKind, QaeError, QuantumAutoencoder,
    QuantumState, RunStatus, TrainingJob, TrainingLoop, TrashQubits,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const EPSILON: f64 = 1e-9;

fn random_params(ansatz: &Ansatz, rng: &mut StdRng) -> Vec<f64> {
    (0..ansatz.parameter_count())
        .map(|_| rng.gen_range(0.0..2.0 * PI))
        .collect()
}

// =============================================================================
// Loss Regression Tests
// =============================================================================

#[test]
fn test_bell_identity_regression() {
    let ansatz = Ansatz::new(2, 1, EntanglementPattern::None).unwrap();
    let params = vec![0.0; ansatz.parameter_count()];
    let loss = trash_population_loss(&QuantumState::bell(), &ansatz, &params, 1).unwrap();
    assert!((loss - 0.5).abs() < EPSILON);
}

#[test]
fn test_bell_reduced_state() {
    let rho = partial_trace(&QuantumState::bell(), &[1]).unwrap();
    let mixed = DensityMatrix::maximally_mixed(1);
    for (a, b) in rho.matrix().iter().zip(mixed.matrix().iter()) {
        assert!((a - b).norm() < EPSILON);
    }
    let f = fidelity(&rho, &DensityMatrix::zero_state(1)).unwrap();
    assert!((f - 0.5).abs() < EPSILON);
}

#[test]
fn test_identity_ansatz_clean_trash() {
    // Latent qubits 0..2 in a random state, trash qubits 2..4 in |00>
    let mut rng = StdRng::seed_from_u64(31);
    let latent = QuantumState::random(2, &mut rng);
    let mut amplitudes = vec![Complex64::new(0.0, 0.0); 16];
    for (i, a) in latent.amplitudes().iter().enumerate() {
        amplitudes[i] = *a;
    }
    let state = QuantumState::new(amplitudes).unwrap();

    let ansatz = Ansatz::new(4, 2, EntanglementPattern::None).unwrap();
    let params = vec![0.0; ansatz.parameter_count()];
    let loss = trash_population_loss(&state, &ansatz, &params, 2).unwrap();
    assert!(loss.abs() < EPSILON);
}

#[test]
fn test_ghz_identity_loss() {
    // Trash qubit 2 of GHZ(3) is |0> with probability 1/2
    let ansatz = Ansatz::new(3, 1, EntanglementPattern::None).unwrap();
    let params = vec![0.0; ansatz.parameter_count()];
    let loss = trash_population_loss(&QuantumState::ghz(3), &ansatz, &params, 1).unwrap();
    assert!((loss - 0.5).abs() < EPSILON);
}

#[test]
fn test_trash_convention_changes_result() {
    // |q2 q1 q0> = |0 0 1>
    let state = QuantumState::basis(3, 1);
    let ansatz = Ansatz::new(3, 1, EntanglementPattern::None).unwrap();
    let params = vec![0.0; ansatz.parameter_count()];

    let high = LossEvaluator::new(ansatz.clone(), TrashQubits::highest(3, 1).unwrap()).unwrap();
    let low = LossEvaluator::new(ansatz, TrashQubits::lowest(3, 1).unwrap()).unwrap();
    assert!(high.evaluate(&state, &params).unwrap() < EPSILON);
    assert!((low.evaluate(&state, &params).unwrap() - 1.0).abs() < EPSILON);
}

// =============================================================================
// Partial Trace Consistency Tests
// =============================================================================

#[test]
fn test_partial_trace_routes_agree() {
    let mut rng = StdRng::seed_from_u64(101);
    for n in 2..=5 {
        for pattern in EntanglementPattern::ALL {
            let ansatz = Ansatz::new(n, 2, pattern).unwrap();
            let unitary = ansatz.build_unitary(&random_params(&ansatz, &mut rng)).unwrap();
            let evolved = evolve(&QuantumState::random(n, &mut rng), &unitary).unwrap();
            let full = DensityMatrix::from_pure(&evolved);

            let keep: Vec<usize> = (0..n).filter(|_| rng.gen_bool(0.5)).collect();
            let keep = if keep.is_empty() { vec![n - 1] } else { keep };

            let tensor = partial_trace(&evolved, &keep).unwrap();
            let explicit = full.partial_trace(&keep).unwrap();
            let f = fidelity(&tensor, &explicit).unwrap();
            assert!((f - 1.0).abs() < EPSILON, "n={n} pattern={pattern} keep={keep:?} f={f}");
        }
    }
}

#[test]
fn test_uhlmann_matches_shortcut_on_trash_states() {
    let mut rng = StdRng::seed_from_u64(7);
    let ansatz = Ansatz::new(3, 2, EntanglementPattern::Linear).unwrap();
    let trash = TrashQubits::highest(3, 2).unwrap();
    let evaluator = LossEvaluator::new(ansatz.clone(), trash).unwrap();
    let rho = evaluator
        .trash_state(&QuantumState::random(3, &mut rng), &random_params(&ansatz, &mut rng))
        .unwrap();
    let zero = DensityMatrix::zero_state(2);
    let fast = fidelity(&rho, &zero).unwrap();
    let general = uhlmann_fidelity(&rho, &zero).unwrap();
    assert!((fast - general).abs() < 1e-6);
}

// =============================================================================
// Round Trip Tests
// =============================================================================

#[test]
fn test_encode_decode_round_trip() {
    let mut rng = StdRng::seed_from_u64(55);
    let qae = QuantumAutoencoder::new(AutoencoderConfig::new(4, 2)).unwrap();
    let params = random_params(qae.ansatz(), &mut rng);
    let input = QuantumState::random(4, &mut rng);

    let encoder = qae.encoder_unitary(&params).unwrap();
    let decoded = evolve(&evolve(&input, &encoder).unwrap(), &encoder.adjoint()).unwrap();
    assert!((state_fidelity(&input, &decoded).unwrap() - 1.0).abs() < EPSILON);

    let reconstructed = evolve(&input, &qae.reconstruction_unitary(&params).unwrap()).unwrap();
    assert!((state_fidelity(&input, &reconstructed).unwrap() - 1.0).abs() < EPSILON);
}

// =============================================================================
// Training Tests
// =============================================================================

#[test]
fn test_zero_state_training_converges() {
    let config = AutoencoderConfig::new(2, 1)
        .with_repetitions(1)
        .with_entanglement(EntanglementPattern::None)
        .with_budget(400)
        .with_seed(12);
    let result = TrainingLoop::new(config, QuantumState::zero(2))
        .unwrap()
        .with_initial_params(vec![0.3, 0.2, 0.1, 0.4])
        .unwrap()
        .run()
        .unwrap();
    assert!(result.final_loss < 0.01, "final loss {}", result.final_loss);
    assert!(!result.status.is_failed());
}

/// Default ansatz (full entanglement, 3 repetitions) from seeded uniform
/// [0, 2π) parameters on |000>.
fn zero_state_losses(kind: OptimizerKind, budget: usize) -> Vec<(u64, f64)> {
    (0..4)
        .map(|seed| {
            let config = AutoencoderConfig::new(3, 1)
                .with_optimizer(kind)
                .with_budget(budget)
                .with_seed(seed);
            let result = train(config, QuantumState::zero(3)).unwrap();
            assert!(!result.status.is_failed());
            (seed, result.final_loss)
        })
        .collect()
}

#[test]
fn test_nelder_mead_converges_from_random_start() {
    for (seed, loss) in zero_state_losses(OptimizerKind::NelderMead, 300) {
        assert!(loss < 0.01, "seed {seed}: final loss {loss}");
    }
}

#[test]
fn test_spsa_converges_from_random_start() {
    for (seed, loss) in zero_state_losses(OptimizerKind::Spsa, 2000) {
        assert!(loss < 0.01, "seed {seed}: final loss {loss}");
    }
}

#[test]
fn test_training_is_reproducible() {
    let config = AutoencoderConfig::new(3, 1)
        .with_optimizer(OptimizerKind::Spsa)
        .with_budget(45)
        .with_seed(77);
    let a = train(config.clone(), QuantumState::ghz(3)).unwrap();
    let b = train(config, QuantumState::ghz(3)).unwrap();
    assert_eq!(a.loss_history, b.loss_history);
    assert_eq!(a.optimal_params, b.optimal_params);
}

#[test]
fn test_training_rejects_bad_construction() {
    let err = TrainingLoop::new(AutoencoderConfig::new(2, 2), QuantumState::bell())
        .err()
        .unwrap();
    assert!(err.is_configuration());

    let err = QuantumState::new(vec![Complex64::new(1.0, 0.0), Complex64::new(1.0, 0.0)])
        .unwrap_err();
    assert!(matches!(err, QaeError::InvalidState(_)));
}

#[test]
fn test_entanglement_batch() {
    let jobs = vec![
        TrainingJob::new(
            "QAE_Bell",
            AutoencoderConfig::new(2, 1).with_budget(20).with_seed(1),
            QuantumState::bell(),
        ),
        TrainingJob::new(
            "QAE_GHZ",
            AutoencoderConfig::new(3, 1).with_budget(30).with_seed(2),
            QuantumState::ghz(3),
        ),
        TrainingJob::new(
            "QAE_Product",
            AutoencoderConfig::new(3, 1).with_budget(30).with_seed(3),
            QuantumState::uniform(3),
        ),
    ];
    let results = train_batch(&jobs);
    assert_eq!(results.len(), 3);
    for (job, result) in jobs.iter().zip(&results) {
        let result = result.as_ref().unwrap();
        assert_eq!(result.num_qubits, job.config.num_qubits);
        assert_eq!(result.status, RunStatus::BudgetExhausted);
        assert_eq!(result.loss_history.len(), job.config.iteration_budget);
        let report = result.report(job.label.clone());
        assert!((0.0..=1.0).contains(&report.fidelity));
    }
}
