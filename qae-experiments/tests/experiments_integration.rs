//! Experiment Integration Tests
//!
//! Validates:
//! - Entanglement experiment records and comparison chart
//! - Classical sweep records and collapse chart
//! - Summary and Markdown report over a populated results directory

use std::fs;

use qae_core::{train, AutoencoderConfig, EntanglementPattern, QuantumState};
use qae_experiments::{
    generate_markdown_report, record_training_run, run_classical_experiment, ClassicalConfig,
    EntanglementExperiment, ResultLog, CLASSICAL_METHOD, CLASSICAL_PLOT, ENTANGLEMENT_PLOT,
};

#[test]
fn test_entanglement_experiment_logs_three_runs() {
    let dir = tempfile::tempdir().unwrap();
    let log = ResultLog::new(dir.path()).unwrap();

    let outcomes = EntanglementExperiment::default()
        .with_seed(42)
        .with_budget(30)
        .run(&log)
        .unwrap();
    assert_eq!(outcomes.len(), 3);
    for (_, result) in &outcomes {
        assert!(result.evaluations <= 30);
        assert!((0.0..=1.0).contains(&result.fidelity()));
    }

    for name in ["QAE_Bell_q2_l1.json", "QAE_GHZ_q3_l1.json", "QAE_Product_q3_l1.json"] {
        assert!(dir.path().join(name).exists(), "missing {name}");
    }
    assert!(dir.path().join(ENTANGLEMENT_PLOT).exists());

    let summary = log.summary().unwrap();
    assert_eq!(summary.len(), 3);
    assert_eq!(summary[0].method, "QAE_Bell");
}

#[test]
fn test_classical_experiment_logs_sweep() {
    let dir = tempfile::tempdir().unwrap();
    let log = ResultLog::new(dir.path()).unwrap();
    let config = ClassicalConfig::default()
        .with_qubit_range(vec![1, 2])
        .with_latent_dim(2)
        .with_hidden_dim(8)
        .with_dataset_size(4)
        .with_epochs(10)
        .with_seed(5);

    let outcomes = run_classical_experiment(&config, &log).unwrap();
    assert_eq!(outcomes.len(), 2);
    assert!(dir.path().join(CLASSICAL_PLOT).exists());

    let summary = log.summary().unwrap();
    assert!(summary.iter().all(|r| r.method == CLASSICAL_METHOD && r.latent == 2));
    assert_eq!(summary.iter().map(|r| r.qubits).collect::<Vec<_>>(), vec![1, 2]);
}

#[test]
fn test_single_run_with_plot_and_report() {
    let dir = tempfile::tempdir().unwrap();
    let log = ResultLog::new(dir.path().join("records")).unwrap();

    let config = AutoencoderConfig::new(2, 1)
        .with_entanglement(EntanglementPattern::Linear)
        .with_repetitions(1)
        .with_budget(40)
        .with_seed(9);
    let result = train(config, QuantumState::zero(2)).unwrap();

    let plot = dir.path().join("loss.svg");
    let record = record_training_run(&log, "QAE_Zero", &result, Some(&plot)).unwrap();
    assert!(record.ends_with("QAE_Zero_q2_l1.json"));
    assert!(fs::read_to_string(&plot).unwrap().contains("QAE Training Progress"));

    let md = generate_markdown_report(&log.summary().unwrap());
    assert!(md.contains("| QAE_Zero | 2 | 1 |"));
}
