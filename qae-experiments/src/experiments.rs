//! Experiment drivers
//!
//! Each driver trains, logs every record through an explicit [`ResultLog`]
//! and writes its chart next to the JSON records.

use std::path::{Path, PathBuf};

use qae_core::{
    train_batch, AutoencoderConfig, OptimizerKind, QuantumState, TrainingJob, TrainingResult,
};
use tracing::info;

use crate::classical::{run_classical_sweep, ClassicalConfig, ClassicalOutcome};
use crate::error::Result;
use crate::plot::{plot_fidelity_by_qubits, plot_loss_histories, plot_loss_history, LossSeries};
use crate::results::ResultLog;

pub const ENTANGLEMENT_PLOT: &str = "entanglement_comparison.svg";
pub const CLASSICAL_PLOT: &str = "classical_collapse.svg";

/// Record method names for the standard QAE inputs.
pub const BELL_METHOD: &str = "QAE_Bell";
pub const GHZ_METHOD: &str = "QAE_GHZ";
pub const PRODUCT_METHOD: &str = "QAE_Product";
pub const ZERO_METHOD: &str = "QAE_Zero";
pub const RANDOM_METHOD: &str = "QAE_Random";

/// Fidelity below which the classical baseline counts as collapsed.
pub const COLLAPSE_THRESHOLD: f64 = 0.9;

/// Logs one training run and optionally plots its loss curve.
pub fn record_training_run(
    log: &ResultLog,
    method: &str,
    result: &TrainingResult,
    plot_path: Option<&Path>,
) -> Result<PathBuf> {
    let path = log.log_result(&result.report(method))?;
    if let Some(plot_path) = plot_path {
        plot_loss_history(&result.loss_history, plot_path)?;
    }
    Ok(path)
}

// =============================================================================
// Entanglement vs product states
// =============================================================================

/// Bell, GHZ and uniform product inputs compressed to one latent qubit.
#[derive(Debug, Clone, Default)]
pub struct EntanglementExperiment {
    pub optimizer: OptimizerKind,
    pub seed: Option<u64>,
    /// Overrides the per-state budgets (100 / 150 / 150)
    pub budget: Option<usize>,
}

impl EntanglementExperiment {
    pub fn with_optimizer(mut self, optimizer: OptimizerKind) -> Self {
        self.optimizer = optimizer;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_budget(mut self, budget: usize) -> Self {
        self.budget = Some(budget);
        self
    }

    pub fn jobs(&self) -> Vec<TrainingJob> {
        let cases = [
            (BELL_METHOD, 2, 100, QuantumState::bell()),
            (GHZ_METHOD, 3, 150, QuantumState::ghz(3)),
            (PRODUCT_METHOD, 3, 150, QuantumState::uniform(3)),
        ];
        cases
            .into_iter()
            .enumerate()
            .map(|(i, (label, qubits, budget, state))| {
                let mut config = AutoencoderConfig::new(qubits, 1)
                    .with_optimizer(self.optimizer)
                    .with_budget(self.budget.unwrap_or(budget));
                if let Some(seed) = self.seed {
                    config = config.with_seed(seed.wrapping_add(100 * i as u64));
                }
                TrainingJob::new(label, config, state)
            })
            .collect()
    }

    /// Trains all three jobs in parallel, logs them and plots the loss curves.
    pub fn run(&self, log: &ResultLog) -> Result<Vec<(String, TrainingResult)>> {
        let jobs = self.jobs();
        let results = train_batch(&jobs);

        let mut outcomes = Vec::with_capacity(jobs.len());
        for (job, result) in jobs.iter().zip(results) {
            let result = result?;
            record_training_run(log, &job.label, &result, None)?;
            outcomes.push((job.label.clone(), result));
        }

        let series: Vec<LossSeries> = outcomes
            .iter()
            .map(|(label, r)| {
                LossSeries::new(label.trim_start_matches("QAE_"), r.loss_history.clone())
            })
            .collect();
        let plot_path = log.dir().join(ENTANGLEMENT_PLOT);
        plot_loss_histories(
            &series,
            &plot_path,
            "Quantum Autoencoder: Entanglement vs Product State Compression",
        )?;
        info!(path = %plot_path.display(), "entanglement comparison saved");
        Ok(outcomes)
    }
}

// =============================================================================
// Classical baseline
// =============================================================================

/// Runs the sweep, logs each qubit count and plots fidelity against qubits.
pub fn run_classical_experiment(
    config: &ClassicalConfig,
    log: &ResultLog,
) -> Result<Vec<ClassicalOutcome>> {
    let outcomes = run_classical_sweep(config)?;
    for outcome in &outcomes {
        log.log_result(&outcome.report())?;
    }

    let points: Vec<(usize, f64)> = outcomes.iter().map(|o| (o.qubits, o.fidelity)).collect();
    let plot_path = log.dir().join(CLASSICAL_PLOT);
    plot_fidelity_by_qubits(
        &points,
        COLLAPSE_THRESHOLD,
        &plot_path,
        "Classical Generalization Collapse",
    )?;

    let collapsed: Vec<usize> = points
        .iter()
        .filter(|(_, f)| *f < COLLAPSE_THRESHOLD)
        .map(|(q, _)| *q)
        .collect();
    info!(?collapsed, path = %plot_path.display(), "classical sweep saved");
    Ok(outcomes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entanglement_jobs() {
        let jobs = EntanglementExperiment::default().with_seed(3).jobs();
        let labels: Vec<&str> = jobs.iter().map(|j| j.label.as_str()).collect();
        assert_eq!(labels, vec![BELL_METHOD, GHZ_METHOD, PRODUCT_METHOD]);
        assert_eq!(labels, vec!["QAE_Bell", "QAE_GHZ", "QAE_Product"]);

        assert_eq!(jobs[0].config.num_qubits, 2);
        assert_eq!(jobs[0].config.iteration_budget, 100);
        assert_eq!(jobs[1].config.iteration_budget, 150);
        assert_eq!(jobs[2].input, QuantumState::uniform(3));
        assert!(jobs.iter().all(|j| j.config.num_latent == 1));
        assert_ne!(jobs[0].config.seed, jobs[1].config.seed);
    }

    #[test]
    fn test_budget_override() {
        let jobs = EntanglementExperiment::default().with_budget(7).jobs();
        assert!(jobs.iter().all(|j| j.config.iteration_budget == 7));
    }
}
