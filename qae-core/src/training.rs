//! Training loop
//!
//! ```text
//! Initialized ──run()──▶ Running ──▶ Converged
//!                                ├─▶ BudgetExhausted
//!                                └─▶ Failed(reason)
//! ```
//!
//! One run is a sequential chain of loss evaluations. Independent runs are
//! parallelized with [`train_batch`].

use std::f64::consts::PI;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::autoencoder::{AutoencoderConfig, QuantumAutoencoder};
use crate::error::{QaeError, Result};
use crate::loss::{LossEvaluator, TrashQubits};
use crate::optimizer::{build_strategy, minimize, OptimizationStrategy, RunStatus};
use crate::state::QuantumState;

/// Lifecycle of a [`TrainingLoop`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunState {
    Initialized,
    Running,
    Finished(RunStatus),
}

/// Uniform draws from [0, 2π).
pub fn random_parameters<R: Rng>(count: usize, rng: &mut R) -> Vec<f64> {
    (0..count).map(|_| rng.gen_range(0.0..2.0 * PI)).collect()
}

/// Outcome of one run.
#[derive(Debug, Clone)]
pub struct TrainingResult {
    pub num_qubits: usize,
    pub num_latent: usize,
    /// Best parameters seen
    pub optimal_params: Vec<f64>,
    /// Loss at `optimal_params`; NaN if no evaluation succeeded
    pub final_loss: f64,
    /// One entry per objective evaluation
    pub loss_history: Vec<f64>,
    pub status: RunStatus,
    pub evaluations: usize,
    pub elapsed: Duration,
}

impl TrainingResult {
    /// 1 − final loss; 0 when no evaluation succeeded.
    pub fn fidelity(&self) -> f64 {
        if self.final_loss.is_finite() {
            1.0 - self.final_loss
        } else {
            0.0
        }
    }

    pub fn report(&self, method: impl Into<String>) -> RunReport {
        RunReport {
            method: method.into(),
            qubits: self.num_qubits,
            latent: self.num_latent,
            fidelity: self.fidelity(),
            training_time: self.elapsed.as_secs_f64(),
            status: self.status.to_string(),
        }
    }
}

/// Record handed to result logging, keyed by `(method, qubits, latent)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub method: String,
    pub qubits: usize,
    pub latent: usize,
    pub fidelity: f64,
    /// Wall-clock seconds
    pub training_time: f64,
    #[serde(default)]
    pub status: String,
}

impl RunReport {
    pub fn key(&self) -> (String, usize, usize) {
        (self.method.clone(), self.qubits, self.latent)
    }
}

/// Binds a loss evaluator, an input state and a strategy.
pub struct TrainingLoop {
    autoencoder: QuantumAutoencoder,
    evaluator: LossEvaluator,
    input: QuantumState,
    initial_params: Vec<f64>,
    strategy: Box<dyn OptimizationStrategy>,
    state: RunState,
}

impl TrainingLoop {
    /// Validates `config` and the input dimension, then draws initial
    /// parameters from the seeded RNG.
    pub fn new(config: AutoencoderConfig, input: QuantumState) -> Result<Self> {
        let autoencoder = QuantumAutoencoder::new(config)?;
        let config = autoencoder.config();

        let expected = 1usize << config.num_qubits;
        if input.dimension() != expected {
            return Err(QaeError::DimensionMismatch {
                expected,
                actual: input.dimension(),
            });
        }

        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let initial_params = random_parameters(autoencoder.num_parameters(), &mut rng);
        let strategy = build_strategy(&config.seeded_optimizer());
        let evaluator = autoencoder.loss_evaluator()?;

        Ok(Self {
            autoencoder,
            evaluator,
            input,
            initial_params,
            strategy,
            state: RunState::Initialized,
        })
    }

    /// Replaces the random initial parameters.
    pub fn with_initial_params(mut self, params: Vec<f64>) -> Result<Self> {
        let expected = self.autoencoder.num_parameters();
        if params.len() != expected {
            return Err(QaeError::ShapeMismatch {
                expected,
                actual: params.len(),
            });
        }
        self.initial_params = params;
        Ok(self)
    }

    /// Replaces the strategy built from the configuration.
    pub fn with_strategy(mut self, strategy: Box<dyn OptimizationStrategy>) -> Self {
        self.strategy = strategy;
        self
    }

    /// Replaces the default (highest-index) trash set.
    pub fn with_trash(mut self, trash: TrashQubits) -> Result<Self> {
        self.autoencoder = self.autoencoder.with_trash(trash)?;
        self.evaluator = self.autoencoder.loss_evaluator()?;
        Ok(self)
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    pub fn autoencoder(&self) -> &QuantumAutoencoder {
        &self.autoencoder
    }

    pub fn initial_params(&self) -> &[f64] {
        &self.initial_params
    }

    /// Runs to a terminal state. A loop runs once; later calls fail.
    pub fn run(&mut self) -> Result<TrainingResult> {
        if self.state != RunState::Initialized {
            return Err(QaeError::InvalidLifecycle("training loop has already run".into()));
        }
        self.state = RunState::Running;

        let config = self.autoencoder.config();
        info!(
            qubits = config.num_qubits,
            latent = config.num_latent,
            optimizer = self.strategy.name(),
            budget = config.iteration_budget,
            "training started"
        );

        let start = Instant::now();
        let evaluator = &self.evaluator;
        let input = &self.input;
        let outcome = minimize(
            self.strategy.as_mut(),
            self.initial_params.clone(),
            config.iteration_budget,
            |params| evaluator.evaluate(input, params),
        );
        let elapsed = start.elapsed();

        if let RunStatus::Failed(reason) = &outcome.status {
            warn!(evaluations = outcome.evaluations, %reason, "training failed");
        }
        info!(
            status = %outcome.status,
            loss = outcome.objective,
            evaluations = outcome.evaluations,
            elapsed_ms = elapsed.as_millis() as u64,
            "training finished"
        );

        self.state = RunState::Finished(outcome.status.clone());
        Ok(TrainingResult {
            num_qubits: config.num_qubits,
            num_latent: config.num_latent,
            optimal_params: outcome.params,
            final_loss: outcome.objective,
            loss_history: outcome.history,
            status: outcome.status,
            evaluations: outcome.evaluations,
            elapsed,
        })
    }
}

/// Builds and runs one training loop.
pub fn train(config: AutoencoderConfig, input: QuantumState) -> Result<TrainingResult> {
    TrainingLoop::new(config, input)?.run()
}

/// Independent run for [`train_batch`].
#[derive(Debug, Clone)]
pub struct TrainingJob {
    pub label: String,
    pub config: AutoencoderConfig,
    pub input: QuantumState,
}

impl TrainingJob {
    pub fn new(label: impl Into<String>, config: AutoencoderConfig, input: QuantumState) -> Self {
        Self {
            label: label.into(),
            config,
            input,
        }
    }
}

/// Runs independent jobs in parallel; results are in job order.
pub fn train_batch(jobs: &[TrainingJob]) -> Vec<Result<TrainingResult>> {
    jobs.par_iter()
        .map(|job| {
            let _span = tracing::info_span!("job", label = %job.label).entered();
            train(job.config.clone(), job.input.clone())
        })
        .collect()
}
