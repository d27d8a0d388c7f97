//! Classical baseline
//!
//! A dense autoencoder over the flattened `[re..., im...]` amplitude vector,
//! trained full-batch with MSE and Adam on random states, then scored by the
//! fidelity between a fresh random state and its renormalized reconstruction.
//!
//! Architecture: `D → hidden → ReLU → latent → hidden → ReLU → D` with
//! `D = 2 · 2^n`.

use std::time::{Duration, Instant};

use ndarray::{Array1, Array2, Axis};
use qae_core::{state_fidelity, QuantumState, RunReport, MAX_QUBITS};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{ExperimentError, Result};

pub const CLASSICAL_METHOD: &str = "Classical_Generalization";

// =============================================================================
// Configuration
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassicalConfig {
    pub qubit_range: Vec<usize>,
    pub latent_dim: usize,
    pub hidden_dim: usize,
    /// Number of random training states
    pub dataset_size: usize,
    pub epochs: usize,
    pub learning_rate: f64,
    pub beta1: f64,
    pub beta2: f64,
    pub epsilon: f64,
    pub seed: Option<u64>,
}

impl Default for ClassicalConfig {
    fn default() -> Self {
        Self {
            qubit_range: vec![2, 4, 6, 8, 10, 12],
            latent_dim: 16,
            hidden_dim: 256,
            dataset_size: 50,
            epochs: 300,
            learning_rate: 1e-3,
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-8,
            seed: None,
        }
    }
}

impl ClassicalConfig {
    pub fn with_qubit_range(mut self, qubits: Vec<usize>) -> Self {
        self.qubit_range = qubits;
        self
    }

    pub fn with_latent_dim(mut self, latent: usize) -> Self {
        self.latent_dim = latent;
        self
    }

    pub fn with_hidden_dim(mut self, hidden: usize) -> Self {
        self.hidden_dim = hidden;
        self
    }

    pub fn with_dataset_size(mut self, size: usize) -> Self {
        self.dataset_size = size;
        self
    }

    pub fn with_epochs(mut self, epochs: usize) -> Self {
        self.epochs = epochs;
        self
    }

    pub fn with_learning_rate(mut self, lr: f64) -> Self {
        self.learning_rate = lr;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: &str| Err(ExperimentError::InvalidInput(msg.to_string()));
        if self.qubit_range.is_empty() || self.qubit_range.contains(&0) {
            return invalid("qubit_range must list qubit counts >= 1");
        }
        if self.qubit_range.iter().any(|&n| n > MAX_QUBITS) {
            return Err(ExperimentError::InvalidInput(format!(
                "qubit counts must be at most {MAX_QUBITS}"
            )));
        }
        if self.latent_dim == 0 || self.hidden_dim == 0 {
            return invalid("layer widths must be >= 1");
        }
        if self.dataset_size == 0 || self.epochs == 0 {
            return invalid("dataset_size and epochs must be >= 1");
        }
        if !(self.learning_rate > 0.0) || !(self.epsilon > 0.0) {
            return invalid("learning_rate and epsilon must be positive");
        }
        if !(0.0..1.0).contains(&self.beta1) || !(0.0..1.0).contains(&self.beta2) {
            return invalid("Adam betas must lie in [0, 1)");
        }
        Ok(())
    }

    fn rng_for(&self, num_qubits: usize) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(num_qubits as u64)),
            None => StdRng::from_entropy(),
        }
    }
}

// =============================================================================
// Adam
// =============================================================================

/// First/second moment estimates for one parameter tensor.
#[derive(Debug, Clone)]
struct AdamState {
    m: Vec<f64>,
    v: Vec<f64>,
    t: usize,
}

impl AdamState {
    fn new(n_params: usize) -> Self {
        Self {
            m: vec![0.0; n_params],
            v: vec![0.0; n_params],
            t: 0,
        }
    }

    fn step<'p, 'g>(
        &mut self,
        params: impl Iterator<Item = &'p mut f64>,
        grads: impl Iterator<Item = &'g f64>,
        config: &ClassicalConfig,
    ) {
        self.t += 1;
        let (beta1, beta2) = (config.beta1, config.beta2);
        let bias_correction1 = 1.0 - beta1.powi(self.t as i32);
        let bias_correction2 = 1.0 - beta2.powi(self.t as i32);

        for (i, (p, &g)) in params.zip(grads).enumerate() {
            self.m[i] = beta1 * self.m[i] + (1.0 - beta1) * g;
            self.v[i] = beta2 * self.v[i] + (1.0 - beta2) * g * g;
            let m_hat = self.m[i] / bias_correction1;
            let v_hat = self.v[i] / bias_correction2;
            *p -= config.learning_rate * m_hat / (v_hat.sqrt() + config.epsilon);
        }
    }
}

// =============================================================================
// Layers
// =============================================================================

#[derive(Debug, Clone)]
struct Dense {
    /// `(in, out)`
    weight: Array2<f64>,
    bias: Array1<f64>,
    weight_adam: AdamState,
    bias_adam: AdamState,
}

impl Dense {
    /// Uniform in ±1/√in for weights and bias.
    fn new<R: Rng>(inputs: usize, outputs: usize, rng: &mut R) -> Self {
        let bound = 1.0 / (inputs as f64).sqrt();
        let weight = Array2::from_shape_fn((inputs, outputs), |_| rng.gen_range(-bound..bound));
        let bias = Array1::from_shape_fn(outputs, |_| rng.gen_range(-bound..bound));
        Self {
            weight,
            bias,
            weight_adam: AdamState::new(inputs * outputs),
            bias_adam: AdamState::new(outputs),
        }
    }

    fn forward(&self, input: &Array2<f64>) -> Array2<f64> {
        input.dot(&self.weight) + &self.bias
    }

    /// Applies one Adam step and returns the gradient w.r.t. the input.
    fn backward(
        &mut self,
        input: &Array2<f64>,
        grad_out: &Array2<f64>,
        config: &ClassicalConfig,
    ) -> Array2<f64> {
        let grad_in = grad_out.dot(&self.weight.t());
        let grad_w = input.t().dot(grad_out);
        let grad_b = grad_out.sum_axis(Axis(0));
        self.weight_adam
            .step(self.weight.iter_mut(), grad_w.iter(), config);
        self.bias_adam.step(self.bias.iter_mut(), grad_b.iter(), config);
        grad_in
    }
}

fn relu(x: Array2<f64>) -> Array2<f64> {
    x.mapv_into(|v| v.max(0.0))
}

/// Zeroes gradient entries whose ReLU output was clipped.
fn relu_backward(mut grad: Array2<f64>, activated: &Array2<f64>) -> Array2<f64> {
    grad.zip_mut_with(activated, |g, &a| {
        if a <= 0.0 {
            *g = 0.0;
        }
    });
    grad
}

// =============================================================================
// Autoencoder
// =============================================================================

#[derive(Debug, Clone)]
pub struct ClassicalAutoencoder {
    encoder_hidden: Dense,
    encoder_latent: Dense,
    decoder_hidden: Dense,
    decoder_output: Dense,
}

impl ClassicalAutoencoder {
    pub fn new<R: Rng>(input_dim: usize, config: &ClassicalConfig, rng: &mut R) -> Self {
        Self {
            encoder_hidden: Dense::new(input_dim, config.hidden_dim, rng),
            encoder_latent: Dense::new(config.hidden_dim, config.latent_dim, rng),
            decoder_hidden: Dense::new(config.latent_dim, config.hidden_dim, rng),
            decoder_output: Dense::new(config.hidden_dim, input_dim, rng),
        }
    }

    pub fn input_dim(&self) -> usize {
        self.encoder_hidden.weight.nrows()
    }

    pub fn forward(&self, batch: &Array2<f64>) -> Array2<f64> {
        let h1 = relu(self.encoder_hidden.forward(batch));
        let z = self.encoder_latent.forward(&h1);
        let h3 = relu(self.decoder_hidden.forward(&z));
        self.decoder_output.forward(&h3)
    }

    /// One full-batch MSE step; returns the loss before the update.
    pub fn train_step(&mut self, batch: &Array2<f64>, config: &ClassicalConfig) -> f64 {
        let h1 = relu(self.encoder_hidden.forward(batch));
        let z = self.encoder_latent.forward(&h1);
        let h3 = relu(self.decoder_hidden.forward(&z));
        let output = self.decoder_output.forward(&h3);

        let diff = &output - batch;
        let count = diff.len() as f64;
        let loss = diff.iter().map(|d| d * d).sum::<f64>() / count;
        let grad_out = diff * (2.0 / count);

        let grad_h3 = self.decoder_output.backward(&h3, &grad_out, config);
        let grad_z = self
            .decoder_hidden
            .backward(&z, &relu_backward(grad_h3, &h3), config);
        let grad_h1 = self.encoder_latent.backward(&h1, &grad_z, config);
        self.encoder_hidden
            .backward(batch, &relu_backward(grad_h1, &h1), config);
        loss
    }

    /// Encodes and decodes `state`, renormalizing the output.
    pub fn reconstruct(&self, state: &QuantumState) -> Result<QuantumState> {
        let features = state.to_real_features();
        if features.len() != self.input_dim() {
            return Err(ExperimentError::InvalidInput(format!(
                "state has {} features, network expects {}",
                features.len(),
                self.input_dim()
            )));
        }
        let batch = Array2::from_shape_vec((1, features.len()), features)
            .map_err(|e| ExperimentError::InvalidInput(e.to_string()))?;
        let output = self.forward(&batch);
        Ok(QuantumState::from_real_features(&output.row(0).to_vec())?)
    }
}

// =============================================================================
// Trials
// =============================================================================

#[derive(Debug, Clone)]
pub struct ClassicalOutcome {
    pub qubits: usize,
    pub latent: usize,
    pub fidelity: f64,
    /// MSE per epoch
    pub loss_history: Vec<f64>,
    pub elapsed: Duration,
}

impl ClassicalOutcome {
    pub fn report(&self) -> RunReport {
        RunReport {
            method: CLASSICAL_METHOD.to_string(),
            qubits: self.qubits,
            latent: self.latent,
            fidelity: self.fidelity,
            training_time: self.elapsed.as_secs_f64(),
            status: "completed".to_string(),
        }
    }
}

fn random_dataset<R: Rng>(num_qubits: usize, size: usize, rng: &mut R) -> Result<Array2<f64>> {
    let dim = 2 << num_qubits;
    let flat: Vec<f64> = (0..size)
        .flat_map(|_| QuantumState::random(num_qubits, rng).to_real_features())
        .collect();
    Array2::from_shape_vec((size, dim), flat)
        .map_err(|e| ExperimentError::InvalidInput(e.to_string()))
}

/// Trains on `dataset_size` random states and tests on one fresh state.
pub fn run_classical_trial(
    num_qubits: usize,
    config: &ClassicalConfig,
) -> Result<ClassicalOutcome> {
    config.validate()?;
    if num_qubits == 0 || num_qubits > MAX_QUBITS {
        return Err(ExperimentError::InvalidInput(format!(
            "num_qubits must be in 1..={MAX_QUBITS}, got {num_qubits}"
        )));
    }
    let mut rng = config.rng_for(num_qubits);
    let start = Instant::now();

    let dataset = random_dataset(num_qubits, config.dataset_size, &mut rng)?;
    let mut model = ClassicalAutoencoder::new(dataset.ncols(), config, &mut rng);

    let mut loss_history = Vec::with_capacity(config.epochs);
    for epoch in 0..config.epochs {
        let loss = model.train_step(&dataset, config);
        if epoch % 50 == 0 {
            debug!(qubits = num_qubits, epoch, loss, "classical epoch");
        }
        loss_history.push(loss);
    }

    let test_state = QuantumState::random(num_qubits, &mut rng);
    let fidelity = match model.reconstruct(&test_state) {
        Ok(reconstructed) => state_fidelity(&test_state, &reconstructed)?,
        Err(ExperimentError::Core(err)) => {
            warn!(qubits = num_qubits, error = %err, "reconstruction collapsed");
            0.0
        }
        Err(err) => return Err(err),
    };
    let elapsed = start.elapsed();

    info!(
        qubits = num_qubits,
        latent = config.latent_dim,
        fidelity,
        elapsed_s = elapsed.as_secs_f64(),
        "classical trial finished"
    );
    Ok(ClassicalOutcome {
        qubits: num_qubits,
        latent: config.latent_dim,
        fidelity,
        loss_history,
        elapsed,
    })
}

/// One trial per entry of `qubit_range`, run in parallel, in range order.
pub fn run_classical_sweep(config: &ClassicalConfig) -> Result<Vec<ClassicalOutcome>> {
    config.validate()?;
    config
        .qubit_range
        .par_iter()
        .map(|&n| run_classical_trial(n, config))
        .collect()
}
