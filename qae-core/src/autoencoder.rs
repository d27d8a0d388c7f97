//! Quantum autoencoder configuration
//!
//! [`AutoencoderConfig`] is the validated construction boundary of the
//! engine. [`QuantumAutoencoder`] binds a validated configuration to its
//! ansatz and trash set and produces the encoder and reconstruction
//! unitaries for trained parameters.

use serde::{Deserialize, Serialize};

use crate::ansatz::{Ansatz, EntanglementPattern};
use crate::error::{QaeError, Result};
use crate::loss::{LossEvaluator, TrashQubits};
use crate::optimizer::{OptimizerConfig, OptimizerKind};
use crate::unitary::Unitary;

/// Default number of entangling repetitions
pub const DEFAULT_REPETITIONS: usize = 3;

/// Default objective-evaluation budget
pub const DEFAULT_ITERATION_BUDGET: usize = 100;

/// Largest register the engine accepts. State vectors hold `2^n` amplitudes
/// and dense unitaries `4^n` entries, so larger sizes are rejected at
/// validation instead of overflowing the dimension shift.
pub const MAX_QUBITS: usize = 16;

/// Autoencoder configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutoencoderConfig {
    /// Total qubits (2 <= n <= [`MAX_QUBITS`])
    pub num_qubits: usize,
    /// Latent qubits kept (1 <= k < n)
    pub num_latent: usize,
    /// Entangling repetitions of the ansatz (>= 1)
    pub repetitions: usize,
    pub entanglement: EntanglementPattern,
    pub optimizer: OptimizerConfig,
    /// Maximum objective evaluations (>= 1)
    pub iteration_budget: usize,
    /// Seed for the initial parameters and stochastic optimizers
    pub seed: Option<u64>,
}

impl AutoencoderConfig {
    pub fn new(num_qubits: usize, num_latent: usize) -> Self {
        Self {
            num_qubits,
            num_latent,
            repetitions: DEFAULT_REPETITIONS,
            entanglement: EntanglementPattern::default(),
            optimizer: OptimizerConfig::default(),
            iteration_budget: DEFAULT_ITERATION_BUDGET,
            seed: None,
        }
    }

    pub fn with_repetitions(mut self, repetitions: usize) -> Self {
        self.repetitions = repetitions;
        self
    }

    pub fn with_entanglement(mut self, pattern: EntanglementPattern) -> Self {
        self.entanglement = pattern;
        self
    }

    pub fn with_optimizer(mut self, kind: OptimizerKind) -> Self {
        self.optimizer.kind = kind;
        self
    }

    pub fn with_optimizer_config(mut self, optimizer: OptimizerConfig) -> Self {
        self.optimizer = optimizer;
        self
    }

    pub fn with_budget(mut self, budget: usize) -> Self {
        self.iteration_budget = budget;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Parses the enumerated string fields and applies them.
    pub fn with_names(mut self, entanglement: &str, optimizer: &str) -> Result<Self> {
        self.entanglement = entanglement.parse()?;
        self.optimizer.kind = optimizer.parse()?;
        Ok(self)
    }

    pub fn num_trash(&self) -> usize {
        self.num_qubits.saturating_sub(self.num_latent)
    }

    /// Optimizer configuration with the run seed filled in when the optimizer
    /// has none of its own.
    pub fn seeded_optimizer(&self) -> OptimizerConfig {
        let mut optimizer = self.optimizer.clone();
        if optimizer.seed.is_none() {
            optimizer.seed = self.seed.map(|s| s.wrapping_add(1));
        }
        optimizer
    }

    pub fn validate(&self) -> Result<()> {
        if self.num_qubits < 2 {
            return Err(QaeError::config(format!(
                "num_qubits must be at least 2, got {}",
                self.num_qubits
            )));
        }
        if self.num_qubits > MAX_QUBITS {
            return Err(QaeError::config(format!(
                "num_qubits must be at most {MAX_QUBITS}, got {}",
                self.num_qubits
            )));
        }
        if self.num_latent == 0 || self.num_latent >= self.num_qubits {
            return Err(QaeError::config(format!(
                "num_latent must be in 1..{}, got {}",
                self.num_qubits, self.num_latent
            )));
        }
        if self.repetitions == 0 {
            return Err(QaeError::config("repetitions must be positive"));
        }
        if self.iteration_budget == 0 {
            return Err(QaeError::config("iteration_budget must be positive"));
        }
        self.optimizer.validate()
    }
}

/// Validated autoencoder: ansatz plus trash set.
#[derive(Debug, Clone)]
pub struct QuantumAutoencoder {
    config: AutoencoderConfig,
    ansatz: Ansatz,
    trash: TrashQubits,
}

impl QuantumAutoencoder {
    /// Validates `config` eagerly; trash qubits are the highest indices.
    pub fn new(config: AutoencoderConfig) -> Result<Self> {
        config.validate()?;
        let ansatz = Ansatz::new(config.num_qubits, config.repetitions, config.entanglement)?;
        let trash = TrashQubits::highest(config.num_qubits, config.num_trash())?;
        Ok(Self {
            config,
            ansatz,
            trash,
        })
    }

    /// Replaces the trash set, e.g. with [`TrashQubits::lowest`].
    pub fn with_trash(mut self, trash: TrashQubits) -> Result<Self> {
        if trash.num_qubits() != self.config.num_qubits {
            return Err(QaeError::DimensionMismatch {
                expected: self.config.num_qubits,
                actual: trash.num_qubits(),
            });
        }
        self.trash = trash;
        Ok(self)
    }

    pub fn config(&self) -> &AutoencoderConfig {
        &self.config
    }

    pub fn ansatz(&self) -> &Ansatz {
        &self.ansatz
    }

    pub fn trash(&self) -> &TrashQubits {
        &self.trash
    }

    pub fn num_trash(&self) -> usize {
        self.trash.len()
    }

    pub fn num_parameters(&self) -> usize {
        self.ansatz.parameter_count()
    }

    pub fn loss_evaluator(&self) -> Result<LossEvaluator> {
        LossEvaluator::new(self.ansatz.clone(), self.trash.clone())
    }

    /// U(θ)
    pub fn encoder_unitary(&self, params: &[f64]) -> Result<Unitary> {
        self.ansatz.build_unitary(params)
    }

    /// U(θ) followed by U(θ)†. The identity for any θ, up to rounding.
    pub fn reconstruction_unitary(&self, params: &[f64]) -> Result<Unitary> {
        let encoder = self.encoder_unitary(params)?;
        encoder.then(&encoder.adjoint())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AutoencoderConfig::new(4, 2);
        assert_eq!(config.repetitions, 3);
        assert_eq!(config.entanglement, EntanglementPattern::Full);
        assert_eq!(config.optimizer.kind, OptimizerKind::NelderMead);
        assert_eq!(config.iteration_budget, 100);
        assert!(config.validate().is_ok());

        let qae = QuantumAutoencoder::new(config).unwrap();
        assert_eq!(qae.num_trash(), 2);
        assert_eq!(qae.trash().as_slice(), &[2, 3]);
        assert_eq!(qae.num_parameters(), 16);
    }

    #[test]
    fn test_validation() {
        let bad = [
            AutoencoderConfig::new(1, 1),
            AutoencoderConfig::new(3, 3),
            AutoencoderConfig::new(3, 0),
            AutoencoderConfig::new(3, 1).with_repetitions(0),
            AutoencoderConfig::new(3, 1).with_budget(0),
        ];
        for config in bad {
            let err = QuantumAutoencoder::new(config).unwrap_err();
            assert!(err.is_configuration(), "{err}");
        }
    }

    #[test]
    fn test_qubit_limit() {
        assert!(AutoencoderConfig::new(MAX_QUBITS, 1).validate().is_ok());

        for n in [MAX_QUBITS + 1, 64, usize::BITS as usize + 5] {
            let err = AutoencoderConfig::new(n, 1).validate().unwrap_err();
            assert!(err.is_configuration(), "{err}");
            assert!(err.to_string().contains("at most 16"), "{err}");
        }
    }

    #[test]
    fn test_string_fields() {
        let config = AutoencoderConfig::new(3, 1)
            .with_names("circular", "spsa")
            .unwrap();
        assert_eq!(config.entanglement, EntanglementPattern::Circular);
        assert_eq!(config.optimizer.kind, OptimizerKind::Spsa);

        assert!(AutoencoderConfig::new(3, 1).with_names("ring", "spsa").is_err());
        assert!(AutoencoderConfig::new(3, 1).with_names("full", "adam").is_err());
    }

    #[test]
    fn test_seeded_optimizer() {
        let config = AutoencoderConfig::new(2, 1).with_seed(10);
        assert_eq!(config.seeded_optimizer().seed, Some(11));

        let config = config.with_optimizer_config(OptimizerConfig::spsa().with_seed(3));
        assert_eq!(config.seeded_optimizer().seed, Some(3));
    }

    #[test]
    fn test_reconstruction_is_identity() {
        let qae = QuantumAutoencoder::new(AutoencoderConfig::new(3, 1)).unwrap();
        let params: Vec<f64> = (0..qae.num_parameters()).map(|i| 0.3 * i as f64).collect();
        let u = qae.reconstruction_unitary(&params).unwrap();
        for ((i, j), c) in u.matrix().indexed_iter() {
            let expected = if i == j { 1.0 } else { 0.0 };
            assert!((c.re - expected).abs() < 1e-10 && c.im.abs() < 1e-10);
        }
    }

    #[test]
    fn test_config_serde() {
        let config = AutoencoderConfig::new(3, 2)
            .with_entanglement(EntanglementPattern::ReverseLinear)
            .with_seed(5);
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"reverse_linear\""));
        let back: AutoencoderConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
