//! Layered RY + CNOT ansatz (RealAmplitudes layout)
//!
//! ```text
//! layer 0        ent        layer 1        ent   ...   layer r
//! RY(θ[0..n])  ─ CNOTs ─  RY(θ[n..2n])  ─ CNOTs ─ ... RY(θ[rn..(r+1)n])
//! ```
//!
//! `num_repetitions = r` gives `r + 1` rotation layers and `r` entangling
//! layers, hence `num_qubits * (r + 1)` parameters. Parameter `layer * n + q`
//! drives the RY on qubit `q` in rotation layer `layer`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{QaeError, Result};
use crate::gates::Gate;
use crate::unitary::Unitary;

/// Which qubit pairs the entangling layers connect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntanglementPattern {
    /// CNOT(i, j) for every i < j
    Full,
    /// CNOT(i, i+1)
    Linear,
    /// CNOT(i, i+1) from the top pair down
    ReverseLinear,
    /// CNOT(n-1, 0) then linear (equal to linear for n <= 2)
    Circular,
    /// No entangling gates
    None,
}

impl EntanglementPattern {
    pub const ALL: [EntanglementPattern; 5] = [
        EntanglementPattern::Full,
        EntanglementPattern::Linear,
        EntanglementPattern::ReverseLinear,
        EntanglementPattern::Circular,
        EntanglementPattern::None,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            EntanglementPattern::Full => "full",
            EntanglementPattern::Linear => "linear",
            EntanglementPattern::ReverseLinear => "reverse_linear",
            EntanglementPattern::Circular => "circular",
            EntanglementPattern::None => "none",
        }
    }

    /// (control, target) pairs of one entangling layer, in application order.
    pub fn pairs(&self, num_qubits: usize) -> Vec<(usize, usize)> {
        let linear = || (0..num_qubits.saturating_sub(1)).map(|i| (i, i + 1));
        match self {
            EntanglementPattern::Full => (0..num_qubits)
                .flat_map(|i| ((i + 1)..num_qubits).map(move |j| (i, j)))
                .collect(),
            EntanglementPattern::Linear => linear().collect(),
            EntanglementPattern::ReverseLinear => linear().rev().collect(),
            EntanglementPattern::Circular => {
                let mut pairs = Vec::with_capacity(num_qubits);
                if num_qubits > 2 {
                    pairs.push((num_qubits - 1, 0));
                }
                pairs.extend(linear());
                pairs
            }
            EntanglementPattern::None => Vec::new(),
        }
    }
}

impl Default for EntanglementPattern {
    fn default() -> Self {
        EntanglementPattern::Full
    }
}

impl fmt::Display for EntanglementPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EntanglementPattern {
    type Err = QaeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "full" => Ok(EntanglementPattern::Full),
            "linear" => Ok(EntanglementPattern::Linear),
            "reverse_linear" => Ok(EntanglementPattern::ReverseLinear),
            "circular" => Ok(EntanglementPattern::Circular),
            "none" => Ok(EntanglementPattern::None),
            other => Err(QaeError::config(format!(
                "unknown entanglement pattern '{other}' \
                 (expected one of full, linear, reverse_linear, circular, none)"
            ))),
        }
    }
}

/// Parameterized unitary generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ansatz {
    num_qubits: usize,
    num_repetitions: usize,
    pattern: EntanglementPattern,
}

impl Ansatz {
    /// Fails with a configuration error when `num_qubits` is zero.
    pub fn new(
        num_qubits: usize,
        num_repetitions: usize,
        pattern: EntanglementPattern,
    ) -> Result<Self> {
        if num_qubits == 0 {
            return Err(QaeError::config("ansatz needs at least one qubit"));
        }
        Ok(Self {
            num_qubits,
            num_repetitions,
            pattern,
        })
    }

    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    pub fn num_repetitions(&self) -> usize {
        self.num_repetitions
    }

    pub fn pattern(&self) -> EntanglementPattern {
        self.pattern
    }

    pub fn parameter_count(&self) -> usize {
        self.num_qubits * (self.num_repetitions + 1)
    }

    fn check_params(&self, params: &[f64]) -> Result<()> {
        if params.len() != self.parameter_count() {
            return Err(QaeError::ShapeMismatch {
                expected: self.parameter_count(),
                actual: params.len(),
            });
        }
        Ok(())
    }

    /// Ordered gate sequence for `params`.
    pub fn gates(&self, params: &[f64]) -> Result<Vec<Gate>> {
        self.check_params(params)?;

        let n = self.num_qubits;
        let pairs = self.pattern.pairs(n);
        let mut gates = Vec::with_capacity(params.len() + self.num_repetitions * pairs.len());

        for layer in 0..=self.num_repetitions {
            gates.extend((0..n).map(|qubit| Gate::Ry {
                qubit,
                theta: params[layer * n + qubit],
            }));
            if layer < self.num_repetitions {
                gates.extend(
                    pairs
                        .iter()
                        .map(|&(control, target)| Gate::Cx { control, target }),
                );
            }
        }
        Ok(gates)
    }

    /// Gate sequence of U†: reversed order, each gate inverted.
    pub fn inverse_gates(&self, params: &[f64]) -> Result<Vec<Gate>> {
        Ok(self
            .gates(params)?
            .iter()
            .rev()
            .map(Gate::inverse)
            .collect())
    }

    /// Dense unitary for `params`.
    pub fn build_unitary(&self, params: &[f64]) -> Result<Unitary> {
        let gates = self.gates(params)?;
        Unitary::from_gates(self.num_qubits, &gates)
    }
}
