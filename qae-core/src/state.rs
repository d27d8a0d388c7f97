use ndarray::Array1;
use num_complex::Complex64;
use rand::Rng;
use rand_distr::StandardNormal;
use std::f64::consts::FRAC_1_SQRT_2;

use crate::error::{QaeError, Result};

/// Maximum deviation of the squared norm from 1 accepted for an input state.
pub const NORM_TOLERANCE: f64 = 1e-6;

/// Pure n-qubit state as a unit-norm amplitude vector of length 2^n.
///
/// Qubit ordering is little-endian: qubit `q` is bit `q` of the basis index,
/// so index 0 is the least-significant qubit. The same convention is used by
/// the ansatz, the gate kernels and the partial trace.
///
/// The amplitudes are private; every transformation returns a new state.
#[derive(Debug, Clone, PartialEq)]
pub struct QuantumState {
    num_qubits: usize,
    amplitudes: Array1<Complex64>,
}

impl QuantumState {
    /// Creates a state from amplitudes that must already be unit-norm.
    ///
    /// Fails with `InvalidState` if the length is not a power of two (≥ 2) or
    /// the squared norm deviates from 1 by more than [`NORM_TOLERANCE`].
    /// Accepted amplitudes are renormalized exactly.
    pub fn new(amplitudes: Vec<Complex64>) -> Result<Self> {
        let num_qubits = qubits_for_dimension(amplitudes.len())?;
        let norm_sq: f64 = amplitudes.iter().map(|c| c.norm_sqr()).sum();
        if !norm_sq.is_finite() || (norm_sq - 1.0).abs() > NORM_TOLERANCE {
            return Err(QaeError::InvalidState(format!(
                "squared norm {norm_sq} is not within {NORM_TOLERANCE} of 1"
            )));
        }
        Ok(Self::from_parts(num_qubits, Array1::from(amplitudes)).normalized())
    }

    /// Creates a state by normalizing arbitrary amplitudes.
    pub fn from_unnormalized(amplitudes: Vec<Complex64>) -> Result<Self> {
        let num_qubits = qubits_for_dimension(amplitudes.len())?;
        let norm_sq: f64 = amplitudes.iter().map(|c| c.norm_sqr()).sum();
        if !norm_sq.is_finite() || norm_sq < 1e-300 {
            return Err(QaeError::InvalidState(format!(
                "cannot normalize vector with squared norm {norm_sq}"
            )));
        }
        Ok(Self::from_parts(num_qubits, Array1::from(amplitudes)).normalized())
    }

    /// Creates `|0...0>` on `num_qubits` qubits.
    pub fn zero(num_qubits: usize) -> Self {
        Self::basis(num_qubits, 0)
    }

    /// Creates the computational basis state `|index>`.
    ///
    /// Indices wrap into range, so `basis(n, 2^n)` is `|0...0>`.
    pub fn basis(num_qubits: usize, index: usize) -> Self {
        let dim = 1usize << num_qubits;
        let mut amplitudes = Array1::<Complex64>::zeros(dim);
        amplitudes[index % dim] = Complex64::new(1.0, 0.0);
        Self::from_parts(num_qubits, amplitudes)
    }

    /// Bell state (|00> + |11>)/√2.
    pub fn bell() -> Self {
        let mut amplitudes = Array1::<Complex64>::zeros(4);
        amplitudes[0] = Complex64::new(FRAC_1_SQRT_2, 0.0);
        amplitudes[3] = Complex64::new(FRAC_1_SQRT_2, 0.0);
        Self::from_parts(2, amplitudes)
    }

    /// GHZ state (|0...0> + |1...1>)/√2 on `num_qubits` qubits.
    pub fn ghz(num_qubits: usize) -> Self {
        let dim = 1usize << num_qubits;
        let mut amplitudes = Array1::<Complex64>::zeros(dim);
        amplitudes[0] = Complex64::new(FRAC_1_SQRT_2, 0.0);
        amplitudes[dim - 1] = Complex64::new(FRAC_1_SQRT_2, 0.0);
        Self::from_parts(num_qubits, amplitudes)
    }

    /// Uniform superposition |+>^n (Hadamard on every qubit of |0...0>).
    pub fn uniform(num_qubits: usize) -> Self {
        let dim = 1usize << num_qubits;
        let amp = Complex64::new(1.0 / (dim as f64).sqrt(), 0.0);
        Self::from_parts(num_qubits, Array1::from_elem(dim, amp))
    }

    /// Random state with i.i.d. Gaussian real and imaginary parts, normalized.
    pub fn random<R: Rng>(num_qubits: usize, rng: &mut R) -> Self {
        let dim = 1usize << num_qubits;
        loop {
            let amplitudes: Array1<Complex64> = (0..dim)
                .map(|_| {
                    Complex64::new(rng.sample(StandardNormal), rng.sample(StandardNormal))
                })
                .collect();
            let state = Self::from_parts(num_qubits, amplitudes);
            if state.norm() > 1e-12 {
                return state.normalized();
            }
        }
    }

    /// Rebuilds a state from `[re_0, .., re_{d-1}, im_0, .., im_{d-1}]`.
    pub fn from_real_features(features: &[f64]) -> Result<Self> {
        if features.len() % 2 != 0 {
            return Err(QaeError::DimensionMismatch {
                expected: features.len() + 1,
                actual: features.len(),
            });
        }
        let dim = features.len() / 2;
        let amplitudes = (0..dim)
            .map(|i| Complex64::new(features[i], features[dim + i]))
            .collect();
        Self::from_unnormalized(amplitudes)
    }

    pub(crate) fn from_parts(num_qubits: usize, amplitudes: Array1<Complex64>) -> Self {
        Self {
            num_qubits,
            amplitudes,
        }
    }

    fn normalized(mut self) -> Self {
        let norm = self.norm();
        if norm > 1e-300 {
            self.amplitudes.mapv_inplace(|c| c / norm);
        }
        self
    }

    /// Returns a renormalized copy (guards against floating-point drift).
    pub(crate) fn renormalized(self) -> Self {
        self.normalized()
    }

    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    pub fn dimension(&self) -> usize {
        self.amplitudes.len()
    }

    pub fn amplitudes(&self) -> &Array1<Complex64> {
        &self.amplitudes
    }

    pub fn amplitude(&self, index: usize) -> Complex64 {
        self.amplitudes
            .get(index)
            .copied()
            .unwrap_or(Complex64::new(0.0, 0.0))
    }

    /// Euclidean norm of the amplitude vector.
    pub fn norm(&self) -> f64 {
        self.amplitudes
            .iter()
            .map(|c| c.norm_sqr())
            .sum::<f64>()
            .sqrt()
    }

    pub fn probability(&self, index: usize) -> f64 {
        self.amplitude(index).norm_sqr()
    }

    /// Probability of measuring `qubit` in |1>.
    pub fn marginal_probability(&self, qubit: usize) -> f64 {
        let bit = 1 << qubit;
        self.amplitudes
            .iter()
            .enumerate()
            .filter(|(i, _)| i & bit != 0)
            .map(|(_, c)| c.norm_sqr())
            .sum()
    }

    /// Inner product <self|other>.
    pub fn inner(&self, other: &QuantumState) -> Result<Complex64> {
        if self.dimension() != other.dimension() {
            return Err(QaeError::DimensionMismatch {
                expected: self.dimension(),
                actual: other.dimension(),
            });
        }
        Ok(self
            .amplitudes
            .iter()
            .zip(other.amplitudes.iter())
            .map(|(a, b)| a.conj() * b)
            .sum())
    }

    /// Flattens to `[re..., im...]`, the classical baseline's input encoding.
    pub fn to_real_features(&self) -> Vec<f64> {
        self.amplitudes
            .iter()
            .map(|c| c.re)
            .chain(self.amplitudes.iter().map(|c| c.im))
            .collect()
    }
}

fn qubits_for_dimension(dim: usize) -> Result<usize> {
    if dim < 2 || !dim.is_power_of_two() {
        return Err(QaeError::InvalidState(format!(
            "amplitude vector length {dim} is not a power of two >= 2"
        )));
    }
    Ok(dim.trailing_zeros() as usize)
}
