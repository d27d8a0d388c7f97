//! Partial trace by tensor reshape-and-contract
//!
//! The amplitude vector of an n-qubit state is viewed as a rank-n tensor of
//! shape `[2; n]`. Row-major order puts the most significant index bit on
//! axis 0, so with little-endian qubits, qubit `q` lives on axis `n - 1 - q`.
//!
//! An [`AxisArena`] records, for every qubit label, its tensor axis, its
//! stride in the flat vector, and its bit position inside either the kept or
//! the traced sub-index. The tensor is permuted to `(kept axes, traced
//! axes)`, flattened to a `2^m x 2^(n-m)` matrix `M`, and contracted over the
//! traced axes as `ρ = M M†`.
//!
//! ```text
//! ψ[i]  ──reshape──▶  T[a_0, .., a_{n-1}]
//!       ──permute──▶  T[kept.., traced..]
//!       ──flatten──▶  M[k, t]
//!       ──contract──▶  ρ[k, k'] = Σ_t M[k, t] M*[k', t]
//! ```

use ndarray::{Array2, IxDyn};
use num_complex::Complex64;

use crate::density::DensityMatrix;
use crate::error::{QaeError, Result};
use crate::state::QuantumState;

/// Which sub-index a qubit axis belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisRole {
    /// Kept qubit, contributing bit `position` of the reduced index
    Kept { position: usize },
    /// Traced-out qubit, contributing bit `position` of the traced index
    Traced { position: usize },
}

/// Bookkeeping for one qubit label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisLabel {
    pub qubit: usize,
    /// Axis of the `[2; n]` row-major tensor
    pub axis: usize,
    /// Stride of the qubit in the flat amplitude vector
    pub stride: usize,
    pub role: AxisRole,
}

/// Arena of qubit-axis labels for one (n, keep set) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AxisArena {
    num_qubits: usize,
    labels: Vec<AxisLabel>,
    kept: Vec<usize>,
    traced: Vec<usize>,
}

impl AxisArena {
    /// Validates `keep_qubits` against `num_qubits` and lays out the axes.
    ///
    /// Kept qubits are sorted ascending; the lowest kept qubit is the least
    /// significant bit of the reduced index. Fails with `InvalidQubitSet` for
    /// an empty set, an out-of-range index, or a duplicate.
    pub fn new(num_qubits: usize, keep_qubits: &[usize]) -> Result<Self> {
        if keep_qubits.is_empty() {
            return Err(QaeError::InvalidQubitSet("keep set is empty".into()));
        }
        let mut seen = vec![false; num_qubits];
        for &q in keep_qubits {
            if q >= num_qubits {
                return Err(QaeError::InvalidQubitSet(format!(
                    "qubit {q} out of range for {num_qubits} qubits"
                )));
            }
            if seen[q] {
                return Err(QaeError::InvalidQubitSet(format!("duplicate qubit {q}")));
            }
            seen[q] = true;
        }

        let kept: Vec<usize> = (0..num_qubits).filter(|&q| seen[q]).collect();
        let traced: Vec<usize> = (0..num_qubits).filter(|&q| !seen[q]).collect();

        let labels = (0..num_qubits)
            .map(|qubit| {
                let role = match kept.iter().position(|&k| k == qubit) {
                    Some(position) => AxisRole::Kept { position },
                    None => AxisRole::Traced {
                        position: traced.iter().position(|&t| t == qubit).unwrap_or(0),
                    },
                };
                AxisLabel {
                    qubit,
                    axis: num_qubits - 1 - qubit,
                    stride: 1 << qubit,
                    role,
                }
            })
            .collect();

        Ok(Self {
            num_qubits,
            labels,
            kept,
            traced,
        })
    }

    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    pub fn labels(&self) -> &[AxisLabel] {
        &self.labels
    }

    /// Kept qubits, ascending.
    pub fn kept(&self) -> &[usize] {
        &self.kept
    }

    /// Traced-out qubits, ascending.
    pub fn traced(&self) -> &[usize] {
        &self.traced
    }

    pub fn kept_dim(&self) -> usize {
        1 << self.kept.len()
    }

    pub fn traced_dim(&self) -> usize {
        1 << self.traced.len()
    }

    /// Tensor axis order `(kept, most significant first) ++ (traced, ...)`.
    pub fn permutation(&self) -> Vec<usize> {
        let axis = |q: usize| self.labels[q].axis;
        self.kept
            .iter()
            .rev()
            .chain(self.traced.iter().rev())
            .map(|&q| axis(q))
            .collect()
    }

    /// Splits a full basis index into `(kept index, traced index)`.
    pub fn split(&self, index: usize) -> (usize, usize) {
        let mut k = 0;
        let mut t = 0;
        for label in &self.labels {
            let bit = (index & label.stride != 0) as usize;
            match label.role {
                AxisRole::Kept { position } => k |= bit << position,
                AxisRole::Traced { position } => t |= bit << position,
            }
        }
        (k, t)
    }

    /// Inverse of [`AxisArena::split`].
    pub fn join(&self, kept_index: usize, traced_index: usize) -> usize {
        self.labels.iter().fold(0, |index, label| {
            let bit = match label.role {
                AxisRole::Kept { position } => (kept_index >> position) & 1,
                AxisRole::Traced { position } => (traced_index >> position) & 1,
            };
            index | (bit * label.stride)
        })
    }
}

/// Reduced density matrix of `keep_qubits` for a pure state.
pub fn partial_trace(state: &QuantumState, keep_qubits: &[usize]) -> Result<DensityMatrix> {
    let arena = AxisArena::new(state.num_qubits(), keep_qubits)?;
    let m = kept_traced_matrix(state, &arena)?;
    let m_dag = m.t().mapv(|c| c.conj());
    DensityMatrix::from_parts(arena.kept().len(), m.dot(&m_dag))
}

/// Reshapes the amplitudes to the `2^m x 2^(n-m)` matrix `M[k, t]`.
fn kept_traced_matrix(state: &QuantumState, arena: &AxisArena) -> Result<Array2<Complex64>> {
    let n = state.num_qubits();
    let tensor = state
        .amplitudes()
        .view()
        .into_shape(IxDyn(&vec![2; n]))
        .map_err(|e| QaeError::NumericalFailure(format!("tensor reshape failed: {e}")))?;

    let permuted = tensor.permuted_axes(IxDyn(&arena.permutation()));
    permuted
        .as_standard_layout()
        .into_owned()
        .into_shape((arena.kept_dim(), arena.traced_dim()))
        .map_err(|e| QaeError::NumericalFailure(format!("matrix reshape failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const TOL: f64 = 1e-9;

    #[test]
    fn test_invalid_qubit_sets() {
        let state = QuantumState::zero(3);
        assert!(matches!(
            partial_trace(&state, &[]),
            Err(QaeError::InvalidQubitSet(_))
        ));
        assert!(matches!(
            partial_trace(&state, &[3]),
            Err(QaeError::InvalidQubitSet(_))
        ));
        assert!(matches!(
            partial_trace(&state, &[1, 1]),
            Err(QaeError::InvalidQubitSet(_))
        ));
    }

    #[test]
    fn test_arena_layout() {
        let arena = AxisArena::new(3, &[2, 0]).unwrap();
        assert_eq!(arena.kept(), &[0, 2]);
        assert_eq!(arena.traced(), &[1]);
        // qubit 2 -> axis 0, qubit 0 -> axis 2, qubit 1 -> axis 1
        assert_eq!(arena.permutation(), vec![0, 2, 1]);
        assert_eq!(
            arena.labels()[1].role,
            AxisRole::Traced { position: 0 }
        );
    }

    #[test]
    fn test_split_join_roundtrip() {
        let arena = AxisArena::new(4, &[1, 3]).unwrap();
        for index in 0..16 {
            let (k, t) = arena.split(index);
            assert!(k < 4 && t < 4);
            assert_eq!(arena.join(k, t), index);
        }
        // index 0b1010: q1 = 1, q3 = 1 -> kept index 0b11
        assert_eq!(arena.split(0b1010), (0b11, 0));
    }

    #[test]
    fn test_bell_reduced_is_maximally_mixed() {
        let bell = QuantumState::bell();
        for keep in [[0usize], [1usize]] {
            let rho = partial_trace(&bell, &keep).unwrap();
            let m = rho.matrix();
            assert!((m[[0, 0]].re - 0.5).abs() < TOL);
            assert!((m[[1, 1]].re - 0.5).abs() < TOL);
            assert!(m[[0, 1]].norm() < TOL);
            assert!(m[[1, 0]].norm() < TOL);
        }
    }

    #[test]
    fn test_product_state_reduces_to_factor() {
        // |q1 q0> = |1>|0> : index 2
        let state = QuantumState::basis(2, 2);
        let rho0 = partial_trace(&state, &[0]).unwrap();
        assert!((rho0.matrix()[[0, 0]].re - 1.0).abs() < TOL);
        let rho1 = partial_trace(&state, &[1]).unwrap();
        assert!((rho1.matrix()[[1, 1]].re - 1.0).abs() < TOL);
    }

    #[test]
    fn test_full_keep_set_is_pure_projector() {
        let mut rng = StdRng::seed_from_u64(5);
        let state = QuantumState::random(3, &mut rng);
        let rho = partial_trace(&state, &[0, 1, 2]).unwrap();
        let expected = DensityMatrix::from_pure(&state);
        for (a, b) in rho.matrix().iter().zip(expected.matrix().iter()) {
            assert!((a - b).norm() < TOL);
        }
    }

    #[test]
    fn test_keep_order_is_irrelevant() {
        let mut rng = StdRng::seed_from_u64(9);
        let state = QuantumState::random(4, &mut rng);
        let a = partial_trace(&state, &[3, 1]).unwrap();
        let b = partial_trace(&state, &[1, 3]).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_random_reduced_is_valid() {
        let mut rng = StdRng::seed_from_u64(17);
        let state = QuantumState::random(4, &mut rng);
        let rho = partial_trace(&state, &[0, 2]).unwrap();
        assert!((rho.trace().re - 1.0).abs() < TOL);
        assert!(rho.is_hermitian(TOL));
        assert!(rho.is_psd(TOL).unwrap());
    }
}
