use ndarray::Array2;
use num_complex::Complex64;

use crate::error::{QaeError, Result};
use crate::gates::Gate;

/// Dense 2^n x 2^n unitary acting on the little-endian qubit ordering.
#[derive(Debug, Clone, PartialEq)]
pub struct Unitary {
    num_qubits: usize,
    matrix: Array2<Complex64>,
}

impl Unitary {
    pub fn identity(num_qubits: usize) -> Self {
        let dim = 1usize << num_qubits;
        Self {
            num_qubits,
            matrix: Array2::eye(dim),
        }
    }

    /// Wraps a square matrix; fails if it is not 2^n x 2^n.
    pub fn from_matrix(matrix: Array2<Complex64>) -> Result<Self> {
        let (rows, cols) = matrix.dim();
        if rows != cols {
            return Err(QaeError::DimensionMismatch {
                expected: rows,
                actual: cols,
            });
        }
        if rows < 2 || !rows.is_power_of_two() {
            return Err(QaeError::DimensionMismatch {
                expected: rows.next_power_of_two().max(2),
                actual: rows,
            });
        }
        Ok(Self {
            num_qubits: rows.trailing_zeros() as usize,
            matrix,
        })
    }

    /// Product of a gate sequence, first gate applied first.
    ///
    /// Each gate is applied to every column of the running product, so the
    /// result is exactly G_k ... G_2 G_1.
    pub fn from_gates(num_qubits: usize, gates: &[Gate]) -> Result<Self> {
        if let Some(bad) = gates.iter().find(|g| g.max_qubit() >= num_qubits) {
            return Err(QaeError::DimensionMismatch {
                expected: num_qubits,
                actual: bad.max_qubit() + 1,
            });
        }
        let mut unitary = Self::identity(num_qubits);
        for gate in gates {
            for column in unitary.matrix.columns_mut() {
                gate.apply(column);
            }
        }
        Ok(unitary)
    }

    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    pub fn dimension(&self) -> usize {
        self.matrix.nrows()
    }

    pub fn matrix(&self) -> &Array2<Complex64> {
        &self.matrix
    }

    /// Conjugate transpose U†.
    pub fn adjoint(&self) -> Self {
        Self {
            num_qubits: self.num_qubits,
            matrix: self.matrix.t().mapv(|c| c.conj()),
        }
    }

    /// `self` followed by `next`, i.e. the matrix `next · self`.
    pub fn then(&self, next: &Unitary) -> Result<Self> {
        if self.dimension() != next.dimension() {
            return Err(QaeError::DimensionMismatch {
                expected: self.dimension(),
                actual: next.dimension(),
            });
        }
        Ok(Self {
            num_qubits: self.num_qubits,
            matrix: next.matrix.dot(&self.matrix),
        })
    }

    /// Max deviation of U†U from the identity is at most `tol`.
    pub fn is_unitary(&self, tol: f64) -> bool {
        let product = self.adjoint().matrix.dot(&self.matrix);
        product.indexed_iter().all(|((i, j), c)| {
            let expected = if i == j { 1.0 } else { 0.0 };
            (c - Complex64::new(expected, 0.0)).norm() <= tol
        })
    }
}
