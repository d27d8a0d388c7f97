use nalgebra::DMatrix;
use ndarray::Array2;
use num_complex::Complex64;

use crate::error::{QaeError, Result};
use crate::partial_trace::AxisArena;
use crate::state::QuantumState;

/// Tolerance for the Hermitian and trace checks in [`DensityMatrix::from_matrix`].
pub const DENSITY_TOLERANCE: f64 = 1e-9;

/// Relative size below which an eigenvalue is rounding noise.
pub const EIGEN_CUTOFF: f64 = 1e-14;

/// Density matrix over `num_qubits` qubits: Hermitian, PSD, trace 1.
#[derive(Debug, Clone, PartialEq)]
pub struct DensityMatrix {
    num_qubits: usize,
    matrix: Array2<Complex64>,
}

impl DensityMatrix {
    /// Validates shape, Hermiticity and trace of `matrix`.
    ///
    /// Positive semi-definiteness is not checked here (it needs an
    /// eigendecomposition); use [`DensityMatrix::is_psd`].
    pub fn from_matrix(matrix: Array2<Complex64>) -> Result<Self> {
        let (rows, cols) = matrix.dim();
        if rows != cols || rows == 0 || !rows.is_power_of_two() {
            return Err(QaeError::DimensionMismatch {
                expected: rows.next_power_of_two().max(1),
                actual: cols,
            });
        }
        let rho = Self {
            num_qubits: rows.trailing_zeros() as usize,
            matrix,
        };
        if !rho.is_hermitian(DENSITY_TOLERANCE) {
            return Err(QaeError::InvalidState("matrix is not Hermitian".into()));
        }
        let trace = rho.trace();
        if (trace.re - 1.0).abs() > DENSITY_TOLERANCE || trace.im.abs() > DENSITY_TOLERANCE {
            return Err(QaeError::InvalidState(format!(
                "trace {trace} is not 1"
            )));
        }
        Ok(rho)
    }

    pub(crate) fn from_parts(num_qubits: usize, matrix: Array2<Complex64>) -> Result<Self> {
        let dim = 1usize << num_qubits;
        if matrix.dim() != (dim, dim) {
            return Err(QaeError::DimensionMismatch {
                expected: dim,
                actual: matrix.nrows(),
            });
        }
        Ok(Self { num_qubits, matrix })
    }

    /// |ψ><ψ|
    pub fn from_pure(state: &QuantumState) -> Self {
        let psi = state.amplitudes();
        let dim = psi.len();
        let matrix = Array2::from_shape_fn((dim, dim), |(i, j)| psi[i] * psi[j].conj());
        Self {
            num_qubits: state.num_qubits(),
            matrix,
        }
    }

    /// |0...0><0...0| on `num_qubits` qubits.
    pub fn zero_state(num_qubits: usize) -> Self {
        Self::from_pure(&QuantumState::zero(num_qubits))
    }

    /// I / 2^n
    pub fn maximally_mixed(num_qubits: usize) -> Self {
        let dim = 1usize << num_qubits;
        let matrix = Array2::<Complex64>::eye(dim).mapv(|c| c / dim as f64);
        Self { num_qubits, matrix }
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

    pub fn trace(&self) -> Complex64 {
        self.matrix.diag().sum()
    }

    /// Tr(ρ²)
    pub fn purity(&self) -> f64 {
        // Tr(ρ²) = Σ |ρ_ij|² for Hermitian ρ
        self.matrix.iter().map(|c| c.norm_sqr()).sum()
    }

    pub fn is_hermitian(&self, tol: f64) -> bool {
        let n = self.dimension();
        (0..n).all(|i| {
            (i..n).all(|j| (self.matrix[[i, j]] - self.matrix[[j, i]].conj()).norm() <= tol)
        })
    }

    /// Eigenvalues in ascending order.
    pub fn eigenvalues(&self) -> Result<Vec<f64>> {
        let eigen = hermitian_part(&self.matrix).symmetric_eigen();
        let mut values: Vec<f64> = eigen.eigenvalues.iter().copied().collect();
        if values.iter().any(|v| !v.is_finite()) {
            return Err(QaeError::NumericalFailure(
                "eigendecomposition produced non-finite values".into(),
            ));
        }
        values.sort_by(|a, b| a.total_cmp(b));
        Ok(values)
    }

    /// All eigenvalues are >= -tol.
    pub fn is_psd(&self, tol: f64) -> Result<bool> {
        Ok(self.eigenvalues()?.iter().all(|&v| v >= -tol))
    }

    /// Principal square root of the (PSD) matrix via U √D U†.
    ///
    /// Eigenvalues below [`EIGEN_CUTOFF`] times the largest one are treated
    /// as rounding noise and set to zero.
    pub fn sqrt(&self) -> Result<Array2<Complex64>> {
        Ok(to_ndarray(&self.sqrt_dmatrix()?))
    }

    pub(crate) fn sqrt_dmatrix(&self) -> Result<DMatrix<Complex64>> {
        let eigen = hermitian_part(&self.matrix).symmetric_eigen();
        if eigen.eigenvalues.iter().any(|v| !v.is_finite()) {
            return Err(QaeError::NumericalFailure(
                "eigendecomposition produced non-finite values".into(),
            ));
        }
        let largest = eigen.eigenvalues.iter().fold(0.0f64, |m, v| m.max(v.abs()));
        let cutoff = EIGEN_CUTOFF * largest;

        let u = &eigen.eigenvectors;
        let mut u_sqrt_d = u.clone();
        for (j, &value) in eigen.eigenvalues.iter().enumerate() {
            let root = if value > cutoff { value.sqrt() } else { 0.0 };
            for i in 0..self.dimension() {
                u_sqrt_d[(i, j)] = u[(i, j)] * root;
            }
        }
        Ok(u_sqrt_d * u.adjoint())
    }

    /// If ρ is a rank-1 projector (purity within `tol` of 1), returns |ψ>.
    ///
    /// ψ is read off the column of the largest diagonal entry, so its global
    /// phase is arbitrary.
    pub fn as_pure_state(&self, tol: f64) -> Option<QuantumState> {
        if (self.purity() - 1.0).abs() > tol {
            return None;
        }
        let (k, pivot) = self
            .matrix
            .diag()
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.re.total_cmp(&b.1.re))
            .map(|(k, c)| (k, c.re))?;
        if pivot <= 0.0 {
            return None;
        }
        let scale = pivot.sqrt();
        let amplitudes = self.matrix.column(k).iter().map(|c| c / scale).collect();
        QuantumState::from_unnormalized(amplitudes).ok()
    }

    /// Reduced density matrix of `keep_qubits`, summing diagonal blocks of
    /// the traced qubits: ρ_red[k, k'] = Σ_t ρ[(k, t), (k', t)].
    pub fn partial_trace(&self, keep_qubits: &[usize]) -> Result<DensityMatrix> {
        let arena = AxisArena::new(self.num_qubits, keep_qubits)?;
        let kept_dim = arena.kept_dim();
        let traced_dim = arena.traced_dim();

        let mut reduced = Array2::<Complex64>::zeros((kept_dim, kept_dim));
        for k in 0..kept_dim {
            for k2 in 0..kept_dim {
                let mut acc = Complex64::new(0.0, 0.0);
                for t in 0..traced_dim {
                    acc += self.matrix[[arena.join(k, t), arena.join(k2, t)]];
                }
                reduced[[k, k2]] = acc;
            }
        }
        Self::from_parts(arena.kept().len(), reduced)
    }
}

/// (A + A†)/2 as an nalgebra matrix, removing rounding asymmetry before the
/// Hermitian eigensolver.
fn hermitian_part(a: &Array2<Complex64>) -> DMatrix<Complex64> {
    let n = a.nrows();
    DMatrix::from_fn(n, n, |i, j| (a[[i, j]] + a[[j, i]].conj()) * 0.5)
}

fn to_ndarray(m: &DMatrix<Complex64>) -> Array2<Complex64> {
    Array2::from_shape_fn((m.nrows(), m.ncols()), |(i, j)| m[(i, j)])
}
