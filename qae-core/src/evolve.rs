//! Pure-state evolution
//!
//! Full-precision statevector simulation. Cost is exponential in the qubit
//! count; no approximation is made.

use crate::error::{QaeError, Result};
use crate::gates::Gate;
use crate::state::{QuantumState, NORM_TOLERANCE};
use crate::unitary::Unitary;

/// Applies `unitary` to `state` by matrix-vector multiplication.
///
/// Fails with `DimensionMismatch` if the unitary does not act on the state's
/// space and with `InvalidState` if the input norm has drifted from 1 by more
/// than [`NORM_TOLERANCE`]. The output is renormalized.
pub fn evolve(state: &QuantumState, unitary: &Unitary) -> Result<QuantumState> {
    if unitary.dimension() != state.dimension() {
        return Err(QaeError::DimensionMismatch {
            expected: state.dimension(),
            actual: unitary.dimension(),
        });
    }
    check_norm(state)?;

    let amplitudes = unitary.matrix().dot(state.amplitudes());
    Ok(QuantumState::from_parts(state.num_qubits(), amplitudes).renormalized())
}

/// Applies a gate sequence directly with the in-place kernels.
///
/// Equivalent to `evolve(state, &Unitary::from_gates(n, gates)?)` without
/// materializing the 2^n x 2^n matrix.
pub fn evolve_gates(state: &QuantumState, gates: &[Gate]) -> Result<QuantumState> {
    if let Some(bad) = gates.iter().find(|g| g.max_qubit() >= state.num_qubits()) {
        return Err(QaeError::DimensionMismatch {
            expected: state.num_qubits(),
            actual: bad.max_qubit() + 1,
        });
    }
    check_norm(state)?;

    let mut amplitudes = state.amplitudes().clone();
    for gate in gates {
        gate.apply(amplitudes.view_mut());
    }
    Ok(QuantumState::from_parts(state.num_qubits(), amplitudes).renormalized())
}

fn check_norm(state: &QuantumState) -> Result<()> {
    let norm_sq = state.norm().powi(2);
    if !norm_sq.is_finite() || (norm_sq - 1.0).abs() > NORM_TOLERANCE {
        return Err(QaeError::InvalidState(format!(
            "input squared norm {norm_sq} deviates from 1"
        )));
    }
    Ok(())
}
