//! State fidelity
//!
//! Uhlmann fidelity `F(a, b) = (Tr √(√a b √a))²` between density matrices,
//! with the pure-state shortcut `F(|ψ><ψ|, ρ) = <ψ|ρ|ψ>` taken whenever an
//! operand is a rank-1 projector.

use num_complex::Complex64;

use crate::density::DensityMatrix;
use crate::error::{QaeError, Result};
use crate::state::QuantumState;

/// Purity tolerance for treating a density matrix as pure.
pub const PURE_TOLERANCE: f64 = 1e-10;

/// Fidelity of two density matrices of equal size, clamped to [0, 1].
pub fn fidelity(a: &DensityMatrix, b: &DensityMatrix) -> Result<f64> {
    check_dims(a.dimension(), b.dimension())?;

    if let Some(psi) = a.as_pure_state(PURE_TOLERANCE) {
        return pure_fidelity(&psi, b);
    }
    if let Some(psi) = b.as_pure_state(PURE_TOLERANCE) {
        return pure_fidelity(&psi, a);
    }
    uhlmann_fidelity(a, b)
}

/// General Uhlmann formula, without the pure-state shortcut.
///
/// Evaluated as the squared trace norm `‖√a √b‖₁²`, which equals
/// `(Tr √(√a b √a))²` and avoids square roots of eigenvalue noise.
pub fn uhlmann_fidelity(a: &DensityMatrix, b: &DensityMatrix) -> Result<f64> {
    check_dims(a.dimension(), b.dimension())?;

    let product = a.sqrt_dmatrix()? * b.sqrt_dmatrix()?;
    let trace_norm: f64 = product.singular_values().iter().sum();
    if !trace_norm.is_finite() {
        return Err(QaeError::NumericalFailure(
            "singular value decomposition produced non-finite values".into(),
        ));
    }
    Ok(clamp_unit(trace_norm * trace_norm))
}

/// <ψ|ρ|ψ>, clamped to [0, 1].
pub fn pure_fidelity(psi: &QuantumState, rho: &DensityMatrix) -> Result<f64> {
    check_dims(rho.dimension(), psi.dimension())?;

    let amps = psi.amplitudes();
    let rho_psi = rho.matrix().dot(amps);
    let value: Complex64 = amps
        .iter()
        .zip(rho_psi.iter())
        .map(|(a, b)| a.conj() * b)
        .sum();
    Ok(clamp_unit(value.re))
}

/// |<a|b>|² for two pure states.
pub fn state_fidelity(a: &QuantumState, b: &QuantumState) -> Result<f64> {
    Ok(clamp_unit(a.inner(b)?.norm_sqr()))
}

fn check_dims(expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(QaeError::DimensionMismatch { expected, actual });
    }
    Ok(())
}

fn clamp_unit(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::partial_trace::partial_trace;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_identical_pure_states() {
        let rho = DensityMatrix::from_pure(&QuantumState::bell());
        assert!((fidelity(&rho, &rho).unwrap() - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_orthogonal_states() {
        let a = DensityMatrix::from_pure(&QuantumState::basis(1, 0));
        let b = DensityMatrix::from_pure(&QuantumState::basis(1, 1));
        assert!(fidelity(&a, &b).unwrap() < 1e-12);
    }

    #[test]
    fn test_mixed_against_zero() {
        let rho = DensityMatrix::maximally_mixed(1);
        let zero = DensityMatrix::zero_state(1);
        assert!((fidelity(&rho, &zero).unwrap() - 0.5).abs() < 1e-10);
        assert!((uhlmann_fidelity(&rho, &zero).unwrap() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_dimension_mismatch() {
        let a = DensityMatrix::zero_state(1);
        let b = DensityMatrix::zero_state(2);
        assert_eq!(
            fidelity(&a, &b).unwrap_err(),
            QaeError::DimensionMismatch {
                expected: 2,
                actual: 4
            }
        );
    }

    #[test]
    fn test_shortcut_agrees_with_general_formula() {
        let mut rng = StdRng::seed_from_u64(11);
        let mixed = partial_trace(&QuantumState::random(4, &mut rng), &[1, 2]).unwrap();
        let pure = DensityMatrix::from_pure(&QuantumState::random(2, &mut rng));

        let fast = fidelity(&pure, &mixed).unwrap();
        let general = uhlmann_fidelity(&pure, &mixed).unwrap();
        assert!((fast - general).abs() < 1e-6);
    }

    #[test]
    fn test_mixed_mixed_is_symmetric() {
        let mut rng = StdRng::seed_from_u64(12);
        let a = partial_trace(&QuantumState::random(3, &mut rng), &[0]).unwrap();
        let b = partial_trace(&QuantumState::random(3, &mut rng), &[2]).unwrap();
        let ab = fidelity(&a, &b).unwrap();
        let ba = fidelity(&b, &a).unwrap();
        assert!((ab - ba).abs() < 1e-7);
        assert!((0.0..=1.0).contains(&ab));
    }

    #[test]
    fn test_state_fidelity() {
        let plus = QuantumState::uniform(1);
        let zero = QuantumState::zero(1);
        assert!((state_fidelity(&plus, &zero).unwrap() - 0.5).abs() < 1e-12);
    }
}
